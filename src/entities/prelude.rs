pub use super::attachment_activities::Entity as AttachmentActivities;
pub use super::attachment_collections::Entity as AttachmentCollections;
pub use super::attachment_comments::Entity as AttachmentComments;
pub use super::attachment_favorites::Entity as AttachmentFavorites;
pub use super::attachment_labels::Entity as AttachmentLabels;
pub use super::attachment_permissions::Entity as AttachmentPermissions;
pub use super::attachment_shares::Entity as AttachmentShares;
pub use super::attachment_tags::Entity as AttachmentTags;
pub use super::attachment_versions::Entity as AttachmentVersions;
pub use super::attachments::Entity as Attachments;
pub use super::collection_items::Entity as CollectionItems;
pub use super::share_links::Entity as ShareLinks;
