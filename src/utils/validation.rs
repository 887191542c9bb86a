use crate::config::EngineConfig;
use crate::error::AppError;
use uuid::Uuid;

/// Validates a record identifier minted by this engine (UUID v4 string)
pub fn validate_record_id(id: &str, what: &str) -> Result<(), AppError> {
    if Uuid::parse_str(id).is_err() {
        return Err(AppError::InvalidArgument(format!(
            "'{}' is not a valid {} id",
            id, what
        )));
    }
    Ok(())
}

/// Validates an opaque external identifier (attachment, user, workspace).
/// The engine never interprets these, it only requires them to be present.
pub fn validate_external_id(id: &str, what: &str) -> Result<(), AppError> {
    if id.trim().is_empty() {
        return Err(AppError::InvalidArgument(format!("{} id is required", what)));
    }
    Ok(())
}

/// Clamps a requested page size: absent, zero or above the maximum all
/// fall back to the configured default.
pub fn clamp_limit(limit: Option<u64>, config: &EngineConfig) -> u64 {
    match limit {
        Some(l) if l > 0 && l <= config.max_page_size => l,
        _ => config.default_page_size,
    }
}

/// Clamps a requested offset; absent becomes zero.
pub fn clamp_offset(offset: Option<u64>) -> u64 {
    offset.unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit_defaults() {
        let config = EngineConfig::default();
        assert_eq!(clamp_limit(None, &config), 50);
        assert_eq!(clamp_limit(Some(0), &config), 50);
        assert_eq!(clamp_limit(Some(500), &config), 50);
        assert_eq!(clamp_limit(Some(25), &config), 25);
        assert_eq!(clamp_limit(Some(200), &config), 200);
    }

    #[test]
    fn test_clamp_offset() {
        assert_eq!(clamp_offset(None), 0);
        assert_eq!(clamp_offset(Some(30)), 30);
    }

    #[test]
    fn test_validate_record_id() {
        assert!(validate_record_id(&Uuid::new_v4().to_string(), "comment").is_ok());
        assert!(validate_record_id("not-a-uuid", "comment").is_err());
    }

    #[test]
    fn test_validate_external_id() {
        assert!(validate_external_id("att_12345", "attachment").is_ok());
        assert!(validate_external_id("  ", "attachment").is_err());
    }
}
