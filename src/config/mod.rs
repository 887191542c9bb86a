use std::env;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Default page size applied when a list request carries none (default: 50)
    pub default_page_size: u64,

    /// Maximum accepted page size; larger requests fall back to the default (default: 200)
    pub max_page_size: u64,

    /// Per-user quota ceiling in bytes (default: 5 GB)
    pub quota_max_bytes: i64,

    /// Per-user quota ceiling in file count (default: 10000)
    pub quota_max_files: i64,

    /// Share-link code length (default: 8)
    pub share_code_length: usize,

    /// How often share-link code generation retries on collision (default: 5)
    pub share_code_max_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 200,
            quota_max_bytes: 5 * 1024 * 1024 * 1024, // 5 GB
            quota_max_files: 10_000,
            share_code_length: 8,
            share_code_max_attempts: 5,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            default_page_size: env::var("DEFAULT_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.default_page_size),

            max_page_size: env::var("MAX_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_page_size),

            quota_max_bytes: env::var("QUOTA_MAX_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.quota_max_bytes),

            quota_max_files: env::var("QUOTA_MAX_FILES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.quota_max_files),

            share_code_length: env::var("SHARE_CODE_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.share_code_length),

            share_code_max_attempts: env::var("SHARE_CODE_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.share_code_max_attempts),
        }
    }
}
