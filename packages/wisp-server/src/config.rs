//! Server configuration.

use wisp_core::StoreConfig;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default listen host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Largest accepted upload (15 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 15 * 1024 * 1024;

/// Extra room on top of the upload limit for multipart framing, so an
/// oversized file still reaches validation instead of being cut off.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Uploads larger than this are rejected with 400
    pub max_upload_bytes: usize,
    /// TTLs, sweep period and id sizing for both stores
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            store: StoreConfig::default(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Request body cap handed to axum.
    pub fn body_limit(&self) -> usize {
        self.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES)
    }

    /// Upload limit in whole MiB, for user-facing messages.
    pub fn max_upload_mib(&self) -> usize {
        self.max_upload_bytes / (1024 * 1024)
    }

    /// File TTL in whole minutes, as reported to uploaders.
    pub fn file_ttl_minutes(&self) -> i64 {
        self.store.file_ttl_secs / 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.max_upload_bytes, 15 * 1024 * 1024);
        assert_eq!(config.max_upload_mib(), 15);
        assert_eq!(config.file_ttl_minutes(), 60);
    }

    #[test]
    fn test_body_limit_leaves_room_for_framing() {
        let config = ServerConfig::default();
        assert!(config.body_limit() > config.max_upload_bytes);
    }
}
