//! Store configuration.
//!
//! Every knob has a default matching the fixed constants the service ships
//! with; the server binary can override them from CLI flags or environment.

/// Default file TTL in seconds (60 minutes).
pub const DEFAULT_FILE_TTL_SECS: i64 = 60 * 60;

/// Default message TTL in seconds (60 minutes).
pub const DEFAULT_MESSAGE_TTL_SECS: i64 = 60 * 60;

/// Longest accepted TTL in seconds (one year). Larger values are clamped.
pub const MAX_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Default expiry sweep period in seconds (5 minutes).
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 5 * 60;

/// Default file identifier length.
///
/// Three characters over a 62-symbol alphabet is only 238,328 ids. Raise it
/// for anything beyond a handful of concurrent uploads.
pub const DEFAULT_FILE_ID_LENGTH: usize = 3;

/// Default message identifier length.
pub const DEFAULT_MESSAGE_ID_LENGTH: usize = 8;

/// Default cap on identifier draws before giving up.
pub const DEFAULT_MAX_ID_ATTEMPTS: u32 = 64;

/// Configuration shared by the file and message stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Lifetime of an uploaded file in seconds
    pub file_ttl_secs: i64,
    /// Lifetime of a message in seconds
    pub message_ttl_secs: i64,
    /// Period between expiry sweeps in seconds
    pub sweep_interval_secs: u64,
    /// Length of generated file identifiers
    pub file_id_length: usize,
    /// Length of generated message identifiers
    pub message_id_length: usize,
    /// Maximum identifier draws per insert before failing
    pub max_id_attempts: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            file_ttl_secs: DEFAULT_FILE_TTL_SECS,
            message_ttl_secs: DEFAULT_MESSAGE_TTL_SECS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            file_id_length: DEFAULT_FILE_ID_LENGTH,
            message_id_length: DEFAULT_MESSAGE_ID_LENGTH,
            max_id_attempts: DEFAULT_MAX_ID_ATTEMPTS,
        }
    }
}

impl StoreConfig {
    /// File TTL as a chrono duration, clamped to `1..=MAX_TTL_SECS`.
    pub fn file_ttl(&self) -> chrono::Duration {
        ttl_from_secs(self.file_ttl_secs)
    }

    /// Message TTL as a chrono duration, clamped to `1..=MAX_TTL_SECS`.
    pub fn message_ttl(&self) -> chrono::Duration {
        ttl_from_secs(self.message_ttl_secs)
    }

    /// Sweep period as a std duration, at least one second.
    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

fn ttl_from_secs(secs: i64) -> chrono::Duration {
    chrono::Duration::seconds(secs.clamp(1, MAX_TTL_SECS))
}
