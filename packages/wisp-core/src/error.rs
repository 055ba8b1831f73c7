//! # Error Handling
//!
//! Error types for Wisp Core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Lookup Errors                                                     │
//! │  │   ├── NotFound              - Id absent from the index              │
//! │  │   └── Expired               - Id present but past its TTL           │
//! │  │                                                                      │
//! │  ├── Crypto Errors                                                     │
//! │  │   └── Crypto                - Bad key/nonce or tag mismatch         │
//! │  │                                                                      │
//! │  ├── Identifier Errors                                                 │
//! │  │   └── IdSpaceExhausted      - Bounded retry loop gave up            │
//! │  │                                                                      │
//! │  ├── Time Errors                                                       │
//! │  │   └── ExpiryOutOfRange      - now + TTL not representable           │
//! │  │                                                                      │
//! │  └── Adapter Errors                                                    │
//! │      └── Validation            - Rejected request input                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stores never log failures. Every outcome is returned to the caller,
//! which decides how to present it (the HTTP layer maps them to status codes).
//! `NotFound` and `Expired` collapse into a single externally visible state
//! via [`Error::is_not_found`].

use thiserror::Error;

/// Result type alias for Wisp Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Wisp Core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The identifier is not present in the store
    #[error("Item not found")]
    NotFound,

    /// The identifier was present but its TTL had elapsed; the entry has
    /// already been removed and wiped by the time this is returned
    #[error("Item has expired")]
    Expired,

    /// Authenticated encryption or decryption failed
    ///
    /// On decrypt this always means tampering, a wrong key/nonce, or a
    /// mismatched associated data; corrupted plaintext is never returned.
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Could not find a free identifier within the retry budget
    #[error("Identifier space exhausted after {attempts} attempts")]
    IdSpaceExhausted {
        /// Number of candidates drawn before giving up
        attempts: u32,
    },

    /// The expiry instant for a new entry cannot be represented
    #[error("Expiry time out of range")]
    ExpiryOutOfRange,

    /// Request input rejected by the adapter layer
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl Error {
    /// Whether this error means "nothing retrievable under that id".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound | Error::Expired)
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound => "not_found",
            Error::Expired => "expired",
            Error::Crypto(_) => "crypto",
            Error::IdSpaceExhausted { .. } => "id_space_exhausted",
            Error::ExpiryOutOfRange => "expiry_out_of_range",
            Error::Validation(_) => "validation",
        }
    }
}
