//! # Storage
//!
//! RAM-only stores. Nothing here ever touches disk; a restart drops every
//! object by construction.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        OBJECT LIFECYCLE                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   store() ──► Active ──┬── download ───────────────┐                   │
//! │                        ├── expiry (read or sweep) ─┤                   │
//! │                        ├── delete() ───────────────┼──► wipe + remove  │
//! │                        └── clear_all() ────────────┘                   │
//! │                                                                         │
//! │   There is no way back from removal; nothing is archived.              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`FileStore`]: encrypted, single-download file blobs
//! - [`MessageStore`]: short-lived plaintext messages

mod files;
mod messages;

pub use files::{DownloadedFile, FileStore, StoredFile};
pub use messages::{Message, MessageStore};
