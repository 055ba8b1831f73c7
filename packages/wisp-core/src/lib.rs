//! # Wisp Core
//!
//! An ephemeral, RAM-only store for encrypted files and short-lived
//! messages. Uploads get a short opaque id, can be downloaded exactly once,
//! and are wiped from memory on every way out of the store.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          WISP CORE MODULES                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌──────────────────────────────┐   ┌──────────────────────────────┐   │
//! │  │        FileStore             │   │        MessageStore          │   │
//! │  │ - store / retrieve           │   │ - send / get / get_all       │   │
//! │  │ - download (single use)      │   │ - delete / clear_all         │   │
//! │  │ - delete / clear_all / sweep │   │ - sweep                      │   │
//! │  └──────┬───────────────┬───────┘   └──────────────┬───────────────┘   │
//! │         │               │                          │                   │
//! │  ┌──────▼──────┐  ┌─────▼─────────────────────────▼─┐  ┌───────────┐  │
//! │  │   Crypto    │  │          IdGenerator             │  │  Sweeper  │  │
//! │  │ - AES-GCM   │  │ - 62-symbol alphabet             │  │ - tokio   │  │
//! │  │ - keys      │  │ - bounded collision retry        │  │   interval│  │
//! │  │ - wipe      │  └──────────────────────────────────┘  └───────────┘  │
//! │  └─────────────┘                                                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error taxonomy shared with the HTTP layer
//! - [`config`] - TTLs, sweep period, identifier sizing
//! - [`clock`] - Injectable time source
//! - [`crypto`] - Key/nonce generation, AES-256-GCM, secure wipe
//! - [`id`] - Short random identifiers
//! - [`storage`] - File and message stores
//! - [`sweeper`] - Background expiry task
//!
//! ## Logging
//!
//! Store operations never log. The sweeper reports aggregate counts at
//! `debug`. Identifiers, filenames and contents are never logged anywhere.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod clock;
pub mod config;
pub mod crypto;
pub mod error;
pub mod id;
pub mod storage;
pub mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::StoreConfig;
pub use error::{Error, Result};
pub use storage::{DownloadedFile, FileStore, Message, MessageStore, StoredFile};
pub use sweeper::{Sweep, SweeperHandle};
