//! One-shot encrypted file drop.
//!
//! Uploads are encrypted into the core [`FileStore`](wisp_core::FileStore)
//! and handed back exactly once. A successful download destroys the file.

pub mod api;
