//! Ephemeral message board backed by the core
//! [`MessageStore`](wisp_core::MessageStore).

pub mod api;
