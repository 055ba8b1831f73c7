//! Shared application state.
//!
//! Both stores are owned here and handed to handlers through axum's state
//! extractor. There is no global lookup.

use axum::extract::FromRef;
use wisp_core::sweeper::{self, SweeperHandle};
use wisp_core::{FileStore, MessageStore};

use crate::config::ServerConfig;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Encrypted single-download files
    pub files: FileStore,
    /// Ephemeral messages
    pub messages: MessageStore,
    /// Configuration the server was started with
    pub config: ServerConfig,
}

impl AppState {
    /// Create empty stores from `config`.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            files: FileStore::new(&config.store),
            messages: MessageStore::new(&config.store),
            config,
        }
    }

    /// Build state around existing stores (tests inject clocks this way).
    pub fn with_stores(config: ServerConfig, files: FileStore, messages: MessageStore) -> Self {
        Self {
            files,
            messages,
            config,
        }
    }

    /// Start one expiry sweeper per store.
    pub fn spawn_sweepers(&self) -> Vec<SweeperHandle> {
        let period = self.config.store.sweep_interval();
        vec![
            sweeper::spawn(self.files.clone(), period),
            sweeper::spawn(self.messages.clone(), period),
        ]
    }

    /// Wipe everything. Used on shutdown.
    pub fn wipe_all(&self) -> (usize, usize) {
        (self.files.clear_all(), self.messages.clear_all())
    }
}

impl FromRef<AppState> for FileStore {
    fn from_ref(state: &AppState) -> Self {
        state.files.clone()
    }
}

impl FromRef<AppState> for MessageStore {
    fn from_ref(state: &AppState) -> Self {
        state.messages.clone()
    }
}
