//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::CaffiendConfig;
use crate::firestore::FirestoreClient;
use crate::journal::JournalStore;
use crate::services::IdentityClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the hosted-service clients and the journal store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: CaffiendConfig,
    firestore: FirestoreClient,
    identity: IdentityClient,
    journal: JournalStore,
}

impl AppState {
    /// Create a new application state from configuration.
    #[must_use]
    pub fn new(config: CaffiendConfig) -> Self {
        let firestore = FirestoreClient::new(&config.firebase);
        let identity = IdentityClient::new(&config.firebase);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                firestore,
                identity,
                journal: JournalStore::new(),
            }),
        }
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &CaffiendConfig {
        &self.inner.config
    }

    /// Get a reference to the Firestore client.
    #[must_use]
    pub fn firestore(&self) -> &FirestoreClient {
        &self.inner.firestore
    }

    /// Get a reference to the identity provider client.
    #[must_use]
    pub fn identity(&self) -> &IdentityClient {
        &self.inner.identity
    }

    /// Get a reference to the per-user journal store.
    #[must_use]
    pub fn journal(&self) -> &JournalStore {
        &self.inner.journal
    }
}
