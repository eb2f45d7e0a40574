//! Cloud Firestore REST client.
//!
//! # Architecture
//!
//! - Plain REST + JSON against the Firestore v1 API - no gRPC, no SDK
//! - Firestore is the only durable store - NO local database, the site
//!   holds journals in memory and merge-writes every change through here
//! - Writes are non-destructive merges (`updateMask` per field path) so
//!   fields written by other sessions survive
//!
//! # Example
//!
//! ```rust,ignore
//! use caffiend_web::firestore::{DocumentStore, FirestoreClient};
//!
//! let client = FirestoreClient::new(&config.firebase);
//!
//! // Merge one journal entry into the user's document
//! client.merge_fields("users", uid.as_str(), fields).await?;
//!
//! // Read the whole journal back
//! let doc = client.fetch_document("users", uid.as_str()).await?;
//! ```

mod client;
pub mod types;

pub use client::FirestoreClient;

use async_trait::async_trait;
use thiserror::Error;

/// A document's fields as plain JSON, before Firestore value typing.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Errors that can occur when talking to the document store.
#[derive(Debug, Error)]
pub enum FirestoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A document contained a value this client cannot decode.
    #[error("Undecodable value: {0}")]
    Decode(String),
}

/// The remote document store the journal is persisted to.
///
/// One production implementation ([`FirestoreClient`]); tests substitute
/// in-memory doubles to observe or fail writes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Merge `fields` into the document, creating it if absent.
    ///
    /// Fields not named in `fields` are left untouched - this is a union,
    /// not a replacement.
    ///
    /// # Errors
    ///
    /// Returns a store-specific error on network or permission failure.
    async fn merge_fields(
        &self,
        collection: &str,
        document_id: &str,
        fields: JsonMap,
    ) -> Result<(), FirestoreError>;

    /// Fetch the document's fields, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a store-specific error on network or permission failure.
    async fn fetch_document(
        &self,
        collection: &str,
        document_id: &str,
    ) -> Result<Option<JsonMap>, FirestoreError>;
}
