//! Firestore REST client implementation.
//!
//! Documents live under
//! `projects/{project}/databases/{database}/documents/{collection}/{id}`.
//! Merges are expressed as a `PATCH` with one `updateMask.fieldPaths`
//! parameter per written field, which also creates the document when it
//! does not exist yet.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::FirebaseConfig;

use super::types::{decode_fields, encode_fields, quote_field_path};
use super::{DocumentStore, FirestoreError, JsonMap};

/// Firestore REST API base URL.
const BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Client for the Firestore REST API.
///
/// Cheaply cloneable; all clones share one HTTP connection pool.
#[derive(Clone)]
pub struct FirestoreClient {
    inner: Arc<FirestoreClientInner>,
}

struct FirestoreClientInner {
    client: reqwest::Client,
    documents_url: String,
    api_key: String,
}

/// The subset of a Firestore document response this client reads.
#[derive(Debug, Deserialize)]
struct DocumentBody {
    #[serde(default)]
    fields: Option<JsonMap>,
}

/// The shape of a Firestore error response body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl FirestoreClient {
    /// Create a new Firestore client for the configured project.
    #[must_use]
    pub fn new(config: &FirebaseConfig) -> Self {
        let documents_url = format!(
            "{BASE_URL}/projects/{}/databases/{}/documents",
            config.project_id, config.database_id
        );

        Self {
            inner: Arc::new(FirestoreClientInner {
                client: reqwest::Client::new(),
                documents_url,
                api_key: config.web_api_key.expose_secret().to_string(),
            }),
        }
    }

    /// Full URL of a document within a collection.
    fn document_url(&self, collection: &str, document_id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.inner.documents_url,
            collection,
            urlencoding::encode(document_id)
        )
    }

    /// Check that the Firestore endpoint is reachable.
    ///
    /// Any HTTP response - including a 403 or 404 for the probe document -
    /// proves reachability; only transport failures count as down.
    ///
    /// # Errors
    ///
    /// Returns [`FirestoreError::Http`] if no response arrives.
    pub async fn ping(&self) -> Result<(), FirestoreError> {
        let url = self.document_url("users", "__health__");
        self.inner
            .client
            .get(&url)
            .query(&[("key", self.inner.api_key.as_str())])
            .send()
            .await?;
        Ok(())
    }

    /// Turn a non-success response into a [`FirestoreError::Api`].
    async fn api_error(response: reqwest::Response) -> FirestoreError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        // The API wraps failures in {"error": {"message": ...}}; fall back
        // to a truncated raw body when it does not.
        let message = serde_json::from_str::<ErrorBody>(&body).map_or_else(
            |_| body.chars().take(200).collect::<String>(),
            |parsed| parsed.error.message,
        );

        FirestoreError::Api { status, message }
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn merge_fields(
        &self,
        collection: &str,
        document_id: &str,
        fields: JsonMap,
    ) -> Result<(), FirestoreError> {
        let url = self.document_url(collection, document_id);

        // One mask entry per top-level field keeps the merge non-destructive:
        // unmasked fields are left exactly as other sessions wrote them.
        let mask: Vec<(&str, String)> = fields
            .keys()
            .map(|name| ("updateMask.fieldPaths", quote_field_path(name)))
            .collect();

        let body = json!({ "fields": encode_fields(&fields) });

        debug!(collection, document_id, fields = fields.len(), "merge write");

        let response = self
            .inner
            .client
            .patch(&url)
            .query(&[("key", self.inner.api_key.as_str())])
            .query(&mask)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        Ok(())
    }

    async fn fetch_document(
        &self,
        collection: &str,
        document_id: &str,
    ) -> Result<Option<JsonMap>, FirestoreError> {
        let url = self.document_url(collection, document_id);

        let response = self
            .inner
            .client
            .get(&url)
            .query(&[("key", self.inner.api_key.as_str())])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let document: DocumentBody = response.json().await?;
        match document.fields {
            Some(fields) => Ok(Some(decode_fields(&fields)?)),
            // A document can exist with no fields at all
            None => Ok(Some(JsonMap::new())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn test_config() -> FirebaseConfig {
        FirebaseConfig {
            project_id: "caffiend-test".to_string(),
            database_id: "(default)".to_string(),
            web_api_key: SecretString::from("AIzaTestKey123"),
        }
    }

    #[test]
    fn test_document_url_shape() {
        let client = FirestoreClient::new(&test_config());
        assert_eq!(
            client.document_url("users", "abc123"),
            "https://firestore.googleapis.com/v1/projects/caffiend-test/databases/(default)/documents/users/abc123"
        );
    }

    #[test]
    fn test_document_url_encodes_ids() {
        // Provider uids are opaque; never trust them to be path-safe
        let client = FirestoreClient::new(&test_config());
        let url = client.document_url("users", "a/b");
        assert!(url.ends_with("/users/a%2Fb"));
    }

    #[test]
    fn test_error_body_parsing() {
        let body = r#"{"error": {"code": 403, "message": "Missing or insufficient permissions.", "status": "PERMISSION_DENIED"}}"#;
        let parsed: ErrorBody = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.message, "Missing or insufficient permissions.");
    }
}
