//! Identity Toolkit API client for account management.
//!
//! Authentication is fully delegated to the hosted identity provider:
//! this client exchanges an email/password pair for the provider's stable
//! user id. No credentials are stored or verified locally.

use caffiend_core::{Email, UserId};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::config::FirebaseConfig;

/// Identity Toolkit API base URL.
const BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Errors that can occur when interacting with the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The email/password pair was rejected.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("Email already in use")]
    EmailInUse,

    /// The provider rejected the password as too weak.
    #[error("Weak password: {0}")]
    WeakPassword(String),

    /// The provider is throttling this client.
    #[error("Too many attempts, try again later")]
    TooManyAttempts,

    /// Any other error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A successfully authenticated account.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The provider's stable user id.
    pub uid: UserId,
    /// The account email as the provider canonicalized it.
    pub email: Email,
}

/// The fields this client reads from a sign-in/sign-up response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: String,
}

/// The shape of an Identity Toolkit error response body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Identity Toolkit API client.
#[derive(Clone)]
pub struct IdentityClient {
    client: reqwest::Client,
    api_key: String,
}

impl IdentityClient {
    /// Create a new identity client for the configured project.
    #[must_use]
    pub fn new(config: &FirebaseConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.web_api_key.expose_secret().to_string(),
        }
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::EmailInUse`] if the email is taken and
    /// [`IdentityError::WeakPassword`] if the provider rejects the password.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, IdentityError> {
        self.account_request("accounts:signUp", email, password)
            .await
    }

    /// Exchange an email/password pair for the account identity.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidCredentials`] when the pair is
    /// rejected, without distinguishing unknown emails from bad passwords.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, IdentityError> {
        self.account_request("accounts:signInWithPassword", email, password)
            .await
    }

    async fn account_request(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, IdentityError> {
        let url = format!("{BASE_URL}/{endpoint}");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_error_response(status.as_u16(), &body));
        }

        let account: AccountResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::Parse(e.to_string()))?;

        let email = Email::parse(&account.email)
            .map_err(|e| IdentityError::Parse(format!("provider returned bad email: {e}")))?;

        Ok(AuthUser {
            uid: UserId::new(account.local_id),
            email,
        })
    }
}

/// Map an Identity Toolkit error body to a typed error.
///
/// The provider signals the cause through an upper-snake message code;
/// `WEAK_PASSWORD` carries a human-readable suffix after " : ".
fn map_error_response(status: u16, body: &str) -> IdentityError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_default();

    match message.split(" : ").next().unwrap_or_default() {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            IdentityError::InvalidCredentials
        }
        "EMAIL_EXISTS" => IdentityError::EmailInUse,
        "WEAK_PASSWORD" => {
            let detail = message
                .split_once(" : ")
                .map_or("password rejected", |(_, detail)| detail);
            IdentityError::WeakPassword(detail.to_string())
        }
        "TOO_MANY_ATTEMPTS_TRY_LATER" => IdentityError::TooManyAttempts,
        _ => IdentityError::Api {
            status,
            message: if message.is_empty() {
                body.chars().take(200).collect()
            } else {
                message
            },
        },
    }
}
