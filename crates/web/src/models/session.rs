//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use caffiend_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the signed-in user.
/// The uid doubles as the journal document id (`users/{uid}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// The identity provider's stable user id.
    pub uid: UserId,
    /// The account email, shown in the header.
    pub email: Email,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";
}
