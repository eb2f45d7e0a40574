//! Authentication route handlers.
//!
//! Sign-in and registration delegate entirely to the hosted identity
//! provider; this module only moves its verdict into the session. The
//! modal is presentation-only and arrives as an HTMX fragment swapped
//! into the page's portal element.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use caffiend_core::{Email, EntryMap};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::firestore::DocumentStore;
use crate::journal::{USERS_COLLECTION, journal_from_fields};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::IdentityError;
use crate::state::AppState;

// =============================================================================
// Form and Query Types
// =============================================================================

/// Email/password credentials from the modal form.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub email: String,
    pub password: String,
}

/// Query parameters for the modal fragment.
#[derive(Debug, Deserialize)]
pub struct ModalQuery {
    /// `register` switches the modal to account creation.
    pub mode: Option<String>,
}

// =============================================================================
// View Types and Templates
// =============================================================================

/// Render state for the auth modal.
#[derive(Debug, Clone, Default)]
pub struct AuthModalView {
    /// Whether the modal offers account creation instead of sign-in.
    pub registering: bool,
    /// Provider rejection to show inline.
    pub error: Option<String>,
    /// Previously entered email, preserved across a rejection.
    pub email: String,
}

/// Auth modal fragment template (HTMX, swapped into the portal).
#[derive(Template, WebTemplate)]
#[template(path = "partials/auth_modal.html")]
pub struct AuthModalTemplate {
    pub auth: AuthModalView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the auth modal fragment.
///
/// GET /auth/modal
pub async fn modal(Query(query): Query<ModalQuery>) -> impl IntoResponse {
    AuthModalTemplate {
        auth: AuthModalView {
            registering: query.mode.as_deref() == Some("register"),
            ..AuthModalView::default()
        },
    }
}

/// Handle sign-in from the modal.
///
/// POST /auth/login
///
/// On success the user's journal is seeded from their Firestore document,
/// the session is established, and the page refreshes. On rejection the
/// modal re-renders with the provider's verdict.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Response {
    authenticate(&state, &session, &form, false).await
}

/// Handle account creation from the modal.
///
/// POST /auth/register
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Response {
    authenticate(&state, &session, &form, true).await
}

/// Handle logout.
///
/// POST /auth/logout
///
/// Drops the cached journal along with the session; it reseeds from
/// Firestore on the next sign-in.
#[instrument(skip(state, session, user))]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Response {
    state.journal().clear(&user.uid);

    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }
    clear_sentry_user();

    Redirect::to("/").into_response()
}

/// Shared sign-in/sign-up flow behind both modal forms.
async fn authenticate(
    state: &AppState,
    session: &Session,
    form: &CredentialsForm,
    registering: bool,
) -> Response {
    let rerender = |message: String| {
        AuthModalTemplate {
            auth: AuthModalView {
                registering,
                error: Some(message),
                email: form.email.clone(),
            },
        }
        .into_response()
    };

    // Catch obviously broken addresses before bothering the provider
    if Email::parse(form.email.trim()).is_err() {
        return rerender("Please enter a valid email address.".to_string());
    }
    if form.password.is_empty() {
        return rerender("Please enter a password.".to_string());
    }

    let email = form.email.trim();
    let result = if registering {
        state.identity().sign_up(email, &form.password).await
    } else {
        state.identity().sign_in(email, &form.password).await
    };

    let auth_user = match result {
        Ok(auth_user) => auth_user,
        Err(e) => {
            tracing::warn!(error = %e, registering, "Authentication failed");
            return rerender(rejection_message(&e));
        }
    };

    // Seed the journal from the user's document so their history is
    // visible the moment the page refreshes. A fetch failure is not fatal:
    // they are still signed in, just starting from an unloaded journal.
    match state
        .firestore()
        .fetch_document(USERS_COLLECTION, auth_user.uid.as_str())
        .await
    {
        Ok(Some(fields)) => state
            .journal()
            .publish(&auth_user.uid, journal_from_fields(&fields)),
        Ok(None) => state.journal().publish(&auth_user.uid, EntryMap::new()),
        Err(e) => tracing::warn!(error = %e, "Failed to load journal on sign-in"),
    }

    let user = CurrentUser {
        uid: auth_user.uid,
        email: auth_user.email,
    };

    if let Err(e) = set_current_user(session, &user).await {
        tracing::error!("Failed to set session: {e}");
        return rerender("Something went wrong. Please try again.".to_string());
    }

    set_sentry_user(&user.uid, Some(user.email.as_str()));
    add_breadcrumb(
        "auth",
        if registering { "Account created" } else { "Signed in" },
        None,
    );

    // Full-page refresh picks up the signed-in header and seeded journal
    (AppendHeaders([("HX-Refresh", "true")]), StatusCode::OK).into_response()
}

/// User-facing message for a provider rejection.
fn rejection_message(error: &IdentityError) -> String {
    match error {
        IdentityError::InvalidCredentials => "Invalid email or password.".to_string(),
        IdentityError::EmailInUse => "An account with this email already exists.".to_string(),
        IdentityError::WeakPassword(detail) => detail.clone(),
        IdentityError::TooManyAttempts => {
            "Too many attempts. Please wait a moment and try again.".to_string()
        }
        _ => "Something went wrong. Please try again.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_messages_stay_generic_for_unknown_errors() {
        let message = rejection_message(&IdentityError::Api {
            status: 500,
            message: "internal stack trace".to_string(),
        });
        assert!(!message.contains("stack trace"));
    }

    #[test]
    fn test_rejection_message_weak_password_passes_detail() {
        let message = rejection_message(&IdentityError::WeakPassword(
            "Password should be at least 6 characters".to_string(),
        ));
        assert_eq!(message, "Password should be at least 6 characters");
    }
}
