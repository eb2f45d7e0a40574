//! HTTP route handlers for the web crate.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page (hero + coffee form)
//! GET  /health                 - Health check
//!
//! # Entries (HTMX fragments)
//! POST /entries/add            - Record an entry (returns coffee_form fragment,
//!                                triggers entries-updated)
//! GET  /entries/summary        - Journal summary badge (fragment)
//!
//! # Auth (modal flow)
//! GET  /auth/modal             - Auth modal fragment (?mode=register)
//! POST /auth/login             - Sign in, refresh page on success
//! POST /auth/register          - Create account, refresh page on success
//! POST /auth/logout            - Sign out, redirect home
//! ```

pub mod auth;
pub mod entries;
pub mod home;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, form_rate_limiter};
use crate::state::AppState;

/// Create the entries routes router.
pub fn entries_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(entries::add))
        .route("/summary", get(entries::summary))
        .layer(form_rate_limiter())
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/modal", get(auth::modal))
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
        .layer(auth_rate_limiter())
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Landing page
        .route("/", get(home::home))
        // Entry routes
        .nest("/entries", entries_routes())
        // Auth routes
        .nest("/auth", auth_routes())
}
