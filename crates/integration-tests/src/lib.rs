//! Integration tests for Caffiend.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the site against a Firebase project or emulator
//! cargo run -p caffiend-web
//!
//! # Run integration tests
//! cargo test -p caffiend-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `entries_flow` - The logging form and its HTMX fragments
//! - `auth_flow` - The auth modal and session lifecycle
//!
//! Tests are `#[ignore]`d by default because they need a running server
//! and live Firebase credentials.
