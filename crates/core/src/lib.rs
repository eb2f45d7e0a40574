//! Caffiend Core - Shared types library.
//!
//! This crate provides common types used across all Caffiend components:
//! - `web` - Public-facing caffeine-tracking site
//! - `integration-tests` - End-to-end tests against a running server
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no session state. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - The coffee catalog, journal entries and their timestamp
//!   keys, time-since-consumption arithmetic, and newtype wrappers for
//!   user ids and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
