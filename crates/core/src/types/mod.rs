//! Core types for Caffiend.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod email;
pub mod entry;
pub mod id;
pub mod time_since;

pub use catalog::{COFFEE_MENU, CoffeeOption, QUICK_SELECT_COUNT, quick_select};
pub use email::{Email, EmailError};
pub use entry::{Entry, EntryKey, EntryMap};
pub use id::*;
pub use time_since::{MinuteUnit, TimeSince, TimeSinceError};
