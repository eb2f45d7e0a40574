//! Journal entries and the per-user aggregate mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key identifying an [`Entry`] within a user's journal: the estimated
/// consumption instant in milliseconds since the Unix epoch.
///
/// Uniqueness is not enforced. Two entries that resolve to the same
/// millisecond silently collide and the later write wins.
pub type EntryKey = i64;

/// The per-user journal: consumption instant to entry.
///
/// Ordered by key so the journal renders chronologically without sorting.
/// This is also the exact shape of the persisted `users/{uid}` document
/// (JSON object with stringified-millisecond field names).
pub type EntryMap = BTreeMap<EntryKey, Entry>;

/// A single logged coffee.
///
/// Created once on submission and never mutated afterwards. The cost is
/// kept as the raw string the user typed - no numeric coercion or currency
/// validation beyond "non-empty", which the submission workflow enforces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Catalog name of the coffee.
    pub name: String,
    /// What it cost, exactly as entered.
    pub cost: String,
}

impl Entry {
    /// Create a new entry.
    #[must_use]
    pub fn new(name: impl Into<String>, cost: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cost: cost.into(),
        }
    }
}
