//! The session-scoped journal store and the entry recording workflow.
//!
//! Each signed-in user has one journal: a mapping from estimated
//! consumption instant to logged coffee. The journal is published as an
//! `Arc`-shared snapshot; recording replaces the whole snapshot instead of
//! mutating in place, so a reader holding the previous `Arc` never sees a
//! half-applied change and upstream code can detect changes by pointer
//! identity.
//!
//! Recording is optimistic: the new snapshot is published before the
//! remote merge-write resolves. What happens when that write fails is a
//! deployment policy ([`WriteFailurePolicy`]), not a hard-coded behavior.

use std::sync::Arc;
use std::time::Duration;

use caffiend_core::{Entry, EntryKey, EntryMap, MinuteUnit, TimeSince, UserId};
use chrono::Utc;
use moka::sync::Cache;
use serde_json::json;
use tracing::{debug, error};

use crate::firestore::{DocumentStore, JsonMap};

/// Firestore collection holding one journal document per user.
pub const USERS_COLLECTION: &str = "users";

/// Journals kept in memory at once.
const JOURNAL_CACHE_CAPACITY: u64 = 10_000;

/// Idle time before a journal is dropped from memory.
///
/// Dropping is safe at any point: the journal is reseeded from the remote
/// document on the next sign-in.
const JOURNAL_IDLE: Duration = Duration::from_secs(24 * 60 * 60);

/// What happens to the optimistic local update when the remote write fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteFailurePolicy {
    /// Keep the local update. Local and remote state may diverge until the
    /// next successful write; the user sees their entry either way. This
    /// is the longstanding behavior.
    #[default]
    Keep,
    /// Revert the journal to its pre-submission snapshot, so the journal
    /// only ever shows entries the store accepted.
    Rollback,
}

impl std::str::FromStr for WriteFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keep" => Ok(Self::Keep),
            "rollback" => Ok(Self::Rollback),
            other => Err(format!(
                "unknown write-failure policy '{other}' (expected 'keep' or 'rollback')"
            )),
        }
    }
}

/// The outcome of recording an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedEntry {
    /// The journal key the entry was filed under.
    pub key: EntryKey,
    /// Whether the remote merge-write succeeded.
    pub persisted: bool,
}

/// In-memory store of per-user journals.
///
/// Single writer per user (their own session); concurrent readers hold
/// `Arc` snapshots. Cheaply cloneable.
#[derive(Clone)]
pub struct JournalStore {
    journals: Cache<UserId, Arc<EntryMap>>,
}

impl JournalStore {
    /// Create an empty journal store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            journals: Cache::builder()
                .max_capacity(JOURNAL_CACHE_CAPACITY)
                .time_to_idle(JOURNAL_IDLE)
                .build(),
        }
    }

    /// The user's current journal snapshot, if one is loaded.
    #[must_use]
    pub fn current(&self, uid: &UserId) -> Option<Arc<EntryMap>> {
        self.journals.get(uid)
    }

    /// Publish a new journal snapshot for the user.
    pub fn publish(&self, uid: &UserId, journal: EntryMap) {
        self.journals.insert(uid.clone(), Arc::new(journal));
    }

    /// Re-publish a previously taken snapshot (rollback path).
    pub fn restore(&self, uid: &UserId, journal: Arc<EntryMap>) {
        self.journals.insert(uid.clone(), journal);
    }

    /// Drop the user's journal from memory (sign-out, rollback-to-nothing).
    pub fn clear(&self, uid: &UserId) {
        self.journals.invalidate(uid);
    }
}

impl Default for JournalStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Record a coffee consumed `elapsed` before now.
///
/// Never fails: a remote write failure is logged and resolved through
/// `policy`, and the caller learns about it only via
/// [`RecordedEntry::persisted`].
pub async fn record_entry(
    journal: &JournalStore,
    store: &dyn DocumentStore,
    uid: &UserId,
    entry: Entry,
    elapsed: TimeSince,
    unit: MinuteUnit,
    policy: WriteFailurePolicy,
) -> RecordedEntry {
    let now_millis = Utc::now().timestamp_millis();
    record_entry_at(journal, store, uid, entry, elapsed, unit, policy, now_millis).await
}

#[allow(clippy::too_many_arguments)]
async fn record_entry_at(
    journal: &JournalStore,
    store: &dyn DocumentStore,
    uid: &UserId,
    entry: Entry,
    elapsed: TimeSince,
    unit: MinuteUnit,
    policy: WriteFailurePolicy,
    now_millis: i64,
) -> RecordedEntry {
    // Full copy of the current snapshot; the prior Arc stays valid for any
    // reader that already holds it.
    let prior = journal.current(uid);
    let mut next = prior.as_deref().cloned().unwrap_or_default();

    let key = elapsed.entry_key(now_millis, unit);

    // Last write wins on key collision: two submissions resolving to the
    // same millisecond silently overwrite.
    next.insert(key, entry.clone());
    journal.publish(uid, next);

    debug!(key, name = %entry.name, cost = %entry.cost, "journal entry recorded");

    match store
        .merge_fields(USERS_COLLECTION, uid.as_str(), entry_fields(key, &entry))
        .await
    {
        Ok(()) => RecordedEntry {
            key,
            persisted: true,
        },
        Err(e) => {
            error!(error = %e, key, "failed to persist journal entry");
            if policy == WriteFailurePolicy::Rollback {
                match prior {
                    Some(snapshot) => journal.restore(uid, snapshot),
                    None => journal.clear(uid),
                }
            }
            RecordedEntry {
                key,
                persisted: false,
            }
        }
    }
}

/// The partial document for one entry: `{"<key>": {"name", "cost"}}`.
#[must_use]
pub fn entry_fields(key: EntryKey, entry: &Entry) -> JsonMap {
    let mut fields = JsonMap::new();
    fields.insert(
        key.to_string(),
        json!({ "name": entry.name, "cost": entry.cost }),
    );
    fields
}

/// Decode a fetched `users/{uid}` document into a journal.
///
/// Fields that are not millisecond-keyed entries are skipped - the
/// document is merged into by this application only, but being lenient
/// here means a hand-edited or older document never blocks sign-in.
#[must_use]
pub fn journal_from_fields(fields: &JsonMap) -> EntryMap {
    fields
        .iter()
        .filter_map(|(name, value)| {
            let key: EntryKey = name.parse().ok()?;
            let entry: Entry = serde_json::from_value(value.clone()).ok()?;
            Some((key, entry))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::firestore::FirestoreError;

    use super::*;

    /// In-memory document store double with a switchable failure mode.
    #[derive(Default)]
    struct MemoryStore {
        documents: Mutex<HashMap<String, JsonMap>>,
        writes: AtomicUsize,
        failing: bool,
    }

    impl MemoryStore {
        fn failing() -> Self {
            Self {
                failing: true,
                ..Self::default()
            }
        }

        fn document(&self, collection: &str, id: &str) -> Option<JsonMap> {
            self.documents
                .lock()
                .unwrap()
                .get(&format!("{collection}/{id}"))
                .cloned()
        }

        fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DocumentStore for MemoryStore {
        async fn merge_fields(
            &self,
            collection: &str,
            document_id: &str,
            fields: JsonMap,
        ) -> Result<(), FirestoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.failing {
                return Err(FirestoreError::Api {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            let mut documents = self.documents.lock().unwrap();
            let document = documents
                .entry(format!("{collection}/{document_id}"))
                .or_default();
            for (name, value) in fields {
                document.insert(name, value);
            }
            Ok(())
        }

        async fn fetch_document(
            &self,
            collection: &str,
            document_id: &str,
        ) -> Result<Option<JsonMap>, FirestoreError> {
            Ok(self.document(collection, document_id))
        }
    }

    fn uid() -> UserId {
        UserId::new("user-1")
    }

    const NOW: i64 = 1_754_000_000_000;

    #[tokio::test]
    async fn test_record_publishes_and_persists() {
        let journal = JournalStore::new();
        let store = MemoryStore::default();

        let recorded = record_entry_at(
            &journal,
            &store,
            &uid(),
            Entry::new("Espresso", "3.25"),
            TimeSince::default(),
            MinuteUnit::Minutes,
            WriteFailurePolicy::Keep,
            NOW,
        )
        .await;

        assert!(recorded.persisted);
        assert_eq!(recorded.key, NOW);

        // Local journal gained exactly one entry at the key
        let snapshot = journal.current(&uid()).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get(&NOW).unwrap(), &Entry::new("Espresso", "3.25"));

        // Remote document round-trips the same pair
        let document = store.document(USERS_COLLECTION, "user-1").unwrap();
        assert_eq!(journal_from_fields(&document), *snapshot);
    }

    #[tokio::test]
    async fn test_record_subtracts_elapsed_offset() {
        let journal = JournalStore::new();
        let store = MemoryStore::default();

        let recorded = record_entry_at(
            &journal,
            &store,
            &uid(),
            Entry::new("Latte", "4.50"),
            TimeSince::new(2, 30).unwrap(),
            MinuteUnit::Minutes,
            WriteFailurePolicy::Keep,
            NOW,
        )
        .await;

        // 2h in ms plus 30min in ms behind the wall clock
        assert_eq!(recorded.key, NOW - 7_200_000 - 1_800_000);
    }

    #[tokio::test]
    async fn test_record_legacy_minute_unit() {
        let journal = JournalStore::new();
        let store = MemoryStore::default();

        let recorded = record_entry_at(
            &journal,
            &store,
            &uid(),
            Entry::new("Latte", "4.50"),
            TimeSince::new(2, 30).unwrap(),
            MinuteUnit::LegacySeconds,
            WriteFailurePolicy::Keep,
            NOW,
        )
        .await;

        assert_eq!(recorded.key, NOW - 7_200_000 - 108_000);
    }

    #[tokio::test]
    async fn test_colliding_keys_overwrite_silently() {
        let journal = JournalStore::new();
        let store = MemoryStore::default();

        for cost in ["3.00", "9.99"] {
            record_entry_at(
                &journal,
                &store,
                &uid(),
                Entry::new("Espresso", cost),
                TimeSince::default(),
                MinuteUnit::Minutes,
                WriteFailurePolicy::Keep,
                NOW,
            )
            .await;
        }

        let snapshot = journal.current(&uid()).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get(&NOW).unwrap().cost, "9.99");
    }

    #[tokio::test]
    async fn test_distinct_instants_get_distinct_keys() {
        let journal = JournalStore::new();
        let store = MemoryStore::default();

        for now in [NOW, NOW + 4_321] {
            record_entry_at(
                &journal,
                &store,
                &uid(),
                Entry::new("Espresso", "3.25"),
                TimeSince::new(1, 15).unwrap(),
                MinuteUnit::Minutes,
                WriteFailurePolicy::Keep,
                now,
            )
            .await;
        }

        let snapshot = journal.current(&uid()).unwrap();
        let keys: Vec<EntryKey> = snapshot.keys().copied().collect();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[1] - keys[0], 4_321);
    }

    #[tokio::test]
    async fn test_merge_preserves_other_document_fields() {
        let journal = JournalStore::new();
        let store = MemoryStore::default();

        // An entry written by another session already in the document
        let mut existing = JsonMap::new();
        existing.insert(
            "1700000000000".to_string(),
            json!({ "name": "Mocha", "cost": "5.00" }),
        );
        store
            .merge_fields(USERS_COLLECTION, "user-1", existing)
            .await
            .unwrap();

        record_entry_at(
            &journal,
            &store,
            &uid(),
            Entry::new("Espresso", "3.25"),
            TimeSince::default(),
            MinuteUnit::Minutes,
            WriteFailurePolicy::Keep,
            NOW,
        )
        .await;

        let document = store.document(USERS_COLLECTION, "user-1").unwrap();
        let merged = journal_from_fields(&document);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get(&1_700_000_000_000).unwrap().name, "Mocha");
        assert_eq!(merged.get(&NOW).unwrap().name, "Espresso");
    }

    #[tokio::test]
    async fn test_write_failure_keep_policy_retains_optimistic_update() {
        let journal = JournalStore::new();
        let store = MemoryStore::failing();

        let recorded = record_entry_at(
            &journal,
            &store,
            &uid(),
            Entry::new("Espresso", "3.25"),
            TimeSince::default(),
            MinuteUnit::Minutes,
            WriteFailurePolicy::Keep,
            NOW,
        )
        .await;

        assert!(!recorded.persisted);
        assert_eq!(store.write_count(), 1);

        // Local and remote now diverge, by policy
        let snapshot = journal.current(&uid()).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(store.document(USERS_COLLECTION, "user-1").is_none());
    }

    #[tokio::test]
    async fn test_write_failure_rollback_policy_restores_prior_snapshot() {
        let journal = JournalStore::new();

        let mut seeded = EntryMap::new();
        seeded.insert(NOW - 60_000, Entry::new("Cortado", "3.75"));
        journal.publish(&uid(), seeded.clone());

        let store = MemoryStore::failing();
        let recorded = record_entry_at(
            &journal,
            &store,
            &uid(),
            Entry::new("Espresso", "3.25"),
            TimeSince::default(),
            MinuteUnit::Minutes,
            WriteFailurePolicy::Rollback,
            NOW,
        )
        .await;

        assert!(!recorded.persisted);
        let snapshot = journal.current(&uid()).unwrap();
        assert_eq!(*snapshot, seeded);
    }

    #[tokio::test]
    async fn test_write_failure_rollback_with_no_prior_journal() {
        let journal = JournalStore::new();
        let store = MemoryStore::failing();

        record_entry_at(
            &journal,
            &store,
            &uid(),
            Entry::new("Espresso", "3.25"),
            TimeSince::default(),
            MinuteUnit::Minutes,
            WriteFailurePolicy::Rollback,
            NOW,
        )
        .await;

        assert!(journal.current(&uid()).is_none());
    }

    #[test]
    fn test_journal_from_fields_skips_foreign_fields() {
        let mut fields = JsonMap::new();
        fields.insert(
            "1754000000000".to_string(),
            json!({ "name": "Espresso", "cost": "3.25" }),
        );
        fields.insert("displayName".to_string(), json!("Kai"));
        fields.insert("1754000000001".to_string(), json!("not an entry"));

        let journal = journal_from_fields(&fields);
        assert_eq!(journal.len(), 1);
        assert!(journal.contains_key(&1_754_000_000_000));
    }

    #[test]
    fn test_write_failure_policy_parsing() {
        assert_eq!(
            "keep".parse::<WriteFailurePolicy>().unwrap(),
            WriteFailurePolicy::Keep
        );
        assert_eq!(
            "rollback".parse::<WriteFailurePolicy>().unwrap(),
            WriteFailurePolicy::Rollback
        );
        assert!("retry".parse::<WriteFailurePolicy>().is_err());
    }
}
