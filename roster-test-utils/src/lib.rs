//! ROSTER Test Utilities
//!
//! Centralized test infrastructure for the ROSTER workspace:
//! - Proptest generators for keys, policies and record sets
//! - Test fixtures for the colors enumeration
//! - Custom assertions for ROSTER-specific errors
//! - Tracing setup for tests

// Re-export store and cache types from their source crate
pub use roster_storage::{
    EnumerationCache, InMemoryRecordStore, PersistenceHooks, RecordStore, SaveOutcome,
    ValueSemantics,
};

// Re-export core types for convenience
pub use roster_core::{
    CacheError, Candidate, ConfigError, EnumId, EnumeratedValue, EnumerationConfig,
    EnumerationRecord, EnumerationSet, FailurePolicy, FilterExpr, LookupError, LookupKey,
    OrderExpr, Record, RecordErrors, RosterError, RosterResult, StorageError, Symbol,
    ValidationError,
};

use serde_json::Value;
use std::sync::Arc;

/// Store of schema-less records.
pub type RecordTable = InMemoryRecordStore<Record>;

/// Cache over a [`RecordTable`].
pub type RecordCache = EnumerationCache<RecordTable>;

// ============================================================================
// TYPED RECORD
// ============================================================================

/// A typed enumeration record whose name lives in the `label` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Color {
    pub id: EnumId,
    pub label: String,
    pub hex: String,
}

impl Color {
    pub fn new(id: EnumId, label: impl Into<String>, hex: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            hex: hex.into(),
        }
    }
}

impl EnumerationRecord for Color {
    fn type_name() -> &'static str {
        "Color"
    }

    fn id(&self) -> EnumId {
        self.id
    }

    fn read_attribute(&self, column: &str) -> Option<Value> {
        match column {
            "id" => Some(Value::from(self.id)),
            "label" => Some(Value::from(self.label.clone())),
            "hex" => Some(Value::from(self.hex.clone())),
            _ => None,
        }
    }
}

// ============================================================================
// TRACING
// ============================================================================

/// Install a `tracing` subscriber for tests, filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating ROSTER inputs.

    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    /// Generate any failure policy.
    pub fn arb_failure_policy() -> impl Strategy<Value = FailurePolicy> {
        proptest::sample::select(FailurePolicy::ALL.to_vec())
    }

    /// Generate a lowercase enumeration name.
    pub fn arb_name() -> impl Strategy<Value = String> {
        "[a-z]{1,10}"
    }

    /// Generate a lookup key of any kind.
    pub fn arb_lookup_key() -> impl Strategy<Value = LookupKey> {
        prop_oneof![
            arb_name().prop_map(LookupKey::ByName),
            arb_name().prop_map(|n| LookupKey::ByNameSymbol(Symbol::new(n))),
            (-1_000i64..1_000).prop_map(LookupKey::ById),
            Just(LookupKey::None),
        ]
    }

    /// Generate records with unique ids and unique names, in id order.
    pub fn arb_record_set(max: usize) -> impl Strategy<Value = Vec<Record>> {
        proptest::collection::btree_set(arb_name(), 0..=max).prop_flat_map(|names| {
            let len = names.len();
            (
                Just(names),
                proptest::collection::btree_set(1i64..10_000, len..=len),
            )
                .prop_map(|(names, ids): (BTreeSet<String>, BTreeSet<i64>)| {
                    ids.into_iter()
                        .zip(names)
                        .map(|(id, name)| Record::named(id, name))
                        .collect()
                })
        })
    }

    /// Generate arbitrary JSON scalars and small containers.
    pub fn arb_json_key() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            (-1_000i64..1_000).prop_map(Value::from),
            (-1_000.0f64..1_000.0).prop_map(Value::from),
            arb_name().prop_map(Value::from),
            proptest::collection::vec(arb_name().prop_map(Value::from), 0..3).prop_map(Value::from),
        ]
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;

    /// RED (1), GREEN (2) and BLUE (3), each with a `position` attribute.
    pub fn color_records() -> Vec<Record> {
        vec![
            Record::named(1, "red").with_attribute("position", 2),
            Record::named(2, "green").with_attribute("position", 3),
            Record::named(3, "blue").with_attribute("position", 1),
        ]
    }

    /// The same colors as typed [`Color`] records.
    pub fn typed_colors() -> Vec<Color> {
        vec![
            Color::new(1, "red", "#ff0000"),
            Color::new(2, "green", "#00ff00"),
            Color::new(3, "blue", "#0000ff"),
        ]
    }

    /// A store of `records` backed by the `colors` table.
    pub fn record_store(records: Vec<Record>) -> Arc<RecordTable> {
        match InMemoryRecordStore::with_records("colors", records) {
            Ok(store) => Arc::new(store),
            Err(e) => panic!("Fixture records must have unique ids: {e}"),
        }
    }

    /// A cache over `store` with its hooks registered on the store.
    pub fn attached_cache<R: EnumerationRecord>(
        store: &Arc<InMemoryRecordStore<R>>,
        config: EnumerationConfig,
    ) -> Arc<EnumerationCache<InMemoryRecordStore<R>>> {
        let cache = match EnumerationCache::new(Arc::clone(store), config) {
            Ok(cache) => Arc::new(cache),
            Err(e) => panic!("Fixture config must be valid: {e}"),
        };
        if let Err(e) = store.register_hooks(cache.clone()) {
            panic!("Failed to register cache hooks: {e}");
        }
        cache
    }

    /// Colors store plus an attached cache with `config`.
    pub fn color_cache(config: EnumerationConfig) -> (Arc<RecordTable>, Arc<RecordCache>) {
        let store = record_store(color_records());
        let cache = attached_cache(&store, config);
        (store, cache)
    }

    /// Typed colors store plus an attached cache keyed by `label`.
    pub fn typed_color_cache(
        policy: FailurePolicy,
    ) -> (
        Arc<InMemoryRecordStore<Color>>,
        Arc<EnumerationCache<InMemoryRecordStore<Color>>>,
    ) {
        let store = match InMemoryRecordStore::with_records("colors", typed_colors()) {
            Ok(store) => Arc::new(store),
            Err(e) => panic!("Fixture records must have unique ids: {e}"),
        };
        let config = EnumerationConfig::new()
            .with_name_column("label")
            .with_failure_policy(policy);
        let cache = attached_cache(&store, config);
        (store, cache)
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Custom assertion functions for ROSTER-specific validation.

    use super::*;

    /// Assert that a RosterResult is a NotFound lookup error for `key`.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &RosterResult<T>, key: &str) {
        match result {
            Err(RosterError::Lookup(LookupError::NotFound { key: k, .. })) => {
                assert_eq!(k, key, "Wrong key in NotFound error");
            }
            other => panic!("Expected NotFound error for {}, got: {:?}", key, other),
        }
    }

    /// Assert that a RosterResult is a MissingNameColumn error for `column`.
    #[track_caller]
    pub fn assert_missing_name_column<T: std::fmt::Debug>(result: &RosterResult<T>, column: &str) {
        match result {
            Err(RosterError::Lookup(LookupError::MissingNameColumn { column: c, .. })) => {
                assert_eq!(c, column, "Wrong column in MissingNameColumn error");
            }
            other => panic!("Expected MissingNameColumn for {}, got: {:?}", column, other),
        }
    }

    /// Assert that a RosterResult is an UnsupportedKeyType error for `kind`.
    #[track_caller]
    pub fn assert_unsupported_key<T: std::fmt::Debug>(result: &RosterResult<T>, kind: &str) {
        match result {
            Err(RosterError::Lookup(LookupError::UnsupportedKeyType { kind: k, .. })) => {
                assert_eq!(k, kind, "Wrong kind in UnsupportedKeyType error");
            }
            other => panic!("Expected UnsupportedKeyType for {}, got: {:?}", kind, other),
        }
    }

    /// Assert that a RosterResult is a Storage error.
    #[track_caller]
    pub fn assert_storage_error<T: std::fmt::Debug>(result: &RosterResult<T>) {
        match result {
            Err(RosterError::Storage(_)) => {}
            other => panic!("Expected Storage error, got: {:?}", other),
        }
    }

    /// Assert that a save or destroy was rejected with a failure on `field`.
    #[track_caller]
    pub fn assert_rejected_on(outcome: &SaveOutcome, field: &str) {
        match outcome {
            SaveOutcome::Rejected(errors) => assert!(
                !errors.on(field).is_empty(),
                "Expected a failure on {}, got: {:?}",
                field,
                errors.full_messages()
            ),
            SaveOutcome::Committed => panic!("Expected rejection on {}, got Committed", field),
        }
    }

    /// Assert that two optional values are the same loaded instance.
    #[track_caller]
    pub fn assert_same_instance<R: std::fmt::Debug>(
        actual: &Option<EnumeratedValue<R>>,
        expected: &EnumeratedValue<R>,
    ) {
        match actual {
            Some(value) => assert!(
                value.same_instance(expected),
                "Expected the cached instance of {:?}, got a different instance",
                expected
            ),
            None => panic!("Expected {:?}, got None", expected),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_color_cache_fixture() {
        let (store, cache) = fixtures::color_cache(EnumerationConfig::new());
        assert_eq!(store.len().unwrap(), 3);
        assert_eq!(cache.all().unwrap().len(), 3);
    }

    #[test]
    fn test_typed_color_reads_label() {
        let (_, cache) = fixtures::typed_color_cache(FailurePolicy::EnforceNone);
        let red = cache.resolve("red").unwrap().unwrap();
        assert_eq!(red.record().hex, "#ff0000");
        assert_eq!(red.name(), Some("red"));
    }

    #[test]
    fn test_assertion_not_found() {
        let result: RosterResult<()> = Err(RosterError::Lookup(LookupError::NotFound {
            type_name: "Color".to_string(),
            key: "999".to_string(),
        }));
        assertions::assert_not_found(&result, "999");
    }

    #[test]
    fn test_init_test_tracing_is_idempotent() {
        init_test_tracing();
        init_test_tracing();
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_record_set_is_unique(records in generators::arb_record_set(12)) {
            let mut ids: Vec<_> = records.iter().map(|r| r.id).collect();
            ids.dedup();
            prop_assert_eq!(ids.len(), records.len());
            prop_assert!(fixtures::record_store(records).len().unwrap() <= 12);
        }
    }
}
