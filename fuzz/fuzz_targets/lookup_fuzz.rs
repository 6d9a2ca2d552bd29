//! Fuzz test for key conversion, resolution and option parsing
//!
//! Feeds arbitrary JSON into:
//! - `LookupKey::try_from`
//! - `EnumerationCache::resolve_value`, `includes` and `is_like`
//! - `EnumerationConfig::from_options`
//!
//! None of these may panic. Errors are expected.
//!
//! Run with: cargo +nightly fuzz run lookup_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use roster_core::{EnumerationConfig, FailurePolicy, LookupKey, Record};
use roster_storage::{EnumerationCache, InMemoryRecordStore};
use serde_json::Value;
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = serde_json::from_slice::<Value>(data) else {
        return;
    };

    // Option parsing must reject or accept, never panic
    let _ = EnumerationConfig::from_options(&input);

    let Ok(store) = InMemoryRecordStore::with_records(
        "colors",
        vec![
            Record::named(1, "red"),
            Record::named(2, "green"),
            Record::named(3, "blue"),
        ],
    ) else {
        return;
    };
    let config = EnumerationConfig::new().with_failure_policy(FailurePolicy::EnforceStrict);
    let Ok(cache) = EnumerationCache::new(Arc::new(store), config) else {
        return;
    };

    let converted = LookupKey::try_from(&input);
    let resolved = cache.resolve_value(&input);

    // Conversion and resolution agree on which inputs are keys
    assert_eq!(
        converted.is_err(),
        matches!(
            resolved,
            Err(roster_core::RosterError::Lookup(
                roster_core::LookupError::UnsupportedKeyType { .. }
            ))
        ),
        "UnsupportedKeyType must match key conversion"
    );

    // includes never fails against an in-memory store
    let included = cache.includes(input.clone()).unwrap_or(false);
    if let Ok(Some(value)) = resolved {
        assert!(included, "resolved values must be included");
        assert!(cache.is_like(&value, input).unwrap_or(false));
    }
});
