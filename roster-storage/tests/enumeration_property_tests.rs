//! Property-Based Tests for the Enumeration Cache
//!
//! For any set of records with unique ids and names:
//! - `all()` is idempotent until a permitted purge
//! - every value resolves by id, name and symbol to itself
//! - a miss resolves exactly as its failure policy dictates
//! - `includes` never fails on a miss and agrees with successful resolution

use proptest::prelude::*;
use roster_test_utils::{
    fixtures, generators, init_test_tracing, EnumerationConfig, FailurePolicy, LookupKey,
};

fn config_with(policy: FailurePolicy) -> EnumerationConfig {
    EnumerationConfig::new().with_failure_policy(policy)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_all_is_idempotent(records in generators::arb_record_set(16)) {
        init_test_tracing();
        let store = fixtures::record_store(records.clone());
        let cache = fixtures::attached_cache(&store, EnumerationConfig::new());

        let first = cache.all().unwrap();
        let second = cache.all().unwrap();
        prop_assert!(first.ptr_eq(&second));
        prop_assert_eq!(first.len(), records.len());
        prop_assert_eq!(store.query_count(), 1);
    }

    #[test]
    fn prop_every_value_resolves_to_itself(
        records in generators::arb_record_set(16),
        policy in generators::arb_failure_policy(),
    ) {
        let store = fixtures::record_store(records);
        let cache = fixtures::attached_cache(&store, config_with(policy));

        for value in &cache.all().unwrap() {
            let name = value.name().unwrap();
            let by_id = cache.resolve(value.id()).unwrap().unwrap();
            let by_name = cache.resolve(name).unwrap().unwrap();
            let by_symbol = cache.resolve(value.name_as_symbol().unwrap()).unwrap().unwrap();
            prop_assert!(by_id.same_instance(value));
            prop_assert!(by_name.same_instance(value));
            prop_assert!(by_symbol.same_instance(value));
        }
    }

    #[test]
    fn prop_miss_follows_policy(
        records in generators::arb_record_set(8),
        policy in generators::arb_failure_policy(),
        key in generators::arb_lookup_key(),
    ) {
        let store = fixtures::record_store(records);
        let cache = fixtures::attached_cache(&store, config_with(policy));

        let hit = match &key {
            LookupKey::ById(id) => cache.lookup_id(*id).unwrap(),
            LookupKey::ByName(name) => cache.lookup_name(name).unwrap(),
            LookupKey::ByNameSymbol(symbol) => cache.lookup_name(symbol.as_str()).unwrap(),
            LookupKey::None => None,
        };

        match (hit, cache.resolve(key.clone())) {
            (Some(expected), Ok(Some(actual))) => prop_assert!(actual.same_instance(&expected)),
            (None, Ok(None)) => prop_assert!(!policy.raises_on_miss(&key)),
            (None, Err(err)) => {
                prop_assert!(err.is_not_found());
                prop_assert!(policy.raises_on_miss(&key));
            }
            (hit, result) => prop_assert!(false, "hit {:?} but resolved {:?}", hit, result),
        }
    }

    #[test]
    fn prop_includes_never_fails_on_miss(
        records in generators::arb_record_set(8),
        policy in generators::arb_failure_policy(),
        key in generators::arb_lookup_key(),
    ) {
        let store = fixtures::record_store(records);
        let cache = fixtures::attached_cache(&store, config_with(policy));

        let included = cache.includes(key.clone()).unwrap();
        match cache.resolve(key) {
            Ok(Some(_)) => prop_assert!(included),
            Ok(None) | Err(_) => prop_assert!(!included),
        }
    }

    #[test]
    fn prop_json_keys_never_panic(
        records in generators::arb_record_set(8),
        key in generators::arb_json_key(),
    ) {
        let store = fixtures::record_store(records);
        let cache = fixtures::attached_cache(&store, EnumerationConfig::new());

        let resolved = cache.resolve_value(&key);
        let included = cache.includes(key.clone()).unwrap();
        if let Ok(Some(value)) = resolved {
            prop_assert!(included);
            prop_assert!(cache.is_like(&value, key).unwrap());
        }
    }

    #[test]
    fn prop_purge_reloads_same_contents(records in generators::arb_record_set(16)) {
        let store = fixtures::record_store(records);
        let cache = fixtures::attached_cache(&store, EnumerationConfig::new());
        let before = cache.all().unwrap();

        prop_assert!(cache.purge().is_err());
        prop_assert!(cache.all().unwrap().ptr_eq(&before));

        cache.set_updates_permitted(true);
        cache.purge().unwrap();
        let after = cache.all().unwrap();
        prop_assert!(!after.ptr_eq(&before));
        prop_assert_eq!(after.to_vec(), before.to_vec());
        prop_assert_eq!(store.query_count(), 2);
    }
}
