//! Configuration types

use crate::{ConfigError, FilterExpr, LookupKey, OrderExpr, RosterError, RosterResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Default column backing the name index.
pub const DEFAULT_NAME_COLUMN: &str = "name";

/// Option keys accepted by [`EnumerationConfig::from_options`].
pub const VALID_OPTIONS: [&str; 4] = ["conditions", "order", "on_lookup_failure", "name_column"];

// ============================================================================
// FAILURE POLICY
// ============================================================================

/// What a lookup does when its key does not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Return no value
    #[default]
    EnforceNone,
    /// Raise `NotFound` for every key kind
    EnforceStrict,
    /// Raise for id and symbol keys; plain string names return no value
    EnforceStrictLiterals,
    /// Raise for id keys only
    EnforceStrictIds,
    /// Raise for symbol keys only
    EnforceStrictSymbols,
}

impl FailurePolicy {
    pub const ALL: [FailurePolicy; 5] = [
        FailurePolicy::EnforceNone,
        FailurePolicy::EnforceStrict,
        FailurePolicy::EnforceStrictLiterals,
        FailurePolicy::EnforceStrictIds,
        FailurePolicy::EnforceStrictSymbols,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::EnforceNone => "enforce_none",
            FailurePolicy::EnforceStrict => "enforce_strict",
            FailurePolicy::EnforceStrictLiterals => "enforce_strict_literals",
            FailurePolicy::EnforceStrictIds => "enforce_strict_ids",
            FailurePolicy::EnforceStrictSymbols => "enforce_strict_symbols",
        }
    }

    /// Whether a miss on `key` raises `NotFound` under this policy.
    ///
    /// `LookupKey::None` never reaches a policy; it is reported as not raising.
    pub fn raises_on_miss(&self, key: &LookupKey) -> bool {
        if key.is_none() {
            return false;
        }
        match self {
            FailurePolicy::EnforceNone => false,
            FailurePolicy::EnforceStrict => true,
            FailurePolicy::EnforceStrictLiterals => {
                matches!(key, LookupKey::ById(_) | LookupKey::ByNameSymbol(_))
            }
            FailurePolicy::EnforceStrictIds => matches!(key, LookupKey::ById(_)),
            FailurePolicy::EnforceStrictSymbols => matches!(key, LookupKey::ByNameSymbol(_)),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FailurePolicy::ALL
            .into_iter()
            .find(|policy| policy.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "on_lookup_failure".to_string(),
                value: s.to_string(),
                reason: "not a known lookup failure policy".to_string(),
            })
    }
}

// ============================================================================
// ENUMERATION CONFIG
// ============================================================================

/// Per-type enumeration configuration, fixed when the cache is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnumerationConfig {
    /// Filter passed to every store query
    pub conditions: Vec<FilterExpr>,
    /// Ordering passed to every store query
    pub order: Vec<OrderExpr>,
    /// Policy applied when a lookup misses
    pub on_lookup_failure: FailurePolicy,
    /// Attribute backing the name index
    pub name_column: String,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
            order: Vec::new(),
            on_lookup_failure: FailurePolicy::default(),
            name_column: DEFAULT_NAME_COLUMN.to_string(),
        }
    }
}

impl EnumerationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_conditions(mut self, conditions: Vec<FilterExpr>) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_condition(mut self, condition: FilterExpr) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_order(mut self, order: Vec<OrderExpr>) -> Self {
        self.order = order;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_lookup_failure = policy;
        self
    }

    pub fn with_name_column(mut self, column: impl Into<String>) -> Self {
        self.name_column = column.into();
        self
    }

    /// Build from an option map such as `{"order": [...], "name_column": "label"}`.
    ///
    /// Keys outside [`VALID_OPTIONS`] are rejected with
    /// `ConfigError::UnknownOption`. Missing keys take their defaults.
    pub fn from_options(options: &Value) -> RosterResult<Self> {
        let Value::Object(map) = options else {
            return Err(ConfigError::InvalidValue {
                field: "options".to_string(),
                value: options.to_string(),
                reason: "options must be an object".to_string(),
            }
            .into());
        };

        if let Some(unknown) = map.keys().find(|k| !VALID_OPTIONS.contains(&k.as_str())) {
            return Err(ConfigError::UnknownOption {
                option: unknown.clone(),
            }
            .into());
        }

        let config: Self = serde_json::from_value(options.clone()).map_err(|e| {
            RosterError::Config(ConfigError::InvalidValue {
                field: "options".to_string(),
                value: options.to_string(),
                reason: e.to_string(),
            })
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> RosterResult<()> {
        if self.name_column.trim().is_empty() {
            return Err(RosterError::Config(ConfigError::InvalidValue {
                field: "name_column".to_string(),
                value: self.name_column.clone(),
                reason: "name_column must not be empty".to_string(),
            }));
        }

        if let Some(order) = self.order.iter().find(|o| o.field.trim().is_empty()) {
            return Err(RosterError::Config(ConfigError::InvalidValue {
                field: "order".to_string(),
                value: format!("{:?}", order),
                reason: "order field must not be empty".to_string(),
            }));
        }

        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Symbol;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = EnumerationConfig::default();
        assert_eq!(config.name_column, "name");
        assert_eq!(config.on_lookup_failure, FailurePolicy::EnforceNone);
        assert!(config.conditions.is_empty());
        assert!(config.order.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_policy_round_trips_through_str() {
        for policy in FailurePolicy::ALL {
            assert_eq!(policy.as_str().parse::<FailurePolicy>(), Ok(policy));
        }
        assert!("enforce_maybe".parse::<FailurePolicy>().is_err());
    }

    #[test]
    fn test_policy_table() {
        let name = LookupKey::from("unknown");
        let symbol = LookupKey::from(Symbol::new("unknown"));
        let id = LookupKey::from(999i64);

        let cases = [
            (FailurePolicy::EnforceNone, [false, false, false]),
            (FailurePolicy::EnforceStrict, [true, true, true]),
            (FailurePolicy::EnforceStrictLiterals, [false, true, true]),
            (FailurePolicy::EnforceStrictIds, [false, false, true]),
            (FailurePolicy::EnforceStrictSymbols, [false, true, false]),
        ];

        for (policy, [by_name, by_symbol, by_id]) in cases {
            assert_eq!(policy.raises_on_miss(&name), by_name, "{policy} name");
            assert_eq!(policy.raises_on_miss(&symbol), by_symbol, "{policy} symbol");
            assert_eq!(policy.raises_on_miss(&id), by_id, "{policy} id");
            assert!(!policy.raises_on_miss(&LookupKey::None));
        }
    }

    #[test]
    fn test_from_options_full() {
        let config = EnumerationConfig::from_options(&json!({
            "conditions": [{ "field": "active", "operator": "eq", "value": true }],
            "order": [{ "field": "position", "direction": "desc" }],
            "on_lookup_failure": "enforce_strict_ids",
            "name_column": "label",
        }))
        .unwrap();

        assert_eq!(config.conditions, vec![FilterExpr::eq("active", json!(true))]);
        assert_eq!(config.order, vec![OrderExpr::desc("position")]);
        assert_eq!(config.on_lookup_failure, FailurePolicy::EnforceStrictIds);
        assert_eq!(config.name_column, "label");
    }

    #[test]
    fn test_from_options_rejects_unknown_key() {
        let err = EnumerationConfig::from_options(&json!({ "cache_ttl": 60 })).unwrap_err();
        assert_eq!(
            err,
            RosterError::Config(ConfigError::UnknownOption {
                option: "cache_ttl".to_string()
            })
        );
    }

    #[test]
    fn test_from_options_rejects_bad_policy_and_shape() {
        let err = EnumerationConfig::from_options(&json!({ "on_lookup_failure": "explode" }));
        assert!(matches!(
            err,
            Err(RosterError::Config(ConfigError::InvalidValue { .. }))
        ));

        let err = EnumerationConfig::from_options(&json!(["name_column"]));
        assert!(matches!(
            err,
            Err(RosterError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_name_column() {
        let result = EnumerationConfig::new().with_name_column("  ").validate();
        if let Err(RosterError::Config(ConfigError::InvalidValue { field, .. })) = result {
            assert_eq!(field, "name_column");
        } else {
            panic!("Expected ConfigError::InvalidValue");
        }
    }

    #[test]
    fn test_builder_methods() {
        let config = EnumerationConfig::new()
            .with_condition(FilterExpr::eq("active", json!(true)))
            .with_order(vec![OrderExpr::asc("position")])
            .with_failure_policy(FailurePolicy::EnforceStrict)
            .with_name_column("label");
        assert_eq!(config.conditions.len(), 1);
        assert_eq!(config.on_lookup_failure, FailurePolicy::EnforceStrict);
        assert_eq!(config.name_column, "label");
    }
}

// =============================================================================
// PROPERTY-BASED TESTS
// =============================================================================
