//! Error types for ROSTER operations

use crate::EnumId;
use thiserror::Error;

/// Lookup-time errors, raised synchronously to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("{type_name}: lookup key should be a name, symbol or integer id but got a {kind}")]
    UnsupportedKeyType { type_name: String, kind: String },

    #[error("Couldn't find a {type_name} identified by ({key})")]
    NotFound { type_name: String, key: String },

    #[error("{type_name}: you need to define a '{column}' column in the table '{table}' ({reason})")]
    MissingNameColumn {
        type_name: String,
        column: String,
        table: String,
        reason: String,
    },
}

/// Record store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Query on {table} failed: {reason}")]
    QueryFailed { table: String, reason: String },

    #[error("Record not found in {table} with id {id}")]
    NotFound { table: String, id: EnumId },

    #[error("Insert failed for {table}: {reason}")]
    InsertFailed { table: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown configuration option: {option}")]
    UnknownOption { option: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Cache lifecycle errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("{type_name}: cache purging disabled for your protection")]
    PurgeDisabled { type_name: String },
}

/// Record-level validation failures.
///
/// These are never returned as `Err`. They are collected on the mutating
/// record through [`RecordErrors`](crate::RecordErrors) and reported by the
/// persistence pipeline as a rejected mutation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field}: changes to {type_name} enumeration instances are not permitted")]
    MutationBlocked { field: String, type_name: String },

    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("{field} has already been taken: {value}")]
    DuplicateValue { field: String, value: String },
}

impl ValidationError {
    /// The record field this failure is attached to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MutationBlocked { field, .. }
            | ValidationError::RequiredFieldMissing { field }
            | ValidationError::DuplicateValue { field, .. } => field,
        }
    }
}

/// Master error type for all ROSTER errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

impl RosterError {
    /// Returns true for a strict-policy lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RosterError::Lookup(LookupError::NotFound { .. }))
    }
}

/// Result type alias for ROSTER operations.
pub type RosterResult<T> = Result<T, RosterError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_error_display_not_found() {
        let err = LookupError::NotFound {
            type_name: "BookingStatus".to_string(),
            key: "999".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Couldn't find a BookingStatus identified by (999)"
        );
    }

    #[test]
    fn test_lookup_error_display_missing_name_column() {
        let err = LookupError::MissingNameColumn {
            type_name: "BookingStatus".to_string(),
            column: "label".to_string(),
            table: "booking_statuses".to_string(),
            reason: "record 1 has no attribute 'label'".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("'label'"));
        assert!(msg.contains("'booking_statuses'"));
        assert!(msg.contains("record 1"));
    }

    #[test]
    fn test_lookup_error_display_unsupported_key() {
        let err = LookupError::UnsupportedKeyType {
            type_name: "Color".to_string(),
            kind: "float".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Color"));
        assert!(msg.contains("float"));
    }

    #[test]
    fn test_cache_error_display_purge_disabled() {
        let err = CacheError::PurgeDisabled {
            type_name: "Color".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Color: cache purging disabled for your protection"
        );
    }

    #[test]
    fn test_validation_error_field() {
        let blocked = ValidationError::MutationBlocked {
            field: "name".to_string(),
            type_name: "Color".to_string(),
        };
        assert_eq!(blocked.field(), "name");
        assert!(blocked.to_string().contains("not permitted"));

        let duplicate = ValidationError::DuplicateValue {
            field: "label".to_string(),
            value: "red".to_string(),
        };
        assert_eq!(duplicate.field(), "label");
    }

    #[test]
    fn test_storage_error_display_lock_poisoned() {
        let err = StorageError::LockPoisoned;
        assert!(err.to_string().contains("lock poisoned"));
    }

    #[test]
    fn test_roster_error_from_variants() {
        let storage = RosterError::from(StorageError::LockPoisoned);
        assert!(matches!(storage, RosterError::Storage(_)));

        let config = RosterError::from(ConfigError::UnknownOption {
            option: "colour".to_string(),
        });
        assert!(matches!(config, RosterError::Config(_)));

        let cache = RosterError::from(CacheError::PurgeDisabled {
            type_name: "Color".to_string(),
        });
        assert!(matches!(cache, RosterError::Cache(_)));

        let lookup = RosterError::from(LookupError::NotFound {
            type_name: "Color".to_string(),
            key: ":mauve".to_string(),
        });
        assert!(lookup.is_not_found());
        assert!(!cache.is_not_found());
    }
}
