//! Mutation permission for cache-managed types.

use roster_core::{CacheError, RecordErrors, RosterResult, ValidationError};
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether a pending mutation may proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationVerdict {
    Allowed,
    Blocked,
}

/// Gate between the persistence pipeline and the cache.
///
/// Updates are refused until an operator calls
/// [`set_permitted(true)`](Self::set_permitted). The flag is never flipped by
/// the cache itself.
#[derive(Debug)]
pub struct MutationGuard {
    permitted: AtomicBool,
    type_name: &'static str,
    name_column: String,
}

impl MutationGuard {
    pub fn new(type_name: &'static str, name_column: impl Into<String>) -> Self {
        Self {
            permitted: AtomicBool::new(false),
            type_name,
            name_column: name_column.into(),
        }
    }

    pub fn set_permitted(&self, permitted: bool) {
        self.permitted.store(permitted, Ordering::SeqCst);
    }

    pub fn is_permitted(&self) -> bool {
        self.permitted.load(Ordering::SeqCst)
    }

    /// Decide a pending mutation.
    ///
    /// When blocked, a `MutationBlocked` failure is attached to the name
    /// field of the mutating record.
    pub fn check(&self, errors: &mut RecordErrors) -> MutationVerdict {
        if self.is_permitted() {
            return MutationVerdict::Allowed;
        }

        tracing::warn!(
            type_name = self.type_name,
            "Blocked mutation of enumeration instance; updates are not permitted"
        );
        errors.add(ValidationError::MutationBlocked {
            field: self.name_column.clone(),
            type_name: self.type_name.to_string(),
        });
        MutationVerdict::Blocked
    }

    /// Fail with `PurgeDisabled` unless updates are permitted.
    pub fn ensure_purge_permitted(&self) -> RosterResult<()> {
        if self.is_permitted() {
            return Ok(());
        }

        tracing::warn!(type_name = self.type_name, "Refused cache purge");
        Err(CacheError::PurgeDisabled {
            type_name: self.type_name.to_string(),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::RosterError;

    #[test]
    fn test_guard_defaults_to_blocked() {
        let guard = MutationGuard::new("Color", "label");
        let mut errors = RecordErrors::new();

        assert!(!guard.is_permitted());
        assert_eq!(guard.check(&mut errors), MutationVerdict::Blocked);
        assert_eq!(errors.on("label").len(), 1);
        assert_eq!(
            errors.full_messages(),
            vec!["label: changes to Color enumeration instances are not permitted"]
        );
    }

    #[test]
    fn test_permitted_guard_allows_without_errors() {
        let guard = MutationGuard::new("Color", "name");
        guard.set_permitted(true);
        let mut errors = RecordErrors::new();

        assert_eq!(guard.check(&mut errors), MutationVerdict::Allowed);
        assert!(errors.is_empty());
        assert!(guard.ensure_purge_permitted().is_ok());
    }

    #[test]
    fn test_purge_refused_by_default() {
        let guard = MutationGuard::new("Color", "name");
        assert_eq!(
            guard.ensure_purge_permitted(),
            Err(RosterError::Cache(CacheError::PurgeDisabled {
                type_name: "Color".to_string()
            }))
        );
    }
}
