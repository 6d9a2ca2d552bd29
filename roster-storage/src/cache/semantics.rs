//! Enumeration-aware comparisons.
//!
//! Scalars are resolved through the cache before comparing, so a value is
//! like its own id, name or symbol. Resolution uses the cache's failure
//! policy, so a strict policy can make a comparison fail.

use super::enumeration::EnumerationCache;
use crate::RecordStore;
use roster_core::{Candidate, EnumeratedValue, RosterError, RosterResult};

impl<S: RecordStore> EnumerationCache<S> {
    /// Whether `value` matches `candidate`.
    ///
    /// Keys match if they resolve to a value equal to `value`; a list matches
    /// if any element does. `Nil` and non-key input never match.
    pub fn is_like(
        &self,
        value: &EnumeratedValue<S::Record>,
        candidate: impl Into<Candidate<S::Record>>,
    ) -> RosterResult<bool> {
        self.like(value, &candidate.into())
    }

    /// Whether `value` is like any of `candidates`.
    pub fn is_in<I, T>(
        &self,
        value: &EnumeratedValue<S::Record>,
        candidates: I,
    ) -> RosterResult<bool>
    where
        I: IntoIterator<Item = T>,
        T: Into<Candidate<S::Record>>,
    {
        self.like(value, &Candidate::many(candidates))
    }

    /// Whether `candidate` names a value currently in the cache.
    ///
    /// Never applies the failure policy. A value matches only if it is the
    /// cached instance itself, not a stale copy with the same id. Only store
    /// and lock failures are returned as errors.
    pub fn includes(&self, candidate: impl Into<Candidate<S::Record>>) -> RosterResult<bool> {
        match candidate.into() {
            Candidate::Key(key) => ignore_lookup_error(self.find(&key).map(|v| v.is_some())),
            Candidate::Value(value) => Ok(self
                .lookup_id(value.id())?
                .is_some_and(|cached| cached.same_instance(&value))),
            Candidate::Nil | Candidate::Many(_) | Candidate::Other(_) => Ok(false),
        }
    }

    fn like(
        &self,
        value: &EnumeratedValue<S::Record>,
        candidate: &Candidate<S::Record>,
    ) -> RosterResult<bool> {
        match candidate {
            Candidate::Nil | Candidate::Other(_) => Ok(false),
            Candidate::Key(key) => Ok(self.resolve_key(key)?.as_ref() == Some(value)),
            Candidate::Value(other) => Ok(other == value),
            Candidate::Many(items) => {
                for item in items {
                    if self.like(value, item)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

/// Per-value comparison methods that delegate to the owning cache.
pub trait ValueSemantics<R> {
    fn is_like<S>(
        &self,
        cache: &EnumerationCache<S>,
        candidate: impl Into<Candidate<R>>,
    ) -> RosterResult<bool>
    where
        S: RecordStore<Record = R>;

    fn is_in<S, I, T>(&self, cache: &EnumerationCache<S>, candidates: I) -> RosterResult<bool>
    where
        S: RecordStore<Record = R>,
        I: IntoIterator<Item = T>,
        T: Into<Candidate<R>>;
}

impl<R> ValueSemantics<R> for EnumeratedValue<R> {
    fn is_like<S>(
        &self,
        cache: &EnumerationCache<S>,
        candidate: impl Into<Candidate<R>>,
    ) -> RosterResult<bool>
    where
        S: RecordStore<Record = R>,
    {
        cache.is_like(self, candidate)
    }

    fn is_in<S, I, T>(&self, cache: &EnumerationCache<S>, candidates: I) -> RosterResult<bool>
    where
        S: RecordStore<Record = R>,
        I: IntoIterator<Item = T>,
        T: Into<Candidate<R>>,
    {
        cache.is_in(self, candidates)
    }
}

fn ignore_lookup_error(result: RosterResult<bool>) -> RosterResult<bool> {
    match result {
        Err(RosterError::Lookup(_)) => Ok(false),
        other => other,
    }
}
