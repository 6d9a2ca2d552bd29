//! ROSTER Storage - Record Store Traits, In-Memory Store and Enumeration Cache
//!
//! Defines the record store abstraction the enumeration cache reads from, the
//! persistence hook interface a store's save/destroy pipeline calls into, and
//! an in-memory store that implements both sides for tests and embedding.

pub mod cache;

pub use cache::{
    CacheGeneration, CacheStats, EnumerationCache, GenerationInfo, GenerationSlot, IdIndex,
    IndexContext, Loader, LookupResolver, MutationGuard, MutationVerdict, NameIndex,
    ValueSemantics,
};

use roster_core::{
    EnumId, EnumerationRecord, FilterExpr, OrderExpr, RecordErrors, RosterResult, StorageError,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

// ============================================================================
// RECORD STORE TRAIT
// ============================================================================

/// Source of raw records for an enumeration.
///
/// `conditions` and `order` come from the enumeration's configuration and are
/// passed through unchanged on every query.
pub trait RecordStore: Send + Sync {
    /// Raw record type returned by queries.
    type Record: EnumerationRecord;

    /// Name of the backing table, used in diagnostics.
    fn table_name(&self) -> &str;

    /// Fetch every record matching all `conditions`, sorted by `order`.
    fn query(
        &self,
        conditions: &[FilterExpr],
        order: &[OrderExpr],
    ) -> RosterResult<Vec<Self::Record>>;
}

impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    type Record = S::Record;

    fn table_name(&self) -> &str {
        (**self).table_name()
    }

    fn query(
        &self,
        conditions: &[FilterExpr],
        order: &[OrderExpr],
    ) -> RosterResult<Vec<Self::Record>> {
        (**self).query(conditions, order)
    }
}

// ============================================================================
// PERSISTENCE HOOKS
// ============================================================================

/// Callbacks a persistence pipeline invokes before committing a mutation.
///
/// Failures that should abort the mutation are attached to `errors`; an `Err`
/// return is reserved for infrastructure failures.
pub trait PersistenceHooks<R>: Send + Sync {
    /// Record-level validation, run before `before_save`.
    fn validate(&self, _record: &R, _errors: &mut RecordErrors) -> RosterResult<()> {
        Ok(())
    }

    /// Called before a create or update commits.
    fn before_save(&self, record: &R, errors: &mut RecordErrors) -> RosterResult<MutationVerdict>;

    /// Called before a delete commits.
    fn before_destroy(&self, record: &R, errors: &mut RecordErrors)
        -> RosterResult<MutationVerdict>;
}

/// Result of running a mutation through the persistence pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The mutation was applied.
    Committed,
    /// A hook blocked the mutation; the failures are attached.
    Rejected(RecordErrors),
}

impl SaveOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, SaveOutcome::Committed)
    }

    /// Failures attached by the hooks, if the mutation was rejected.
    pub fn errors(&self) -> Option<&RecordErrors> {
        match self {
            SaveOutcome::Committed => None,
            SaveOutcome::Rejected(errors) => Some(errors),
        }
    }
}

// ============================================================================
// IN-MEMORY RECORD STORE
// ============================================================================

/// In-memory record store with a save/destroy pipeline.
///
/// Records are kept by id. Queries evaluate [`FilterExpr`] conditions and sort
/// stably by [`OrderExpr`] keys on top of id order. Hooks are held weakly so a
/// cache registered on its own store does not keep itself alive.
pub struct InMemoryRecordStore<R> {
    table: String,
    records: RwLock<BTreeMap<EnumId, R>>,
    hooks: RwLock<Vec<Weak<dyn PersistenceHooks<R>>>>,
    query_count: AtomicU64,
    fail_next_query: Mutex<Option<String>>,
}

impl<R: EnumerationRecord> InMemoryRecordStore<R> {
    /// Create an empty store backed by `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            records: RwLock::new(BTreeMap::new()),
            hooks: RwLock::new(Vec::new()),
            query_count: AtomicU64::new(0),
            fail_next_query: Mutex::new(None),
        }
    }

    /// Create a store seeded with records, bypassing the pipeline.
    pub fn with_records(
        table: impl Into<String>,
        records: impl IntoIterator<Item = R>,
    ) -> RosterResult<Self> {
        let store = Self::new(table);
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    /// Insert a record directly, bypassing the pipeline.
    pub fn insert(&self, record: R) -> RosterResult<()> {
        let mut records = self.records.write().map_err(|_| StorageError::LockPoisoned)?;
        if records.contains_key(&record.id()) {
            return Err(StorageError::InsertFailed {
                table: self.table.clone(),
                reason: format!("id {} already exists", record.id()),
            }
            .into());
        }
        records.insert(record.id(), record);
        Ok(())
    }

    /// Get a record by id.
    pub fn get(&self, id: EnumId) -> RosterResult<Option<R>> {
        let records = self.records.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(records.get(&id).cloned())
    }

    /// Number of stored records.
    pub fn len(&self) -> RosterResult<usize> {
        let records = self.records.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(records.len())
    }

    pub fn is_empty(&self) -> RosterResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Number of queries served so far.
    pub fn query_count(&self) -> u64 {
        self.query_count.load(Ordering::SeqCst)
    }

    /// Make the next query fail with `StorageError::QueryFailed`.
    pub fn fail_next_query(&self, reason: impl Into<String>) {
        if let Ok(mut pending) = self.fail_next_query.lock() {
            *pending = Some(reason.into());
        }
    }

    /// Register hooks to run on every save and destroy.
    ///
    /// Entries whose hooks have been dropped are pruned first.
    pub fn register_hooks(&self, hooks: Arc<dyn PersistenceHooks<R>>) -> RosterResult<()> {
        let mut registered = self.hooks.write().map_err(|_| StorageError::LockPoisoned)?;
        registered.retain(|hook| hook.strong_count() > 0);
        registered.push(Arc::downgrade(&hooks));
        Ok(())
    }

    /// Create or update a record through the pipeline.
    ///
    /// Runs every hook's `validate`, then every hook's `before_save`. The
    /// record is committed only if no failures were attached and no hook
    /// blocked.
    pub fn save(&self, record: R) -> RosterResult<SaveOutcome> {
        let hooks = self.live_hooks()?;
        let mut errors = RecordErrors::new();

        for hook in &hooks {
            hook.validate(&record, &mut errors)?;
        }
        if !errors.is_empty() {
            return Ok(SaveOutcome::Rejected(errors));
        }

        for hook in &hooks {
            if hook.before_save(&record, &mut errors)? == MutationVerdict::Blocked {
                return Ok(SaveOutcome::Rejected(errors));
            }
        }

        let mut records = self.records.write().map_err(|_| StorageError::LockPoisoned)?;
        records.insert(record.id(), record);
        Ok(SaveOutcome::Committed)
    }

    /// Delete a record through the pipeline.
    pub fn destroy(&self, id: EnumId) -> RosterResult<SaveOutcome> {
        let record = self.get(id)?.ok_or_else(|| StorageError::NotFound {
            table: self.table.clone(),
            id,
        })?;

        let mut errors = RecordErrors::new();
        for hook in &self.live_hooks()? {
            if hook.before_destroy(&record, &mut errors)? == MutationVerdict::Blocked {
                return Ok(SaveOutcome::Rejected(errors));
            }
        }

        let mut records = self.records.write().map_err(|_| StorageError::LockPoisoned)?;
        records.remove(&id);
        Ok(SaveOutcome::Committed)
    }

    fn live_hooks(&self) -> RosterResult<Vec<Arc<dyn PersistenceHooks<R>>>> {
        let hooks = self.hooks.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(hooks.iter().filter_map(Weak::upgrade).collect())
    }
}

impl<R: EnumerationRecord> RecordStore for InMemoryRecordStore<R> {
    type Record = R;

    fn table_name(&self) -> &str {
        &self.table
    }

    fn query(&self, conditions: &[FilterExpr], order: &[OrderExpr]) -> RosterResult<Vec<R>> {
        self.query_count.fetch_add(1, Ordering::SeqCst);

        let failure = self
            .fail_next_query
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?
            .take();
        if let Some(reason) = failure {
            return Err(StorageError::QueryFailed {
                table: self.table.clone(),
                reason,
            }
            .into());
        }

        let records = self.records.read().map_err(|_| StorageError::LockPoisoned)?;
        let mut matched: Vec<R> = records
            .values()
            .filter(|record| {
                conditions
                    .iter()
                    .all(|c| c.matches(record.read_attribute(&c.field).as_ref()))
            })
            .cloned()
            .collect();

        if !order.is_empty() {
            matched.sort_by(|a, b| {
                order
                    .iter()
                    .map(|o| {
                        o.compare(
                            a.read_attribute(&o.field).as_ref(),
                            b.read_attribute(&o.field).as_ref(),
                        )
                    })
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        Ok(matched)
    }
}

impl<R> std::fmt::Debug for InMemoryRecordStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRecordStore")
            .field("table", &self.table)
            .field("query_count", &self.query_count.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TESTS
// ============================================================================
