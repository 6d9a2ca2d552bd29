//! Loaded generations and the slot that holds the current one.
//!
//! A [`CacheGeneration`] is one immutable load: the set plus lazily built
//! indices. The [`GenerationSlot`] hands out `Arc` snapshots of it, so a
//! reader keeps a whole generation even if a purge replaces it meanwhile.

use super::index::{IdIndex, NameIndex};
use chrono::Utc;
use once_cell::sync::OnceCell;
use roster_core::{EnumerationSet, RosterResult, StorageError, Timestamp};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// What a name index build needs to describe a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexContext {
    pub type_name: &'static str,
    pub name_column: String,
    pub table: String,
}

/// Summary of the current generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationInfo {
    /// Monotonic load counter, starting at 1
    pub generation: u64,
    pub loaded_at: Timestamp,
    /// Number of values in the set
    pub len: usize,
}

/// One loaded set and its indices.
pub struct CacheGeneration<R> {
    generation: u64,
    loaded_at: Timestamp,
    set: EnumerationSet<R>,
    id_index: OnceCell<IdIndex<R>>,
    name_index: OnceCell<NameIndex<R>>,
}

impl<R> CacheGeneration<R> {
    pub fn new(generation: u64, set: EnumerationSet<R>) -> Self {
        Self {
            generation,
            loaded_at: Utc::now(),
            set,
            id_index: OnceCell::new(),
            name_index: OnceCell::new(),
        }
    }

    pub fn set(&self) -> &EnumerationSet<R> {
        &self.set
    }

    pub fn info(&self) -> GenerationInfo {
        GenerationInfo {
            generation: self.generation,
            loaded_at: self.loaded_at,
            len: self.set.len(),
        }
    }

    /// The id index, built on first use.
    pub fn id_index(&self) -> &IdIndex<R> {
        self.id_index.get_or_init(|| {
            let index = IdIndex::build(&self.set);
            tracing::debug!(
                generation = self.generation,
                entries = index.len(),
                "Built id index"
            );
            index
        })
    }

    /// The name index, built on first use.
    ///
    /// A failed build is not cached; the next call builds again.
    pub fn name_index(&self, context: &IndexContext) -> RosterResult<&NameIndex<R>> {
        self.name_index.get_or_try_init(|| {
            let index = NameIndex::build(&self.set, context)?;
            tracing::debug!(
                type_name = context.type_name,
                column = %context.name_column,
                generation = self.generation,
                entries = index.len(),
                "Built name index"
            );
            Ok(index)
        })
    }
}

/// Holder of the current generation, empty until the first load.
pub struct GenerationSlot<R> {
    current: RwLock<Option<Arc<CacheGeneration<R>>>>,
    next_generation: AtomicU64,
}

impl<R> Default for GenerationSlot<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> GenerationSlot<R> {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
            next_generation: AtomicU64::new(1),
        }
    }

    /// The current generation, if loaded.
    pub fn current(&self) -> RosterResult<Option<Arc<CacheGeneration<R>>>> {
        let current = self.current.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(current.clone())
    }

    /// Return the current generation, loading one if the slot is empty.
    ///
    /// At most one caller runs `load` per generation; others wait on the write
    /// lock and then see its result. A failed load leaves the slot empty. The
    /// flag is true when this call performed the load.
    pub fn get_or_load<F>(&self, load: F) -> RosterResult<(Arc<CacheGeneration<R>>, bool)>
    where
        F: FnOnce() -> RosterResult<EnumerationSet<R>>,
    {
        if let Some(generation) = self.current()? {
            return Ok((generation, false));
        }

        let mut current = self.current.write().map_err(|_| StorageError::LockPoisoned)?;
        if let Some(generation) = current.as_ref() {
            return Ok((Arc::clone(generation), false));
        }

        let set = load()?;
        let number = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let generation = Arc::new(CacheGeneration::new(number, set));
        *current = Some(Arc::clone(&generation));
        Ok((generation, true))
    }

    /// Drop the current generation. Returns whether one was loaded.
    pub fn reset(&self) -> RosterResult<bool> {
        let mut current = self.current.write().map_err(|_| StorageError::LockPoisoned)?;
        Ok(current.take().is_some())
    }
}
