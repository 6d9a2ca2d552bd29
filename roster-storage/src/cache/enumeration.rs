//! The per-type enumeration cache.

use super::generation::{CacheGeneration, GenerationInfo, GenerationSlot, IndexContext};
use super::guard::{MutationGuard, MutationVerdict};
use super::loader::Loader;
use super::resolver::LookupResolver;
use super::stats::{CacheCounters, CacheStats};
use crate::{PersistenceHooks, RecordStore};
use roster_core::{
    EnumId, EnumeratedValue, EnumerationConfig, EnumerationRecord, EnumerationSet, LookupKey,
    RecordErrors, RosterResult, ValidationError,
};
use serde_json::Value;
use std::sync::Arc;

/// Read-through cache over every value of one enumeration type.
///
/// The first read loads the whole set from the store. Later reads are served
/// from that generation until a permitted purge discards it. Lookups resolve
/// names, symbols and ids through lazily built indices, applying the
/// configured failure policy on a miss.
///
/// # Example
///
/// ```ignore
/// let cache = Arc::new(EnumerationCache::new(store.clone(), EnumerationConfig::new())?);
/// store.register_hooks(cache.clone())?;
///
/// let red = cache.resolve("red")?;
/// assert_eq!(cache.resolve(1)?, red);
/// ```
pub struct EnumerationCache<S: RecordStore> {
    config: EnumerationConfig,
    loader: Loader<S>,
    slot: GenerationSlot<S::Record>,
    resolver: LookupResolver,
    guard: MutationGuard,
    counters: CacheCounters,
}

impl<S: RecordStore> EnumerationCache<S> {
    /// Create a cache over `store`. Nothing is loaded until the first read.
    pub fn new(store: Arc<S>, config: EnumerationConfig) -> RosterResult<Self> {
        config.validate()?;

        let type_name = S::Record::type_name();
        let context = IndexContext {
            type_name,
            name_column: config.name_column.clone(),
            table: store.table_name().to_string(),
        };

        Ok(Self {
            loader: Loader::new(store, &config),
            slot: GenerationSlot::new(),
            resolver: LookupResolver::new(context, config.on_lookup_failure),
            guard: MutationGuard::new(type_name, config.name_column.clone()),
            counters: CacheCounters::default(),
            config,
        })
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn config(&self) -> &EnumerationConfig {
        &self.config
    }

    pub fn name_column(&self) -> &str {
        &self.config.name_column
    }

    pub fn type_name(&self) -> &'static str {
        S::Record::type_name()
    }

    pub fn store(&self) -> &Arc<S> {
        self.loader.store()
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Whether a generation is currently loaded.
    pub fn is_loaded(&self) -> bool {
        matches!(self.slot.current(), Ok(Some(_)))
    }

    /// Number, load time and size of the current generation.
    pub fn generation_info(&self) -> RosterResult<Option<GenerationInfo>> {
        Ok(self.slot.current()?.map(|generation| generation.info()))
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Every value, in store order.
    ///
    /// Repeated calls return the same set until a purge.
    pub fn all(&self) -> RosterResult<EnumerationSet<S::Record>> {
        Ok(self.generation()?.set().clone())
    }

    /// Resolve a key, applying the failure policy on a miss.
    pub fn resolve(
        &self,
        key: impl Into<LookupKey>,
    ) -> RosterResult<Option<EnumeratedValue<S::Record>>> {
        self.resolve_key(&key.into())
    }

    /// Resolve loosely-typed input.
    ///
    /// Floats, booleans, arrays and objects fail with `UnsupportedKeyType`.
    pub fn resolve_value(&self, key: &Value) -> RosterResult<Option<EnumeratedValue<S::Record>>> {
        let key = LookupKey::try_from(key).map_err(|e| self.resolver.unsupported(e))?;
        self.resolve_key(&key)
    }

    /// Id index lookup with no failure policy.
    pub fn lookup_id(&self, id: EnumId) -> RosterResult<Option<EnumeratedValue<S::Record>>> {
        self.find(&LookupKey::ById(id))
    }

    /// Name index lookup with no failure policy.
    pub fn lookup_name(&self, name: &str) -> RosterResult<Option<EnumeratedValue<S::Record>>> {
        self.find(&LookupKey::ByName(name.to_string()))
    }

    pub(crate) fn resolve_key(
        &self,
        key: &LookupKey,
    ) -> RosterResult<Option<EnumeratedValue<S::Record>>> {
        if key.is_none() {
            return Ok(None);
        }
        let generation = self.generation()?;
        let resolved = self.resolver.resolve(&generation, key);
        self.count_lookup(&resolved);
        resolved
    }

    pub(crate) fn find(
        &self,
        key: &LookupKey,
    ) -> RosterResult<Option<EnumeratedValue<S::Record>>> {
        let generation = self.generation()?;
        let found = self.resolver.find(&generation, key);
        self.count_lookup(&found);
        found
    }

    fn count_lookup(&self, result: &RosterResult<Option<EnumeratedValue<S::Record>>>) {
        match result {
            Ok(Some(_)) => self.counters.record_hit(),
            Ok(None) => self.counters.record_miss(),
            Err(e) if e.is_not_found() => self.counters.record_miss(),
            Err(_) => {}
        }
    }

    fn generation(&self) -> RosterResult<Arc<CacheGeneration<S::Record>>> {
        let (generation, loaded) = self.slot.get_or_load(|| self.loader.load())?;
        if loaded {
            self.counters.record_load();
            let info = generation.info();
            tracing::debug!(
                type_name = self.type_name(),
                table = %self.resolver.context().table,
                generation = info.generation,
                values = info.len,
                "Loaded enumeration"
            );
        }
        Ok(generation)
    }

    // ------------------------------------------------------------------------
    // Mutation control
    // ------------------------------------------------------------------------

    /// Allow or refuse mutations and purges. Off by default.
    pub fn set_updates_permitted(&self, permitted: bool) {
        self.guard.set_permitted(permitted);
    }

    pub fn updates_permitted(&self) -> bool {
        self.guard.is_permitted()
    }

    /// Discard the current generation.
    ///
    /// Fails with `PurgeDisabled` unless updates are permitted.
    pub fn purge(&self) -> RosterResult<()> {
        self.guard.ensure_purge_permitted()?;
        self.discard()
    }

    /// Called by the persistence pipeline before a mutation commits.
    ///
    /// Blocked mutations get a failure attached to `errors`; allowed ones
    /// discard the current generation so the next read reloads.
    pub fn on_mutation_notify(&self, errors: &mut RecordErrors) -> RosterResult<MutationVerdict> {
        match self.guard.check(errors) {
            MutationVerdict::Blocked => {
                self.counters.record_blocked();
                Ok(MutationVerdict::Blocked)
            }
            MutationVerdict::Allowed => {
                self.discard()?;
                Ok(MutationVerdict::Allowed)
            }
        }
    }

    fn discard(&self) -> RosterResult<()> {
        if self.slot.reset()? {
            self.counters.record_purge();
            tracing::info!(type_name = self.type_name(), "Purged enumeration cache");
        }
        Ok(())
    }
}

impl<S: RecordStore> PersistenceHooks<S::Record> for EnumerationCache<S> {
    /// Names must be present, non-empty and unique among cached values.
    fn validate(&self, record: &S::Record, errors: &mut RecordErrors) -> RosterResult<()> {
        let column = self.name_column();
        let name = match record.read_attribute(column) {
            Some(Value::String(name)) if !name.trim().is_empty() => name,
            _ => {
                errors.add(ValidationError::RequiredFieldMissing {
                    field: column.to_string(),
                });
                return Ok(());
            }
        };

        let taken = self
            .all()?
            .iter()
            .any(|value| value.id() != record.id() && value.name() == Some(name.as_str()));
        if taken {
            errors.add(ValidationError::DuplicateValue {
                field: column.to_string(),
                value: name,
            });
        }
        Ok(())
    }

    fn before_save(
        &self,
        _record: &S::Record,
        errors: &mut RecordErrors,
    ) -> RosterResult<MutationVerdict> {
        self.on_mutation_notify(errors)
    }

    fn before_destroy(
        &self,
        _record: &S::Record,
        errors: &mut RecordErrors,
    ) -> RosterResult<MutationVerdict> {
        self.on_mutation_notify(errors)
    }
}

impl<S: RecordStore> std::fmt::Debug for EnumerationCache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnumerationCache")
            .field("type_name", &self.type_name())
            .field("config", &self.config)
            .field("loaded", &self.is_loaded())
            .field("updates_permitted", &self.updates_permitted())
            .finish()
    }
}
