//! Whole-set enumeration cache.
//!
//! An [`EnumerationCache`] loads every record of one type on first access and
//! serves lookups by id, name or symbol from indices over that load.
//!
//! # Generations
//!
//! Each load is a [`CacheGeneration`]: an immutable set plus lazily built
//! indices. Readers hold an `Arc` to the generation they started with, so a
//! purge never exposes a half-reset state. A generation is discarded only by
//! a purge, and purges are refused until an operator permits updates with
//! [`EnumerationCache::set_updates_permitted`].
//!
//! Permission is per process. Other processes holding the same enumeration
//! are not told about a purge.
//!
//! # Example
//!
//! ```ignore
//! let cache = EnumerationCache::new(store, EnumerationConfig::new()
//!     .with_failure_policy(FailurePolicy::EnforceStrictIds))?;
//!
//! let red = cache.resolve("red")?;        // None if absent
//! let blue = cache.resolve(3)?;           // NotFound if absent
//! assert!(cache.is_like(&red.unwrap(), vec!["red", "crimson"])?);
//! ```

pub mod enumeration;
pub mod generation;
pub mod guard;
pub mod index;
pub mod loader;
pub mod resolver;
pub mod semantics;
pub mod stats;

pub use enumeration::EnumerationCache;
pub use generation::{CacheGeneration, GenerationInfo, GenerationSlot, IndexContext};
pub use guard::{MutationGuard, MutationVerdict};
pub use index::{IdIndex, NameIndex};
pub use loader::Loader;
pub use resolver::LookupResolver;
pub use semantics::ValueSemantics;
pub use stats::CacheStats;
