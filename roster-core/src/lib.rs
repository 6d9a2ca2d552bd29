//! ROSTER Core - Enumeration Types
//!
//! Data types shared by every ROSTER crate: the record shape a cache-managed
//! type must expose, the immutable value and set types the cache hands out,
//! lookup keys, failure policies, configuration, and the error taxonomy.
//! This crate contains no caching logic.

pub mod config;
pub mod entities;
pub mod error;
pub mod filter;
pub mod identity;
pub mod lookup;
pub mod validation;

pub use config::{EnumerationConfig, FailurePolicy, DEFAULT_NAME_COLUMN, VALID_OPTIONS};
pub use entities::{EnumeratedValue, EnumerationRecord, EnumerationSet, Record};
pub use error::{
    CacheError, ConfigError, LookupError, RosterError, RosterResult, StorageError,
    ValidationError,
};
pub use filter::{FilterExpr, FilterOperator, OrderExpr, SortDirection};
pub use identity::{EnumId, Symbol, Timestamp};
pub use lookup::{Candidate, LookupKey, UnsupportedKey};
pub use validation::RecordErrors;
