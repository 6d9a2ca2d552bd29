//! Enumerated value types
//!
//! A record store hands back raw records; the cache wraps each one in an
//! [`EnumeratedValue`] and keeps the whole ordered result as an
//! [`EnumerationSet`]. Neither type exposes a way to change a value after it
//! has been loaded.

use crate::{EnumId, Symbol};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

// ============================================================================
// RECORD SHAPE
// ============================================================================

/// Attribute access a raw record must provide to be cache-managed.
pub trait EnumerationRecord: Clone + Send + Sync + 'static {
    /// Human-readable name of the domain type, used in error messages.
    fn type_name() -> &'static str;

    /// The store-assigned identifier.
    fn id(&self) -> EnumId;

    /// Read an attribute by column name.
    ///
    /// Returns `None` when the record shape has no such column.
    fn read_attribute(&self, column: &str) -> Option<Value>;
}

/// Schema-less raw record: an id plus a bag of JSON attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: EnumId,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Record {
    /// Create a record with no attributes.
    pub fn new(id: EnumId) -> Self {
        Self {
            id,
            attributes: Map::new(),
        }
    }

    /// Set an attribute.
    pub fn with_attribute(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(column.into(), value.into());
        self
    }

    /// Convenience constructor for the common `(id, name)` shape.
    pub fn named(id: EnumId, name: impl Into<String>) -> Self {
        Self::new(id).with_attribute("name", name.into())
    }
}

impl EnumerationRecord for Record {
    fn type_name() -> &'static str {
        "Record"
    }

    fn id(&self) -> EnumId {
        self.id
    }

    fn read_attribute(&self, column: &str) -> Option<Value> {
        if column == "id" {
            return Some(Value::from(self.id));
        }
        self.attributes.get(column).cloned()
    }
}

// ============================================================================
// ENUMERATED VALUE
// ============================================================================

struct ValueInner<R> {
    id: EnumId,
    name: Option<Arc<str>>,
    record: R,
}

/// An immutable, shared handle to one cached record.
///
/// Cloning is cheap and yields the same instance. `PartialEq` and `Hash`
/// compare by id; [`same_instance`](Self::same_instance) compares identity,
/// which distinguishes a value from an earlier generation with the same id.
pub struct EnumeratedValue<R> {
    inner: Arc<ValueInner<R>>,
}

impl<R: EnumerationRecord> EnumeratedValue<R> {
    /// Wrap a raw record, reading its name from `name_column`.
    ///
    /// A record whose name column is absent or not a string still loads;
    /// it has no name and cannot be indexed by name.
    pub fn from_record(record: R, name_column: &str) -> Self {
        let name = match record.read_attribute(name_column) {
            Some(Value::String(name)) => Some(Arc::from(name)),
            _ => None,
        };
        Self {
            inner: Arc::new(ValueInner {
                id: record.id(),
                name,
                record,
            }),
        }
    }
}

impl<R> EnumeratedValue<R> {
    pub fn id(&self) -> EnumId {
        self.inner.id
    }

    /// The value of the configured name column, if the record has one.
    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// The name reinterpreted as a symbol.
    pub fn name_as_symbol(&self) -> Option<Symbol> {
        self.name().map(Symbol::new)
    }

    /// The underlying raw record.
    pub fn record(&self) -> &R {
        &self.inner.record
    }

    /// True if both handles point at the same loaded instance.
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<R> Clone for EnumeratedValue<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> PartialEq for EnumeratedValue<R> {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl<R> Eq for EnumeratedValue<R> {}

impl<R> Hash for EnumeratedValue<R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl<R: fmt::Debug> fmt::Debug for EnumeratedValue<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumeratedValue")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("record", &self.inner.record)
            .finish()
    }
}

// ============================================================================
// ENUMERATION SET
// ============================================================================

/// The ordered, immutable result of one load.
///
/// Order is whatever the store's configured ordering produced. Clones share
/// storage; [`ptr_eq`](Self::ptr_eq) tells whether two sets come from the
/// same load.
pub struct EnumerationSet<R> {
    values: Arc<[EnumeratedValue<R>]>,
}

impl<R> EnumerationSet<R> {
    pub fn new(values: Vec<EnumeratedValue<R>>) -> Self {
        Self {
            values: Arc::from(values),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EnumeratedValue<R>> {
        self.values.iter()
    }

    pub fn as_slice(&self) -> &[EnumeratedValue<R>] {
        &self.values
    }

    /// True if both sets are the same loaded generation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }
}

impl<R> Clone for EnumerationSet<R> {
    fn clone(&self) -> Self {
        Self {
            values: Arc::clone(&self.values),
        }
    }
}

impl<R> Deref for EnumerationSet<R> {
    type Target = [EnumeratedValue<R>];

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

impl<'a, R> IntoIterator for &'a EnumerationSet<R> {
    type Item = &'a EnumeratedValue<R>;
    type IntoIter = std::slice::Iter<'a, EnumeratedValue<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<R: fmt::Debug> fmt::Debug for EnumerationSet<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values.iter()).finish()
    }
}
