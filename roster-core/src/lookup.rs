//! Lookup keys and comparison candidates
//!
//! [`LookupKey`] is the typed key a resolver dispatches on. [`Candidate`] is
//! the looser input accepted by value comparisons, which may also be another
//! value, a list, or something that is not a key at all.

use crate::{EnumId, EnumeratedValue, Symbol};
use serde_json::Value;
use std::fmt;

/// A key that can be resolved against an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LookupKey {
    /// Plain string name
    ByName(String),
    /// Symbolic name; indexed like `ByName`
    ByNameSymbol(Symbol),
    /// Store-assigned id
    ById(EnumId),
    /// Always resolves to no value
    None,
}

impl LookupKey {
    /// Short name of the key kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            LookupKey::ByName(_) => "name",
            LookupKey::ByNameSymbol(_) => "symbol",
            LookupKey::ById(_) => "id",
            LookupKey::None => "none",
        }
    }

    /// The name text for name-kind keys.
    pub fn name(&self) -> Option<&str> {
        match self {
            LookupKey::ByName(name) => Some(name),
            LookupKey::ByNameSymbol(symbol) => Some(symbol.as_str()),
            LookupKey::ById(_) | LookupKey::None => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, LookupKey::None)
    }
}

/// Renders the key the way it appears in `NotFound` messages.
impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKey::ByName(name) => write!(f, "{:?}", name),
            LookupKey::ByNameSymbol(symbol) => write!(f, "{:?}", symbol),
            LookupKey::ById(id) => write!(f, "{}", id),
            LookupKey::None => f.write_str("nil"),
        }
    }
}

impl From<&str> for LookupKey {
    fn from(name: &str) -> Self {
        LookupKey::ByName(name.to_string())
    }
}

impl From<String> for LookupKey {
    fn from(name: String) -> Self {
        LookupKey::ByName(name)
    }
}

impl From<&String> for LookupKey {
    fn from(name: &String) -> Self {
        LookupKey::ByName(name.clone())
    }
}

impl From<Symbol> for LookupKey {
    fn from(symbol: Symbol) -> Self {
        LookupKey::ByNameSymbol(symbol)
    }
}

impl From<&Symbol> for LookupKey {
    fn from(symbol: &Symbol) -> Self {
        LookupKey::ByNameSymbol(symbol.clone())
    }
}

impl From<EnumId> for LookupKey {
    fn from(id: EnumId) -> Self {
        LookupKey::ById(id)
    }
}

impl From<i32> for LookupKey {
    fn from(id: i32) -> Self {
        LookupKey::ById(EnumId::from(id))
    }
}

impl<T: Into<LookupKey>> From<Option<T>> for LookupKey {
    fn from(key: Option<T>) -> Self {
        key.map_or(LookupKey::None, Into::into)
    }
}

/// A loosely-typed input that is not a supported key kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedKey {
    pub kind: &'static str,
}

impl fmt::Display for UnsupportedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported lookup key kind: {}", self.kind)
    }
}

impl std::error::Error for UnsupportedKey {}

/// Converts JSON input: null, strings and integers map to keys; floats,
/// integers outside `i64`, booleans, arrays and objects are rejected.
impl TryFrom<&Value> for LookupKey {
    type Error = UnsupportedKey;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(LookupKey::None),
            Value::String(name) => Ok(LookupKey::ByName(name.clone())),
            Value::Number(number) if number.is_f64() => Err(UnsupportedKey { kind: "float" }),
            Value::Number(number) => number.as_i64().map(LookupKey::ById).ok_or(UnsupportedKey {
                kind: "integer out of range",
            }),
            Value::Bool(_) => Err(UnsupportedKey { kind: "boolean" }),
            Value::Array(_) => Err(UnsupportedKey { kind: "array" }),
            Value::Object(_) => Err(UnsupportedKey { kind: "object" }),
        }
    }
}

// ============================================================================
// CANDIDATES
// ============================================================================

/// Input to `is_like` / `is_in` style comparisons.
#[derive(Debug, Clone)]
pub enum Candidate<R> {
    /// Absent input; never like anything
    Nil,
    /// A name, symbol or id, resolved through the enumeration
    Key(LookupKey),
    /// Another enumerated value, compared directly
    Value(EnumeratedValue<R>),
    /// Like if any element is like
    Many(Vec<Candidate<R>>),
    /// Anything else; compared by plain equality, so never like a value
    Other(Value),
}

impl<R> Candidate<R> {
    /// Build a `Many` candidate from anything convertible.
    pub fn many<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Candidate<R>>,
    {
        Candidate::Many(items.into_iter().map(Into::into).collect())
    }
}

impl<R> From<LookupKey> for Candidate<R> {
    fn from(key: LookupKey) -> Self {
        match key {
            LookupKey::None => Candidate::Nil,
            key => Candidate::Key(key),
        }
    }
}

impl<R> From<&str> for Candidate<R> {
    fn from(name: &str) -> Self {
        Candidate::Key(name.into())
    }
}

impl<R> From<String> for Candidate<R> {
    fn from(name: String) -> Self {
        Candidate::Key(name.into())
    }
}

impl<R> From<Symbol> for Candidate<R> {
    fn from(symbol: Symbol) -> Self {
        Candidate::Key(symbol.into())
    }
}

impl<R> From<EnumId> for Candidate<R> {
    fn from(id: EnumId) -> Self {
        Candidate::Key(id.into())
    }
}

impl<R> From<i32> for Candidate<R> {
    fn from(id: i32) -> Self {
        Candidate::Key(id.into())
    }
}

impl<R> From<EnumeratedValue<R>> for Candidate<R> {
    fn from(value: EnumeratedValue<R>) -> Self {
        Candidate::Value(value)
    }
}

impl<R> From<&EnumeratedValue<R>> for Candidate<R> {
    fn from(value: &EnumeratedValue<R>) -> Self {
        Candidate::Value(value.clone())
    }
}

impl<R, T: Into<Candidate<R>>> From<Option<T>> for Candidate<R> {
    fn from(candidate: Option<T>) -> Self {
        candidate.map_or(Candidate::Nil, Into::into)
    }
}

impl<R, T: Into<Candidate<R>>> From<Vec<T>> for Candidate<R> {
    fn from(items: Vec<T>) -> Self {
        Candidate::many(items)
    }
}

impl<R> From<Value> for Candidate<R> {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Candidate::many(items),
            other => match LookupKey::try_from(&other) {
                Ok(key) => key.into(),
                Err(_) => Candidate::Other(other),
            },
        }
    }
}
