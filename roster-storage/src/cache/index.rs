//! Id and name indices over one loaded set.
//!
//! Both are built by a single pass over the set and never change afterwards.
//! Duplicate keys keep the value that appears later in set order.

use super::generation::IndexContext;
use roster_core::{EnumId, EnumeratedValue, EnumerationSet, LookupError, RosterResult};
use std::collections::HashMap;

/// `id -> value` mapping.
pub struct IdIndex<R> {
    entries: HashMap<EnumId, EnumeratedValue<R>>,
}

impl<R> IdIndex<R> {
    pub fn build(set: &EnumerationSet<R>) -> Self {
        let mut entries = HashMap::with_capacity(set.len());
        for value in set {
            entries.insert(value.id(), value.clone());
        }
        Self { entries }
    }

    pub fn get(&self, id: EnumId) -> Option<&EnumeratedValue<R>> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `name -> value` mapping over the configured name column.
pub struct NameIndex<R> {
    entries: HashMap<String, EnumeratedValue<R>>,
}

impl<R> NameIndex<R> {
    /// Build the index, failing if any value has no string name.
    ///
    /// A missing name means the name column is misconfigured or absent from
    /// the record shape, reported as `MissingNameColumn`.
    pub fn build(set: &EnumerationSet<R>, context: &IndexContext) -> RosterResult<Self> {
        let mut entries = HashMap::with_capacity(set.len());
        for value in set {
            let Some(name) = value.name() else {
                return Err(LookupError::MissingNameColumn {
                    type_name: context.type_name.to_string(),
                    column: context.name_column.clone(),
                    table: context.table.clone(),
                    reason: format!(
                        "record {} has no string attribute '{}'",
                        value.id(),
                        context.name_column
                    ),
                }
                .into());
            };
            entries.insert(name.to_string(), value.clone());
        }
        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&EnumeratedValue<R>> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
