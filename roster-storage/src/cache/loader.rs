//! Store queries for a whole enumeration.

use crate::RecordStore;
use roster_core::{
    EnumeratedValue, EnumerationConfig, EnumerationSet, FilterExpr, OrderExpr, RosterResult,
};
use std::sync::Arc;

/// Fetches every value of an enumeration in one query.
///
/// The filter, ordering and name column are captured from the configuration
/// at construction and reused for every load.
pub struct Loader<S: RecordStore> {
    store: Arc<S>,
    conditions: Vec<FilterExpr>,
    order: Vec<OrderExpr>,
    name_column: String,
}

impl<S: RecordStore> Loader<S> {
    pub fn new(store: Arc<S>, config: &EnumerationConfig) -> Self {
        Self {
            store,
            conditions: config.conditions.clone(),
            order: config.order.clone(),
            name_column: config.name_column.clone(),
        }
    }

    /// Query the store and wrap the result, preserving store order.
    ///
    /// Store errors propagate unchanged.
    pub fn load(&self) -> RosterResult<EnumerationSet<S::Record>> {
        let records = self.store.query(&self.conditions, &self.order)?;
        let values = records
            .into_iter()
            .map(|record| EnumeratedValue::from_record(record, &self.name_column))
            .collect();
        Ok(EnumerationSet::new(values))
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}
