//! Filter and ordering expressions passed to record store queries
//!
//! An enumeration's `conditions` and `order` are fixed at configuration time
//! and handed unchanged to every query the loader issues. Stores that talk to
//! a real database translate them; the in-memory store evaluates them with
//! [`FilterExpr::matches`] and [`OrderExpr::compare`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Filter operator for field comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Equal to
    Eq,
    /// Not equal to
    Ne,
    /// Greater than
    Gt,
    /// Less than
    Lt,
    /// Greater than or equal
    Gte,
    /// Less than or equal
    Lte,
    /// Contains substring (for strings)
    Contains,
    /// In list of values
    In,
}

/// A single field comparison. A list of expressions is a conjunction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterExpr {
    /// Field to filter on
    pub field: String,
    /// Operator to apply
    pub operator: FilterOperator,
    /// Value to compare against (JSON value for flexibility)
    pub value: Value,
}

impl FilterExpr {
    /// Create a new filter expression.
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Create an equality filter.
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOperator::Eq, value)
    }

    /// Create an inequality filter.
    pub fn ne(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOperator::Ne, value)
    }

    /// Create a contains filter.
    pub fn contains(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOperator::Contains, value)
    }

    /// Create a membership filter.
    pub fn is_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(field, FilterOperator::In, Value::Array(values))
    }

    /// Evaluate the expression against a record attribute.
    ///
    /// A missing attribute only satisfies `Ne`.
    pub fn matches(&self, attribute: Option<&Value>) -> bool {
        let Some(actual) = attribute else {
            return self.operator == FilterOperator::Ne;
        };

        match self.operator {
            FilterOperator::Eq => actual == &self.value,
            FilterOperator::Ne => actual != &self.value,
            FilterOperator::Gt => compare_values(actual, &self.value) == Some(Ordering::Greater),
            FilterOperator::Lt => compare_values(actual, &self.value) == Some(Ordering::Less),
            FilterOperator::Gte => matches!(
                compare_values(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOperator::Lte => matches!(
                compare_values(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOperator::Contains => match (actual, &self.value) {
                (Value::String(haystack), Value::String(needle)) => haystack.contains(needle.as_str()),
                (Value::Array(items), needle) => items.contains(needle),
                _ => false,
            },
            FilterOperator::In => match &self.value {
                Value::Array(candidates) => candidates.contains(actual),
                _ => false,
            },
        }
    }
}

/// Sort direction for an ordering expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One key of a query ordering. A list of expressions sorts lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderExpr {
    /// Field to sort by
    pub field: String,
    /// Sort direction
    #[serde(default)]
    pub direction: SortDirection,
}

impl OrderExpr {
    /// Ascending order on a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Descending order on a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Compare two attribute values under this ordering.
    ///
    /// Missing attributes sort first in either direction; incomparable values
    /// tie.
    pub fn compare(&self, a: Option<&Value>, b: Option<&Value>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => {
                let ordering = compare_values(a, b).unwrap_or(Ordering::Equal);
                match self.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            }
        }
    }
}

fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
        },
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_eq_and_ne() {
        let active = json!(true);
        assert!(FilterExpr::eq("active", json!(true)).matches(Some(&active)));
        assert!(!FilterExpr::ne("active", json!(true)).matches(Some(&active)));
    }

    #[test]
    fn test_filter_missing_attribute_only_matches_ne() {
        assert!(!FilterExpr::eq("active", json!(true)).matches(None));
        assert!(FilterExpr::ne("active", json!(true)).matches(None));
        assert!(!FilterExpr::is_in("kind", vec![json!("a")]).matches(None));
    }

    #[test]
    fn test_filter_numeric_comparisons() {
        let position = json!(5);
        assert!(FilterExpr::new("position", FilterOperator::Gt, json!(3)).matches(Some(&position)));
        assert!(FilterExpr::new("position", FilterOperator::Lte, json!(5)).matches(Some(&position)));
        assert!(!FilterExpr::new("position", FilterOperator::Lt, json!(5)).matches(Some(&position)));
        assert!(FilterExpr::new("position", FilterOperator::Gte, json!(4.5)).matches(Some(&position)));
    }

    #[test]
    fn test_filter_contains_and_in() {
        let name = json!("crimson red");
        assert!(FilterExpr::contains("name", json!("red")).matches(Some(&name)));
        assert!(!FilterExpr::contains("name", json!("blue")).matches(Some(&name)));

        let tags = json!(["warm", "primary"]);
        assert!(FilterExpr::contains("tags", json!("warm")).matches(Some(&tags)));

        let kind = json!("warm");
        assert!(FilterExpr::is_in("kind", vec![json!("cool"), json!("warm")]).matches(Some(&kind)));
    }

    #[test]
    fn test_order_compare_directions() {
        let a = json!("amber");
        let b = json!("blue");
        assert_eq!(OrderExpr::asc("name").compare(Some(&a), Some(&b)), Ordering::Less);
        assert_eq!(OrderExpr::desc("name").compare(Some(&a), Some(&b)), Ordering::Greater);
        assert_eq!(OrderExpr::asc("name").compare(None, Some(&b)), Ordering::Less);
    }

    #[test]
    fn test_order_missing_attribute_sorts_first_when_descending() {
        let b = json!(2);
        let desc = OrderExpr::desc("position");
        assert_eq!(desc.compare(None, Some(&b)), Ordering::Less);
        assert_eq!(desc.compare(Some(&b), None), Ordering::Greater);
        assert_eq!(desc.compare(None, None), Ordering::Equal);
    }

    #[test]
    fn test_order_expr_deserializes_with_default_direction() {
        let order: OrderExpr = serde_json::from_value(json!({ "field": "position" })).unwrap();
        assert_eq!(order, OrderExpr::asc("position"));
    }
}
