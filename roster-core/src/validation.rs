//! Record-level error collection

use crate::ValidationError;

/// Validation failures attached to a record being saved or destroyed.
///
/// The persistence pipeline owns one of these per mutation and aborts the
/// mutation if it is non-empty after the hooks have run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordErrors {
    errors: Vec<ValidationError>,
}

impl RecordErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a failure to the record.
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Failures attached to a given field.
    pub fn on(&self, field: &str) -> Vec<&ValidationError> {
        self.errors.iter().filter(|e| e.field() == field).collect()
    }

    /// Human-readable messages, in the order they were added.
    pub fn full_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }
}

impl<'a> IntoIterator for &'a RecordErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_grouped_by_field() {
        let mut errors = RecordErrors::new();
        assert!(errors.is_empty());

        errors.add(ValidationError::RequiredFieldMissing {
            field: "label".to_string(),
        });
        errors.add(ValidationError::MutationBlocked {
            field: "label".to_string(),
            type_name: "Color".to_string(),
        });

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.on("label").len(), 2);
        assert!(errors.on("name").is_empty());
        assert_eq!(errors.full_messages()[0], "Required field missing: label");

        errors.clear();
        assert!(errors.is_empty());
    }
}
