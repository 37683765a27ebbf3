//! Scalar projections over matched instances.

use pagedata_types::FieldValue;

/// The values of one field across every matched instance, in document
/// order. One entry per matched instance; instances without a value
/// contribute `None`.
///
/// The projection is restartable: every accessor re-derives from the same
/// captured match set.
#[derive(Debug, Clone)]
pub struct FieldProjection {
    values: Vec<Option<FieldValue>>,
}

impl FieldProjection {
    pub(crate) fn new(values: Vec<Option<FieldValue>>) -> Self {
        Self { values }
    }

    /// The first set value, skipping instances without one.
    pub fn first(&self) -> Option<FieldValue> {
        self.values.iter().flatten().next().cloned()
    }

    /// One entry per matched instance, positionally, absent values
    /// included.
    pub fn list(&self) -> Vec<Option<FieldValue>> {
        self.values.clone()
    }

    /// Distinct set values in first-occurrence order, absent values
    /// excluded.
    pub fn set(&self) -> Vec<FieldValue> {
        let mut distinct: Vec<FieldValue> = Vec::new();
        for value in self.values.iter().flatten() {
            if !distinct.contains(value) {
                distinct.push(value.clone());
            }
        }
        distinct
    }

    /// Iterate one entry per matched instance, absent values included.
    pub fn iter(&self) -> impl Iterator<Item = Option<&FieldValue>> {
        self.values.iter().map(Option::as_ref)
    }

    /// Number of matched instances the projection covers.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
