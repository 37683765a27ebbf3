//! The restriction model and query builder.
//!
//! Restrictions added by separate builder calls combine with AND; the
//! values supplied within a single [`QueryBuilder::filter_values`] call
//! combine with OR. Class restrictions are the exception: each
//! [`QueryBuilder::filter_class`] call widens an allowed-class OR set,
//! which still ANDs against every other restriction kind.

use pagedata_types::{ClassRef, FieldRef, FieldValue};

/// One immutable filter predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Restriction {
    /// Instance's class is this class (ORed with other class restrictions).
    Class(ClassRef),
    /// Field's value is a member of `values`. An empty value set matches
    /// nothing.
    FieldIn {
        field: FieldRef,
        values: Vec<FieldValue>,
    },
    /// Field is unset.
    FieldAbsent(FieldRef),
    /// Field is set.
    FieldPresent(FieldRef),
    /// Instance's ordinal number equals this value.
    Number(u32),
}

/// An immutable snapshot of restrictions, evaluated in document order.
///
/// A query with zero restrictions matches every instance in the document.
#[derive(Debug, Clone, Default)]
pub struct Query {
    restrictions: Vec<Restriction>,
}

impl Query {
    /// The query that matches every instance.
    pub fn matches_all() -> Self {
        Self::default()
    }

    pub fn restrictions(&self) -> &[Restriction] {
        &self.restrictions
    }

    /// The allowed-class set, deduplicated in call order. Empty when no
    /// class restriction was added, meaning all classes are allowed.
    pub fn classes(&self) -> Vec<&ClassRef> {
        let mut classes: Vec<&ClassRef> = Vec::new();
        for restriction in &self.restrictions {
            if let Restriction::Class(class) = restriction {
                if !classes.contains(&class) {
                    classes.push(class);
                }
            }
        }
        classes
    }
}

/// Mutable builder for [`Query`] snapshots.
///
/// Deriving a snapshot deep-copies the restriction list; the builder stays
/// freely mutable afterwards without affecting already-derived snapshots.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    restrictions: Vec<Restriction>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow instances of `class`. Repeated calls widen the allowed set.
    pub fn filter_class(&mut self, class: ClassRef) -> &mut Self {
        self.restrictions.push(Restriction::Class(class));
        self
    }

    /// Allow instances of each of `classes`.
    pub fn filter_classes(&mut self, classes: impl IntoIterator<Item = ClassRef>) -> &mut Self {
        for class in classes {
            self.filter_class(class);
        }
        self
    }

    /// Require `field` to equal `value`.
    pub fn filter_value(&mut self, field: FieldRef, value: impl Into<FieldValue>) -> &mut Self {
        self.filter_values(field, vec![value.into()])
    }

    /// Require `field` to equal at least one of `values` (OR within this
    /// call). A later call on the same field narrows further (AND across
    /// calls).
    pub fn filter_values(&mut self, field: FieldRef, values: Vec<FieldValue>) -> &mut Self {
        self.restrictions.push(Restriction::FieldIn { field, values });
        self
    }

    /// Require `field` to be unset.
    pub fn filter_absent(&mut self, field: FieldRef) -> &mut Self {
        self.restrictions.push(Restriction::FieldAbsent(field));
        self
    }

    /// Require `field` to be set.
    pub fn filter_present(&mut self, field: FieldRef) -> &mut Self {
        self.restrictions.push(Restriction::FieldPresent(field));
        self
    }

    /// Require the instance's ordinal number to equal `number`.
    pub fn filter_number(&mut self, number: u32) -> &mut Self {
        self.restrictions.push(Restriction::Number(number));
        self
    }

    /// Snapshot the current restriction list into an immutable [`Query`].
    pub fn snapshot(&self) -> Query {
        Query {
            restrictions: self.restrictions.clone(),
        }
    }
}
