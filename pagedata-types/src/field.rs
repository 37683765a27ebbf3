//! Field descriptors.
//!
//! A [`FieldRef`] binds a field name to its target: either a class field
//! living on object instances of one class, or a document-level field
//! living directly on the document (title, content and similar singleton
//! fields). The target is an explicit discriminant; evaluation and mutation
//! code switches on it rather than probing types.

use crate::class::ClassRef;
use crate::document::Document;
use crate::object::ObjectInstance;
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a field's value lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldTarget {
    /// A singleton field on the document itself.
    Document,
    /// A field on object instances of the given class.
    Class(ClassRef),
}

/// How many values a field holds, which drives value-membership semantics
/// when filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    /// One free-form value.
    Scalar,
    /// One value chosen from a list of options.
    SingleSelect,
    /// A set of values chosen from a list of options.
    MultiSelect,
}

/// Typed accessor for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRef {
    name: String,
    target: FieldTarget,
    cardinality: Cardinality,
}

impl FieldRef {
    /// A scalar field on object instances of `class`.
    pub fn class_field(name: impl Into<String>, class: ClassRef) -> Self {
        Self::with_cardinality(name, FieldTarget::Class(class), Cardinality::Scalar)
    }

    /// A document-level scalar field (e.g. title, content).
    pub fn document_field(name: impl Into<String>) -> Self {
        Self::with_cardinality(name, FieldTarget::Document, Cardinality::Scalar)
    }

    pub fn with_cardinality(
        name: impl Into<String>,
        target: FieldTarget,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            name: name.into(),
            target,
            cardinality,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &FieldTarget {
        &self.target
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn is_document_field(&self) -> bool {
        matches!(self.target, FieldTarget::Document)
    }

    /// The owning class, if this is a class field.
    pub fn class(&self) -> Option<&ClassRef> {
        match &self.target {
            FieldTarget::Class(class) => Some(class),
            FieldTarget::Document => None,
        }
    }

    /// Read this field from an object instance.
    ///
    /// Returns `None` for document-level fields and for instances of a
    /// different class.
    pub fn get<'a>(&self, instance: &'a ObjectInstance) -> Option<&'a FieldValue> {
        match &self.target {
            FieldTarget::Class(class) if class == instance.class() => instance.get(&self.name),
            _ => None,
        }
    }

    /// Write this field on an object instance.
    ///
    /// No-op for document-level fields and for instances of a different
    /// class; returns whether the value was written.
    pub fn set(&self, instance: &mut ObjectInstance, value: impl Into<FieldValue>) -> bool {
        match &self.target {
            FieldTarget::Class(class) if class == instance.class() => {
                instance.set(self.name.clone(), value);
                true
            }
            _ => false,
        }
    }

    /// Read this field from a document. Only meaningful for document-level
    /// fields.
    pub fn get_document<'a>(&self, document: &'a Document) -> Option<&'a FieldValue> {
        match self.target {
            FieldTarget::Document => document.get_field(&self.name),
            FieldTarget::Class(_) => None,
        }
    }

    /// Write this field on a document. Returns whether the value was
    /// written (false for class fields).
    pub fn set_document(&self, document: &mut Document, value: impl Into<FieldValue>) -> bool {
        match self.target {
            FieldTarget::Document => {
                document.set_field(self.name.clone(), value);
                true
            }
            FieldTarget::Class(_) => false,
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            FieldTarget::Document => write!(f, "doc.{}", self.name),
            FieldTarget::Class(class) => write!(f, "{}.{}", class, self.name),
        }
    }
}
