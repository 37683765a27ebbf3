//! Object instances attached to a document.

use crate::class::ClassRef;
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One class-based record attached to a document.
///
/// An instance is owned by exactly one [`Document`](crate::Document) and is
/// uniquely identified within it by `(class, number)`. Numbers are assigned
/// per class when the document appends the instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectInstance {
    class: ClassRef,
    #[serde(default)]
    number: u32,
    #[serde(default)]
    properties: BTreeMap<String, FieldValue>,
}

impl ObjectInstance {
    /// A fresh instance of the given class with no properties.
    ///
    /// The number is provisional until the instance is appended to a
    /// document.
    pub fn new(class: ClassRef) -> Self {
        Self {
            class,
            number: 0,
            properties: BTreeMap::new(),
        }
    }

    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub(crate) fn set_number(&mut self, number: u32) {
        self.number = number;
    }

    /// Value of a named property, if set.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.properties.get(name)
    }

    /// Set a property, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.properties.insert(name.into(), value.into());
    }

    /// Remove a property; returns the previous value if any.
    pub fn unset(&mut self, name: &str) -> Option<FieldValue> {
        self.properties.remove(name)
    }

    /// Names of all set properties, in sorted order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }
}
