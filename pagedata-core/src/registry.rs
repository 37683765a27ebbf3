//! Class template lookup.
//!
//! Creating an object instance requires a fresh template for its class.
//! The surrounding system implements [`ClassRegistry`]; [`MapRegistry`] is
//! an in-memory implementation for embedders and tests.

use pagedata_types::{ClassRef, FieldValue, ObjectInstance};
use std::collections::HashMap;

/// The class definition backing an identity could not be loaded.
#[derive(Debug, thiserror::Error)]
#[error("failed to load class {class}")]
pub struct ClassLoadError {
    class: ClassRef,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ClassLoadError {
    pub fn new(class: ClassRef) -> Self {
        Self {
            class,
            source: None,
        }
    }

    pub fn with_source(
        class: ClassRef,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            class,
            source: Some(Box::new(source)),
        }
    }

    pub fn class(&self) -> &ClassRef {
        &self.class
    }
}

/// Produces fresh instance templates for class identities.
///
/// The returned instance carries the class's default property values and a
/// provisional ordinal; the document assigns the real ordinal on append.
pub trait ClassRegistry {
    fn new_instance(&self, class: &ClassRef) -> Result<ObjectInstance, ClassLoadError>;
}

/// In-memory registry mapping class identities to default property sets.
#[derive(Debug, Default)]
pub struct MapRegistry {
    templates: HashMap<ClassRef, Vec<(String, FieldValue)>>,
}

impl MapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class with no default properties.
    pub fn register(&mut self, class: ClassRef) -> &mut Self {
        self.templates.entry(class).or_default();
        self
    }

    /// Register a class whose fresh instances start with the given
    /// property values.
    pub fn register_with_defaults(
        &mut self,
        class: ClassRef,
        defaults: Vec<(String, FieldValue)>,
    ) -> &mut Self {
        self.templates.insert(class, defaults);
        self
    }
}

impl ClassRegistry for MapRegistry {
    fn new_instance(&self, class: &ClassRef) -> Result<ObjectInstance, ClassLoadError> {
        let defaults = self
            .templates
            .get(class)
            .ok_or_else(|| ClassLoadError::new(class.clone()))?;

        let mut instance = ObjectInstance::new(class.clone());
        for (name, value) in defaults {
            instance.set(name.clone(), value.clone());
        }
        Ok(instance)
    }
}
