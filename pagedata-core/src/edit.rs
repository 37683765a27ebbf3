//! Query-driven mutation of a live document.

use crate::error::{Error, Result};
use crate::fetch::{validate_base, validate_overlay, Fetcher};
use crate::projection::FieldProjection;
use crate::registry::ClassRegistry;
use crate::restriction::{Query, Restriction};
use pagedata_types::{ClassRef, Document, FieldRef, FieldTarget, FieldValue, ObjectInstance};
use tracing::debug;

/// Mutation engine: everything a [`Fetcher`] reads, plus create, delete,
/// and bulk field assignment against the live document.
///
/// Read accessors return clones, exactly like a fetcher. Create operations
/// return live `&mut` borrows into the document so callers can chain
/// further field assignment onto just-created instances.
pub struct Editor<'a> {
    document: &'a mut Document,
    translation: Option<&'a Document>,
    registry: &'a dyn ClassRegistry,
    query: Query,
}

impl<'a> Editor<'a> {
    /// Editor for `query` against the live `document`.
    ///
    /// Same base-document rule as [`Fetcher::new`]: the document must not
    /// itself be a translation.
    pub fn new(
        document: &'a mut Document,
        query: Query,
        registry: &'a dyn ClassRegistry,
    ) -> Result<Self> {
        validate_base(document)?;
        Ok(Self {
            document,
            translation: None,
            registry,
            query,
        })
    }

    /// Source document-level field reads from `overlay`. Validated at
    /// attach time, like [`Fetcher::with_translation`]. Writes still go to
    /// the base document.
    pub fn with_translation(mut self, overlay: &'a Document) -> Result<Self> {
        validate_overlay(&*self.document, overlay)?;
        self.translation = Some(overlay);
        Ok(self)
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    fn fetcher(&self) -> Fetcher<'_> {
        Fetcher::attached(&*self.document, self.translation, self.query.clone())
    }

    // Read accessors, delegating to a fetcher over the live document.

    pub fn evaluate(&self) -> Vec<ObjectInstance> {
        self.fetcher().evaluate()
    }

    pub fn list(&self) -> Vec<ObjectInstance> {
        self.fetcher().list()
    }

    pub fn first(&self) -> Option<ObjectInstance> {
        self.fetcher().first()
    }

    pub fn first_assert(&self) -> Result<ObjectInstance> {
        self.fetcher().first_assert()
    }

    pub fn unique(&self) -> Result<ObjectInstance> {
        self.fetcher().unique()
    }

    pub fn count(&self) -> usize {
        self.fetcher().count()
    }

    pub fn iter(&self) -> impl Iterator<Item = ObjectInstance> {
        self.fetcher().evaluate().into_iter()
    }

    pub fn map(&self) -> Vec<(ClassRef, Vec<ObjectInstance>)> {
        self.fetcher().map()
    }

    pub fn fetch_field(&self, field: &FieldRef) -> FieldProjection {
        self.fetcher().fetch_field(field)
    }

    /// Create one new instance per class named by a class restriction.
    ///
    /// Every field-value restriction targeting a named class is applied as
    /// an initial assignment, using the first value the restriction
    /// supplied. No class restriction means nothing is created. All
    /// instances are materialized before any is appended, so a class-load
    /// failure leaves the document untouched.
    ///
    /// Returns live references to the new instances, one entry per named
    /// class in call order.
    pub fn create(&mut self) -> Result<Vec<(ClassRef, &mut ObjectInstance)>> {
        let classes = self.named_classes();

        let mut pending = Vec::with_capacity(classes.len());
        for class in &classes {
            pending.push(self.materialize(class)?);
        }

        let mut keys = Vec::with_capacity(pending.len());
        for instance in pending {
            let stored = self.document.append_object(instance);
            keys.push((stored.class().clone(), stored.number()));
        }
        debug!(
            "created {} object instance(s) on {}",
            keys.len(),
            self.document.reference()
        );
        Ok(self.live_refs(keys))
    }

    /// Like [`Editor::create`], but a class whose instances already match
    /// the query reuses its first match (returned live) instead of
    /// creating a new instance.
    pub fn create_if_not_exists(&mut self) -> Result<Vec<(ClassRef, &mut ObjectInstance)>> {
        let classes = self.named_classes();
        let matched = self.fetcher().evaluate();

        let mut keys: Vec<Option<(ClassRef, u32)>> = Vec::with_capacity(classes.len());
        let mut missing = Vec::new();
        for (idx, class) in classes.iter().enumerate() {
            match matched.iter().find(|instance| instance.class() == class) {
                Some(existing) => keys.push(Some((class.clone(), existing.number()))),
                None => {
                    keys.push(None);
                    missing.push(idx);
                }
            }
        }

        // Materialize every missing class before touching the document.
        let mut pending = Vec::with_capacity(missing.len());
        for &idx in &missing {
            pending.push(self.materialize(&classes[idx])?);
        }
        for (&idx, instance) in missing.iter().zip(pending) {
            let stored = self.document.append_object(instance);
            keys[idx] = Some((stored.class().clone(), stored.number()));
        }

        let keys: Vec<(ClassRef, u32)> = keys.into_iter().flatten().collect();
        Ok(self.live_refs(keys))
    }

    /// [`Editor::create`] restricted to exactly one named class; fails
    /// with `InvalidArgument` otherwise.
    pub fn create_first(&mut self) -> Result<&mut ObjectInstance> {
        self.require_single_class()?;
        let mut created = self.create()?;
        match created.pop() {
            Some((_, instance)) => Ok(instance),
            None => Err(Error::invalid_argument(
                "create_first requires exactly one class restriction",
            )),
        }
    }

    /// [`Editor::create_if_not_exists`] restricted to exactly one named
    /// class.
    pub fn create_first_if_not_exists(&mut self) -> Result<&mut ObjectInstance> {
        self.require_single_class()?;
        let mut touched = self.create_if_not_exists()?;
        match touched.pop() {
            Some((_, instance)) => Ok(instance),
            None => Err(Error::invalid_argument(
                "create_first_if_not_exists requires exactly one class restriction",
            )),
        }
    }

    /// Remove every match from the live document. Returns the detached
    /// instances in their original document order.
    pub fn delete(&mut self) -> Vec<ObjectInstance> {
        let keys: Vec<(ClassRef, u32)> = self
            .fetcher()
            .evaluate()
            .iter()
            .map(|instance| (instance.class().clone(), instance.number()))
            .collect();

        let mut removed = Vec::with_capacity(keys.len());
        for (class, number) in keys {
            if let Some(instance) = self.document.remove_object(&class, number) {
                removed.push(instance);
            }
        }
        debug!(
            "deleted {} object instance(s) from {}",
            removed.len(),
            self.document.reference()
        );
        removed
    }

    /// Remove at most the first match in document order.
    pub fn delete_first(&mut self) -> Option<ObjectInstance> {
        let (class, number) = self
            .fetcher()
            .first()
            .map(|instance| (instance.class().clone(), instance.number()))?;
        self.document.remove_object(&class, number)
    }

    /// Assign `field` across matches; see [`FieldEdit`].
    pub fn edit_field<'b>(&'b mut self, field: &FieldRef) -> FieldEdit<'a, 'b> {
        FieldEdit {
            editor: self,
            field: field.clone(),
        }
    }

    /// Named classes, deduplicated in call order.
    fn named_classes(&self) -> Vec<ClassRef> {
        self.query.classes().into_iter().cloned().collect()
    }

    fn require_single_class(&self) -> Result<()> {
        let count = self.query.classes().len();
        if count == 1 {
            return Ok(());
        }
        Err(Error::invalid_argument(format!(
            "expected exactly one class restriction, found {count}"
        )))
    }

    /// A fresh, seeded instance for `class`, not yet attached to the
    /// document.
    fn materialize(&self, class: &ClassRef) -> Result<ObjectInstance> {
        let mut instance = self.registry.new_instance(class)?;
        self.seed_fields(class, &mut instance)?;
        Ok(instance)
    }

    /// Apply the query's field-value restrictions on `class` as initial
    /// assignments. A multi-value restriction seeds its first supplied
    /// value. A restriction on a document-level field cannot seed an
    /// instance and is an illegal field usage.
    fn seed_fields(&self, class: &ClassRef, instance: &mut ObjectInstance) -> Result<()> {
        for restriction in self.query.restrictions() {
            let Restriction::FieldIn { field, values } = restriction else {
                continue;
            };
            match field.target() {
                FieldTarget::Document => {
                    return Err(Error::IllegalFieldUsage {
                        field: field.name().to_string(),
                        doc: self.document.reference().to_string(),
                        language: self.document.language().to_string(),
                    });
                }
                FieldTarget::Class(owner) if owner == class => {
                    if let Some(value) = values.first() {
                        field.set(instance, value.clone());
                    }
                }
                FieldTarget::Class(_) => {}
            }
        }
        Ok(())
    }

    /// Live borrows of the instances identified by `keys`, in key order.
    fn live_refs(&mut self, keys: Vec<(ClassRef, u32)>) -> Vec<(ClassRef, &mut ObjectInstance)> {
        let mut picked: Vec<(usize, &mut ObjectInstance)> = self
            .document
            .objects_mut()
            .iter_mut()
            .filter_map(|instance| {
                keys.iter()
                    .position(|(class, number)| {
                        class == instance.class() && *number == instance.number()
                    })
                    .map(|pos| (pos, instance))
            })
            .collect();
        picked.sort_by_key(|(pos, _)| *pos);
        picked
            .into_iter()
            .map(|(pos, instance)| (keys[pos].0.clone(), instance))
            .collect()
    }
}

impl std::fmt::Debug for Editor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("document", &self.document.reference())
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

/// Pending field assignment across the editor's matches.
#[derive(Debug)]
pub struct FieldEdit<'a, 'b> {
    editor: &'b mut Editor<'a>,
    field: FieldRef,
}

impl FieldEdit<'_, '_> {
    /// Set the field on the first match in document order whose class owns
    /// the field. Returns whether an instance was actually written; a
    /// document-level field always writes the document directly and
    /// returns true.
    pub fn first(self, value: impl Into<FieldValue>) -> bool {
        self.apply(value.into(), true)
    }

    /// Set the field on every match. Same boolean contract as
    /// [`FieldEdit::first`].
    pub fn all(self, value: impl Into<FieldValue>) -> bool {
        self.apply(value.into(), false)
    }

    fn apply(self, value: FieldValue, only_first: bool) -> bool {
        if self.field.is_document_field() {
            self.editor
                .document
                .set_field(self.field.name().to_string(), value);
            return true;
        }

        // Only matches whose class owns the field can be edited; a match of
        // another class must not consume first()'s single slot.
        let keys: Vec<(ClassRef, u32)> = self
            .editor
            .fetcher()
            .evaluate()
            .iter()
            .filter(|instance| self.field.class() == Some(instance.class()))
            .map(|instance| (instance.class().clone(), instance.number()))
            .collect();

        let take = if only_first { 1 } else { keys.len() };
        let mut affected = false;
        for (class, number) in keys.into_iter().take(take) {
            if let Some(instance) = self.editor.document.object_mut(&class, number) {
                affected |= self.field.set(instance, value.clone());
            }
        }
        affected
    }
}
