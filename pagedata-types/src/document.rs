//! Documents: ordered containers of object instances.

use crate::class::ClassRef;
use crate::object::ObjectInstance;
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Reference identifying a document within a wiki.
///
/// A document and its translations share the same `DocRef`; they differ
/// only in their language tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocRef {
    wiki: String,
    page: String,
}

impl DocRef {
    pub fn new(wiki: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            wiki: wiki.into(),
            page: page.into(),
        }
    }

    /// A document in the main wiki.
    pub fn local(page: impl Into<String>) -> Self {
        Self::new("main", page)
    }

    pub fn wiki(&self) -> &str {
        &self.wiki
    }

    pub fn page(&self) -> &str {
        &self.page
    }
}

impl fmt::Display for DocRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.wiki, self.page)
    }
}

/// A wiki document: document-level fields plus an ordered list of object
/// instances.
///
/// Instances keep their insertion order; nothing ever re-sorts them. Each
/// instance gets a per-class ordinal number when appended, so `(class,
/// number)` is unique within the document. Cloning a document deep-clones
/// its instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    reference: DocRef,
    /// Language of this variant; empty for the default-language document.
    #[serde(default)]
    language: String,
    #[serde(default = "default_language")]
    default_language: String,
    #[serde(default)]
    fields: BTreeMap<String, FieldValue>,
    #[serde(default)]
    objects: Vec<ObjectInstance>,
}

fn default_language() -> String {
    "en".to_string()
}

impl Document {
    /// A new default-language document.
    pub fn new(reference: DocRef) -> Self {
        Self {
            reference,
            language: String::new(),
            default_language: default_language(),
            fields: BTreeMap::new(),
            objects: Vec::new(),
        }
    }

    /// A translation variant of the document identified by `reference`.
    pub fn translation(reference: DocRef, language: impl Into<String>) -> Self {
        let mut doc = Self::new(reference);
        doc.language = language.into();
        doc
    }

    pub fn reference(&self) -> &DocRef {
        &self.reference
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn set_default_language(&mut self, language: impl Into<String>) {
        self.default_language = language.into();
    }

    /// Whether this document is a non-default-language variant.
    pub fn is_translation(&self) -> bool {
        !self.language.is_empty() && self.language != self.default_language
    }

    /// Document-level field value, if set.
    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Set a document-level field, replacing any previous value.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Remove a document-level field; returns the previous value if any.
    pub fn remove_field(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    /// All object instances, in document order.
    pub fn objects(&self) -> &[ObjectInstance] {
        &self.objects
    }

    /// Mutable view of the instances. Callers may edit instances in place
    /// but must not reorder them.
    pub fn objects_mut(&mut self) -> &mut [ObjectInstance] {
        &mut self.objects
    }

    /// The instance identified by `(class, number)`, if present.
    pub fn object(&self, class: &ClassRef, number: u32) -> Option<&ObjectInstance> {
        self.objects
            .iter()
            .find(|o| o.class() == class && o.number() == number)
    }

    pub fn object_mut(&mut self, class: &ClassRef, number: u32) -> Option<&mut ObjectInstance> {
        self.objects
            .iter_mut()
            .find(|o| o.class() == class && o.number() == number)
    }

    /// The ordinal the next appended instance of `class` will receive.
    pub fn next_number(&self, class: &ClassRef) -> u32 {
        self.objects
            .iter()
            .filter(|o| o.class() == class)
            .map(|o| o.number() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Append an instance, assigning its per-class ordinal. Returns a live
    /// reference to the stored instance.
    pub fn append_object(&mut self, mut instance: ObjectInstance) -> &mut ObjectInstance {
        let number = self.next_number(instance.class());
        instance.set_number(number);
        self.objects.push(instance);
        self.objects.last_mut().unwrap()
    }

    /// Detach and return the instance identified by `(class, number)`.
    pub fn remove_object(&mut self, class: &ClassRef, number: u32) -> Option<ObjectInstance> {
        let idx = self
            .objects
            .iter()
            .position(|o| o.class() == class && o.number() == number)?;
        Some(self.objects.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_class() -> ClassRef {
        ClassRef::local("Blog.Post")
    }

    #[test]
    fn test_append_assigns_per_class_numbers() {
        let mut doc = Document::new(DocRef::local("Blog.Welcome"));
        let comment = ClassRef::local("Blog.Comment");

        let n0 = doc.append_object(ObjectInstance::new(post_class())).number();
        let n1 = doc.append_object(ObjectInstance::new(post_class())).number();
        let c0 = doc.append_object(ObjectInstance::new(comment)).number();

        assert_eq!((n0, n1, c0), (0, 1, 0));
    }

    #[test]
    fn test_numbers_not_reused_after_remove_of_lower() {
        let mut doc = Document::new(DocRef::local("Blog.Welcome"));
        doc.append_object(ObjectInstance::new(post_class()));
        doc.append_object(ObjectInstance::new(post_class()));

        doc.remove_object(&post_class(), 0).unwrap();
        // Highest live number is 1, so the next one is 2.
        assert_eq!(doc.next_number(&post_class()), 2);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut doc = Document::new(DocRef::local("Blog.Welcome"));
        doc.append_object(ObjectInstance::new(post_class()));

        let mut copy = doc.clone();
        copy.objects_mut()[0].set("title", "changed");

        assert!(doc.objects()[0].get("title").is_none());
    }

    #[test]
    fn test_translation_marker() {
        let base = Document::new(DocRef::local("Blog.Welcome"));
        assert!(!base.is_translation());

        let fr = Document::translation(DocRef::local("Blog.Welcome"), "fr");
        assert!(fr.is_translation());

        // A variant tagged with the default language is not a translation.
        let mut en = Document::translation(DocRef::local("Blog.Welcome"), "en");
        assert!(!en.is_translation());
        en.set_default_language("de");
        assert!(en.is_translation());
    }

    #[test]
    fn test_document_fields() {
        let mut doc = Document::new(DocRef::local("Blog.Welcome"));
        assert!(doc.get_field("title").is_none());

        doc.set_field("title", "Welcome");
        assert_eq!(doc.get_field("title"), Some(&FieldValue::Text("Welcome".into())));
        assert_eq!(doc.remove_field("title"), Some(FieldValue::Text("Welcome".into())));
    }
}
