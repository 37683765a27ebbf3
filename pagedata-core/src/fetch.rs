//! Query evaluation.

use crate::error::{Error, Result};
use crate::projection::FieldProjection;
use crate::restriction::{Query, Restriction};
use pagedata_types::{Cardinality, ClassRef, Document, FieldRef, FieldTarget, FieldValue, ObjectInstance};
use tracing::trace;

/// Where field values are read from during evaluation: object-level values
/// come from the instance, document-level values from the base document or
/// the translation overlay when one is attached.
pub(crate) struct EvalContext<'a> {
    document: &'a Document,
    overlay: Option<&'a Document>,
}

impl<'a> EvalContext<'a> {
    pub(crate) fn new(document: &'a Document, overlay: Option<&'a Document>) -> Self {
        Self { document, overlay }
    }

    /// Resolve a field's value for one instance. Document-level fields are
    /// always sourced from the document (or overlay), never the instance.
    pub(crate) fn field_value<'b>(
        &'b self,
        instance: &'b ObjectInstance,
        field: &FieldRef,
    ) -> Option<&'b FieldValue> {
        match field.target() {
            FieldTarget::Document => self
                .overlay
                .unwrap_or(self.document)
                .get_field(field.name()),
            FieldTarget::Class(_) => field.get(instance),
        }
    }

    pub(crate) fn matches(&self, query: &Query, instance: &ObjectInstance) -> bool {
        let classes = query.classes();
        if !classes.is_empty() && !classes.contains(&instance.class()) {
            return false;
        }

        query.restrictions().iter().all(|restriction| match restriction {
            Restriction::Class(_) => true,
            Restriction::Number(number) => instance.number() == *number,
            Restriction::FieldIn { field, values } => self
                .field_value(instance, field)
                .map_or(false, |actual| value_matches(field, actual, values)),
            Restriction::FieldAbsent(field) => self.field_value(instance, field).is_none(),
            Restriction::FieldPresent(field) => self.field_value(instance, field).is_some(),
        })
    }
}

/// Value-membership test, honoring the field's cardinality: a multi-select
/// instance value matches when it intersects the allowed set; a scalar or
/// single-select value matches when it is a member of the allowed set.
fn value_matches(field: &FieldRef, actual: &FieldValue, allowed: &[FieldValue]) -> bool {
    match field.cardinality() {
        Cardinality::MultiSelect => match actual.as_list() {
            Some(items) => items.iter().any(|item| allowed.contains(item)),
            None => allowed.contains(actual),
        },
        Cardinality::Scalar | Cardinality::SingleSelect => allowed.contains(actual),
    }
}

pub(crate) fn validate_base(document: &Document) -> Result<()> {
    if document.is_translation() {
        return Err(Error::invalid_argument(format!(
            "document {} is a translation (language '{}'); evaluate against the base \
             document and attach the translation with with_translation",
            document.reference(),
            document.language()
        )));
    }
    Ok(())
}

pub(crate) fn validate_overlay(base: &Document, overlay: &Document) -> Result<()> {
    if overlay.reference() != base.reference() {
        return Err(Error::invalid_argument(format!(
            "translation {} does not belong to document {}",
            overlay.reference(),
            base.reference()
        )));
    }
    if !overlay.is_translation() {
        return Err(Error::invalid_argument(format!(
            "document {} (language '{}') is not a translation",
            overlay.reference(),
            overlay.language()
        )));
    }
    Ok(())
}

/// Read-only evaluator of a [`Query`] against a document.
///
/// Every instance a fetcher returns is a clone; mutating it never affects
/// the document.
#[derive(Debug)]
pub struct Fetcher<'a> {
    document: Option<&'a Document>,
    translation: Option<&'a Document>,
    query: Query,
}

impl<'a> Fetcher<'a> {
    /// Evaluator for `query` against `document`.
    ///
    /// Fails if the document is itself a non-default-language translation:
    /// translations are attached via [`Fetcher::with_translation`], not
    /// handed in as the base.
    pub fn new(document: &'a Document, query: Query) -> Result<Self> {
        validate_base(document)?;
        Ok(Self {
            document: Some(document),
            translation: None,
            query,
        })
    }

    /// A fetcher that matches nothing, for call sites with no document
    /// context.
    pub fn empty() -> Fetcher<'static> {
        Fetcher {
            document: None,
            translation: None,
            query: Query::matches_all(),
        }
    }

    pub(crate) fn attached(
        document: &'a Document,
        translation: Option<&'a Document>,
        query: Query,
    ) -> Self {
        Self {
            document: Some(document),
            translation,
            query,
        }
    }

    /// Source document-level field values from `overlay` instead of the
    /// base document. Validated here, at attach time: the overlay must
    /// share the base's reference and must be a translation.
    pub fn with_translation(mut self, overlay: &'a Document) -> Result<Self> {
        let base = self.document.ok_or_else(|| {
            Error::invalid_argument("cannot attach a translation to the empty fetcher")
        })?;
        validate_overlay(base, overlay)?;
        self.translation = Some(overlay);
        Ok(self)
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Evaluate the query, returning cloned matches in document order.
    pub fn evaluate(&self) -> Vec<ObjectInstance> {
        let Some(document) = self.document else {
            return Vec::new();
        };
        let ctx = EvalContext::new(document, self.translation);
        let matched: Vec<ObjectInstance> = document
            .objects()
            .iter()
            .filter(|instance| ctx.matches(&self.query, instance))
            .cloned()
            .collect();
        trace!(
            "query on {} matched {} of {} instances",
            document.reference(),
            matched.len(),
            document.objects().len()
        );
        matched
    }

    /// All matches, in document order.
    pub fn list(&self) -> Vec<ObjectInstance> {
        self.evaluate()
    }

    /// The first match in document order, if any.
    pub fn first(&self) -> Option<ObjectInstance> {
        let Some(document) = self.document else {
            return None;
        };
        let ctx = EvalContext::new(document, self.translation);
        document
            .objects()
            .iter()
            .find(|instance| ctx.matches(&self.query, instance))
            .cloned()
    }

    /// The first match; `Error::EmptyResult` if there is none.
    pub fn first_assert(&self) -> Result<ObjectInstance> {
        self.first().ok_or(Error::EmptyResult)
    }

    /// The single match; fails on zero or more than one.
    pub fn unique(&self) -> Result<ObjectInstance> {
        let mut matched = self.evaluate();
        match matched.len() {
            0 => Err(Error::EmptyResult),
            1 => Ok(matched.remove(0)),
            count => Err(Error::NonUnique { count }),
        }
    }

    pub fn count(&self) -> usize {
        let Some(document) = self.document else {
            return 0;
        };
        let ctx = EvalContext::new(document, self.translation);
        document
            .objects()
            .iter()
            .filter(|instance| ctx.matches(&self.query, instance))
            .count()
    }

    /// Iterate over cloned matches in document order.
    pub fn iter(&self) -> impl Iterator<Item = ObjectInstance> {
        self.evaluate().into_iter()
    }

    /// Matches grouped by class, groups in first-occurrence order,
    /// instances within each group in document order.
    pub fn map(&self) -> Vec<(ClassRef, Vec<ObjectInstance>)> {
        let mut groups: Vec<(ClassRef, Vec<ObjectInstance>)> = Vec::new();
        for instance in self.evaluate() {
            match groups.iter().position(|(class, _)| class == instance.class()) {
                Some(idx) => groups[idx].1.push(instance),
                None => {
                    let class = instance.class().clone();
                    groups.push((class, vec![instance]));
                }
            }
        }
        groups
    }

    /// Project one field's value out of every match.
    pub fn fetch_field(&self, field: &FieldRef) -> FieldProjection {
        let Some(document) = self.document else {
            return FieldProjection::new(Vec::new());
        };
        let ctx = EvalContext::new(document, self.translation);
        let values = document
            .objects()
            .iter()
            .filter(|instance| ctx.matches(&self.query, instance))
            .map(|instance| ctx.field_value(instance, field).cloned())
            .collect();
        FieldProjection::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restriction::QueryBuilder;
    use pagedata_types::{Cardinality, DocRef, FieldTarget};

    fn post() -> ClassRef {
        ClassRef::local("Blog.Post")
    }

    fn comment() -> ClassRef {
        ClassRef::local("Blog.Comment")
    }

    fn category() -> FieldRef {
        FieldRef::class_field("category", post())
    }

    fn sample_doc() -> Document {
        let mut doc = Document::new(DocRef::local("Blog.Welcome"));
        let mut a = ObjectInstance::new(post());
        a.set("category", "news");
        doc.append_object(a);
        let mut b = ObjectInstance::new(post());
        b.set("category", "opinion");
        doc.append_object(b);
        doc.append_object(ObjectInstance::new(comment()));
        doc
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let doc = sample_doc();
        let fetcher = Fetcher::new(&doc, Query::matches_all()).unwrap();
        assert_eq!(fetcher.count(), 3);
    }

    #[test]
    fn test_class_gate() {
        let doc = sample_doc();
        let mut builder = QueryBuilder::new();
        builder.filter_class(comment());
        let fetcher = Fetcher::new(&doc, builder.snapshot()).unwrap();
        assert_eq!(fetcher.count(), 1);

        // Widening: a second class restriction ORs into the allowed set.
        builder.filter_class(post());
        let fetcher = Fetcher::new(&doc, builder.snapshot()).unwrap();
        assert_eq!(fetcher.count(), 3);
    }

    #[test]
    fn test_and_across_calls_or_within_call() {
        let doc = sample_doc();

        let mut both = QueryBuilder::new();
        both.filter_values(category(), vec!["news".into(), "opinion".into()]);
        assert_eq!(Fetcher::new(&doc, both.snapshot()).unwrap().count(), 2);

        let mut neither = QueryBuilder::new();
        neither
            .filter_value(category(), "news")
            .filter_value(category(), "opinion");
        assert_eq!(Fetcher::new(&doc, neither.snapshot()).unwrap().count(), 0);
    }

    #[test]
    fn test_empty_value_set_matches_nothing() {
        let doc = sample_doc();
        let mut builder = QueryBuilder::new();
        builder.filter_values(category(), Vec::new());
        assert_eq!(Fetcher::new(&doc, builder.snapshot()).unwrap().count(), 0);
    }

    #[test]
    fn test_multi_select_intersects() {
        let tags = FieldRef::with_cardinality(
            "tags",
            FieldTarget::Class(post()),
            Cardinality::MultiSelect,
        );
        let mut doc = Document::new(DocRef::local("Blog.Welcome"));
        let mut a = ObjectInstance::new(post());
        a.set("tags", FieldValue::List(vec!["rust".into(), "wiki".into()]));
        doc.append_object(a);
        let mut b = ObjectInstance::new(post());
        b.set("tags", FieldValue::List(vec!["cooking".into()]));
        doc.append_object(b);

        let mut builder = QueryBuilder::new();
        builder.filter_values(tags, vec!["wiki".into(), "gardening".into()]);
        assert_eq!(Fetcher::new(&doc, builder.snapshot()).unwrap().count(), 1);
    }

    #[test]
    fn test_absent_and_present() {
        let doc = sample_doc();

        let mut present = QueryBuilder::new();
        present.filter_present(category());
        assert_eq!(Fetcher::new(&doc, present.snapshot()).unwrap().count(), 2);

        // The comment instance has no category (wrong class entirely).
        let mut absent = QueryBuilder::new();
        absent.filter_absent(category());
        assert_eq!(Fetcher::new(&doc, absent.snapshot()).unwrap().count(), 1);
    }

    #[test]
    fn test_number_restriction() {
        let doc = sample_doc();
        let mut builder = QueryBuilder::new();
        builder.filter_class(post()).filter_number(1);
        let found = Fetcher::new(&doc, builder.snapshot()).unwrap().unique().unwrap();
        assert_eq!(found.get("category"), Some(&FieldValue::Text("opinion".into())));
    }

    #[test]
    fn test_list_preserves_document_order() {
        let doc = sample_doc();
        let mut builder = QueryBuilder::new();
        builder.filter_class(post());
        let list = Fetcher::new(&doc, builder.snapshot()).unwrap().list();
        assert_eq!(list[0].get("category"), Some(&FieldValue::Text("news".into())));
        assert_eq!(list[1].get("category"), Some(&FieldValue::Text("opinion".into())));
    }

    #[test]
    fn test_map_groups_in_first_occurrence_order() {
        let doc = sample_doc();
        let fetcher = Fetcher::new(&doc, Query::matches_all()).unwrap();
        let groups = fetcher.map();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, post());
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, comment());
        assert_eq!(groups[1].1.len(), 1);
    }

    #[test]
    fn test_unique_and_first_assert_errors() {
        let doc = sample_doc();

        let mut none = QueryBuilder::new();
        none.filter_value(category(), "sports");
        let fetcher = Fetcher::new(&doc, none.snapshot()).unwrap();
        assert!(matches!(fetcher.first_assert(), Err(Error::EmptyResult)));
        assert!(matches!(fetcher.unique(), Err(Error::EmptyResult)));

        let mut builder = QueryBuilder::new();
        builder.filter_class(post());
        let fetcher = Fetcher::new(&doc, builder.snapshot()).unwrap();
        assert!(matches!(fetcher.unique(), Err(Error::NonUnique { count: 2 })));
    }

    #[test]
    fn test_returned_instances_are_clones() {
        let doc = sample_doc();
        let fetcher = Fetcher::new(&doc, Query::matches_all()).unwrap();
        let mut first = fetcher.first().unwrap();
        first.set("category", "mutated");

        assert_eq!(
            fetcher.first().unwrap().get("category"),
            Some(&FieldValue::Text("news".into()))
        );
    }

    #[test]
    fn test_document_field_restriction_reads_document() {
        let mut doc = sample_doc();
        doc.set_field("title", "Welcome");
        let title = FieldRef::document_field("title");

        // The document field gates every instance at once.
        let mut builder = QueryBuilder::new();
        builder.filter_value(title.clone(), "Welcome");
        assert_eq!(Fetcher::new(&doc, builder.snapshot()).unwrap().count(), 3);

        let mut wrong = QueryBuilder::new();
        wrong.filter_value(title, "Other");
        assert_eq!(Fetcher::new(&doc, wrong.snapshot()).unwrap().count(), 0);
    }

    #[test]
    fn test_translation_overlay_redirects_document_fields_only() {
        let mut doc = sample_doc();
        doc.set_field("title", "Welcome");
        let mut fr = Document::translation(DocRef::local("Blog.Welcome"), "fr");
        fr.set_field("title", "Bienvenue");

        let title = FieldRef::document_field("title");
        let mut builder = QueryBuilder::new();
        builder.filter_class(post());

        let fetcher = Fetcher::new(&doc, builder.snapshot())
            .unwrap()
            .with_translation(&fr)
            .unwrap();

        // Object selection by class is unaffected by the overlay.
        assert_eq!(fetcher.count(), 2);
        // Document-level reads come from the overlay.
        assert_eq!(
            fetcher.fetch_field(&title).first(),
            Some(FieldValue::Text("Bienvenue".into()))
        );
    }

    #[test]
    fn test_base_document_must_not_be_translation() {
        let fr = Document::translation(DocRef::local("Blog.Welcome"), "fr");
        assert!(matches!(
            Fetcher::new(&fr, Query::matches_all()),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_overlay_validation_fails_fast() {
        let doc = sample_doc();

        let other = Document::translation(DocRef::local("Blog.Other"), "fr");
        assert!(matches!(
            Fetcher::new(&doc, Query::matches_all()).unwrap().with_translation(&other),
            Err(Error::InvalidArgument { .. })
        ));

        let not_translation = Document::new(DocRef::local("Blog.Welcome"));
        assert!(matches!(
            Fetcher::new(&doc, Query::matches_all())
                .unwrap()
                .with_translation(&not_translation),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_empty_fetcher_matches_nothing() {
        let fetcher = Fetcher::empty();
        assert_eq!(fetcher.count(), 0);
        assert!(fetcher.first().is_none());
        assert!(fetcher.list().is_empty());
        assert!(fetcher.fetch_field(&FieldRef::document_field("title")).is_empty());
    }

    #[test]
    fn test_fetch_field_projections() {
        let doc = sample_doc();
        let mut builder = QueryBuilder::new();
        builder.filter_class(post()).filter_class(comment());
        let fetcher = Fetcher::new(&doc, builder.snapshot()).unwrap();

        let projection = fetcher.fetch_field(&category());
        // One entry per matched instance, the comment contributing None.
        assert_eq!(projection.len(), 3);
        assert_eq!(projection.list()[2], None);
        assert_eq!(projection.first(), Some(FieldValue::Text("news".into())));
        assert_eq!(
            projection.set(),
            vec![FieldValue::Text("news".into()), FieldValue::Text("opinion".into())]
        );
    }
}
