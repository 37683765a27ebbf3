//! # pagedata-core
//!
//! Query-and-mutation engine for the typed object instances attached to a
//! wiki document.
//!
//! A [`QueryBuilder`] accumulates restrictions and snapshots them into an
//! immutable [`Query`]; a [`Fetcher`] evaluates the query read-only against
//! a document, returning clones; an [`Editor`] additionally creates,
//! finds-or-creates, and deletes instances on the live document and
//! bulk-assigns field values.
//!
//! ## Example
//!
//! ```
//! use pagedata_core::{Editor, Fetcher, MapRegistry, QueryBuilder};
//! use pagedata_types::{ClassRef, DocRef, Document, FieldRef};
//!
//! let class = ClassRef::local("Blog.Post");
//! let category = FieldRef::class_field("category", class.clone());
//!
//! let mut registry = MapRegistry::new();
//! registry.register(class.clone());
//!
//! let mut doc = Document::new(DocRef::local("Blog.Welcome"));
//!
//! let mut builder = QueryBuilder::new();
//! builder.filter_class(class.clone()).filter_value(category.clone(), "news");
//!
//! let mut editor = Editor::new(&mut doc, builder.snapshot(), &registry).unwrap();
//! editor.create_first_if_not_exists().unwrap();
//! drop(editor);
//!
//! let fetcher = Fetcher::new(&doc, builder.snapshot()).unwrap();
//! assert_eq!(fetcher.count(), 1);
//! ```

pub mod edit;
pub mod error;
pub mod fetch;
pub mod projection;
pub mod registry;
pub mod restriction;

pub use edit::{Editor, FieldEdit};
pub use error::{Error, Result};
pub use fetch::Fetcher;
pub use projection::FieldProjection;
pub use registry::{ClassLoadError, ClassRegistry, MapRegistry};
pub use restriction::{Query, QueryBuilder, Restriction};
