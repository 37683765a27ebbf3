//! Document-side data model for pagedata
//!
//! This crate provides the value types the query/mutation engine operates
//! on: dynamically typed field values, class identities, field descriptors,
//! object instances, and the document that owns them.

pub mod class;
pub mod document;
pub mod field;
pub mod object;
pub mod value;

pub use class::ClassRef;
pub use document::{DocRef, Document};
pub use field::{Cardinality, FieldRef, FieldTarget};
pub use object::ObjectInstance;
pub use value::FieldValue;
