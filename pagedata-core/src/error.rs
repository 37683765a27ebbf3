//! Errors raised by the query and mutation engine.

use crate::registry::ClassLoadError;

/// Errors that can occur while building, evaluating, or mutating.
///
/// All failures are synchronous and raised at the offending call; nothing
/// is retried, deferred, or swallowed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A constructor or attach operation received an unusable argument,
    /// e.g. a base document that is itself a translation, or an overlay
    /// whose reference does not match the base.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// `first_assert()` or `unique()` found no match.
    #[error("empty result: no object instance matched the query")]
    EmptyResult,

    /// `unique()` found more than one match.
    #[error("non unique result: {count} object instances matched the query")]
    NonUnique { count: usize },

    /// The class registry could not materialize a template for a class
    /// named by the query. No instances are persisted for the failing call.
    #[error(transparent)]
    ClassLoad(#[from] ClassLoadError),

    /// A document-level field was used where an object-class field is
    /// required.
    #[error(
        "illegal use of document field '{field}' on {doc} (language '{language}'): \
         an object class field is required"
    )]
    IllegalFieldUsage {
        field: String,
        doc: String,
        language: String,
    },
}

impl Error {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
