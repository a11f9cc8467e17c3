//! Error types for extraction and document construction.

use thiserror::Error;

/// Errors that can occur while extracting or building announcement documents.
///
/// Circular references met during deep resolution are not errors, see
/// [`Diagnostic`](super::term::Diagnostic).
#[derive(Debug, Error)]
pub enum AnnounceError {
    /// An extraction needed a statement for this predicate and found none.
    #[error("Missing required predicate <{predicate}> on {subject}")]
    MissingRequiredPredicate { subject: String, predicate: String },

    /// The bucketizer short name is not in the builder's table.
    #[error("{given} is not a valid bucketizer. valid options are: {}", .valid.join(", "))]
    InvalidBucketizer { given: String, valid: Vec<String> },

    /// A view id has no entry in the external node metadata.
    #[error("The tree:Node (a view) {0} was not found in the node metadata")]
    UnknownViewNode(String),

    /// The external node/relation metadata extractor failed.
    #[error("Metadata extraction failed: {0}")]
    Metadata(String),

    /// RDF text could not be parsed into a graph.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A document could not be materialized into triples.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnnounceError>;

impl AnnounceError {
    pub(crate) fn missing(subject: &str, predicate: &str) -> Self {
        AnnounceError::MissingRequiredPredicate {
            subject: subject.to_string(),
            predicate: predicate.to_string(),
        }
    }
}
