use super::field::Operator;
use thiserror::Error;

/// Errors raised at the boundary where rules and documents are read from input
#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("Unknown operator: '{0}'. Valid operators are: {valid}", valid = Operator::known_tokens())]
    UnknownOperator(String),

    #[error("Failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in '{path}': {message}")]
    Syntax { path: String, message: String },

    #[error("Segment document must be a JSON object, got {0}")]
    NotAnObject(String),
}
