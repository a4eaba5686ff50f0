//! Error types for the sequence pipeline.
//!
//! [`ConfigError`] is fatal and raised before any document is processed.
//! Everything that goes wrong while processing one sequence is wrapped in a
//! [`SequenceError`] and collected in the document's report.

use layered_features::{ExtractError, NodeId, PathError};
use thiserror::Error;

use crate::label::{Label, LabelType};

/// Failure reported by a [`ScoringClassifier`](crate::ScoringClassifier).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("scoring failed: {0}")]
pub struct ScoreError(pub String);

impl ScoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failure reported by a [`LabelWriter`](crate::LabelWriter).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("label write failed: {0}")]
pub struct WriteError(pub String);

impl WriteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failure reported by an [`InstanceSink`](crate::InstanceSink).
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("instance sink i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("instance serialization: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the Viterbi decoder. Each aborts one sequence.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("label alphabet is empty")]
    EmptyAlphabet,

    /// A score vector does not have one entry per label.
    #[error("position {position}: expected {expected} scores, got {found}")]
    ScoreCount {
        position: usize,
        expected: usize,
        found: usize,
    },

    /// A batch answer does not have one score vector per previous label.
    #[error("position {position}: expected {expected} score vectors, got {found}")]
    BatchSize {
        position: usize,
        expected: usize,
        found: usize,
    },

    #[error("position {position}: score for label {label} is NaN")]
    InvalidScore { position: usize, label: usize },

    #[error("position {position}: {source}")]
    Scorer {
        position: usize,
        #[source]
        source: ScoreError,
    },
}

/// Configuration problems, detected before any document is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("classifier produces {classifier} labels, writer expects {writer}")]
    LabelTypeMismatch {
        classifier: LabelType,
        writer: LabelType,
    },

    #[error("label '{label}' in the classifier alphabet is not of type {expected}")]
    AlphabetLabel { label: Label, expected: LabelType },

    #[error("classifier label alphabet is empty")]
    EmptyAlphabet,

    #[error("training needs a gold label path")]
    MissingGoldPath,

    #[error("'{0}' is not a node type of the schema")]
    UnknownType(String),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("pipeline configuration: {0}")]
    Toml(String),

    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },
}

/// What went wrong with one sequence.
#[derive(Debug, Error)]
pub enum SequenceErrorKind {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("no gold label path is configured")]
    NoGold,

    #[error("position {position} has no gold label")]
    MissingGold { position: NodeId },

    #[error("gold value '{value}' at position {position} is not a label")]
    UnusableGold { position: NodeId, value: String },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

/// A failure confined to one sequence of a document.
#[derive(Debug, Error)]
#[error("sequence {sequence}: {kind}")]
pub struct SequenceError {
    /// Index of the sequence in selection order.
    pub sequence: usize,
    pub kind: SequenceErrorKind,
}

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;
