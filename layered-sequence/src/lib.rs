#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Structured sequence classification on top of `layered-features`.
//!
//! Documents are split into sequences (for example the tokens of each
//! sentence). Every position is featurized with the extractors of
//! `layered-features`; then either the positions are written out as training
//! instances with their gold labels, or a trained model's per-position scores
//! are decoded into the best label sequence with Viterbi search.
//!
//! ## Modules
//!
//! - [`annotator`] - Training and prediction over whole documents
//! - [`viterbi`] - The decoder and its previous-label history feature
//! - [`sequence`] - Sequence selection and featurization
//! - [`scorer`] - The scoring classifier boundary
//! - [`instance`] - Training instances and sinks
//! - [`writer`] - Where decoded labels go
//! - [`relation`] - Instances for node pairs
//! - [`config`] - TOML pipeline configuration
//! - [`label`] - Labels and label types
//! - [`error`] - Error types

pub mod annotator;
pub mod config;
pub mod error;
pub mod instance;
pub mod label;
pub mod relation;
pub mod scorer;
pub mod sequence;
pub mod viterbi;
pub mod writer;

pub use annotator::{
    check_compatibility, DocumentState, Prediction, ProcessReport, SequentialAnnotator, Training,
};
pub use config::{ExtractorSpec, HistoryConfig, PipelineConfig};
pub use error::{
    ConfigError, ConfigResult, DecodeError, ScoreError, SequenceError, SequenceErrorKind,
    SinkError, WriteError,
};
pub use instance::{Instance, InstanceSink, JsonLinesSink, VecSink};
pub use label::{Label, LabelType};
pub use relation::{consecutive_container_pairs, first_covered, RelationInstanceBuilder};
pub use scorer::{ScoringClassifier, WeightTable};
pub use sequence::{CoveredSequences, Sequence, SequenceFeaturizer, SequenceSelector};
pub use viterbi::{HistoryFeature, ViterbiDecoder};
pub use writer::{CollectingWriter, LabelWriter};
