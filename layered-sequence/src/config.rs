//! Pipeline configuration loaded from TOML.
//!
//! ```toml
//! container_type = "Sentence"
//! item_type = "Token"
//! gold_path = "posTag/value"
//!
//! [history]
//! name = "PreviousOutcome_L1"
//!
//! [[extractors]]
//! kind = "covered_text"
//!
//! [[extractors]]
//! kind = "type_path"
//! path = "lemma/value"
//! distinct_values_only = true
//! ```

use std::fs;
use std::path::Path;

use layered_features::{
    CombinedExtractor, CoveredTextExtractor, FeatureExtractor, NamingExtractor,
    TraversalOptions, TypePathExtractor, TypeSchema,
};
use serde::{Deserialize, Serialize};

use crate::annotator::{Prediction, SequentialAnnotator, Training};
use crate::error::{ConfigError, ConfigResult};
use crate::instance::InstanceSink;
use crate::scorer::ScoringClassifier;
use crate::sequence::{CoveredSequences, SequenceFeaturizer};
use crate::viterbi::{HistoryFeature, DEFAULT_HISTORY_NAME, DEFAULT_START_MARKER};
use crate::writer::LabelWriter;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Node type whose instances delimit sequences.
    pub container_type: String,
    /// Node type of the positions inside a container.
    pub item_type: String,
    /// Path from an item to its gold label. Required for training.
    #[serde(default)]
    pub gold_path: Option<String>,
    #[serde(default)]
    pub history: Option<HistoryConfig>,
    #[serde(default)]
    pub extractors: Vec<ExtractorSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_name")]
    pub name: String,
    #[serde(default = "default_start_marker")]
    pub start_marker: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            name: default_history_name(),
            start_marker: default_start_marker(),
        }
    }
}

fn default_history_name() -> String {
    DEFAULT_HISTORY_NAME.to_string()
}

fn default_start_marker() -> String {
    DEFAULT_START_MARKER.to_string()
}

/// One extractor applied to every item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractorSpec {
    CoveredText {
        #[serde(default)]
        prefix: Option<String>,
    },
    TypePath {
        path: String,
        #[serde(default)]
        dependent_types: bool,
        #[serde(default)]
        distinct_values_only: bool,
        #[serde(default)]
        duplicate_covered_text: bool,
        /// Keep only the first value the path yields.
        #[serde(default)]
        first_value_only: bool,
        #[serde(default)]
        prefix: Option<String>,
    },
}

impl ExtractorSpec {
    fn prefix(&self) -> Option<&str> {
        match self {
            ExtractorSpec::CoveredText { prefix } | ExtractorSpec::TypePath { prefix, .. } => {
                prefix.as_deref()
            }
        }
    }

    fn build(&self, schema: &TypeSchema, item_type: &str) -> ConfigResult<Box<dyn FeatureExtractor>> {
        let extractor: Box<dyn FeatureExtractor> = match self {
            ExtractorSpec::CoveredText { .. } => Box::new(CoveredTextExtractor),
            ExtractorSpec::TypePath {
                path,
                dependent_types,
                distinct_values_only,
                duplicate_covered_text,
                first_value_only,
                ..
            } => {
                let options = TraversalOptions::new(
                    *dependent_types,
                    *distinct_values_only,
                    *duplicate_covered_text,
                )
                .with_first_value_only(*first_value_only);
                Box::new(TypePathExtractor::new(schema, item_type, path, options)?)
            }
        };
        let extractor = match self.prefix() {
            Some(prefix) => {
                Box::new(NamingExtractor::new(prefix, extractor)) as Box<dyn FeatureExtractor>
            }
            None => extractor,
        };
        Ok(extractor)
    }
}

impl PipelineConfig {
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        toml::from_str(source).map_err(|e| ConfigError::Toml(e.to_string()))
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Build every configured extractor, resolving all paths against `schema`.
    pub fn build_featurizer(&self, schema: &TypeSchema) -> ConfigResult<SequenceFeaturizer> {
        let mut combined = CombinedExtractor::new();
        for spec in &self.extractors {
            combined.push(spec.build(schema, &self.item_type)?);
        }
        tracing::debug!(extractors = combined.len(), "featurizer built");
        Ok(SequenceFeaturizer::new(combined))
    }

    pub fn build_selector(&self, schema: &TypeSchema) -> ConfigResult<CoveredSequences> {
        let selector = CoveredSequences::new(schema, &self.container_type, &self.item_type)?;
        match &self.gold_path {
            Some(path) => selector.with_gold_path(schema, path),
            None => Ok(selector),
        }
    }

    pub fn history_feature(&self) -> Option<HistoryFeature> {
        self.history
            .as_ref()
            .map(|h| HistoryFeature::new(h.name.clone()).with_start_marker(h.start_marker.clone()))
    }

    pub fn training<K: InstanceSink>(
        &self,
        schema: &TypeSchema,
        sink: K,
    ) -> ConfigResult<SequentialAnnotator<Training<K>>> {
        let annotator = SequentialAnnotator::training(
            self.build_selector(schema)?,
            self.build_featurizer(schema)?,
            sink,
        )?;
        Ok(self.apply_history(annotator))
    }

    pub fn prediction<C, W>(
        &self,
        schema: &TypeSchema,
        classifier: C,
        writer: W,
    ) -> ConfigResult<SequentialAnnotator<Prediction<C, W>>>
    where
        C: ScoringClassifier,
        W: LabelWriter,
    {
        let annotator = SequentialAnnotator::prediction(
            self.build_selector(schema)?,
            self.build_featurizer(schema)?,
            classifier,
            writer,
        )?;
        Ok(self.apply_history(annotator))
    }

    fn apply_history<M>(&self, annotator: SequentialAnnotator<M>) -> SequentialAnnotator<M> {
        match self.history_feature() {
            Some(history) => annotator.with_history(history),
            None => annotator,
        }
    }
}
