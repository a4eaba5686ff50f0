//! Feature extractors.
//!
//! Every extractor turns a focus node (or a source/target pair) into a list of
//! [`Feature`]s. Extractors hold configuration only, never per-call state, so
//! a single instance can serve every node of every document, from any thread.
//!
//! - [`CoveredTextExtractor`] - the text spanned by the focus node
//! - [`RelativePositionExtractor`] - how two spans are placed relative to each other
//! - [`TypePathExtractor`] - values reached by walking a type path
//! - [`CombinedExtractor`], [`NamingExtractor`], [`SourceExtractor`],
//!   [`TargetExtractor`], [`CombinedRelationExtractor`] - composition

mod combine;
mod covered_text;
mod relative_position;
mod type_path;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ExtractResult;
use crate::graph::{AnnotationGraph, NodeId, Primitive};
use crate::schema::TypeSchema;

pub use combine::{
    CombinedExtractor, CombinedRelationExtractor, NamingExtractor, SourceExtractor,
    TargetExtractor,
};
pub use covered_text::CoveredTextExtractor;
pub use relative_position::{RelativePosition, RelativePositionExtractor};
pub use type_path::TypePathExtractor;

/// The value of a [`Feature`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// A value read through a type path, keeping the path it came from.
    TypePath { path: String, value: Primitive },
}

impl FeatureValue {
    /// The underlying value as a primitive, dropping any path label.
    pub fn to_primitive(&self) -> Primitive {
        match self {
            FeatureValue::Text(s) => Primitive::Str(s.clone()),
            FeatureValue::Integer(i) => Primitive::Int(*i),
            FeatureValue::Float(x) => Primitive::Float(*x),
            FeatureValue::Boolean(b) => Primitive::Bool(*b),
            FeatureValue::TypePath { value, .. } => value.clone(),
        }
    }

    /// The originating path, for type path values.
    pub fn path(&self) -> Option<&str> {
        match self {
            FeatureValue::TypePath { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Text(s) => f.write_str(s),
            FeatureValue::Integer(i) => write!(f, "{}", i),
            FeatureValue::Float(x) => write!(f, "{}", x),
            FeatureValue::Boolean(b) => write!(f, "{}", b),
            FeatureValue::TypePath { value, .. } => write!(f, "{}", value),
        }
    }
}

impl From<Primitive> for FeatureValue {
    fn from(value: Primitive) -> Self {
        match value {
            Primitive::Str(s) => FeatureValue::Text(s),
            Primitive::Int(i) => FeatureValue::Integer(i),
            Primitive::Float(x) => FeatureValue::Float(x),
            Primitive::Bool(b) => FeatureValue::Boolean(b),
        }
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Text(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::Text(value)
    }
}

/// A named value produced by an extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: FeatureValue,
}

impl Feature {
    pub fn new(name: impl Into<String>, value: impl Into<FeatureValue>) -> Self {
        Self {
            name: Some(name.into()),
            value: value.into(),
        }
    }

    pub fn unnamed(value: impl Into<FeatureValue>) -> Self {
        Self {
            name: None,
            value: value.into(),
        }
    }

    /// Prepend `prefix` to the name: `prefix_name`, or just `prefix` for an
    /// unnamed feature.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.name = Some(match self.name.take() {
            Some(name) => format!("{}_{}", prefix, name),
            None => prefix.to_string(),
        });
        self
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}={}", name, self.value),
            None => write!(f, "{}", self.value),
        }
    }
}

/// What extractors read from: the schema and one document's graph.
///
/// The schema must be the one the extractors were configured against.
#[derive(Clone, Copy)]
pub struct ExtractionContext<'a> {
    pub schema: &'a TypeSchema,
    pub graph: &'a dyn AnnotationGraph,
}

impl<'a> ExtractionContext<'a> {
    pub fn new(schema: &'a TypeSchema, graph: &'a dyn AnnotationGraph) -> Self {
        Self { schema, graph }
    }
}

impl fmt::Debug for ExtractionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionContext")
            .field("text_len", &self.graph.text().len())
            .finish()
    }
}

/// Extracts features from a single focus node.
pub trait FeatureExtractor: Send + Sync {
    fn extract(&self, ctx: &ExtractionContext<'_>, focus: NodeId) -> ExtractResult<Vec<Feature>>;
}

/// Extracts features from an ordered pair of nodes.
pub trait RelationExtractor: Send + Sync {
    fn extract(
        &self,
        ctx: &ExtractionContext<'_>,
        source: NodeId,
        target: NodeId,
    ) -> ExtractResult<Vec<Feature>>;
}

impl<E: FeatureExtractor + ?Sized> FeatureExtractor for Box<E> {
    fn extract(&self, ctx: &ExtractionContext<'_>, focus: NodeId) -> ExtractResult<Vec<Feature>> {
        (**self).extract(ctx, focus)
    }
}

impl<E: FeatureExtractor + ?Sized> FeatureExtractor for Arc<E> {
    fn extract(&self, ctx: &ExtractionContext<'_>, focus: NodeId) -> ExtractResult<Vec<Feature>> {
        (**self).extract(ctx, focus)
    }
}

impl<E: RelationExtractor + ?Sized> RelationExtractor for Box<E> {
    fn extract(
        &self,
        ctx: &ExtractionContext<'_>,
        source: NodeId,
        target: NodeId,
    ) -> ExtractResult<Vec<Feature>> {
        (**self).extract(ctx, source, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixing_names() {
        let named = Feature::new("TypePath(LemmaValue)", "run").with_prefix("Source");
        assert_eq!(named.name.as_deref(), Some("Source_TypePath(LemmaValue)"));

        let unnamed = Feature::unnamed("run").with_prefix("Target");
        assert_eq!(unnamed.name.as_deref(), Some("Target"));
    }

    #[test]
    fn display_forms() {
        let feature = Feature::new(
            "TypePath(LemmaBegin)",
            FeatureValue::TypePath {
                path: "lemma/begin".into(),
                value: Primitive::Int(1),
            },
        );
        assert_eq!(feature.to_string(), "TypePath(LemmaBegin)=1");
        assert_eq!(feature.value.path(), Some("lemma/begin"));
        assert_eq!(Feature::unnamed("Hello").to_string(), "Hello");
    }

    #[test]
    fn primitive_conversion() {
        assert_eq!(
            FeatureValue::from(Primitive::Bool(true)),
            FeatureValue::Boolean(true)
        );
        assert_eq!(
            FeatureValue::TypePath {
                path: "value".into(),
                value: Primitive::Str("NN".into())
            }
            .to_primitive(),
            Primitive::Str("NN".into())
        );
    }
}
