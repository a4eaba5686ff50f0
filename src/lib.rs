#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Feature extraction over graphs of typed, span-anchored annotations.
//!
//! A document is annotated by upstream taggers into a graph of nodes (tokens,
//! lemmas, part-of-speech tags, dependency relations, ...). Each node has a
//! type, a character span, and named edges to primitive values or to other
//! nodes. This crate reads that graph and turns it into features for a
//! classifier.
//!
//! ## Overview
//!
//! Paths such as `depRel/head/posTag/value` are validated once against a
//! [`TypeSchema`] and then walked from every focus node. Multi-valued edges
//! fan out; [`TraversalOptions`] decides which of the resulting values are
//! kept.
//!
//! ## Modules
//!
//! - [`schema`] - Node types, edges, and how leaf values are read
//! - [`graph`] - The [`AnnotationGraph`] accessor and an in-memory document
//! - [`type_path`] - Path validation and graph traversal
//! - [`extractor`] - Feature extractors and their composition
//! - [`error`] - Error types

pub mod error;
pub mod extractor;
pub mod graph;
pub mod schema;
pub mod type_path;

pub use error::{ExtractError, ExtractResult, PathError, SchemaError, TraversalError};
pub use extractor::{
    CombinedExtractor, CombinedRelationExtractor, CoveredTextExtractor, ExtractionContext,
    Feature, FeatureExtractor, FeatureValue, NamingExtractor, RelationExtractor,
    RelativePosition, RelativePositionExtractor, SourceExtractor, TargetExtractor,
    TypePathExtractor,
};
pub use graph::{AnnotatedDocument, AnnotationGraph, EdgeValue, NodeId, Primitive, Span};
pub use schema::{
    EdgeInfo, LeafAccessor, Multiplicity, PrimitiveKind, SchemaBuilder, SchemaDescription,
    TypeKind, TypeSchema,
};
pub use type_path::{
    extract_path, is_valid_path, is_valid_type, resolve_path, LeafKind, LeafValue,
    TraversalOptions, TypePath,
};

#[cfg(test)]
mod tests {
    mod fixtures;
    mod extractors;
    mod properties;
    mod traversal;
}
