//! Error types for schema construction, path resolution and traversal.
//!
//! Configuration problems ([`SchemaError`], [`PathError`]) are raised once,
//! before any document is processed. [`TraversalError`] is raised per
//! extraction call when the live graph contradicts the schema.

use thiserror::Error;

use crate::graph::NodeId;

/// Errors raised while building a [`TypeSchema`](crate::TypeSchema).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The same type name was declared twice.
    #[error("type '{0}' is declared more than once")]
    DuplicateType(String),

    /// A type declares (or inherits) two edges with the same name.
    #[error("type '{type_name}' declares edge '{edge}' more than once")]
    DuplicateEdge { type_name: String, edge: String },

    /// A supertype reference does not name a declared node type.
    #[error("type '{type_name}' extends unknown type '{supertype}'")]
    UnknownSupertype { type_name: String, supertype: String },

    /// An edge targets a type that is not declared.
    #[error("edge '{type_name}/{edge}' targets unknown type '{target}'")]
    UnknownTarget {
        type_name: String,
        edge: String,
        target: String,
    },

    /// Following supertypes from this type leads back to it.
    #[error("type '{0}' inherits from itself")]
    InheritanceCycle(String),

    /// The RON description could not be parsed.
    #[error("schema description: {0}")]
    Description(String),
}

/// Why a path expression was rejected against a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path has no segments.
    #[error("path is empty")]
    Empty,

    /// The start type is not a node type of the schema.
    #[error("'{0}' is not a node type")]
    UnknownStartType(String),

    /// Two consecutive slashes, or a leading/trailing slash.
    #[error("path '{path}' has an empty segment at position {index}")]
    EmptySegment { path: String, index: usize },

    /// The type reached so far has no edge with this name.
    #[error("type '{type_name}' has no edge '{segment}' (path '{path}')")]
    UnknownEdge {
        path: String,
        type_name: String,
        segment: String,
    },

    /// A segment follows an edge that already ended at a primitive value.
    #[error("segment '{segment}' of path '{path}' follows primitive type '{type_name}'")]
    PastPrimitive {
        path: String,
        type_name: String,
        segment: String,
    },

    /// The final segment reaches a type without an extraction behavior.
    #[error("path '{path}' ends at type '{type_name}', which has no accessor")]
    UnusableLeaf { path: String, type_name: String },
}

/// Errors raised while walking the live graph.
///
/// These mean the graph disagrees with the schema the path was validated
/// against; they are surfaced to the caller of the extraction that hit them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraversalError {
    /// A node's type is not declared in the schema.
    #[error("node {node} has type '{type_name}', which the schema does not declare")]
    UnknownNodeType { node: NodeId, type_name: String },

    /// The node's actual type does not expose the edge being followed.
    #[error("node {node} of type '{type_name}' has no edge '{edge}'")]
    MissingEdge {
        node: NodeId,
        type_name: String,
        edge: String,
    },

    /// The stored edge value has a different shape than the schema declares.
    #[error("edge '{edge}' on node {node} holds {found}, schema declares {expected}")]
    EdgeShape {
        node: NodeId,
        edge: String,
        expected: &'static str,
        found: &'static str,
    },

    /// An edge points at a node whose type is not compatible with its target.
    #[error("edge '{edge}' reaches node {target} of type '{found}', expected '{expected}'")]
    IncompatibleTarget {
        edge: String,
        target: NodeId,
        expected: String,
        found: String,
    },
}

/// Errors raised by feature extractors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Traversal(#[from] TraversalError),

    /// The focus node is not an instance of the extractor's focus type.
    #[error("extractor expects '{expected}' focus nodes, got node {node} of type '{found}'")]
    FocusType {
        node: NodeId,
        expected: String,
        found: String,
    },
}

/// Result type for extraction calls.
pub type ExtractResult<T> = Result<T, ExtractError>;
