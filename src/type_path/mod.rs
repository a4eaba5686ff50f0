//! Type paths: slash-delimited edge names walked from a focus node.
//!
//! A path such as `depRel/head/posTag/value` is first resolved against the
//! [`TypeSchema`](crate::TypeSchema) by the [`resolver`], which fails fast on
//! configuration mistakes. The resolved [`TypePath`] is then evaluated on live
//! nodes by the [`traversal`] engine, once per focus node.

pub mod resolver;
pub mod traversal;

use std::fmt;

use crate::schema::{LeafAccessor, Multiplicity};

pub use resolver::{is_valid_path, is_valid_type, resolve_path};
pub use traversal::{extract_path, LeafKind, LeafValue, TraversalOptions};

/// One resolved step of a [`TypePath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    /// Edge name, exactly as declared in the schema.
    pub name: String,
    /// Declared target type (element type for multi-valued edges).
    pub target: String,
    pub multiplicity: Multiplicity,
    pub accessor: LeafAccessor,
}

/// A path expression validated against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypePath {
    start_type: String,
    raw: String,
    segments: Vec<PathSegment>,
}

impl TypePath {
    pub(crate) fn new(start_type: &str, raw: &str, segments: Vec<PathSegment>) -> Self {
        Self {
            start_type: start_type.to_string(),
            raw: raw.to_string(),
            segments,
        }
    }

    /// The path expression as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn start_type(&self) -> &str {
        &self.start_type
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// The segment whose value ends up in the leaf.
    pub fn leaf(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Feature name for values read through this path.
    ///
    /// `lemma/value` becomes `TypePath(LemmaValue)`.
    pub fn feature_name(&self) -> String {
        let mut name = String::from("TypePath(");
        for segment in &self.segments {
            let mut chars = segment.name.chars();
            if let Some(first) = chars.next() {
                name.extend(first.to_uppercase());
                name.push_str(chars.as_str());
            }
        }
        name.push(')');
        name
    }
}

impl fmt::Display for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_type, self.raw)
    }
}
