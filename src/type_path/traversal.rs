//! Evaluation of resolved type paths on the live annotation graph.
//!
//! The walk keeps a working set of nodes. Every segment except the last
//! replaces the working set by the nodes reached through that edge; the last
//! segment reads leaf values. The number of steps is bounded by the number of
//! segments, so back-reference cycles in the graph (`head` ↔ `dependents`)
//! cannot make a walk run away.

use std::collections::HashSet;

use tracing::trace;

use crate::error::TraversalError;
use crate::graph::{AnnotationGraph, EdgeValue, NodeId, Primitive};
use crate::schema::{LeafAccessor, PrimitiveKind, TypeSchema};

use super::{PathSegment, TypePath};

/// Expansion policy for multi-valued edges.
///
/// | `include_distinct_values_only` | `include_duplicate_covered_text` | leaves |
/// |---|---|---|
/// | false | false | all, in traversal order |
/// | false | true | all, minus exact repeats of (origin covered text, value) |
/// | true | ignored | first occurrence of each distinct value |
///
/// `first_value_only` then keeps at most the first remaining leaf.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalOptions {
    /// Accept subtype instances on an edge, plus compatible nodes stacked at
    /// the same span as a reached node.
    pub use_dependent_type_feature: bool,
    pub include_distinct_values_only: bool,
    pub include_duplicate_covered_text: bool,
    pub first_value_only: bool,
}

impl TraversalOptions {
    pub fn new(
        use_dependent_type_feature: bool,
        include_distinct_values_only: bool,
        include_duplicate_covered_text: bool,
    ) -> Self {
        Self {
            use_dependent_type_feature,
            include_distinct_values_only,
            include_duplicate_covered_text,
            first_value_only: false,
        }
    }

    pub fn with_dependent_types(mut self, enabled: bool) -> Self {
        self.use_dependent_type_feature = enabled;
        self
    }

    pub fn with_distinct_values_only(mut self, enabled: bool) -> Self {
        self.include_distinct_values_only = enabled;
        self
    }

    pub fn with_duplicate_covered_text(mut self, enabled: bool) -> Self {
        self.include_duplicate_covered_text = enabled;
        self
    }

    pub fn with_first_value_only(mut self, enabled: bool) -> Self {
        self.first_value_only = enabled;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    /// A primitive read through the final edge.
    Primitive,
    /// The covered text of a node reached by the final edge.
    CoveredText,
}

/// A value found at the end of a path.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafValue {
    pub value: Primitive,
    /// For primitives, the node the value was read from; for covered text,
    /// the node whose text it is.
    pub origin: NodeId,
    pub kind: LeafKind,
}

/// Walk `path` from `start` and collect its leaf values.
///
/// Errors mean the graph contradicts the schema; nothing collected before the
/// error is returned.
pub fn extract_path<G>(
    schema: &TypeSchema,
    graph: &G,
    start: NodeId,
    path: &TypePath,
    options: TraversalOptions,
) -> Result<Vec<LeafValue>, TraversalError>
where
    G: AnnotationGraph + ?Sized,
{
    let walker = Walker {
        schema,
        graph,
        options,
    };
    let (last, prefix) = match path.segments().split_last() {
        Some(split) => split,
        None => return Ok(Vec::new()),
    };

    let mut working = vec![start];
    for segment in prefix {
        let mut next = Vec::new();
        for &node in &working {
            next.extend(walker.follow(node, segment)?);
        }
        if options.include_distinct_values_only {
            let mut seen = HashSet::new();
            next.retain(|node| seen.insert(*node));
        }
        trace!(segment = %segment.name, nodes = next.len(), "followed edge");
        working = next;
        if working.is_empty() {
            return Ok(Vec::new());
        }
    }

    let mut leaves = Vec::new();
    for &node in &working {
        walker.read_leaves(node, last, &mut leaves)?;
    }
    let mut leaves = walker.apply_policy(leaves);
    if options.first_value_only {
        leaves.truncate(1);
    }
    trace!(path = %path, start = %start, leaves = leaves.len(), "path extracted");
    Ok(leaves)
}

struct Walker<'a, G: ?Sized> {
    schema: &'a TypeSchema,
    graph: &'a G,
    options: TraversalOptions,
}

impl<'a, G> Walker<'a, G>
where
    G: AnnotationGraph + ?Sized,
{
    /// The stored value of `edge` on `node`, after checking that the node's
    /// actual type exposes the edge.
    fn stored(&self, node: NodeId, edge: &str) -> Result<Option<&'a EdgeValue>, TraversalError> {
        let type_name = self.graph.type_name(node);
        if !self.schema.is_node_type(type_name) {
            return Err(TraversalError::UnknownNodeType {
                node,
                type_name: type_name.to_string(),
            });
        }
        if self.schema.edge(type_name, edge).is_none() {
            return Err(TraversalError::MissingEdge {
                node,
                type_name: type_name.to_string(),
                edge: edge.to_string(),
            });
        }
        Ok(self.graph.edge(node, edge))
    }

    /// Nodes reached from `node` through a node-valued segment.
    fn follow(&self, node: NodeId, segment: &PathSegment) -> Result<Vec<NodeId>, TraversalError> {
        let targets = match self.stored(node, &segment.name)? {
            None => Vec::new(),
            Some(EdgeValue::Node(target)) => vec![*target],
            Some(EdgeValue::Nodes(targets)) => targets.clone(),
            Some(other) => {
                return Err(TraversalError::EdgeShape {
                    node,
                    edge: segment.name.clone(),
                    expected: "a node reference",
                    found: other.shape_name(),
                })
            }
        };
        self.admit(segment, targets)
    }

    /// Apply the dependent-type policy to the targets of one edge.
    fn admit(&self, segment: &PathSegment, targets: Vec<NodeId>) -> Result<Vec<NodeId>, TraversalError> {
        let declared = segment.target.as_str();
        let exact_only =
            !self.options.use_dependent_type_feature && self.schema.has_subtypes(declared);

        let mut admitted = Vec::with_capacity(targets.len());
        for target in targets {
            let found = self.graph.type_name(target);
            if !self.schema.subtype_of(found, declared) {
                return Err(TraversalError::IncompatibleTarget {
                    edge: segment.name.clone(),
                    target,
                    expected: declared.to_string(),
                    found: found.to_string(),
                });
            }
            if exact_only && found != declared {
                continue;
            }
            admitted.push(target);
        }

        if self.options.use_dependent_type_feature {
            let mut seen: HashSet<NodeId> = admitted.iter().copied().collect();
            let mut stacked = Vec::new();
            for &target in &admitted {
                for other in self.graph.nodes_at(self.graph.span(target)) {
                    if !seen.contains(&other)
                        && self.schema.subtype_of(self.graph.type_name(other), declared)
                    {
                        seen.insert(other);
                        stacked.push(other);
                    }
                }
            }
            admitted.extend(stacked);
        }
        Ok(admitted)
    }

    fn read_leaves(
        &self,
        node: NodeId,
        segment: &PathSegment,
        out: &mut Vec<LeafValue>,
    ) -> Result<(), TraversalError> {
        match segment.accessor {
            LeafAccessor::Begin | LeafAccessor::End => {
                self.stored(node, &segment.name)?;
                let span = self.graph.span(node);
                let offset = if segment.accessor == LeafAccessor::Begin {
                    span.begin
                } else {
                    span.end
                };
                out.push(LeafValue {
                    value: Primitive::Int(offset as i64),
                    origin: node,
                    kind: LeafKind::Primitive,
                });
            }
            LeafAccessor::Value(kind) => {
                let values: &[Primitive] = match self.stored(node, &segment.name)? {
                    None => &[],
                    Some(EdgeValue::Primitive(value)) => std::slice::from_ref(value),
                    Some(EdgeValue::Primitives(values)) => values,
                    Some(other) => {
                        return Err(TraversalError::EdgeShape {
                            node,
                            edge: segment.name.clone(),
                            expected: "a primitive",
                            found: other.shape_name(),
                        })
                    }
                };
                for value in values {
                    if !primitive_matches(kind, value) {
                        return Err(TraversalError::EdgeShape {
                            node,
                            edge: segment.name.clone(),
                            expected: kind_name(kind),
                            found: value.kind_name(),
                        });
                    }
                    out.push(LeafValue {
                        value: value.clone(),
                        origin: node,
                        kind: LeafKind::Primitive,
                    });
                }
            }
            LeafAccessor::CoveredText => {
                for target in self.follow(node, segment)? {
                    out.push(LeafValue {
                        value: Primitive::Str(self.graph.covered_text(target).to_string()),
                        origin: target,
                        kind: LeafKind::CoveredText,
                    });
                }
            }
        }
        Ok(())
    }

    fn apply_policy(&self, leaves: Vec<LeafValue>) -> Vec<LeafValue> {
        if self.options.include_distinct_values_only {
            let mut kept: Vec<LeafValue> = Vec::new();
            for leaf in leaves {
                if !kept.iter().any(|k| k.value == leaf.value) {
                    kept.push(leaf);
                }
            }
            kept
        } else if self.options.include_duplicate_covered_text {
            let mut kept: Vec<(&str, LeafValue)> = Vec::with_capacity(leaves.len());
            for leaf in leaves {
                let text = self.graph.covered_text(leaf.origin);
                let repeated = kept
                    .iter()
                    .any(|(kept_text, k)| *kept_text == text && underlying_eq(k, &leaf));
                if !repeated {
                    kept.push((text, leaf));
                }
            }
            kept.into_iter().map(|(_, leaf)| leaf).collect()
        } else {
            leaves
        }
    }
}

/// Covered-text leaves are identified by their node, primitives by value.
fn underlying_eq(a: &LeafValue, b: &LeafValue) -> bool {
    match (a.kind, b.kind) {
        (LeafKind::CoveredText, LeafKind::CoveredText) => a.origin == b.origin,
        (LeafKind::Primitive, LeafKind::Primitive) => a.value == b.value,
        _ => false,
    }
}

fn primitive_matches(kind: PrimitiveKind, value: &Primitive) -> bool {
    matches!(
        (kind, value),
        (PrimitiveKind::String, Primitive::Str(_))
            | (PrimitiveKind::Integer, Primitive::Int(_))
            | (PrimitiveKind::Float, Primitive::Float(_))
            | (PrimitiveKind::Float, Primitive::Int(_))
            | (PrimitiveKind::Boolean, Primitive::Bool(_))
    )
}

fn kind_name(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::String => "string",
        PrimitiveKind::Integer => "integer",
        PrimitiveKind::Float => "float",
        PrimitiveKind::Boolean => "boolean",
    }
}
