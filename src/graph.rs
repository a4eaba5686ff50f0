//! The live annotation graph read by the traversal engine.
//!
//! Annotators outside this crate own the graph; extraction only reads it.
//! [`AnnotationGraph`] is the accessor the engine needs, and
//! [`AnnotatedDocument`] is an arena-backed implementation for callers that
//! build graphs in memory.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle to a node within one [`AnnotationGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A half-open character range `[begin, end)` into the document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub begin: usize,
    pub end: usize,
}

impl Span {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    /// Returns true if `other` lies within this span (bounds inclusive).
    pub fn contains(&self, other: &Span) -> bool {
        self.begin <= other.begin && other.end <= self.end
    }

    /// The substring of `text` covered by this span.
    ///
    /// Offsets count characters, not bytes. Offsets past the end of the text
    /// are clamped, and an inverted span covers nothing.
    pub fn slice<'t>(&self, text: &'t str) -> &'t str {
        let start = char_to_byte(text, self.begin);
        let end = char_to_byte(text, self.end.max(self.begin));
        &text[start..end]
    }
}

fn char_to_byte(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(byte_idx, _)| byte_idx)
        .unwrap_or(text.len())
}

/// A primitive value stored on an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Primitive {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Primitive {
    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Primitive::Bool(_) => "boolean",
            Primitive::Int(_) => "integer",
            Primitive::Float(_) => "float",
            Primitive::Str(_) => "string",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Primitive::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Bool(b) => write!(f, "{}", b),
            Primitive::Int(i) => write!(f, "{}", i),
            Primitive::Float(x) => write!(f, "{}", x),
            Primitive::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Primitive::Str(value.to_string())
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Primitive::Str(value)
    }
}

impl From<i64> for Primitive {
    fn from(value: i64) -> Self {
        Primitive::Int(value)
    }
}

impl From<f64> for Primitive {
    fn from(value: f64) -> Self {
        Primitive::Float(value)
    }
}

impl From<bool> for Primitive {
    fn from(value: bool) -> Self {
        Primitive::Bool(value)
    }
}

/// The value stored on a node's edge.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeValue {
    Primitive(Primitive),
    Primitives(Vec<Primitive>),
    Node(NodeId),
    Nodes(Vec<NodeId>),
}

impl EdgeValue {
    pub fn shape_name(&self) -> &'static str {
        match self {
            EdgeValue::Primitive(_) => "a primitive",
            EdgeValue::Primitives(_) => "a primitive array",
            EdgeValue::Node(_) => "a node",
            EdgeValue::Nodes(_) => "a node array",
        }
    }
}

impl From<Primitive> for EdgeValue {
    fn from(value: Primitive) -> Self {
        EdgeValue::Primitive(value)
    }
}

impl From<&str> for EdgeValue {
    fn from(value: &str) -> Self {
        EdgeValue::Primitive(value.into())
    }
}

impl From<bool> for EdgeValue {
    fn from(value: bool) -> Self {
        EdgeValue::Primitive(value.into())
    }
}

impl From<i64> for EdgeValue {
    fn from(value: i64) -> Self {
        EdgeValue::Primitive(value.into())
    }
}

impl From<Vec<Primitive>> for EdgeValue {
    fn from(value: Vec<Primitive>) -> Self {
        EdgeValue::Primitives(value)
    }
}

impl From<NodeId> for EdgeValue {
    fn from(value: NodeId) -> Self {
        EdgeValue::Node(value)
    }
}

impl From<Vec<NodeId>> for EdgeValue {
    fn from(value: Vec<NodeId>) -> Self {
        EdgeValue::Nodes(value)
    }
}

/// Read access to a document's annotation graph.
///
/// Node handles passed to these methods must come from the same graph.
pub trait AnnotationGraph {
    /// The full document text.
    fn text(&self) -> &str;

    /// Declared type name of a node.
    fn type_name(&self, node: NodeId) -> &str;

    fn span(&self, node: NodeId) -> Span;

    /// The stored value of a named edge, or `None` when the node carries no
    /// value for it.
    fn edge(&self, node: NodeId, name: &str) -> Option<&EdgeValue>;

    /// Every node, in insertion order.
    fn nodes(&self) -> Vec<NodeId>;

    /// Nodes whose span equals `span`, in insertion order.
    fn nodes_at(&self, span: Span) -> Vec<NodeId>;

    /// Nodes with exactly this type name, in insertion order.
    fn nodes_of_type(&self, type_name: &str) -> Vec<NodeId> {
        self.nodes()
            .into_iter()
            .filter(|&node| self.type_name(node) == type_name)
            .collect()
    }

    /// Document substring spanned by the node.
    fn covered_text(&self, node: NodeId) -> &str {
        self.span(node).slice(self.text())
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    type_name: String,
    span: Span,
    edges: BTreeMap<String, EdgeValue>,
}

/// An in-memory annotation graph over one document text.
///
/// # Example
///
/// ```
/// use layered_features::{AnnotatedDocument, AnnotationGraph};
///
/// let mut doc = AnnotatedDocument::new("Hello world");
/// let token = doc.add_node("Token", 0, 5);
/// let lemma = doc.add_node("Lemma", 0, 5);
/// doc.set_edge(lemma, "value", "hello");
/// doc.set_edge(token, "lemma", lemma);
///
/// assert_eq!(doc.covered_text(token), "Hello");
/// ```
#[derive(Debug, Clone, Default)]
pub struct AnnotatedDocument {
    text: String,
    /// Byte offset of every character, plus the text length.
    char_starts: Vec<usize>,
    nodes: Vec<NodeData>,
    by_span: BTreeMap<Span, Vec<NodeId>>,
}

impl AnnotatedDocument {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let char_starts = text
            .char_indices()
            .map(|(byte_idx, _)| byte_idx)
            .chain(std::iter::once(text.len()))
            .collect();
        Self {
            text,
            char_starts,
            nodes: Vec::new(),
            by_span: BTreeMap::new(),
        }
    }

    /// Add a node of `type_name` spanning `[begin, end)`.
    pub fn add_node(&mut self, type_name: impl Into<String>, begin: usize, end: usize) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let span = Span::new(begin, end);
        self.nodes.push(NodeData {
            type_name: type_name.into(),
            span,
            edges: BTreeMap::new(),
        });
        self.by_span.entry(span).or_default().push(id);
        id
    }

    /// Set (or replace) the value of a node's edge, returning the previous one.
    ///
    /// # Panics
    ///
    /// Panics if `node` was not created by this document.
    pub fn set_edge(
        &mut self,
        node: NodeId,
        name: impl Into<String>,
        value: impl Into<EdgeValue>,
    ) -> Option<EdgeValue> {
        self.nodes[node.index()].edges.insert(name.into(), value.into())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.char_starts
            .get(char_idx)
            .copied()
            .unwrap_or(self.text.len())
    }
}

impl AnnotationGraph for AnnotatedDocument {
    fn text(&self) -> &str {
        &self.text
    }

    fn type_name(&self, node: NodeId) -> &str {
        &self.nodes[node.index()].type_name
    }

    fn span(&self, node: NodeId) -> Span {
        self.nodes[node.index()].span
    }

    fn edge(&self, node: NodeId, name: &str) -> Option<&EdgeValue> {
        self.nodes[node.index()].edges.get(name)
    }

    fn nodes(&self) -> Vec<NodeId> {
        (0..self.nodes.len() as u32).map(NodeId).collect()
    }

    fn nodes_at(&self, span: Span) -> Vec<NodeId> {
        self.by_span.get(&span).cloned().unwrap_or_default()
    }

    /// Same result as [`Span::slice`], from the precomputed offsets.
    fn covered_text(&self, node: NodeId) -> &str {
        let span = self.span(node);
        let start = self.byte_offset(span.begin);
        let end = self.byte_offset(span.end.max(span.begin));
        &self.text[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_slice_counts_characters() {
        let text = "héllo wörld";
        assert_eq!(Span::new(0, 5).slice(text), "héllo");
        assert_eq!(Span::new(6, 11).slice(text), "wörld");
        assert_eq!(Span::new(6, 50).slice(text), "wörld");
        assert_eq!(Span::new(4, 2).slice(text), "");
    }

    #[test]
    fn covered_text_agrees_with_span_slice() {
        let text = "größe über café";
        let mut doc = AnnotatedDocument::new(text);
        let char_count = text.chars().count();
        for begin in 0..=char_count + 1 {
            for end in 0..=char_count + 2 {
                let node = doc.add_node("Token", begin, end);
                assert_eq!(
                    doc.covered_text(node),
                    Span::new(begin, end).slice(text),
                    "span {}..{}",
                    begin,
                    end
                );
            }
        }

        let mut empty = AnnotatedDocument::default();
        let node = empty.add_node("Token", 0, 3);
        assert_eq!(empty.covered_text(node), "");
    }

    #[test]
    fn span_containment() {
        let outer = Span::new(0, 10);
        assert!(outer.contains(&Span::new(0, 10)));
        assert!(outer.contains(&Span::new(3, 4)));
        assert!(!outer.contains(&Span::new(9, 11)));
    }

    #[test]
    fn nodes_at_keeps_insertion_order() {
        let mut doc = AnnotatedDocument::new("abc def");
        let a = doc.add_node("PosTag", 0, 3);
        let _other = doc.add_node("PosTag", 4, 7);
        let b = doc.add_node("PosTag", 0, 3);

        assert_eq!(doc.nodes_at(Span::new(0, 3)), vec![a, b]);
        assert!(doc.nodes_at(Span::new(1, 3)).is_empty());
        assert_eq!(doc.len(), 3);
    }

    #[test]
    fn set_edge_replaces_previous_value() {
        let mut doc = AnnotatedDocument::new("abc");
        let n = doc.add_node("Lemma", 0, 3);
        assert_eq!(doc.set_edge(n, "value", "x"), None);
        assert_eq!(
            doc.set_edge(n, "value", "y"),
            Some(EdgeValue::Primitive(Primitive::Str("x".into())))
        );
        assert_eq!(doc.edge(n, "value"), Some(&EdgeValue::from("y")));
    }
}
