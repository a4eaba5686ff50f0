//! The type schema: node types, the edges they expose, and how each edge's
//! value is read.
//!
//! A schema is built once (through [`SchemaBuilder`] or a RON
//! [`SchemaDescription`]) and is immutable afterwards. Every decision about
//! how a leaf value is extracted is made here, when the schema is built, and
//! recorded as a [`LeafAccessor`] on the edge. Traversal never inspects types
//! to discover accessors.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Root node type. Every node type derives from it.
pub const ANNOTATION: &str = "Annotation";
pub const STRING: &str = "String";
pub const INTEGER: &str = "Integer";
pub const FLOAT: &str = "Float";
pub const BOOLEAN: &str = "Boolean";

/// Edge on [`ANNOTATION`] holding the node's span start.
pub const BEGIN: &str = "begin";
/// Edge on [`ANNOTATION`] holding the node's span end.
pub const END: &str = "end";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    String,
    Integer,
    Float,
    Boolean,
}

/// What a declared type is, as far as extraction is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    /// A string restricted to a set of values. Read as a plain string.
    StringSubtype { allowed: Vec<String> },
    /// A span-anchored node type.
    Node,
    /// Declared, but no value can be read from it.
    Opaque,
}

impl TypeKind {
    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeKind::Primitive(_) | TypeKind::StringSubtype { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Multiplicity {
    Single,
    Multi,
}

/// How the value at the end of an edge is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafAccessor {
    /// A stored primitive value (or array of them).
    Value(PrimitiveKind),
    /// The start offset of the node's span.
    Begin,
    /// The end offset of the node's span.
    End,
    /// The document text covered by the target node(s).
    CoveredText,
}

/// A resolved edge, as exposed by [`TypeSchema::edges_of`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeInfo {
    pub name: String,
    /// Target type (element type for multi-valued edges).
    pub target: String,
    pub multiplicity: Multiplicity,
    pub is_primitive: bool,
    /// `None` when the target type is opaque.
    pub accessor: Option<LeafAccessor>,
}

/// Serializable schema declaration.
///
/// ```
/// use layered_features::TypeSchema;
///
/// let schema = TypeSchema::from_ron_str(r#"(
///     types: [
///         (name: "Token", edges: [(name: "lemma", target: "Lemma")]),
///         (name: "Lemma", edges: [(name: "value", target: "String")]),
///     ],
/// )"#).unwrap();
/// assert!(schema.edge("Token", "lemma").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescription {
    #[serde(default)]
    pub types: Vec<TypeDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescription {
    pub name: String,
    #[serde(default)]
    pub kind: DeclaredKind,
    /// Node supertype; defaults to [`ANNOTATION`].
    #[serde(default)]
    pub supertype: Option<String>,
    #[serde(default)]
    pub edges: Vec<EdgeDescription>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum DeclaredKind {
    #[default]
    Node,
    StringSubtype(Vec<String>),
    Opaque,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDescription {
    pub name: String,
    pub target: String,
    #[serde(default)]
    pub multi: bool,
}

/// Collects the edges of one node type for [`SchemaBuilder::node`].
#[derive(Debug, Default)]
pub struct EdgeList {
    edges: Vec<EdgeDescription>,
}

impl EdgeList {
    /// Declare a single-valued edge.
    pub fn single(mut self, name: &str, target: &str) -> Self {
        self.edges.push(EdgeDescription {
            name: name.to_string(),
            target: target.to_string(),
            multi: false,
        });
        self
    }

    /// Declare a multi-valued edge; `target` is the element type.
    pub fn multi(mut self, name: &str, target: &str) -> Self {
        self.edges.push(EdgeDescription {
            name: name.to_string(),
            target: target.to_string(),
            multi: true,
        });
        self
    }
}

/// Incremental construction of a [`TypeSchema`].
///
/// ```
/// use layered_features::schema::{SchemaBuilder, STRING};
///
/// let schema = SchemaBuilder::new()
///     .node("Token", |t| t.single("lemma", "Lemma").multi("posTag", "PosTag"))
///     .node("Lemma", |t| t.single("value", STRING))
///     .node("PosTag", |t| t.single("value", STRING))
///     .build()
///     .unwrap();
///
/// assert!(schema.subtype_of("Token", "Annotation"));
/// ```
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    description: SchemaDescription,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a node type deriving directly from [`ANNOTATION`].
    pub fn node(self, name: &str, edges: impl FnOnce(EdgeList) -> EdgeList) -> Self {
        self.declare(name, DeclaredKind::Node, None, edges(EdgeList::default()))
    }

    /// Declare a node type deriving from `supertype`.
    pub fn node_extending(
        self,
        name: &str,
        supertype: &str,
        edges: impl FnOnce(EdgeList) -> EdgeList,
    ) -> Self {
        self.declare(
            name,
            DeclaredKind::Node,
            Some(supertype.to_string()),
            edges(EdgeList::default()),
        )
    }

    /// Declare an enumerated string type.
    pub fn string_subtype<I, S>(self, name: &str, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed = allowed.into_iter().map(Into::into).collect();
        self.declare(
            name,
            DeclaredKind::StringSubtype(allowed),
            None,
            EdgeList::default(),
        )
    }

    /// Declare a type that values cannot be read from.
    pub fn opaque(self, name: &str) -> Self {
        self.declare(name, DeclaredKind::Opaque, None, EdgeList::default())
    }

    fn declare(
        mut self,
        name: &str,
        kind: DeclaredKind,
        supertype: Option<String>,
        edges: EdgeList,
    ) -> Self {
        self.description.types.push(TypeDescription {
            name: name.to_string(),
            kind,
            supertype,
            edges: edges.edges,
        });
        self
    }

    pub fn build(self) -> Result<TypeSchema, SchemaError> {
        TypeSchema::from_description(&self.description)
    }
}

#[derive(Debug, Clone)]
struct TypeEntry {
    kind: TypeKind,
    supertype: Option<String>,
    /// Inherited edges first, then the type's own, in declaration order.
    edges: Vec<EdgeInfo>,
    has_subtypes: bool,
}

/// An immutable, validated type schema.
#[derive(Debug, Clone)]
pub struct TypeSchema {
    types: BTreeMap<String, TypeEntry>,
}

impl TypeSchema {
    /// Parse and validate a RON [`SchemaDescription`].
    pub fn from_ron_str(source: &str) -> Result<Self, SchemaError> {
        let description: SchemaDescription =
            ron::from_str(source).map_err(|e| SchemaError::Description(e.to_string()))?;
        Self::from_description(&description)
    }

    pub fn from_description(description: &SchemaDescription) -> Result<Self, SchemaError> {
        let mut kinds: BTreeMap<String, (TypeKind, Option<String>)> = BTreeMap::new();
        for (name, kind) in builtin_kinds() {
            kinds.insert(name.to_string(), (kind, None));
        }

        for decl in &description.types {
            if kinds.contains_key(&decl.name) {
                return Err(SchemaError::DuplicateType(decl.name.clone()));
            }
            let (kind, supertype) = match &decl.kind {
                DeclaredKind::Node => (
                    TypeKind::Node,
                    Some(decl.supertype.clone().unwrap_or_else(|| ANNOTATION.to_string())),
                ),
                DeclaredKind::StringSubtype(allowed) => (
                    TypeKind::StringSubtype {
                        allowed: allowed.clone(),
                    },
                    None,
                ),
                DeclaredKind::Opaque => (TypeKind::Opaque, None),
            };
            kinds.insert(decl.name.clone(), (kind, supertype));
        }

        for (name, (_, supertype)) in &kinds {
            if let Some(supertype) = supertype {
                match kinds.get(supertype) {
                    Some((TypeKind::Node, _)) => {}
                    _ => {
                        return Err(SchemaError::UnknownSupertype {
                            type_name: name.clone(),
                            supertype: supertype.clone(),
                        })
                    }
                }
            }
        }
        check_acyclic(&kinds)?;

        let mut own_edges: BTreeMap<&str, Vec<EdgeDescription>> = BTreeMap::new();
        own_edges.insert(
            ANNOTATION,
            vec![
                EdgeDescription {
                    name: BEGIN.to_string(),
                    target: INTEGER.to_string(),
                    multi: false,
                },
                EdgeDescription {
                    name: END.to_string(),
                    target: INTEGER.to_string(),
                    multi: false,
                },
            ],
        );
        for decl in &description.types {
            own_edges.insert(&decl.name, decl.edges.clone());
        }

        let mut types = BTreeMap::new();
        for (name, (kind, supertype)) in &kinds {
            let edges = if *kind == TypeKind::Node {
                collect_edges(name, &kinds, &own_edges)?
            } else {
                Vec::new()
            };
            let has_subtypes = kinds
                .values()
                .any(|(_, sup)| sup.as_deref() == Some(name.as_str()));
            types.insert(
                name.clone(),
                TypeEntry {
                    kind: kind.clone(),
                    supertype: supertype.clone(),
                    edges,
                    has_subtypes,
                },
            );
        }

        tracing::debug!(types = types.len(), "type schema built");
        Ok(Self { types })
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn kind(&self, type_name: &str) -> Option<&TypeKind> {
        self.types.get(type_name).map(|entry| &entry.kind)
    }

    pub fn is_node_type(&self, type_name: &str) -> bool {
        matches!(self.kind(type_name), Some(TypeKind::Node))
    }

    pub fn supertype(&self, type_name: &str) -> Option<&str> {
        self.types
            .get(type_name)
            .and_then(|entry| entry.supertype.as_deref())
    }

    /// Edges exposed by a type, inherited ones first. Empty for unknown or
    /// non-node types.
    pub fn edges_of(&self, type_name: &str) -> &[EdgeInfo] {
        self.types
            .get(type_name)
            .map(|entry| entry.edges.as_slice())
            .unwrap_or(&[])
    }

    pub fn edge(&self, type_name: &str, edge: &str) -> Option<&EdgeInfo> {
        self.edges_of(type_name).iter().find(|info| info.name == edge)
    }

    /// Returns true if `sub` is `sup` or derives from it.
    pub fn subtype_of(&self, sub: &str, sup: &str) -> bool {
        let mut current = Some(sub);
        while let Some(name) = current {
            if name == sup {
                return self.contains(sup);
            }
            current = self.supertype(name);
        }
        false
    }

    /// Returns true if any declared type derives directly from `type_name`.
    pub fn has_subtypes(&self, type_name: &str) -> bool {
        self.types
            .get(type_name)
            .map(|entry| entry.has_subtypes)
            .unwrap_or(false)
    }

    /// Declared type names, sorted.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

fn builtin_kinds() -> [(&'static str, TypeKind); 5] {
    [
        (STRING, TypeKind::Primitive(PrimitiveKind::String)),
        (INTEGER, TypeKind::Primitive(PrimitiveKind::Integer)),
        (FLOAT, TypeKind::Primitive(PrimitiveKind::Float)),
        (BOOLEAN, TypeKind::Primitive(PrimitiveKind::Boolean)),
        (ANNOTATION, TypeKind::Node),
    ]
}

fn check_acyclic(kinds: &BTreeMap<String, (TypeKind, Option<String>)>) -> Result<(), SchemaError> {
    for name in kinds.keys() {
        let mut seen = BTreeSet::new();
        let mut current = Some(name.as_str());
        while let Some(type_name) = current {
            if !seen.insert(type_name) {
                return Err(SchemaError::InheritanceCycle(name.clone()));
            }
            current = kinds.get(type_name).and_then(|(_, sup)| sup.as_deref());
        }
    }
    Ok(())
}

fn collect_edges(
    name: &str,
    kinds: &BTreeMap<String, (TypeKind, Option<String>)>,
    own_edges: &BTreeMap<&str, Vec<EdgeDescription>>,
) -> Result<Vec<EdgeInfo>, SchemaError> {
    let mut chain = Vec::new();
    let mut current = Some(name);
    while let Some(type_name) = current {
        chain.push(type_name);
        current = kinds.get(type_name).and_then(|(_, sup)| sup.as_deref());
    }

    let mut edges: Vec<EdgeInfo> = Vec::new();
    for declaring in chain.into_iter().rev() {
        for edge in own_edges.get(declaring).into_iter().flatten() {
            if edges.iter().any(|existing| existing.name == edge.name) {
                return Err(SchemaError::DuplicateEdge {
                    type_name: name.to_string(),
                    edge: edge.name.clone(),
                });
            }
            let target_kind = match kinds.get(&edge.target) {
                Some((kind, _)) => kind,
                None => {
                    return Err(SchemaError::UnknownTarget {
                        type_name: declaring.to_string(),
                        edge: edge.name.clone(),
                        target: edge.target.clone(),
                    })
                }
            };
            edges.push(EdgeInfo {
                name: edge.name.clone(),
                target: edge.target.clone(),
                multiplicity: if edge.multi {
                    Multiplicity::Multi
                } else {
                    Multiplicity::Single
                },
                is_primitive: target_kind.is_primitive(),
                accessor: accessor_for(declaring, &edge.name, target_kind),
            });
        }
    }
    Ok(edges)
}

fn accessor_for(declaring: &str, edge: &str, target: &TypeKind) -> Option<LeafAccessor> {
    if declaring == ANNOTATION {
        match edge {
            BEGIN => return Some(LeafAccessor::Begin),
            END => return Some(LeafAccessor::End),
            _ => {}
        }
    }
    match target {
        TypeKind::Primitive(kind) => Some(LeafAccessor::Value(*kind)),
        TypeKind::StringSubtype { .. } => Some(LeafAccessor::Value(PrimitiveKind::String)),
        TypeKind::Node => Some(LeafAccessor::CoveredText),
        TypeKind::Opaque => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_schema() -> TypeSchema {
        SchemaBuilder::new()
            .node("Token", |t| {
                t.single("lemma", "Lemma")
                    .multi("posTag", "PosTag")
                    .single("language", "Language")
            })
            .node("Lemma", |t| t.single("value", STRING).multi("testFS", STRING))
            .node("PosTag", |t| t.single("value", STRING))
            .node_extending("StackedPosTag", "PosTag", |t| t.single("tagger", STRING))
            .string_subtype("Language", ["en", "de"])
            .opaque("Blob")
            .build()
            .unwrap()
    }

    #[test]
    fn edges_are_inherited_first() {
        let schema = token_schema();
        let names: Vec<_> = schema
            .edges_of("StackedPosTag")
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["begin", "end", "value", "tagger"]);
    }

    #[test]
    fn accessors_are_decided_at_build_time() {
        let schema = token_schema();
        assert_eq!(
            schema.edge("Token", "begin").unwrap().accessor,
            Some(LeafAccessor::Begin)
        );
        assert_eq!(
            schema.edge("Token", "lemma").unwrap().accessor,
            Some(LeafAccessor::CoveredText)
        );
        let language = schema.edge("Token", "language").unwrap();
        assert!(language.is_primitive);
        assert_eq!(
            language.accessor,
            Some(LeafAccessor::Value(PrimitiveKind::String))
        );
        assert_eq!(
            schema.edge("Lemma", "testFS").unwrap().multiplicity,
            Multiplicity::Multi
        );
    }

    #[test]
    fn subtype_relation() {
        let schema = token_schema();
        assert!(schema.subtype_of("StackedPosTag", "PosTag"));
        assert!(schema.subtype_of("StackedPosTag", ANNOTATION));
        assert!(schema.subtype_of("PosTag", "PosTag"));
        assert!(!schema.subtype_of("PosTag", "StackedPosTag"));
        assert!(!schema.subtype_of("Missing", "Missing"));
        assert!(schema.has_subtypes("PosTag"));
        assert!(!schema.has_subtypes("Lemma"));
    }

    #[test]
    fn rejects_unknown_target() {
        let err = SchemaBuilder::new()
            .node("Token", |t| t.single("lemma", "Lemma"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownTarget {
                type_name: "Token".into(),
                edge: "lemma".into(),
                target: "Lemma".into(),
            }
        );
    }

    #[test]
    fn rejects_duplicates_and_cycles() {
        let dup = SchemaBuilder::new()
            .node("Token", |t| t)
            .node("Token", |t| t)
            .build()
            .unwrap_err();
        assert_eq!(dup, SchemaError::DuplicateType("Token".into()));

        let shadow = SchemaBuilder::new()
            .node("Token", |t| t.single("begin", INTEGER))
            .build()
            .unwrap_err();
        assert!(matches!(shadow, SchemaError::DuplicateEdge { .. }));

        let cycle = SchemaBuilder::new()
            .node_extending("A", "B", |t| t)
            .node_extending("B", "A", |t| t)
            .build()
            .unwrap_err();
        assert!(matches!(cycle, SchemaError::InheritanceCycle(_)));

        let bad_super = SchemaBuilder::new()
            .node_extending("A", STRING, |t| t)
            .build()
            .unwrap_err();
        assert!(matches!(bad_super, SchemaError::UnknownSupertype { .. }));
    }

    #[test]
    fn ron_description_round_trips_through_builder_semantics() {
        let schema = TypeSchema::from_ron_str(
            r#"(
                types: [
                    (name: "Header", edges: [(name: "authors", target: "Author", multi: true)]),
                    (name: "Author", edges: [(name: "lastName", target: "String")]),
                    (name: "Language", kind: StringSubtype(["en"])),
                ],
            )"#,
        )
        .unwrap();
        let authors = schema.edge("Header", "authors").unwrap();
        assert_eq!(authors.multiplicity, Multiplicity::Multi);
        assert_eq!(authors.target, "Author");
        assert!(matches!(
            schema.kind("Language"),
            Some(TypeKind::StringSubtype { .. })
        ));
    }

    #[test]
    fn malformed_ron_is_a_description_error() {
        let err = TypeSchema::from_ron_str("(types: [").unwrap_err();
        assert!(matches!(err, SchemaError::Description(_)));
    }
}
