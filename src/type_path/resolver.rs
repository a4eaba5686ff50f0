//! Schema-only validation of path expressions.
//!
//! Nothing here touches a document, so paths can be checked when an
//! extractor is configured rather than when the first node reaches it.

use crate::error::PathError;
use crate::schema::{TypeKind, TypeSchema};

use super::{PathSegment, TypePath};

/// Returns true if `path` resolves from `start_type` to a readable value.
///
/// ```
/// use layered_features::schema::{SchemaBuilder, STRING};
/// use layered_features::type_path::is_valid_path;
///
/// let schema = SchemaBuilder::new()
///     .node("Token", |t| t.single("lemma", "Lemma"))
///     .node("Lemma", |t| t.single("value", STRING))
///     .build()
///     .unwrap();
///
/// assert!(is_valid_path(&schema, "Token", "lemma/value"));
/// assert!(!is_valid_path(&schema, "Token", "lemma/values"));
/// ```
pub fn is_valid_path(schema: &TypeSchema, start_type: &str, path: &str) -> bool {
    resolve_path(schema, start_type, path).is_ok()
}

/// Returns true if a value of `type_name` can be the end of a path.
///
/// Primitive kinds, string subtypes (which have no accessor of their own and
/// are read as plain strings) and node types qualify. Opaque and undeclared
/// types do not.
pub fn is_valid_type(schema: &TypeSchema, type_name: &str) -> bool {
    match schema.kind(type_name) {
        Some(TypeKind::Primitive(_)) | Some(TypeKind::StringSubtype { .. }) | Some(TypeKind::Node) => {
            true
        }
        Some(TypeKind::Opaque) | None => false,
    }
}

/// Resolve `path` against the schema, starting at nodes of `start_type`.
pub fn resolve_path(
    schema: &TypeSchema,
    start_type: &str,
    path: &str,
) -> Result<TypePath, PathError> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }
    if !schema.is_node_type(start_type) {
        return Err(PathError::UnknownStartType(start_type.to_string()));
    }

    let names: Vec<&str> = path.split('/').collect();
    let mut current = start_type.to_string();
    let mut segments = Vec::with_capacity(names.len());

    for (index, name) in names.iter().enumerate() {
        if name.is_empty() {
            return Err(PathError::EmptySegment {
                path: path.to_string(),
                index,
            });
        }
        if schema.kind(&current).map(TypeKind::is_primitive).unwrap_or(false) {
            return Err(PathError::PastPrimitive {
                path: path.to_string(),
                type_name: current,
                segment: name.to_string(),
            });
        }
        let edge = schema
            .edge(&current, name)
            .ok_or_else(|| PathError::UnknownEdge {
                path: path.to_string(),
                type_name: current.clone(),
                segment: name.to_string(),
            })?;

        let is_last = index + 1 == names.len();
        let accessor = match edge.accessor {
            Some(accessor) if is_valid_type(schema, &edge.target) => accessor,
            _ if is_last => {
                return Err(PathError::UnusableLeaf {
                    path: path.to_string(),
                    type_name: edge.target.clone(),
                })
            }
            _ => {
                return Err(PathError::UnknownEdge {
                    path: path.to_string(),
                    type_name: edge.target.clone(),
                    segment: names[index + 1].to_string(),
                })
            }
        };

        segments.push(PathSegment {
            name: edge.name.clone(),
            target: edge.target.clone(),
            multiplicity: edge.multiplicity,
            accessor,
        });
        current = edge.target.clone();
    }

    tracing::trace!(start_type, path, "type path resolved");
    Ok(TypePath::new(start_type, path, segments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{LeafAccessor, SchemaBuilder, BOOLEAN, STRING};

    fn schema() -> TypeSchema {
        SchemaBuilder::new()
            .node("Token", |t| {
                t.single("lemma", "Lemma")
                    .multi("posTag", "PosTag")
                    .multi("depRel", "DependencyRelation")
                    .single("orthogr", STRING)
                    .single("blob", "Blob")
            })
            .node("Lemma", |t| t.single("value", STRING).multi("testFS", STRING))
            .node("PosTag", |t| t.single("value", STRING).single("language", "Language"))
            .node("DependencyRelation", |t| {
                t.single("head", "Token")
                    .single("projective", BOOLEAN)
                    .single("label", STRING)
            })
            .node("Header", |t| t.multi("authors", "Author"))
            .node("Author", |t| t.single("lastName", STRING))
            .string_subtype("Language", ["en", "de"])
            .opaque("Blob")
            .build()
            .unwrap()
    }

    #[test]
    fn accepts_chained_paths() {
        let schema = schema();
        assert!(is_valid_path(&schema, "PosTag", "value"));
        assert!(is_valid_path(&schema, "Header", "authors/lastName"));
        assert!(is_valid_path(&schema, "Token", "posTag/language"));
        assert!(is_valid_path(&schema, "Token", "posTag"));
        assert!(is_valid_path(&schema, "Token", "depRel/head/orthogr"));
        assert!(is_valid_path(&schema, "Token", "depRel/projective"));
        assert!(is_valid_path(&schema, "Token", "depRel/head/depRel/projective"));
        assert!(is_valid_path(&schema, "Token", "lemma/begin"));
    }

    #[test]
    fn rejects_unknown_final_segment() {
        let schema = schema();
        assert!(!is_valid_path(&schema, "Header", "authors/lastNames"));
        assert!(!is_valid_path(&schema, "Token", "depRel/head/projective"));
        assert_eq!(
            resolve_path(&schema, "Header", "authors/lastNames").unwrap_err(),
            PathError::UnknownEdge {
                path: "authors/lastNames".into(),
                type_name: "Author".into(),
                segment: "lastNames".into(),
            }
        );
    }

    #[test]
    fn rejects_malformed_expressions() {
        let schema = schema();
        assert_eq!(resolve_path(&schema, "Token", ""), Err(PathError::Empty));
        assert!(matches!(
            resolve_path(&schema, "Token", "lemma//value"),
            Err(PathError::EmptySegment { index: 1, .. })
        ));
        assert!(matches!(
            resolve_path(&schema, "Token", "lemma/value/length"),
            Err(PathError::PastPrimitive { .. })
        ));
        assert_eq!(
            resolve_path(&schema, "String", "value"),
            Err(PathError::UnknownStartType("String".into()))
        );
        assert!(matches!(
            resolve_path(&schema, "Token", "Lemma/value"),
            Err(PathError::UnknownEdge { .. })
        ));
    }

    #[test]
    fn opaque_types_are_not_leaves() {
        let schema = schema();
        assert!(matches!(
            resolve_path(&schema, "Token", "blob"),
            Err(PathError::UnusableLeaf { .. })
        ));
        assert!(matches!(
            resolve_path(&schema, "Token", "blob/size"),
            Err(PathError::UnknownEdge { .. })
        ));
    }

    #[test]
    fn valid_types() {
        let schema = schema();
        assert!(is_valid_type(&schema, "PosTag"));
        assert!(is_valid_type(&schema, "Token"));
        assert!(is_valid_type(&schema, "Language"));
        assert!(is_valid_type(&schema, STRING));
        assert!(is_valid_type(&schema, BOOLEAN));
        assert!(!is_valid_type(&schema, "Blob"));
        assert!(!is_valid_type(&schema, "Nope"));
    }

    #[test]
    fn resolved_segments_carry_accessors() {
        let schema = schema();
        let path = resolve_path(&schema, "Token", "depRel/head/posTag").unwrap();
        let accessors: Vec<_> = path.segments().iter().map(|s| s.accessor).collect();
        assert_eq!(accessors, vec![LeafAccessor::CoveredText; 3]);
        assert_eq!(path.feature_name(), "TypePath(DepRelHeadPosTag)");
        let single = resolve_path(&schema, "Token", "posTag").unwrap();
        assert_eq!(single.feature_name(), "TypePath(PosTag)");
        assert_eq!(path.to_string(), "Token:depRel/head/posTag");
    }
}
