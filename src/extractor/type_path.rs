use crate::error::{ExtractError, ExtractResult, PathError};
use crate::graph::NodeId;
use crate::schema::TypeSchema;
use crate::type_path::{extract_path, resolve_path, TraversalOptions, TypePath};

use super::{ExtractionContext, Feature, FeatureExtractor, FeatureValue};

/// Emits one feature per leaf value reached by a type path.
///
/// The path is resolved when the extractor is built, so a misspelled edge is
/// reported before any document is read. Every emitted feature is named after
/// the path (`lemma/value` gives `TypePath(LemmaValue)`).
///
/// ```
/// use layered_features::schema::{SchemaBuilder, STRING};
/// use layered_features::{
///     AnnotatedDocument, ExtractionContext, FeatureExtractor, TraversalOptions,
///     TypePathExtractor,
/// };
///
/// let schema = SchemaBuilder::new()
///     .node("Token", |t| t.single("lemma", "Lemma"))
///     .node("Lemma", |t| t.single("value", STRING))
///     .build()
///     .unwrap();
///
/// let mut doc = AnnotatedDocument::new("Dogs bark");
/// let token = doc.add_node("Token", 0, 4);
/// let lemma = doc.add_node("Lemma", 0, 4);
/// doc.set_edge(lemma, "value", "dog");
/// doc.set_edge(token, "lemma", lemma);
///
/// let extractor =
///     TypePathExtractor::new(&schema, "Token", "lemma/value", TraversalOptions::default())
///         .unwrap();
/// let features = extractor
///     .extract(&ExtractionContext::new(&schema, &doc), token)
///     .unwrap();
/// assert_eq!(features[0].to_string(), "TypePath(LemmaValue)=dog");
/// ```
#[derive(Debug, Clone)]
pub struct TypePathExtractor {
    path: TypePath,
    options: TraversalOptions,
    name: String,
}

impl TypePathExtractor {
    pub fn new(
        schema: &TypeSchema,
        focus_type: &str,
        path: &str,
        options: TraversalOptions,
    ) -> Result<Self, PathError> {
        let path = resolve_path(schema, focus_type, path)?;
        let name = path.feature_name();
        Ok(Self {
            path,
            options,
            name,
        })
    }

    pub fn path(&self) -> &TypePath {
        &self.path
    }

    pub fn options(&self) -> TraversalOptions {
        self.options
    }

    /// Name carried by every emitted feature.
    pub fn feature_name(&self) -> &str {
        &self.name
    }
}

impl FeatureExtractor for TypePathExtractor {
    fn extract(&self, ctx: &ExtractionContext<'_>, focus: NodeId) -> ExtractResult<Vec<Feature>> {
        let found = ctx.graph.type_name(focus);
        if !ctx.schema.subtype_of(found, self.path.start_type()) {
            return Err(ExtractError::FocusType {
                node: focus,
                expected: self.path.start_type().to_string(),
                found: found.to_string(),
            });
        }

        let leaves = extract_path(ctx.schema, ctx.graph, focus, &self.path, self.options)?;
        Ok(leaves
            .into_iter()
            .map(|leaf| Feature {
                name: Some(self.name.clone()),
                value: FeatureValue::TypePath {
                    path: self.path.as_str().to_string(),
                    value: leaf.value,
                },
            })
            .collect())
    }
}
