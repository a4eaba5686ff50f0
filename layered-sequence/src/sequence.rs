//! Sequences of positions and the features computed for them.

use layered_features::{
    extract_path, resolve_path, ExtractResult, ExtractionContext, Feature,
    FeatureExtractor, NodeId, TraversalOptions, TypePath, TypeSchema,
};

use crate::error::{ConfigError, SequenceErrorKind};
use crate::label::Label;

/// An ordered run of positions classified together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// The node the positions were collected from, if any.
    pub container: Option<NodeId>,
    pub positions: Vec<NodeId>,
}

impl Sequence {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Splits a document into sequences.
pub trait SequenceSelector: Send + Sync {
    fn select(&self, ctx: &ExtractionContext<'_>) -> Vec<Sequence>;

    /// Gold labels for every position of `sequence`, or
    /// [`SequenceErrorKind::NoGold`] when the selector has no gold source.
    fn gold_labels(
        &self,
        ctx: &ExtractionContext<'_>,
        sequence: &Sequence,
    ) -> Result<Vec<Label>, SequenceErrorKind>;

    /// Whether [`gold_labels`](Self::gold_labels) can succeed at all.
    fn has_gold(&self) -> bool {
        true
    }
}

/// Every container node of one type yields the item nodes inside it.
///
/// Containers are visited in span order, and items are ordered by
/// `(begin, end)` with ties kept in insertion order.
#[derive(Debug, Clone)]
pub struct CoveredSequences {
    container_type: String,
    item_type: String,
    gold: Option<TypePath>,
}

impl CoveredSequences {
    pub fn new(schema: &TypeSchema, container_type: &str, item_type: &str) -> Result<Self, ConfigError> {
        for type_name in [container_type, item_type] {
            if !schema.is_node_type(type_name) {
                return Err(ConfigError::UnknownType(type_name.to_string()));
            }
        }
        Ok(Self {
            container_type: container_type.to_string(),
            item_type: item_type.to_string(),
            gold: None,
        })
    }

    /// Read gold labels through `path`, starting at each item.
    pub fn with_gold_path(mut self, schema: &TypeSchema, path: &str) -> Result<Self, ConfigError> {
        self.gold = Some(resolve_path(schema, &self.item_type, path)?);
        Ok(self)
    }

    pub fn container_type(&self) -> &str {
        &self.container_type
    }

    pub fn item_type(&self) -> &str {
        &self.item_type
    }
}

impl SequenceSelector for CoveredSequences {
    fn has_gold(&self) -> bool {
        self.gold.is_some()
    }

    fn select(&self, ctx: &ExtractionContext<'_>) -> Vec<Sequence> {
        let graph = ctx.graph;
        let mut items = nodes_of_subtype(ctx, &self.item_type);
        items.sort_by_key(|&node| (graph.span(node), node));

        let mut containers = nodes_of_subtype(ctx, &self.container_type);
        containers.sort_by_key(|&node| (graph.span(node), node));

        containers
            .into_iter()
            .map(|container| {
                let span = graph.span(container);
                let positions = items
                    .iter()
                    .copied()
                    .filter(|&item| item != container && span.contains(&graph.span(item)))
                    .collect();
                Sequence {
                    container: Some(container),
                    positions,
                }
            })
            .collect()
    }

    fn gold_labels(
        &self,
        ctx: &ExtractionContext<'_>,
        sequence: &Sequence,
    ) -> Result<Vec<Label>, SequenceErrorKind> {
        let path = self.gold.as_ref().ok_or(SequenceErrorKind::NoGold)?;
        sequence
            .positions
            .iter()
            .map(|&position| {
                let leaves = extract_path(
                    ctx.schema,
                    ctx.graph,
                    position,
                    path,
                    TraversalOptions::default(),
                )
                .map_err(|e| SequenceErrorKind::Extract(e.into()))?;
                let leaf = leaves
                    .into_iter()
                    .next()
                    .ok_or(SequenceErrorKind::MissingGold { position })?;
                Label::from_primitive(&leaf.value).ok_or_else(|| SequenceErrorKind::UnusableGold {
                    position,
                    value: leaf.value.to_string(),
                })
            })
            .collect()
    }
}

fn nodes_of_subtype(ctx: &ExtractionContext<'_>, type_name: &str) -> Vec<NodeId> {
    ctx.graph
        .nodes()
        .into_iter()
        .filter(|&node| ctx.schema.subtype_of(ctx.graph.type_name(node), type_name))
        .collect()
}

/// Computes one feature set per position.
pub struct SequenceFeaturizer {
    extractor: Box<dyn FeatureExtractor>,
}

impl SequenceFeaturizer {
    pub fn new(extractor: impl FeatureExtractor + 'static) -> Self {
        Self {
            extractor: Box::new(extractor),
        }
    }

    /// Features for every position, in order. The first failing position
    /// fails the whole sequence.
    pub fn featurize(
        &self,
        ctx: &ExtractionContext<'_>,
        sequence: &Sequence,
    ) -> ExtractResult<Vec<Vec<Feature>>> {
        sequence
            .positions
            .iter()
            .map(|&position| self.extractor.extract(ctx, position))
            .collect()
    }
}

impl std::fmt::Debug for SequenceFeaturizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceFeaturizer").finish_non_exhaustive()
    }
}
