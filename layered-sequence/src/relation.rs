//! Instances for pairs of nodes.
//!
//! Relation classification labels an ordered (source, target) pair, for
//! example the temporal order (`BEFORE`, `OVERLAP`, `AFTER`) between the main
//! events of two adjacent sentences.

use layered_features::{ExtractResult, ExtractionContext, NodeId, RelationExtractor};

use crate::instance::Instance;
use crate::label::Label;

/// Builds one [`Instance`] per node pair.
pub struct RelationInstanceBuilder {
    extractor: Box<dyn RelationExtractor>,
}

impl RelationInstanceBuilder {
    pub fn new(extractor: impl RelationExtractor + 'static) -> Self {
        Self {
            extractor: Box::new(extractor),
        }
    }

    pub fn instance(
        &self,
        ctx: &ExtractionContext<'_>,
        source: NodeId,
        target: NodeId,
        label: Option<Label>,
    ) -> ExtractResult<Instance> {
        let features = self.extractor.extract(ctx, source, target)?;
        Ok(Instance { features, label })
    }
}

impl std::fmt::Debug for RelationInstanceBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationInstanceBuilder").finish_non_exhaustive()
    }
}

/// Pairs the representative of each container with the representative of the
/// next container.
///
/// Containers of `container_type` (and its subtypes) are taken in span order.
/// `representative` picks the node standing for a container; a container
/// without one breaks the chain on both sides.
pub fn consecutive_container_pairs<F>(
    ctx: &ExtractionContext<'_>,
    container_type: &str,
    mut representative: F,
) -> Vec<(NodeId, NodeId)>
where
    F: FnMut(&ExtractionContext<'_>, NodeId) -> Option<NodeId>,
{
    let mut containers: Vec<NodeId> = ctx
        .graph
        .nodes()
        .into_iter()
        .filter(|&node| ctx.schema.subtype_of(ctx.graph.type_name(node), container_type))
        .collect();
    containers.sort_by_key(|&node| (ctx.graph.span(node), node));

    let chosen: Vec<Option<NodeId>> = containers
        .iter()
        .map(|&container| representative(ctx, container))
        .collect();

    chosen
        .windows(2)
        .filter_map(|pair| match (pair[0], pair[1]) {
            (Some(source), Some(target)) => Some((source, target)),
            _ => None,
        })
        .collect()
}

/// A representative picker: the first node of `item_type` (or a subtype)
/// inside the container, by span order.
pub fn first_covered(
    item_type: &str,
) -> impl Fn(&ExtractionContext<'_>, NodeId) -> Option<NodeId> + '_ {
    move |ctx, container| {
        let span = ctx.graph.span(container);
        ctx.graph
            .nodes()
            .into_iter()
            .filter(|&node| {
                node != container
                    && ctx.schema.subtype_of(ctx.graph.type_name(node), item_type)
                    && span.contains(&ctx.graph.span(node))
            })
            .min_by_key(|&node| (ctx.graph.span(node), node))
    }
}
