use crate::error::ExtractResult;
use crate::graph::NodeId;

use super::{ExtractionContext, Feature, FeatureExtractor};

/// Emits the focus node's covered text as a single unnamed feature.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoveredTextExtractor;

impl FeatureExtractor for CoveredTextExtractor {
    fn extract(&self, ctx: &ExtractionContext<'_>, focus: NodeId) -> ExtractResult<Vec<Feature>> {
        let text = ctx.graph.covered_text(focus);
        Ok(vec![Feature::unnamed(text)])
    }
}
