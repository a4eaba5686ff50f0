//! Composition of extractors.

use crate::error::ExtractResult;
use crate::graph::NodeId;

use super::{ExtractionContext, Feature, FeatureExtractor, RelationExtractor};

/// Runs several extractors on the same focus node and concatenates their
/// features, in the order the extractors were added.
#[derive(Default)]
pub struct CombinedExtractor {
    extractors: Vec<Box<dyn FeatureExtractor>>,
}

impl CombinedExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, extractor: impl FeatureExtractor + 'static) -> Self {
        self.push(extractor);
        self
    }

    pub fn push(&mut self, extractor: impl FeatureExtractor + 'static) {
        self.extractors.push(Box::new(extractor));
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl FeatureExtractor for CombinedExtractor {
    fn extract(&self, ctx: &ExtractionContext<'_>, focus: NodeId) -> ExtractResult<Vec<Feature>> {
        let mut features = Vec::new();
        for extractor in &self.extractors {
            features.extend(extractor.extract(ctx, focus)?);
        }
        Ok(features)
    }
}

impl std::fmt::Debug for CombinedExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinedExtractor")
            .field("extractors", &self.extractors.len())
            .finish()
    }
}

/// Prefixes the names of everything the inner extractor emits.
#[derive(Debug, Clone)]
pub struct NamingExtractor<E> {
    prefix: String,
    inner: E,
}

impl<E> NamingExtractor<E> {
    pub fn new(prefix: impl Into<String>, inner: E) -> Self {
        Self {
            prefix: prefix.into(),
            inner,
        }
    }
}

impl<E: FeatureExtractor> FeatureExtractor for NamingExtractor<E> {
    fn extract(&self, ctx: &ExtractionContext<'_>, focus: NodeId) -> ExtractResult<Vec<Feature>> {
        Ok(self
            .inner
            .extract(ctx, focus)?
            .into_iter()
            .map(|feature| feature.with_prefix(&self.prefix))
            .collect())
    }
}

/// Applies a single-node extractor to the source of a pair, prefixing
/// feature names with `Source`.
#[derive(Debug, Clone)]
pub struct SourceExtractor<E>(pub E);

/// Applies a single-node extractor to the target of a pair, prefixing
/// feature names with `Target`.
#[derive(Debug, Clone)]
pub struct TargetExtractor<E>(pub E);

impl<E: FeatureExtractor> RelationExtractor for SourceExtractor<E> {
    fn extract(
        &self,
        ctx: &ExtractionContext<'_>,
        source: NodeId,
        _target: NodeId,
    ) -> ExtractResult<Vec<Feature>> {
        Ok(self
            .0
            .extract(ctx, source)?
            .into_iter()
            .map(|feature| feature.with_prefix("Source"))
            .collect())
    }
}

impl<E: FeatureExtractor> RelationExtractor for TargetExtractor<E> {
    fn extract(
        &self,
        ctx: &ExtractionContext<'_>,
        _source: NodeId,
        target: NodeId,
    ) -> ExtractResult<Vec<Feature>> {
        Ok(self
            .0
            .extract(ctx, target)?
            .into_iter()
            .map(|feature| feature.with_prefix("Target"))
            .collect())
    }
}

/// Runs several relation extractors on the same pair.
#[derive(Default)]
pub struct CombinedRelationExtractor {
    extractors: Vec<Box<dyn RelationExtractor>>,
}

impl CombinedRelationExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, extractor: impl RelationExtractor + 'static) -> Self {
        self.extractors.push(Box::new(extractor));
        self
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl RelationExtractor for CombinedRelationExtractor {
    fn extract(
        &self,
        ctx: &ExtractionContext<'_>,
        source: NodeId,
        target: NodeId,
    ) -> ExtractResult<Vec<Feature>> {
        let mut features = Vec::new();
        for extractor in &self.extractors {
            features.extend(extractor.extract(ctx, source, target)?);
        }
        Ok(features)
    }
}

impl std::fmt::Debug for CombinedRelationExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinedRelationExtractor")
            .field("extractors", &self.extractors.len())
            .finish()
    }
}
