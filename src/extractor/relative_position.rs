//! Placement of one span relative to another.

use std::fmt;

use crate::error::ExtractResult;
use crate::graph::{NodeId, Span};

use super::{ExtractionContext, Feature, RelationExtractor};

/// How the first span sits relative to the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelativePosition {
    Equals,
    Contains,
    ContainedBy,
    OverlapsLeft,
    OverlapsRight,
    LeftOf,
    RightOf,
}

impl RelativePosition {
    pub const ALL: [RelativePosition; 7] = [
        RelativePosition::Equals,
        RelativePosition::Contains,
        RelativePosition::ContainedBy,
        RelativePosition::OverlapsLeft,
        RelativePosition::OverlapsRight,
        RelativePosition::LeftOf,
        RelativePosition::RightOf,
    ];

    /// Classify `first` against `second` from their bounds alone.
    ///
    /// Spans that only touch are `LeftOf`/`RightOf`. A partial overlap is
    /// `OverlapsLeft` when `first` starts earlier, `OverlapsRight` otherwise.
    pub fn classify(first: Span, second: Span) -> Self {
        if first == second {
            RelativePosition::Equals
        } else if first.contains(&second) {
            RelativePosition::Contains
        } else if second.contains(&first) {
            RelativePosition::ContainedBy
        } else if first.end <= second.begin {
            RelativePosition::LeftOf
        } else if second.end <= first.begin {
            RelativePosition::RightOf
        } else if first.begin < second.begin {
            RelativePosition::OverlapsLeft
        } else {
            RelativePosition::OverlapsRight
        }
    }

    /// The classification obtained by swapping the two spans.
    pub fn inverse(self) -> Self {
        match self {
            RelativePosition::Equals => RelativePosition::Equals,
            RelativePosition::Contains => RelativePosition::ContainedBy,
            RelativePosition::ContainedBy => RelativePosition::Contains,
            RelativePosition::OverlapsLeft => RelativePosition::OverlapsRight,
            RelativePosition::OverlapsRight => RelativePosition::OverlapsLeft,
            RelativePosition::LeftOf => RelativePosition::RightOf,
            RelativePosition::RightOf => RelativePosition::LeftOf,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RelativePosition::Equals => "EQUALS",
            RelativePosition::Contains => "CONTAINS",
            RelativePosition::ContainedBy => "CONTAINEDBY",
            RelativePosition::OverlapsLeft => "OVERLAPS_LEFT",
            RelativePosition::OverlapsRight => "OVERLAPS_RIGHT",
            RelativePosition::LeftOf => "LEFTOF",
            RelativePosition::RightOf => "RIGHTOF",
        }
    }
}

impl fmt::Display for RelativePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emits one `RelativePosition` feature for a source/target pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelativePositionExtractor;

impl RelativePositionExtractor {
    pub const FEATURE_NAME: &'static str = "RelativePosition";
}

impl RelationExtractor for RelativePositionExtractor {
    fn extract(
        &self,
        ctx: &ExtractionContext<'_>,
        source: NodeId,
        target: NodeId,
    ) -> ExtractResult<Vec<Feature>> {
        let position = RelativePosition::classify(ctx.graph.span(source), ctx.graph.span(target));
        Ok(vec![Feature::new(Self::FEATURE_NAME, position.as_str())])
    }
}
