//! First-order Viterbi decoding.
//!
//! The decoder searches for the label sequence with the highest total score,
//! where a sequence's score is the sum of its per-position scores. With a
//! [`HistoryFeature`] configured, the scores at a position depend on the label
//! chosen for the previous position: the scorer sees the position's features
//! plus one extra feature naming that previous label.
//!
//! Ties are broken towards the label that comes first in the alphabet, both
//! when choosing a back-pointer and when choosing the final label.

use layered_features::Feature;
use tracing::trace;

use crate::error::{DecodeError, ScoreError};
use crate::label::Label;
use crate::scorer::ScoringClassifier;

pub const DEFAULT_HISTORY_NAME: &str = "PreviousOutcome_L1";
pub const DEFAULT_START_MARKER: &str = "<START>";

/// The feature that carries the previous position's label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryFeature {
    name: String,
    start_marker: String,
}

impl Default for HistoryFeature {
    fn default() -> Self {
        Self {
            name: DEFAULT_HISTORY_NAME.to_string(),
            start_marker: DEFAULT_START_MARKER.to_string(),
        }
    }
}

impl HistoryFeature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Value used in place of a label at the first position.
    pub fn with_start_marker(mut self, marker: impl Into<String>) -> Self {
        self.start_marker = marker.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_marker(&self) -> &str {
        &self.start_marker
    }

    /// The feature for a position whose predecessor is `previous`
    /// (`None` at the start of the sequence).
    pub fn feature(&self, previous: Option<&Label>) -> Feature {
        match previous {
            Some(label) => Feature::new(self.name.clone(), label.to_string()),
            None => Feature::new(self.name.clone(), self.start_marker.clone()),
        }
    }

    /// `features` followed by the history feature.
    pub fn augment(&self, features: &[Feature], previous: Option<&Label>) -> Vec<Feature> {
        let mut augmented = Vec::with_capacity(features.len() + 1);
        augmented.extend_from_slice(features);
        augmented.push(self.feature(previous));
        augmented
    }
}

/// Scores for every label at one position.
enum PositionScores {
    /// Independent of the previous label.
    Shared(Vec<f64>),
    /// One row per previous label, in alphabet order.
    PerPrevious(Vec<Vec<f64>>),
}

impl PositionScores {
    fn row(&self, previous: usize) -> &[f64] {
        match self {
            PositionScores::Shared(row) => row,
            PositionScores::PerPrevious(rows) => &rows[previous],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViterbiDecoder {
    history: Option<HistoryFeature>,
}

impl ViterbiDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(mut self, history: HistoryFeature) -> Self {
        self.history = Some(history);
        self
    }

    pub fn history(&self) -> Option<&HistoryFeature> {
        self.history.as_ref()
    }

    /// Decode `len` positions over `labels` with an arbitrary scorer.
    ///
    /// `score(i, previous)` returns one score per label for position `i`.
    /// Without history it is called once per position with `previous = None`.
    /// With history it is called with `None` at position 0 and then once per
    /// candidate previous label, in alphabet order. Calls are made in position
    /// order.
    ///
    /// ```
    /// use layered_sequence::ViterbiDecoder;
    ///
    /// let decoded = ViterbiDecoder::new()
    ///     .decode(&["A", "B"], 1, |_, _| Ok(vec![2.0, 1.0]))
    ///     .unwrap();
    /// assert_eq!(decoded, vec!["A"]);
    /// ```
    pub fn decode<L, F>(&self, labels: &[L], len: usize, mut score: F) -> Result<Vec<L>, DecodeError>
    where
        L: Clone,
        F: FnMut(usize, Option<&L>) -> Result<Vec<f64>, ScoreError>,
    {
        let with_history = self.history.is_some();
        let path = search(labels.len(), len, |position| {
            let scored = |result: Result<Vec<f64>, ScoreError>| {
                result.map_err(|source| DecodeError::Scorer { position, source })
            };
            if !with_history || position == 0 {
                return Ok(PositionScores::Shared(scored(score(position, None))?));
            }
            let mut rows = Vec::with_capacity(labels.len());
            for previous in labels {
                rows.push(scored(score(position, Some(previous)))?);
            }
            Ok(PositionScores::PerPrevious(rows))
        })?;
        Ok(path.into_iter().map(|index| labels[index].clone()).collect())
    }

    /// Decode a sequence of feature sets with a scoring classifier.
    ///
    /// With history, the candidate feature sets of one position are sent to
    /// [`ScoringClassifier::score_batch`] together.
    pub fn classify<C>(&self, classifier: &C, positions: &[Vec<Feature>]) -> Result<Vec<Label>, DecodeError>
    where
        C: ScoringClassifier + ?Sized,
    {
        let labels = classifier.labels();
        let path = search(labels.len(), positions.len(), |position| {
            let features = &positions[position];
            let scorer_failed = |source| DecodeError::Scorer { position, source };
            match &self.history {
                None => Ok(PositionScores::Shared(
                    classifier.score(features).map_err(scorer_failed)?,
                )),
                Some(history) if position == 0 => Ok(PositionScores::Shared(
                    classifier
                        .score(&history.augment(features, None))
                        .map_err(scorer_failed)?,
                )),
                Some(history) => {
                    let batch: Vec<Vec<Feature>> = labels
                        .iter()
                        .map(|previous| history.augment(features, Some(previous)))
                        .collect();
                    let rows = classifier.score_batch(&batch).map_err(scorer_failed)?;
                    if rows.len() != labels.len() {
                        return Err(DecodeError::BatchSize {
                            position,
                            expected: labels.len(),
                            found: rows.len(),
                        });
                    }
                    Ok(PositionScores::PerPrevious(rows))
                }
            }
        })?;
        Ok(path.into_iter().map(|index| labels[index].clone()).collect())
    }
}

/// The dynamic program over label indices.
fn search<F>(width: usize, len: usize, mut scores_at: F) -> Result<Vec<usize>, DecodeError>
where
    F: FnMut(usize) -> Result<PositionScores, DecodeError>,
{
    if len == 0 {
        return Ok(Vec::new());
    }
    if width == 0 {
        return Err(DecodeError::EmptyAlphabet);
    }

    let first = scores_at(0)?;
    let mut best: Vec<f64> = check_row(0, first.row(0), width)?.to_vec();
    let mut back: Vec<Vec<usize>> = Vec::with_capacity(len);
    back.push(Vec::new());

    for position in 1..len {
        let scores = scores_at(position)?;
        if let PositionScores::PerPrevious(rows) = &scores {
            for row in rows {
                check_row(position, row, width)?;
            }
        } else {
            check_row(position, scores.row(0), width)?;
        }

        let mut next = vec![0.0; width];
        let mut pointers = vec![0; width];
        for label in 0..width {
            let mut top = best[0] + scores.row(0)[label];
            let mut from = 0;
            for previous in 1..width {
                let candidate = best[previous] + scores.row(previous)[label];
                if candidate > top {
                    top = candidate;
                    from = previous;
                }
            }
            next[label] = top;
            pointers[label] = from;
        }
        best = next;
        back.push(pointers);
    }

    let mut last = 0;
    for label in 1..width {
        if best[label] > best[last] {
            last = label;
        }
    }
    trace!(len, width, score = best[last], "sequence decoded");

    let mut path = vec![last; len];
    for position in (1..len).rev() {
        path[position - 1] = back[position][path[position]];
    }
    Ok(path)
}

fn check_row(position: usize, row: &[f64], width: usize) -> Result<&[f64], DecodeError> {
    if row.len() != width {
        return Err(DecodeError::ScoreCount {
            position,
            expected: width,
            found: row.len(),
        });
    }
    if let Some(label) = row.iter().position(|score| score.is_nan()) {
        return Err(DecodeError::InvalidScore { position, label });
    }
    Ok(row)
}
