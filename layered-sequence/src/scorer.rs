//! The scoring classifier boundary.
//!
//! A trained model is opaque here: it declares which labels it knows and
//! returns one score per label for a feature set. Higher is better.

use std::collections::BTreeMap;
use std::sync::Arc;

use layered_features::Feature;
use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::label::{Label, LabelType};

pub trait ScoringClassifier: Send + Sync {
    /// Type of every label in [`labels`](Self::labels).
    fn label_type(&self) -> LabelType;

    /// The label alphabet. Score vectors follow this order.
    fn labels(&self) -> &[Label];

    fn score(&self, features: &[Feature]) -> Result<Vec<f64>, ScoreError>;

    /// Score several feature sets at once. Must agree with calling
    /// [`score`](Self::score) on each set in order.
    fn score_batch(&self, batch: &[Vec<Feature>]) -> Result<Vec<Vec<f64>>, ScoreError> {
        batch.iter().map(|features| self.score(features)).collect()
    }
}

impl<C: ScoringClassifier + ?Sized> ScoringClassifier for &C {
    fn label_type(&self) -> LabelType {
        (**self).label_type()
    }

    fn labels(&self) -> &[Label] {
        (**self).labels()
    }

    fn score(&self, features: &[Feature]) -> Result<Vec<f64>, ScoreError> {
        (**self).score(features)
    }

    fn score_batch(&self, batch: &[Vec<Feature>]) -> Result<Vec<Vec<f64>>, ScoreError> {
        (**self).score_batch(batch)
    }
}

impl<C: ScoringClassifier + ?Sized> ScoringClassifier for Arc<C> {
    fn label_type(&self) -> LabelType {
        (**self).label_type()
    }

    fn labels(&self) -> &[Label] {
        (**self).labels()
    }

    fn score(&self, features: &[Feature]) -> Result<Vec<f64>, ScoreError> {
        (**self).score(features)
    }

    fn score_batch(&self, batch: &[Vec<Feature>]) -> Result<Vec<Vec<f64>>, ScoreError> {
        (**self).score_batch(batch)
    }
}

/// A linear model given as a weight table.
///
/// The score of a label is its bias plus the weights of every feature present,
/// where a feature is keyed by its rendered form (`name=value`, or just the
/// value for unnamed features). Weights are typically exported by an external
/// trainer and loaded from JSON.
///
/// ```
/// use layered_features::Feature;
/// use layered_sequence::{Label, LabelType, ScoringClassifier, WeightTable};
///
/// let model = WeightTable::new(LabelType::Text, vec![Label::from("NN"), Label::from("VB")])
///     .with_weight("dog", &Label::from("NN"), 2.0)
///     .with_bias(&Label::from("VB"), 0.5);
///
/// assert_eq!(model.score(&[Feature::unnamed("dog")]).unwrap(), vec![2.0, 0.5]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightTable {
    label_type: LabelType,
    labels: Vec<Label>,
    #[serde(default)]
    bias: Vec<f64>,
    #[serde(default)]
    weights: BTreeMap<String, Vec<f64>>,
}

impl WeightTable {
    pub fn new(label_type: LabelType, labels: Vec<Label>) -> Self {
        let bias = vec![0.0; labels.len()];
        Self {
            label_type,
            labels,
            bias,
            weights: BTreeMap::new(),
        }
    }

    /// Add `weight` to `label` whenever `feature` is present. Labels outside
    /// the alphabet are ignored.
    pub fn with_weight(mut self, feature: &str, label: &Label, weight: f64) -> Self {
        if let Some(index) = self.index_of(label) {
            let width = self.labels.len();
            let row = self
                .weights
                .entry(feature.to_string())
                .or_insert_with(|| vec![0.0; width]);
            row[index] += weight;
        }
        self
    }

    pub fn with_bias(mut self, label: &Label, weight: f64) -> Self {
        if let Some(index) = self.index_of(label) {
            self.bias.resize(self.labels.len(), 0.0);
            self.bias[index] += weight;
        }
        self
    }

    fn index_of(&self, label: &Label) -> Option<usize> {
        self.labels.iter().position(|known| known == label)
    }
}

impl ScoringClassifier for WeightTable {
    fn label_type(&self) -> LabelType {
        self.label_type
    }

    fn labels(&self) -> &[Label] {
        &self.labels
    }

    fn score(&self, features: &[Feature]) -> Result<Vec<f64>, ScoreError> {
        let width = self.labels.len();
        let mut scores = self.bias.clone();
        scores.resize(width, 0.0);
        for feature in features {
            if let Some(row) = self.weights.get(&feature.to_string()) {
                if row.len() != width {
                    return Err(ScoreError::new(format!(
                        "weights for '{}' have {} entries, alphabet has {}",
                        feature,
                        row.len(),
                        width
                    )));
                }
                for (score, weight) in scores.iter_mut().zip(row) {
                    *score += weight;
                }
            }
        }
        Ok(scores)
    }
}
