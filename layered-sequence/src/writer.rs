//! Where decoded labels go.

use layered_features::NodeId;

use crate::error::WriteError;
use crate::label::{Label, LabelType};

/// Consumes the decoded labels of one sequence.
pub trait LabelWriter {
    fn expected_label_type(&self) -> LabelType;

    /// `labels[i]` is the label of `positions[i]`.
    fn write(&mut self, positions: &[NodeId], labels: &[Label]) -> Result<(), WriteError>;
}

impl<W: LabelWriter + ?Sized> LabelWriter for &mut W {
    fn expected_label_type(&self) -> LabelType {
        (**self).expected_label_type()
    }

    fn write(&mut self, positions: &[NodeId], labels: &[Label]) -> Result<(), WriteError> {
        (**self).write(positions, labels)
    }
}

/// Keeps every (position, label) pair in write order.
#[derive(Debug, Clone)]
pub struct CollectingWriter {
    expected: LabelType,
    written: Vec<(NodeId, Label)>,
}

impl CollectingWriter {
    pub fn new(expected: LabelType) -> Self {
        Self {
            expected,
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[(NodeId, Label)] {
        &self.written
    }

    pub fn label_of(&self, position: NodeId) -> Option<&Label> {
        self.written
            .iter()
            .find(|(node, _)| *node == position)
            .map(|(_, label)| label)
    }

    pub fn into_inner(self) -> Vec<(NodeId, Label)> {
        self.written
    }
}

impl Default for CollectingWriter {
    fn default() -> Self {
        Self::new(LabelType::Any)
    }
}

impl LabelWriter for CollectingWriter {
    fn expected_label_type(&self) -> LabelType {
        self.expected
    }

    fn write(&mut self, positions: &[NodeId], labels: &[Label]) -> Result<(), WriteError> {
        if positions.len() != labels.len() {
            return Err(WriteError::new(format!(
                "{} positions but {} labels",
                positions.len(),
                labels.len()
            )));
        }
        if let Some(label) = labels.iter().find(|label| !self.expected.admits(label)) {
            return Err(WriteError::new(format!(
                "label '{}' is not of type {}",
                label, self.expected
            )));
        }
        self.written
            .extend(positions.iter().copied().zip(labels.iter().cloned()));
        Ok(())
    }
}
