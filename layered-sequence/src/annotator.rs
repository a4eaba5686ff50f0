//! Document-level orchestration of sequence classification.
//!
//! A [`SequentialAnnotator`] runs in one of two modes, fixed at construction:
//!
//! - [`Training`]: every position becomes an [`Instance`] with its gold
//!   label, sent to an [`InstanceSink`]. Nothing is decoded.
//! - [`Prediction`]: every sequence is decoded with the [`ViterbiDecoder`]
//!   and the labels are handed to a [`LabelWriter`].
//!
//! Failures are confined to the sequence they happen in and collected in the
//! [`ProcessReport`].

use layered_features::ExtractionContext;
use tracing::{debug, warn};

use crate::error::{ConfigError, SequenceError, SequenceErrorKind};
use crate::instance::{Instance, InstanceSink};
use crate::scorer::ScoringClassifier;
use crate::sequence::{Sequence, SequenceFeaturizer, SequenceSelector};
use crate::viterbi::{HistoryFeature, ViterbiDecoder};
use crate::writer::LabelWriter;

/// Progress of one document through the annotator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    Configured,
    SequencesExtracted,
    TrainingInstancesEmitted,
    LabelsDecoded,
    Done,
}

/// Outcome of processing one document.
#[derive(Debug)]
pub struct ProcessReport {
    pub state: DocumentState,
    pub sequences: usize,
    pub instances_emitted: usize,
    pub labels_written: usize,
    pub errors: Vec<SequenceError>,
}

impl ProcessReport {
    fn new() -> Self {
        Self {
            state: DocumentState::Configured,
            sequences: 0,
            instances_emitted: 0,
            labels_written: 0,
            errors: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn add_error(&mut self, sequence: usize, kind: SequenceErrorKind) {
        warn!(sequence, error = %kind, "sequence failed");
        self.errors.push(SequenceError { sequence, kind });
    }

    fn advance(&mut self, state: DocumentState) {
        debug!(from = ?self.state, to = ?state, "document state");
        self.state = state;
    }
}

/// Training mode: gold-labeled instances go to `K`.
#[derive(Debug)]
pub struct Training<K> {
    sink: K,
}

/// Prediction mode: `C` scores, `W` receives the decoded labels.
#[derive(Debug)]
pub struct Prediction<C, W> {
    classifier: C,
    writer: W,
}

pub struct SequentialAnnotator<M> {
    selector: Box<dyn SequenceSelector>,
    featurizer: SequenceFeaturizer,
    decoder: ViterbiDecoder,
    mode: M,
}

impl<M> SequentialAnnotator<M> {
    /// Add the previous label as a feature of every position.
    ///
    /// In training the gold label of the previous position is used, so the
    /// model learns from the same features it is later asked about.
    pub fn with_history(mut self, history: HistoryFeature) -> Self {
        self.decoder = self.decoder.with_history(history);
        self
    }

    pub fn history(&self) -> Option<&HistoryFeature> {
        self.decoder.history()
    }

    fn select(&self, ctx: &ExtractionContext<'_>, report: &mut ProcessReport) -> Vec<Sequence> {
        let sequences = self.selector.select(ctx);
        report.sequences = sequences.len();
        report.advance(DocumentState::SequencesExtracted);
        debug!(sequences = sequences.len(), "sequences extracted");
        sequences
    }
}

impl<K: InstanceSink> SequentialAnnotator<Training<K>> {
    /// Fails when `selector` has no source of gold labels.
    pub fn training(
        selector: impl SequenceSelector + 'static,
        featurizer: SequenceFeaturizer,
        sink: K,
    ) -> Result<Self, ConfigError> {
        if !selector.has_gold() {
            return Err(ConfigError::MissingGoldPath);
        }
        Ok(Self {
            selector: Box::new(selector),
            featurizer,
            decoder: ViterbiDecoder::new(),
            mode: Training { sink },
        })
    }

    pub fn sink(&self) -> &K {
        &self.mode.sink
    }

    pub fn into_sink(self) -> K {
        self.mode.sink
    }

    pub fn process(&mut self, ctx: &ExtractionContext<'_>) -> ProcessReport {
        let mut report = ProcessReport::new();
        let sequences = self.select(ctx, &mut report);

        for (index, sequence) in sequences.iter().enumerate() {
            if let Err(kind) = self.emit(ctx, sequence, &mut report.instances_emitted) {
                report.add_error(index, kind);
            }
        }

        report.advance(DocumentState::TrainingInstancesEmitted);
        report.advance(DocumentState::Done);
        report
    }

    /// Send the instances of one sequence to the sink, counting each write
    /// that succeeds. Nothing is written unless featurization and gold
    /// lookup succeed for every position.
    fn emit(
        &mut self,
        ctx: &ExtractionContext<'_>,
        sequence: &Sequence,
        emitted: &mut usize,
    ) -> Result<(), SequenceErrorKind> {
        for instance in self.instances(ctx, sequence)? {
            self.mode.sink.write(instance)?;
            *emitted += 1;
        }
        Ok(())
    }

    fn instances(
        &self,
        ctx: &ExtractionContext<'_>,
        sequence: &Sequence,
    ) -> Result<Vec<Instance>, SequenceErrorKind> {
        let features = self.featurizer.featurize(ctx, sequence)?;
        let gold = self.selector.gold_labels(ctx, sequence)?;

        let history = self.decoder.history();
        Ok(features
            .into_iter()
            .zip(&gold)
            .enumerate()
            .map(|(position, (features, label))| {
                let features = match history {
                    Some(history) => {
                        let previous = position.checked_sub(1).map(|p| &gold[p]);
                        history.augment(&features, previous)
                    }
                    None => features,
                };
                Instance::labeled(features, label.clone())
            })
            .collect())
    }
}

impl<C, W> SequentialAnnotator<Prediction<C, W>>
where
    C: ScoringClassifier,
    W: LabelWriter,
{
    /// Fails when the classifier's labels cannot be handed to the writer.
    pub fn prediction(
        selector: impl SequenceSelector + 'static,
        featurizer: SequenceFeaturizer,
        classifier: C,
        writer: W,
    ) -> Result<Self, ConfigError> {
        check_compatibility(&classifier, &writer)?;
        Ok(Self {
            selector: Box::new(selector),
            featurizer,
            decoder: ViterbiDecoder::new(),
            mode: Prediction { classifier, writer },
        })
    }

    pub fn classifier(&self) -> &C {
        &self.mode.classifier
    }

    pub fn writer(&self) -> &W {
        &self.mode.writer
    }

    pub fn into_writer(self) -> W {
        self.mode.writer
    }

    pub fn process(&mut self, ctx: &ExtractionContext<'_>) -> ProcessReport {
        let mut report = ProcessReport::new();
        let sequences = self.select(ctx, &mut report);

        for (index, sequence) in sequences.iter().enumerate() {
            match self.label(ctx, sequence) {
                Ok(written) => report.labels_written += written,
                Err(kind) => report.add_error(index, kind),
            }
        }

        report.advance(DocumentState::LabelsDecoded);
        report.advance(DocumentState::Done);
        report
    }

    fn label(&mut self, ctx: &ExtractionContext<'_>, sequence: &Sequence) -> Result<usize, SequenceErrorKind> {
        let features = self.featurizer.featurize(ctx, sequence)?;
        let labels = self.decoder.classify(&self.mode.classifier, &features)?;
        self.mode.writer.write(&sequence.positions, &labels)?;
        Ok(labels.len())
    }
}

/// Check that `classifier` can feed `writer`.
///
/// The classifier's declared label type must be assignable to the type the
/// writer expects, and every label of its alphabet must be of that type.
pub fn check_compatibility<C, W>(classifier: &C, writer: &W) -> Result<(), ConfigError>
where
    C: ScoringClassifier + ?Sized,
    W: LabelWriter + ?Sized,
{
    let declared = classifier.label_type();
    let expected = writer.expected_label_type();
    if !declared.is_assignable_to(expected) {
        return Err(ConfigError::LabelTypeMismatch {
            classifier: declared,
            writer: expected,
        });
    }
    let labels = classifier.labels();
    if labels.is_empty() {
        return Err(ConfigError::EmptyAlphabet);
    }
    if let Some(label) = labels.iter().find(|label| !declared.admits(label)) {
        return Err(ConfigError::AlphabetLabel {
            label: label.clone(),
            expected: declared,
        });
    }
    Ok(())
}

impl<M> std::fmt::Debug for SequentialAnnotator<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequentialAnnotator")
            .field("history", &self.decoder.history())
            .finish_non_exhaustive()
    }
}
