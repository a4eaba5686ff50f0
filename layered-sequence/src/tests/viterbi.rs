use layered_features::Feature;

use super::fixtures::{tagger, Recording};
use crate::{DecodeError, HistoryFeature, Label, ScoreError, ViterbiDecoder};

const AB: [&str; 2] = ["A", "B"];

fn independent(table: Vec<Vec<f64>>) -> impl FnMut(usize, Option<&&str>) -> Result<Vec<f64>, ScoreError> {
    move |position, _| Ok(table[position].clone())
}

#[test]
fn empty_sequence_decodes_to_nothing() {
    let decoded = ViterbiDecoder::new()
        .decode(&AB, 0, |_, _| -> Result<Vec<f64>, ScoreError> { unreachable!() })
        .unwrap();
    assert!(decoded.is_empty());

    let empty: [&str; 0] = [];
    let decoded = ViterbiDecoder::new()
        .decode(&empty, 0, |_, _| Ok(Vec::new()))
        .unwrap();
    assert!(decoded.is_empty());
}

#[test]
fn empty_alphabet_is_rejected() {
    let empty: [&str; 0] = [];
    let err = ViterbiDecoder::new()
        .decode(&empty, 2, |_, _| Ok(Vec::new()))
        .unwrap_err();
    assert_eq!(err, DecodeError::EmptyAlphabet);
}

#[test]
fn single_position_takes_the_best_label() {
    let decoded = ViterbiDecoder::new()
        .decode(&AB, 1, independent(vec![vec![2.0, 1.0]]))
        .unwrap();
    assert_eq!(decoded, vec!["A"]);
}

#[test]
fn single_label_alphabet() {
    let decoded = ViterbiDecoder::new()
        .decode(&["O"], 3, |_, _| Ok(vec![-1.0]))
        .unwrap();
    assert_eq!(decoded, vec!["O", "O", "O"]);
}

#[test]
fn ties_go_to_the_earlier_label() {
    let decoded = ViterbiDecoder::new()
        .decode(&AB, 2, independent(vec![vec![1.0, 1.0], vec![0.5, 0.5]]))
        .unwrap();
    assert_eq!(decoded, vec!["A", "A"]);
}

#[test]
fn history_dependent_scores_beat_greedy_choices() {
    // Greedy picks A first (0.6 > 0.4), then B (0.1): total 0.7.
    // B then A scores 0.4 + 1.0 = 1.4.
    let score = |position: usize, previous: Option<&&str>| -> Result<Vec<f64>, ScoreError> {
        Ok(match (position, previous) {
            (0, None) => vec![0.6, 0.4],
            (1, Some(&"A")) => vec![0.0, 0.1],
            (1, Some(&"B")) => vec![1.0, 0.0],
            other => panic!("unexpected call {:?}", other),
        })
    };
    let decoder = ViterbiDecoder::new().with_history(HistoryFeature::default());
    assert_eq!(decoder.decode(&AB, 2, score).unwrap(), vec!["B", "A"]);
}

#[test]
fn scorer_is_called_in_position_order() {
    let mut calls = Vec::new();
    ViterbiDecoder::new()
        .with_history(HistoryFeature::default())
        .decode(&AB, 3, |position, previous| {
            calls.push((position, previous.copied()));
            Ok(vec![0.0, 0.0])
        })
        .unwrap();
    assert_eq!(
        calls,
        vec![
            (0, None),
            (1, Some("A")),
            (1, Some("B")),
            (2, Some("A")),
            (2, Some("B")),
        ]
    );

    let mut positions = Vec::new();
    ViterbiDecoder::new()
        .decode(&AB, 3, |position, previous| {
            assert!(previous.is_none());
            positions.push(position);
            Ok(vec![0.0, 0.0])
        })
        .unwrap();
    assert_eq!(positions, vec![0, 1, 2]);
}

#[test]
fn wrong_score_count() {
    let err = ViterbiDecoder::new()
        .decode(&AB, 2, independent(vec![vec![1.0, 0.0], vec![1.0]]))
        .unwrap_err();
    assert_eq!(
        err,
        DecodeError::ScoreCount {
            position: 1,
            expected: 2,
            found: 1,
        }
    );
}

#[test]
fn nan_scores_are_rejected() {
    let err = ViterbiDecoder::new()
        .decode(&AB, 1, independent(vec![vec![0.0, f64::NAN]]))
        .unwrap_err();
    assert_eq!(err, DecodeError::InvalidScore { position: 0, label: 1 });
}

#[test]
fn scorer_errors_carry_the_position() {
    let err = ViterbiDecoder::new()
        .decode(&AB, 3, |position, _| {
            if position == 2 {
                Err(ScoreError::new("timeout"))
            } else {
                Ok(vec![0.0, 1.0])
            }
        })
        .unwrap_err();
    assert_eq!(
        err,
        DecodeError::Scorer {
            position: 2,
            source: ScoreError::new("timeout"),
        }
    );
}

#[test]
fn classify_sends_history_candidates_as_one_batch() {
    let model = Recording::new(tagger());
    let decoder = ViterbiDecoder::new().with_history(HistoryFeature::new("Prev").with_start_marker("^"));
    let positions = vec![
        vec![Feature::unnamed("the")],
        vec![Feature::unnamed("dog")],
    ];

    let labels = decoder.classify(&model, &positions).unwrap();
    assert_eq!(labels, vec![Label::from("DT"), Label::from("NN")]);
    assert_eq!(model.calls(), vec!["score", "batch:4"]);
}

#[test]
fn history_feature_values() {
    let history = HistoryFeature::default();
    assert_eq!(history.feature(None).to_string(), "PreviousOutcome_L1=<START>");
    assert_eq!(
        history.feature(Some(&Label::from("NN"))).to_string(),
        "PreviousOutcome_L1=NN"
    );

    let augmented = history.augment(&[Feature::unnamed("dog")], Some(&Label::Integer(3)));
    assert_eq!(augmented.len(), 2);
    assert_eq!(augmented[1].to_string(), "PreviousOutcome_L1=3");
}
