use layered_features::{
    CombinedRelationExtractor, ExtractionContext, RelativePositionExtractor, SourceExtractor,
    TargetExtractor, TraversalOptions, TypePathExtractor,
};

use super::fixtures::corpus;
use crate::{consecutive_container_pairs, first_covered, Label, RelationInstanceBuilder};

#[test]
fn pairs_events_of_adjacent_sentences() {
    let c = corpus();
    let ctx = ExtractionContext::new(&c.schema, &c.doc);

    let pairs = consecutive_container_pairs(&ctx, "Sentence", first_covered("Event"));
    assert_eq!(pairs, vec![(c.events[0], c.events[1])]);
}

#[test]
fn a_container_without_representative_breaks_the_chain() {
    let mut c = corpus();
    let third = c.doc.add_node("Sentence", 26, 26);
    let ctx = ExtractionContext::new(&c.schema, &c.doc);

    let pairs = consecutive_container_pairs(&ctx, "Sentence", |ctx, container| {
        if container == c.sentences[1] {
            None
        } else {
            first_covered("Event")(ctx, container)
        }
    });
    assert!(pairs.is_empty());

    let tokens = consecutive_container_pairs(&ctx, "Sentence", first_covered("Token"));
    assert_eq!(tokens, vec![(c.tokens[0], c.tokens[4])]);
    assert!(tokens.iter().all(|(_, target)| *target != third));
}

#[test]
fn relation_instance_features() {
    let c = corpus();
    let ctx = ExtractionContext::new(&c.schema, &c.doc);
    let tense = || {
        TypePathExtractor::new(&c.schema, "Event", "tense", TraversalOptions::default()).unwrap()
    };
    let builder = RelationInstanceBuilder::new(
        CombinedRelationExtractor::new()
            .with(SourceExtractor(tense()))
            .with(TargetExtractor(tense()))
            .with(RelativePositionExtractor),
    );

    let instance = builder
        .instance(&ctx, c.events[0], c.events[1], Some(Label::from("BEFORE")))
        .unwrap();
    assert_eq!(instance.label, Some(Label::from("BEFORE")));
    let rendered: Vec<String> = instance.features.iter().map(|f| f.to_string()).collect();
    assert_eq!(
        rendered,
        vec![
            "Source_TypePath(Tense)=PRESENT",
            "Target_TypePath(Tense)=PRESENT",
            "RelativePosition=LEFTOF",
        ]
    );

    let unlabeled = builder
        .instance(&ctx, c.events[1], c.events[0], None)
        .unwrap();
    assert!(unlabeled.label.is_none());
    assert_eq!(
        unlabeled.features.last().map(|f| f.to_string()),
        Some("RelativePosition=RIGHTOF".to_string())
    );
}
