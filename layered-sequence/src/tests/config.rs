use std::io::Write;

use layered_features::schema::{SchemaBuilder, STRING};
use layered_features::{AnnotatedDocument, ExtractionContext, Primitive};

use super::fixtures::corpus;
use crate::{
    ConfigError, ExtractorSpec, HistoryConfig, PipelineConfig, SequenceSelector, VecSink,
};

const TAGGER: &str = r#"
container_type = "Sentence"
item_type = "Token"
gold_path = "posTag/value"

[history]

[[extractors]]
kind = "covered_text"
prefix = "Word"

[[extractors]]
kind = "type_path"
path = "lemma/value"
distinct_values_only = true
"#;

#[test]
fn parses_a_tagger_pipeline() {
    let config = PipelineConfig::from_toml_str(TAGGER).unwrap();
    assert_eq!(config.container_type, "Sentence");
    assert_eq!(config.gold_path.as_deref(), Some("posTag/value"));
    assert_eq!(config.history, Some(HistoryConfig::default()));
    assert_eq!(
        config.extractors,
        vec![
            ExtractorSpec::CoveredText {
                prefix: Some("Word".to_string()),
            },
            ExtractorSpec::TypePath {
                path: "lemma/value".to_string(),
                dependent_types: false,
                distinct_values_only: true,
                duplicate_covered_text: false,
                first_value_only: false,
                prefix: None,
            },
        ]
    );

    let history = config.history_feature().unwrap();
    assert_eq!(history.name(), "PreviousOutcome_L1");
    assert_eq!(history.start_marker(), "<START>");
}

#[test]
fn history_is_off_unless_configured() {
    let config = PipelineConfig::from_toml_str(
        r#"
container_type = "Sentence"
item_type = "Token"
"#,
    )
    .unwrap();
    assert!(config.history_feature().is_none());
    assert!(config.extractors.is_empty());
    assert!(config.gold_path.is_none());
}

#[test]
fn training_from_config() {
    let c = corpus();
    let ctx = ExtractionContext::new(&c.schema, &c.doc);
    let config = PipelineConfig::from_toml_str(TAGGER).unwrap();

    let mut annotator = config.training(&c.schema, VecSink::new()).unwrap();
    let report = annotator.process(&ctx);
    assert!(!report.has_errors());

    let first: Vec<String> = annotator.sink().instances()[1]
        .features
        .iter()
        .map(|f| f.to_string())
        .collect();
    insta::assert_debug_snapshot!(first, @r###"
    [
        "Word=dog",
        "TypePath(LemmaValue)=dog",
        "PreviousOutcome_L1=DT",
    ]
    "###);
}

#[test]
fn training_requires_a_gold_path() {
    let c = corpus();
    let config = PipelineConfig::from_toml_str(
        r#"
container_type = "Sentence"
item_type = "Token"

[[extractors]]
kind = "covered_text"
"#,
    )
    .unwrap();
    assert!(matches!(
        config.training(&c.schema, VecSink::new()),
        Err(ConfigError::MissingGoldPath)
    ));
}

#[test]
fn first_value_only_extractors() {
    let schema = SchemaBuilder::new()
        .node("Sentence", |t| t)
        .node("Token", |t| t.multi("senses", STRING))
        .build()
        .unwrap();
    let mut doc = AnnotatedDocument::new("bank");
    doc.add_node("Sentence", 0, 4);
    let token = doc.add_node("Token", 0, 4);
    doc.set_edge(
        token,
        "senses",
        vec![Primitive::from("river"), Primitive::from("money")],
    );
    let ctx = ExtractionContext::new(&schema, &doc);

    let config = PipelineConfig::from_toml_str(
        r#"
container_type = "Sentence"
item_type = "Token"

[[extractors]]
kind = "type_path"
path = "senses"

[[extractors]]
kind = "type_path"
path = "senses"
first_value_only = true
prefix = "First"
"#,
    )
    .unwrap();
    let sequences = config.build_selector(&schema).unwrap().select(&ctx);
    let features = config
        .build_featurizer(&schema)
        .unwrap()
        .featurize(&ctx, &sequences[0])
        .unwrap();

    let rendered: Vec<String> = features[0].iter().map(|f| f.to_string()).collect();
    assert_eq!(
        rendered,
        vec![
            "TypePath(Senses)=river",
            "TypePath(Senses)=money",
            "First_TypePath(Senses)=river",
        ]
    );
}

#[test]
fn invalid_paths_are_rejected_when_building() {
    let c = corpus();
    let config = PipelineConfig::from_toml_str(
        r#"
container_type = "Sentence"
item_type = "Token"

[[extractors]]
kind = "type_path"
path = "lemma/nonexistent"
"#,
    )
    .unwrap();
    assert!(matches!(
        config.build_featurizer(&c.schema),
        Err(ConfigError::Path(_))
    ));
}

#[test]
fn unknown_container_type() {
    let c = corpus();
    let config = PipelineConfig::from_toml_str(
        r#"
container_type = "Paragraph"
item_type = "Token"
"#,
    )
    .unwrap();
    assert!(matches!(
        config.build_selector(&c.schema),
        Err(ConfigError::UnknownType(name)) if name == "Paragraph"
    ));
}

#[test]
fn malformed_toml() {
    assert!(matches!(
        PipelineConfig::from_toml_str("container_type = "),
        Err(ConfigError::Toml(_))
    ));
    assert!(matches!(
        PipelineConfig::from_toml_str(
            r#"
container_type = "Sentence"
item_type = "Token"

[[extractors]]
kind = "word_shape"
"#
        ),
        Err(ConfigError::Toml(_))
    ));
}

#[test]
fn load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(TAGGER.as_bytes()).unwrap();

    let config = PipelineConfig::load(file.path()).unwrap();
    assert_eq!(config.item_type, "Token");
    assert_eq!(config.extractors.len(), 2);

    let missing = file.path().with_extension("missing");
    assert!(matches!(
        PipelineConfig::load(&missing),
        Err(ConfigError::Read { .. })
    ));
}
