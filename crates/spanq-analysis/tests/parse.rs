//! Parsing queries through configured field analyzers.

#![allow(clippy::tests_outside_test_module)]

use std::path::Path;

use spanq_analysis::FieldAnalyzers;
use spanq_config::{Config, ParsedConfig, merge_configs, parse_config_str};
use spanq_query::{Occur, ParseErrorKind, QueryNode, QueryParser};

fn config(toml: &str) -> Config {
    let path = Path::new("/work/.spanq.toml");
    merge_configs(&[ParsedConfig {
        path: path.to_path_buf(),
        config: parse_config_str(toml, path).unwrap(),
    }])
}

fn parser(toml: &str) -> QueryParser<FieldAnalyzers> {
    let config = config(toml);
    let analyzers = FieldAnalyzers::from_config(&config).unwrap();
    QueryParser::new(config.parser_config().clone(), analyzers)
}

fn term(field: &str, text: &str) -> QueryNode {
    QueryNode::Term {
        field: field.into(),
        text: text.into(),
    }
}

const FIELDS: &str = r#"
[fields.body]
stemmer = "english"
stop_words = ["the", "a"]

[fields.title]
"#;

#[test]
fn terms_are_stemmed_per_field() {
    let parser = parser(FIELDS);
    let node = parser.parse("Running title:Running", "body").unwrap();
    let QueryNode::BooleanGroup { clauses, .. } = node else {
        panic!("expected group");
    };
    assert_eq!(clauses[0].query, term("body", "run"));
    assert_eq!(clauses[1].query, term("title", "running"));
    assert!(clauses.iter().all(|c| c.occur == Occur::Should));
}

#[test]
fn stop_words_widen_phrase_slop() {
    let parser = parser(FIELDS);
    assert_eq!(
        parser.parse("\"fever the bieber\"~1", "body").unwrap(),
        QueryNode::SpanNear {
            children: vec![term("body", "fever"), term("body", "bieber")],
            slop: 2,
            in_order: false,
        }
    );
}

#[test]
fn split_terms_become_phrases() {
    let parser = parser(FIELDS);
    assert_eq!(
        parser.parse("wi-fi", "body").unwrap(),
        QueryNode::SpanNear {
            children: vec![term("body", "wi"), term("body", "fi")],
            slop: 0,
            in_order: true,
        }
    );
}

#[test]
fn multiterms_are_lowercased_not_stemmed() {
    let parser = parser(FIELDS);
    assert_eq!(
        parser.parse("Runn*", "body").unwrap(),
        QueryNode::Prefix {
            field: "body".into(),
            prefix: "runn".into(),
        }
    );
}

#[test]
fn unknown_field_is_semantic() {
    let parser = parser(FIELDS);
    let err = parser.parse("author:smith", "body").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Semantic);
}

#[test]
fn configured_operator_applies() {
    let parser = parser("[parser]\ndefault_operator = \"and\"\n");
    let QueryNode::BooleanGroup { clauses, .. } = parser.parse("cat dog", "body").unwrap() else {
        panic!("expected group");
    };
    assert!(clauses.iter().all(|c| c.occur == Occur::Must));
}
