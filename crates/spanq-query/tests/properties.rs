#![allow(clippy::tests_outside_test_module)]

use std::{sync::Arc, thread};

use spanq_query::{
    AnalysisError, Analyzer, BooleanClause, Occur, ParseErrorKind, ParserConfig,
    PassThroughAnalyzer, QueryNode, QueryParser, parse,
};

fn term(text: &str) -> QueryNode {
    QueryNode::Term {
        field: "body".into(),
        text: text.into(),
    }
}

/// Drops a few stop words and splits CJK runs into single characters.
struct StopWordAnalyzer;

impl Analyzer for StopWordAnalyzer {
    fn whole_term(&self, _field: &str, text: &str) -> Result<Vec<String>, AnalysisError> {
        let lower = text.to_lowercase();
        if matches!(lower.as_str(), "the" | "a" | "of") {
            return Ok(vec![]);
        }
        if lower.chars().all(|c| ('\u{4e00}'..='\u{9fff}').contains(&c)) {
            return Ok(lower.chars().map(String::from).collect());
        }
        Ok(vec![lower])
    }

    fn multiterm(&self, _field: &str, text: &str) -> Result<String, AnalysisError> {
        Ok(text.to_lowercase())
    }
}

fn occurs(node: &QueryNode) -> Vec<Occur> {
    match node {
        QueryNode::BooleanGroup { clauses, .. } => clauses.iter().map(|c| c.occur).collect(),
        other => panic!("expected boolean group, got {other:?}"),
    }
}

#[test]
fn empty_query_is_empty() {
    assert_eq!(parse("", "body").unwrap(), QueryNode::Empty);
}

#[test]
fn occurrence_resolution() {
    let node = parse("cat dog AND elephant aardvark", "body").unwrap();
    assert_eq!(
        occurs(&node),
        vec![Occur::Should, Occur::Must, Occur::Must, Occur::Should]
    );
}

#[test]
fn only_prohibited_clauses_match_everything_else() {
    let node = parse("-fever", "body").unwrap();
    assert_eq!(
        node,
        QueryNode::BooleanGroup {
            clauses: vec![
                BooleanClause::new(Occur::MustNot, term("fever")),
                BooleanClause::new(Occur::Must, QueryNode::AllDocs),
            ],
            minimum_should_match: None,
        }
    );
}

#[test]
fn ranges() {
    assert_eq!(
        parse("[abc TO def]", "body").unwrap(),
        QueryNode::Range {
            field: "body".into(),
            start: Some("abc".into()),
            end: Some("def".into()),
            start_inclusive: true,
            end_inclusive: true,
        }
    );
    assert_eq!(
        parse("{abc TO def]", "body").unwrap(),
        QueryNode::Range {
            field: "body".into(),
            start: Some("abc".into()),
            end: Some("def".into()),
            start_inclusive: false,
            end_inclusive: true,
        }
    );
}

#[test]
fn unterminated_quote_is_lexical() {
    let err = parse("the quick brown\"", "body").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Lexical);
}

#[test]
fn doubled_operator_is_structural() {
    let err = parse("cat OR OR dog", "body").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Structural);
}

#[test]
fn interior_stop_word_adds_to_slop() {
    let parser = QueryParser::new(ParserConfig::default(), StopWordAnalyzer);
    assert_eq!(
        parser.parse("\"cat the dog\"~2", "body").unwrap(),
        QueryNode::SpanNear {
            children: vec![term("cat"), term("dog")],
            slop: 3,
            in_order: false,
        }
    );
}

#[test]
fn negative_numbers_are_rejected() {
    assert!(parse("term^-1", "body").is_err());
    assert!(parse("term~-1", "body").is_err());
}

#[test]
fn single_term_expansion_in_phrase() {
    let parser = QueryParser::new(ParserConfig::default(), StopWordAnalyzer);
    assert_eq!(
        parser.parse("\"大学\"~3", "body").unwrap(),
        QueryNode::SpanNear {
            children: vec![term("大"), term("学")],
            slop: 3,
            in_order: false,
        }
    );
}

#[test]
fn parsing_is_idempotent() {
    let parser = QueryParser::new(ParserConfig::default(), StopWordAnalyzer);
    let query = "title:(rust OR go) \"the fever\"~2 -bieber^3";
    let first = parser.parse(query, "body").unwrap();
    let mut second = parser.parse(query, "body").unwrap();
    assert_eq!(first, second);

    if let QueryNode::BooleanGroup { clauses, .. } = &mut second {
        clauses.clear();
    }
    assert_ne!(first, second);
}

#[test]
fn parser_can_be_shared_across_threads() {
    let parser = Arc::new(QueryParser::new(ParserConfig::default(), PassThroughAnalyzer));
    let expected = parser.parse("[a b]~2 c", "body").unwrap();

    thread::scope(|scope| {
        for _ in 0..4 {
            let parser = Arc::clone(&parser);
            let expected = &expected;
            scope.spawn(move || {
                assert_eq!(&parser.parse("[a b]~2 c", "body").unwrap(), expected);
            });
        }
    });
}

/// Queries whose printed form must parse back to the same tree.
const ROUND_TRIP: &[&str] = &[
    "",
    "rust",
    "cat dog AND elephant aardvark",
    "-fever",
    "a OR b AND NOT c",
    "title:\"a b\"~2^3",
    "[[a b]~3 c]~>4",
    "\"fever bieber\"!~3,5",
    "\"fever bieber\"!~",
    "fev* f?ver fever~1 fever~>2,1 /fe.*r/",
    "{a TO b] [* TO 'it''s'}",
    "(a b c)~2 +(d -e)",
    "rust^2@1..3 'x y' bieber@..4",
    "[a (b c)]~2",
    "\"(a b)\"",
    r"a \AND b \TO c\:d",
    "(price:[1 TO 5])^2.5",
    "((a b)^2)@3..",
    "*:* -title:x",
    "[\"a b\" c]!~1,2^0.5",
];

#[test]
fn printed_queries_parse_back() {
    for query in ROUND_TRIP {
        let node = parse(query, "body").unwrap();
        let printed = node.to_query_string("body");
        let reparsed = parse(&printed, "body")
            .unwrap_or_else(|err| panic!("{query:?} printed as {printed:?}: {err}"));
        assert_eq!(node, reparsed, "{query:?} printed as {printed:?}");
    }
}

#[test]
fn printed_queries_parse_back_with_analysis() {
    let parser = QueryParser::new(ParserConfig::default(), StopWordAnalyzer);
    for query in [
        "\"大学\"~3 x",
        "\"cat the dog\"",
        "The Cat AND of",
        "wild* [Fever TO *]",
    ] {
        let node = parser.parse(query, "body").unwrap();
        let printed = node.to_query_string("body");
        let reparsed = parser.parse(&printed, "body").unwrap();
        assert_eq!(node, reparsed, "{query:?} printed as {printed:?}");
    }
}

#[test]
fn printed_fields_respect_default() {
    let node = parse("title:a body:b", "body").unwrap();
    assert_eq!(node.to_query_string("body"), "title:a b");
    assert_eq!(node.to_query_string("title"), "a body:b");
}

#[test]
fn json_output_is_tagged() {
    let node = parse("\"a b\"~1", "body").unwrap();
    let json = serde_json::to_value(&node).unwrap();
    assert_eq!(json["type"], "span_near");
    assert_eq!(json["slop"], 1);
    assert_eq!(json["children"][0]["type"], "term");
}

#[test]
fn error_display_points_at_problem() {
    let err = parse("a \"b c", "body").unwrap_err();
    let display = err.to_string();
    assert!(display.starts_with("query syntax error: unclosed '\"'"));
    assert!(display.contains("  a \"b c\n    ^"));
}

#[test]
fn analyzer_errors_are_semantic() {
    struct Strict;

    impl Analyzer for Strict {
        fn whole_term(&self, field: &str, text: &str) -> Result<Vec<String>, AnalysisError> {
            if field == "body" {
                Ok(vec![text.to_string()])
            } else {
                Err(AnalysisError::UnknownField(field.to_string()))
            }
        }
    }

    let parser = QueryParser::new(ParserConfig::default(), Strict);
    let err = parser.parse("nope:x", "body").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Semantic);
    assert!(err.message.contains("unknown field: nope"));
}

#[test]
fn clamped_unordered_near_reads_back_ordered() {
    let config = ParserConfig {
        max_near_distance: 0,
        ..ParserConfig::default()
    };
    let parser = QueryParser::new(config, PassThroughAnalyzer);
    let node = parser.parse("\"a b\"~3", "body").unwrap();
    assert_eq!(
        node,
        QueryNode::SpanNear {
            children: vec![term("a"), term("b")],
            slop: 0,
            in_order: false,
        }
    );

    let printed = node.to_query_string("body");
    assert_eq!(printed, "[a b]~0");
    assert!(matches!(
        parser.parse(&printed, "body").unwrap(),
        QueryNode::SpanNear { in_order: true, .. }
    ));
}
