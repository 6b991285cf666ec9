//! Per-field text analysis pipelines.
//!
//! Each configured field gets two tantivy analyzers:
//! 1. a whole-term pipeline: `SimpleTokenizer`, `LowerCaser` (optional), `RemoveLongFilter`,
//!    `StopWordFilter`, `Stemmer` (optional)
//! 2. a multiterm pipeline: `RawTokenizer`, `LowerCaser` (optional)
//!
//! The multiterm pipeline never splits text, so wildcard, fuzzy, regex and range text stays a
//! single token.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

use spanq_config::{Config, FieldSettings};
use spanq_query::{AnalysisError, Analyzer, single_component};
use tantivy::tokenizer::{
    Language, LowerCaser, RawTokenizer, RemoveLongFilter, SimpleTokenizer, Stemmer,
    StopWordFilter, TextAnalyzer, TokenStream,
};
use tracing::debug;

use crate::{AnalyzerError, language::parse_language};

/// The two pipelines of one field.
#[derive(Clone)]
struct FieldPipelines {
    /// Tokenizing pipeline for plain terms.
    whole_term: TextAnalyzer,
    /// Non-splitting pipeline for multiterm text.
    multiterm: TextAnalyzer,
}

/// An [`Analyzer`] backed by tantivy pipelines built from field settings.
///
/// Pipelines are cloned per call, so a shared `FieldAnalyzers` serves concurrent parses.
#[derive(Clone)]
pub struct FieldAnalyzers {
    /// Pipelines by field name.
    fields: HashMap<String, FieldPipelines>,
}

impl fmt::Debug for FieldAnalyzers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.fields.keys().collect();
        names.sort();
        f.debug_struct("FieldAnalyzers")
            .field("fields", &names)
            .finish()
    }
}

impl FieldAnalyzers {
    /// Builds pipelines for every field in `fields`.
    pub fn new(fields: &BTreeMap<String, FieldSettings>) -> Result<Self, AnalyzerError> {
        let fields = fields
            .iter()
            .map(|(name, settings)| Ok((name.clone(), build_pipelines(name, settings)?)))
            .collect::<Result<HashMap<_, _>, AnalyzerError>>()?;
        Ok(Self { fields })
    }

    /// Builds pipelines for the fields of a loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, AnalyzerError> {
        Self::new(&config.fields)
    }

    /// Whether `field` has pipelines.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Looks up the pipelines of `field`.
    fn pipelines(&self, field: &str) -> Result<&FieldPipelines, AnalysisError> {
        self.fields
            .get(field)
            .ok_or_else(|| AnalysisError::UnknownField(field.to_string()))
    }
}

impl Analyzer for FieldAnalyzers {
    fn whole_term(&self, field: &str, text: &str) -> Result<Vec<String>, AnalysisError> {
        let pipelines = self.pipelines(field)?;
        Ok(run(&pipelines.whole_term, text))
    }

    fn multiterm(&self, field: &str, text: &str) -> Result<String, AnalysisError> {
        let pipelines = self.pipelines(field)?;
        let components = run(&pipelines.multiterm, text)
            .into_iter()
            .filter(|token| !token.is_empty())
            .collect();
        single_component(field, text, components)
    }
}

/// Builds both pipelines for one field.
fn build_pipelines(name: &str, settings: &FieldSettings) -> Result<FieldPipelines, AnalyzerError> {
    let language = settings
        .stemmer
        .as_deref()
        .map(|language| {
            parse_language(language).ok_or_else(|| AnalyzerError::InvalidLanguage {
                field: name.to_string(),
                language: language.to_string(),
            })
        })
        .transpose()?;

    debug!(
        field = name,
        stemmer = ?language,
        lowercase = settings.lowercase,
        stop_words = settings.stop_words.len(),
        "building field analyzers"
    );

    Ok(FieldPipelines {
        whole_term: build_whole_term(settings, language),
        multiterm: build_multiterm(settings),
    })
}

/// Builds the tokenizing pipeline.
fn build_whole_term(settings: &FieldSettings, language: Option<Language>) -> TextAnalyzer {
    let mut builder = TextAnalyzer::builder(SimpleTokenizer::default()).dynamic();
    if settings.lowercase {
        builder = builder.filter_dynamic(LowerCaser);
    }
    // RemoveLongFilter keeps tokens strictly shorter than its limit.
    builder = builder.filter_dynamic(RemoveLongFilter::limit(
        settings.max_token_length.saturating_add(1),
    ));
    if !settings.stop_words.is_empty() {
        let stop_words = settings.stop_words.iter().map(|word| {
            if settings.lowercase {
                word.to_lowercase()
            } else {
                word.clone()
            }
        });
        builder = builder.filter_dynamic(StopWordFilter::remove(stop_words));
    }
    if let Some(language) = language {
        builder = builder.filter_dynamic(Stemmer::new(language));
    }
    builder.build()
}

/// Builds the non-splitting pipeline.
fn build_multiterm(settings: &FieldSettings) -> TextAnalyzer {
    let builder = TextAnalyzer::builder(RawTokenizer::default()).dynamic();
    if settings.lowercase {
        builder.filter_dynamic(LowerCaser).build()
    } else {
        builder.build()
    }
}

/// Runs `text` through a copy of `analyzer` and collects the token texts.
fn run(analyzer: &TextAnalyzer, text: &str) -> Vec<String> {
    let mut analyzer = analyzer.clone();
    let mut stream = analyzer.token_stream(text);
    let mut tokens = Vec::new();
    stream.process(&mut |token| tokens.push(token.text.clone()));
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzers(fields: &[(&str, FieldSettings)]) -> FieldAnalyzers {
        let fields: BTreeMap<_, _> = fields
            .iter()
            .map(|(name, settings)| ((*name).to_string(), settings.clone()))
            .collect();
        FieldAnalyzers::new(&fields).unwrap()
    }

    fn english() -> FieldSettings {
        FieldSettings {
            stemmer: Some("english".into()),
            stop_words: vec!["The".into(), "of".into()],
            ..FieldSettings::default()
        }
    }

    #[test]
    fn whole_term_lowercases_and_stems() {
        let analyzers = analyzers(&[("body", english())]);
        assert_eq!(analyzers.whole_term("body", "Running").unwrap(), vec!["run"]);
        assert_eq!(
            analyzers.whole_term("body", "wi-fi").unwrap(),
            vec!["wi", "fi"]
        );
    }

    #[test]
    fn stop_words_analyze_to_nothing() {
        let analyzers = analyzers(&[("body", english())]);
        assert!(analyzers.whole_term("body", "the").unwrap().is_empty());
        assert!(analyzers.whole_term("body", "OF").unwrap().is_empty());
    }

    #[test]
    fn case_preserved_without_lowercase() {
        let settings = FieldSettings {
            lowercase: false,
            ..FieldSettings::default()
        };
        let analyzers = analyzers(&[("id", settings)]);
        assert_eq!(analyzers.whole_term("id", "ABC").unwrap(), vec!["ABC"]);
        assert_eq!(analyzers.multiterm("id", "AB*").unwrap(), "AB*");
    }

    #[test]
    fn long_tokens_are_dropped() {
        let settings = FieldSettings {
            max_token_length: 4,
            ..FieldSettings::default()
        };
        let analyzers = analyzers(&[("body", settings)]);
        assert_eq!(analyzers.whole_term("body", "abcd").unwrap(), vec!["abcd"]);
        assert!(analyzers.whole_term("body", "abcde").unwrap().is_empty());
    }

    #[test]
    fn multiterm_keeps_one_token() {
        let analyzers = analyzers(&[("body", english())]);
        assert_eq!(analyzers.multiterm("body", "Fo?ba*").unwrap(), "fo?ba*");
        assert_eq!(analyzers.multiterm("body", "Hello World").unwrap(), "hello world");
        assert_eq!(analyzers.multiterm("body", "the").unwrap(), "the");
    }

    #[test]
    fn empty_multiterm_is_an_error() {
        let analyzers = analyzers(&[("body", english())]);
        assert!(matches!(
            analyzers.multiterm("body", ""),
            Err(AnalysisError::EmptyMultiterm { .. })
        ));
    }

    #[test]
    fn unknown_field() {
        let analyzers = analyzers(&[("body", english())]);
        assert_eq!(
            analyzers.whole_term("title", "x"),
            Err(AnalysisError::UnknownField("title".into()))
        );
        assert!(analyzers.multiterm("title", "x").is_err());
        assert!(analyzers.contains("body"));
        assert!(!analyzers.contains("title"));
    }

    #[test]
    fn invalid_language() {
        let settings = FieldSettings {
            stemmer: Some("klingon".into()),
            ..FieldSettings::default()
        };
        let fields = BTreeMap::from([("body".to_string(), settings)]);
        let err = FieldAnalyzers::new(&fields).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported stemmer language for field 'body': klingon"
        );
    }
}
