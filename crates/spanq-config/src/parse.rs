//! Configuration file parsing.
//!
//! Parses individual `.spanq.toml` files into `RawConfig` values whose fields are all optional,
//! so partial files can be merged by precedence.

use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;
use spanq_query::DefaultOperator;
#[cfg(test)]
use toml::de::Error as TomlError;

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// When true, stop discovery here and ignore parent and global configs.
    pub root: Option<bool>,
    /// Parser settings section.
    pub parser: Option<RawParserSettings>,
    /// Field definitions: name -> analysis settings.
    pub fields: Option<HashMap<String, RawField>>,
}

/// Raw `[parser]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawParserSettings {
    /// Field searched by terms without a `field:` prefix.
    pub default_field: Option<String>,
    /// Occurrence of clauses without an explicit conjunction.
    pub default_operator: Option<DefaultOperator>,
    /// Slop of phrases and near clauses that declare none.
    pub phrase_slop: Option<u32>,
    /// Upper bound on near clause slop.
    pub max_near_distance: Option<u32>,
    /// Upper bound on not-near distances.
    pub max_not_near_distance: Option<i32>,
    /// Permit wildcards starting with `*` or `?`.
    pub allow_leading_wildcard: Option<bool>,
    /// Turn multi-token terms into phrases.
    pub auto_generate_phrase_queries: Option<bool>,
    /// Default fuzzy edit distance.
    pub fuzzy_max_edits: Option<u8>,
    /// Default fuzzy prefix length.
    pub fuzzy_prefix_length: Option<u8>,
}

/// Raw `[fields.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawField {
    /// Stemming language.
    pub stemmer: Option<String>,
    /// Words dropped from whole-term analysis.
    pub stop_words: Option<Vec<String>>,
    /// Whether tokens are lowercased.
    pub lowercase: Option<bool>,
    /// Tokens longer than this many bytes are dropped.
    pub max_token_length: Option<usize>,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses configuration from a TOML string without path context.
#[cfg(test)]
pub fn parse_config(contents: &str) -> Result<RawConfig, TomlError> {
    toml::from_str(contents)
}

/// Checks if a config file has `root = true` set.
///
/// Returns false if the file cannot be read or parsed.
pub fn is_root_config(path: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(config) = toml::from_str::<RawConfig>(&contents) else {
        return false;
    };
    config.root == Some(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config() {
        let config = parse_config("").unwrap();
        assert!(config.root.is_none());
        assert!(config.parser.is_none());
        assert!(config.fields.is_none());
    }

    #[test]
    fn parser_section() {
        let config = parse_config(
            r#"
[parser]
default_field = "title"
default_operator = "and"
phrase_slop = 2
allow_leading_wildcard = true
"#,
        )
        .unwrap();
        let parser = config.parser.unwrap();
        assert_eq!(parser.default_field.as_deref(), Some("title"));
        assert_eq!(parser.default_operator, Some(DefaultOperator::And));
        assert_eq!(parser.phrase_slop, Some(2));
        assert_eq!(parser.allow_leading_wildcard, Some(true));
        assert!(parser.max_near_distance.is_none());
    }

    #[test]
    fn field_sections() {
        let config = parse_config(
            r#"
[fields.body]
stemmer = "english"
stop_words = ["the", "a"]

[fields.id]
lowercase = false
"#,
        )
        .unwrap();
        let fields = config.fields.unwrap();
        let body = &fields["body"];
        assert_eq!(body.stemmer.as_deref(), Some("english"));
        assert_eq!(
            body.stop_words,
            Some(vec!["the".to_string(), "a".to_string()])
        );
        assert!(body.lowercase.is_none());
        assert_eq!(fields["id"].lowercase, Some(false));
    }

    #[test]
    fn invalid_operator_is_rejected() {
        assert!(parse_config("[parser]\ndefault_operator = \"xor\"\n").is_err());
    }

    #[test]
    fn negative_slop_is_rejected() {
        assert!(parse_config("[parser]\nphrase_slop = -1\n").is_err());
    }

    #[test]
    fn parse_error_names_file() {
        let err = parse_config_str("[parser", Path::new("/tmp/x/.spanq.toml")).unwrap_err();
        assert!(err.to_string().contains("/tmp/x/.spanq.toml"));
    }
}
