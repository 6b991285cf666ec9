//! Configuration merging.
//!
//! Merges parsed `.spanq.toml` files into a single `Config` by precedence.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{
    Config, FieldSettings, ParserSettings, default_fields,
    parse::{RawConfig, RawField, RawParserSettings},
};

/// A parsed config file with its source path.
#[derive(Debug, Clone)]
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

/// Merges configuration files into a single `Config`.
///
/// Configs come in precedence order: highest precedence (closest to the working directory)
/// first, the global config last.
///
/// Merge rules:
/// - Parser settings: first defined value wins, per key
/// - Fields: merged by name, first definition wins completely
pub fn merge_configs(configs: &[ParsedConfig]) -> Config {
    if configs.is_empty() {
        return Config::default();
    }

    Config {
        parser: merge_parser_settings(configs),
        fields: merge_fields(configs),
        config_root: configs
            .first()
            .and_then(|c| c.path.parent().map(Path::to_path_buf)),
    }
}

/// Merges `[parser]` sections.
fn merge_parser_settings(configs: &[ParsedConfig]) -> ParserSettings {
    let mut result = ParserSettings::default();

    // Lowest precedence first, so closer files overwrite.
    for parsed in configs.iter().rev() {
        if let Some(ref parser) = parsed.config.parser {
            apply_raw_parser(&mut result, parser);
        }
    }

    result
}

/// Applies raw parser settings to result, overwriting any present values.
fn apply_raw_parser(result: &mut ParserSettings, raw: &RawParserSettings) {
    if let Some(ref v) = raw.default_field {
        result.default_field.clone_from(v);
    }
    let query = &mut result.query;
    if let Some(v) = raw.default_operator {
        query.default_operator = v;
    }
    if let Some(v) = raw.phrase_slop {
        query.phrase_slop = v;
    }
    if let Some(v) = raw.max_near_distance {
        query.max_near_distance = v;
    }
    if let Some(v) = raw.max_not_near_distance {
        query.max_not_near_distance = v;
    }
    if let Some(v) = raw.allow_leading_wildcard {
        query.allow_leading_wildcard = v;
    }
    if let Some(v) = raw.auto_generate_phrase_queries {
        query.auto_generate_phrase_queries = v;
    }
    if let Some(v) = raw.fuzzy_max_edits {
        query.fuzzy_max_edits = v;
    }
    if let Some(v) = raw.fuzzy_prefix_length {
        query.fuzzy_prefix_length = v;
    }
}

/// Merges field definitions by name; the built-in `body` field is overridden by any file.
fn merge_fields(configs: &[ParsedConfig]) -> BTreeMap<String, FieldSettings> {
    let mut fields = BTreeMap::new();

    for parsed in configs {
        let Some(ref raw_fields) = parsed.config.fields else {
            continue;
        };
        for (name, raw) in raw_fields {
            fields
                .entry(name.clone())
                .or_insert_with(|| convert_field(raw));
        }
    }

    for (name, field) in default_fields() {
        fields.entry(name).or_insert(field);
    }

    fields
}

/// Fills the unset keys of a raw field from the defaults.
fn convert_field(raw: &RawField) -> FieldSettings {
    let defaults = FieldSettings::default();
    FieldSettings {
        stemmer: raw.stemmer.clone(),
        stop_words: raw.stop_words.clone().unwrap_or(defaults.stop_words),
        lowercase: raw.lowercase.unwrap_or(defaults.lowercase),
        max_token_length: raw.max_token_length.unwrap_or(defaults.max_token_length),
    }
}

#[cfg(test)]
mod tests {
    use spanq_query::DefaultOperator;

    use super::*;
    use crate::parse::parse_config_str;

    fn parsed(path: &str, toml: &str) -> ParsedConfig {
        ParsedConfig {
            path: PathBuf::from(path),
            config: parse_config_str(toml, Path::new(path)).unwrap(),
        }
    }

    #[test]
    fn empty_is_default() {
        let result = merge_configs(&[]);
        assert_eq!(result.parser, ParserSettings::default());
        assert!(result.config_root.is_none());
        assert_eq!(result.fields.len(), 1);
    }

    #[test]
    fn config_root_is_closest_directory() {
        let result = merge_configs(&[
            parsed("/work/project/.spanq.toml", ""),
            parsed("/home/me/.spanq.toml", ""),
        ]);
        assert_eq!(result.config_root, Some(PathBuf::from("/work/project")));
    }

    #[test]
    fn parser_scalars_merge_per_key() {
        let result = merge_configs(&[
            parsed(
                "/work/.spanq.toml",
                "[parser]\nphrase_slop = 3\ndefault_field = \"title\"\n",
            ),
            parsed(
                "/home/me/.spanq.toml",
                "[parser]\nphrase_slop = 1\ndefault_operator = \"and\"\n",
            ),
        ]);
        assert_eq!(result.parser.default_field, "title");
        assert_eq!(result.parser.query.phrase_slop, 3);
        assert_eq!(result.parser.query.default_operator, DefaultOperator::And);
        assert_eq!(result.parser.query.max_near_distance, 100);
    }

    #[test]
    fn fields_first_definition_wins_completely() {
        let result = merge_configs(&[
            parsed("/work/.spanq.toml", "[fields.body]\nlowercase = false\n"),
            parsed(
                "/home/me/.spanq.toml",
                "[fields.body]\nstemmer = \"english\"\n\n[fields.title]\nstop_words = [\"the\"]\n",
            ),
        ]);
        let body = &result.fields["body"];
        assert!(!body.lowercase);
        assert!(body.stemmer.is_none());
        assert_eq!(result.fields["title"].stop_words, vec!["the"]);
    }

    #[test]
    fn builtin_body_field_survives() {
        let result = merge_configs(&[parsed(
            "/work/.spanq.toml",
            "[fields.title]\nstemmer = \"french\"\n",
        )]);
        assert_eq!(result.fields["body"], FieldSettings::default());
        assert_eq!(result.fields["title"].stemmer.as_deref(), Some("french"));
        assert_eq!(result.fields["title"].max_token_length, 40);
    }
}
