//! Configuration system for spanq.
//!
//! spanq reads TOML files named `.spanq.toml`. Configuration is resolved by walking up the
//! directory tree from the working directory, collecting every `.spanq.toml` found, then loading
//! `~/.spanq.toml` as the global config with lowest precedence.

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
#[cfg(test)]
mod test_support;
mod validate;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawConfig, RawField, RawParserSettings, is_root_config, parse_config_file, parse_config_str,
};
use serde::Serialize;
use spanq_query::ParserConfig;
pub use validate::ConfigWarning;
use validate::validate_config;

/// Field searched when a query term carries no `field:` prefix and nothing overrides it.
pub const DEFAULT_FIELD: &str = "body";

/// Stemmer languages accepted in `[fields.<name>]` sections.
pub const STEMMER_LANGUAGES: &[&str] = &[
    "arabic",
    "danish",
    "dutch",
    "english",
    "finnish",
    "french",
    "german",
    "greek",
    "hungarian",
    "italian",
    "norwegian",
    "portuguese",
    "romanian",
    "russian",
    "spanish",
    "swedish",
    "tamil",
    "turkish",
];

/// Top-level merged configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Parser settings.
    pub parser: ParserSettings,
    /// Field analysis settings by field name.
    pub fields: BTreeMap<String, FieldSettings>,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parser: ParserSettings::default(),
            fields: default_fields(),
            config_root: None,
        }
    }
}

impl Config {
    /// Loads configuration by discovering and merging all `.spanq.toml` files that apply to
    /// `cwd`.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from a specific list of config file paths, highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        let parsed = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(merge_configs(&parsed))
    }

    /// The options handed to the query parser.
    pub fn parser_config(&self) -> &ParserConfig {
        &self.parser.query
    }

    /// Analysis settings for `field`, if it is defined.
    pub fn field(&self, name: &str) -> Option<&FieldSettings> {
        self.fields.get(name)
    }

    /// Validates the configuration and returns any warnings.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Serializes the effective configuration in `.spanq.toml` format.
    pub fn settings_to_toml(&self) -> Result<String, ConfigError> {
        let effective = EffectiveConfig {
            parser: &self.parser,
            fields: &self.fields,
        };
        Ok(toml::to_string_pretty(&effective)?)
    }
}

/// The `[parser]` section after merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParserSettings {
    /// Field searched by terms without a `field:` prefix.
    pub default_field: String,
    /// Options read by the query parser.
    #[serde(flatten)]
    pub query: ParserConfig,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            default_field: DEFAULT_FIELD.to_string(),
            query: ParserConfig::default(),
        }
    }
}

/// Analysis settings of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSettings {
    /// Stemming language; no stemming when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stemmer: Option<String>,
    /// Words dropped from whole-term analysis.
    pub stop_words: Vec<String>,
    /// Whether tokens are lowercased.
    pub lowercase: bool,
    /// Tokens longer than this many bytes are dropped.
    pub max_token_length: usize,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            stemmer: None,
            stop_words: Vec::new(),
            lowercase: true,
            max_token_length: 40,
        }
    }
}

/// Field definitions present before any file is applied.
fn default_fields() -> BTreeMap<String, FieldSettings> {
    BTreeMap::from([(DEFAULT_FIELD.to_string(), FieldSettings::default())])
}

/// Borrowed view of the settings rendered by [`Config::settings_to_toml`].
#[derive(Serialize)]
struct EffectiveConfig<'a> {
    /// Parser settings.
    parser: &'a ParserSettings,
    /// Field definitions, sorted by name.
    fields: &'a BTreeMap<String, FieldSettings>,
}
