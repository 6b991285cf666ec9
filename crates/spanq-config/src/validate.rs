//! Configuration validation.
//!
//! Reports non-fatal problems in a loaded configuration.

use std::fmt;

use crate::{Config, STEMMER_LANGUAGES};

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// The default field has no `[fields.<name>]` definition.
    DefaultFieldUndefined {
        /// Name of the default field.
        field: String,
    },
    /// A field names a stemmer language that is not supported.
    UnknownStemmer {
        /// Name of the field.
        field: String,
        /// The unsupported language.
        stemmer: String,
    },
    /// The default phrase slop is larger than the near distance cap.
    PhraseSlopExceedsMaxNear {
        /// Configured phrase slop.
        phrase_slop: u32,
        /// Configured cap.
        max_near_distance: u32,
    },
    /// A field drops every token.
    ZeroMaxTokenLength {
        /// Name of the field.
        field: String,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DefaultFieldUndefined { field } => {
                write!(f, "default field '{field}' has no [fields.{field}] definition")
            }
            Self::UnknownStemmer { field, stemmer } => {
                write!(f, "field '{field}' uses unknown stemmer '{stemmer}'")
            }
            Self::PhraseSlopExceedsMaxNear {
                phrase_slop,
                max_near_distance,
            } => write!(
                f,
                "phrase_slop {phrase_slop} exceeds max_near_distance {max_near_distance} and will be clamped"
            ),
            Self::ZeroMaxTokenLength { field } => {
                write!(f, "field '{field}' has max_token_length 0 and matches nothing")
            }
        }
    }
}

/// Validates the configuration and returns any warnings.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    let default_field = &config.parser.default_field;
    if !config.fields.contains_key(default_field) {
        warnings.push(ConfigWarning::DefaultFieldUndefined {
            field: default_field.clone(),
        });
    }

    let query = &config.parser.query;
    if query.phrase_slop > query.max_near_distance {
        warnings.push(ConfigWarning::PhraseSlopExceedsMaxNear {
            phrase_slop: query.phrase_slop,
            max_near_distance: query.max_near_distance,
        });
    }

    for (name, field) in &config.fields {
        if let Some(ref stemmer) = field.stemmer
            && !is_known_language(stemmer)
        {
            warnings.push(ConfigWarning::UnknownStemmer {
                field: name.clone(),
                stemmer: stemmer.clone(),
            });
        }
        if field.max_token_length == 0 {
            warnings.push(ConfigWarning::ZeroMaxTokenLength { field: name.clone() });
        }
    }

    warnings
}

/// Case-insensitive membership in [`STEMMER_LANGUAGES`].
fn is_known_language(name: &str) -> bool {
    STEMMER_LANGUAGES
        .iter()
        .any(|language| language.eq_ignore_ascii_case(name))
}
