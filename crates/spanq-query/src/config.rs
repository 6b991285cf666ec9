//! Parser configuration.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Default maximum slop of a near clause.
pub const DEFAULT_MAX_NEAR_DISTANCE: u32 = 100;

/// Default maximum pre/post distance of a not-near clause.
pub const DEFAULT_MAX_NOT_NEAR_DISTANCE: i32 = 100;

/// Occurrence given to clauses joined without an explicit conjunction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultOperator {
    /// Unmarked clauses are SHOULD.
    #[default]
    Or,
    /// Unmarked clauses are MUST.
    And,
}

impl FromStr for DefaultOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "or" => Ok(Self::Or),
            "and" => Ok(Self::And),
            other => Err(format!("unknown default operator '{other}' (expected 'or' or 'and')")),
        }
    }
}

impl fmt::Display for DefaultOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Or => "or",
            Self::And => "and",
        })
    }
}

/// Settings read (never written) during a parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Occurrence of clauses without an explicit conjunction.
    pub default_operator: DefaultOperator,
    /// Slop of phrases and near clauses that declare none.
    pub phrase_slop: u32,
    /// Upper bound on near clause slop.
    pub max_near_distance: u32,
    /// Upper bound on not-near pre/post distances.
    pub max_not_near_distance: i32,
    /// Permit wildcard terms starting with `*` or `?`.
    pub allow_leading_wildcard: bool,
    /// Turn terms the analyzer splits into several tokens into phrases rather than OR groups.
    pub auto_generate_phrase_queries: bool,
    /// Edit distance of a fuzzy term written as `term~`.
    pub fuzzy_max_edits: u8,
    /// Prefix length of a fuzzy term that declares none.
    pub fuzzy_prefix_length: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_operator: DefaultOperator::Or,
            phrase_slop: 0,
            max_near_distance: DEFAULT_MAX_NEAR_DISTANCE,
            max_not_near_distance: DEFAULT_MAX_NOT_NEAR_DISTANCE,
            allow_leading_wildcard: false,
            auto_generate_phrase_queries: true,
            fuzzy_max_edits: 2,
            fuzzy_prefix_length: 0,
        }
    }
}
