//! Boolean occurrence resolution.
//!
//! Turns the conjunction and modifier preceding each clause into MUST/SHOULD/MUST_NOT, promoting
//! or demoting the previous clause the way classic query parsers do: `a AND b` makes `a`
//! required, and under a default `AND` operator `a OR b` makes `a` optional again.

use crate::{
    ast::{BooleanClause, Occur, QueryNode},
    config::DefaultOperator,
    error::ParseError,
};

/// The conjunction introducing a clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Conjunction {
    /// No explicit conjunction.
    #[default]
    None,
    /// `AND`
    And,
    /// `OR`
    Or,
}

/// The modifier introducing a clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Modifier {
    /// No modifier.
    #[default]
    None,
    /// `NOT` or `-`
    Not,
    /// `+`
    Required,
}

/// Adds `query` to `clauses` with the occurrence implied by `conjunction` and `modifier`.
///
/// The previous clause is promoted or demoted even when `query` is empty and dropped.
pub fn add_clause(
    clauses: &mut Vec<BooleanClause>,
    operator: DefaultOperator,
    conjunction: Conjunction,
    modifier: Modifier,
    query: QueryNode,
) -> Result<(), ParseError> {
    if let Some(previous) = clauses.last_mut()
        && previous.occur != Occur::MustNot
    {
        match (conjunction, operator) {
            (Conjunction::And, _) => previous.occur = Occur::Must,
            (Conjunction::Or, DefaultOperator::And) => previous.occur = Occur::Should,
            _ => {}
        }
    }

    if query.is_empty() {
        return Ok(());
    }

    let prohibited = modifier == Modifier::Not;
    let required = match operator {
        DefaultOperator::Or => {
            modifier == Modifier::Required || (conjunction == Conjunction::And && !prohibited)
        }
        DefaultOperator::And => !prohibited && conjunction != Conjunction::Or,
    };

    let occur = match (required, prohibited) {
        (true, false) => Occur::Must,
        (false, false) => Occur::Should,
        (false, true) => Occur::MustNot,
        (true, true) => {
            return Err(ParseError::semantic(
                "clause cannot be both required and prohibited",
            ));
        }
    };

    clauses.push(BooleanClause::new(occur, query));
    Ok(())
}
