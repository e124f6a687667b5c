//! Query planning
//!
//! Turns free text into a conjunctive FTS5 match expression. Tokens come
//! from untrusted input, so every token is embedded as a quoted FTS5 string
//! and can never be read as an operator, column filter, prefix marker or
//! `NEAR` group.

use std::fmt;
use std::sync::Arc;

use super::tokenizer::Segmenter;

/// Connective between terms; FTS5 keywords are case-sensitive
const AND: &str = " AND ";

/// A validated FTS5 match expression
///
/// Built only through [`MatchExpression::all_of`]; the empty expression is
/// representable so that callers can tell "no terms" apart from "match
/// everything", which FTS5 has no syntax for anyway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchExpression {
    rendered: String,
    terms: usize,
}

impl MatchExpression {
    /// Expression requiring every token to match
    pub fn all_of<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rendered = String::new();
        let mut terms = 0;
        for token in tokens {
            let Some(quoted) = quote_term(token.as_ref()) else {
                continue;
            };
            if terms > 0 {
                rendered.push_str(AND);
            }
            rendered.push_str(&quoted);
            terms += 1;
        }
        Self { rendered, terms }
    }

    pub fn is_empty(&self) -> bool {
        self.terms == 0
    }

    /// Number of terms joined into the expression
    pub fn term_count(&self) -> usize {
        self.terms
    }

    /// The expression in FTS5 query syntax
    pub fn as_str(&self) -> &str {
        &self.rendered
    }
}

impl fmt::Display for MatchExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

/// Quote a token as an FTS5 string: control characters removed, embedded
/// double quotes doubled
fn quote_term(token: &str) -> Option<String> {
    let cleaned: String = token.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    let mut quoted = String::with_capacity(cleaned.len() + 2);
    quoted.push('"');
    for ch in cleaned.chars() {
        if ch == '"' {
            quoted.push('"');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    Some(quoted)
}

/// Outcome of planning one query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// Filtered tokens, in query order
    pub tokens: Vec<String>,

    /// Conjunction of all tokens
    pub expression: MatchExpression,
}

impl QueryPlan {
    /// Number of filtered tokens
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// A plan without tokens matches nothing
    pub fn is_empty(&self) -> bool {
        self.expression.is_empty()
    }
}

/// Converts raw query text into the index vocabulary
#[derive(Debug, Clone)]
pub struct QueryPlanner {
    segmenter: Arc<Segmenter>,
}

impl QueryPlanner {
    pub fn new(segmenter: Arc<Segmenter>) -> Self {
        Self { segmenter }
    }

    pub fn plan(&self, raw_query: &str) -> QueryPlan {
        let tokens = self.segmenter.segment(raw_query);
        let expression = MatchExpression::all_of(&tokens);
        tracing::debug!(
            query = raw_query,
            tokens = tokens.len(),
            expression = %expression,
            "Planned search query"
        );
        QueryPlan { tokens, expression }
    }
}
