use std::fmt;
use std::str::FromStr;

use crate::errors::QueryError;

/// Marker in the fourth slot of a filter entry that chains it onto the previous group.
pub const OR_MARKER: &str = "or";

/// Whitelisted filter operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    In,
    NotIn,
    Gt,
    Lt,
    Gte,
    Lte,
    Contains,
}

impl Operator {
    pub const ALL: [Self; 8] = [
        Self::Eq,
        Self::In,
        Self::NotIn,
        Self::Gt,
        Self::Lt,
        Self::Gte,
        Self::Lte,
        Self::Contains,
    ];

    /// Token accepted on the wire.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
            Self::Contains => "contains",
        }
    }

    #[must_use]
    pub const fn is_membership(self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let lowered = token.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|op| op.token() == lowered)
            .ok_or_else(|| QueryError::UnsupportedOperator(token.to_string()))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A single filter condition plus the conditions OR-ed onto it.
///
/// The operator is kept as sent; it is validated when the clause is compiled.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterClause {
    pub selector: String,
    pub operator: String,
    pub value: String,
    pub or_siblings: Vec<FilterClause>,
}

impl FilterClause {
    pub fn new(
        selector: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            selector: selector.into(),
            operator: operator.into(),
            value: value.into(),
            or_siblings: Vec::new(),
        }
    }

    #[must_use]
    pub fn or(mut self, sibling: FilterClause) -> Self {
        self.or_siblings.push(sibling);
        self
    }

    fn from_entry(position: usize, mut entry: Vec<String>) -> Result<Self, QueryError> {
        if entry.len() < 3 {
            return Err(QueryError::FilterFormat(format!(
                "entry {position} must be [selector, operator, value], got {} item(s)",
                entry.len()
            )));
        }
        entry.truncate(3);
        let value = entry.pop().unwrap_or_default();
        let operator = entry.pop().unwrap_or_default();
        let selector = entry.pop().unwrap_or_default();
        Ok(Self::new(selector, operator, value))
    }
}

fn is_or_marked(entry: &[String]) -> bool {
    entry.get(3).is_some_and(|marker| marker == OR_MARKER)
}

/// Decode a filter expression such as
/// `[["name","contains","menu"],["code","=","sys","or"],["sort",">","5"]]`.
///
/// Entries are grouped left to right: each group starts at an entry and absorbs
/// every following entry whose fourth slot is `"or"`. An `"or"` marker on the
/// first entry of a group has nothing to chain onto and is ignored. Only one
/// level of OR is expressible.
///
/// # Errors
///
/// Returns [`QueryError::FilterFormat`] if `raw` is not an array of string
/// arrays with at least three items each.
pub fn parse_filter(raw: &str) -> Result<Vec<FilterClause>, QueryError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let entries: Vec<Vec<String>> =
        serde_json::from_str(raw).map_err(|e| QueryError::FilterFormat(e.to_string()))?;

    let mut clauses = Vec::new();
    let mut entries = entries.into_iter().enumerate().peekable();
    while let Some((position, entry)) = entries.next() {
        let mut clause = FilterClause::from_entry(position, entry)?;
        while let Some((position, sibling)) = entries.next_if(|(_, entry)| is_or_marked(entry)) {
            clause.or_siblings.push(FilterClause::from_entry(position, sibling)?);
        }
        clauses.push(clause);
    }
    Ok(clauses)
}
