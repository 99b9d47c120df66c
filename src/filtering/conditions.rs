use sea_orm::sea_query::{Condition, Expr, SimpleExpr};

use super::builder::QueryTarget;
use super::fields::{ColumnPath, FieldMap};
use super::parser::{FilterClause, Operator, parse_filter};
use crate::errors::QueryError;

/// A compiled filter group, ready to be applied to a [`QueryTarget`].
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Single comparison.
    Where(SimpleExpr),
    /// A clause OR-ed with its siblings, ANDed onto the query as one unit.
    AnyOf(Condition),
    /// Plain `IN` / `NOT IN` on one column.
    Membership {
        column: ColumnPath,
        values: Vec<String>,
        negated: bool,
    },
}

impl Predicate {
    pub fn apply<Q: QueryTarget>(self, query: &mut Q) {
        match self {
            Self::Where(expr) => query.add_condition(expr),
            Self::AnyOf(group) => query.add_any(group),
            Self::Membership {
                column,
                values,
                negated,
            } => query.add_membership(column.column_ref(), values, negated),
        }
    }
}

/// Split an `in` / `not in` value on commas. No trimming, no escaping: every
/// item is bound as a parameter.
#[must_use]
pub fn split_values(value: &str) -> Vec<String> {
    value.split(',').map(str::to_string).collect()
}

fn like_pattern(value: &str) -> String {
    format!("%{value}%")
}

fn comparison(column: &ColumnPath, operator: Operator, value: &str) -> SimpleExpr {
    let col = Expr::col(column.column_ref());
    match operator {
        Operator::Eq => col.eq(value),
        Operator::Gt => col.gt(value),
        Operator::Lt => col.lt(value),
        Operator::Gte => col.gte(value),
        Operator::Lte => col.lte(value),
        Operator::Contains => col.like(like_pattern(value)),
        Operator::In => col.is_in(split_values(value)),
        Operator::NotIn => col.is_not_in(split_values(value)),
    }
}

fn resolve(
    clause: &FilterClause,
    fields: &FieldMap,
    table_alias: Option<&str>,
) -> Result<(Operator, ColumnPath), QueryError> {
    let operator = clause.operator.parse::<Operator>()?;
    let column = fields.column_path(&clause.selector, table_alias)?;
    Ok((operator, column))
}

fn compile_clause(
    clause: &FilterClause,
    fields: &FieldMap,
    table_alias: Option<&str>,
) -> Result<Predicate, QueryError> {
    let (operator, column) = resolve(clause, fields, table_alias)?;

    if clause.or_siblings.is_empty() {
        return Ok(if operator.is_membership() {
            Predicate::Membership {
                values: split_values(&clause.value),
                negated: operator == Operator::NotIn,
                column,
            }
        } else {
            Predicate::Where(comparison(&column, operator, &clause.value))
        });
    }

    let mut group = Condition::any().add(comparison(&column, operator, &clause.value));
    for sibling in &clause.or_siblings {
        let (operator, column) = resolve(sibling, fields, table_alias)?;
        group = group.add(comparison(&column, operator, &sibling.value));
    }
    Ok(Predicate::AnyOf(group))
}

/// Compile parsed clauses into predicates without touching any query.
///
/// Every operator and selector is validated before anything is returned, so a
/// single bad clause fails the whole filter.
///
/// # Errors
///
/// [`QueryError::UnsupportedOperator`] or [`QueryError::UnknownField`].
pub fn compile_filters(
    clauses: &[FilterClause],
    fields: &FieldMap,
    table_alias: Option<&str>,
) -> Result<Vec<Predicate>, QueryError> {
    let predicates = clauses
        .iter()
        .map(|clause| compile_clause(clause, fields, table_alias))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(
        clauses = clauses.len(),
        or_siblings = clauses.iter().map(|c| c.or_siblings.len()).sum::<usize>(),
        "Compiled filter"
    );
    Ok(predicates)
}

/// Parse, compile and apply a raw filter expression. The query is left
/// untouched when anything fails.
///
/// # Errors
///
/// Any [`QueryError`] from parsing or compilation.
pub fn apply_filters<Q: QueryTarget>(
    query: &mut Q,
    raw: &str,
    fields: &FieldMap,
    table_alias: Option<&str>,
) -> Result<(), QueryError> {
    let clauses = parse_filter(raw)?;
    for predicate in compile_filters(&clauses, fields, table_alias)? {
        predicate.apply(query);
    }
    Ok(())
}
