use sea_orm::sea_query::Order;
use serde::{Deserialize, Serialize};

use super::builder::QueryTarget;
use super::fields::{ColumnPath, FieldMap};
use crate::errors::QueryError;

/// One sort key, e.g. `{"selector":"name","desc":true}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub selector: String,
    #[serde(default)]
    pub desc: bool,
}

impl SortSpec {
    #[must_use]
    pub const fn order(&self) -> Order {
        if self.desc { Order::Desc } else { Order::Asc }
    }
}

/// Decode a sort expression. Empty input means no ordering.
///
/// # Errors
///
/// Returns [`QueryError::SortFormat`] on malformed JSON.
pub fn parse_sort(raw: &str) -> Result<Vec<SortSpec>, QueryError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw).map_err(|e| QueryError::SortFormat(e.to_string()))
}

/// Resolve sort keys against the field map, keeping input order (first key is
/// the primary one).
///
/// # Errors
///
/// Returns [`QueryError::UnknownField`] for selectors absent from the map.
pub fn compile_sort(
    specs: &[SortSpec],
    fields: &FieldMap,
    table_alias: Option<&str>,
) -> Result<Vec<(ColumnPath, Order)>, QueryError> {
    specs
        .iter()
        .map(|spec| Ok((fields.column_path(&spec.selector, table_alias)?, spec.order())))
        .collect()
}

/// Parse, resolve and apply a raw sort expression; nothing is applied on error.
///
/// # Errors
///
/// Any [`QueryError`] from [`parse_sort`] or [`compile_sort`].
pub fn apply_sort<Q: QueryTarget>(
    query: &mut Q,
    raw: &str,
    fields: &FieldMap,
    table_alias: Option<&str>,
) -> Result<(), QueryError> {
    let specs = parse_sort(raw)?;
    for (column, order) in compile_sort(&specs, fields, table_alias)? {
        query.add_sort(column.column_ref(), order);
    }
    Ok(())
}
