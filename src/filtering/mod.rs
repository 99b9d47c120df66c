//! # Filtering, Sorting & Paging
//!
//! Translates the filter / sort mini-language sent by admin front-ends into
//! parameterized Sea-ORM conditions, checked against a record's declared fields.
//!
//! ## Filter format
//!
//! A JSON array of `[selector, operator, value]` entries. Entries are AND-ed; an
//! entry with a fourth slot of `"or"` is OR-ed onto the group before it:
//!
//! ```json
//! [["name","contains","menu"],["code","=","sys","or"],["sort",">","5"]]
//! ```
//!
//! becomes `(name LIKE '%menu%' OR code = 'sys') AND sort > '5'`, with every value
//! bound as a parameter.
//!
//! Operators (case-insensitive): `=`, `in`, `not in`, `>`, `<`, `>=`, `<=`,
//! `contains`. `in` / `not in` take a comma-separated list.
//!
//! ## Sort format
//!
//! ```json
//! [{"selector":"sort","desc":true},{"selector":"name","desc":false}]
//! ```
//!
//! ## Paging
//!
//! `take` / `skip` map to LIMIT / OFFSET; `take = 0` returns every row.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let fields = FieldMap::resolve(&Menu::record_shape())?;
//! let mut query = menu::Entity::find();
//! apply_page_request(&mut query, &request, &fields, Some("m"))?;
//! let rows = query.all(&db).await?;
//! ```

pub mod builder;
pub mod conditions;
pub mod fields;
pub mod pagination;
pub mod parser;
pub mod sort;

pub use builder::QueryTarget;
pub use conditions::{Predicate, apply_filters, compile_filters, split_values};
pub use fields::{ColumnPath, FieldDescriptor, FieldMap, FieldTag, MAX_EMBED_DEPTH, RecordShape};
pub use pagination::{apply_page, page_window};
pub use parser::{FilterClause, Operator, parse_filter};
pub use sort::{SortSpec, apply_sort, compile_sort, parse_sort};

use sea_orm::sea_query::Order;

use crate::errors::QueryError;
use crate::models::PageRequest;

/// A page request checked and lowered against a field map, not yet applied.
#[derive(Debug, Clone)]
pub struct CompiledRequest {
    pub predicates: Vec<Predicate>,
    pub order: Vec<(ColumnPath, Order)>,
    pub window: Option<(u64, u64)>,
}

impl CompiledRequest {
    /// # Errors
    ///
    /// Any [`QueryError`] from the filter or sort text.
    pub fn compile(
        request: &PageRequest,
        fields: &FieldMap,
        table_alias: Option<&str>,
    ) -> Result<Self, QueryError> {
        let clauses = parse_filter(&request.filter)?;
        let predicates = compile_filters(&clauses, fields, table_alias)?;
        let specs = parse_sort(&request.sort)?;
        let order = compile_sort(&specs, fields, table_alias)?;
        Ok(Self {
            predicates,
            order,
            window: page_window(request.take, request.skip),
        })
    }

    /// WHERE conditions only, so a total count can be taken before paging.
    pub fn apply_filters<Q: QueryTarget>(&self, query: &mut Q) {
        for predicate in &self.predicates {
            predicate.clone().apply(query);
        }
    }

    /// ORDER BY and LIMIT / OFFSET.
    pub fn apply_order_and_page<Q: QueryTarget>(&self, query: &mut Q) {
        for (column, order) in &self.order {
            query.add_sort(column.column_ref(), order.clone());
        }
        if let Some((limit, offset)) = self.window {
            query.add_limit_offset(limit, offset);
        }
    }

    pub fn apply<Q: QueryTarget>(&self, query: &mut Q) {
        self.apply_filters(query);
        self.apply_order_and_page(query);
    }
}

/// Compile a whole page request (filter, sort, paging) and apply it. Either
/// everything is applied or, on error, nothing is.
///
/// # Errors
///
/// Any [`QueryError`] from the filter or sort text.
pub fn apply_page_request<Q: QueryTarget>(
    query: &mut Q,
    request: &PageRequest,
    fields: &FieldMap,
    table_alias: Option<&str>,
) -> Result<(), QueryError> {
    CompiledRequest::compile(request, fields, table_alias)?.apply(query);
    Ok(())
}
