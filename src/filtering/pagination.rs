use super::builder::QueryTarget;

/// Limit/offset for a `take`/`skip` pair, or `None` when every row is wanted.
///
/// `take <= 0` deliberately means "unpaginated": no default page size is
/// imposed. `skip` is a zero-based row offset (not a page number); negative
/// values clamp to 0.
#[must_use]
pub fn page_window(take: i64, skip: i64) -> Option<(u64, u64)> {
    let limit = u64::try_from(take).ok().filter(|&take| take > 0)?;
    let offset = u64::try_from(skip).unwrap_or(0);
    Some((limit, offset))
}

/// Apply `take`/`skip` to the query. Returns whether a limit was applied.
pub fn apply_page<Q: QueryTarget>(query: &mut Q, take: i64, skip: i64) -> bool {
    match page_window(take, skip) {
        Some((limit, offset)) => {
            query.add_limit_offset(limit, offset);
            true
        }
        None => false,
    }
}
