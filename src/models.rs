use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for filtering, sorting and paging a resource list.
///
/// # Filtering
/// `filter` is a JSON array of `[selector, operator, value]` entries, AND-ed
/// together. A fourth element `"or"` OR-s the entry onto the one before it:
/// ```json
/// [["name","contains","menu"],["code","=","sys","or"],["sort",">","5"]]
/// ```
/// Operators: `=`, `in`, `not in`, `>`, `<`, `>=`, `<=`, `contains`. The value of
/// `in` / `not in` is a comma-separated list.
///
/// # Sorting
/// `sort` is a JSON array of keys, the first one being the primary key:
/// ```json
/// [{"selector":"sort","desc":true},{"selector":"name"}]
/// ```
///
/// # Paging
/// `take` rows are returned after skipping `skip` rows. `take = 0` returns every
/// row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase", default)]
#[into_params(parameter_in = Query)]
pub struct PageRequest {
    /// Also return the number of rows matching the filter, ignoring paging.
    pub require_total_count: bool,
    /// Zero-based row offset.
    #[param(example = 0)]
    pub skip: i64,
    /// Page size; `0` disables paging.
    #[param(example = 20)]
    pub take: i64,
    /// JSON-encoded filter, see the type documentation.
    #[param(example = r#"[["name","contains","menu"],["code","=","sys","or"]]"#)]
    pub filter: String,
    /// JSON-encoded sort keys.
    #[param(example = r#"[{"selector":"sort","desc":true}]"#)]
    pub sort: String,
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageList<T> {
    /// Rows matching the filter; `0` unless the request asked for it.
    pub total_count: u64,
    pub data: Vec<T>,
}

impl<T> PageList<T> {
    #[must_use]
    pub fn new(total_count: u64, data: Vec<T>) -> Self {
        Self { total_count, data }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageList<U> {
        PageList {
            total_count: self.total_count,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}

/// Envelope around every response body.
///
/// `code` is `0` on success and `1` on a business or request error; `msg`
/// carries the error text. Failures additionally set a non-2xx HTTP status via
/// [`crate::errors::ApiError`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub const SUCCESS: i32 = 0;
    pub const ERROR: i32 = 1;

    pub fn success(data: T) -> Self {
        Self {
            code: Self::SUCCESS,
            msg: String::new(),
            data: Some(data),
        }
    }

    /// A rejected operation that is still a well-formed exchange (HTTP 200).
    pub fn business_error(msg: impl Into<String>) -> Self {
        Self {
            code: Self::ERROR,
            msg: msg.into(),
            data: None,
        }
    }

    /// Body of an error response; the status code is set by the caller.
    pub fn failure(msg: impl Into<String>) -> Self {
        Self::business_error(msg)
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code == Self::SUCCESS
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
