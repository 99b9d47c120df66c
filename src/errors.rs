//! # Error Handling
//!
//! Two layers of errors live here:
//!
//! - [`QueryError`]: failures of the filter / sort translator. Every variant aborts
//!   the whole compilation; there is no partial-result mode.
//! - [`ApiError`]: the HTTP-facing error. It maps to a status code, logs internal
//!   details through `tracing`, and renders the sanitized `{code, msg, data}`
//!   envelope used by every response of the crate.
//!
//! ```rust,ignore
//! async fn list(Query(request): Query<PageRequest>) -> Result<Json<PageList<Menu>>, ApiError> {
//!     let fields = FieldMap::resolve(&Menu::record_shape())?; // QueryError -> 400
//!     // ...
//! }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use std::fmt;
use thiserror::Error;

use crate::auth::AuthError;
use crate::models::ApiResponse;

/// Failure while translating a page request into query conditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The supplied record shape is not a structured record.
    #[error("type `{0}` is not a structured record")]
    Shape(String),

    /// The filter text is not a JSON array of `[selector, operator, value]` entries.
    #[error("malformed filter: {0}")]
    FilterFormat(String),

    /// The sort text is not a JSON array of `{selector, desc}` objects.
    #[error("malformed sort: {0}")]
    SortFormat(String),

    /// The operator is not one of `=, in, not in, >, <, >=, <=, contains`.
    #[error("unsupported filter operator `{0}`")]
    UnsupportedOperator(String),

    /// The selector does not name a field of the queried record.
    #[error("unknown field `{0}`")]
    UnknownField(String),
}

/// API error with automatic logging and sanitized responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 - the request could not be understood (malformed filter, bad operator, ...)
    BadRequest { message: String },

    /// 401 - missing or invalid credentials
    Unauthorized { message: String },

    /// 403 - authenticated, but not allowed
    Forbidden { message: String },

    /// 404 - the resource does not exist
    NotFound { resource: String, id: Option<String> },

    /// 500 - database failure (details logged, never sent)
    Database { internal: DbErr },

    /// 500 - any other internal failure
    Internal {
        message: String,
        internal: Option<String>,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>, id: Option<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id,
        }
    }

    /// Wrap a database error. The error itself is logged, the client only sees a
    /// generic message.
    pub fn database(err: DbErr) -> Self {
        Self::Database { internal: err }
    }

    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::BadRequest { message }
            | Self::Unauthorized { message }
            | Self::Forbidden { message }
            | Self::Internal { message, .. } => message.clone(),
            Self::NotFound { resource, id } => match id {
                Some(id) => format!("{resource} with ID '{id}' not found"),
                None => format!("{resource} not found"),
            },
            Self::Database { .. } => "A database error occurred".to_string(),
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database { internal } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::Internal {
                internal: Some(details),
                ..
            } => {
                tracing::error!(details = %details, "Internal error occurred");
            }
            Self::BadRequest { message } => {
                tracing::warn!(error = %message, "Rejected client request");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();
        let body: ApiResponse<()> = ApiResponse::failure(self.user_message());
        (self.status_code(), Json(body)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

/// `DbErr::RecordNotFound` becomes a 404, everything else a sanitized 500.
impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match &err {
            DbErr::RecordNotFound(msg) => {
                let resource = msg.split_whitespace().next().unwrap_or("Resource");
                Self::not_found(resource, None)
            }
            _ => Self::database(err),
        }
    }
}

/// Translator failures are the client's fault: 400 with the underlying message.
impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Signing(details) => {
                Self::internal("Failed to issue access token", Some(details))
            }
            other => Self::unauthorized(other.to_string()),
        }
    }
}
