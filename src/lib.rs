//! # crudscope
//!
//! Query plumbing for admin-style list endpoints on Axum and Sea-ORM: a small
//! JSON filter / sort language compiled into parameterized conditions, paging,
//! soft-delete and tenant scoping, audit stamping, and JWT bearer auth.
//!
//! ```rust,ignore
//! let settings = Settings::from_env()?;
//! let db = settings.database.connect().await?;
//! let app = page_router::<Menu>("/api/menus", AppState::new(db, settings));
//! ```
//!
//! `GET /api/menus?take=20&skip=0&filter=[["name","contains","sys"]]&sort=[{"selector":"sort"}]`
//! returns `{"code":0,"msg":"","data":{"totalCount":0,"data":[...]}}`.

pub mod audit;
pub mod auth;
pub mod config;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod routes;
pub mod scope;
pub mod traits;

pub use errors::{ApiError, QueryError};
pub use filtering::{FieldDescriptor, FieldMap, RecordShape, apply_page_request};
pub use models::{ApiResponse, PageList, PageRequest};
pub use routes::{AppState, page_router};
pub use scope::DataScope;
pub use traits::PagedResource;
