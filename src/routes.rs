use axum::{
    Extension, Router,
    extract::{Query, State},
    middleware,
    routing::get,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;

use crate::auth::{TokenClaims, require_claims};
use crate::config::Settings;
use crate::errors::ApiError;
use crate::models::{ApiResponse, PageList, PageRequest};
use crate::scope::DataScope;
use crate::traits::PagedResource;

/// Shared handler state, built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub settings: Arc<Settings>,
}

impl AppState {
    #[must_use]
    pub fn new(db: DatabaseConnection, settings: Settings) -> Self {
        Self {
            db,
            settings: Arc::new(settings),
        }
    }
}

// List one page of a resource, scoped to the caller's tenant.
pub async fn get_page<T>(
    State(state): State<AppState>,
    claims: Option<Extension<TokenClaims>>,
    Query(request): Query<PageRequest>,
) -> Result<ApiResponse<PageList<T>>, ApiError>
where
    T: PagedResource + Serialize,
{
    let scope = match claims {
        Some(Extension(claims)) => DataScope::from_claims(&state.settings.server, &claims),
        None => DataScope::new(state.settings.server.use_multi_tenancy, None),
    };
    let page = T::get_page(&state.db, &request, &scope).await?;
    Ok(ApiResponse::success(page))
}

/// `GET {path}` listing `T`, behind bearer-token authentication.
pub fn page_router<T>(path: &str, state: AppState) -> Router
where
    T: PagedResource + Serialize + 'static,
{
    Router::new()
        .route(path, get(get_page::<T>))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_claims))
        .with_state(state)
}
