#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use crudscope::auth::{SYS_TYPE_ADMIN, TokenSubject, generate_token};
use crudscope::config::{DatabaseSettings, JwtConfig, ServerSettings, Settings};
use crudscope::{AppState, page_router};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};
use serde_json::Value;
use tower::ServiceExt;

pub mod menu_entity;

use menu_entity::Menu;

const CREATE_MENUS: &str = r"
CREATE TABLE menus (
    Id TEXT PRIMARY KEY NOT NULL,
    Name TEXT NOT NULL,
    Code TEXT NOT NULL,
    Sort INTEGER NOT NULL,
    TenantId TEXT NOT NULL DEFAULT '',
    IsDeleted BOOLEAN NOT NULL DEFAULT 0
)";

/// `(id, name, code, sort, tenant, deleted)`
pub const MENU_ROWS: &[(&str, &str, &str, i32, &str, bool)] = &[
    ("1", "System", "sys", 1, "t1", false),
    ("2", "Users", "user", 2, "t1", false),
    ("3", "Roles", "role", 3, "t1", false),
    ("4", "Menus", "menu", 4, "t1", false),
    ("5", "Logs", "log", 5, "t1", true),
    ("6", "Reports", "report", 6, "t2", false),
    ("7", "System Settings", "settings", 7, "t2", false),
];

/// Route `tracing` output through the test harness; `RUST_LOG=crudscope=debug`
/// shows compiled filters.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();
    let db = Database::connect("sqlite::memory:").await?;
    db.execute_unprepared(CREATE_MENUS).await?;
    for (id, name, code, sort, tenant, deleted) in MENU_ROWS {
        db.execute_unprepared(&format!(
            "INSERT INTO menus (Id, Name, Code, Sort, TenantId, IsDeleted) \
             VALUES ('{id}', '{name}', '{code}', {sort}, '{tenant}', {})",
            i32::from(*deleted)
        ))
        .await?;
    }
    Ok(db)
}

pub fn test_settings(use_multi_tenancy: bool) -> Settings {
    Settings {
        server: ServerSettings { use_multi_tenancy },
        jwt: JwtConfig {
            issuer: "crudscope-test".to_string(),
            secret: "integration-test-secret-0123456789".to_string(),
            expire_days: 1,
        },
        database: DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
    }
}

pub fn setup_test_app(db: DatabaseConnection, settings: Settings) -> Router {
    page_router::<Menu>("/api/menus", AppState::new(db, settings))
}

pub fn token_for(settings: &Settings, tenant_id: &str) -> String {
    let subject = TokenSubject {
        user_id: "admin-id".to_string(),
        login_name: "admin".to_string(),
        name: "Administrator".to_string(),
        sys_type: SYS_TYPE_ADMIN.to_string(),
        tenant_id: tenant_id.to_string(),
    };
    generate_token(&settings.jwt, &subject, settings.server.use_multi_tenancy)
        .expect("Failed to sign test token")
}

/// Build `/api/menus?...` with every value percent-encoded.
pub fn menus_uri(params: &[(&str, &str)]) -> String {
    let query: Vec<String> = params
        .iter()
        .map(|(key, value)| format!("{key}={}", url_escape::encode_component(value)))
        .collect();
    format!("/api/menus?{}", query.join("&"))
}

pub async fn get_json(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        request = request.header("authorization", format!("Bearer {token}"));
    }
    let response = app
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

/// Ids of the rows in a successful page response, in response order.
pub fn ids(body: &Value) -> Vec<String> {
    body["data"]["data"]
        .as_array()
        .expect("page data should be an array")
        .iter()
        .map(|row| row["id"].as_str().unwrap_or_default().to_string())
        .collect()
}
