//! Runtime settings, read from `CRUDSCOPE_*` environment variables (a `.env`
//! file in the working directory is loaded first when present).
//!
//! | Variable | Default |
//! |----------|---------|
//! | `CRUDSCOPE_USE_MULTI_TENANCY` | `false` |
//! | `CRUDSCOPE_JWT_ISSUER` | `crudscope` |
//! | `CRUDSCOPE_JWT_SECRET` | required |
//! | `CRUDSCOPE_JWT_EXPIRE_DAYS` | `7` |
//! | `CRUDSCOPE_DATABASE_URL` | required |
//! | `CRUDSCOPE_DATABASE_MAX_CONNECTIONS` | `10` |
//! | `CRUDSCOPE_DATABASE_MIN_CONNECTIONS` | `1` |

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const ENV_PREFIX: &str = "CRUDSCOPE_";

const DEFAULT_ISSUER: &str = "crudscope";
const DEFAULT_EXPIRE_DAYS: i64 = 7;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const CONNECTION_MAX_LIFETIME: Duration = Duration::from_secs(4 * 60 * 60);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(String),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerSettings {
    /// Global switch; a resource only gets tenant isolation when this and its
    /// own flag are both on.
    pub use_multi_tenancy: bool,
}

#[derive(Clone, Deserialize)]
pub struct JwtConfig {
    pub issuer: String,
    pub secret: String,
    /// Token lifetime in days.
    pub expire_days: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("issuer", &self.issuer)
            .field("secret", &"<redacted>")
            .field("expire_days", &self.expire_days)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DatabaseSettings {
    /// Open a pooled connection.
    ///
    /// # Errors
    ///
    /// Any [`DbErr`] raised while connecting.
    pub async fn connect(&self) -> Result<DatabaseConnection, DbErr> {
        let mut options = ConnectOptions::new(self.url.clone());
        options
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .max_lifetime(CONNECTION_MAX_LIFETIME)
            .sqlx_logging(true);
        tracing::info!(
            max_connections = self.max_connections,
            min_connections = self.min_connections,
            "Connecting to database"
        );
        Database::connect(options).await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub jwt: JwtConfig,
    pub database: DatabaseSettings,
}

impl Settings {
    /// Load `.env` (if any), then read settings from the process environment.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] for a missing required variable or an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which receives full variable names
    /// such as `CRUDSCOPE_JWT_SECRET`.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] for a missing required variable or an unparsable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);
        Ok(Self {
            server: ServerSettings {
                use_multi_tenancy: env.parse_or("USE_MULTI_TENANCY", false)?,
            },
            jwt: JwtConfig {
                issuer: env
                    .get("JWT_ISSUER")
                    .unwrap_or_else(|| DEFAULT_ISSUER.to_string()),
                secret: env.required("JWT_SECRET")?,
                expire_days: env.parse_or("JWT_EXPIRE_DAYS", DEFAULT_EXPIRE_DAYS)?,
            },
            database: DatabaseSettings {
                url: env.required("DATABASE_URL")?,
                max_connections: env
                    .parse_or("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
                min_connections: env
                    .parse_or("DATABASE_MIN_CONNECTIONS", DEFAULT_MIN_CONNECTIONS)?,
            },
        })
    }
}

struct Lookup<F>(F);

impl<F: Fn(&str) -> Option<String>> Lookup<F> {
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(format!("{ENV_PREFIX}{name}").as_str())
            .filter(|value| !value.trim().is_empty())
    }

    fn required(&self, name: &str) -> Result<String, ConfigError> {
        self.get(name)
            .ok_or_else(|| ConfigError::Missing(format!("{ENV_PREFIX}{name}")))
    }

    fn parse_or<T: FromStr>(&self, name: &str, default: T) -> Result<T, ConfigError> {
        match self.get(name) {
            None => Ok(default),
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                key: format!("{ENV_PREFIX}{name}"),
                value,
            }),
        }
    }
}
