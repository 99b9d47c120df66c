//! JWT access tokens and the bearer-token middleware.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::JwtConfig;
use crate::errors::ApiError;
use crate::routes::AppState;

pub const SYS_TYPE_ADMIN: &str = "admin";
pub const SYS_TYPE_WEB: &str = "web";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Access token has expired")]
    Expired,

    #[error("Invalid access token signature")]
    InvalidSignature,

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid access token: {0}")]
    Invalid(String),

    /// Signing failed; a server-side problem rather than a client one.
    #[error("Failed to sign access token: {0}")]
    Signing(String),
}

/// Claims carried by every access token. `jti` holds the user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    pub login_name: String,
    pub name: String,
    pub sys_type: String,
    /// Empty unless multi-tenancy was on when the token was issued.
    #[serde(default)]
    pub tenant_id: String,
    pub jti: String,
    pub exp: i64,
    pub iss: String,
}

impl TokenClaims {
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.jti
    }

    /// Tenant of the caller, `None` for an empty claim.
    #[must_use]
    pub fn tenant_id(&self) -> Option<&str> {
        Some(self.tenant_id.as_str()).filter(|tenant| !tenant.is_empty())
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.sys_type == SYS_TYPE_ADMIN
    }
}

/// The user a token is issued for.
#[derive(Debug, Clone, Default)]
pub struct TokenSubject {
    pub user_id: String,
    pub login_name: String,
    pub name: String,
    pub sys_type: String,
    pub tenant_id: String,
}

/// Sign an HS256 token valid for `expire_days` days. The tenant id is only
/// embedded when `multi_tenancy` is on.
///
/// # Errors
///
/// [`AuthError::Signing`] if encoding fails.
pub fn generate_token(
    config: &JwtConfig,
    subject: &TokenSubject,
    multi_tenancy: bool,
) -> Result<String, AuthError> {
    let expires_at = Utc::now() + Duration::hours(config.expire_days * 24);
    let claims = TokenClaims {
        login_name: subject.login_name.clone(),
        name: subject.name.clone(),
        sys_type: subject.sys_type.clone(),
        tenant_id: if multi_tenancy {
            subject.tenant_id.clone()
        } else {
            String::new()
        },
        jti: subject.user_id.clone(),
        exp: expires_at.timestamp(),
        iss: config.issuer.clone(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))
}

/// Verify signature, expiry and issuer, and return the claims.
///
/// # Errors
///
/// [`AuthError::Expired`], [`AuthError::InvalidSignature`] or
/// [`AuthError::Invalid`].
pub fn parse_token(config: &JwtConfig, token: &str) -> Result<TokenClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_issuer(&[config.issuer.as_str()]);

    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Invalid(e.to_string()),
    })?;
    Ok(data.claims)
}

/// Token from an `Authorization: Bearer <token>` header.
///
/// # Errors
///
/// [`AuthError::MissingToken`] when the header is absent or not a bearer token.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// Reject requests without a valid bearer token; otherwise make the
/// [`TokenClaims`] available to handlers as an `Extension`.
///
/// # Errors
///
/// A 401 [`ApiError`] for a missing or invalid token.
pub async fn require_claims(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = parse_token(&state.settings.jwt, bearer_token(req.headers())?)?;
    tracing::debug!(user_id = %claims.user_id(), "Authenticated request");
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
