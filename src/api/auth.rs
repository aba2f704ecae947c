//! Session-token authentication for user-scoped endpoints.
//!
//! Tokens are issued elsewhere; this service only resolves them against the
//! `sessions` table. A token is read from `Authorization: Bearer <token>` or,
//! failing that, from the configured session cookie.

use crate::api::AppState;
use crate::domain::{TimeMs, UserId};
use crate::error::AppError;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub UserId);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers, &state.config.session_cookie)
            .ok_or_else(|| AppError::Unauthorized("missing session token".to_string()))?;

        let user = state
            .repo
            .find_session_user(&token, TimeMs::now())
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid or expired session".to_string()))?;

        Ok(AuthUser(user))
    }
}

/// Extract the raw session token, preferring a bearer header over the cookie.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
