//! Bearer-token gate for protected routes.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::application::{AppError, AuthError};
use crate::domain::AccountId;

use super::AppState;
use super::error::ApiErrorResponse;

/// The account a request acts on, taken from a verified
/// `Authorization: Bearer <token>` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedAccount(pub AccountId);

impl FromRequestParts<AppState> for AuthenticatedAccount {
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).map_err(AppError::from)?;
        let account_id = state.tokens().verify(token).map_err(AppError::from)?;
        Ok(Self(account_id))
    }
}

/// Extract the token from an `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidToken)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}
