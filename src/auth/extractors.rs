use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use tracing::error;

use crate::accounts::repo_types::Account;
use crate::state::AppState;

/// Session guard: resolves the bearer token against the session backend
/// and loads the account. Denies with 401 when the session is missing or
/// expired, and when the account has been disabled since login.
pub struct CurrentAccount {
    pub token: String,
    pub account: Account,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAccount {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Read Authorization header
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "missing Authorization header".into()))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or((StatusCode::UNAUTHORIZED, "invalid auth scheme".into()))?;

        let account_id = state
            .sessions
            .resolve(token)
            .await
            .map_err(|e| {
                error!(error = %e, "session backend failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "session lookup failed".into())
            })?
            .ok_or((StatusCode::UNAUTHORIZED, "invalid or expired session".into()))?;

        let account = state
            .store
            .find_by_id(account_id)
            .await
            .map_err(|e| {
                error!(error = %e, "account store failure");
                (StatusCode::SERVICE_UNAVAILABLE, "account lookup failed".into())
            })?
            .ok_or((StatusCode::UNAUTHORIZED, "invalid or expired session".into()))?;

        if !account.active {
            return Err((StatusCode::UNAUTHORIZED, "account is disabled".into()));
        }

        Ok(CurrentAccount {
            token: token.to_owned(),
            account,
        })
    }
}
