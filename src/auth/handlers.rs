use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, PublicAccount, RegisterRequest, SessionResponse},
        extractors::CurrentAccount,
        services::{self, AuthError, AuthOutcome, RegisterError},
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicAccount>), (StatusCode, String)> {
    let account = services::register(
        state.store.as_ref(),
        payload.username.trim(),
        payload.email.trim(),
        &payload.password,
        &payload.confirm_password,
    )
    .await
    .map_err(|e| match e {
        RegisterError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.to_string()),
        RegisterError::SecretMismatch => {
            (StatusCode::BAD_REQUEST, "passwords do not match".into())
        }
        RegisterError::UsernameTaken => {
            (StatusCode::CONFLICT, "username already in use".into())
        }
        RegisterError::EmailTaken => {
            (StatusCode::CONFLICT, "email already registered".into())
        }
        RegisterError::Conflict => {
            warn!("registration conflict");
            (StatusCode::CONFLICT, "registration conflict, try again".into())
        }
        RegisterError::Hashing(e) => {
            error!(error = %e, "hash_secret failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "registration failed".into())
        }
        RegisterError::Store(e) => {
            error!(error = %e, "account store unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, "service unavailable".into())
        }
    })?;

    info!(account_id = %account.id, username = %account.username, "account registered");
    Ok((StatusCode::CREATED, Json(PublicAccount::from(account))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, (StatusCode, String)> {
    let outcome = services::authenticate(
        state.store.as_ref(),
        payload.identifier.trim(),
        &payload.password,
    )
    .await
    .map_err(|e| match e {
        AuthError::Store(e) => {
            error!(error = %e, "account store unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, "service unavailable".into())
        }
        AuthError::Verify(e) => {
            error!(error = %e, "verify_secret task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "login failed".into())
        }
    })?;

    let account = match outcome {
        AuthOutcome::Authenticated(account) => account,
        AuthOutcome::InvalidInput => {
            return Err((StatusCode::BAD_REQUEST, "fill in all fields".into()));
        }
        AuthOutcome::InvalidCredentials => {
            warn!("login rejected");
            return Err((StatusCode::UNAUTHORIZED, "invalid credentials".into()));
        }
        AuthOutcome::AccountDisabled => {
            warn!("login on disabled account rejected");
            return Err((StatusCode::FORBIDDEN, "account is disabled".into()));
        }
    };

    let session = state
        .sessions
        .open(account.id, payload.remember)
        .await
        .map_err(|e| {
            error!(error = %e, "session open failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "login failed".into())
        })?;

    info!(account_id = %account.id, username = %account.username, "logged in");
    Ok(Json(SessionResponse {
        session_token: session.token,
        expires_at: session.expires_at,
        account: PublicAccount::from(account),
    }))
}

#[instrument(skip(state, current))]
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentAccount,
) -> Result<StatusCode, (StatusCode, String)> {
    state.sessions.revoke(&current.token).await.map_err(|e| {
        error!(error = %e, "session revoke failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "logout failed".into())
    })?;

    info!(account_id = %current.account.id, "logged out");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(current))]
pub async fn get_me(current: CurrentAccount) -> Json<PublicAccount> {
    Json(PublicAccount::from(current.account))
}
