use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::accounts::{
    password,
    repo::CredentialStore,
    repo_types::{Account, StoreError},
};

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
}

/// True when the login identifier is syntactically an email address and
/// should be resolved against the email column rather than the username.
pub(crate) fn is_email(identifier: &str) -> bool {
    EMAIL_RE.is_match(identifier)
}

/// Outcome of a login attempt. Unknown identifier and wrong secret both
/// collapse into `InvalidCredentials` so callers cannot enumerate
/// accounts; `AccountDisabled` is only reachable after a correct secret.
#[derive(Debug)]
pub enum AuthOutcome {
    Authenticated(Account),
    InvalidCredentials,
    AccountDisabled,
    InvalidInput,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("secret verification task failed")]
    Verify(#[source] tokio::task::JoinError),
}

/// Resolve a login attempt to a decision.
///
/// The disabled check runs strictly after verification: a disabled
/// account with a wrong secret answers `InvalidCredentials`, so the
/// disabled state never confirms an identifier on its own.
pub async fn authenticate(
    store: &dyn CredentialStore,
    identifier: &str,
    secret: &str,
) -> Result<AuthOutcome, AuthError> {
    if identifier.is_empty() || secret.is_empty() {
        return Ok(AuthOutcome::InvalidInput);
    }

    let account = if is_email(identifier) {
        store.find_by_email(identifier).await?
    } else {
        store.find_by_username(identifier).await?
    };

    let Some(account) = account else {
        debug!("login attempt for unknown identifier");
        return Ok(AuthOutcome::InvalidCredentials);
    };

    // Argon2 verification is deliberately slow; keep it off the runtime.
    let plain = secret.to_owned();
    let hash = account.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || password::verify_secret(&plain, &hash))
        .await
        .map_err(AuthError::Verify)?;

    if !verified {
        debug!(account_id = %account.id, "login secret mismatch");
        return Ok(AuthOutcome::InvalidCredentials);
    }

    if !account.active {
        warn!(account_id = %account.id, "login on disabled account");
        return Ok(AuthOutcome::AccountDisabled);
    }

    Ok(AuthOutcome::Authenticated(account))
}

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("secrets do not match")]
    SecretMismatch,
    #[error("username already in use")]
    UsernameTaken,
    #[error("email already registered")]
    EmailTaken,
    #[error("account was registered concurrently")]
    Conflict,
    #[error("secret hashing failed")]
    Hashing(#[source] anyhow::Error),
    #[error(transparent)]
    Store(StoreError),
}

/// Create a new account. The username/email pre-checks are advisory; the
/// store's uniqueness constraint is the final authority, and a duplicate
/// surfacing from the insert itself is reported as a generic `Conflict`.
pub async fn register(
    store: &dyn CredentialStore,
    username: &str,
    email: &str,
    secret: &str,
    confirm_secret: &str,
) -> Result<Account, RegisterError> {
    if username.is_empty() || email.is_empty() || secret.is_empty() || confirm_secret.is_empty() {
        return Err(RegisterError::InvalidInput("all fields are required"));
    }
    if secret != confirm_secret {
        return Err(RegisterError::SecretMismatch);
    }
    if !is_email(email) {
        return Err(RegisterError::InvalidInput("email address is not valid"));
    }
    // A username shaped like an email would be unreachable at login,
    // since the resolver routes such identifiers to the email column.
    if is_email(username) {
        return Err(RegisterError::InvalidInput(
            "username must not be an email address",
        ));
    }

    if store
        .find_by_username(username)
        .await
        .map_err(RegisterError::Store)?
        .is_some()
    {
        return Err(RegisterError::UsernameTaken);
    }
    if store
        .find_by_email(email)
        .await
        .map_err(RegisterError::Store)?
        .is_some()
    {
        return Err(RegisterError::EmailTaken);
    }

    let plain = secret.to_owned();
    let hash = tokio::task::spawn_blocking(move || password::hash_secret(&plain))
        .await
        .map_err(anyhow::Error::new)
        .and_then(|r| r)
        .map_err(RegisterError::Hashing)?;

    match store.create(username, email, &hash).await {
        Ok(account) => Ok(account),
        Err(StoreError::Duplicate(field)) => {
            warn!(%field, "registration lost a uniqueness race");
            Err(RegisterError::Conflict)
        }
        Err(e @ StoreError::Unavailable(_)) => Err(RegisterError::Store(e)),
    }
}
