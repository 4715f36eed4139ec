use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Account record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,                   // unique account ID
    pub username: String,           // unique, case-sensitive
    pub email: String,              // unique, case-sensitive
    #[serde(skip_serializing)]
    pub password_hash: String,      // Argon2 hash, not exposed in JSON
    pub created_at: OffsetDateTime, // creation timestamp
    pub active: bool,               // disabled accounts stay in the store
}

/// Which unique key an insert collided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateField {
    Username,
    Email,
}

impl std::fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DuplicateField::Username => write!(f, "username"),
            DuplicateField::Email => write!(f, "email"),
        }
    }
}

/// Store failures. `Duplicate` is a normal registration outcome;
/// `Unavailable` means the store could not be consulted at all and must
/// never be treated as "not found".
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} already exists")]
    Duplicate(DuplicateField),
    #[error("account store unavailable")]
    Unavailable(#[source] sqlx::Error),
}
