use axum::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::accounts::repo_types::{Account, DuplicateField, StoreError};

/// Durable account records. Lookups return `Ok(None)` for "no such
/// account"; an `Err` always means the store could not be consulted.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    /// Insert a new account. The store's unique indexes are the final
    /// authority on username/email uniqueness; the insert either fully
    /// applies or not at all.
    async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Account, StoreError>;
}

#[derive(Clone)]
pub struct PgCredentialStore {
    db: PgPool,
}

impl PgCredentialStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_create_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.code().as_deref() == Some("23505") {
            let field = match db_err.constraint() {
                Some("accounts_email_key") => DuplicateField::Email,
                _ => DuplicateField::Username,
            };
            return StoreError::Duplicate(field);
        }
    }
    StoreError::Unavailable(e)
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, password_hash, created_at, active
            FROM accounts
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await
        .map_err(StoreError::Unavailable)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, password_hash, created_at, active
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .map_err(StoreError::Unavailable)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, password_hash, created_at, active
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(StoreError::Unavailable)
    }

    async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Account, StoreError> {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at, active
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(map_create_error)
    }
}
