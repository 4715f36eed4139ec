use crate::accounts::repo::{CredentialStore, PgCredentialStore};
use crate::config::AppConfig;
use crate::session::{MemorySessions, SessionBackend};
use anyhow::Context;
use std::sync::Arc;
use time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub sessions: Arc<dyn SessionBackend>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }

        let store = Arc::new(PgCredentialStore::new(db)) as Arc<dyn CredentialStore>;
        let sessions = Arc::new(MemorySessions::new(
            Duration::minutes(config.session.ttl_minutes),
            Duration::minutes(config.session.remember_ttl_minutes),
        )) as Arc<dyn SessionBackend>;

        Ok(Self { store, sessions })
    }
}
