use axum::async_trait;
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use std::collections::HashMap;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// An established session: an opaque token and its expiry.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub expires_at: OffsetDateTime,
}

/// Server-side session state. The auth layer only signals open/revoke;
/// how sessions are stored is this collaborator's concern.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    async fn open(&self, account_id: Uuid, remember: bool) -> anyhow::Result<Session>;
    async fn resolve(&self, token: &str) -> anyhow::Result<Option<Uuid>>;
    async fn revoke(&self, token: &str) -> anyhow::Result<()>;
}

/// In-process session table. Tokens are random alphanumeric strings from
/// OS randomness; expiry is checked lazily at resolve time.
pub struct MemorySessions {
    ttl: Duration,
    remember_ttl: Duration,
    inner: Mutex<HashMap<String, (Uuid, OffsetDateTime)>>,
}

impl MemorySessions {
    pub fn new(ttl: Duration, remember_ttl: Duration) -> Self {
        Self {
            ttl,
            remember_ttl,
            inner: Mutex::new(HashMap::new()),
        }
    }

    fn new_token() -> String {
        OsRng
            .sample_iter(&Alphanumeric)
            .take(48)
            .map(char::from)
            .collect()
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[async_trait]
impl SessionBackend for MemorySessions {
    async fn open(&self, account_id: Uuid, remember: bool) -> anyhow::Result<Session> {
        let ttl = if remember { self.remember_ttl } else { self.ttl };
        let now = OffsetDateTime::now_utc();
        let session = Session {
            token: Self::new_token(),
            expires_at: now + ttl,
        };
        let mut sessions = self.inner.lock().await;
        // Abandoned sessions are never resolved again, so sweep them here
        // instead of letting the table grow with every login.
        sessions.retain(|_, (_, expires_at)| *expires_at > now);
        sessions.insert(session.token.clone(), (account_id, session.expires_at));
        debug!(%account_id, remember, "session opened");
        Ok(session)
    }

    async fn resolve(&self, token: &str) -> anyhow::Result<Option<Uuid>> {
        let mut sessions = self.inner.lock().await;
        match sessions.get(token) {
            Some((account_id, expires_at)) if *expires_at > OffsetDateTime::now_utc() => {
                Ok(Some(*account_id))
            }
            Some(_) => {
                sessions.remove(token);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn revoke(&self, token: &str) -> anyhow::Result<()> {
        self.inner.lock().await.remove(token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> MemorySessions {
        MemorySessions::new(Duration::minutes(60), Duration::days(14))
    }

    #[tokio::test]
    async fn open_resolve_revoke() {
        let sessions = backend();
        let account_id = Uuid::new_v4();
        let session = sessions.open(account_id, false).await.unwrap();

        assert_eq!(sessions.resolve(&session.token).await.unwrap(), Some(account_id));

        sessions.revoke(&session.token).await.unwrap();
        assert_eq!(sessions.resolve(&session.token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unknown_token_resolves_to_none() {
        let sessions = backend();
        assert_eq!(sessions.resolve("no-such-token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_session_resolves_to_none() {
        let sessions = MemorySessions::new(Duration::seconds(-1), Duration::seconds(-1));
        let session = sessions.open(Uuid::new_v4(), false).await.unwrap();
        assert_eq!(sessions.resolve(&session.token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn remember_stretches_expiry() {
        let sessions = backend();
        let short = sessions.open(Uuid::new_v4(), false).await.unwrap();
        let long = sessions.open(Uuid::new_v4(), true).await.unwrap();
        assert!(long.expires_at > short.expires_at);
    }

    #[tokio::test]
    async fn abandoned_expired_sessions_are_swept_on_open() {
        let sessions = MemorySessions::new(Duration::seconds(-1), Duration::days(14));
        for _ in 0..100 {
            sessions.open(Uuid::new_v4(), false).await.unwrap();
        }

        // The next open sweeps every expired entry, abandoned or not.
        let account_id = Uuid::new_v4();
        let live = sessions.open(account_id, true).await.unwrap();

        assert_eq!(sessions.len().await, 1);
        assert_eq!(sessions.resolve(&live.token).await.unwrap(), Some(account_id));
    }

    #[tokio::test]
    async fn tokens_are_unique() {
        let sessions = backend();
        let a = sessions.open(Uuid::new_v4(), false).await.unwrap();
        let b = sessions.open(Uuid::new_v4(), false).await.unwrap();
        assert_ne!(a.token, b.token);
    }
}
