use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::accounts::repo_types::Account;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Request body for login. `identifier` is a username or an email,
/// disambiguated by syntax on the server.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
    #[serde(default)]
    pub remember: bool,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub account: PublicAccount,
}

/// Public part of the account returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicAccount {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<Account> for PublicAccount {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_remember_defaults_to_false() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"identifier": "alice", "password": "pw"}"#).unwrap();
        assert!(!req.remember);
    }

    #[test]
    fn public_account_serialization() {
        let account = PublicAccount {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@example.com".into(),
        };
        let json = serde_json::to_string(&account).unwrap();
        assert!(json.contains("alice@example.com"));
        assert!(json.contains("id"));
    }
}
