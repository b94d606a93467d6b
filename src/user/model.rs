use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Account as reported by the auth provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub user_metadata: Value,
}

/// Tokens issued on sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: AuthUser,
}

/// Sign-up answer: a session when confirmation is off, a bare user otherwise
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(Session),
    User(AuthUser),
}

/// What a caller learns from signing up
#[derive(Debug, Serialize)]
pub struct SignUpOutcome {
    pub user_id: Uuid,
    pub confirmation_pending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
}

impl From<SignUpResponse> for SignUpOutcome {
    fn from(response: SignUpResponse) -> Self {
        match response {
            SignUpResponse::Session(session) => SignUpOutcome {
                user_id: session.user.id,
                confirmation_pending: false,
                session: Some(session),
            },
            SignUpResponse::User(user) => SignUpOutcome {
                user_id: user.id,
                confirmation_pending: true,
                session: None,
            },
        }
    }
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub username: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequests {
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sign_up_without_session_is_pending() {
        let response: SignUpResponse = serde_json::from_value(json!({
            "id": "6f1c1f6e-3c1a-4b43-9d5c-1a7e2f0b9a11",
            "email": "fan@paddock.io",
            "confirmation_sent_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap();
        let outcome = SignUpOutcome::from(response);
        assert!(outcome.confirmation_pending);
        assert!(outcome.session.is_none());
    }

    #[test]
    fn sign_up_with_session_is_signed_in() {
        let response: SignUpResponse = serde_json::from_value(json!({
            "access_token": "a", "refresh_token": "r", "expires_in": 3600, "token_type": "bearer",
            "user": { "id": "6f1c1f6e-3c1a-4b43-9d5c-1a7e2f0b9a11", "email": "fan@paddock.io" }
        }))
        .unwrap();
        let outcome = SignUpOutcome::from(response);
        assert!(!outcome.confirmation_pending);
        assert_eq!(outcome.session.unwrap().access_token, "a");
    }
}
