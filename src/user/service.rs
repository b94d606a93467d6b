use log::{debug, info};
use reqwest::{Method, Response};
use serde_json::json;

use crate::database::SupabaseClient;
use crate::database::supabase::ensure_success;
use crate::middleware::auth::Viewer;
use crate::user::model::{
    AuthUser, CreateUserRequest, LoginRequests, Session, SignUpOutcome, SignUpResponse,
};
use crate::utils::error::CustomError;
use crate::utils::helpers::non_blank;
use crate::utils::password_validation;

/// Account operations, delegated to the hosted auth endpoints
pub struct UserService {
    client: SupabaseClient,
}

/// Provider rejections of the caller's input become `reject`, anything else stays as is
async fn check(
    response: Response,
    reject: fn(String) -> CustomError,
) -> Result<Response, CustomError> {
    let status = response.status();
    ensure_success(response).await.map_err(|e| match e {
        CustomError::UpstreamError(message) if status.is_client_error() => reject(message),
        other => other,
    })
}

impl UserService {
    pub fn new(client: SupabaseClient) -> Self {
        UserService { client }
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<SignUpOutcome, CustomError> {
        let email = request.email.trim();
        password_validation::validate_email(email)?;
        password_validation::validate_password(&request.password)?;

        let username = request.username.as_deref().and_then(non_blank);
        if let Some(username) = username {
            password_validation::validate_username(username)?;
        }

        let mut body = json!({ "email": email, "password": request.password });
        if let Some(username) = username {
            body["data"] = json!({ "username": username });
        }

        let response = self
            .client
            .request(Method::POST, "/auth/v1/signup", None)
            .json(&body)
            .send()
            .await?;
        let signed_up: SignUpResponse = check(response, CustomError::BadRequestError)
            .await?
            .json()
            .await?;

        let outcome = SignUpOutcome::from(signed_up);
        info!(
            "Registered user {} (confirmation pending: {})",
            outcome.user_id, outcome.confirmation_pending
        );
        Ok(outcome)
    }

    pub async fn login_fn(&self, login: LoginRequests) -> Result<Session, CustomError> {
        let response = self
            .client
            .request(Method::POST, "/auth/v1/token", None)
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": login.email.trim(), "password": login.password }))
            .send()
            .await?;
        let session: Session = check(response, CustomError::UnauthenticatedError)
            .await?
            .json()
            .await?;

        info!("User {} signed in", session.user.id);
        Ok(session)
    }

    pub async fn logout(&self, viewer: &Viewer) -> Result<(), CustomError> {
        let response = self
            .client
            .request(Method::POST, "/auth/v1/logout", Some(&viewer.access_token))
            .send()
            .await?;
        ensure_success(response).await?;

        debug!(
            "User {} ({}) signed out",
            viewer.id,
            viewer.email.as_deref().unwrap_or("no email")
        );
        Ok(())
    }

    pub async fn current_user(&self, viewer: &Viewer) -> Result<AuthUser, CustomError> {
        let response = self
            .client
            .request(Method::GET, "/auth/v1/user", Some(&viewer.access_token))
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }
}
