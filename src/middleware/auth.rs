use actix_web::dev::{Payload, ServiceRequest};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use futures_util::future::{Ready, ready};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::error::CustomError;

/// Audience the auth provider stamps on user access tokens
pub const TOKEN_AUDIENCE: &str = "authenticated";

/// Claims carried by the auth provider's access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
    pub aud: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// The authenticated user issuing a request
#[derive(Debug, Clone)]
pub struct Viewer {
    pub id: Uuid,
    pub email: Option<String>,
    /// Forwarded to the backend so row-level security sees the same user
    pub access_token: String,
}

/// Checks access tokens against the project's JWT secret
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[TOKEN_AUDIENCE]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Viewer, CustomError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!("Rejected access token: {}", e);
                CustomError::UnauthenticatedError("Invalid or expired token".to_string())
            })?;

        Ok(Viewer {
            id: token_data.claims.sub,
            email: token_data.claims.email,
            access_token: token.to_string(),
        })
    }
}

/// Bearer middleware for scopes where every route needs a signed-in user
pub async fn verify_token(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let verifier = match req.app_data::<web::Data<JwtVerifier>>() {
        Some(verifier) => verifier.clone(),
        None => {
            let err = CustomError::InternalServerError("Token verifier is not configured".into());
            return Err((err.into(), req));
        }
    };

    match verifier.verify(credentials.token()) {
        Ok(viewer) => {
            req.extensions_mut().insert(viewer);
            Ok(req)
        }
        Err(e) => Err((e.into(), req)),
    }
}

/// Resolve the viewer from middleware extensions or the Authorization header.
/// A missing header is an anonymous request; a malformed or invalid one is an error.
pub fn viewer_from_request(req: &HttpRequest) -> Result<Option<Viewer>, CustomError> {
    if let Some(viewer) = req.extensions().get::<Viewer>() {
        return Ok(Some(viewer.clone()));
    }

    let header = match req.headers().get(AUTHORIZATION) {
        Some(header) => header,
        None => return Ok(None),
    };

    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            CustomError::UnauthenticatedError("Malformed authorization header".to_string())
        })?;

    let verifier = req.app_data::<web::Data<JwtVerifier>>().ok_or_else(|| {
        CustomError::InternalServerError("Token verifier is not configured".to_string())
    })?;

    verifier.verify(token).map(Some)
}

impl FromRequest for Viewer {
    type Error = CustomError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(viewer_from_request(req).and_then(|viewer| {
            viewer.ok_or_else(|| CustomError::UnauthenticatedError("Not authenticated".to_string()))
        }))
    }
}

/// Viewer for routes that also serve anonymous visitors
pub struct OptionalViewer(pub Option<Viewer>);

impl FromRequest for OptionalViewer {
    type Error = CustomError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(viewer_from_request(req).map(OptionalViewer))
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    pub const TEST_SECRET: &str = "test-jwt-secret";

    /// Sign an access token the way the auth provider would
    pub fn token_for(user_id: Uuid) -> String {
        let claims = Claims {
            sub: user_id,
            exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
            aud: TOKEN_AUDIENCE.to_string(),
            email: Some("fan@example.com".to_string()),
            role: Some("authenticated".to_string()),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap()
    }

    pub fn verifier() -> web::Data<JwtVerifier> {
        web::Data::new(JwtVerifier::new(TEST_SECRET))
    }
}
