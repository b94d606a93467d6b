use log::{info, warn};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use crate::database::supabase::{SupabaseClient, ensure_success};
use crate::utils::error::CustomError;

/// Signed read URLs stay valid for one hour
pub const SIGNED_URL_TTL_SECONDS: u64 = 60 * 60;

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

/// Object storage bucket on the hosted backend
#[derive(Clone)]
pub struct StorageBucket {
    client: SupabaseClient,
    bucket: String,
}

impl StorageBucket {
    pub fn new(client: SupabaseClient, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Store `data` under `path`; existing objects are never overwritten
    pub async fn upload(
        &self,
        path: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
        access_token: &str,
    ) -> Result<(), CustomError> {
        let route = format!("/storage/v1/object/{}/{}", self.bucket, path);
        let response = self
            .client
            .request(Method::POST, &route, Some(access_token))
            .header("x-upsert", "false")
            .header(
                "content-type",
                content_type.unwrap_or("application/octet-stream"),
            )
            .body(data)
            .send()
            .await?;

        ensure_success(response).await?;
        info!("Stored object {}/{}", self.bucket, path);
        Ok(())
    }

    /// Time-limited read URL for a stored object
    pub async fn create_signed_url(
        &self,
        path: &str,
        expires_in: u64,
        access_token: &str,
    ) -> Result<String, CustomError> {
        let route = format!("/storage/v1/object/sign/{}/{}", self.bucket, path);
        let response = self
            .client
            .request(Method::POST, &route, Some(access_token))
            .json(&json!({ "expiresIn": expires_in }))
            .send()
            .await?;

        let signed = ensure_success(response)
            .await?
            .json::<SignedUrlResponse>()
            .await?;

        Ok(format!(
            "{}/storage/v1{}",
            self.client.base_url(),
            signed.signed_url
        ))
    }

    /// Remove objects; failures are logged and not returned
    pub async fn remove_best_effort(&self, paths: &[String], access_token: &str) {
        if paths.is_empty() {
            return;
        }

        let route = format!("/storage/v1/object/{}", self.bucket);
        let result = self
            .client
            .request(Method::DELETE, &route, Some(access_token))
            .json(&json!({ "prefixes": paths }))
            .send()
            .await;

        match result {
            Ok(response) => {
                if let Err(e) = ensure_success(response).await {
                    warn!("Failed to remove {} objects: {}", paths.len(), e);
                }
            }
            Err(e) => warn!("Failed to remove {} objects: {}", paths.len(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn signed_url_is_made_absolute() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/storage/v1/object/sign/moment-photos/u1/7/1-pit.jpg"))
            .and(body_json(json!({ "expiresIn": 3600 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "signedURL": "/object/sign/moment-photos/u1/7/1-pit.jpg?token=t"
            })))
            .mount(&server)
            .await;

        let bucket = StorageBucket::new(SupabaseClient::new(server.uri(), "anon"), "moment-photos");
        let url = bucket
            .create_signed_url("u1/7/1-pit.jpg", SIGNED_URL_TTL_SECONDS, "tok")
            .await
            .unwrap();

        assert_eq!(
            url,
            format!(
                "{}/storage/v1/object/sign/moment-photos/u1/7/1-pit.jpg?token=t",
                server.uri()
            )
        );
    }

    #[tokio::test]
    async fn upload_refuses_overwrite() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/storage/v1/object/moment-photos/u1/7/1-pit.jpg"))
            .and(header("x-upsert", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "x" })))
            .expect(1)
            .mount(&server)
            .await;

        let bucket = StorageBucket::new(SupabaseClient::new(server.uri(), "anon"), "moment-photos");
        bucket
            .upload("u1/7/1-pit.jpg", vec![1, 2, 3], Some("image/jpeg"), "tok")
            .await
            .unwrap();
    }
}
