//! HTTP client for the update-check endpoint.

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use super::UpdateOracle;
use super::payload::UpdateCheckPayload;
use super::response::parse_update_response;
use crate::constants::{SIGNATURE_HEADER, UPDATE_CHECK_URL};
use crate::core::MirrorError;
use crate::models::{Credentials, ProductReference, UpdateRecord};
use crate::signing::SignedRequest;
use crate::ui;

/// [`UpdateOracle`] talking to the vendor API over HTTPS.
///
/// Each check sends one signed `POST`: the signature and access token travel
/// as query parameters and again as headers, the payload as the form body.
#[derive(Debug, Clone)]
pub struct UpdateCheckClient {
    http: reqwest::Client,
    endpoint: String,
}

impl Default for UpdateCheckClient {
    fn default() -> Self {
        Self::new(UPDATE_CHECK_URL)
    }
}

impl UpdateCheckClient {
    /// Client for `endpoint` with a default HTTP client.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    /// Client for `endpoint` sharing an existing HTTP client.
    pub fn with_client(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// Endpoint queried, without authentication parameters.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl UpdateOracle for UpdateCheckClient {
    async fn check(
        &self,
        credentials: &Credentials,
        product: &ProductReference,
    ) -> Result<UpdateRecord, MirrorError> {
        let payload = UpdateCheckPayload::new([product.product_id()]);
        let request = SignedRequest::new(
            &self.endpoint,
            Method::POST,
            payload.to_body()?,
            credentials.access_token_secret(),
        )?;

        ui::command(&format!("POST {}", self.endpoint));
        tracing::debug!(target: "oracle", "Update-check body: {}", request.body());

        let response = self
            .http
            .post(request.signed_url(credentials.access_token()))
            .header(AUTHORIZATION, format!("Bearer {}", credentials.access_token()))
            .header(SIGNATURE_HEADER, request.signature())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(request.body().to_string())
            .send()
            .await
            .map_err(|e| MirrorError::Network {
                operation: format!("POST {}", self.endpoint),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(target: "oracle", "Update check returned HTTP {status}");
        }
        let body = response.text().await.map_err(|e| MirrorError::Network {
            operation: format!("read response from {}", self.endpoint),
            reason: e.to_string(),
        })?;

        let record = parse_update_response(&body, product.product_id(), &self.endpoint)?;
        tracing::info!(
            target: "oracle",
            "Product {} is at version {}",
            product.product_id(),
            record.version
        );
        Ok(record)
    }
}
