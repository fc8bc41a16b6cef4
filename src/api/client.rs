//! Label service API client implementation.
//!
//! This module provides the client for the label service REST API. It handles
//! authentication, request/response processing, and error mapping.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{header, Client, Response};
use tracing::{debug, error, info, instrument};

use super::auth::Auth;
use super::error::{ApiError, Result};
use super::types::{Label, LabelCreateRequest, LabelResponse, LabelsResponse};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// The label service client.
///
/// Provides async methods for fetching the label catalog and creating new
/// labels. Cloneable so background tasks can take their own handle.
#[derive(Debug, Clone)]
pub struct LabelsClient {
    /// The HTTP client.
    client: Client,
    /// The base URL for the label service.
    base_url: String,
    /// Authentication credentials.
    auth: Auth,
    /// Organization id sent with create requests, if the service requires one.
    org_id: Option<String>,
}

impl LabelsClient {
    /// Create a new client and validate the connection.
    ///
    /// Retrieves the API token from the OS keyring (or the environment
    /// fallback) and pings the service before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The token cannot be retrieved
    /// - The HTTP client cannot be built
    /// - The service does not respond to the health check
    #[instrument(skip_all, fields(url = %base_url))]
    pub async fn connect(base_url: &str, org_id: Option<String>) -> Result<Self> {
        info!("Creating label service client");

        let auth = Auth::load("default")?;
        let labels = Self::with_credentials(base_url, auth, org_id)?;
        labels.ping().await?;

        info!("Label service client created and connection validated");
        Ok(labels)
    }

    /// Create a client with explicit credentials.
    ///
    /// Does NOT validate the connection. Useful for testing or when the token
    /// is provided directly.
    pub fn with_credentials(base_url: &str, auth: Auth, org_id: Option<String>) -> Result<Self> {
        let client = Self::build_http_client()?;
        let base_url = normalize_base_url(base_url);

        Ok(Self {
            client,
            base_url,
            auth,
            org_id,
        })
    }

    /// Build the HTTP client with appropriate settings.
    fn build_http_client() -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(ApiError::Network)
    }

    /// The base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Validate the connection by calling the health endpoint.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<()> {
        debug!("Validating label service connection");

        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::ConnectionFailed(format!("{}: {}", self.base_url, e)))?;

        if !response.status().is_success() {
            error!(status = %response.status(), "Health check failed");
            return Err(ApiError::from_status(response.status(), "health check"));
        }

        Ok(())
    }

    /// Fetch the full label catalog.
    ///
    /// Calls `GET /api/v2/labels`.
    #[instrument(skip(self))]
    pub async fn get_labels(&self) -> Result<Vec<Label>> {
        let url = format!("{}/api/v2/labels", self.base_url);
        let response: LabelsResponse = self.get_json(&url, "labels").await?;
        debug!(count = response.labels.len(), "Fetched label catalog");
        Ok(response.labels)
    }

    /// Create a new label.
    ///
    /// Calls `POST /api/v2/labels` and returns the created label record as
    /// the service stored it (with its assigned id).
    #[instrument(skip(self, properties), fields(name = %name))]
    pub async fn create_label(
        &self,
        name: &str,
        properties: BTreeMap<String, String>,
    ) -> Result<Label> {
        let url = format!("{}/api/v2/labels", self.base_url);
        let body = LabelCreateRequest {
            name: name.to_string(),
            org_id: self.org_id.clone(),
            properties,
        };

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, self.auth.header_value())
            .json(&body)
            .send()
            .await?;

        let response = Self::check_status(response, name).await?;
        let created: LabelResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        info!(id = %created.label.id, "Created label");
        Ok(created.label)
    }

    /// Perform an authenticated GET request and deserialize the JSON body.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        context: &str,
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .header(header::AUTHORIZATION, self.auth.header_value())
            .send()
            .await?;

        let response = Self::check_status(response, context).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// Map a non-success response to an [`ApiError`].
    async fn check_status(response: Response, context: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Prefer the service's own message when it sends one.
        let body = response.text().await.unwrap_or_default();
        let detail = extract_error_message(&body).unwrap_or_else(|| context.to_string());
        error!(%status, %detail, "Label service request failed");
        Err(ApiError::from_status(status, &detail))
    }
}

/// Pull a human-readable message out of a service error body.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(String::from)
}

/// Normalize a base URL by trimming trailing slashes.
fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
