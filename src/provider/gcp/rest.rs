//! Shared request and error handling for Google REST APIs.

use crate::provider::ExternalError;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Google API error envelope: `{"error": {"code", "message", "status"}}`
#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Long-running operation returned by create and delete calls
#[derive(Debug, Default, Deserialize)]
pub(super) struct Operation {
    #[serde(default)]
    pub name: String,
}

#[derive(Clone)]
pub(super) struct GcpRestClient {
    http: Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for GcpRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcpRestClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GcpRestClient {
    pub fn new(http: Client, base_url: &str, token: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ExternalError> {
        let response = self.send(self.http.get(self.url(path))).await?;
        decode(response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ExternalError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.send(self.http.post(self.url(path)).json(body)).await?;
        decode(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ExternalError> {
        self.send(self.http.delete(self.url(path))).await?;
        Ok(())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ExternalError> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| ExternalError::Transient(format!("request failed: {e}")))?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ExternalError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ExternalError::Transient(format!("invalid response body: {e}")))
}

async fn error_from_response(response: Response) -> ExternalError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), "GCP API error: {}", body);
    ExternalError::from_status(status.as_u16(), error_message(status.as_u16(), &body))
}

/// Human-readable message for an error response
pub(super) fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<GoogleErrorBody>(body) {
        Ok(parsed) if !parsed.error.message.is_empty() => {
            if parsed.error.status.is_empty() {
                parsed.error.message
            } else {
                format!("{} ({})", parsed.error.message, parsed.error.status)
            }
        }
        _ if body.trim().is_empty() => format!("HTTP {status}"),
        _ => format!("HTTP {status}: {}", body.trim()),
    }
}
