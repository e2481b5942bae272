use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{Classifier, ClassifierResult};

pub const DEFAULT_ENDPOINT: &str = "https://flower-safety-api.vercel.app/flower-check";

#[derive(Serialize)]
struct FlowerCheckRequest<'a> {
    flower: &'a str,
}

/// Why a flower check didn't produce a payload. Logged, never shown.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("endpoint returned status {0}")]
    Status(StatusCode),
    #[error("response body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response body is JSON null")]
    NullPayload,
}

/// Client for the `POST /flower-check` endpoint
#[derive(Clone)]
pub struct FlowerCheckClient {
    client: Client,
    endpoint: String,
}

impl FlowerCheckClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send the query verbatim and decode whatever JSON comes back
    pub async fn check(&self, flower: &str) -> Result<Value, ClassifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(&FlowerCheckRequest { flower })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifyError::Status(status));
        }

        let body = response.bytes().await?;
        let payload: Value = serde_json::from_slice(&body)?;
        if payload.is_null() {
            return Err(ClassifyError::NullPayload);
        }

        Ok(payload)
    }
}

#[async_trait]
impl Classifier for FlowerCheckClient {
    async fn classify(&self, flower_query: &str) -> ClassifierResult {
        match self.check(flower_query).await {
            Ok(payload) => {
                debug!(endpoint = %self.endpoint, "flower check answered");
                ClassifierResult::from_payload(payload)
            }
            Err(err) => {
                warn!(endpoint = %self.endpoint, error = %err, "flower check failed");
                ClassifierResult::Failed
            }
        }
    }
}
