use crate::types::{DetectionReport, SentenceParaphrase};
use crate::{ModelProvider, ProviderError};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

// Model calls are slow on long inputs; give them room before reqwest cuts
// the connection.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// HTTP client for the two model services: a bearer-token detection API and
/// a paraphrase model server. Built once at startup and shared via state.
pub struct ModelClient {
    http: reqwest::Client,
    detection_endpoint: String,
    detection_api_key: String,
    paraphrase_endpoint: String,
    paraphrase_api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ParaphraseResponse {
    #[serde(default)]
    sentences: Vec<SentenceParaphrase>,
}

impl ModelClient {
    pub fn new(
        detection_endpoint: String,
        detection_api_key: String,
        paraphrase_endpoint: String,
        paraphrase_api_key: Option<String>,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            detection_endpoint,
            detection_api_key,
            paraphrase_endpoint,
            paraphrase_api_key,
        })
    }
}

#[async_trait]
impl ModelProvider for ModelClient {
    async fn detect(&self, text: &str) -> Result<DetectionReport, ProviderError> {
        let resp = self
            .http
            .post(&self.detection_endpoint)
            .header("Authorization", format!("Bearer {}", self.detection_api_key))
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!("Detection service returned {}", status);
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }

    async fn paraphrase(&self, text: &str) -> Result<Vec<SentenceParaphrase>, ProviderError> {
        let mut req = self
            .http
            .post(&self.paraphrase_endpoint)
            .json(&serde_json::json!({ "text": text }));
        if let Some(key) = &self.paraphrase_api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }
        let resp = req.send().await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!("Paraphrase service returned {}", status);
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let data: ParaphraseResponse = resp.json().await?;
        Ok(data.sentences)
    }
}
