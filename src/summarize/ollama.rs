use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{ChatClient, ChatError, ChatRequest, ChatResponse};

pub const DEFAULT_HOST: &str = "http://localhost:11434";

/// Port Ollama listens on when a plain-http host names none
pub const DEFAULT_PORT: u16 = 11434;

/// Client for a local Ollama server
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<InstalledModel>,
}

/// A model installed on the Ollama server
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InstalledModel {
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Apply a request timeout. Without one, requests wait indefinitely.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ChatError> {
        self.client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Models installed on the server
    pub async fn list_models(&self) -> Result<Vec<InstalledModel>, ChatError> {
        let resp = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await?;

        let resp = check_status(resp).await?;
        let tags = resp.json::<TagsResponse>().await?;
        Ok(tags.models)
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new(DEFAULT_HOST)
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ChatError> {
        tracing::debug!(
            model = %request.model,
            url = %self.base_url,
            "Sending chat request to Ollama"
        );

        let resp = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .inspect_err(|e| tracing::debug!(error = %e, "Failed to make http request"))?;

        let resp = check_status(resp).await?;
        Ok(resp.json::<ChatResponse>().await?)
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ChatError> {
    if resp.status().is_success() {
        return Ok(resp);
    }

    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or(body);

    Err(ChatError::Response { status, message })
}
