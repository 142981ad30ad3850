//! Euri AI client (OpenAI-compatible REST) with retry logic

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::ApiConfig;
use crate::error::{Error, Result};

/// Hosted inference API client with automatic retry
pub struct EuriClient {
    /// HTTP client
    client: Client,
    /// Configuration
    config: ApiConfig,
    /// Bearer token
    api_key: String,
    /// First retry delay, doubled on every further attempt
    retry_base: Duration,
}

#[derive(Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatTurn>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Clone, Serialize)]
struct ChatTurn {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone, Serialize)]
struct EmbedRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

/// Outcome of a failed attempt
enum Attempt {
    Retry(Error),
    Fatal(Error),
}

impl EuriClient {
    /// Create a new client. Fails when no API key is configured.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
            api_key,
            retry_base: Duration::from_secs(1),
        })
    }

    /// Override the initial retry delay
    pub fn with_retry_base(mut self, retry_base: Duration) -> Self {
        self.retry_base = retry_base;
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, Attempt>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(Attempt::Fatal(e)) => return Err(e),
                Err(Attempt::Retry(e)) => {
                    if attempt < self.config.max_retries {
                        let delay = self.retry_base * 2u32.pow(attempt);
                        tracing::warn!(
                            "Request failed (attempt {}/{}): {}; retrying in {:?}",
                            attempt + 1,
                            self.config.max_retries + 1,
                            e,
                            delay
                        );
                        sleep(delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::llm("Unknown error")))
    }

    /// Check if the API answers at all
    pub async fn health_check(&self) -> Result<bool> {
        let url = self.endpoint("models");

        match self.client.get(&url).bearer_auth(&self.api_key).send().await {
            Ok(response) => Ok(!response.status().is_server_error()),
            Err(_) => Ok(false),
        }
    }

    /// Send a single-message chat completion and return the reply text
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let url = self.endpoint("chat/completions");
        let request = ChatRequest {
            model: self.config.chat_model.clone(),
            messages: vec![ChatTurn {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        tracing::info!("Generating answer with model: {}", request.model);

        let response: ChatResponse = self
            .retry_request(|| {
                let client = self.client.clone();
                let url = url.clone();
                let api_key = self.api_key.clone();
                let request = request.clone();

                async move { post_json(&client, &url, &api_key, &request, Error::Llm).await }
            })
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| Error::llm("Response contained no choices"))
    }

    /// Embed a batch of texts; results follow the input order
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.endpoint("embeddings");
        let request = EmbedRequest {
            model: self.config.embedding_model.clone(),
            input: texts.to_vec(),
        };

        tracing::debug!("Embedding {} texts with {}", texts.len(), request.model);

        let response: EmbedResponse = self
            .retry_request(|| {
                let client = self.client.clone();
                let url = url.clone();
                let api_key = self.api_key.clone();
                let request = request.clone();

                async move { post_json(&client, &url, &api_key, &request, Error::Embedding).await }
            })
            .await?;

        if response.data.len() != texts.len() {
            return Err(Error::embedding(format!(
                "Expected {} embeddings, received {}",
                texts.len(),
                response.data.len()
            )));
        }

        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

async fn post_json<Req, Resp>(
    client: &Client,
    url: &str,
    api_key: &str,
    body: &Req,
    make_error: fn(String) -> Error,
) -> std::result::Result<Resp, Attempt>
where
    Req: Serialize,
    Resp: DeserializeOwned,
{
    let response = client
        .post(url)
        .bearer_auth(api_key)
        .json(body)
        .send()
        .await
        .map_err(|e| Attempt::Retry(make_error(format!("Request to {} failed: {}", url, e))))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let error = make_error(format!("HTTP {} - {}", status, body.trim()));
        return Err(if is_retryable(status) {
            Attempt::Retry(error)
        } else {
            Attempt::Fatal(error)
        });
    }

    response
        .json::<Resp>()
        .await
        .map_err(|e| Attempt::Fatal(make_error(format!("Failed to parse response: {}", e))))
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
