//! OpenAI chat-completions client.

use super::Completion;
use crate::protocol::{ChatRequest, ChatResponse};
use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Client for `POST {api_base}/chat/completions`.
pub struct OpenAIClient {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl OpenAIClient {
    /// Create a new client.
    pub fn new(api_base: &str, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            endpoint: format!("{}/chat/completions", api_base.trim_end_matches('/')),
            api_key,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one request and classify the response.
    pub async fn complete(&self, request: &ChatRequest) -> Result<Completion> {
        info!(model = %request.model, "Sending chat completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .context("Failed to connect to OpenAI API")?;

        let status = response.status();
        debug!(%status, "Received response");

        if !status.is_success() {
            let body = response
                .text()
                .await
                .context("Failed to read OpenAI error body")?;
            return Ok(Completion::Failed {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI response")?;

        let completion = match chat_response.into_choices().into_iter().next() {
            Some(choice) => Completion::Reply(
                choice
                    .message
                    .content
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
            ),
            None => Completion::Empty,
        };

        Ok(completion)
    }
}
