use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{transport_error, CompletionClient, CompletionError, ResolvedEndpoint, MAX_TOKENS};
use crate::infra::prompts::SYSTEM_MESSAGE;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API を使用したクライアント
pub struct MessagesClient {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessageResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

impl MessagesClient {
    pub fn new(client: reqwest::Client, endpoint: ResolvedEndpoint, api_key: String) -> Self {
        Self {
            client,
            url: endpoint.url,
            model: endpoint.model,
            api_key,
        }
    }
}

#[async_trait]
impl CompletionClient for MessagesClient {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, CompletionError> {
        let request = MessageRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system: SYSTEM_MESSAGE,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            temperature,
        };

        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(self.name(), &e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::provider(
                self.name(),
                format!("{status} - {body}"),
            ));
        }

        let msg_response: MessageResponse = response.json().await.map_err(|e| {
            CompletionError::provider(self.name(), format!("Response parse error: {e}"))
        })?;

        let text = msg_response
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");
        let text = text.trim();

        if text.is_empty() {
            return Err(CompletionError::provider(
                self.name(),
                "Empty response from Anthropic API",
            ));
        }

        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}
