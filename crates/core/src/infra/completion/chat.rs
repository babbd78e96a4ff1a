use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{transport_error, CompletionClient, CompletionError, ResolvedEndpoint, MAX_TOKENS};
use crate::infra::prompts::SYSTEM_MESSAGE;

/// OpenAI 互換 `/chat/completions` を話すクライアント（ベース URL だけが異なる）
pub struct ChatCompletionsClient {
    client: reqwest::Client,
    provider: &'static str,
    url: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatCompletionsClient {
    pub fn new(client: reqwest::Client, endpoint: ResolvedEndpoint, api_key: String) -> Self {
        Self {
            client,
            provider: endpoint.kind.id(),
            url: endpoint.url,
            model: endpoint.model,
            api_key,
        }
    }
}

#[async_trait]
impl CompletionClient for ChatCompletionsClient {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_MESSAGE,
                },
                Message {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(self.provider, &e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::provider(
                self.provider,
                format!("{status} - {body}"),
            ));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            CompletionError::provider(self.provider, format!("Response parse error: {e}"))
        })?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(CompletionError::provider(
                self.provider,
                "No content returned in response",
            ));
        }

        Ok(content)
    }

    fn name(&self) -> &str {
        self.provider
    }
}
