pub mod anthropic;
pub mod chat;
mod fixed;

pub use fixed::{FixedClient, FixedRegistry};

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::provider::{ProviderKind, UnknownProvider, WireFormat};

/// リライト時の温度
pub const DEFAULT_TEMPERATURE: f32 = 0.4;
/// 1リクエストの最大出力トークン数
pub const MAX_TOKENS: u32 = 2000;
/// HTTP リクエストの上限時間
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// 補完エラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error(transparent)]
    UnknownProvider(#[from] UnknownProvider),
    #[error("{provider} API error: {message}")]
    Provider { provider: String, message: String },
}

impl CompletionError {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// クライアント生成に使う設定（永続化しない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub provider: String,
    pub api_key: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

/// デフォルト値を解決した接続先
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub kind: ProviderKind,
    pub url: String,
    pub model: String,
}

impl ClientConfig {
    /// 明示的な baseUrl / model はプロバイダーのデフォルトより常に優先する
    pub fn resolve(&self) -> Result<ResolvedEndpoint, UnknownProvider> {
        let kind: ProviderKind = self.provider.parse()?;

        let base_url = explicit(&self.base_url).unwrap_or(kind.default_base_url());
        let model = explicit(&self.model).unwrap_or(kind.default_model());

        let path = match kind.wire_format() {
            WireFormat::ChatCompletions => "/chat/completions",
            WireFormat::Messages => "/messages",
        };

        Ok(ResolvedEndpoint {
            kind,
            url: join_endpoint(base_url, path),
            model: model.to_string(),
        })
    }
}

fn explicit(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// ベース URL にエンドポイントのパスを付ける（既に付いていればそのまま）
pub fn join_endpoint(base_url: &str, path: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.ends_with(path) {
        trimmed.to_string()
    } else {
        format!("{trimmed}{path}")
    }
}

/// 補完クライアント trait（プロバイダーごとに実装する）
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// プロンプトを送り、前後の空白を除いた補完テキストを返す。リトライはしない。
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, CompletionError>;

    fn name(&self) -> &str;
}

/// 設定から補完クライアントを生成する
pub trait ProviderRegistry: Send + Sync {
    fn create_client(
        &self,
        config: &ClientConfig,
    ) -> Result<Box<dyn CompletionClient>, CompletionError>;
}

/// HTTP 経由で実際のプロバイダーに接続するレジストリ
pub struct HttpProviderRegistry {
    timeout: Duration,
}

impl HttpProviderRegistry {
    pub fn new() -> Self {
        Self {
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderRegistry for HttpProviderRegistry {
    fn create_client(
        &self,
        config: &ClientConfig,
    ) -> Result<Box<dyn CompletionClient>, CompletionError> {
        let endpoint = config.resolve()?;
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| {
                CompletionError::provider(endpoint.kind.id(), format!("HTTP client init failed: {e}"))
            })?;

        log::debug!(
            "補完クライアント生成: provider={} model={} url={}",
            endpoint.kind,
            endpoint.model,
            endpoint.url
        );

        let client: Box<dyn CompletionClient> = match endpoint.kind.wire_format() {
            WireFormat::ChatCompletions => Box::new(chat::ChatCompletionsClient::new(
                http,
                endpoint,
                config.api_key.clone(),
            )),
            WireFormat::Messages => Box::new(anthropic::MessagesClient::new(
                http,
                endpoint,
                config.api_key.clone(),
            )),
        };
        Ok(client)
    }
}

/// reqwest のエラーを補完エラーに変換する
pub(crate) fn transport_error(provider: &str, e: &reqwest::Error) -> CompletionError {
    if e.is_timeout() {
        CompletionError::provider(provider, "request timed out")
    } else {
        CompletionError::provider(provider, format!("HTTP request failed: {e}"))
    }
}
