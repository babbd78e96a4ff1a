use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{ClientConfig, CompletionClient, CompletionError, ProviderRegistry};

/// FixedClient: 決まった結果を返すスタブ実装。
/// ネットワークなしでリライトの流れを動かすために使う。
#[derive(Clone)]
pub struct FixedClient {
    name: String,
    outcome: Result<String, CompletionError>,
    delay: Option<Duration>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl FixedClient {
    pub fn ok(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: Ok(text.into()),
            delay: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(name: impl Into<String>, message: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            outcome: Err(CompletionError::provider(name.clone(), message)),
            name,
            delay: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 応答を返す前に待つ（実行中の操作を確かめる用）
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// これまでに受け取ったプロンプト
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl CompletionClient for FixedClient {
    async fn complete(&self, prompt: &str, _temperature: f32) -> Result<String, CompletionError> {
        self.prompts.lock().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone().map(|text| text.trim().to_string())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// どの設定に対しても同じ FixedClient を返すレジストリ。
/// プロバイダー id の検証は本番のレジストリと同じく行う。
#[derive(Clone)]
pub struct FixedRegistry {
    client: FixedClient,
    configs: Arc<Mutex<Vec<ClientConfig>>>,
}

impl FixedRegistry {
    pub fn new(client: FixedClient) -> Self {
        Self {
            client,
            configs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn client(&self) -> &FixedClient {
        &self.client
    }

    /// create_client に渡された設定
    pub fn configs(&self) -> Vec<ClientConfig> {
        self.configs.lock().clone()
    }
}

impl ProviderRegistry for FixedRegistry {
    fn create_client(
        &self,
        config: &ClientConfig,
    ) -> Result<Box<dyn CompletionClient>, CompletionError> {
        config.resolve()?;
        self.configs.lock().push(config.clone());
        Ok(Box::new(self.client.clone()))
    }
}
