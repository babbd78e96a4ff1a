use std::sync::Arc;

use crate::domain::error::ErrorCode;
use crate::domain::provider::UnknownProvider;
use crate::domain::settings::HumanizeLevel;
use crate::domain::tone;
use crate::domain::types::RefinementResult;
use crate::infra::completion::{ClientConfig, CompletionError, ProviderRegistry, DEFAULT_TEMPERATURE};
use crate::infra::post_processor::PostProcessor;
use crate::infra::prompts;
use crate::infra::storage::SettingsStore;

/// リライト処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefineError {
    #[error("Please enter some text to refine")]
    EmptyInput,
    #[error("Unknown tone: {0}")]
    UnknownTone(String),
    #[error("No AI provider configured for {provider}. Run /settings to configure.")]
    NotConfigured { provider: String },
    #[error(transparent)]
    UnknownProvider(#[from] UnknownProvider),
    #[error("{provider} API error: {message}")]
    Provider { provider: String, message: String },
}

impl RefineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyInput => ErrorCode::EmptyInput,
            Self::UnknownTone(_) => ErrorCode::UnknownTone,
            Self::NotConfigured { .. } => ErrorCode::NotConfigured,
            Self::UnknownProvider(_) => ErrorCode::UnknownProvider,
            Self::Provider { .. } => ErrorCode::Provider,
        }
    }
}

impl From<CompletionError> for RefineError {
    fn from(e: CompletionError) -> Self {
        match e {
            CompletionError::UnknownProvider(unknown) => Self::UnknownProvider(unknown),
            CompletionError::Provider { provider, message } => Self::Provider { provider, message },
        }
    }
}

/// refine_with の追加オプション
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefineOptions {
    /// プロンプトに追加する指示
    pub custom_instructions: Option<String>,
    /// 指定時のみ補完結果に後処理をかける
    pub humanize: Option<HumanizeLevel>,
    /// レポートを付けるか（未指定なら設定の debug に従う）
    pub debug: Option<bool>,
}

/// リライトのオーケストレーター: 設定 → プロンプト → 補完
pub struct Refiner {
    settings: Arc<SettingsStore>,
    registry: Arc<dyn ProviderRegistry>,
}

impl Refiner {
    pub fn new(settings: Arc<SettingsStore>, registry: Arc<dyn ProviderRegistry>) -> Self {
        Self { settings, registry }
    }

    /// テキストを指定トーンでリライトする（補完結果はトリムのみ）
    pub async fn refine(&self, text: &str, tone_id: &str) -> Result<RefinementResult, RefineError> {
        self.refine_with(text, tone_id, &RefineOptions::default()).await
    }

    pub async fn refine_with(
        &self,
        text: &str,
        tone_id: &str,
        options: &RefineOptions,
    ) -> Result<RefinementResult, RefineError> {
        if text.trim().is_empty() {
            return Err(RefineError::EmptyInput);
        }

        let tone = tone::find(tone_id).ok_or_else(|| RefineError::UnknownTone(tone_id.to_string()))?;

        let settings = self.settings.current();
        let provider_config = settings.active_provider_config().ok_or_else(|| {
            RefineError::NotConfigured {
                provider: settings.active_provider.clone(),
            }
        })?;

        let client = self.registry.create_client(&ClientConfig {
            provider: settings.active_provider.clone(),
            api_key: provider_config.api_key,
            model: provider_config.model,
            base_url: provider_config.base_url,
        })?;

        let prompt = prompts::build_prompt_with_instructions(
            text,
            &tone.id,
            &tone.instruction,
            options.custom_instructions.as_deref(),
        );

        log::info!(
            "リライト開始: provider={}, tone={}, {} 文字",
            client.name(),
            tone.id,
            text.chars().count()
        );

        let completion = client.complete(&prompt, DEFAULT_TEMPERATURE).await?;

        let (refined, report) = match options.humanize {
            Some(level) => {
                let (processed, report) = PostProcessor::process_with_report(&completion, level);
                let debug = options.debug.unwrap_or(settings.debug);
                (processed, debug.then_some(report))
            }
            None => (completion.trim().to_string(), None),
        };

        if refined.is_empty() {
            log::warn!("後処理の結果が空になりました: provider={}", client.name());
            return Err(RefineError::Provider {
                provider: client.name().to_string(),
                message: "No content returned in response".to_string(),
            });
        }

        log::debug!("リライト完了: {} 文字", refined.chars().count());

        Ok(RefinementResult {
            original: text.to_string(),
            refined,
            tone,
            report,
        })
    }
}
