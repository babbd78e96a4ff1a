use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::error::ErrorCode;
use crate::domain::provider::ProviderKind;
use crate::domain::settings::HumanizeLevel;
use crate::domain::tone::{self, ToneDefinition};
use crate::domain::types::{PostProcessReport, THEMES};
use crate::infra::completion::ProviderRegistry;
use crate::infra::storage::SettingsStore;
use crate::usecase::refine::{RefineOptions, Refiner};

/// tone 未指定時のトーン
const DEFAULT_TONE: &str = "professional";

/// API キーを含まない設定ビュー
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeSettings {
    pub active_provider: String,
    pub theme: String,
    pub providers: BTreeMap<String, ProviderStatus>,
    pub humanize_level: HumanizeLevel,
    pub debug: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// 設定更新リクエスト（全項目任意）
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub active_provider: Option<String>,
    pub theme: Option<String>,
    pub provider: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub humanize_level: Option<HumanizeLevel>,
    pub debug: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineRequest {
    #[serde(default)]
    pub text: String,
    pub tone: Option<String>,
    pub custom_instructions: Option<String>,
    pub humanize_level: Option<HumanizeLevel>,
    pub debug: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refined: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<ToneDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(rename = "postprocessReport", skip_serializing_if = "Option::is_none")]
    pub postprocess_report: Option<PostProcessReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    pub default_model: String,
}

/// 外部 UI 向けの操作群。失敗は success=false で返し、パニックしない。
pub struct CompanionApi {
    settings: Arc<SettingsStore>,
    refiner: Refiner,
}

impl CompanionApi {
    pub fn new(settings: Arc<SettingsStore>, registry: Arc<dyn ProviderRegistry>) -> Self {
        Self {
            refiner: Refiner::new(settings.clone(), registry),
            settings,
        }
    }

    pub fn tones(&self) -> Vec<ToneDefinition> {
        tone::all()
    }

    pub fn providers(&self) -> Vec<ProviderInfo> {
        ProviderKind::ALL
            .iter()
            .map(|kind| ProviderInfo {
                id: kind.id().to_string(),
                name: kind.display_name().to_string(),
                default_model: kind.default_model().to_string(),
            })
            .collect()
    }

    pub fn get_settings(&self) -> SafeSettings {
        let settings = self.settings.current();

        let mut providers: BTreeMap<String, ProviderStatus> = ProviderKind::ALL
            .iter()
            .map(|kind| (kind.id().to_string(), ProviderStatus { configured: false, model: None }))
            .collect();
        for (id, config) in &settings.providers {
            providers.insert(
                id.clone(),
                ProviderStatus {
                    configured: config.is_configured(),
                    model: config.model.clone(),
                },
            );
        }

        SafeSettings {
            active_provider: settings.active_provider,
            theme: settings.theme,
            providers,
            humanize_level: settings.humanize_level,
            debug: settings.debug,
        }
    }

    /// 検証を通った場合のみまとめて保存する
    pub fn update_settings(&self, update: SettingsUpdate) -> UpdateResponse {
        match self.apply_update(update) {
            Ok(()) => UpdateResponse {
                success: true,
                error: None,
            },
            Err(message) => {
                log::warn!("設定更新を拒否: {message}");
                UpdateResponse {
                    success: false,
                    error: Some(message),
                }
            }
        }
    }

    fn apply_update(&self, update: SettingsUpdate) -> Result<(), String> {
        let active = update
            .active_provider
            .as_deref()
            .map(|p| p.parse::<ProviderKind>().map_err(|e| e.to_string()))
            .transpose()?;

        if let Some(theme) = update.theme.as_deref() {
            if !THEMES.contains(&theme) {
                return Err(format!("Unknown theme: {theme}"));
            }
        }

        let provider = update
            .provider
            .as_deref()
            .map(|p| p.parse::<ProviderKind>().map_err(|e| e.to_string()))
            .transpose()?;

        self.settings.update(|s| {
            if let Some(kind) = active {
                s.set_active_provider(kind.id());
            }
            if let Some(theme) = update.theme {
                s.theme = theme;
            }
            if let Some(kind) = provider {
                if let Some(api_key) = update.api_key.as_deref() {
                    s.set_api_key(kind.id(), api_key.trim());
                }
                if let Some(model) = update.model.as_deref() {
                    s.set_model(kind.id(), model);
                }
                if let Some(base_url) = update.base_url.as_deref() {
                    s.set_base_url(kind.id(), base_url);
                }
            }
            if let Some(level) = update.humanize_level {
                s.humanize_level = level;
            }
            if let Some(debug) = update.debug {
                s.debug = debug;
            }
        });
        Ok(())
    }

    /// リライトを実行する。後処理は常に行い、レベル未指定なら設定値を使う。
    pub async fn refine(&self, request: RefineRequest) -> RefineResponse {
        let tone_id = request
            .tone
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TONE);

        let options = RefineOptions {
            custom_instructions: request.custom_instructions,
            humanize: Some(
                request
                    .humanize_level
                    .unwrap_or_else(|| self.settings.current().humanize_level),
            ),
            debug: request.debug,
        };

        match self.refiner.refine_with(request.text.trim(), tone_id, &options).await {
            Ok(result) => RefineResponse {
                success: true,
                original: Some(result.original),
                refined: Some(result.refined),
                tone: Some(result.tone),
                error: None,
                error_code: None,
                postprocess_report: result.report,
            },
            Err(e) => {
                log::warn!("リライト失敗 ({}): {e}", e.code().as_str());
                RefineResponse {
                    success: false,
                    original: None,
                    refined: None,
                    tone: None,
                    error: Some(e.to_string()),
                    error_code: Some(e.code()),
                    postprocess_report: None,
                }
            }
        }
    }
}
