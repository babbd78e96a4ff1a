use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::provider::ProviderKind;

/// モデル未設定かつプロバイダー id が解釈できない場合のモデル
pub const FALLBACK_MODEL: &str = "gpt-4o";

/// プロバイダーごとの接続設定
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// 空文字は「未設定」
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// 出力の後処理の強さ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HumanizeLevel {
    Low,
    #[default]
    Standard,
    Aggressive,
}

impl HumanizeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Standard => "standard",
            Self::Aggressive => "aggressive",
        }
    }
}

impl FromStr for HumanizeLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "standard" => Ok(Self::Standard),
            "aggressive" => Ok(Self::Aggressive),
            other => Err(format!("unknown humanize level: {other}")),
        }
    }
}

impl fmt::Display for HumanizeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// アプリケーション設定（プロセス全体で1つ、JSON で永続化）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// 使用中のプロバイダー id（設定済みとは限らない）
    pub active_provider: String,
    /// テーマ名
    pub theme: String,
    /// プロバイダー id → 接続設定
    pub providers: BTreeMap<String, ProviderConfig>,
    pub humanize_level: HumanizeLevel,
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            active_provider: "openai".to_string(),
            theme: "opencode".to_string(),
            providers: BTreeMap::new(),
            humanize_level: HumanizeLevel::Standard,
            debug: false,
        }
    }
}

impl Settings {
    /// アクティブプロバイダーの設定（API キーが空なら None、モデル未設定ならデフォルトを補完）
    pub fn active_provider_config(&self) -> Option<ProviderConfig> {
        let config = self.providers.get(&self.active_provider)?;
        if !config.is_configured() {
            return None;
        }

        let model = config
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                self.active_provider
                    .parse::<ProviderKind>()
                    .map(|kind| kind.default_model())
                    .unwrap_or(FALLBACK_MODEL)
                    .to_string()
            });

        Some(ProviderConfig {
            api_key: config.api_key.clone(),
            model: Some(model),
            base_url: config.base_url.clone(),
        })
    }

    /// API キーが設定済みのプロバイダー id 一覧
    pub fn configured_providers(&self) -> Vec<String> {
        self.providers
            .iter()
            .filter(|(_, config)| config.is_configured())
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn has_any_provider_configured(&self) -> bool {
        self.providers.values().any(ProviderConfig::is_configured)
    }

    pub fn set_active_provider(&mut self, provider: &str) {
        self.active_provider = provider.to_string();
    }

    pub fn set_api_key(&mut self, provider: &str, api_key: &str) {
        self.providers.entry(provider.to_string()).or_default().api_key = api_key.to_string();
    }

    pub fn set_model(&mut self, provider: &str, model: &str) {
        self.providers.entry(provider.to_string()).or_default().model =
            non_blank(model);
    }

    pub fn set_base_url(&mut self, provider: &str, base_url: &str) {
        self.providers.entry(provider.to_string()).or_default().base_url =
            non_blank(base_url);
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
