use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// 対応プロバイダー（閉じた列挙）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    OpenAi,
    Groq,
    Nvidia,
    Xai,
    Anthropic,
    Together,
    OpenRouter,
    Ollama,
    Custom,
}

/// リクエスト/レスポンスの形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// OpenAI 互換 `/chat/completions`
    ChatCompletions,
    /// Anthropic `/messages`
    Messages,
}

pub const SUPPORTED_IDS: &str =
    "openai, groq, nvidia, xai/grok, anthropic, together, openrouter, ollama, custom";

/// 未知のプロバイダー id
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown AI provider: {0}. Supported: {SUPPORTED_IDS}")]
pub struct UnknownProvider(pub String);

impl ProviderKind {
    pub const ALL: [ProviderKind; 9] = [
        Self::OpenAi,
        Self::Groq,
        Self::Nvidia,
        Self::Xai,
        Self::Anthropic,
        Self::Together,
        Self::OpenRouter,
        Self::Ollama,
        Self::Custom,
    ];

    /// 設定ファイルで使う正規 id
    pub fn id(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Groq => "groq",
            Self::Nvidia => "nvidia",
            Self::Xai => "xai",
            Self::Anthropic => "anthropic",
            Self::Together => "together",
            Self::OpenRouter => "openrouter",
            Self::Ollama => "ollama",
            Self::Custom => "custom",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Groq => "Groq",
            Self::Nvidia => "NVIDIA NIM",
            Self::Xai => "xAI/Grok",
            Self::Anthropic => "Anthropic",
            Self::Together => "Together AI",
            Self::OpenRouter => "OpenRouter",
            Self::Ollama => "Ollama",
            Self::Custom => "Custom",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAi | Self::Custom => "https://api.openai.com/v1",
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::Nvidia => "https://integrate.api.nvidia.com/v1",
            Self::Xai => "https://api.x.ai/v1",
            Self::Anthropic => "https://api.anthropic.com/v1",
            Self::Together => "https://api.together.xyz/v1",
            Self::OpenRouter => "https://openrouter.ai/api/v1",
            Self::Ollama => "http://localhost:11434/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi | Self::Custom => "gpt-4o",
            Self::Groq => "llama-3.3-70b-versatile",
            Self::Nvidia => "meta/llama-3.1-70b-instruct",
            Self::Xai => "grok-beta",
            Self::Anthropic => "claude-sonnet-4-20250514",
            Self::Together => "meta-llama/Llama-3.3-70B-Instruct-Turbo",
            Self::OpenRouter => "openai/gpt-4o",
            Self::Ollama => "llama3.1",
        }
    }

    pub fn wire_format(&self) -> WireFormat {
        match self {
            Self::Anthropic => WireFormat::Messages,
            _ => WireFormat::ChatCompletions,
        }
    }
}

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "groq" => Ok(Self::Groq),
            "nvidia" | "nim" => Ok(Self::Nvidia),
            "xai" | "grok" => Ok(Self::Xai),
            "anthropic" => Ok(Self::Anthropic),
            "together" => Ok(Self::Together),
            "openrouter" => Ok(Self::OpenRouter),
            "ollama" => Ok(Self::Ollama),
            "custom" => Ok(Self::Custom),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
