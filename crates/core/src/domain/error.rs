use serde::Serialize;

use super::provider::UnknownProvider;

/// アプリケーション共通エラーコード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    #[serde(rename = "E_EMPTY_INPUT")]
    EmptyInput,
    #[serde(rename = "E_UNKNOWN_TONE")]
    UnknownTone,
    #[serde(rename = "E_UNKNOWN_PROVIDER")]
    UnknownProvider,
    #[serde(rename = "E_NOT_CONFIGURED")]
    NotConfigured,
    #[serde(rename = "E_PROVIDER")]
    Provider,
    #[serde(rename = "E_INVALID_STATE")]
    InvalidState,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyInput => "E_EMPTY_INPUT",
            Self::UnknownTone => "E_UNKNOWN_TONE",
            Self::UnknownProvider => "E_UNKNOWN_PROVIDER",
            Self::NotConfigured => "E_NOT_CONFIGURED",
            Self::Provider => "E_PROVIDER",
            Self::InvalidState => "E_INVALID_STATE",
        }
    }
}

/// アプリケーションエラー（状態遷移の誤用・受け付けない入力）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub recoverable: bool,
}

impl AppError {
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::InvalidState,
            message: msg.into(),
            recoverable: true,
        }
    }

    /// 空入力（状態は変わらない）
    pub fn empty_input() -> Self {
        Self {
            code: ErrorCode::EmptyInput,
            message: "Please enter some text to refine".to_string(),
            recoverable: true,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {}

impl From<UnknownProvider> for AppError {
    fn from(e: UnknownProvider) -> Self {
        Self {
            code: ErrorCode::UnknownProvider,
            message: e.to_string(),
            recoverable: true,
        }
    }
}
