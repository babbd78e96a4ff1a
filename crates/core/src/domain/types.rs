use serde::{Deserialize, Serialize};

use super::tone::ToneDefinition;

/// 選択可能なテーマ名（配色データは表示層が持つ）
pub const THEMES: &[&str] = &[
    "opencode",
    "dracula",
    "nord",
    "tokyo-night",
    "gruvbox",
    "catppuccin",
    "monokai",
    "github-dark",
    "solarized-dark",
];

/// リライト結果（1回のやり取りの間だけ保持）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementResult {
    pub original: String,
    pub refined: String,
    pub tone: ToneDefinition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<PostProcessReport>,
}

/// 後処理のデバッグレポート（本文は含まない）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostProcessReport {
    pub humanize_level: String,
    pub passes: u32,
    pub editorial_markers_found: usize,
    pub banned_word_replacements: usize,
    pub emoji_list_items_removed: usize,
    pub em_dashes_found: usize,
    /// 定型の投稿構成をほぐしたパス数
    pub linkedin_softened: usize,
    pub final_length: usize,
}
