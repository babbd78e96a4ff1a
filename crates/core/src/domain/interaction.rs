use std::fmt;

use serde::Serialize;

use super::error::AppError;
use super::tone::{self, ToneDefinition};
use super::types::{RefinementResult, THEMES};

/// 対話状態（常にどれか1つだけが現在の状態）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionState {
    Input {
        draft: String,
    },
    ToneSelect {
        text: String,
        selected: usize,
    },
    /// リライト要求が処理中の唯一の状態
    Generating {
        text: String,
        tone: ToneDefinition,
    },
    Output {
        original: String,
        refined: String,
        tone: ToneDefinition,
    },
    Settings,
    ThemeSelect {
        selected: usize,
    },
    Error {
        message: String,
    },
}

impl InteractionState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Input { .. } => "input",
            Self::ToneSelect { .. } => "tone_select",
            Self::Generating { .. } => "generating",
            Self::Output { .. } => "output",
            Self::Settings => "settings",
            Self::ThemeSelect { .. } => "theme_select",
            Self::Error { .. } => "error",
        }
    }

    fn input() -> Self {
        Self::Input {
            draft: String::new(),
        }
    }
}

/// 入力欄から実行できるコマンド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Settings,
    Theme,
}

impl Command {
    pub const ALL: [Command; 2] = [Self::Settings, Self::Theme];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Settings => "/settings",
            Self::Theme => "/theme",
        }
    }

    /// 先頭が `/` の入力をコマンドとして解釈する（前置きの空白があれば本文扱い）。
    /// コマンドでなければ None。
    pub fn parse(input: &str) -> Option<Result<Command, String>> {
        if !input.starts_with('/') {
            return None;
        }
        let command = input.trim();
        let found = Self::ALL.into_iter().find(|c| c.name() == command);
        Some(found.ok_or_else(|| command.to_string()))
    }
}

/// 状態遷移の記録
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateTransition {
    pub prev_state: String,
    pub new_state: InteractionState,
}

/// 対話ステートマシン（状態の唯一の所有者。遷移関数だけが状態を変更する）
pub struct InteractionMachine {
    state: InteractionState,
}

impl InteractionMachine {
    pub fn new() -> Self {
        Self {
            state: InteractionState::input(),
        }
    }

    /// 起動時: 設定済みプロバイダーが無ければ settings から始める
    pub fn for_startup(has_configured_provider: bool) -> Self {
        if has_configured_provider {
            Self::new()
        } else {
            Self {
                state: InteractionState::Settings,
            }
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.state, InteractionState::Generating { .. })
    }

    fn transition(&mut self, next: InteractionState) -> StateTransition {
        let prev = self.state.as_str().to_string();
        self.state = next;
        StateTransition {
            prev_state: prev,
            new_state: self.state.clone(),
        }
    }

    fn rejected(&self, action: &str) -> AppError {
        AppError::invalid_state(format!(
            "{action} は {} 状態では実行できません",
            self.state.as_str()
        ))
    }

    /// input: テキスト送信。空入力は状態を変えずにエラーを返す。
    pub fn submit(&mut self, text: &str) -> Result<StateTransition, AppError> {
        if !matches!(self.state, InteractionState::Input { .. }) {
            return Err(self.rejected("submit"));
        }

        if text.trim().is_empty() {
            return Err(AppError::empty_input());
        }

        let next = match Command::parse(text) {
            Some(Ok(Command::Settings)) => InteractionState::Settings,
            Some(Ok(Command::Theme)) => InteractionState::ThemeSelect { selected: 0 },
            Some(Err(unknown)) => InteractionState::Error {
                message: format!("Unknown command: {unknown}"),
            },
            None => InteractionState::ToneSelect {
                text: text.to_string(),
                selected: 0,
            },
        };

        Ok(self.transition(next))
    }

    /// tone_select / theme_select: カーソル位置を指定（範囲外は末尾に丸める）
    pub fn set_selection(&mut self, index: usize) -> Result<(), AppError> {
        match &mut self.state {
            InteractionState::ToneSelect { selected, .. } => {
                *selected = index.min(tone::count() - 1);
                Ok(())
            }
            InteractionState::ThemeSelect { selected } => {
                *selected = index.min(THEMES.len() - 1);
                Ok(())
            }
            _ => Err(self.rejected("set_selection")),
        }
    }

    /// tone_select / theme_select: 番号でカーソルを指定（範囲外は拒否）
    pub fn select(&mut self, index: usize) -> Result<(), AppError> {
        let len = match &self.state {
            InteractionState::ToneSelect { .. } => tone::count(),
            InteractionState::ThemeSelect { .. } => THEMES.len(),
            _ => return Err(self.rejected("select")),
        };
        if index >= len {
            return Err(AppError::invalid_state(format!(
                "選択番号 {index} は範囲外です（{len} 件）"
            )));
        }
        self.set_selection(index)
    }

    /// tone_select / theme_select: カーソル移動（端で止まる）
    pub fn move_selection(&mut self, delta: isize) -> Result<(), AppError> {
        let current = match &self.state {
            InteractionState::ToneSelect { selected, .. }
            | InteractionState::ThemeSelect { selected } => *selected,
            _ => return Err(self.rejected("move_selection")),
        };
        self.set_selection(current.saturating_add_signed(delta))
    }

    /// tone_select → generating
    pub fn confirm_tone(&mut self, index: usize) -> Result<StateTransition, AppError> {
        let text = match &self.state {
            InteractionState::ToneSelect { text, .. } => text.clone(),
            _ => return Err(self.rejected("confirm_tone")),
        };
        let tone = tone::by_index(index).ok_or_else(|| {
            AppError::invalid_state(format!("トーン番号 {index} は範囲外です"))
        })?;

        Ok(self.transition(InteractionState::Generating { text, tone }))
    }

    /// theme_select → input。保存すべきテーマ名を返す。
    pub fn confirm_theme(&mut self, index: usize) -> Result<(StateTransition, &'static str), AppError> {
        if !matches!(self.state, InteractionState::ThemeSelect { .. }) {
            return Err(self.rejected("confirm_theme"));
        }
        let theme = THEMES.get(index).copied().ok_or_else(|| {
            AppError::invalid_state(format!("テーマ番号 {index} は範囲外です"))
        })?;

        Ok((self.transition(InteractionState::input()), theme))
    }

    /// 現在のカーソル位置で確定（tone_select / theme_select 共通）
    pub fn selected_index(&self) -> Option<usize> {
        match &self.state {
            InteractionState::ToneSelect { selected, .. }
            | InteractionState::ThemeSelect { selected } => Some(*selected),
            _ => None,
        }
    }

    /// キャンセル: tone_select は下書きを戻して input へ、theme_select / settings は input へ
    pub fn cancel(&mut self) -> Result<StateTransition, AppError> {
        let next = match &self.state {
            InteractionState::ToneSelect { text, .. } => InteractionState::Input {
                draft: text.clone(),
            },
            InteractionState::ThemeSelect { .. } | InteractionState::Settings => {
                InteractionState::input()
            }
            _ => return Err(self.rejected("cancel")),
        };

        Ok(self.transition(next))
    }

    /// settings → input
    pub fn close_settings(&mut self) -> Result<StateTransition, AppError> {
        match self.state {
            InteractionState::Settings => Ok(self.transition(InteractionState::input())),
            _ => Err(self.rejected("close_settings")),
        }
    }

    /// generating → output / error
    pub fn on_refine_done<E: fmt::Display>(
        &mut self,
        outcome: Result<RefinementResult, E>,
    ) -> Result<StateTransition, AppError> {
        if !self.is_generating() {
            return Err(self.rejected("on_refine_done"));
        }

        let next = match outcome {
            Ok(result) => InteractionState::Output {
                original: result.original,
                refined: result.refined,
                tone: result.tone,
            },
            Err(e) => InteractionState::Error {
                message: e.to_string(),
            },
        };

        Ok(self.transition(next))
    }

    /// output → input（テキストをクリア）
    pub fn new_text(&mut self) -> Result<StateTransition, AppError> {
        match self.state {
            InteractionState::Output { .. } => Ok(self.transition(InteractionState::input())),
            _ => Err(self.rejected("new_text")),
        }
    }

    /// error → input
    pub fn acknowledge(&mut self) -> Result<StateTransition, AppError> {
        match self.state {
            InteractionState::Error { .. } => Ok(self.transition(InteractionState::input())),
            _ => Err(self.rejected("acknowledge")),
        }
    }
}

impl Default for InteractionMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;

    fn refined(original: &str, text: &str) -> RefinementResult {
        RefinementResult {
            original: original.to_string(),
            refined: text.to_string(),
            tone: tone::find("formal").unwrap(),
            report: None,
        }
    }

    fn generating() -> InteractionMachine {
        let mut m = InteractionMachine::new();
        m.submit("hello there").unwrap();
        m.confirm_tone(0).unwrap();
        m
    }

    #[test]
    fn test_input_to_tone_select() {
        let mut m = InteractionMachine::new();
        let t = m.submit("i seen him").unwrap();
        assert_eq!(t.prev_state, "input");
        assert_eq!(
            t.new_state,
            InteractionState::ToneSelect {
                text: "i seen him".to_string(),
                selected: 0
            }
        );
    }

    #[test]
    fn test_empty_submit_stays_in_input() {
        let mut m = InteractionMachine::new();
        let err = m.submit("   \n").unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyInput);
        assert_eq!(m.state().as_str(), "input");
    }

    #[test]
    fn test_commands() {
        let mut m = InteractionMachine::new();
        assert_eq!(m.submit("/settings").unwrap().new_state, InteractionState::Settings);
        m.close_settings().unwrap();

        let t = m.submit("/theme ").unwrap();
        assert_eq!(t.new_state, InteractionState::ThemeSelect { selected: 0 });
        m.cancel().unwrap();

        let t = m.submit("/bogus").unwrap();
        assert_eq!(
            t.new_state,
            InteractionState::Error {
                message: "Unknown command: /bogus".to_string()
            }
        );
        assert_eq!(m.acknowledge().unwrap().new_state.as_str(), "input");
    }

    #[test]
    fn test_cancel_tone_select_restores_draft() {
        let mut m = InteractionMachine::new();
        m.submit("draft text").unwrap();
        let t = m.cancel().unwrap();
        assert_eq!(
            t.new_state,
            InteractionState::Input {
                draft: "draft text".to_string()
            }
        );
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut m = InteractionMachine::new();
        m.submit("text").unwrap();
        m.move_selection(-3).unwrap();
        assert_eq!(m.selected_index(), Some(0));
        m.move_selection(100).unwrap();
        assert_eq!(m.selected_index(), Some(tone::count() - 1));
    }

    #[test]
    fn test_leading_space_makes_command_plain_text() {
        assert_eq!(Command::parse("  /theme"), None);

        let mut m = InteractionMachine::new();
        let t = m.submit("  /theme").unwrap();
        assert_eq!(
            t.new_state,
            InteractionState::ToneSelect {
                text: "  /theme".to_string(),
                selected: 0
            }
        );
    }

    #[test]
    fn test_select_rejects_out_of_range() {
        let mut m = InteractionMachine::new();
        m.submit("text").unwrap();
        m.select(3).unwrap();
        assert_eq!(m.selected_index(), Some(3));

        let err = m.select(tone::count()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
        assert_eq!(m.selected_index(), Some(3));

        m.cancel().unwrap();
        m.submit("/theme").unwrap();
        assert!(m.select(THEMES.len()).is_err());
        assert_eq!(m.selected_index(), Some(0));
        assert!(InteractionMachine::new().select(0).is_err());
    }

    #[test]
    fn test_confirm_tone_enters_generating() {
        let mut m = InteractionMachine::new();
        m.submit("text").unwrap();
        let t = m.confirm_tone(2).unwrap();
        match t.new_state {
            InteractionState::Generating { text, tone } => {
                assert_eq!(text, "text");
                assert_eq!(tone.id, "neutral");
            }
            other => panic!("unexpected state: {other:?}"),
        }
        assert!(m.is_generating());
    }

    #[test]
    fn test_confirm_tone_out_of_range() {
        let mut m = InteractionMachine::new();
        m.submit("text").unwrap();
        assert!(m.confirm_tone(tone::count()).is_err());
        assert_eq!(m.state().as_str(), "tone_select");
    }

    #[test]
    fn test_generating_ignores_user_triggers() {
        let mut m = generating();
        assert!(m.submit("again").is_err());
        assert!(m.cancel().is_err());
        assert!(m.confirm_tone(0).is_err());
        assert!(m.acknowledge().is_err());
        assert!(m.new_text().is_err());
        assert!(m.is_generating());
    }

    #[test]
    fn test_success_then_new() {
        let mut m = generating();
        let t = m
            .on_refine_done::<AppError>(Ok(refined("hello there", "Hello there.")))
            .unwrap();
        assert_eq!(t.prev_state, "generating");
        assert_eq!(t.new_state.as_str(), "output");
        let t = m.new_text().unwrap();
        assert_eq!(t.new_state, InteractionState::Input { draft: String::new() });
    }

    #[test]
    fn test_failure_then_acknowledge() {
        let mut m = generating();
        let t = m
            .on_refine_done(Err::<RefinementResult, _>("openai API error: boom"))
            .unwrap();
        assert_eq!(
            t.new_state,
            InteractionState::Error {
                message: "openai API error: boom".to_string()
            }
        );
        assert_eq!(m.acknowledge().unwrap().new_state.as_str(), "input");
    }

    #[test]
    fn test_refine_done_outside_generating() {
        let mut m = InteractionMachine::new();
        assert!(m.on_refine_done::<AppError>(Ok(refined("a", "b"))).is_err());
    }

    #[test]
    fn test_theme_confirm_returns_name() {
        let mut m = InteractionMachine::new();
        m.submit("/theme").unwrap();
        m.move_selection(1).unwrap();
        let index = m.selected_index().unwrap();
        let (t, theme) = m.confirm_theme(index).unwrap();
        assert_eq!(theme, "dracula");
        assert_eq!(t.new_state.as_str(), "input");
    }

    #[test]
    fn test_startup_in_settings_when_unconfigured() {
        assert_eq!(
            InteractionMachine::for_startup(false).state(),
            &InteractionState::Settings
        );
        assert_eq!(InteractionMachine::for_startup(true).state().as_str(), "input");
    }
}
