use rd_core::domain::interaction::InteractionState;
use rd_core::domain::settings::HumanizeLevel;
use rd_core::domain::tone;
use rd_core::domain::types::THEMES;
use rd_core::usecase::app_service::{SettingsEdit, UserEvent};

/// 入力行の解釈エラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("not a number: {0}")]
    InvalidNumber(String),
    #[error("choose a number from 1 to {0}")]
    OutOfRange(usize),
    #[error("{0}")]
    InvalidValue(String),
}

/// 1行の入力から導かれる操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Events(Vec<UserEvent>),
    Edit(SettingsEdit),
    Help,
}

pub const SETTINGS_HELP: &str = "\
provider <id>          select the active provider
key <provider> <key>   set an API key
model <provider> <m>   set a model (empty to reset)
url <provider> <url>   set a base URL (empty to reset)
humanize <level>       companion API post-processing: low | standard | aggressive
debug on|off           companion API: attach post-process reports
close                  back to input";

/// 現在の状態に応じて入力行を操作に変換する
pub fn parse_line(state: &InteractionState, line: &str) -> Result<Action, CommandError> {
    let trimmed = line.trim();

    match state {
        InteractionState::Input { .. } => Ok(Action::Events(vec![UserEvent::Submit(
            line.trim_end_matches(['\r', '\n']).to_string(),
        )])),
        InteractionState::ToneSelect { .. } => parse_selection(trimmed, tone::count()),
        InteractionState::ThemeSelect { .. } => parse_selection(trimmed, THEMES.len()),
        InteractionState::Output { .. } => Ok(Action::Events(vec![UserEvent::NewText])),
        InteractionState::Error { .. } => Ok(Action::Events(vec![UserEvent::Acknowledge])),
        InteractionState::Settings => parse_settings(trimmed),
        InteractionState::Generating { .. } => Ok(Action::Events(Vec::new())),
    }
}

fn parse_selection(input: &str, len: usize) -> Result<Action, CommandError> {
    let events = match input {
        "" => vec![UserEvent::Confirm],
        "j" | "+" | "down" => vec![UserEvent::MoveSelection(1)],
        "k" | "-" | "up" => vec![UserEvent::MoveSelection(-1)],
        "q" | "esc" | "cancel" => vec![UserEvent::Cancel],
        "?" | "help" => return Ok(Action::Help),
        number => {
            let n: usize = number
                .parse()
                .map_err(|_| CommandError::InvalidNumber(number.to_string()))?;
            if n == 0 || n > len {
                return Err(CommandError::OutOfRange(len));
            }
            vec![UserEvent::Select(n - 1), UserEvent::Confirm]
        }
    };
    Ok(Action::Events(events))
}

fn parse_settings(input: &str) -> Result<Action, CommandError> {
    let mut parts = input.splitn(3, char::is_whitespace);
    let command = parts.next().unwrap_or_default();
    let first = parts.next().map(str::trim).unwrap_or_default();
    let rest = parts.next().map(str::trim).unwrap_or_default();

    let edit = match command {
        "" | "close" | "q" | "esc" => return Ok(Action::Events(vec![UserEvent::CloseSettings])),
        "?" | "help" => return Ok(Action::Help),
        "provider" if !first.is_empty() => SettingsEdit::ActiveProvider(first.to_string()),
        "provider" => return Err(CommandError::Usage("provider <id>")),
        "key" if !first.is_empty() && !rest.is_empty() => SettingsEdit::ApiKey {
            provider: first.to_string(),
            api_key: rest.to_string(),
        },
        "key" => return Err(CommandError::Usage("key <provider> <key>")),
        "model" if !first.is_empty() => SettingsEdit::Model {
            provider: first.to_string(),
            model: rest.to_string(),
        },
        "model" => return Err(CommandError::Usage("model <provider> <model>")),
        "url" if !first.is_empty() => SettingsEdit::BaseUrl {
            provider: first.to_string(),
            base_url: rest.to_string(),
        },
        "url" => return Err(CommandError::Usage("url <provider> <url>")),
        "humanize" => SettingsEdit::Humanize(
            first
                .parse::<HumanizeLevel>()
                .map_err(CommandError::InvalidValue)?,
        ),
        "debug" => match first {
            "on" | "true" => SettingsEdit::Debug(true),
            "off" | "false" => SettingsEdit::Debug(false),
            _ => return Err(CommandError::Usage("debug on|off")),
        },
        other => return Err(CommandError::InvalidValue(format!("unknown setting: {other}"))),
    };

    Ok(Action::Edit(edit))
}
