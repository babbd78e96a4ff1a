use std::fmt::Write;

use rd_core::domain::interaction::{Command, InteractionState};
use rd_core::domain::provider::ProviderKind;
use rd_core::domain::settings::Settings;
use rd_core::domain::tone;
use rd_core::domain::types::THEMES;

/// 現在の状態をテキストで描画する（読み取り専用の投影）
pub fn render(state: &InteractionState, settings: &Settings) -> String {
    let mut out = String::new();

    match state {
        InteractionState::Input { draft } => {
            let _ = writeln!(out, "Enter text to refine ({}):", command_hint());
            if !draft.is_empty() {
                let _ = writeln!(out, "draft: {draft}");
            }
        }
        InteractionState::ToneSelect { selected, .. } => {
            out.push_str("Select a tone (number, j/k + Enter, q to cancel):\n");
            for (i, tone) in tone::all().iter().enumerate() {
                let _ = writeln!(
                    out,
                    "{} {:>2}. {:<16} {}",
                    marker(i == *selected),
                    i + 1,
                    tone.name,
                    tone.description
                );
            }
        }
        InteractionState::Generating { tone, .. } => {
            let _ = writeln!(out, "Refining with {} tone... (Ctrl-C to quit)", tone.name);
        }
        InteractionState::Output {
            original,
            refined,
            tone,
        } => {
            let _ = writeln!(out, "Original:\n{original}\n");
            let _ = writeln!(out, "Refined ({}):\n{refined}\n", tone.name);
            out.push_str("Press Enter for new text.\n");
        }
        InteractionState::Settings => render_settings(&mut out, settings),
        InteractionState::ThemeSelect { selected } => {
            out.push_str("Select a theme (number, j/k + Enter, q to cancel):\n");
            for (i, theme) in THEMES.iter().enumerate() {
                let current = if *theme == settings.theme { " (current)" } else { "" };
                let _ = writeln!(out, "{} {:>2}. {theme}{current}", marker(i == *selected), i + 1);
            }
        }
        InteractionState::Error { message } => {
            let _ = writeln!(out, "Error: {message}");
            out.push_str("Press Enter to continue.\n");
        }
    }

    out
}

fn render_settings(out: &mut String, settings: &Settings) {
    out.push_str("Settings\n");
    let _ = writeln!(out, "  active provider: {}", settings.active_provider);
    for kind in ProviderKind::ALL {
        let config = settings.providers.get(kind.id());
        let status = if config.is_some_and(|c| c.is_configured()) {
            "configured"
        } else {
            "-"
        };
        let model = config
            .and_then(|c| c.model.as_deref())
            .unwrap_or(kind.default_model());
        let _ = writeln!(
            out,
            "  {} {:<11} {:<11} {model}",
            marker(kind.id() == settings.active_provider),
            kind.id(),
            status
        );
    }
    let _ = writeln!(
        out,
        "  humanize: {}  debug: {}",
        settings.humanize_level,
        if settings.debug { "on" } else { "off" }
    );
    if !settings.has_any_provider_configured() {
        out.push_str("No provider configured yet. Set an API key to get started.\n");
    }
    out.push_str("Type `help` for commands, Enter to close.\n");
}

fn marker(selected: bool) -> &'static str {
    if selected {
        ">"
    } else {
        " "
    }
}

fn command_hint() -> String {
    Command::ALL
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_never_shows_keys() {
        let mut settings = Settings::default();
        settings.set_api_key("openai", "sk-very-secret");
        let out = render(&InteractionState::Settings, &settings);
        assert!(!out.contains("sk-very-secret"));
        assert!(out.contains("configured"));
        assert!(!out.contains("No provider configured yet"));
    }

    #[test]
    fn test_tone_select_marks_cursor() {
        let state = InteractionState::ToneSelect {
            text: "x".to_string(),
            selected: 1,
        };
        let out = render(&state, &Settings::default());
        assert!(out.contains(">  2. Professional"));
        assert_eq!(out.matches('>').count(), 1);
    }

    #[test]
    fn test_theme_select_marks_current() {
        let out = render(&InteractionState::ThemeSelect { selected: 0 }, &Settings::default());
        assert!(out.contains("opencode (current)"));
    }

    #[test]
    fn test_input_lists_commands() {
        let state = InteractionState::Input {
            draft: "kept".to_string(),
        };
        let out = render(&state, &Settings::default());
        assert!(out.contains("/settings, /theme"));
        assert!(out.contains("draft: kept"));
    }
}
