#[cfg(test)]
mod tests {
    use crate::domain::error::{AppError, ErrorCode};
    use crate::domain::interaction::{InteractionState, StateTransition};
    use crate::domain::settings::{HumanizeLevel, ProviderConfig, Settings};
    use crate::domain::tone;
    use crate::domain::types::RefinementResult;

    #[test]
    fn test_settings_uses_camel_case_keys() {
        let mut settings = Settings::default();
        settings.set_api_key("openai", "sk-test");
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"activeProvider\":\"openai\""));
        assert!(json.contains("\"humanizeLevel\":\"standard\""));
        assert!(json.contains("\"apiKey\":\"sk-test\""));
        // 未設定の model / baseUrl は出力しない
        assert!(!json.contains("baseUrl"));
        assert!(!json.contains("model"));
    }

    #[test]
    fn test_provider_config_deserialization() {
        let config: ProviderConfig = serde_json::from_str(
            r#"{"apiKey":"k","model":"grok-beta","baseUrl":"https://example.test/v1"}"#,
        )
        .unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.model.as_deref(), Some("grok-beta"));
        assert_eq!(config.base_url.as_deref(), Some("https://example.test/v1"));

        let bare: ProviderConfig = serde_json::from_str("{}").unwrap();
        assert!(!bare.is_configured());
    }

    #[test]
    fn test_humanize_level_serialization() {
        assert_eq!(
            serde_json::to_string(&HumanizeLevel::Aggressive).unwrap(),
            "\"aggressive\""
        );
        assert_eq!(
            serde_json::from_str::<HumanizeLevel>("\"low\"").unwrap(),
            HumanizeLevel::Low
        );
    }

    #[test]
    fn test_interaction_state_serialization() {
        assert_eq!(
            serde_json::to_string(&InteractionState::Settings).unwrap(),
            r#"{"type":"settings"}"#
        );

        let error_state = InteractionState::Error {
            message: "Unknown command: /x".to_string(),
        };
        let json = serde_json::to_string(&error_state).unwrap();
        assert!(json.contains("\"type\":\"error\""));
        assert!(json.contains("Unknown command"));
    }

    #[test]
    fn test_error_code_serialization() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::NotConfigured).unwrap(),
            "\"E_NOT_CONFIGURED\""
        );
        assert_eq!(
            serde_json::to_string(&ErrorCode::InvalidState).unwrap(),
            "\"E_INVALID_STATE\""
        );
        assert_eq!(ErrorCode::Provider.as_str(), "E_PROVIDER");
    }

    #[test]
    fn test_app_error_serialization() {
        let err = AppError::empty_input();
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("E_EMPTY_INPUT"));
        assert!(json.contains("recoverable"));
    }

    #[test]
    fn test_state_transition_serialization() {
        let t = StateTransition {
            prev_state: "input".to_string(),
            new_state: InteractionState::ToneSelect {
                text: "hi".to_string(),
                selected: 3,
            },
        };
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"prev_state\":\"input\""));
        assert!(json.contains("tone_select"));
        assert!(json.contains("\"selected\":3"));
    }

    #[test]
    fn test_refinement_result_roundtrip() {
        let result = RefinementResult {
            original: "i seen him".to_string(),
            refined: "I saw him.".to_string(),
            tone: tone::find("formal").unwrap(),
            report: None,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("report"));
        let roundtrip: RefinementResult = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, result);
    }
}
