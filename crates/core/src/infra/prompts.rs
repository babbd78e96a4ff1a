//! リライト用プロンプトの組み立て

/// 全プロバイダー共通の system メッセージ
pub const SYSTEM_MESSAGE: &str =
    "You are an expert writing assistant focused on improving text quality, grammar, and tone.";

/// 毎回プロンプトに付ける必須スタイルルール
pub const QUALITY_CONTROL_RULES: &str = "\
QUALITY CONTROL RULES (MANDATORY - NEVER VIOLATE):

I. PUNCTUATION & STRUCTURAL DISCIPLINE
- Maximum 1 em dash per 500 words unless absolutely necessary
- Vary list length (2-5 items), avoid defaulting to exactly 3 items
- No emoji-based formatting or decorative elements
- Do NOT use generic templates (hook → ethos → list → conclusion)

II. SENTENCE CONSTRUCTION CONTROLS
- Maximum 1 \"Not just X, but Y\" construction per document
- NEVER use: \"To clarify\", \"In summary\" (unless actually summarizing), \"In other words\"
- Each sentence must introduce new value, no redundant restatement

III. VOCABULARY PRECISION RULES
- BANNED words: Delve, Elevate, Innovative, Cutting-edge, Practical solutions, Transformative, Leverage, Robust, Seamless
- Use concrete, domain-specific language instead of vague buzzwords
- Vary sentence length intentionally (short punchy sentences mixed with longer ones)
- Every paragraph must deliver concrete value (specific examples, mechanisms, measurable outcomes, or cause-effect reasoning)
- Only use metaphors when they directly clarify meaning, not for decoration

IV. AUTHENTICITY & HUMANIZATION CONTROLS
- No exaggerated praise without tying to specific observable actions
- Replace generic claims with concrete details (numbers, timeframes, named scenarios, mechanisms)
- Allow natural cognitive movement and nuance, not robotic single-thread exposition

V. PROCESS & OUTPUT QUALITY SAFEGUARDS
- Internally simulate: outline → draft → edit → polish
- Remove all redundancy and filler before delivering
- Use conditional phrasing for unverifiable claims, avoid false authority
- Treat output as draft first, then post-process for concision and impact";

/// before/after の例
pub const FEW_SHOT_EXAMPLES: &str = "\
Before: \"I ran the experiment and we saw better results.\"
After: \"In a small trial, the configuration cut load time by 20% over two weeks.\"

Before: \"The product offers innovative, cutting-edge features to elevate user experiences.\"
After: \"A small caching change reduced page load time and lowered error rates in our tests.\"";

const OUTPUT_REQUIREMENTS: &str = "\
OUTPUT REQUIREMENTS:
1. Output ONLY the refined text
2. No explanations, no markdown code blocks
3. No \"Here's the refined text:\" or similar prefixes
4. Just the improved text, ready to use
5. Maintain the original meaning and intent
6. Fix all grammatical errors, awkward phrasing, and structural issues
7. Apply the specified tone throughout";

/// ユーザーテキストを囲む区切り
const TEXT_DELIMITER: &str = "\"\"\"";

/// トーンとルールからリライト用プロンプトを構築する（純関数）
pub fn build_prompt(text: &str, tone_id: &str, tone_instruction: &str) -> String {
    build_prompt_with_instructions(text, tone_id, tone_instruction, None)
}

/// 追加指示付きのプロンプトを構築する。空の追加指示は無視する。
pub fn build_prompt_with_instructions(
    text: &str,
    tone_id: &str,
    tone_instruction: &str,
    custom_instructions: Option<&str>,
) -> String {
    let mut prompt = String::new();

    prompt.push_str("TASK: Refine the following text according to the specified tone.\n\n");
    prompt.push_str("TONE: ");
    prompt.push_str(tone_id);
    prompt.push_str("\nTONE INSTRUCTION: ");
    prompt.push_str(tone_instruction);
    prompt.push_str("\n\n");

    prompt.push_str("TEXT TO REFINE:\n");
    prompt.push_str(TEXT_DELIMITER);
    prompt.push('\n');
    prompt.push_str(text);
    prompt.push('\n');
    prompt.push_str(TEXT_DELIMITER);
    prompt.push_str("\n\n");

    prompt.push_str(QUALITY_CONTROL_RULES);
    prompt.push_str("\n\n");

    if let Some(custom) = custom_instructions.map(str::trim).filter(|c| !c.is_empty()) {
        prompt.push_str("CUSTOM INSTRUCTIONS:\n");
        prompt.push_str(custom);
        prompt.push_str("\n\n");
    }

    prompt.push_str("EXAMPLES:\n");
    prompt.push_str(FEW_SHOT_EXAMPLES);
    prompt.push_str("\n\n");

    prompt.push_str(OUTPUT_REQUIREMENTS);

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSTRUCTION: &str = "Rewrite this text in a formal tone.";

    #[test]
    fn test_build_prompt_is_deterministic() {
        let a = build_prompt("i seen him yesterday", "formal", INSTRUCTION);
        let b = build_prompt("i seen him yesterday", "formal", INSTRUCTION);
        assert_eq!(a, b);
    }

    #[test]
    fn test_sections_in_order() {
        let prompt = build_prompt("my text", "formal", INSTRUCTION);
        let positions: Vec<usize> = [
            "TONE: formal",
            "TONE INSTRUCTION: Rewrite this text in a formal tone.",
            "\"\"\"\nmy text\n\"\"\"",
            "QUALITY CONTROL RULES",
            "EXAMPLES:",
            "OUTPUT REQUIREMENTS:",
            "7. Apply the specified tone throughout",
        ]
        .iter()
        .map(|needle| prompt.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
    }

    #[test]
    fn test_rules_are_included_verbatim() {
        let prompt = build_prompt("x", "casual", "be casual");
        assert!(prompt.contains(QUALITY_CONTROL_RULES));
        assert!(prompt.contains(FEW_SHOT_EXAMPLES));
    }

    #[test]
    fn test_custom_instructions() {
        let prompt = build_prompt_with_instructions("x", "casual", "be casual", Some("Keep it under 50 words."));
        let custom = prompt.find("CUSTOM INSTRUCTIONS:\nKeep it under 50 words.").unwrap();
        assert!(prompt.find("QUALITY CONTROL RULES").unwrap() < custom);
        assert!(custom < prompt.find("EXAMPLES:").unwrap());
    }

    #[test]
    fn test_blank_custom_instructions_match_plain_prompt() {
        assert_eq!(
            build_prompt_with_instructions("x", "casual", "be casual", Some("  ")),
            build_prompt("x", "casual", "be casual")
        );
    }
}
