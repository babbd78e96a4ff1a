use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::domain::settings::HumanizeLevel;
use crate::domain::types::PostProcessReport;

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static CELL: OnceLock<Regex> = OnceLock::new();
            CELL.get_or_init(|| Regex::new($pattern).expect("組み込みの正規表現が不正です"))
        }
    };
}

static_regex!(editorial_line_re, r"^(?:note|nb|edit(?:ed)?)(?:[:\-—]|\b)");
static_regex!(
    editorial_actor_re,
    r"\b(?:i|we|i\s+have|i\s+was|i\s+removed|removed|edited|updated|changed|fixed|added|replaced)\b"
);
static_regex!(
    first_person_edit_re,
    r"(?mi)\bI\s+(?:did|made|changed|updated|added|removed|fixed|replaced|corrected)\b[^.?!\n]*[.?!]?"
);
static_regex!(note_that_re, r"(?mi)\bnote that\b(?:\s*[,;:\-—])?[^.?!\n]*[.?!]?");
static_regex!(bare_note_re, r"(?mi)^[ \t]*\[?\b(?:note|nb)\b\]?[:\-—]?[ \t]*$");
static_regex!(
    clarifying_re,
    r"(?mi)\b(?:to clarify|in summary|in other words)\b[ \t]*[:,;\-—]?[ \t]*"
);
static_regex!(double_space_re, r" {2,}");
static_regex!(
    emoji_item_re,
    r"(?m)^([ \t]*(?:[-*•][ \t]+)?)[\p{Extended_Pictographic}\x{FE0F}\x{200D}]+[ \t]*"
);
static_regex!(bullet_re, r"^\s*[-*•]\s+");
static_regex!(not_just_re, r"(?i)\bnot just\b");
static_regex!(word_re, r"\w+");
static_regex!(blank_lines_re, r"\n\s*\n+");
static_regex!(horizontal_space_re, r"[ \t]+");
static_regex!(
    editorial_marker_re,
    r"(?mi)\b(?:note|nb|edit(?:ed)?|i\s+updated|i\s+removed)\b"
);
static_regex!(
    control_marker_re,
    r"(?m)^[ \t]*\[(?:HUMANIZE_LEVEL|DEBUG):[^\]\n]*\][ \t]*$"
);
static_regex!(
    editorial_fragment_re,
    r"(?mi)\b(?:note|nb|edit(?:ed)?)[:\-—]?\b[^.?!\n]*[.?!]?"
);
static_regex!(ethos_re, r"(?i)\b(?:I|we|our|my|our team)\b");
static_regex!(sentence_end_re, r"[.!?]\s+");

const EM_DASH: char = '—';

/// 禁止語と置き換え先（長い語句を先に適用する）
const BANNED_WORDS: &[(&str, &str)] = &[
    ("delve into", "examine"),
    ("delve", "examine"),
    ("elevate", "improve"),
    ("innovative", "new"),
    ("cutting-edge", "advanced"),
    ("practical solutions", "practical methods"),
    ("transformative", "substantial"),
    ("leverage", "use"),
    ("robust", "reliable"),
    ("seamless", "smooth"),
];

const CONCISE_REPLACEMENTS: &[(&str, &str)] = &[
    ("in order to", "to"),
    ("due to the fact that", "because"),
    ("is able to", "can"),
    ("has the ability to", "can"),
    ("at this point in time", "now"),
    ("in the event that", "if"),
    ("very", ""),
    ("really", ""),
];

const FORMAL_TO_PLAIN: &[(&str, &str)] = &[
    ("is a widely recognized framework", "is a framework"),
    ("the fundamental principle", "the main idea"),
    ("by combining", "when you combine"),
    ("this framework provides", "it provides"),
    ("the result is", "it results in"),
];

const CONTRACTIONS: &[(&str, &str)] = &[
    ("do not", "don't"),
    ("does not", "doesn't"),
    ("did not", "didn't"),
    ("can not", "can't"),
    ("will not", "won't"),
    ("we are", "we're"),
    ("you are", "you're"),
    ("it is", "it's"),
    ("that is", "that's"),
    ("I am", "I'm"),
    ("I have", "I've"),
];

/// 大文字小文字を無視した単語境界つきの置換表をコンパイルする
fn phrase_table(
    cell: &'static OnceLock<Vec<(Regex, &'static str)>>,
    table: &'static [(&'static str, &'static str)],
) -> &'static [(Regex, &'static str)] {
    cell.get_or_init(|| {
        table
            .iter()
            .map(|(phrase, replacement)| {
                let re = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(phrase)))
                    .expect("組み込みの正規表現が不正です");
                (re, *replacement)
            })
            .collect()
    })
}

fn banned_table() -> &'static [(Regex, &'static str)] {
    static CELL: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    phrase_table(&CELL, BANNED_WORDS)
}

fn concise_table() -> &'static [(Regex, &'static str)] {
    static CELL: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    phrase_table(&CELL, CONCISE_REPLACEMENTS)
}

fn formal_table() -> &'static [(Regex, &'static str)] {
    static CELL: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    phrase_table(&CELL, FORMAL_TO_PLAIN)
}

fn contraction_table() -> &'static [(Regex, &'static str)] {
    static CELL: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    phrase_table(&CELL, CONTRACTIONS)
}

/// 置換元の先頭が大文字なら置換先の先頭も大文字にする
fn match_case(found: &str, replacement: &str) -> String {
    let starts_upper = found.chars().next().is_some_and(char::is_uppercase);
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) if starts_upper => first.to_uppercase().chain(chars).collect(),
        _ => replacement.to_string(),
    }
}

fn apply_table(text: &str, table: &[(Regex, &str)]) -> String {
    let mut result = text.to_string();
    for (re, replacement) in table {
        result = re
            .replace_all(&result, |caps: &Captures| match_case(&caps[0], replacement))
            .into_owned();
    }
    result
}

/// モデル出力の後処理パイプライン: 品質ルールを決定的に適用する
pub struct PostProcessor;

impl PostProcessor {
    /// 後処理を適用した本文だけを返す
    pub fn process(text: &str, level: HumanizeLevel) -> String {
        Self::process_with_report(text, level).0
    }

    /// 後処理を適用し、デバッグ用レポートも返す
    pub fn process_with_report(text: &str, level: HumanizeLevel) -> (String, PostProcessReport) {
        let passes = Self::passes(level);
        let mut report = PostProcessReport {
            humanize_level: level.as_str().to_string(),
            passes,
            editorial_markers_found: editorial_marker_re().find_iter(text).count(),
            banned_word_replacements: banned_table()
                .iter()
                .map(|(re, _)| re.find_iter(text).count())
                .sum(),
            emoji_list_items_removed: emoji_item_re().find_iter(text).count(),
            em_dashes_found: text.matches(EM_DASH).count(),
            linkedin_softened: 0,
            final_length: 0,
        };

        let mut result = control_marker_re().replace_all(text, "").into_owned();
        for _ in 0..passes {
            result = Self::core_pass(&result);
            if level == HumanizeLevel::Low {
                continue;
            }

            let softened = Self::remove_linkedin_structure(&result);
            if softened != result {
                report.linkedin_softened += 1;
                result = softened;
            }
            if level == HumanizeLevel::Aggressive {
                result = Self::apply_contractions(&result);
            }
            result = Self::reduce_formality(&result);
        }

        let result = editorial_fragment_re().replace_all(&result, "");
        let result = Self::normalize_whitespace(&Self::merge_short_fragments(&result));
        report.final_length = result.chars().count();
        (result, report)
    }

    fn passes(level: HumanizeLevel) -> u32 {
        match level {
            HumanizeLevel::Low => 1,
            HumanizeLevel::Standard => 2,
            HumanizeLevel::Aggressive => 3,
        }
    }

    /// どのレベルでも必ず適用する変換
    fn core_pass(text: &str) -> String {
        let text = Self::remove_editorial_notes(text);
        let text = Self::remove_clarifying_phrases(&text);
        let text = Self::replace_banned_words(&text);
        let text = Self::strip_leading_emoji(&text);
        let text = Self::fix_three_item_lists(&text);
        let text = Self::limit_parallel_structure(&text);
        let text = Self::limit_em_dashes(&text);
        let text = Self::conciseify(&text);
        Self::normalize_whitespace(&text)
    }

    /// 編集メモ（"Note: I removed ..." など）を取り除く。内容のある Note 行は残す。
    pub fn remove_editorial_notes(text: &str) -> String {
        let kept: Vec<&str> = text
            .lines()
            .filter(|line| !is_editorial_line(line))
            .collect();
        let text = kept.join("\n");

        let text = first_person_edit_re().replace_all(&text, "");
        let text = note_that_re().replace_all(&text, |caps: &Captures| {
            if caps[0].split_whitespace().count() <= 12 {
                String::new()
            } else {
                caps[0].to_string()
            }
        });
        bare_note_re().replace_all(&text, "").into_owned()
    }

    pub fn remove_clarifying_phrases(text: &str) -> String {
        clarifying_re().replace_all(text, "").into_owned()
    }

    pub fn replace_banned_words(text: &str) -> String {
        let replaced = apply_table(text, banned_table());
        double_space_re().replace_all(&replaced, " ").into_owned()
    }

    /// 箇条書き先頭の絵文字を除去する
    pub fn strip_leading_emoji(text: &str) -> String {
        emoji_item_re().replace_all(text, "$1").into_owned()
    }

    /// ちょうど3項目の箇条書きを2項目にまとめる
    pub fn fix_three_item_lists(text: &str) -> String {
        let lines: Vec<&str> = text.lines().collect();
        let mut out: Vec<String> = Vec::with_capacity(lines.len());
        let mut i = 0;

        while i < lines.len() {
            if !bullet_re().is_match(lines[i]) {
                out.push(lines[i].to_string());
                i += 1;
                continue;
            }

            let mut group = Vec::new();
            while i < lines.len() && bullet_re().is_match(lines[i]) {
                group.push(bullet_re().replace(lines[i], "").trim().to_string());
                i += 1;
            }

            if group.len() == 3 {
                out.push(format!("- {}", group[0]));
                out.push(format!("- {} and {}", group[1], group[2]));
            } else {
                out.extend(group.iter().map(|item| format!("- {item}")));
            }
        }

        out.join("\n")
    }

    /// 2回目以降の "not just" を書き換える
    pub fn limit_parallel_structure(text: &str) -> String {
        let mut seen = 0;
        not_just_re()
            .replace_all(text, |caps: &Captures| {
                seen += 1;
                if seen == 1 {
                    caps[0].to_string()
                } else {
                    "Beyond".to_string()
                }
            })
            .into_owned()
    }

    /// em dash を 500 語あたり1つまでに制限する（超過分はカンマ区切りに）
    pub fn limit_em_dashes(text: &str) -> String {
        let words = word_re().find_iter(text).count();
        let allowed = (words / 500).max(1);
        if text.matches(EM_DASH).count() <= allowed {
            return text.to_string();
        }

        let parts: Vec<&str> = text.split(EM_DASH).collect();
        let dash = EM_DASH.to_string();
        let mut result = parts[..=allowed].join(dash.as_str());
        let rest: Vec<&str> = parts[allowed + 1..]
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect();
        if !rest.is_empty() {
            result = result.trim_end().to_string();
            result.push_str(", ");
            result.push_str(&rest.join(", "));
        }
        result
    }

    pub fn conciseify(text: &str) -> String {
        apply_table(text, concise_table())
    }

    pub fn reduce_formality(text: &str) -> String {
        apply_table(text, formal_table())
    }

    pub fn apply_contractions(text: &str) -> String {
        apply_table(text, contraction_table())
    }

    /// 短い一文目・書き手を語る二文目・箇条書きという定型の投稿構成をほぐし、
    /// 箇条書きを二文目の後ろの一段落にまとめる
    pub fn remove_linkedin_structure(text: &str) -> String {
        let lines: Vec<&str> = text.lines().collect();
        if lines.len() < 4 {
            return text.to_string();
        }

        let mut non_empty = lines.iter().map(|line| line.trim()).filter(|line| !line.is_empty());
        let (Some(hook), Some(ethos)) = (non_empty.next(), non_empty.next()) else {
            return text.to_string();
        };
        if hook.split_whitespace().count() > 12 || !ethos_re().is_match(ethos) {
            return text.to_string();
        }

        let (bullets, rest): (Vec<&str>, Vec<&str>) =
            lines.iter().copied().partition(|line| bullet_re().is_match(line));
        if bullets.len() < 2 {
            return text.to_string();
        }

        let paragraph = bullets.join(" ").replace("- ", "");
        let mut out: Vec<&str> = Vec::with_capacity(rest.len() + 1);
        let mut inserted = false;
        for line in rest {
            out.push(line);
            if !inserted && line.trim() == ethos {
                out.push(&paragraph);
                inserted = true;
            }
        }
        out.join("\n")
    }

    /// 4語以下の文に続く短い文（6語以下）をカンマでつないで1文にする。行をまたいではまとめない。
    pub fn merge_short_fragments(text: &str) -> String {
        text.lines()
            .map(merge_line_fragments)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// 空行の圧縮、連続空白の圧縮、行末空白の除去、前後トリム
    pub fn normalize_whitespace(text: &str) -> String {
        let text = blank_lines_re().replace_all(text, "\n\n");
        let text = horizontal_space_re().replace_all(&text, " ");
        text.lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }
}

fn is_editorial_line(line: &str) -> bool {
    let low = line.trim().to_lowercase();
    if low.is_empty() || !editorial_line_re().is_match(&low) {
        return false;
    }
    editorial_actor_re().is_match(&low) || low.split_whitespace().count() <= 6
}

/// 文末（. ! ? と後続の空白）で区切る
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in sentence_end_re().find_iter(text) {
        sentences.push(&text[start..=m.start()]);
        start = m.end();
    }
    sentences.push(&text[start..]);
    sentences
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn merge_line_fragments(line: &str) -> String {
    let indent = &line[..line.len() - line.trim_start().len()];
    let sentences: Vec<&str> = split_sentences(line).into_iter().map(str::trim).collect();

    let mut out: Vec<String> = Vec::with_capacity(sentences.len());
    let mut i = 0;
    while i < sentences.len() {
        let sentence = sentences[i];
        if !sentence.is_empty() && word_count(sentence) <= 4 {
            let end = sentences[i + 1..]
                .iter()
                .position(|next| word_count(next) > 6)
                .map_or(sentences.len(), |offset| i + 1 + offset);
            if end - i > 1 {
                let merged = sentences[i..end]
                    .iter()
                    .map(|s| s.trim_end_matches(['.', '!', '?']))
                    .collect::<Vec<_>>()
                    .join(", ");
                out.push(format!("{}.", merged.trim_end_matches([',', ' '])));
                i = end;
                continue;
            }
        }
        out.push(sentence.to_string());
        i += 1;
    }

    out.retain(|s| !s.is_empty());
    format!("{indent}{}", out.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_banned_words() {
        let out = PostProcessor::replace_banned_words(
            "This will delve into innovative approaches to leverage robust systems.",
        );
        let low = out.to_lowercase();
        assert!(!low.contains("delve"));
        assert!(!low.contains("innovative"));
        assert!(!low.contains("leverage"));
        assert_eq!(out, "This will examine new approaches to use reliable systems.");
    }

    #[test]
    fn test_banned_word_keeps_capitalization() {
        assert_eq!(
            PostProcessor::replace_banned_words("Seamless setup."),
            "Smooth setup."
        );
    }

    #[test]
    fn test_strip_leading_emoji() {
        let out = PostProcessor::strip_leading_emoji("- 🚀 Speed\n- ✅ Reliability\n- 🔐 Security");
        assert_eq!(out, "- Speed\n- Reliability\n- Security");
    }

    #[test]
    fn test_fix_three_item_lists() {
        let out = PostProcessor::fix_three_item_lists("Here are things:\n- A\n- B\n- C\nEnd");
        assert_eq!(out, "Here are things:\n- A\n- B and C\nEnd");
    }

    #[test]
    fn test_two_and_four_item_lists_untouched() {
        let two = "- A\n- B";
        assert_eq!(PostProcessor::fix_three_item_lists(two), two);
        let four = "- A\n- B\n- C\n- D";
        assert_eq!(PostProcessor::fix_three_item_lists(four), four);
    }

    #[test]
    fn test_remove_editorial_notes() {
        let out = PostProcessor::remove_editorial_notes(
            "Note: I removed duplicates.\nActual content here.",
        );
        assert_eq!(out, "Actual content here.");
    }

    #[test]
    fn test_sentence_after_note_is_kept() {
        let text = "Note: The deadline is March 3, 2026. Please prepare the report.";
        let out = PostProcessor::process(text, HumanizeLevel::Standard);
        assert!(out.contains("Please prepare the report"));
    }

    #[test]
    fn test_remove_clarifying_phrases() {
        assert_eq!(
            PostProcessor::remove_clarifying_phrases("To clarify, the plan changed."),
            "the plan changed."
        );
    }

    #[test]
    fn test_limit_parallel_structure() {
        let out = PostProcessor::limit_parallel_structure(
            "It is not just fast. It is not just cheap.",
        );
        assert_eq!(out, "It is not just fast. It is Beyond cheap.");
    }

    #[test]
    fn test_limit_em_dashes() {
        let out = PostProcessor::limit_em_dashes("one — two — three");
        assert_eq!(out.matches(EM_DASH).count(), 1);
        assert_eq!(out, "one — two, three");
    }

    #[test]
    fn test_em_dashes_allowed_per_500_words() {
        let text = format!("{}— a — b", "word ".repeat(1000));
        assert_eq!(PostProcessor::limit_em_dashes(&text), text);
    }

    #[test]
    fn test_conciseify_and_whitespace() {
        let out = PostProcessor::normalize_whitespace(&PostProcessor::conciseify(
            "We did this in order to ship,  really   fast.\n\n\n\nDone.",
        ));
        assert_eq!(out, "We did this to ship, fast.\n\nDone.");
    }

    #[test]
    fn test_contractions_only_when_aggressive() {
        let text = "We do not know yet.";
        assert_eq!(PostProcessor::process(text, HumanizeLevel::Standard), text);
        assert_eq!(
            PostProcessor::process(text, HumanizeLevel::Aggressive),
            "We don't know yet."
        );
    }

    #[test]
    fn test_end_to_end() {
        let text = "Note: edit\nTo clarify, this is innovative — it will leverage systems.\n- 🚀 Speed\n- ✅ Reliability\n- 🔐 Security";
        let out = PostProcessor::process(text, HumanizeLevel::Low);
        assert!(!out.contains("Note:"));
        assert!(!out.contains("innovative"));
        assert!(!out.contains("To clarify"));
        assert!(out.contains("- Speed"));
        assert!(out.contains("- Reliability and Security"));
    }

    #[test]
    fn test_clean_text_is_unchanged() {
        let text = "The quarterly report is ready now.\nPlease review the summary section by Friday.";
        for level in [HumanizeLevel::Low, HumanizeLevel::Standard] {
            assert_eq!(PostProcessor::process(text, level), text);
        }
    }

    #[test]
    fn test_report_counts() {
        let text = "Note: I updated this.\nThis product is innovative and seamless.\n- 🚀 Fast\n- Secure";
        let (out, report) = PostProcessor::process_with_report(text, HumanizeLevel::Aggressive);
        assert_eq!(report.passes, 3);
        assert_eq!(report.humanize_level, "aggressive");
        assert_eq!(report.banned_word_replacements, 2);
        assert_eq!(report.emoji_list_items_removed, 1);
        assert!(report.editorial_markers_found >= 1);
        assert_eq!(report.final_length, out.chars().count());
        assert!(!out.to_lowercase().contains("innovative"));
        assert!(!out.contains("Note:"));
    }

    #[test]
    fn test_linkedin_structure_softened() {
        let text = "Big news today.\nOur team shipped the new release.\n- Faster builds\n- Smaller binaries\nThanks for reading.";
        assert_eq!(
            PostProcessor::remove_linkedin_structure(text),
            "Big news today.\nOur team shipped the new release.\nFaster builds Smaller binaries\nThanks for reading."
        );

        let (_, report) = PostProcessor::process_with_report(text, HumanizeLevel::Standard);
        assert_eq!(report.linkedin_softened, 1);

        let (out, report) = PostProcessor::process_with_report(text, HumanizeLevel::Low);
        assert_eq!(report.linkedin_softened, 0);
        assert!(out.contains("- Faster builds"));
    }

    #[test]
    fn test_linkedin_structure_needs_ethos_line() {
        let text = "Big news today.\nThe release shipped on time.\n- Faster builds\n- Smaller binaries";
        assert_eq!(PostProcessor::remove_linkedin_structure(text), text);
    }

    #[test]
    fn test_merge_short_fragments() {
        assert_eq!(
            PostProcessor::merge_short_fragments(
                "Short one. Also short. Then this longer sentence continues on and on."
            ),
            "Short one, Also short. Then this longer sentence continues on and on."
        );
        let lines = "Done.\n- Faster builds";
        assert_eq!(PostProcessor::merge_short_fragments(lines), lines);
    }

    #[test]
    fn test_trailing_editorial_fragment_removed() {
        let out = PostProcessor::process("The plan is final. Edited for clarity.", HumanizeLevel::Low);
        assert_eq!(out, "The plan is final.");
    }

    #[test]
    fn test_control_marker_lines_removed() {
        let text = "[HUMANIZE_LEVEL: aggressive]\nThe quarterly report is ready for review.\n[DEBUG: on]";
        assert_eq!(
            PostProcessor::process(text, HumanizeLevel::Low),
            "The quarterly report is ready for review."
        );
    }

    #[test]
    fn test_editorial_only_output_becomes_empty() {
        assert_eq!(
            PostProcessor::process("Note: I removed the filler.", HumanizeLevel::Standard),
            ""
        );
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(PostProcessor::process("", HumanizeLevel::Standard), "");
        assert_eq!(PostProcessor::normalize_whitespace(""), "");
    }
}
