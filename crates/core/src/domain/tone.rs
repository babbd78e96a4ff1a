use serde::{Deserialize, Serialize};

/// リライトのトーン定義（表示順に並ぶ静的テーブル）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub instruction: String,
}

struct ToneEntry {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    instruction: &'static str,
}

impl ToneEntry {
    fn to_definition(&self) -> ToneDefinition {
        ToneDefinition {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            instruction: self.instruction.to_string(),
        }
    }
}

const TONES: &[ToneEntry] = &[
    ToneEntry {
        id: "formal",
        name: "Formal",
        description: "Structured, precise, impersonal - for academic, legal, and official communication",
        instruction: "Rewrite this text in a formal tone. Use precise language, maintain objectivity, and follow standard conventions for academic, legal, or official contexts. Avoid contractions and colloquialisms.",
    },
    ToneEntry {
        id: "professional",
        name: "Professional",
        description: "Polished and business-appropriate - for corporate emails, proposals, reports",
        instruction: "Rewrite this text in a professional tone suitable for business communication. Be courteous, clear, and maintain appropriate workplace etiquette without being overly stiff.",
    },
    ToneEntry {
        id: "neutral",
        name: "Neutral",
        description: "Objective and factual with minimal emotion - for documentation and informational writing",
        instruction: "Rewrite this text in a neutral tone. Present facts objectively without emotional language or bias. Focus on clarity and informational value.",
    },
    ToneEntry {
        id: "straightforward",
        name: "Straightforward",
        description: "Concise, direct, and action-focused - clear instructions or decisions",
        instruction: "Rewrite this text in a straightforward tone. Be direct and concise. Remove unnecessary words and get straight to the point with clear action items.",
    },
    ToneEntry {
        id: "friendly",
        name: "Friendly",
        description: "Warm, approachable, and reader-focused - for customer communication and community writing",
        instruction: "Rewrite this text in a friendly tone. Be warm and approachable while remaining respectful. Connect with the reader personally without being overly casual.",
    },
    ToneEntry {
        id: "casual",
        name: "Casual",
        description: "Relaxed, conversational, informal - for blogs, internal chats, informal updates",
        instruction: "Rewrite this text in a casual tone. Use conversational language, contractions, and a relaxed style suitable for informal contexts like blogs or team chats.",
    },
    ToneEntry {
        id: "persuasive",
        name: "Persuasive",
        description: "Designed to influence or convince - for sales, marketing, arguments",
        instruction: "Rewrite this text in a persuasive tone. Present compelling arguments, highlight benefits, and guide the reader toward a specific conclusion or action.",
    },
    ToneEntry {
        id: "authoritative",
        name: "Authoritative",
        description: "Confident, decisive, expert-level voice - for leadership, policy, expert commentary",
        instruction: "Rewrite this text in an authoritative tone. Project confidence and expertise. Be decisive and command respect through knowledgeable, well-reasoned statements.",
    },
    ToneEntry {
        id: "empathetic",
        name: "Empathetic",
        description: "Emotionally aware and supportive - for support, HR, sensitive topics",
        instruction: "Rewrite this text in an empathetic tone. Show understanding and emotional awareness. Be supportive and considerate of the reader's feelings and perspective.",
    },
    ToneEntry {
        id: "inspirational",
        name: "Inspirational",
        description: "Motivating and uplifting - for speeches, branding, mission statements",
        instruction: "Rewrite this text in an inspirational tone. Motivate and uplift the reader. Use encouraging language that inspires action and conveys a sense of purpose.",
    },
];

/// 全トーンを表示順で返す
pub fn all() -> Vec<ToneDefinition> {
    TONES.iter().map(ToneEntry::to_definition).collect()
}

/// トーン数
pub fn count() -> usize {
    TONES.len()
}

/// id でトーンを検索する
pub fn find(id: &str) -> Option<ToneDefinition> {
    TONES
        .iter()
        .find(|t| t.id == id)
        .map(ToneEntry::to_definition)
}

/// 表示順のインデックスでトーンを取得する
pub fn by_index(index: usize) -> Option<ToneDefinition> {
    TONES.get(index).map(ToneEntry::to_definition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<_> = TONES.iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), TONES.len());
    }

    #[test]
    fn test_display_order() {
        let ids: Vec<_> = all().into_iter().map(|t| t.id).collect();
        assert_eq!(ids.first().map(String::as_str), Some("formal"));
        assert_eq!(ids.last().map(String::as_str), Some("inspirational"));
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn test_find() {
        let tone = find("casual").unwrap();
        assert_eq!(tone.name, "Casual");
        assert!(tone.instruction.contains("contractions"));
        assert!(find("Casual").is_none());
        assert!(find("bogus").is_none());
    }

    #[test]
    fn test_by_index() {
        assert_eq!(by_index(1).unwrap().id, "professional");
        assert!(by_index(count()).is_none());
    }
}
