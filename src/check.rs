use serde::Serialize;

use crate::quest::{QuestCollection, SectionKind, quest_id, quest_section, quest_title};

pub const DEFAULT_MAX_LENGTH: usize = 200;

const PREVIEW_LENGTH: usize = 100;

/// One narrative string exceeding the length limit.
#[derive(Debug, Clone, Serialize)]
pub struct LengthViolation {
    pub theme: String,
    /// "prologue", "epilogue", or "quest".
    pub location: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quest_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quest_title: Option<String>,
    /// Field path, e.g. `description_lore[2]`.
    pub field: String,
    pub length: usize,
    pub preview: String,
}

/// Scan one collection for narrative text exceeding `max_length` characters.
/// Checks the collection-level prologue and epilogue and every quest's
/// description lore. Read-only.
pub fn check_collection(
    theme: &str,
    collection: &QuestCollection,
    max_length: usize,
) -> Vec<LengthViolation> {
    let mut violations = Vec::new();

    for kind in [SectionKind::Prologue, SectionKind::Epilogue] {
        if let Some(paragraphs) = collection.meta_section(kind) {
            for (index, text) in paragraphs.iter().enumerate() {
                if let Some(violation) =
                    check_text(theme, kind.key(), kind.key(), index, text, max_length)
                {
                    violations.push(violation);
                }
            }
        }
    }

    for quest in collection.quests() {
        let Some(quest) = quest.as_object() else {
            continue;
        };
        if let Some(paragraphs) = quest_section(quest, SectionKind::DescriptionLore) {
            for (index, text) in paragraphs.iter().enumerate() {
                if let Some(mut violation) = check_text(
                    theme,
                    "quest",
                    SectionKind::DescriptionLore.key(),
                    index,
                    text,
                    max_length,
                ) {
                    violation.quest_id = quest_id(quest);
                    violation.quest_title = Some(quest_title(quest).to_string());
                    violations.push(violation);
                }
            }
        }
    }

    violations
}

fn check_text(
    theme: &str,
    location: &'static str,
    field: &str,
    index: usize,
    text: &str,
    max_length: usize,
) -> Option<LengthViolation> {
    let length = text.chars().count();
    if length <= max_length {
        return None;
    }
    Some(LengthViolation {
        theme: theme.to_string(),
        location,
        quest_id: None,
        quest_title: None,
        field: format!("{field}[{index}]"),
        length,
        preview: preview(text),
    })
}

fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_LENGTH {
        let mut short: String = text.chars().take(PREVIEW_LENGTH).collect();
        short.push_str("...");
        short
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(text: &str) -> QuestCollection {
        QuestCollection::parse(text).unwrap()
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let exact = "x".repeat(10);
        let over = "x".repeat(11);
        let doc = format!(r#"{{"prologue": ["{exact}", "{over}"], "quests": []}}"#);
        let violations = check_collection("fantasy", &collection(&doc), 10);

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "prologue[1]");
        assert_eq!(violations[0].length, 11);
        assert_eq!(violations[0].location, "prologue");
        assert_eq!(violations[0].quest_id, None);
    }

    #[test]
    fn test_quest_lore_violation_carries_metadata() {
        let long = "y".repeat(250);
        let doc = format!(
            r#"{{"quests": [{{"id": 3, "title": "Deep Dive", "description_lore": ["{long}"]}}]}}"#
        );
        let violations = check_collection("noir", &collection(&doc), DEFAULT_MAX_LENGTH);

        assert_eq!(violations.len(), 1);
        let v = &violations[0];
        assert_eq!(v.location, "quest");
        assert_eq!(v.quest_id, Some(3));
        assert_eq!(v.quest_title.as_deref(), Some("Deep Dive"));
        assert_eq!(v.field, "description_lore[0]");
        assert_eq!(v.length, 250);
    }

    #[test]
    fn test_preview_truncated_at_100_chars() {
        let long = "a".repeat(150);
        let doc = format!(r#"{{"epilogue": ["{long}"], "quests": []}}"#);
        let violations = check_collection("scifi", &collection(&doc), 120);

        assert_eq!(violations[0].preview.chars().count(), 103);
        assert!(violations[0].preview.ends_with("..."));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let text = "é".repeat(8);
        let doc = format!(r#"{{"prologue": ["{text}"], "quests": []}}"#);
        assert!(check_collection("fantasy", &collection(&doc), 8).is_empty());
        assert_eq!(check_collection("fantasy", &collection(&doc), 7).len(), 1);
    }

    #[test]
    fn test_clean_collection_reports_nothing() {
        let doc = r#"{"prologue": ["short"], "quests": [{"id": 1, "description_lore": ["ok"]}]}"#;
        assert!(check_collection("fantasy", &collection(doc), DEFAULT_MAX_LENGTH).is_empty());
    }
}
