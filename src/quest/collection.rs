use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{LoresmithError, Result};

use super::types::{SECTION_KINDS, SectionKind, UNKNOWN_ID, UNTITLED};

/// A quest collection document for one theme.
///
/// The document is kept as an ordered key/value map rather than a fixed
/// struct so that fields this tool does not know about survive a
/// read-modify-write cycle untouched, in their original position. Only the
/// narrative fields get typed accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestCollection {
    doc: Map<String, Value>,
}

impl QuestCollection {
    pub fn parse(text: &str) -> Result<QuestCollection> {
        let value: Value = serde_json::from_str(text)?;
        let doc = match value {
            Value::Object(map) => map,
            _ => {
                return Err(LoresmithError::InvalidCollection(
                    "top level is not an object".to_string(),
                ));
            }
        };
        if !doc.get("quests").is_some_and(Value::is_array) {
            return Err(LoresmithError::InvalidCollection(
                "missing \"quests\" array".to_string(),
            ));
        }
        Ok(QuestCollection { doc })
    }

    pub fn load(path: &Path) -> Result<QuestCollection> {
        QuestCollection::parse(&fs::read_to_string(path)?)
    }

    /// Serialize with two-space indentation, original key order, non-ASCII
    /// characters left unescaped, and a single trailing newline.
    pub fn to_json_string(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(&self.doc)?;
        out.push('\n');
        Ok(out)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Collection-level prologue or epilogue, if the key is present.
    pub fn meta_section(&self, kind: SectionKind) -> Option<Vec<String>> {
        string_seq(&self.doc, kind.key())
    }

    pub fn set_meta_section(&mut self, kind: SectionKind, paragraphs: Vec<String>) {
        self.doc
            .insert(kind.key().to_string(), string_seq_value(paragraphs));
    }

    pub fn quests(&self) -> &[Value] {
        match self.doc.get("quests") {
            Some(Value::Array(quests)) => quests,
            _ => &[],
        }
    }

    pub fn quests_mut(&mut self) -> &mut [Value] {
        match self.doc.get_mut("quests") {
            Some(Value::Array(quests)) => quests,
            _ => &mut [],
        }
    }

    /// Position of the quest with the given id. First match wins when ids
    /// repeat; uniqueness is not enforced.
    pub fn find_quest(&self, id: u64) -> Option<usize> {
        self.quests()
            .iter()
            .position(|q| q.as_object().and_then(quest_id) == Some(id))
    }
}

pub fn quest_id(quest: &Map<String, Value>) -> Option<u64> {
    quest.get("id")?.as_u64()
}

/// The quest id for display, falling back to a placeholder when absent.
pub fn quest_id_display(quest: &Map<String, Value>) -> String {
    match quest_id(quest) {
        Some(id) => id.to_string(),
        None => UNKNOWN_ID.to_string(),
    }
}

pub fn quest_title(quest: &Map<String, Value>) -> &str {
    quest
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or(UNTITLED)
}

/// A quest's narrative section, if the key is present (even when empty).
pub fn quest_section(quest: &Map<String, Value>, kind: SectionKind) -> Option<Vec<String>> {
    string_seq(quest, kind.key())
}

pub fn set_quest_section(
    quest: &mut Map<String, Value>,
    kind: SectionKind,
    paragraphs: Vec<String>,
) {
    quest.insert(kind.key().to_string(), string_seq_value(paragraphs));
}

/// Whether the quest carries at least one narrative section key.
pub fn has_narrative(quest: &Map<String, Value>) -> bool {
    SECTION_KINDS.iter().any(|kind| quest.contains_key(kind.key()))
}

fn string_seq(map: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    let items = map.get(key)?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
    )
}

fn string_seq_value(paragraphs: Vec<String>) -> Value {
    Value::Array(paragraphs.into_iter().map(Value::String).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_requires_object() {
        assert!(matches!(
            QuestCollection::parse("[1, 2]"),
            Err(LoresmithError::InvalidCollection(_))
        ));
    }

    #[test]
    fn test_parse_requires_quests_array() {
        assert!(matches!(
            QuestCollection::parse(r#"{"prologue": []}"#),
            Err(LoresmithError::InvalidCollection(_))
        ));
        assert!(matches!(
            QuestCollection::parse(r#"{"quests": 3}"#),
            Err(LoresmithError::InvalidCollection(_))
        ));
        assert!(QuestCollection::parse(r#"{"quests": []}"#).is_ok());
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(matches!(
            QuestCollection::parse("{not json"),
            Err(LoresmithError::Json(_))
        ));
    }

    #[test]
    fn test_meta_section_absent_stays_absent() {
        let collection = QuestCollection::parse(r#"{"quests": []}"#).unwrap();
        assert_eq!(collection.meta_section(SectionKind::Prologue), None);
        assert_eq!(collection.meta_section(SectionKind::Epilogue), None);
        // Absent keys are never serialized as empty arrays.
        assert!(!collection.to_json_string().unwrap().contains("prologue"));
    }

    #[test]
    fn test_serialization_preserves_key_order_and_unicode() {
        let text = "{\n  \"zeta\": 1,\n  \"quests\": [\n    {\n      \"id\": 1,\n      \"title\": \"Café\"\n    }\n  ],\n  \"alpha\": 2\n}\n";
        let collection = QuestCollection::parse(text).unwrap();
        let out = collection.to_json_string().unwrap();
        assert_eq!(out, text);
        assert!(out.contains("Café"));
        assert!(out.ends_with("}\n"));
    }

    #[test]
    fn test_quest_accessors_and_defaults() {
        let collection = QuestCollection::parse(
            r#"{"quests": [{"id": 7, "prologue": ["a", "b"]}, {"title": "Named"}]}"#,
        )
        .unwrap();
        let quests = collection.quests();
        let first = quests[0].as_object().unwrap();
        let second = quests[1].as_object().unwrap();

        assert_eq!(quest_id(first), Some(7));
        assert_eq!(quest_id_display(first), "7");
        assert_eq!(quest_title(first), UNTITLED);
        assert_eq!(
            quest_section(first, SectionKind::Prologue),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert!(has_narrative(first));

        assert_eq!(quest_id(second), None);
        assert_eq!(quest_id_display(second), UNKNOWN_ID);
        assert_eq!(quest_title(second), "Named");
        assert!(!has_narrative(second));
    }

    #[test]
    fn test_find_quest_first_match_wins() {
        let collection = QuestCollection::parse(
            r#"{"quests": [{"id": 2, "title": "first"}, {"id": 2, "title": "second"}]}"#,
        )
        .unwrap();
        let idx = collection.find_quest(2).unwrap();
        assert_eq!(idx, 0);
        assert!(collection.find_quest(9).is_none());
    }

    #[test]
    fn test_set_quest_section_overwrites_in_place() {
        let mut collection = QuestCollection::parse(
            r#"{"quests": [{"id": 1, "description_lore": ["old"], "difficulty": 5}]}"#,
        )
        .unwrap();
        let quest = collection.quests_mut()[0].as_object_mut().unwrap();
        set_quest_section(quest, SectionKind::DescriptionLore, vec!["new".to_string()]);

        let out = collection.to_json_string().unwrap();
        assert!(out.contains("\"new\""));
        assert!(!out.contains("\"old\""));
        assert!(out.contains("\"difficulty\": 5"));
        // The overwritten key keeps its original position.
        assert!(out.find("description_lore").unwrap() < out.find("difficulty").unwrap());
    }
}
