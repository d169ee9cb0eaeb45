use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use serde_json::Value;

use crate::error::{LoresmithError, Result};
use crate::quest::{QuestCollection, quest_id_display, quest_title};

/// One quest's solution text with its display metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionEntry {
    pub id: String,
    pub title: String,
    pub solution: String,
}

/// Solutions in collection order, for quests that carry a `solution` string.
pub fn collect_solutions(collection: &QuestCollection) -> Vec<SolutionEntry> {
    collection
        .quests()
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|quest| {
            let solution = quest.get("solution")?.as_str()?;
            Some(SolutionEntry {
                id: quest_id_display(quest),
                title: quest_title(quest).to_string(),
                solution: solution.to_string(),
            })
        })
        .collect()
}

pub fn render_solutions(entries: &[SolutionEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!("## Quest: {} (ID: {})\n\n", entry.title, entry.id));
        out.push_str("```\n");
        out.push_str(&entry.solution);
        out.push_str("\n```");
        out.push_str("\n\n---\n\n");
    }
    out
}

/// Append all solutions to the sink file, creating it if needed. Returns the
/// number of entries written; nothing is touched when there are none.
pub fn append_solutions(collection: &QuestCollection, path: &Path) -> Result<usize> {
    let entries = collect_solutions(collection);
    if entries.is_empty() {
        return Ok(0);
    }

    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| LoresmithError::Export(format!("failed to open {}: {e}", path.display())))?;
    file.write_all(render_solutions(&entries).as_bytes())
        .map_err(|e| LoresmithError::Export(format!("failed to write {}: {e}", path.display())))?;

    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn collection(text: &str) -> QuestCollection {
        QuestCollection::parse(text).unwrap()
    }

    #[test]
    fn test_collect_skips_quests_without_solution() {
        let collection = collection(
            r#"{"quests": [
                {"id": 1, "title": "A", "solution": "answer one"},
                {"id": 2, "title": "B"},
                {"title": "C", "solution": "answer three"}
            ]}"#,
        );
        let entries = collect_solutions(&collection);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "1");
        assert_eq!(entries[1].id, "Unknown");
        assert_eq!(entries[1].title, "C");
    }

    #[test]
    fn test_render_format() {
        let entries = vec![SolutionEntry {
            id: "4".to_string(),
            title: "The Vault".to_string(),
            solution: "open sesame".to_string(),
        }];
        assert_eq!(
            render_solutions(&entries),
            "## Quest: The Vault (ID: 4)\n\n```\nopen sesame\n```\n\n---\n\n"
        );
    }

    #[test]
    fn test_append_preserves_existing_content() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("solution-noir.md");
        fs::write(&path, "notes\n").unwrap();

        let collection = collection(r#"{"quests": [{"id": 1, "solution": "s"}]}"#);
        assert_eq!(append_solutions(&collection, &path).unwrap(), 1);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("notes\n"));
        assert!(content.contains("## Quest: Untitled Quest (ID: 1)"));
    }

    #[test]
    fn test_append_skips_file_when_no_solutions() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("solution-noir.md");
        let collection = collection(r#"{"quests": [{"id": 1}]}"#);
        assert_eq!(append_solutions(&collection, &path).unwrap(), 0);
        assert!(!path.exists());
    }
}
