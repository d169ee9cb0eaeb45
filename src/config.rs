use std::path::{Path, PathBuf};

use crate::error::{LoresmithError, Result};

pub const QUESTS_FILE: &str = "quests.json";

/// Location of the per-theme quest content on disk.
#[derive(Debug, Clone)]
pub struct ContentConfig {
    pub base_dir: PathBuf,
}

/// File paths for one theme, following the naming convention
/// `<base>/<theme>/quests.json`, `lore-<theme>.md`, `solution-<theme>.md`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeContent {
    pub theme: String,
    pub quests_path: PathBuf,
    pub lore_path: PathBuf,
    pub solutions_path: PathBuf,
}

impl ThemeContent {
    fn for_theme(theme_dir: &Path, theme: &str) -> ThemeContent {
        ThemeContent {
            theme: theme.to_string(),
            quests_path: theme_dir.join(QUESTS_FILE),
            lore_path: theme_dir.join(format!("lore-{theme}.md")),
            solutions_path: theme_dir.join(format!("solution-{theme}.md")),
        }
    }

    fn from_quests_path(path: &Path) -> Option<ThemeContent> {
        let theme_dir = path.parent()?;
        let theme = theme_dir.file_name()?.to_str()?;
        Some(ThemeContent::for_theme(theme_dir, theme))
    }

    fn from_lore_path(path: &Path) -> Option<ThemeContent> {
        let stem = path.file_stem()?.to_str()?;
        let theme = stem.strip_prefix("lore-")?;
        Some(ThemeContent::for_theme(path.parent()?, theme))
    }
}

impl ContentConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> ContentConfig {
        ContentConfig {
            base_dir: base_dir.into(),
        }
    }

    fn ensure_exists(&self) -> Result<()> {
        if self.base_dir.is_dir() {
            Ok(())
        } else {
            Err(LoresmithError::QuestsDirMissing {
                path: self.base_dir.clone(),
            })
        }
    }

    /// All themes that have a quests.json, sorted by theme name.
    pub fn discover_collections(&self) -> Result<Vec<ThemeContent>> {
        self.collect(&format!("*/{QUESTS_FILE}"), ThemeContent::from_quests_path)
    }

    /// All themes that have a lore markdown file, sorted by theme name.
    /// The theme is taken from the filename, not the directory.
    pub fn discover_lore_files(&self) -> Result<Vec<ThemeContent>> {
        self.collect("*/lore-*.md", ThemeContent::from_lore_path)
    }

    fn collect(
        &self,
        pattern: &str,
        make: fn(&Path) -> Option<ThemeContent>,
    ) -> Result<Vec<ThemeContent>> {
        self.ensure_exists()?;
        let pattern = self.base_dir.join(pattern);
        let mut themes = Vec::new();
        for entry in glob::glob(&pattern.to_string_lossy())? {
            match entry {
                Ok(path) => {
                    if let Some(theme) = make(&path) {
                        themes.push(theme);
                    }
                }
                Err(e) => log::warn!("skipping unreadable path: {e}"),
            }
        }
        themes.sort_by(|a, b| a.theme.cmp(&b.theme));
        Ok(themes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "{}").unwrap();
    }

    #[test]
    fn test_discover_collections_sorted() {
        let temp_dir = tempfile::tempdir().unwrap();
        let base = temp_dir.path();
        touch(&base.join("noir").join("quests.json"));
        touch(&base.join("fantasy").join("quests.json"));
        touch(&base.join("empty-theme").join("notes.txt"));

        let config = ContentConfig::new(base);
        let themes = config.discover_collections().unwrap();

        let names: Vec<&str> = themes.iter().map(|t| t.theme.as_str()).collect();
        assert_eq!(names, vec!["fantasy", "noir"]);
        assert_eq!(themes[0].quests_path, base.join("fantasy/quests.json"));
        assert_eq!(themes[0].lore_path, base.join("fantasy/lore-fantasy.md"));
        assert_eq!(
            themes[0].solutions_path,
            base.join("fantasy/solution-fantasy.md")
        );
    }

    #[test]
    fn test_discover_lore_files_theme_from_filename() {
        let temp_dir = tempfile::tempdir().unwrap();
        let base = temp_dir.path();
        touch(&base.join("scifi").join("lore-scifi.md"));
        touch(&base.join("scifi").join("quests.json"));
        touch(&base.join("noir").join("quests.json"));

        let config = ContentConfig::new(base);
        let themes = config.discover_lore_files().unwrap();

        assert_eq!(themes.len(), 1);
        assert_eq!(themes[0].theme, "scifi");
        assert_eq!(themes[0].quests_path, base.join("scifi/quests.json"));
    }

    #[test]
    fn test_missing_base_dir_is_an_error() {
        let config = ContentConfig::new("/nonexistent/quests-dir");
        assert!(matches!(
            config.discover_collections(),
            Err(LoresmithError::QuestsDirMissing { .. })
        ));
    }
}
