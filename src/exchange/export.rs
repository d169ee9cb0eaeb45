use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::error::{LoresmithError, Result};
use crate::quest::{
    QuestCollection, SECTION_KINDS, SectionKind, quest_id_display, quest_section, quest_title,
};

use super::marker;

#[derive(Debug, Default, Clone, Copy)]
pub struct ExportStats {
    /// Quest-level entries written.
    pub entries: usize,
    pub meta_prologue_paragraphs: usize,
    pub meta_epilogue_paragraphs: usize,
}

impl ExportStats {
    pub fn is_empty(&self) -> bool {
        self.entries == 0
            && self.meta_prologue_paragraphs == 0
            && self.meta_epilogue_paragraphs == 0
    }
}

/// Render the collection's narrative content as a marked document.
///
/// Emitted in fixed order: collection prologue (when non-empty), one entry
/// per quest that has at least one narrative section key (even when the
/// array is empty), collection epilogue (when non-empty). Quests keep their
/// collection order; each top-level block ends with a divider.
pub fn render_lore(collection: &QuestCollection) -> (String, ExportStats) {
    let mut out = String::new();
    let mut stats = ExportStats::default();

    if let Some(paragraphs) = collection.meta_section(SectionKind::Prologue)
        && !paragraphs.is_empty()
    {
        render_meta(&mut out, SectionKind::Prologue, &paragraphs);
        stats.meta_prologue_paragraphs = paragraphs.len();
    }

    for quest in collection.quests() {
        let Some(quest) = quest.as_object() else {
            continue;
        };
        let sections: Vec<(SectionKind, Vec<String>)> = SECTION_KINDS
            .iter()
            .filter_map(|&kind| quest_section(quest, kind).map(|p| (kind, p)))
            .collect();
        if sections.is_empty() {
            continue;
        }

        let id = quest_id_display(quest);
        out.push_str(&marker::entry_start(&id));
        out.push('\n');
        out.push_str(&format!("## Quest {}: {}\n\n", id, quest_title(quest)));

        for (kind, paragraphs) in &sections {
            out.push_str(&marker::section_start(*kind));
            out.push('\n');
            out.push_str(&format!("### {}\n\n", kind.heading()));
            render_paragraphs(&mut out, *kind, paragraphs);
            out.push_str(&marker::section_end(*kind));
            out.push_str("\n\n");
        }

        out.push_str(&marker::entry_end(&id));
        out.push_str("\n\n");
        out.push_str(marker::DIVIDER);
        out.push_str("\n\n");
        stats.entries += 1;
    }

    if let Some(paragraphs) = collection.meta_section(SectionKind::Epilogue)
        && !paragraphs.is_empty()
    {
        render_meta(&mut out, SectionKind::Epilogue, &paragraphs);
        stats.meta_epilogue_paragraphs = paragraphs.len();
    }

    (out, stats)
}

fn render_meta(out: &mut String, kind: SectionKind, paragraphs: &[String]) {
    out.push_str(&marker::meta_start(kind));
    out.push('\n');
    out.push_str(&format!("# {}\n\n", kind.heading()));
    render_paragraphs(out, kind, paragraphs);
    out.push_str(&marker::meta_end(kind));
    out.push_str("\n\n");
    out.push_str(marker::DIVIDER);
    out.push_str("\n\n");
}

fn render_paragraphs(out: &mut String, kind: SectionKind, paragraphs: &[String]) {
    for (index, paragraph) in paragraphs.iter().enumerate() {
        out.push_str(&marker::paragraph_marker(kind, index));
        out.push('\n');
        out.push_str(paragraph);
        out.push_str("\n\n");
    }
}

/// Append the rendered document to the sink file, creating it if needed.
/// Existing content is never truncated or rewritten. Nothing is touched when
/// the collection has no narrative content at all.
pub fn append_lore(collection: &QuestCollection, path: &Path) -> Result<ExportStats> {
    let (text, stats) = render_lore(collection);
    if stats.is_empty() {
        return Ok(stats);
    }

    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| LoresmithError::Export(format!("failed to open {}: {e}", path.display())))?;
    file.write_all(text.as_bytes())
        .map_err(|e| LoresmithError::Export(format!("failed to write {}: {e}", path.display())))?;

    Ok(stats)
}
