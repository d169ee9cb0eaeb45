use std::collections::{BTreeMap, HashSet};
use std::fmt;

use log::warn;

use crate::quest::{
    QuestCollection, SECTION_KINDS, SectionKind, has_narrative, quest_id, quest_section,
    quest_title, set_quest_section,
};

use super::marker::{self, MarkerLine};

/// Narrative sections parsed for one quest. Only sections that actually
/// appeared in the markdown are set; an unset section is never a candidate
/// for overwrite.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QuestSections {
    pub prologue: Option<Vec<String>>,
    pub description_lore: Option<Vec<String>>,
    pub epilogue: Option<Vec<String>>,
}

impl QuestSections {
    pub fn get(&self, kind: SectionKind) -> Option<&Vec<String>> {
        match kind {
            SectionKind::Prologue => self.prologue.as_ref(),
            SectionKind::DescriptionLore => self.description_lore.as_ref(),
            SectionKind::Epilogue => self.epilogue.as_ref(),
        }
    }

    fn set(&mut self, kind: SectionKind, paragraphs: Vec<String>) {
        let slot = match kind {
            SectionKind::Prologue => &mut self.prologue,
            SectionKind::DescriptionLore => &mut self.description_lore,
            SectionKind::Epilogue => &mut self.epilogue,
        };
        *slot = Some(paragraphs);
    }

    pub fn is_empty(&self) -> bool {
        self.prologue.is_none() && self.description_lore.is_none() && self.epilogue.is_none()
    }
}

/// The result of parsing a marked document.
#[derive(Debug, Default)]
pub struct ParsedLore {
    pub meta_prologue: Option<Vec<String>>,
    pub meta_epilogue: Option<Vec<String>>,
    pub quests: BTreeMap<u64, QuestSections>,
}

impl ParsedLore {
    pub fn meta(&self, kind: SectionKind) -> Option<&Vec<String>> {
        match kind {
            SectionKind::Prologue => self.meta_prologue.as_ref(),
            SectionKind::Epilogue => self.meta_epilogue.as_ref(),
            SectionKind::DescriptionLore => None,
        }
    }

    /// True when the document yielded nothing worth merging.
    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
            && self.meta_prologue.as_deref().is_none_or(|p| p.is_empty())
            && self.meta_epilogue.as_deref().is_none_or(|p| p.is_empty())
    }
}

/// Paragraphs slotted by their marker index. Indices need not arrive sorted
/// or contiguous; gaps are dropped on compaction rather than kept as holes.
#[derive(Debug, Default)]
struct ParagraphSlots {
    slots: Vec<Option<String>>,
}

impl ParagraphSlots {
    fn insert(&mut self, index: usize, text: String) {
        if self.slots.len() <= index {
            self.slots.resize(index + 1, None);
        }
        self.slots[index] = Some(text);
    }

    fn into_paragraphs(self) -> Vec<String> {
        self.slots.into_iter().flatten().collect()
    }
}

/// Parse a marked document with a single-pass line scanner.
///
/// Sections close only on their matching end marker; a quest entry in
/// particular closes only on an end marker carrying the same quest id.
/// Malformed structure (mismatched ids, duplicate sections, unterminated
/// spans) is warned about and the offending span is dropped, never guessed
/// at.
pub fn parse_lore(content: &str) -> ParsedLore {
    let lines: Vec<&str> = content.lines().collect();
    let mut parsed = ParsedLore::default();
    let mut pos = 0;

    while pos < lines.len() {
        match marker::classify(lines[pos]) {
            Some(MarkerLine::MetaStart(kind)) => {
                let (slots, next) = parse_section_body(&lines, pos + 1, kind, true);
                pos = next;
                match slots {
                    Some(slots) => {
                        let target = match kind {
                            SectionKind::Prologue => &mut parsed.meta_prologue,
                            _ => &mut parsed.meta_epilogue,
                        };
                        if target.is_some() {
                            warn!("duplicate meta {} section ignored (first wins)", kind.key());
                        } else {
                            *target = Some(slots.into_paragraphs());
                        }
                    }
                    None => warn!("unterminated meta {} section discarded", kind.key()),
                }
            }
            Some(MarkerLine::EntryStart(id)) => {
                let (sections, next) = parse_entry(&lines, pos + 1, id);
                pos = next;
                if let Some(sections) = sections {
                    if sections.is_empty() {
                        warn!("quest {id} has no lore sections");
                    } else if parsed.quests.contains_key(&id) {
                        warn!("duplicate entry for quest {id} ignored (first wins)");
                    } else {
                        parsed.quests.insert(id, sections);
                    }
                }
            }
            _ => pos += 1,
        }
    }

    parsed
}

/// Scan one quest entry until its matching end marker. Returns `None` if the
/// entry never closes.
fn parse_entry(lines: &[&str], start: usize, id: u64) -> (Option<QuestSections>, usize) {
    let mut sections = QuestSections::default();
    let mut pos = start;

    while pos < lines.len() {
        match marker::classify(lines[pos]) {
            Some(MarkerLine::EntryEnd(end_id)) if end_id == id => {
                return (Some(sections), pos + 1);
            }
            Some(MarkerLine::EntryEnd(end_id)) => {
                warn!("quest {id}: end marker with mismatched quest_id={end_id} does not close the entry");
                pos += 1;
            }
            Some(MarkerLine::EntryStart(nested)) => {
                warn!("quest {id}: nested entry start for quest {nested} ignored");
                pos += 1;
            }
            Some(MarkerLine::SectionStart(kind)) => {
                let (slots, next) = parse_section_body(lines, pos + 1, kind, false);
                pos = next;
                match slots {
                    Some(slots) => {
                        if sections.get(kind).is_some() {
                            warn!("quest {id}: duplicate {} subsection ignored (first wins)", kind.key());
                        } else {
                            sections.set(kind, slots.into_paragraphs());
                        }
                    }
                    None => {
                        warn!("quest {id}: unterminated {} subsection discarded", kind.key());
                    }
                }
            }
            _ => pos += 1,
        }
    }

    warn!("quest {id}: entry never closed, discarded");
    (None, pos)
}

/// Scan paragraphs inside one section until its end marker. A paragraph's
/// text runs from its marker line to the next marker line, a divider, or the
/// end of the section, and is trimmed of surrounding whitespace.
///
/// Returns `None` when a foreign structural marker or end of input is hit
/// before the section closes; scanning resumes at that marker.
fn parse_section_body(
    lines: &[&str],
    start: usize,
    kind: SectionKind,
    meta: bool,
) -> (Option<ParagraphSlots>, usize) {
    let mut slots = ParagraphSlots::default();
    let mut current: Option<(usize, Vec<&str>)> = None;
    let mut pos = start;

    while pos < lines.len() {
        let line = lines[pos];
        match marker::classify(line) {
            Some(MarkerLine::Paragraph { kind: para_kind, index }) => {
                flush(&mut slots, &mut current);
                if para_kind == kind {
                    current = Some((index, Vec::new()));
                } else {
                    warn!(
                        "{} marker inside a {} section ignored",
                        para_kind.paragraph_marker(),
                        kind.key()
                    );
                }
                pos += 1;
            }
            Some(MarkerLine::MetaEnd(end_kind)) if meta && end_kind == kind => {
                flush(&mut slots, &mut current);
                return (Some(slots), pos + 1);
            }
            Some(MarkerLine::SectionEnd(end_kind)) if !meta && end_kind == kind => {
                flush(&mut slots, &mut current);
                return (Some(slots), pos + 1);
            }
            Some(MarkerLine::Divider) => {
                flush(&mut slots, &mut current);
                pos += 1;
            }
            Some(_) => {
                // Foreign structural marker: the section was never closed.
                return (None, pos);
            }
            None => {
                if let Some((_, text)) = &mut current {
                    text.push(line);
                }
                pos += 1;
            }
        }
    }

    (None, pos)
}

fn flush(slots: &mut ParagraphSlots, current: &mut Option<(usize, Vec<&str>)>) {
    if let Some((index, text)) = current.take() {
        slots.insert(index, text.join("\n").trim().to_string());
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UpdateStats {
    /// Changed meta sections plus quests with at least one changed field.
    pub updated: usize,
    /// Quest ids present in the markdown but absent from the collection.
    /// Those quests are never synthesized.
    pub added: usize,
    /// Quest ids owning narrative in the collection but absent from the
    /// markdown. Their fields are retained as-is, never deleted.
    pub removed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Meta {
        kind: SectionKind,
        old_len: usize,
        paragraphs: Vec<String>,
    },
    QuestSection {
        quest_index: usize,
        id: u64,
        title: String,
        kind: SectionKind,
        old_len: usize,
        paragraphs: Vec<String>,
    },
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Meta {
                kind,
                old_len,
                paragraphs,
            } => write!(
                f,
                "Would update meta {} ({} -> {} paragraphs)",
                kind.key(),
                old_len,
                paragraphs.len()
            ),
            Change::QuestSection {
                id,
                title,
                kind,
                old_len,
                paragraphs,
                ..
            } => write!(
                f,
                "Would update Quest {} {}: {} ({} -> {} paragraphs)",
                id,
                kind.key(),
                title,
                old_len,
                paragraphs.len()
            ),
        }
    }
}

/// The computed difference between a parsed document and a collection.
#[derive(Debug, Default)]
pub struct UpdatePlan {
    pub changes: Vec<Change>,
    pub unknown_ids: Vec<u64>,
    pub unreferenced_ids: Vec<u64>,
    pub stats: UpdateStats,
}

impl UpdatePlan {
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty() && self.unknown_ids.is_empty() && self.unreferenced_ids.is_empty()
    }
}

/// Phase 1: compare parsed sections against the collection and queue the
/// changes. Nothing is mutated.
///
/// A section is queued only on a value difference against the current field
/// (an absent field compares as an empty sequence). Parsed quest ids missing
/// from the collection count as `added`; collection quests owning narrative
/// but missing from the markdown count as `removed`. Neither causes a
/// mutation.
pub fn plan_update(collection: &QuestCollection, parsed: &ParsedLore) -> UpdatePlan {
    let mut plan = UpdatePlan::default();

    for kind in [SectionKind::Prologue, SectionKind::Epilogue] {
        if let Some(new) = parsed.meta(kind) {
            let old = collection.meta_section(kind).unwrap_or_default();
            if old != *new {
                plan.changes.push(Change::Meta {
                    kind,
                    old_len: old.len(),
                    paragraphs: new.clone(),
                });
                plan.stats.updated += 1;
            }
        }
    }

    for (&id, new_sections) in &parsed.quests {
        let Some(quest_index) = collection.find_quest(id) else {
            plan.unknown_ids.push(id);
            plan.stats.added += 1;
            continue;
        };
        let Some(quest) = collection.quests()[quest_index].as_object() else {
            continue;
        };

        let mut quest_changed = false;
        for kind in SECTION_KINDS {
            if let Some(new) = new_sections.get(kind) {
                let old = quest_section(quest, kind).unwrap_or_default();
                if old != *new {
                    plan.changes.push(Change::QuestSection {
                        quest_index,
                        id,
                        title: quest_title(quest).to_string(),
                        kind,
                        old_len: old.len(),
                        paragraphs: new.clone(),
                    });
                    quest_changed = true;
                }
            }
        }
        if quest_changed {
            plan.stats.updated += 1;
        }
    }

    let mut seen = HashSet::new();
    for quest in collection.quests() {
        let Some(quest) = quest.as_object() else {
            continue;
        };
        if let Some(id) = quest_id(quest)
            && seen.insert(id)
            && !parsed.quests.contains_key(&id)
            && has_narrative(quest)
        {
            plan.unreferenced_ids.push(id);
            plan.stats.removed += 1;
        }
    }

    plan
}

/// Phase 2: apply the queued changes in place. Only fields named by the plan
/// are touched; every other field rides through untouched.
pub fn apply_update(collection: &mut QuestCollection, plan: &UpdatePlan) {
    for change in &plan.changes {
        match change {
            Change::Meta { kind, paragraphs, .. } => {
                collection.set_meta_section(*kind, paragraphs.clone());
            }
            Change::QuestSection {
                quest_index,
                kind,
                paragraphs,
                ..
            } => {
                if let Some(quest) = collection
                    .quests_mut()
                    .get_mut(*quest_index)
                    .and_then(serde_json::Value::as_object_mut)
                {
                    set_quest_section(quest, *kind, paragraphs.clone());
                }
            }
        }
    }
}
