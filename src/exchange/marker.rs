//! The marker grammar shared by the exporter and the importer.
//!
//! Markers are HTML comments, one per line, case-sensitive:
//!
//! ```text
//! <!-- META_PROLOGUE_START -->         ... <!-- META_PROLOGUE_END -->
//! <!-- META_EPILOGUE_START -->         ... <!-- META_EPILOGUE_END -->
//! <!-- LORE_ENTRY_START quest_id=N --> ... <!-- LORE_ENTRY_END quest_id=N -->
//! <!-- PROLOGUE_START -->              ... <!-- PROLOGUE_END -->
//! <!-- DESCRIPTION_LORE_START -->      ... <!-- DESCRIPTION_LORE_END -->
//! <!-- EPILOGUE_START -->              ... <!-- EPILOGUE_END -->
//! <!-- PROLOGUE_PARAGRAPH index=N -->
//! <!-- LORE_PARAGRAPH index=N -->
//! <!-- EPILOGUE_PARAGRAPH index=N -->
//! ```
//!
//! A `---` divider line follows each top-level section or entry.

use std::sync::LazyLock;

use regex::Regex;

use crate::quest::SectionKind;

pub const DIVIDER: &str = "---";

/// One classified marker line. Lines that are not markers classify as `None`
/// and belong to the surrounding paragraph text (or are ignored, for headings
/// and blank lines outside a paragraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerLine {
    /// `META_PROLOGUE_START` / `META_EPILOGUE_START`.
    MetaStart(SectionKind),
    MetaEnd(SectionKind),
    /// `LORE_ENTRY_START quest_id=N`.
    EntryStart(u64),
    EntryEnd(u64),
    /// Quest-level subsection start, e.g. `DESCRIPTION_LORE_START`.
    SectionStart(SectionKind),
    SectionEnd(SectionKind),
    /// A paragraph marker; the kind identifies which marker name it uses.
    Paragraph { kind: SectionKind, index: usize },
    Divider,
}

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<!-- ([A-Z_]+)(?: (quest_id|index)=(\d+))? -->$").unwrap()
});

/// Classify a single line. Trailing whitespace is tolerated, anything else
/// must match the grammar exactly.
pub fn classify(line: &str) -> Option<MarkerLine> {
    use SectionKind::{DescriptionLore, Epilogue, Prologue};

    let line = line.trim_end();
    if line == DIVIDER {
        return Some(MarkerLine::Divider);
    }

    let caps = MARKER_RE.captures(line)?;
    let name = caps.get(1).map(|m| m.as_str())?;
    let arg_key = caps.get(2).map(|m| m.as_str());
    let arg = caps.get(3).and_then(|m| m.as_str().parse::<u64>().ok());

    match (name, arg_key) {
        ("META_PROLOGUE_START", None) => Some(MarkerLine::MetaStart(Prologue)),
        ("META_PROLOGUE_END", None) => Some(MarkerLine::MetaEnd(Prologue)),
        ("META_EPILOGUE_START", None) => Some(MarkerLine::MetaStart(Epilogue)),
        ("META_EPILOGUE_END", None) => Some(MarkerLine::MetaEnd(Epilogue)),
        ("LORE_ENTRY_START", Some("quest_id")) => arg.map(MarkerLine::EntryStart),
        ("LORE_ENTRY_END", Some("quest_id")) => arg.map(MarkerLine::EntryEnd),
        ("PROLOGUE_START", None) => Some(MarkerLine::SectionStart(Prologue)),
        ("PROLOGUE_END", None) => Some(MarkerLine::SectionEnd(Prologue)),
        ("DESCRIPTION_LORE_START", None) => Some(MarkerLine::SectionStart(DescriptionLore)),
        ("DESCRIPTION_LORE_END", None) => Some(MarkerLine::SectionEnd(DescriptionLore)),
        ("EPILOGUE_START", None) => Some(MarkerLine::SectionStart(Epilogue)),
        ("EPILOGUE_END", None) => Some(MarkerLine::SectionEnd(Epilogue)),
        ("PROLOGUE_PARAGRAPH", Some("index")) => paragraph(Prologue, arg),
        ("LORE_PARAGRAPH", Some("index")) => paragraph(DescriptionLore, arg),
        ("EPILOGUE_PARAGRAPH", Some("index")) => paragraph(Epilogue, arg),
        _ => None,
    }
}

fn paragraph(kind: SectionKind, arg: Option<u64>) -> Option<MarkerLine> {
    Some(MarkerLine::Paragraph {
        kind,
        index: usize::try_from(arg?).ok()?,
    })
}

// Marker writers, used by the exporter.

pub fn meta_start(kind: SectionKind) -> String {
    format!("<!-- META_{}_START -->", kind.marker_stem())
}

pub fn meta_end(kind: SectionKind) -> String {
    format!("<!-- META_{}_END -->", kind.marker_stem())
}

pub fn entry_start(id: &str) -> String {
    format!("<!-- LORE_ENTRY_START quest_id={id} -->")
}

pub fn entry_end(id: &str) -> String {
    format!("<!-- LORE_ENTRY_END quest_id={id} -->")
}

pub fn section_start(kind: SectionKind) -> String {
    format!("<!-- {}_START -->", kind.marker_stem())
}

pub fn section_end(kind: SectionKind) -> String {
    format!("<!-- {}_END -->", kind.marker_stem())
}

pub fn paragraph_marker(kind: SectionKind, index: usize) -> String {
    format!("<!-- {} index={index} -->", kind.paragraph_marker())
}

#[cfg(test)]
mod tests {
    use super::*;
    use SectionKind::{DescriptionLore, Epilogue, Prologue};

    #[test]
    fn test_classify_meta_markers() {
        assert_eq!(
            classify("<!-- META_PROLOGUE_START -->"),
            Some(MarkerLine::MetaStart(Prologue))
        );
        assert_eq!(
            classify("<!-- META_EPILOGUE_END -->"),
            Some(MarkerLine::MetaEnd(Epilogue))
        );
    }

    #[test]
    fn test_classify_entry_markers() {
        assert_eq!(
            classify("<!-- LORE_ENTRY_START quest_id=12 -->"),
            Some(MarkerLine::EntryStart(12))
        );
        assert_eq!(
            classify("<!-- LORE_ENTRY_END quest_id=12 -->"),
            Some(MarkerLine::EntryEnd(12))
        );
        // A non-numeric discriminator (e.g. the placeholder for quests
        // without an id) is not a recognizable entry marker.
        assert_eq!(classify("<!-- LORE_ENTRY_START quest_id=Unknown -->"), None);
    }

    #[test]
    fn test_classify_section_and_paragraph_markers() {
        assert_eq!(
            classify("<!-- DESCRIPTION_LORE_START -->"),
            Some(MarkerLine::SectionStart(DescriptionLore))
        );
        assert_eq!(
            classify("<!-- EPILOGUE_END -->"),
            Some(MarkerLine::SectionEnd(Epilogue))
        );
        assert_eq!(
            classify("<!-- LORE_PARAGRAPH index=3 -->"),
            Some(MarkerLine::Paragraph {
                kind: DescriptionLore,
                index: 3
            })
        );
        assert_eq!(
            classify("<!-- PROLOGUE_PARAGRAPH index=0 -->"),
            Some(MarkerLine::Paragraph {
                kind: Prologue,
                index: 0
            })
        );
    }

    #[test]
    fn test_classify_divider_and_plain_text() {
        assert_eq!(classify("---"), Some(MarkerLine::Divider));
        assert_eq!(classify("--- "), Some(MarkerLine::Divider));
        assert_eq!(classify("----"), None);
        assert_eq!(classify("# Prologue"), None);
        assert_eq!(classify("plain paragraph text"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_classify_is_case_sensitive_and_exact() {
        assert_eq!(classify("<!-- meta_prologue_start -->"), None);
        assert_eq!(classify("<!--META_PROLOGUE_START-->"), None);
        assert_eq!(classify("<!-- PROLOGUE_PARAGRAPH -->"), None);
        assert_eq!(classify("<!-- PROLOGUE_PARAGRAPH quest_id=1 -->"), None);
        assert_eq!(classify("<!-- LORE_ENTRY_START index=1 -->"), None);
    }

    #[test]
    fn test_writers_round_trip_through_classify() {
        assert_eq!(
            classify(&meta_start(Prologue)),
            Some(MarkerLine::MetaStart(Prologue))
        );
        assert_eq!(classify(&entry_start("4")), Some(MarkerLine::EntryStart(4)));
        assert_eq!(classify(&entry_end("4")), Some(MarkerLine::EntryEnd(4)));
        assert_eq!(
            classify(&section_start(DescriptionLore)),
            Some(MarkerLine::SectionStart(DescriptionLore))
        );
        assert_eq!(
            classify(&paragraph_marker(Epilogue, 2)),
            Some(MarkerLine::Paragraph {
                kind: Epilogue,
                index: 2
            })
        );
    }
}
