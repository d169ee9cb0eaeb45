use std::fmt;

/// Placeholder title applied at presentation time only, never written back.
pub const UNTITLED: &str = "Untitled Quest";

/// Placeholder printed for quests without an `id`. Entries exported under it
/// carry no numeric discriminator and cannot be matched on import.
pub const UNKNOWN_ID: &str = "Unknown";

/// The three narrative sections a quest can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Prologue,
    DescriptionLore,
    Epilogue,
}

/// Fixed emission order: prologue, then description lore, then epilogue.
pub const SECTION_KINDS: [SectionKind; 3] = [
    SectionKind::Prologue,
    SectionKind::DescriptionLore,
    SectionKind::Epilogue,
];

impl SectionKind {
    /// JSON field name on the collection or quest object.
    pub fn key(&self) -> &'static str {
        match self {
            SectionKind::Prologue => "prologue",
            SectionKind::DescriptionLore => "description_lore",
            SectionKind::Epilogue => "epilogue",
        }
    }

    /// Marker name stem, e.g. `PROLOGUE` in `<!-- PROLOGUE_START -->`.
    pub fn marker_stem(&self) -> &'static str {
        match self {
            SectionKind::Prologue => "PROLOGUE",
            SectionKind::DescriptionLore => "DESCRIPTION_LORE",
            SectionKind::Epilogue => "EPILOGUE",
        }
    }

    /// Paragraph marker name. Description lore uses `LORE_PARAGRAPH`; the
    /// other two share their name between meta and quest level.
    pub fn paragraph_marker(&self) -> &'static str {
        match self {
            SectionKind::Prologue => "PROLOGUE_PARAGRAPH",
            SectionKind::DescriptionLore => "LORE_PARAGRAPH",
            SectionKind::Epilogue => "EPILOGUE_PARAGRAPH",
        }
    }

    /// Markdown heading text for the subsection.
    pub fn heading(&self) -> &'static str {
        match self {
            SectionKind::Prologue => "Prologue",
            SectionKind::DescriptionLore => "Description Lore",
            SectionKind::Epilogue => "Epilogue",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
