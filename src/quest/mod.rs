pub mod collection;
pub mod types;

pub use collection::{
    QuestCollection, has_narrative, quest_id, quest_id_display, quest_section, quest_title,
    set_quest_section,
};
pub use types::{SECTION_KINDS, SectionKind, UNKNOWN_ID, UNTITLED};
