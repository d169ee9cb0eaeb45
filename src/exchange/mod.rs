pub mod export;
pub mod import;
pub mod marker;

pub use export::{ExportStats, append_lore, render_lore};
pub use import::{
    ParsedLore, QuestSections, UpdatePlan, UpdateStats, apply_update, parse_lore, plan_update,
};
pub use marker::{DIVIDER, MarkerLine};
