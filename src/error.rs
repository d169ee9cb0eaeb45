use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoresmithError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Quests directory not found: {}", path.display())]
    QuestsDirMissing { path: PathBuf },

    #[error("Invalid quest collection: {0}")]
    InvalidCollection(String),

    #[error("Invalid discovery pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Import error: {0}")]
    Import(String),
}

pub type Result<T> = std::result::Result<T, LoresmithError>;
