use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("end_year ({end}) cannot be earlier than start_year ({start})")]
    YearOrder { start: i32, end: i32 },

    #[error("year {0} is outside the supported calendar")]
    YearRange(i32),

    #[error("input directory does not exist: {}", .0.display())]
    InputDir(PathBuf),

    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}
