use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CompanionError {
    #[error("Habit not found: {0}")]
    HabitNotFound(Uuid),

    #[error("Log not found: {0}")]
    LogNotFound(Uuid),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Import rejected: {}", .0.join("; "))]
    Import(Vec<String>),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, CompanionError>;
