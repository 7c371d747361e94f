use thiserror::Error;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown transaction: {0}")]
    UnknownTransaction(i64),

    #[error("Unknown goal: {0}")]
    UnknownGoal(String),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Already linked: {0}")]
    AlreadyLinked(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TallyError>;
