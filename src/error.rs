use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not logged in. Run `ledgerdesk login` first.")]
    NotLoggedIn,

    #[error("No entity selected. Pick one with `ledgerdesk entity <id>`.")]
    NoEntity,

    #[error("{0}")]
    Api(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, DeskError>;
