use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    FeedParse(#[from] feed_rs::parser::ParseFeedError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Proxy error: {0}")]
    Proxy(String),

    #[error("Feed unavailable (direct: {direct}; proxy: {proxy})")]
    Fetch { direct: String, proxy: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("{0}")]
    Usage(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Exit status for errors caused by the user's input; those are printed
    /// as plain messages instead of being returned from `main`.
    pub fn user_exit_code(&self) -> Option<i32> {
        match self {
            AppError::Usage(_) => Some(2),
            AppError::Conflict(_) | AppError::NotFound(_) => Some(1),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
