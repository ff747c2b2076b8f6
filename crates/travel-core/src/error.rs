use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned status {0}")]
    Status(u16),

    #[error("Malformed response body: {0}")]
    Decode(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl ChatError {
    /// Whether this failure came from talking to the backend (network, status, body)
    /// rather than from local setup.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ChatError::Http(_) | ChatError::Status(_) | ChatError::Decode(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
