use thiserror::Error;

use crate::source::Source;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Transport error for {target}: {message}")]
    Transport { target: Source, message: String },

    #[error("Report deadline of {0:?} exceeded")]
    DeadlineExceeded(std::time::Duration),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Invalid URL: {0}")]
    UrlParse(String),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Invalid period format: {0}")]
    PeriodParse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown client: {0}")]
    UnknownClient(String),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::UrlParse(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
