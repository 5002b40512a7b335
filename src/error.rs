use serde::Serialize;
use thiserror::Error;

/// Longest conversion error message reported to callers.
pub const MAX_ERROR_MESSAGE_LEN: usize = 200;

#[derive(Error, Debug)]
pub enum MarkdownFetcherError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status error: {status}")]
    HttpStatus { status: u16 },

    #[error("Response decode error: {reason}")]
    Decode { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Conversion failed: {reason}")]
    Conversion { reason: String },

    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

/// Coarse error classes reported in failure envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCategory {
    Input,
    Fetch,
    Conversion,
    Config,
}

impl MarkdownFetcherError {
    /// Builds a conversion error, truncating the message so internal detail stays bounded.
    pub fn conversion(message: impl AsRef<str>) -> Self {
        let message = message.as_ref();
        let reason = if message.chars().count() > MAX_ERROR_MESSAGE_LEN {
            let truncated: String = message.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
            format!("{}...", truncated)
        } else {
            message.to_string()
        };

        MarkdownFetcherError::Conversion { reason }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            MarkdownFetcherError::InvalidInput { .. }
            | MarkdownFetcherError::InvalidUrl(_)
            | MarkdownFetcherError::FileNotFound { .. } => ErrorCategory::Input,
            MarkdownFetcherError::Http(_)
            | MarkdownFetcherError::HttpStatus { .. }
            | MarkdownFetcherError::Decode { .. }
            | MarkdownFetcherError::Io(_) => ErrorCategory::Fetch,
            MarkdownFetcherError::Conversion { .. } => ErrorCategory::Conversion,
            MarkdownFetcherError::Config { .. } => ErrorCategory::Config,
        }
    }
}

pub type Result<T> = std::result::Result<T, MarkdownFetcherError>;
