//! Failure taxonomy for Graph API calls and cache writes

use thiserror::Error;

/// Error raised while talking to the Graph API or persisting its results
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network unreachable, connection reset, body interrupted
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-2xx status
    #[error("request to {url} failed with status {status}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// Body was not the JSON shape we expected
    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Well-formed JSON with an expected field absent or empty
    #[error("response is missing {0}")]
    MissingField(&'static str),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Object id that cannot stand as a single path segment
    #[error("invalid graph path segment {0:?}")]
    InvalidPath(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything a non-HTTP transport reports (used by in-process doubles)
    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Short label used when recording a failure on a record
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) | FetchError::Status { .. } | FetchError::Other(_) => {
                "transport"
            }
            FetchError::Parse(_) | FetchError::InvalidUrl(_) | FetchError::InvalidPath(_) => {
                "parse"
            }
            FetchError::MissingField(_) => "partial data",
            FetchError::Io(_) => "io",
        }
    }
}
