use thiserror::Error;

/// Why a single fetch produced no usable value. Scoped to one field of one
/// poll cycle; never aborts the poll loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection refused, DNS failure, non-success status, ...
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    /// Body was not the expected JSON, or its shape check failed.
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// Merge rejected a whole cycle outcome.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeError {
    /// Outcome belongs to a cycle that was superseded or arrived after teardown.
    #[error("cycle {cycle} abandoned")]
    Abandoned { cycle: u64 },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerError {
    #[error("poller is already running")]
    AlreadyPolling,

    #[error("poller has been stopped")]
    Stopped,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid base url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unknown profile '{0}' (pass a URL to create it)")]
    UnknownProfile(String),

    #[error("poll interval must be at least {min_ms} ms, got {got_ms} ms")]
    IntervalTooShort { min_ms: u64, got_ms: u64 },

    #[error("request timeout must be greater than 0 ms")]
    ZeroTimeout,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
