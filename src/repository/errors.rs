use thiserror::Error;

/// Failures raised while fetching and parsing an agency export.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The fetch itself failed or the server answered with a non-2xx status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The body is an HTML page or too short to be a CSV export.
    #[error("Unexpected content: {0}")]
    Content(String),

    /// Parsing succeeded but produced no usable rows.
    #[error("Empty dataset: {0}")]
    Empty(String),

    /// The agency is not present in the configuration.
    #[error("Unknown agency: {0}")]
    UnknownAgency(String),

    /// A newer agency selection replaced this load before it finished.
    #[error("Load superseded by a newer agency selection: {0}")]
    Superseded(String),

    /// Every attempt failed; carries the last underlying failure.
    #[error("Failed to load {file} for agency {agency}: {reason}")]
    Failed {
        agency: String,
        file: String,
        reason: String,
    },
}

impl LoadError {
    /// Returns true if the error is transient and the fetch should be retried.
    pub fn should_retry(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Content(_))
    }
}

pub type LoadResult<T> = Result<T, LoadError>;

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::Transport(format!("I/O error: {err}"))
    }
}

impl From<reqwest::Error> for LoadError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => LoadError::Transport(format!("HTTP {status}")),
            None => LoadError::Transport(format!("Request error: {err}")),
        }
    }
}
