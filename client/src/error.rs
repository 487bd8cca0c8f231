use serde::Serialize;
use strum_macros::{AsRefStr, Display};

/// Failures of a single classification request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("Network error: {0}")]
    TransportUnreachable(String),
    #[error("Server error: status {0}")]
    ServerError(u16),
    #[error("HTTP error! status: {0}")]
    HttpError(u16),
    #[error("Failed to parse response: {0}")]
    MalformedResponse(String),
    #[error("Classifier task failed: {0}")]
    TaskFailed(String),
}

impl ClassifierError {
    /// Classifies a non-2xx status. Status 0 and 5xx mean the backend is down.
    pub fn from_status(status: u16) -> Self {
        if status == 0 || status >= 500 {
            ClassifierError::ServerError(status)
        } else {
            ClassifierError::HttpError(status)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
pub enum ErrorKind {
    TransportUnreachable,
    ServerError,
    HttpError,
    MalformedResponse,
    TaskFailed,
}

/// What the user sees when a submission fails.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub status: Option<u16>,
    pub message: String,
    /// Switching to simulated mode is the recommended way out.
    pub suggest_simulated: bool,
}

impl From<&ClassifierError> for ErrorInfo {
    fn from(err: &ClassifierError) -> Self {
        match err {
            ClassifierError::TransportUnreachable(detail) => ErrorInfo {
                kind: ErrorKind::TransportUnreachable,
                status: None,
                message: format!(
                    "Cannot connect to the classifier backend ({detail}). \
                     Make sure it is running, or switch to simulated mode."
                ),
                suggest_simulated: true,
            },
            ClassifierError::ServerError(status) => ErrorInfo {
                kind: ErrorKind::ServerError,
                status: Some(*status),
                message: format!(
                    "The classifier backend is not available (status {status}). \
                     Make sure it is running, or switch to simulated mode."
                ),
                suggest_simulated: true,
            },
            ClassifierError::HttpError(status) => ErrorInfo {
                kind: ErrorKind::HttpError,
                status: Some(*status),
                message: err.to_string(),
                suggest_simulated: false,
            },
            ClassifierError::MalformedResponse(_) => ErrorInfo {
                kind: ErrorKind::MalformedResponse,
                status: None,
                message: err.to_string(),
                suggest_simulated: false,
            },
            ClassifierError::TaskFailed(_) => ErrorInfo {
                kind: ErrorKind::TaskFailed,
                status: None,
                message: err.to_string(),
                suggest_simulated: false,
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImageFileError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Skipping non-image file: {0}")]
    NotAnImage(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
