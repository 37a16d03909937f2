use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing argument `{name}`")]
    MissingArgument { name: &'static str },

    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    #[error("No runs found for workflow `{workflow}`")]
    NoRuns { workflow: String },

    #[error("Model API error: {0}")]
    ModelApi(String),

    /// The model stream failed after some of the reply was already shown.
    #[error("Response interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Command error: {0}")]
    Command(String),

    #[error("Turn cancelled")]
    Cancelled,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<octocrab::Error> for AppError {
    fn from(e: octocrab::Error) -> Self {
        AppError::GitHubApi(e.to_string())
    }
}

impl AppError {
    /// Input errors are the user's to fix; everything else is a backend or stream fault.
    pub fn is_input_error(&self) -> bool {
        matches!(self, AppError::MissingArgument { .. } | AppError::Command(_))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
