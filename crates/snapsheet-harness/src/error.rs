use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] snapsheet::ConfigError),

    #[error(transparent)]
    Sheet(#[from] snapsheet::SheetError),

    #[error("script not found: {path}")]
    MissingScript { path: PathBuf },

    #[error("invalid script: {message}")]
    InvalidScript { message: String },

    #[error("expectation failed at step {step}: {message}")]
    Expectation { step: usize, message: String },
}

impl HarnessError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Expectation { .. } => 2,
            _ => 1,
        }
    }
}
