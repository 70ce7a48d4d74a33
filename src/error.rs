use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GridError>;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Repository not found at {}: {reason}", path.display())]
    RepositoryNotFound { path: PathBuf, reason: String },
    #[error("Failed to read commit history of '{repo}': {reason}")]
    Extraction { repo: String, reason: String },
    #[error("Invalid filter '{input}': {reason}")]
    InvalidFilter { input: String, reason: String },
    #[error("Cannot write output file {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GridError {
    pub fn repository_not_found(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        GridError::RepositoryNotFound {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn extraction(repo: impl Into<String>, reason: impl ToString) -> Self {
        GridError::Extraction {
            repo: repo.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_filter(input: impl Into<String>, reason: impl ToString) -> Self {
        GridError::InvalidFilter {
            input: input.into(),
            reason: reason.to_string(),
        }
    }
}
