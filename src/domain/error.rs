use std::path::PathBuf;

use thiserror::Error;

use crate::api::ApiError;

/// Problems with the command line, detected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error(
        "Invalid conversion types: {}.\nValid types are one or more of: {}",
        quoted(.invalid),
        .allowed.join(" ")
    )]
    InvalidTypes {
        invalid: Vec<String>,
        allowed: Vec<String>,
    },

    #[error(
        "Invalid PNG sizes: {}.\nValid sizes are one or more of: {}",
        quoted(.invalid),
        .allowed.join(" ")
    )]
    InvalidSizes {
        invalid: Vec<String>,
        allowed: Vec<String>,
    },

    #[error("Wrong number of file arguments. Expected exactly one, got {0}.")]
    WrongFileCount(usize),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
}

fn quoted(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|token| format!("'{}'", token))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Usage,
    Transport,
    Interrupted,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Transport(#[from] ApiError),

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Download task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("{failed} download(s) failed, first error: {first}")]
    Downloads { failed: usize, first: Box<AppError> },

    /// Ctrl-C arrived before the run finished. Output files may be partial.
    #[error("Interrupted, output files may be incomplete")]
    Interrupted,
}

impl AppError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Usage(_) => ErrorKind::Usage,
            AppError::Interrupted => ErrorKind::Interrupted,
            _ => ErrorKind::Transport,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Usage => 1,
            ErrorKind::Transport => 2,
            // 128 + SIGINT
            ErrorKind::Interrupted => 130,
        }
    }
}
