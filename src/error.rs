use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from filesystem or terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A listing could not be loaded for a reason other than permissions.
    #[error("Cannot load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external opener could not be started.
    #[error("Cannot start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The external opener ran but reported failure.
    #[error("{command} exited with {status}")]
    ExitStatus { command: String, status: ExitStatus },
}

impl AppError {
    /// Wrap an I/O error raised while loading `path`.
    pub fn load(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Load {
            path: path.into(),
            source,
        }
    }
}
