use std::fmt;
use std::path::PathBuf;

/// Direction a channel was opened in. A single handle is never bidirectional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenMode::Read => f.write_str("reading"),
            OpenMode::Write => f.write_str("writing"),
        }
    }
}

/// Errors that can occur in pipe channel operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The path could not be opened in the requested mode.
    #[error("failed to open {path} for {mode}: {source}")]
    NotFound {
        path: PathBuf,
        mode: OpenMode,
        source: std::io::Error,
    },

    /// The operation does not match the direction the channel was opened in.
    #[error("cannot {op} on a channel opened for {mode}")]
    InvalidOperation { op: &'static str, mode: OpenMode },

    /// Failed to create a FIFO node.
    #[error("failed to create fifo at {path}: {source}")]
    Fifo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the channel.
    #[error("channel I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
