use std::path::PathBuf;

use pipeport_transport::TransportError;

/// Errors that can occur while producing or consuming audio frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The transport path could not be opened; no adapter was created.
    #[error("failed to open {path}: {source}")]
    NotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Construction parameters or a frame do not fit the audio format.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The transport ran dry before a complete frame was accumulated.
    #[error("end of stream ({received} of {expected} frame bytes received)")]
    EndOfStream { received: usize, expected: usize },

    /// The port does not support the operation, or has been closed.
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),

    /// Fewer bytes reached the transport than the frame required.
    #[error("short write ({written} of {expected} bytes)")]
    ShortWrite { written: usize, expected: usize },

    /// A transport-level failure other than open/I/O.
    #[error("transport error: {0}")]
    Transport(TransportError),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameError {
    /// True for the end-of-stream outcome of a read.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, FrameError::EndOfStream { .. })
    }
}

impl From<TransportError> for FrameError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::NotFound { path, source, .. } => FrameError::NotFound { path, source },
            TransportError::Io(io) => FrameError::Io(io),
            other => FrameError::Transport(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
