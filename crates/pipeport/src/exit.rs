use std::fmt;

use pipeport_frame::FrameError;
use pipeport_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::InvalidOperation { .. } => {
            CliError::new(INTERNAL, format!("{context}: {err}"))
        }
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Transport(inner) => transport_error(context, inner),
        FrameError::NotFound { .. } | FrameError::Io(_) | FrameError::ShortWrite { .. } => {
            CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
        }
        FrameError::InvalidArgument(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        FrameError::EndOfStream { .. } => CliError::new(FAILURE, format!("{context}: {err}")),
        FrameError::InvalidOperation(_) => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

/// Format parameters come from the command line, so a rejected format is a
/// usage error rather than bad data.
pub fn format_error(err: FrameError) -> CliError {
    match err {
        FrameError::InvalidArgument(msg) => CliError::new(USAGE, format!("invalid format: {msg}")),
        other => frame_error("invalid format", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_errors_map_to_exit_codes() {
        let not_found = FrameError::NotFound {
            path: "/missing".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(frame_error("open", not_found).code, TRANSPORT_ERROR);
        assert_eq!(
            frame_error("put", FrameError::InvalidArgument("size".into())).code,
            DATA_INVALID
        );
        assert_eq!(
            frame_error("get", FrameError::InvalidOperation("closed")).code,
            INTERNAL
        );
        assert_eq!(
            format_error(FrameError::InvalidArgument("channels".into())).code,
            USAGE
        );
    }
}
