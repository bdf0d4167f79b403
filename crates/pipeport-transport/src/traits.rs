use std::io::Cursor;

use crate::error::Result;

/// An owned transport endpoint that frame adapters read from or write to.
///
/// The label is used for diagnostics only. `close` consumes the endpoint, so a
/// channel cannot be used after it has been closed; endpoints without a
/// meaningful close status simply drop.
pub trait Channel {
    /// Human-readable name of the endpoint (usually its path).
    fn label(&self) -> &str {
        "anonymous"
    }

    /// Release the endpoint and report the close status.
    fn close(self) -> Result<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

/// In-memory channels, handy for embedding and for tests.
impl<T> Channel for Cursor<T> {
    fn label(&self) -> &str {
        "memory"
    }
}

impl Channel for std::fs::File {}

#[cfg(unix)]
impl Channel for std::os::unix::net::UnixStream {
    fn label(&self) -> &str {
        "unix-stream"
    }
}
