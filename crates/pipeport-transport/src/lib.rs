//! Raw byte-stream channels over named pipes (FIFOs) and regular files.
//!
//! This is the lowest layer of pipeport. A [`PipeChannel`] is opened either
//! read-only or write-only; reads and writes block the calling thread and are
//! never retried here. Write-mode channels request synchronous-durable
//! semantics, and every [`PipeChannel::write_from`] is followed by an explicit
//! sync so a reader on the other end observes data promptly.
//!
//! The [`raw`] module exposes the same operations on bare file descriptors for
//! collaborators that want direct pipe access without the adapters.

pub mod error;
pub mod traits;

#[cfg(unix)]
pub mod pipe;
#[cfg(unix)]
pub mod raw;

pub use error::{OpenMode, Result, TransportError};
pub use traits::Channel;

#[cfg(unix)]
pub use pipe::{create_fifo, PipeChannel};
