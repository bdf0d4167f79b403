//! Fixed-size audio frames over byte-stream pipes.
//!
//! The transport side delivers bytes in whatever chunks it likes; the
//! pipeline side wants exactly one frame per clock tick. This crate sits in
//! between:
//! - [`FrameReader`] accumulates one frame of transport bytes, decoding A-law
//!   if configured, and signals end of stream when the pipe runs dry
//! - [`FrameWriter`] encodes one frame and hands it to the transport as a
//!   single flushed write
//!
//! No partial frames reach the pipeline and no partial reads leak into user
//! code.

pub mod alaw;
mod buffer;
pub mod diag;
pub mod error;
pub mod format;
pub mod frame;
pub mod port;
pub mod reader;
pub mod writer;

pub use diag::{DiagnosticEvent, DiagnosticSink, NoopSink, TracingSink};
pub use error::{FrameError, Result};
pub use format::{AudioFormat, Codec, PortConfig, BITS_PER_SAMPLE, DEFAULT_PTIME_MS};
pub use frame::{AudioFrame, FrameKind};
pub use port::{EofCallback, MediaPort, PortDirection, PortInfo};
pub use reader::FrameReader;
pub use writer::FrameWriter;
