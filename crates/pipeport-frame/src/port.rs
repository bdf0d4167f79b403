use crate::error::{FrameError, Result};
use crate::format::AudioFormat;
use crate::frame::AudioFrame;

/// Which way frames flow through a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    /// Produces frames for the pipeline (reads the transport).
    Source,
    /// Consumes frames from the pipeline (writes the transport).
    Sink,
}

/// Identity of a port, passed to end-of-stream callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub name: String,
    pub direction: PortDirection,
    pub format: AudioFormat,
}

/// Invoked from `get_frame` when the transport is exhausted mid-frame. User
/// context is whatever the closure captures.
pub type EofCallback = Box<dyn FnMut(&PortInfo) + Send>;

/// The per-tick surface a host pipeline drives.
///
/// A port supports the direction it was created for; the other operation
/// reports [`FrameError::InvalidOperation`]. The host keeps at most one call
/// outstanding per port, and closes it only after the last call returned.
pub trait MediaPort {
    fn info(&self) -> &PortInfo;

    /// Fill `frame` with the next frame from the transport.
    fn get_frame(&mut self, frame: &mut AudioFrame) -> Result<()> {
        let _ = frame;
        Err(FrameError::InvalidOperation("get_frame on a sink port"))
    }

    /// Push `frame` to the transport, returning the bytes written.
    fn put_frame(&mut self, frame: &AudioFrame) -> Result<usize> {
        let _ = frame;
        Err(FrameError::InvalidOperation("put_frame on a source port"))
    }

    /// Close the transport. A second call reports `InvalidOperation`.
    fn close(&mut self) -> Result<()>;
}
