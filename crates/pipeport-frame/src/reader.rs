use std::io::{ErrorKind, Read};
use std::path::Path;

use bytes::Buf;
use pipeport_transport::Channel;
#[cfg(unix)]
use pipeport_transport::PipeChannel;
use tracing::{debug, trace, warn};

use crate::alaw;
use crate::buffer::ConversionBuffer;
use crate::diag::{DiagnosticEvent, DiagnosticSink, NoopSink};
use crate::error::{FrameError, Result};
use crate::format::{AudioFormat, Codec, PortConfig};
use crate::frame::{AudioFrame, FrameKind};
use crate::port::{EofCallback, MediaPort, PortDirection, PortInfo};

/// Name reported by reader ports.
pub const SOURCE_PORT_NAME: &str = "pipe source";

/// Produces fixed-size audio frames from any `Read` channel.
///
/// Short reads are absorbed internally: a frame is only handed out once all
/// of its transport bytes have arrived. A read that yields nothing while the
/// frame is incomplete is end of stream.
pub struct FrameReader<T> {
    inner: Option<T>,
    label: String,
    info: PortInfo,
    buf: ConversionBuffer,
    eof_cb: Option<EofCallback>,
    sink: Box<dyn DiagnosticSink>,
    timestamp: u64,
}

impl<T: Read + Channel> FrameReader<T> {
    /// Create a reader with default configuration.
    pub fn new(format: AudioFormat, inner: T) -> Self {
        Self::with_config(format, inner, PortConfig::default())
    }

    /// Create a reader with explicit configuration.
    pub fn with_config(format: AudioFormat, inner: T, config: PortConfig) -> Self {
        let label = inner.label().to_string();
        debug!(label = %label, %format, "pipe reader ready");
        Self {
            inner: Some(inner),
            label,
            info: PortInfo {
                name: SOURCE_PORT_NAME.to_string(),
                direction: PortDirection::Source,
                format,
            },
            buf: ConversionBuffer::new(format.conversion_buffer_bytes(), config.buffer_size_hint),
            eof_cb: None,
            sink: Box::new(NoopSink),
            timestamp: 0,
        }
    }

    /// Route diagnostics to `sink` instead of discarding them.
    pub fn with_diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self.sink.record(&DiagnosticEvent::Opened {
            label: &self.label,
            direction: PortDirection::Source,
        });
        self
    }

    /// Register the end-of-stream handler, replacing any previous one.
    pub fn set_eof_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&PortInfo) + Send + 'static,
    {
        self.eof_cb = Some(Box::new(callback));
    }

    /// Remove the end-of-stream handler.
    pub fn clear_eof_callback(&mut self) {
        self.eof_cb = None;
    }

    /// Read the next complete frame into `frame` (blocking).
    ///
    /// On success `frame` holds linear audio of exactly one frame. When the
    /// transport runs dry first, `frame` becomes a `None` frame of size 0,
    /// the end-of-stream callback runs, and
    /// [`FrameError::EndOfStream`] is returned. The channel stays open.
    pub fn read_frame(&mut self, frame: &mut AudioFrame) -> Result<()> {
        let inner = self
            .inner
            .as_mut()
            .ok_or(FrameError::InvalidOperation("reader is closed"))?;

        let format = self.info.format;
        let expected = format.transport_frame_bytes();
        let scratch = &mut self.buf.get_mut()[..expected];
        let received = read_full(inner, scratch, &self.label, self.sink.as_ref());

        if received < expected {
            frame.clear();
            self.sink.record(&DiagnosticEvent::EndOfStream {
                label: &self.label,
                received,
                expected,
            });
            debug!(label = %self.label, received, expected, "pipe reader reached end of stream");
            if let Some(callback) = self.eof_cb.as_mut() {
                callback(&self.info);
            }
            return Err(FrameError::EndOfStream { received, expected });
        }

        frame.samples.resize(format.frame_samples(), 0);
        match format.codec() {
            Codec::Linear16 => {
                let mut src: &[u8] = scratch;
                for sample in frame.samples.iter_mut() {
                    *sample = src.get_i16_ne();
                }
            }
            Codec::ALaw => {
                alaw::decode(scratch, &mut frame.samples);
            }
        }

        frame.kind = FrameKind::Audio;
        frame.size = format.pipeline_frame_bytes();
        frame.timestamp = self.timestamp;
        self.timestamp += u64::from(format.samples_per_frame());
        Ok(())
    }

    /// Close the channel. Must not race an in-flight `read_frame`, which
    /// `&mut self` already rules out.
    pub fn close(&mut self) -> Result<()> {
        let inner = self
            .inner
            .take()
            .ok_or(FrameError::InvalidOperation("reader already closed"))?;
        inner.close()?;
        self.sink
            .record(&DiagnosticEvent::Closed { label: &self.label });
        debug!(label = %self.label, "pipe reader closed");
        Ok(())
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Borrow the underlying channel, if still open.
    pub fn get_ref(&self) -> Option<&T> {
        self.inner.as_ref()
    }

    /// The port identity passed to callbacks.
    pub fn info(&self) -> &PortInfo {
        &self.info
    }

    pub fn format(&self) -> &AudioFormat {
        &self.info.format
    }

    #[cfg(test)]
    pub(crate) fn buffer(&self) -> &ConversionBuffer {
        &self.buf
    }
}

#[cfg(unix)]
impl FrameReader<PipeChannel> {
    /// Open `path` read-only and wrap it. Fails with
    /// [`FrameError::NotFound`] if the path cannot be opened.
    pub fn open(format: AudioFormat, path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(format, path, PortConfig::default())
    }

    pub fn open_with_config(
        format: AudioFormat,
        path: impl AsRef<Path>,
        config: PortConfig,
    ) -> Result<Self> {
        let channel = PipeChannel::open_read(path)?;
        Ok(Self::with_config(format, channel, config))
    }
}

impl<T: Read + Channel> MediaPort for FrameReader<T> {
    fn info(&self) -> &PortInfo {
        &self.info
    }

    fn get_frame(&mut self, frame: &mut AudioFrame) -> Result<()> {
        self.read_frame(frame)
    }

    fn close(&mut self) -> Result<()> {
        FrameReader::close(self)
    }
}

/// Read until `buf` is full or the channel yields no more bytes. Returns the
/// number of bytes accumulated.
fn read_full<T: Read>(
    inner: &mut T,
    buf: &mut [u8],
    label: &str,
    sink: &dyn DiagnosticSink,
) -> usize {
    let expected = buf.len();
    let mut filled = 0usize;
    while filled < expected {
        match inner.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => {
                filled += n;
                trace!(label, read = n, filled, expected, "pipe reader chunk");
                sink.record(&DiagnosticEvent::Read {
                    label,
                    bytes: n,
                    accumulated: filled,
                    expected,
                });
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => {
                warn!(label, filled, expected, error = %err, "pipe read failed mid-frame");
                break;
            }
        }
    }
    filled
}
