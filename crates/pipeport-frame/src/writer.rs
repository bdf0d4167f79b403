use std::io::{ErrorKind, Write};
use std::path::Path;

use bytes::BufMut;
use pipeport_transport::Channel;
#[cfg(unix)]
use pipeport_transport::PipeChannel;
use tracing::{debug, trace, warn};

use crate::alaw;
use crate::buffer::ConversionBuffer;
use crate::diag::{DiagnosticEvent, DiagnosticSink, NoopSink};
use crate::error::{FrameError, Result};
use crate::format::{AudioFormat, Codec, PortConfig};
use crate::frame::AudioFrame;
use crate::port::{MediaPort, PortDirection, PortInfo};

/// Writes fixed-size audio frames to any `Write` channel.
///
/// Every frame goes out as one write followed by a flush, and the call blocks
/// until both return. A blocked write is the pipeline's backpressure.
pub struct FrameWriter<T> {
    inner: Option<T>,
    info: PortInfo,
    config: PortConfig,
    buf: ConversionBuffer,
    sink: Box<dyn DiagnosticSink>,
    bytes_written: u64,
}

impl<T: Write + Channel> FrameWriter<T> {
    /// Create a writer with default configuration.
    pub fn new(format: AudioFormat, inner: T) -> Self {
        Self::with_config(format, inner, PortConfig::default())
    }

    /// Create a writer with explicit configuration.
    pub fn with_config(format: AudioFormat, inner: T, config: PortConfig) -> Self {
        let name = inner.label().to_string();
        debug!(
            label = %name,
            %format,
            buffer_size_hint = config.buffer_size_hint,
            "pipe writer ready"
        );
        Self {
            inner: Some(inner),
            info: PortInfo {
                name,
                direction: PortDirection::Sink,
                format,
            },
            buf: ConversionBuffer::new(format.conversion_buffer_bytes(), config.buffer_size_hint),
            config,
            sink: Box::new(NoopSink),
            bytes_written: 0,
        }
    }

    /// Route diagnostics to `sink` instead of discarding them.
    pub fn with_diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self.sink.record(&DiagnosticEvent::Opened {
            label: &self.info.name,
            direction: PortDirection::Sink,
        });
        self
    }

    /// Encode and write one frame (blocking). Returns the bytes the
    /// transport accepted.
    ///
    /// Frames that carry no audio are accepted without any I/O. A write that
    /// reaches the transport only partially is not retried; the partial
    /// count is returned, or [`FrameError::ShortWrite`] when
    /// [`PortConfig::strict_writes`] is set.
    pub fn write_frame(&mut self, frame: &AudioFrame) -> Result<usize> {
        let inner = self
            .inner
            .as_mut()
            .ok_or(FrameError::InvalidOperation("writer is closed"))?;

        if !frame.is_audio() {
            trace!(label = %self.info.name, kind = ?frame.kind, "skipping non-audio frame");
            return Ok(0);
        }

        let format = self.info.format;
        if frame.samples.len() != format.frame_samples() {
            return Err(FrameError::InvalidArgument(format!(
                "frame has {} samples, format expects {}",
                frame.samples.len(),
                format.frame_samples()
            )));
        }

        let expected = format.transport_frame_bytes();
        let scratch = &mut self.buf.get_mut()[..expected];
        match format.codec() {
            Codec::Linear16 => {
                let mut dst: &mut [u8] = &mut scratch[..];
                for &sample in &frame.samples {
                    dst.put_i16_ne(sample);
                }
            }
            Codec::ALaw => {
                alaw::encode(&frame.samples, scratch);
            }
        }

        let written = write_once(inner, scratch)?;
        self.bytes_written += written as u64;
        self.sink.record(&DiagnosticEvent::Wrote {
            label: &self.info.name,
            written,
            expected,
        });
        debug!(label = %self.info.name, written, expected, "pipe writer wrote frame");

        flush(inner)?;

        if written < expected {
            warn!(label = %self.info.name, written, expected, "short write to pipe");
            if self.config.strict_writes {
                return Err(FrameError::ShortWrite { written, expected });
            }
        }
        Ok(written)
    }

    /// Close the channel. A second call reports
    /// [`FrameError::InvalidOperation`].
    pub fn close(&mut self) -> Result<()> {
        let inner = self
            .inner
            .take()
            .ok_or(FrameError::InvalidOperation("writer already closed"))?;
        inner.close()?;
        self.sink.record(&DiagnosticEvent::Closed {
            label: &self.info.name,
        });
        debug!(label = %self.info.name, total = self.bytes_written, "pipe writer closed");
        Ok(())
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Total bytes accepted by the transport so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Borrow the underlying channel, if still open.
    pub fn get_ref(&self) -> Option<&T> {
        self.inner.as_ref()
    }

    pub fn info(&self) -> &PortInfo {
        &self.info
    }

    pub fn format(&self) -> &AudioFormat {
        &self.info.format
    }

    /// Current writer configuration.
    pub fn config(&self) -> &PortConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn buffer(&self) -> &ConversionBuffer {
        &self.buf
    }
}

#[cfg(unix)]
impl FrameWriter<PipeChannel> {
    /// Open `path` write-only with durable writes.
    ///
    /// `buffer_size_hint` reserves conversion buffer capacity; pass 0 to size
    /// it from the format alone.
    pub fn open(
        format: AudioFormat,
        path: impl AsRef<Path>,
        buffer_size_hint: usize,
    ) -> Result<Self> {
        let config = PortConfig {
            buffer_size_hint,
            ..PortConfig::default()
        };
        Self::open_with_config(format, path, config)
    }

    pub fn open_with_config(
        format: AudioFormat,
        path: impl AsRef<Path>,
        config: PortConfig,
    ) -> Result<Self> {
        let channel = PipeChannel::open_write(path)?;
        Ok(Self::with_config(format, channel, config))
    }
}

impl<T: Write + Channel> MediaPort for FrameWriter<T> {
    fn info(&self) -> &PortInfo {
        &self.info
    }

    fn put_frame(&mut self, frame: &AudioFrame) -> Result<usize> {
        self.write_frame(frame)
    }

    fn close(&mut self) -> Result<()> {
        FrameWriter::close(self)
    }
}

/// One write call. `Interrupted` transfers nothing, so it is repeated; a
/// short count is returned as-is.
fn write_once<T: Write>(inner: &mut T, buf: &[u8]) -> Result<usize> {
    loop {
        match inner.write(buf) {
            Ok(n) => return Ok(n),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}

fn flush<T: Write>(inner: &mut T) -> Result<()> {
    loop {
        match inner.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}
