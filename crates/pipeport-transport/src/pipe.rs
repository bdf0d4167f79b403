use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::fd::{AsRawFd, IntoRawFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::{OpenMode, Result, TransportError};
use crate::traits::Channel;

/// A blocking, single-direction channel over a FIFO or regular file.
///
/// Reads and writes are passed straight to the descriptor and never retried;
/// completing a frame across short reads is the caller's job.
pub struct PipeChannel {
    file: File,
    path: PathBuf,
    label: String,
    mode: OpenMode,
}

impl PipeChannel {
    /// Default permission mode for FIFOs created by [`create_fifo`].
    pub const DEFAULT_FIFO_MODE: u32 = 0o600;

    /// Open `path` in the given mode.
    ///
    /// Opening a FIFO blocks until the other end is opened as well. Write mode
    /// adds `O_DSYNC` and never creates the path. Any failure is reported as
    /// [`TransportError::NotFound`].
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut options = OpenOptions::new();
        match mode {
            OpenMode::Read => {
                options.read(true);
            }
            OpenMode::Write => {
                options.write(true).custom_flags(libc::O_DSYNC);
            }
        }

        let file = options.open(&path).map_err(|source| TransportError::NotFound {
            path: path.clone(),
            mode,
            source,
        })?;

        debug!(?path, %mode, "opened pipe channel");
        Ok(Self {
            file,
            label: path.display().to_string(),
            path,
            mode,
        })
    }

    /// Open `path` read-only.
    pub fn open_read(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path, OpenMode::Read)
    }

    /// Open `path` write-only with durable writes.
    pub fn open_write(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path, OpenMode::Write)
    }

    /// Read up to `buf.len()` bytes (blocking). Returns 0 at end of stream.
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.require(OpenMode::Read, "read")?;
        let read = self.file.read(buf)?;
        trace!(path = ?self.path, read, requested = buf.len(), "pipe read");
        Ok(read)
    }

    /// Write `buf` with a single write call, then sync. Returns bytes written,
    /// which may be fewer than requested.
    pub fn write_from(&mut self, buf: &[u8]) -> Result<usize> {
        self.require(OpenMode::Write, "write")?;
        let written = self.file.write(buf)?;
        self.sync()?;
        trace!(path = ?self.path, written, requested = buf.len(), "pipe write");
        Ok(written)
    }

    /// Force written data down to the transport (fsync).
    ///
    /// FIFOs and sockets reject fsync with `EINVAL`; for those the data is
    /// already visible to the reader and this is a no-op.
    pub fn sync(&mut self) -> Result<()> {
        self.require(OpenMode::Write, "sync")?;
        ignore_unsyncable(self.file.sync_all()).map_err(Into::into)
    }

    /// Close the descriptor and report the close status.
    pub fn close(self) -> Result<()> {
        let Self { file, path, .. } = self;
        let fd = file.into_raw_fd();
        // SAFETY: `fd` was just released from an owned `File`, so it is open and
        // nothing else will close it.
        let rc = unsafe { libc::close(fd) };
        if rc < 0 {
            return Err(TransportError::Io(std::io::Error::last_os_error()));
        }
        debug!(?path, "closed pipe channel");
        Ok(())
    }

    /// The path this channel was opened on.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The direction this channel was opened in.
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    fn require(&self, mode: OpenMode, op: &'static str) -> Result<()> {
        if self.mode != mode {
            return Err(TransportError::InvalidOperation {
                op,
                mode: self.mode,
            });
        }
        Ok(())
    }
}

impl Read for PipeChannel {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.read_into(buf).map_err(into_io)
    }
}

impl Write for PipeChannel {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.require(OpenMode::Write, "write").map_err(into_io)?;
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.sync().map_err(into_io)
    }
}

impl Channel for PipeChannel {
    fn label(&self) -> &str {
        &self.label
    }

    fn close(self) -> Result<()> {
        PipeChannel::close(self)
    }
}

impl AsRawFd for PipeChannel {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl std::fmt::Debug for PipeChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeChannel")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .finish()
    }
}

/// Create a FIFO node at `path` with the given permission bits.
pub fn create_fifo(path: impl AsRef<Path>, mode: u32) -> Result<()> {
    let path = path.as_ref();
    let c_path =
        CString::new(path.as_os_str().as_bytes()).map_err(|_| TransportError::Fifo {
            path: path.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "path contains an interior NUL byte",
            ),
        })?;

    // SAFETY: `c_path` is a valid NUL-terminated string that outlives the call.
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), mode as libc::mode_t) };
    if rc < 0 {
        return Err(TransportError::Fifo {
            path: path.to_path_buf(),
            source: std::io::Error::last_os_error(),
        });
    }

    debug!(?path, "created fifo");
    Ok(())
}

pub(crate) fn ignore_unsyncable(result: std::io::Result<()>) -> std::io::Result<()> {
    match result {
        Err(err) if err.raw_os_error() == Some(libc::EINVAL) => Ok(()),
        other => other,
    }
}

fn into_io(err: TransportError) -> std::io::Error {
    match err {
        TransportError::Io(io) => io,
        TransportError::NotFound { source, .. } | TransportError::Fifo { source, .. } => source,
        other @ TransportError::InvalidOperation { .. } => {
            std::io::Error::new(std::io::ErrorKind::Unsupported, other.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pipeport-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn open_missing_path_is_not_found() {
        let dir = temp_dir("missing");
        let result = PipeChannel::open_read(dir.join("nope.pcm"));
        assert!(matches!(
            result,
            Err(TransportError::NotFound {
                mode: OpenMode::Read,
                ..
            })
        ));

        let result = PipeChannel::open_write(dir.join("nope.pcm"));
        assert!(matches!(
            result,
            Err(TransportError::NotFound {
                mode: OpenMode::Write,
                ..
            })
        ));
        assert!(!dir.join("nope.pcm").exists(), "write mode must not create");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn read_regular_file_until_eof() {
        let dir = temp_dir("read-file");
        let path = dir.join("in.pcm");
        std::fs::write(&path, b"abcdef").unwrap();

        let mut channel = PipeChannel::open_read(&path).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(channel.read_into(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(channel.read_into(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ef");
        assert_eq!(channel.read_into(&mut buf).unwrap(), 0);

        channel.close().unwrap();
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_regular_file_is_synced() {
        let dir = temp_dir("write-file");
        let path = dir.join("out.pcm");
        std::fs::write(&path, b"").unwrap();

        let mut channel = PipeChannel::open_write(&path).unwrap();
        assert_eq!(channel.write_from(b"hello").unwrap(), 5);
        channel.close().unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn direction_is_enforced() {
        let dir = temp_dir("direction");
        let path = dir.join("file.pcm");
        std::fs::write(&path, b"xyz").unwrap();

        let mut reader = PipeChannel::open_read(&path).unwrap();
        let err = reader.write_from(b"no").unwrap_err();
        assert!(matches!(
            err,
            TransportError::InvalidOperation {
                op: "write",
                mode: OpenMode::Read
            }
        ));

        let mut writer = PipeChannel::open_write(&path).unwrap();
        let mut buf = [0u8; 2];
        let err = writer.read_into(&mut buf).unwrap_err();
        assert!(matches!(err, TransportError::InvalidOperation { op: "read", .. }));

        let io_err = writer.read(&mut buf).unwrap_err();
        assert_eq!(io_err.kind(), std::io::ErrorKind::Unsupported);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn fifo_roundtrip_with_sync() {
        let dir = temp_dir("fifo");
        let path = dir.join("audio.fifo");
        create_fifo(&path, PipeChannel::DEFAULT_FIFO_MODE).unwrap();

        let writer_path = path.clone();
        let writer = std::thread::spawn(move || {
            let mut channel = PipeChannel::open_write(&writer_path).unwrap();
            assert_eq!(channel.write_from(b"fifo-bytes").unwrap(), 10);
            channel.close().unwrap();
        });

        let mut channel = PipeChannel::open_read(&path).unwrap();
        let mut received = Vec::new();
        let mut buf = [0u8; 4];
        loop {
            let n = channel.read_into(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            received.extend_from_slice(&buf[..n]);
        }
        writer.join().unwrap();

        assert_eq!(received, b"fifo-bytes");
        assert_eq!(channel.label(), path.display().to_string());
        channel.close().unwrap();
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn create_fifo_rejects_existing_path() {
        let dir = temp_dir("fifo-exists");
        let path = dir.join("taken");
        std::fs::write(&path, b"regular").unwrap();

        let result = create_fifo(&path, PipeChannel::DEFAULT_FIFO_MODE);
        assert!(matches!(result, Err(TransportError::Fifo { .. })));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
