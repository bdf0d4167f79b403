//! Descriptor-level pipe helpers.
//!
//! Thin wrappers for callers that manage raw descriptors themselves (for
//! example across an FFI boundary). The returned descriptors are owned by the
//! caller and must be released with [`close_channel`].

use std::fs::OpenOptions;
use std::os::fd::{IntoRawFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::error::{OpenMode, Result, TransportError};

/// Open `path` read-only and hand back the raw descriptor.
pub fn open_for_read(path: impl AsRef<Path>) -> Result<RawFd> {
    open_raw(path.as_ref(), OpenMode::Read)
}

/// Open `path` write-only with `O_DSYNC` and hand back the raw descriptor.
pub fn open_for_write(path: impl AsRef<Path>) -> Result<RawFd> {
    open_raw(path.as_ref(), OpenMode::Write)
}

fn open_raw(path: &Path, mode: OpenMode) -> Result<RawFd> {
    let mut options = OpenOptions::new();
    match mode {
        OpenMode::Read => options.read(true).custom_flags(libc::O_DSYNC),
        OpenMode::Write => options.write(true).custom_flags(libc::O_DSYNC),
    };
    let file = options.open(path).map_err(|source| TransportError::NotFound {
        path: path.to_path_buf(),
        mode,
        source,
    })?;
    let fd = file.into_raw_fd();
    debug!(?path, fd, %mode, "opened raw pipe descriptor");
    Ok(fd)
}

/// Close a descriptor returned by [`open_for_read`] or [`open_for_write`].
pub fn close_channel(fd: RawFd) -> Result<()> {
    // SAFETY: closing an arbitrary integer is memory safe; an invalid
    // descriptor is reported as `EBADF`.
    let rc = unsafe { libc::close(fd) };
    if rc < 0 {
        return Err(std::io::Error::last_os_error().into());
    }
    debug!(fd, "closed raw pipe descriptor");
    Ok(())
}

/// Read up to `buf.len()` bytes from `fd` (blocking, single call).
pub fn read_bytes(fd: RawFd, buf: &mut [u8]) -> Result<usize> {
    // SAFETY: `buf` is a valid writable region of `buf.len()` bytes.
    let rc = unsafe { libc::read(fd, buf.as_mut_ptr().cast::<libc::c_void>(), buf.len()) };
    if rc < 0 {
        return Err(std::io::Error::last_os_error().into());
    }
    trace!(fd, read = rc, requested = buf.len(), "raw pipe read");
    Ok(rc as usize)
}

/// Write `buf` to `fd` with a single call, then fsync.
///
/// The byte count of the write is returned even if the sync fails; a failed
/// sync is only logged.
pub fn write_bytes(fd: RawFd, buf: &[u8]) -> Result<usize> {
    // SAFETY: `buf` is a valid readable region of `buf.len()` bytes.
    let rc = unsafe { libc::write(fd, buf.as_ptr().cast::<libc::c_void>(), buf.len()) };
    if rc < 0 {
        return Err(std::io::Error::last_os_error().into());
    }

    // SAFETY: fsync only inspects the descriptor.
    let sync_rc = unsafe { libc::fsync(fd) };
    let sync = if sync_rc < 0 {
        Err(std::io::Error::last_os_error())
    } else {
        Ok(())
    };
    if let Err(err) = crate::pipe::ignore_unsyncable(sync) {
        warn!(fd, error = %err, "fsync after raw pipe write failed");
    }

    trace!(fd, written = rc, requested = buf.len(), "raw pipe write");
    Ok(rc as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("pipeport-raw-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn write_then_read_through_descriptors() {
        let dir = temp_dir("rw");
        let path = dir.join("raw.bin");
        std::fs::write(&path, b"").unwrap();

        let wfd = open_for_write(&path).unwrap();
        assert_eq!(write_bytes(wfd, b"\x01\x02\x03").unwrap(), 3);
        close_channel(wfd).unwrap();

        let rfd = open_for_read(&path).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(read_bytes(rfd, &mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
        assert_eq!(read_bytes(rfd, &mut buf).unwrap(), 0);
        close_channel(rfd).unwrap();

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn open_missing_path_fails() {
        let dir = temp_dir("missing");
        assert!(matches!(
            open_for_read(dir.join("absent")),
            Err(TransportError::NotFound { .. })
        ));
        assert!(matches!(
            open_for_write(dir.join("absent")),
            Err(TransportError::NotFound { .. })
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn close_invalid_descriptor_reports_error() {
        assert!(matches!(close_channel(-1), Err(TransportError::Io(_))));
    }

    #[test]
    fn write_to_fifo_ignores_unsyncable_descriptor() {
        let dir = temp_dir("fifo");
        let path = dir.join("raw.fifo");
        crate::create_fifo(&path, 0o600).unwrap();

        let reader_path = path.clone();
        let reader = std::thread::spawn(move || {
            let fd = open_for_read(&reader_path).unwrap();
            let mut buf = [0u8; 4];
            let n = read_bytes(fd, &mut buf).unwrap();
            close_channel(fd).unwrap();
            buf[..n].to_vec()
        });

        let fd = open_for_write(&path).unwrap();
        assert_eq!(write_bytes(fd, b"ok").unwrap(), 2);
        close_channel(fd).unwrap();

        assert_eq!(reader.join().unwrap(), b"ok");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
