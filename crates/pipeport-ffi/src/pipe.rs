use std::os::raw::{c_char, c_int};

use pipeport_transport::raw;

use crate::error;
use crate::transport;
use crate::types::PpResult;

fn open_with(
    path: *const c_char,
    open: fn(&str) -> pipeport_transport::Result<c_int>,
) -> c_int {
    let path = {
        // SAFETY: We validate null and UTF-8 in helper.
        match unsafe { transport::required_str_arg(path, "path") } {
            Some(v) => v,
            None => return -1,
        }
    };

    match open(path) {
        Ok(fd) => fd,
        Err(err) => {
            let _ = error::map_transport_error(&err);
            -1
        }
    }
}

fn close_with(fd: c_int) -> PpResult {
    if fd < 0 {
        return error::set_invalid_argument("fd cannot be negative");
    }
    match raw::close_channel(fd) {
        Ok(()) => PpResult::Ok,
        Err(err) => error::map_transport_error(&err),
    }
}

/// Open `path` for reading and return its descriptor, or -1 on failure.
///
/// # Safety
/// `path` must be a non-null pointer to a valid UTF-8, NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn pp_open_rpipe(path: *const c_char) -> c_int {
    crate::ffi_boundary(-1, || {
        error::clear_error_state();
        open_with(path, |p| raw::open_for_read(p))
    })
}

/// Open `path` for durable writing and return its descriptor, or -1 on failure.
///
/// # Safety
/// `path` must be a non-null pointer to a valid UTF-8, NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn pp_open_wpipe(path: *const c_char) -> c_int {
    crate::ffi_boundary(-1, || {
        error::clear_error_state();
        open_with(path, |p| raw::open_for_write(p))
    })
}

/// Close a descriptor returned by `pp_open_rpipe`.
#[no_mangle]
pub extern "C" fn pp_close_rpipe(fd: c_int) -> PpResult {
    crate::ffi_boundary(PpResult::Internal, || {
        error::clear_error_state();
        close_with(fd)
    })
}

/// Close a descriptor returned by `pp_open_wpipe`.
#[no_mangle]
pub extern "C" fn pp_close_wpipe(fd: c_int) -> PpResult {
    crate::ffi_boundary(PpResult::Internal, || {
        error::clear_error_state();
        close_with(fd)
    })
}

/// Read up to `count` bytes into `buf`. Returns the byte count (0 at end of
/// file) or -1 on failure.
///
/// # Safety
/// If `count > 0`, `buf` must be non-null and writable for `count` bytes.
#[no_mangle]
pub unsafe extern "C" fn pp_read_rpipe(fd: c_int, buf: *mut u8, count: usize) -> isize {
    crate::ffi_boundary(-1, || {
        error::clear_error_state();

        let buf = {
            // SAFETY: We validate pointer/length pairing in helper.
            match unsafe { transport::bytes_arg_mut(buf, count, "buf") } {
                Some(v) => v,
                None => return -1,
            }
        };

        match raw::read_bytes(fd, buf) {
            Ok(n) => isize::try_from(n).unwrap_or(isize::MAX),
            Err(err) => {
                let _ = error::map_transport_error(&err);
                -1
            }
        }
    })
}

/// Write `count` bytes from `buf` and sync. Returns the byte count or -1 on
/// failure.
///
/// # Safety
/// If `count > 0`, `buf` must be non-null and readable for `count` bytes.
#[no_mangle]
pub unsafe extern "C" fn pp_write_wpipe(fd: c_int, buf: *const u8, count: usize) -> isize {
    crate::ffi_boundary(-1, || {
        error::clear_error_state();

        let buf = {
            // SAFETY: We validate pointer/length pairing in helper.
            match unsafe { transport::bytes_arg(buf, count, "buf") } {
                Some(v) => v,
                None => return -1,
            }
        };

        match raw::write_bytes(fd, buf) {
            Ok(n) => isize::try_from(n).unwrap_or(isize::MAX),
            Err(err) => {
                let _ = error::map_transport_error(&err);
                -1
            }
        }
    })
}
