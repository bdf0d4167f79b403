//! pipeport-ffi: C-ABI exports for pipe channels and audio frame ports.
//!
//! Every export clears the thread-local error message on entry and sets it
//! on failure; read it with [`pp_last_error`]. Panics are caught at the
//! boundary and reported as [`PpResult::Internal`].

#![cfg(unix)]

mod error;
mod pipe;
mod port;
mod transport;
mod types;

use std::panic::AssertUnwindSafe;

pub use pipe::{
    pp_close_rpipe, pp_close_wpipe, pp_open_rpipe, pp_open_wpipe, pp_read_rpipe, pp_write_wpipe,
};
pub use port::{
    pp_port_destroy, pp_reader_create, pp_reader_get_frame, pp_reader_set_eof_cb,
    pp_writer_create, pp_writer_put_frame,
};
pub use types::{
    PpEofCallback, PpPortHandle, PpResult, PP_ERR_EOF, PP_ERR_INTERNAL, PP_ERR_INVALID_ARGUMENT,
    PP_ERR_INVALID_OPERATION, PP_ERR_IO, PP_ERR_NOT_FOUND, PP_OK,
};

fn ffi_boundary<T>(on_panic: T, f: impl FnOnce() -> T) -> T {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            error::set_panic_error();
            on_panic
        }
    }
}

#[no_mangle]
pub extern "C" fn pp_init() -> PpResult {
    ffi_boundary(PpResult::Internal, || {
        error::clear_error_state();
        PpResult::Ok
    })
}

#[no_mangle]
pub extern "C" fn pp_cleanup() {
    ffi_boundary((), || {
        error::clear_error_state();
    });
}

#[no_mangle]
pub extern "C" fn pp_last_error() -> *const std::os::raw::c_char {
    ffi_boundary(std::ptr::null(), error::last_error_ptr)
}
