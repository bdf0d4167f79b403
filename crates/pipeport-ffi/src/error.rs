use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;

use pipeport_frame::FrameError;
use pipeport_transport::TransportError;

use crate::types::PpResult;

thread_local! {
    static LAST_ERROR: RefCell<CString> = RefCell::new(CString::default());
}

pub(crate) fn clear_error_state() {
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::default();
    });
}

pub(crate) fn set_error_message(message: impl Into<String>) {
    let message = message.into();
    let sanitized = message.replace('\0', "?");
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::new(sanitized).unwrap_or_default();
    });
}

pub(crate) fn set_invalid_argument(message: impl Into<String>) -> PpResult {
    set_error_message(message);
    PpResult::InvalidArgument
}

pub(crate) fn set_panic_error() {
    set_error_message("panic across FFI boundary");
}

pub(crate) fn map_frame_error(err: &FrameError) -> PpResult {
    set_error_message(err.to_string());
    match err {
        FrameError::NotFound { .. } => PpResult::NotFound,
        FrameError::InvalidArgument(_) => PpResult::InvalidArgument,
        FrameError::EndOfStream { .. } => PpResult::EndOfStream,
        FrameError::InvalidOperation(_) => PpResult::InvalidOperation,
        FrameError::ShortWrite { .. } | FrameError::Io(_) => PpResult::Io,
        FrameError::Transport(inner) => transport_code(inner),
    }
}

pub(crate) fn map_transport_error(err: &TransportError) -> PpResult {
    set_error_message(err.to_string());
    transport_code(err)
}

fn transport_code(err: &TransportError) -> PpResult {
    match err {
        TransportError::NotFound { .. } => PpResult::NotFound,
        TransportError::InvalidOperation { .. } => PpResult::InvalidOperation,
        TransportError::Fifo { .. } | TransportError::Io(_) => PpResult::Io,
    }
}

pub(crate) fn last_error_ptr() -> *const c_char {
    LAST_ERROR.with(|state| state.borrow().as_ptr())
}
