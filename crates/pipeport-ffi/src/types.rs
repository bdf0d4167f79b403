use std::ffi::c_void;

use pipeport_frame::{AudioFrame, FrameReader, FrameWriter, MediaPort};
use pipeport_transport::PipeChannel;

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PpResult {
    Ok = 0,
    InvalidArgument = 1,
    NotFound = 2,
    EndOfStream = 3,
    InvalidOperation = 4,
    Io = 5,
    Internal = 99,
}

#[allow(dead_code)]
pub const PP_OK: PpResult = PpResult::Ok;
#[allow(dead_code)]
pub const PP_ERR_INVALID_ARGUMENT: PpResult = PpResult::InvalidArgument;
#[allow(dead_code)]
pub const PP_ERR_NOT_FOUND: PpResult = PpResult::NotFound;
#[allow(dead_code)]
pub const PP_ERR_EOF: PpResult = PpResult::EndOfStream;
#[allow(dead_code)]
pub const PP_ERR_INVALID_OPERATION: PpResult = PpResult::InvalidOperation;
#[allow(dead_code)]
pub const PP_ERR_IO: PpResult = PpResult::Io;
#[allow(dead_code)]
pub const PP_ERR_INTERNAL: PpResult = PpResult::Internal;

pub type PpPortHandle = *mut c_void;

/// End-of-stream callback: receives the port handle and the user data given
/// at registration.
pub type PpEofCallback = Option<unsafe extern "C" fn(port: PpPortHandle, user_data: *mut c_void)>;

/// Opaque pointer pair handed back to an EOF callback.
///
/// The C caller owns `user_data` and promises it may be used from whichever
/// thread drives the port.
#[derive(Clone, Copy)]
pub(crate) struct CallbackContext {
    pub(crate) port: PpPortHandle,
    pub(crate) user_data: *mut c_void,
}

// SAFETY: the pointers are never dereferenced on the Rust side; they are only
// passed back to the C callback, whose thread-safety the caller guarantees.
unsafe impl Send for CallbackContext {}

pub(crate) enum PortHandle {
    Reader {
        reader: FrameReader<PipeChannel>,
        frame: AudioFrame,
    },
    Writer(FrameWriter<PipeChannel>),
}

impl PortHandle {
    pub(crate) fn port_mut(&mut self) -> &mut dyn MediaPort {
        match self {
            PortHandle::Reader { reader, .. } => reader,
            PortHandle::Writer(writer) => writer,
        }
    }
}
