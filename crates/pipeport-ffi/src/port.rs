use std::ffi::c_void;
use std::os::raw::c_char;

use pipeport_frame::{
    AudioFormat, AudioFrame, FrameReader, FrameWriter, MediaPort, PortConfig, DEFAULT_PTIME_MS,
};

use crate::error;
use crate::transport;
use crate::types::{CallbackContext, PortHandle, PpEofCallback, PpPortHandle, PpResult};

fn with_port_mut<T>(handle: PpPortHandle, on_error: T, f: impl FnOnce(&mut PortHandle) -> T) -> T {
    if handle.is_null() {
        let _ = error::set_invalid_argument("port handle cannot be null");
        return on_error;
    }

    let port_handle = {
        // SAFETY: Pointer validity is guaranteed by the caller.
        unsafe { &mut *(handle as *mut PortHandle) }
    };

    f(port_handle)
}

fn write_handle_out(out: *mut PpPortHandle, handle: PortHandle) -> PpResult {
    let raw = Box::into_raw(Box::new(handle)) as PpPortHandle;
    // SAFETY: `out` was checked for null by the caller.
    unsafe {
        *out = raw;
    }
    PpResult::Ok
}

/// Create a source port reading `path`. Frames last 20 ms at `clock_rate`.
///
/// # Safety
/// `path` must be a non-null UTF-8 C string and `out` a non-null writable pointer.
#[no_mangle]
pub unsafe extern "C" fn pp_reader_create(
    path: *const c_char,
    clock_rate: u32,
    channels: u16,
    alaw: bool,
    out: *mut PpPortHandle,
) -> PpResult {
    crate::ffi_boundary(PpResult::Internal, || {
        error::clear_error_state();

        if out.is_null() {
            return error::set_invalid_argument("out cannot be null");
        }
        let path = {
            // SAFETY: We validate null and UTF-8 in helper.
            match unsafe { transport::required_str_arg(path, "path") } {
                Some(v) => v,
                None => return PpResult::InvalidArgument,
            }
        };

        let format = match AudioFormat::with_ptime(
            clock_rate,
            channels,
            DEFAULT_PTIME_MS,
            transport::codec_arg(alaw),
        ) {
            Ok(format) => format,
            Err(err) => return error::map_frame_error(&err),
        };

        match FrameReader::open(format, path) {
            Ok(reader) => write_handle_out(
                out,
                PortHandle::Reader {
                    frame: AudioFrame::for_format(&format),
                    reader,
                },
            ),
            Err(err) => error::map_frame_error(&err),
        }
    })
}

/// Register `cb` to run when `port` reaches end of stream. Passing a null
/// callback removes it. The callback runs on the thread calling
/// `pp_reader_get_frame` and must not call back into `port`.
///
/// # Safety
/// `port` must be a valid reader handle. `user_data` is passed back verbatim.
#[no_mangle]
pub unsafe extern "C" fn pp_reader_set_eof_cb(
    port: PpPortHandle,
    user_data: *mut c_void,
    cb: PpEofCallback,
) -> PpResult {
    crate::ffi_boundary(PpResult::Internal, || {
        error::clear_error_state();

        with_port_mut(port, PpResult::InvalidArgument, |handle| {
            let PortHandle::Reader { reader, .. } = handle else {
                error::set_error_message("set_eof_cb on a sink port");
                return PpResult::InvalidOperation;
            };

            match cb {
                Some(cb) => {
                    let ctx = CallbackContext { port, user_data };
                    reader.set_eof_callback(move |_info| {
                        let ctx = ctx;
                        // SAFETY: the caller registered `cb` for these pointers.
                        unsafe { cb(ctx.port, ctx.user_data) }
                    });
                }
                None => reader.clear_eof_callback(),
            }
            PpResult::Ok
        })
    })
}

/// Read the next frame into `samples`, storing the sample count in `out_len`.
///
/// Returns `EndOfStream` with `*out_len == 0` when the transport ran dry.
/// `capacity` must hold at least one frame (`clock_rate / 50 * channels`).
///
/// # Safety
/// `port` must be a valid handle, `samples` writable for `capacity` values and
/// `out_len` a non-null writable pointer.
#[no_mangle]
pub unsafe extern "C" fn pp_reader_get_frame(
    port: PpPortHandle,
    samples: *mut i16,
    capacity: usize,
    out_len: *mut usize,
) -> PpResult {
    crate::ffi_boundary(PpResult::Internal, || {
        error::clear_error_state();

        if out_len.is_null() {
            return error::set_invalid_argument("out_len cannot be null");
        }
        // SAFETY: Pointer was checked for null above.
        unsafe {
            *out_len = 0;
        }

        with_port_mut(port, PpResult::InvalidArgument, |handle| {
            let (reader, frame) = match handle {
                PortHandle::Reader { reader, frame } => (reader, frame),
                PortHandle::Writer(writer) => {
                    return match MediaPort::get_frame(
                        writer,
                        &mut AudioFrame::none(),
                    ) {
                        Ok(()) => PpResult::Ok,
                        Err(err) => error::map_frame_error(&err),
                    };
                }
            };

            let needed = reader.format().frame_samples();
            if capacity < needed || samples.is_null() {
                return error::set_invalid_argument(format!(
                    "samples must hold {needed} values, capacity is {capacity}"
                ));
            }

            if let Err(err) = reader.read_frame(frame) {
                return error::map_frame_error(&err);
            }

            // SAFETY: `samples` is non-null and writable for `capacity >= needed` values.
            let dst = unsafe { std::slice::from_raw_parts_mut(samples, needed) };
            dst.copy_from_slice(&frame.samples);
            // SAFETY: Pointer was checked for null above.
            unsafe {
                *out_len = needed;
            }
            PpResult::Ok
        })
    })
}

/// Create a sink port writing `path`.
///
/// # Safety
/// `path` must be a non-null UTF-8 C string and `out` a non-null writable pointer.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn pp_writer_create(
    path: *const c_char,
    clock_rate: u32,
    channels: u16,
    samples_per_frame: u32,
    bits_per_sample: u16,
    alaw: bool,
    buff_size: usize,
    out: *mut PpPortHandle,
) -> PpResult {
    crate::ffi_boundary(PpResult::Internal, || {
        error::clear_error_state();

        if out.is_null() {
            return error::set_invalid_argument("out cannot be null");
        }
        let path = {
            // SAFETY: We validate null and UTF-8 in helper.
            match unsafe { transport::required_str_arg(path, "path") } {
                Some(v) => v,
                None => return PpResult::InvalidArgument,
            }
        };

        let format = match AudioFormat::with_bits(
            clock_rate,
            channels,
            samples_per_frame,
            bits_per_sample,
            transport::codec_arg(alaw),
        ) {
            Ok(format) => format,
            Err(err) => return error::map_frame_error(&err),
        };

        let config = PortConfig {
            buffer_size_hint: buff_size,
            ..PortConfig::default()
        };
        match FrameWriter::open_with_config(format, path, config) {
            Ok(writer) => write_handle_out(out, PortHandle::Writer(writer)),
            Err(err) => error::map_frame_error(&err),
        }
    })
}

/// Write one frame of `len` interleaved samples. `len == 0` is a non-audio
/// frame and performs no I/O.
///
/// # Safety
/// `port` must be a valid handle; if `len > 0`, `samples` must be readable for
/// `len` values.
#[no_mangle]
pub unsafe extern "C" fn pp_writer_put_frame(
    port: PpPortHandle,
    samples: *const i16,
    len: usize,
) -> PpResult {
    crate::ffi_boundary(PpResult::Internal, || {
        error::clear_error_state();

        let samples = {
            // SAFETY: We validate pointer/length pairing in helper.
            match unsafe { transport::samples_arg(samples, len) } {
                Some(v) => v,
                None => return PpResult::InvalidArgument,
            }
        };
        let frame = if samples.is_empty() {
            AudioFrame::none()
        } else {
            AudioFrame::audio(samples)
        };

        with_port_mut(port, PpResult::InvalidArgument, |handle| {
            match handle.port_mut().put_frame(&frame) {
                Ok(_) => PpResult::Ok,
                Err(err) => error::map_frame_error(&err),
            }
        })
    })
}

/// Close and free a port handle. Null is a no-op.
///
/// # Safety
/// `port` must be null or a handle from `pp_reader_create`/`pp_writer_create`
/// with no call in flight. It must not be used afterwards, and must not be
/// destroyed twice: a second call frees the same allocation again.
#[no_mangle]
pub unsafe extern "C" fn pp_port_destroy(port: PpPortHandle) -> PpResult {
    crate::ffi_boundary(PpResult::Internal, || {
        error::clear_error_state();

        if port.is_null() {
            return PpResult::Ok;
        }

        // SAFETY: Caller guarantees this handle was allocated by a create function.
        let mut handle = unsafe { Box::from_raw(port as *mut PortHandle) };
        match handle.port_mut().close() {
            Ok(()) => PpResult::Ok,
            Err(err) => error::map_frame_error(&err),
        }
    })
}
