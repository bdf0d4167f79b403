//! Audio frame ports over named pipes.
//!
//! pipeport bridges a frame-oriented audio pipeline and a byte-stream pipe:
//! a source port turns the pipe into fixed-size linear frames, a sink port
//! turns frames back into bytes, optionally companded to G.711 A-law.
//!
//! # Crate Structure
//!
//! - [`transport`]: blocking pipe and file channels, FIFO creation, raw descriptor helpers
//! - [`frame`]: audio formats, A-law codec, `FrameReader`/`FrameWriter` ports

/// Re-export transport types.
pub mod transport {
    pub use pipeport_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use pipeport_frame::*;
}
