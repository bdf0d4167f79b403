//! Pluggable diagnostics for byte counts and channel lifecycle.
//!
//! Adapters always emit `tracing` events; a [`DiagnosticSink`] is an extra
//! capability for hosts that want the same information programmatically.

use tracing::{debug, trace};

use crate::port::PortDirection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent<'a> {
    Opened {
        label: &'a str,
        direction: PortDirection,
    },
    Read {
        label: &'a str,
        bytes: usize,
        accumulated: usize,
        expected: usize,
    },
    EndOfStream {
        label: &'a str,
        received: usize,
        expected: usize,
    },
    Wrote {
        label: &'a str,
        written: usize,
        expected: usize,
    },
    Closed {
        label: &'a str,
    },
}

pub trait DiagnosticSink: Send {
    fn record(&self, event: &DiagnosticEvent<'_>);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn record(&self, _event: &DiagnosticEvent<'_>) {}
}

/// Forwards events to `tracing` at debug (lifecycle, writes) and trace (reads).
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, event: &DiagnosticEvent<'_>) {
        match event {
            DiagnosticEvent::Read {
                label,
                bytes,
                accumulated,
                expected,
            } => trace!(label, bytes, accumulated, expected, "pipe read"),
            DiagnosticEvent::Opened { label, direction } => {
                debug!(label, ?direction, "pipe port opened")
            }
            DiagnosticEvent::EndOfStream {
                label,
                received,
                expected,
            } => debug!(label, received, expected, "pipe end of stream"),
            DiagnosticEvent::Wrote {
                label,
                written,
                expected,
            } => debug!(label, written, expected, "pipe wrote frame"),
            DiagnosticEvent::Closed { label } => debug!(label, "pipe port closed"),
        }
    }
}

impl<S: DiagnosticSink + Sync> DiagnosticSink for std::sync::Arc<S> {
    fn record(&self, event: &DiagnosticEvent<'_>) {
        (**self).record(event);
    }
}
