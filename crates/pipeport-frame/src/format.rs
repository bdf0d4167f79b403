use std::fmt;
use std::time::Duration;

use crate::error::{FrameError, Result};

/// The only sample width the pipeline side supports.
pub const BITS_PER_SAMPLE: u16 = 16;

/// Frame duration used when a format is derived from a clock rate alone.
pub const DEFAULT_PTIME_MS: u32 = 20;

const BYTES_PER_SAMPLE: usize = 2;

/// Representation of samples on the transport side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// 16-bit linear PCM, byte-for-byte identical to the pipeline frame.
    Linear16,
    /// G.711 A-law, one byte per 16-bit sample.
    ALaw,
}

impl Codec {
    /// Transport bytes used per pipeline sample.
    pub fn bytes_per_sample(self) -> usize {
        match self {
            Codec::Linear16 => BYTES_PER_SAMPLE,
            Codec::ALaw => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Codec::Linear16 => "L16",
            Codec::ALaw => "PCMA",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable description of one adapter's frames.
///
/// `samples_per_frame` counts samples per channel; a pipeline frame holds
/// `samples_per_frame * channel_count` interleaved 16-bit samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    clock_rate: u32,
    channel_count: u16,
    bits_per_sample: u16,
    samples_per_frame: u32,
    codec: Codec,
}

impl AudioFormat {
    /// Create a 16-bit format.
    pub fn new(
        clock_rate: u32,
        channel_count: u16,
        samples_per_frame: u32,
        codec: Codec,
    ) -> Result<Self> {
        Self::with_bits(
            clock_rate,
            channel_count,
            samples_per_frame,
            BITS_PER_SAMPLE,
            codec,
        )
    }

    /// Create a format with an explicit sample width, which must be 16.
    pub fn with_bits(
        clock_rate: u32,
        channel_count: u16,
        samples_per_frame: u32,
        bits_per_sample: u16,
        codec: Codec,
    ) -> Result<Self> {
        if bits_per_sample != BITS_PER_SAMPLE {
            return Err(FrameError::InvalidArgument(format!(
                "unsupported bits per sample {bits_per_sample} (only {BITS_PER_SAMPLE} is supported)"
            )));
        }
        if !(1..=2).contains(&channel_count) {
            return Err(FrameError::InvalidArgument(format!(
                "channel count must be 1 or 2, got {channel_count}"
            )));
        }
        if clock_rate == 0 {
            return Err(FrameError::InvalidArgument(
                "clock rate must be greater than zero".to_string(),
            ));
        }
        if samples_per_frame == 0 {
            return Err(FrameError::InvalidArgument(
                "samples per frame must be greater than zero".to_string(),
            ));
        }

        let total = (samples_per_frame as usize)
            .checked_mul(channel_count as usize)
            .and_then(|n| n.checked_mul(BYTES_PER_SAMPLE));
        if total.is_none() {
            return Err(FrameError::InvalidArgument(format!(
                "frame of {samples_per_frame} samples x {channel_count} channels is too large"
            )));
        }

        Ok(Self {
            clock_rate,
            channel_count,
            bits_per_sample,
            samples_per_frame,
            codec,
        })
    }

    /// Derive the frame size from a frame duration in milliseconds.
    pub fn with_ptime(
        clock_rate: u32,
        channel_count: u16,
        ptime_ms: u32,
        codec: Codec,
    ) -> Result<Self> {
        if ptime_ms == 0 {
            return Err(FrameError::InvalidArgument(
                "ptime must be greater than zero".to_string(),
            ));
        }
        let samples = u64::from(clock_rate) * u64::from(ptime_ms) / 1000;
        let samples = u32::try_from(samples).map_err(|_| {
            FrameError::InvalidArgument(format!(
                "ptime {ptime_ms}ms at {clock_rate}Hz yields too many samples"
            ))
        })?;
        Self::new(clock_rate, channel_count, samples, codec)
    }

    pub fn clock_rate(&self) -> u32 {
        self.clock_rate
    }

    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// Samples per channel in one frame.
    pub fn samples_per_frame(&self) -> u32 {
        self.samples_per_frame
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// Interleaved samples in one pipeline frame.
    pub fn frame_samples(&self) -> usize {
        self.samples_per_frame as usize * self.channel_count as usize
    }

    /// Bytes of one frame in linear pipeline representation.
    pub fn pipeline_frame_bytes(&self) -> usize {
        self.frame_samples() * BYTES_PER_SAMPLE
    }

    /// Bytes of one frame on the transport; half the pipeline size for A-law.
    pub fn transport_frame_bytes(&self) -> usize {
        self.frame_samples() * self.codec.bytes_per_sample()
    }

    /// Size of the scratch region an adapter needs for this format.
    pub fn conversion_buffer_bytes(&self) -> usize {
        self.pipeline_frame_bytes().max(self.transport_frame_bytes())
    }

    /// Wall-clock length of one frame.
    pub fn frame_duration(&self) -> Duration {
        Duration::from_micros(u64::from(self.samples_per_frame) * 1_000_000 / u64::from(self.clock_rate))
    }

    /// Average pipeline bit rate.
    pub fn avg_bits_per_second(&self) -> u64 {
        u64::from(self.clock_rate) * u64::from(self.channel_count) * u64::from(self.bits_per_sample)
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}Hz {}ch {} samples/frame",
            self.codec, self.clock_rate, self.channel_count, self.samples_per_frame
        )
    }
}

/// Per-adapter configuration.
#[derive(Debug, Clone, Default)]
pub struct PortConfig {
    /// Capacity reserved for the conversion buffer when it is first
    /// allocated. The usable length always comes from the format. Default: 0.
    pub buffer_size_hint: usize,
    /// When true, a write that reaches the transport only partially fails
    /// with [`FrameError::ShortWrite`]; otherwise the partial count is
    /// returned. Default: false.
    pub strict_writes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alaw_transport_is_half_of_linear() {
        for channels in 1..=2u16 {
            for spf in [1u32, 80, 160, 441, 960] {
                let linear = AudioFormat::new(8000, channels, spf, Codec::Linear16).unwrap();
                let alaw = AudioFormat::new(8000, channels, spf, Codec::ALaw).unwrap();

                assert_eq!(alaw.transport_frame_bytes() * 2, linear.transport_frame_bytes());
                assert_eq!(linear.pipeline_frame_bytes(), alaw.pipeline_frame_bytes());
                assert_eq!(
                    alaw.transport_frame_bytes(),
                    spf as usize * channels as usize
                );
            }
        }
    }

    #[test]
    fn sizes_ignore_clock_rate() {
        let a = AudioFormat::new(8000, 2, 160, Codec::ALaw).unwrap();
        let b = AudioFormat::new(48000, 2, 160, Codec::ALaw).unwrap();
        assert_eq!(a.transport_frame_bytes(), b.transport_frame_bytes());
        assert_eq!(a.conversion_buffer_bytes(), b.conversion_buffer_bytes());
    }

    #[test]
    fn conversion_buffer_fits_both_sides() {
        let fmt = AudioFormat::new(8000, 1, 160, Codec::ALaw).unwrap();
        assert_eq!(fmt.conversion_buffer_bytes(), 320);
        let fmt = AudioFormat::new(8000, 1, 160, Codec::Linear16).unwrap();
        assert_eq!(fmt.conversion_buffer_bytes(), 320);
    }

    #[test]
    fn ptime_derivation() {
        let fmt = AudioFormat::with_ptime(8000, 1, DEFAULT_PTIME_MS, Codec::ALaw).unwrap();
        assert_eq!(fmt.samples_per_frame(), 160);
        assert_eq!(fmt.frame_duration(), Duration::from_millis(20));

        let fmt = AudioFormat::with_ptime(48000, 2, 10, Codec::Linear16).unwrap();
        assert_eq!(fmt.samples_per_frame(), 480);
        assert_eq!(fmt.frame_samples(), 960);
        assert_eq!(fmt.avg_bits_per_second(), 48000 * 2 * 16);
    }

    #[test]
    fn rejects_invalid_parameters() {
        let cases = [
            AudioFormat::with_bits(8000, 1, 160, 8, Codec::Linear16),
            AudioFormat::new(8000, 0, 160, Codec::Linear16),
            AudioFormat::new(8000, 3, 160, Codec::Linear16),
            AudioFormat::new(0, 1, 160, Codec::Linear16),
            AudioFormat::new(8000, 1, 0, Codec::Linear16),
            AudioFormat::with_ptime(8000, 1, 0, Codec::ALaw),
            AudioFormat::with_ptime(100, 1, 5, Codec::ALaw),
        ];
        for case in cases {
            assert!(matches!(case, Err(FrameError::InvalidArgument(_))));
        }
    }

    #[test]
    fn display_names_codec() {
        let fmt = AudioFormat::new(8000, 1, 160, Codec::ALaw).unwrap();
        assert_eq!(fmt.to_string(), "PCMA 8000Hz 1ch 160 samples/frame");
    }
}
