use crate::format::AudioFormat;

/// What a frame carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameKind {
    /// No audio; used for end of stream and for non-audio pipeline signals.
    #[default]
    None,
    /// Linear 16-bit samples.
    Audio,
}

/// One pipeline-facing unit of audio.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioFrame {
    /// Whether `samples` holds audio.
    pub kind: FrameKind,
    /// Interleaved linear samples.
    pub samples: Vec<i16>,
    /// Size of the audio in bytes (pipeline representation); 0 for `None`.
    pub size: usize,
    /// Sample-clock position of the first sample.
    pub timestamp: u64,
}

impl AudioFrame {
    /// An empty frame that carries no audio.
    pub fn none() -> Self {
        Self::default()
    }

    /// An audio frame holding `samples`.
    pub fn audio(samples: impl Into<Vec<i16>>) -> Self {
        let samples = samples.into();
        Self {
            kind: FrameKind::Audio,
            size: samples.len() * 2,
            samples,
            timestamp: 0,
        }
    }

    /// A `None` frame whose sample storage is already sized for `format`,
    /// ready to be filled by a reader.
    pub fn for_format(format: &AudioFormat) -> Self {
        Self {
            samples: vec![0; format.frame_samples()],
            ..Self::default()
        }
    }

    pub fn is_audio(&self) -> bool {
        self.kind == FrameKind::Audio
    }

    /// Mark the frame as carrying no data.
    pub fn clear(&mut self) {
        self.kind = FrameKind::None;
        self.size = 0;
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Codec;

    #[test]
    fn audio_frame_size_tracks_samples() {
        let frame = AudioFrame::audio(vec![1i16, 2, 3]);
        assert!(frame.is_audio());
        assert_eq!(frame.size, 6);
    }

    #[test]
    fn for_format_preallocates_without_audio() {
        let fmt = AudioFormat::new(8000, 2, 80, Codec::Linear16).unwrap();
        let frame = AudioFrame::for_format(&fmt);
        assert_eq!(frame.samples.len(), 160);
        assert_eq!(frame.kind, FrameKind::None);
        assert_eq!(frame.size, 0);
    }

    #[test]
    fn clear_drops_audio() {
        let mut frame = AudioFrame::audio([5i16; 4]);
        frame.clear();
        assert_eq!(frame, AudioFrame::none());
    }
}
