//! Audio capture and playback
//!
//! Capture produces an opaque WAV clip from a start/stop gesture; playback
//! renders the synthesized response clip to the default output device.

mod capture;
mod playback;

pub use capture::{AudioCaptureSession, SAMPLE_RATE, samples_to_wav};
pub use playback::AudioPlayback;

/// An opaque audio payload with its declared MIME type
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl AudioClip {
    /// Create a clip with an explicit MIME type
    #[must_use]
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }

    /// Create a WAV clip
    #[must_use]
    pub fn wav(bytes: Vec<u8>) -> Self {
        Self::new(bytes, "audio/wav")
    }

    /// Whether the clip carries no audio data
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
