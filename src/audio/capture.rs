//! Microphone capture session

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};

use super::AudioClip;
use crate::{Error, Result};

/// Sample rate for audio capture (16kHz for speech)
pub const SAMPLE_RATE: u32 = 16000;

/// Exclusive microphone session
///
/// The microphone handle is owned by this session between `start()` and
/// `stop()`. Chunks are buffered in arrival order; `stop()` releases the
/// device before the finished clip is produced, so a subsequent `start()`
/// never races a not-yet-released device.
#[derive(Default)]
pub struct AudioCaptureSession {
    buffer: Arc<Mutex<Vec<f32>>>,
    stream: Option<Stream>,
}

impl AudioCaptureSession {
    /// Create an inactive capture session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the microphone and begin buffering audio
    ///
    /// No-op if already capturing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Microphone`] if the device is declined or
    /// unavailable; the session stays inactive in that case.
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            tracing::debug!("capture already running, start ignored");
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Microphone("no input device available".to_string()))?;

        let supported_config = device
            .supported_input_configs()
            .map_err(|e| Error::Microphone(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            })
            .ok_or_else(|| Error::Microphone("no suitable input config found".to_string()))?;

        let config: StreamConfig = supported_config
            .with_sample_rate(SampleRate(SAMPLE_RATE))
            .config();

        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }

        let buffer = Arc::clone(&self.buffer);
        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio capture error");
                },
                None,
            )
            .map_err(|e| Error::Microphone(e.to_string()))?;

        stream.play().map_err(|e| Error::Microphone(e.to_string()))?;
        self.stream = Some(stream);

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = SAMPLE_RATE,
            "capture started"
        );
        Ok(())
    }

    /// Release the microphone and finalize the buffered audio into a clip
    ///
    /// Returns `None` when not capturing (idempotent guard). The device is
    /// released unconditionally before the clip is encoded, even if
    /// encoding then fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Audio`] if WAV encoding fails.
    pub fn stop(&mut self) -> Result<Option<AudioClip>> {
        let Some(stream) = self.stream.take() else {
            tracing::debug!("no capture running, stop ignored");
            return Ok(None);
        };

        // Device released here, before any of the finalization below
        drop(stream);

        let samples = self
            .buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default();

        tracing::debug!(samples = samples.len(), "capture stopped");

        let wav = samples_to_wav(&samples, SAMPLE_RATE)?;
        Ok(Some(AudioClip::wav(wav)))
    }

    /// Check if currently capturing
    #[must_use]
    pub const fn is_capturing(&self) -> bool {
        self.stream.is_some()
    }

    /// Snapshot the buffered samples without consuming them
    #[must_use]
    pub fn peek_buffer(&self) -> Vec<f32> {
        self.buffer
            .lock()
            .map(|buf| buf.clone())
            .unwrap_or_default()
    }

    /// Discard the buffered samples
    pub fn clear_buffer(&self) {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }
    }
}

/// Convert f32 samples to 16-bit mono WAV bytes
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            // Convert f32 [-1.0, 1.0] to i16
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_to_wav_header() {
        let samples: Vec<f32> = (0..1600)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let t = i as f32 / SAMPLE_RATE as f32;
                0.5 * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
            })
            .collect();

        let wav = samples_to_wav(&samples, SAMPLE_RATE).unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert!(wav.len() > 44);
    }

    #[test]
    fn test_empty_buffer_still_encodes() {
        let wav = samples_to_wav(&[], SAMPLE_RATE).unwrap();
        // Header only
        assert_eq!(wav.len(), 44);
    }

    #[test]
    fn test_inactive_session_stop_is_noop() {
        let mut session = AudioCaptureSession::new();
        assert!(!session.is_capturing());
        assert!(session.stop().unwrap().is_none());
    }
}
