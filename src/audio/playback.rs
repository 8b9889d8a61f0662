//! Audio playback to speakers

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, StreamConfig};

use crate::{Error, Result};

/// Plays synthesized response audio to the default output device
///
/// The output stream is configured per clip from the WAV header, so clips
/// of any sample rate the device supports can be rendered.
#[derive(Debug, Default)]
pub struct AudioPlayback;

impl AudioPlayback {
    /// Create a playback instance
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Decode WAV bytes and play them, blocking until playback completes
    ///
    /// # Errors
    ///
    /// Returns error if decoding fails or no suitable output device is
    /// available
    pub fn play_wav(&self, wav_data: &[u8]) -> Result<()> {
        let (samples, sample_rate) = decode_wav(wav_data)?;
        play_samples(samples, sample_rate)
    }
}

fn output_config(sample_rate: u32) -> Result<(cpal::Device, StreamConfig)> {
    let host = cpal::default_host();

    let device = host
        .default_output_device()
        .ok_or_else(|| Error::Audio("no output device available".to_string()))?;

    let supported_config = device
        .supported_output_configs()
        .map_err(|e| Error::Audio(e.to_string()))?
        .find(|c| {
            c.channels() == 1
                && c.min_sample_rate() <= SampleRate(sample_rate)
                && c.max_sample_rate() >= SampleRate(sample_rate)
        })
        .or_else(|| {
            // Fallback: try stereo
            device.supported_output_configs().ok()?.find(|c| {
                c.channels() == 2
                    && c.min_sample_rate() <= SampleRate(sample_rate)
                    && c.max_sample_rate() >= SampleRate(sample_rate)
            })
        })
        .ok_or_else(|| Error::Audio("no suitable output config found".to_string()))?;

    let config = supported_config
        .with_sample_rate(SampleRate(sample_rate))
        .config();

    tracing::debug!(
        device = device.name().unwrap_or_default(),
        sample_rate,
        channels = config.channels,
        "audio playback initialized"
    );

    Ok((device, config))
}

fn play_samples(samples: Vec<f32>, sample_rate: u32) -> Result<()> {
    if samples.is_empty() {
        return Ok(());
    }

    let (device, config) = output_config(sample_rate)?;
    let channels = config.channels as usize;

    let sample_count = samples.len();
    let samples = Arc::new(samples);
    let position = Arc::new(Mutex::new(0usize));
    let finished = Arc::new(Mutex::new(false));

    let samples_cb = Arc::clone(&samples);
    let position_cb = Arc::clone(&position);
    let finished_cb = Arc::clone(&finished);

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let Ok(mut pos) = position_cb.lock() else {
                    return;
                };

                for frame in data.chunks_mut(channels) {
                    let sample = if *pos < samples_cb.len() {
                        samples_cb[*pos]
                    } else {
                        if let Ok(mut done) = finished_cb.lock() {
                            *done = true;
                        }
                        0.0
                    };

                    for out in frame.iter_mut() {
                        *out = sample;
                    }

                    if *pos < samples_cb.len() {
                        *pos += 1;
                    }
                }
            },
            |err| {
                tracing::error!(error = %err, "audio playback error");
            },
            None,
        )
        .map_err(|e| Error::Audio(e.to_string()))?;

    stream.play().map_err(|e| Error::Audio(e.to_string()))?;

    let duration_ms = (sample_count as u64 * 1000) / u64::from(sample_rate);

    // Poll for completion with a small grace period past the clip length
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(duration_ms + 500);

    loop {
        if finished.lock().map(|done| *done).unwrap_or(true) {
            break;
        }
        if start.elapsed() > timeout {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(50));
    }

    std::thread::sleep(std::time::Duration::from_millis(100));

    drop(stream);
    tracing::debug!(samples = sample_count, "playback complete");

    Ok(())
}

/// Decode WAV bytes to mono f32 samples and their sample rate
fn decode_wav(wav_data: &[u8]) -> Result<(Vec<f32>, u32)> {
    let mut reader =
        hound::WavReader::new(Cursor::new(wav_data)).map_err(|e| Error::Audio(e.to_string()))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let max = f32::from(i16::MAX);
            reader
                .samples::<i16>()
                .filter_map(std::result::Result::ok)
                .map(|s| f32::from(s) / max)
                .collect()
        }
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .filter_map(std::result::Result::ok)
            .collect(),
    };

    // Downmix to mono if the source is stereo
    let samples = if spec.channels == 2 {
        samples
            .chunks(2)
            .map(|pair| (pair[0] + pair.get(1).copied().unwrap_or(pair[0])) / 2.0)
            .collect()
    } else {
        samples
    };

    Ok((samples, spec.sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{SAMPLE_RATE, samples_to_wav};

    #[test]
    fn test_decode_wav_roundtrip() {
        let original: Vec<f32> = vec![0.0, 0.5, -0.5, 0.25, -0.25];
        let wav = samples_to_wav(&original, SAMPLE_RATE).unwrap();

        let (decoded, rate) = decode_wav(&wav).unwrap();
        assert_eq!(rate, SAMPLE_RATE);
        assert_eq!(decoded.len(), original.len());
        for (a, b) in decoded.iter().zip(original.iter()) {
            assert!((a - b).abs() < 0.001);
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_wav(&[0u8; 16]).is_err());
    }
}
