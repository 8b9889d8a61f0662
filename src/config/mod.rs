//! Configuration for the parley client

pub mod file;

use std::time::Duration;

use file::ParleyConfigFile;

/// Default backend API base URL
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Default per-request timeout in seconds
///
/// The backend has no cancellation primitive, so an unbounded request
/// would strand the pipeline busy flag forever on a hung call. Set to 0
/// to disable the bound.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend API base URL
    pub api_url: String,

    /// Per-request timeout; `None` means unbounded
    pub request_timeout: Option<Duration>,

    /// Voice configuration
    pub voice: VoiceConfig,
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Enable microphone capture and audio playback
    pub enabled: bool,
}

impl Config {
    /// Load configuration: defaults, overlaid by the config file, then by
    /// the given CLI/env overrides
    #[must_use]
    pub fn load(api_url: Option<&str>, timeout_secs: Option<u64>, disable_voice: bool) -> Self {
        Self::resolve(file::load_config_file(), api_url, timeout_secs, disable_voice)
    }

    fn resolve(
        file: ParleyConfigFile,
        api_url: Option<&str>,
        timeout_secs: Option<u64>,
        disable_voice: bool,
    ) -> Self {
        let api_url = api_url
            .map(ToString::to_string)
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_secs = timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let request_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        let voice_enabled = !disable_voice && file.voice.enabled.unwrap_or(true);

        Self {
            api_url,
            request_timeout,
            voice: VoiceConfig {
                enabled: voice_enabled,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::file::VoiceFileConfig;

    #[test]
    fn test_defaults() {
        let config = Config::resolve(ParleyConfigFile::default(), None, None, false);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(
            config.request_timeout,
            Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        );
        assert!(config.voice.enabled);
    }

    #[test]
    fn test_cli_override_beats_file() {
        let file = ParleyConfigFile {
            api_url: Some("http://from-file:8000".to_string()),
            timeout_secs: Some(30),
            voice: VoiceFileConfig::default(),
        };
        let config = Config::resolve(file, Some("http://from-cli:9000"), None, false);
        assert_eq!(config.api_url, "http://from-cli:9000");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_zero_timeout_disables_bound() {
        let config = Config::resolve(ParleyConfigFile::default(), None, Some(0), false);
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_disable_voice_flag_wins() {
        let file = ParleyConfigFile {
            api_url: None,
            timeout_secs: None,
            voice: VoiceFileConfig {
                enabled: Some(true),
            },
        };
        let config = Config::resolve(file, None, None, true);
        assert!(!config.voice.enabled);
    }
}
