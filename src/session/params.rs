use serde::Deserialize;

use crate::audio::AudioCodec;

fn default_language() -> String {
    "en".to_string()
}

fn default_sample_rate() -> u32 {
    8000
}

fn default_channels() -> u16 {
    1
}

fn default_true() -> bool {
    true
}

/// Session parameters, fixed at connection start. Arrives as the query
/// string of the listen endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenParams {
    /// Owning user id
    pub uid: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default)]
    pub codec: AudioCodec,

    #[serde(default = "default_channels")]
    pub channels: u16,

    /// Opt in to speech-profile calibration
    #[serde(default = "default_true")]
    pub include_speech_profile: bool,

    /// Opt in to automatic memory boundary detection
    #[serde(default)]
    pub new_memory_watch: bool,
}
