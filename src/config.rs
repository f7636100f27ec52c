use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub stt: SttConfig,
    pub nats: NatsConfig,
    pub profiles: ProfilesConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct SttConfig {
    /// Streaming endpoint of the transcription provider
    pub endpoint: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct NatsConfig {
    /// Segment fan-out is skipped entirely when disabled
    pub enabled: bool,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfilesConfig {
    /// Directory of per-user speech profile documents
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    /// Scratch directory for assembled audio containers
    pub temp_path: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
