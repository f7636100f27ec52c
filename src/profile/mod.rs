use anyhow::{Context, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// A stored voice sample used to prime the calibration channel.
#[derive(Debug, Clone)]
pub struct SpeechProfile {
    /// Raw audio in the codec the profile was recorded with
    pub audio: Vec<u8>,
    /// Length of the sample in seconds
    pub duration_secs: f64,
}

/// Per-user speech profile storage.
#[async_trait::async_trait]
pub trait SpeechProfileStore: Send + Sync {
    /// Load the stored profile for a user, if one exists.
    async fn load(&self, uid: &str) -> Result<Option<SpeechProfile>>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredProfile {
    duration_secs: f64,
    /// Base64-encoded raw audio bytes
    audio: String,
}

/// File-backed profile store: one `<uid>.json` document per user.
pub struct FileProfileStore {
    dir: PathBuf,
}

impl FileProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait::async_trait]
impl SpeechProfileStore for FileProfileStore {
    async fn load(&self, uid: &str) -> Result<Option<SpeechProfile>> {
        let path = self.dir.join(format!("{uid}.json"));
        if !path.exists() {
            return Ok(None);
        }

        let raw = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read speech profile: {:?}", path))?;
        let stored: StoredProfile =
            serde_json::from_slice(&raw).context("Failed to parse speech profile document")?;
        let audio = base64::engine::general_purpose::STANDARD
            .decode(stored.audio)
            .context("Failed to decode speech profile audio")?;

        info!(
            "Loaded speech profile for {}: {} bytes, {:.1}s",
            uid,
            audio.len(),
            stored.duration_secs
        );

        Ok(Some(SpeechProfile {
            audio,
            duration_secs: stored.duration_secs,
        }))
    }
}
