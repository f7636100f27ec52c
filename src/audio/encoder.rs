use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Audio codec negotiated at connection start.
///
/// The PCM variants are 16-bit little-endian frames; the names follow the
/// device firmware's 8 kHz / 16 kHz stream modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    #[default]
    Pcm8,
    Pcm16,
    Opus,
}

impl fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioCodec::Pcm8 => write!(f, "pcm8"),
            AudioCodec::Pcm16 => write!(f, "pcm16"),
            AudioCodec::Opus => write!(f, "opus"),
        }
    }
}

/// Shape of the raw frames handed to the encoder.
#[derive(Debug, Clone)]
pub struct AudioSpec {
    pub sample_rate: u32,
    pub channels: u16,
    pub codec: AudioCodec,
}

/// Assembles ordered raw frames into one audio container on disk.
pub trait AudioEncoder: Send + Sync {
    fn encode(&self, frames: &[Vec<u8>], spec: &AudioSpec, dest: &Path) -> Result<()>;
}

/// WAV container assembly for the PCM codecs.
///
/// Opus frames need an external containerizer and are rejected here; the
/// enrichment pipeline owns that path.
pub struct WavEncoder;

impl AudioEncoder for WavEncoder {
    fn encode(&self, frames: &[Vec<u8>], spec: &AudioSpec, dest: &Path) -> Result<()> {
        if spec.codec == AudioCodec::Opus {
            bail!("opus frames cannot be containerized by the WAV encoder");
        }

        let wav_spec = hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(dest, wav_spec)
            .with_context(|| format!("Failed to create WAV file: {:?}", dest))?;

        for frame in frames {
            for bytes in frame.chunks_exact(2) {
                let sample = i16::from_le_bytes([bytes[0], bytes[1]]);
                writer
                    .write_sample(sample)
                    .context("Failed to write sample to WAV")?;
            }
        }

        writer.finalize().context("Failed to finalize WAV file")?;
        Ok(())
    }
}
