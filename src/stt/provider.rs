use anyhow::Result;
use tokio::sync::mpsc;

use crate::audio::AudioCodec;
use crate::transcript::TranscriptSegment;

/// Stream id of the channel whose segments feed the memory accumulator.
pub const PRIMARY_STREAM: u8 = 1;

/// Stream id of the channel primed with the stored speech profile.
pub const CALIBRATION_STREAM: u8 = 2;

/// Parameters a provider channel is opened with.
#[derive(Debug, Clone)]
pub struct SttStreamOptions {
    pub language: String,
    pub sample_rate: u32,
    pub codec: AudioCodec,
    pub channels: u16,
}

/// One batch of raw segments from a provider channel, tagged with the
/// stream id it came from.
#[derive(Debug, Clone)]
pub struct TranscriptBatch {
    pub stream_id: u8,
    pub segments: Vec<TranscriptSegment>,
}

/// Open half-duplex audio channel to the transcription provider.
///
/// Transcript batches arrive asynchronously on the channel handed to
/// [`SttProvider::open_stream`]; this handle only carries audio out.
#[async_trait::async_trait]
pub trait SttStream: Send {
    /// Forward one binary audio frame, in order.
    async fn send_audio(&mut self, frame: &[u8]) -> Result<()>;

    /// Flush and close the channel.
    async fn finish(&mut self) -> Result<()>;
}

/// Transcription provider collaborator.
#[async_trait::async_trait]
pub trait SttProvider: Send + Sync {
    /// Open a channel. Batches parsed from provider responses are delivered
    /// on `batches`, tagged with `stream_id`, until the channel closes.
    async fn open_stream(
        &self,
        stream_id: u8,
        options: &SttStreamOptions,
        batches: mpsc::Sender<TranscriptBatch>,
    ) -> Result<Box<dyn SttStream>>;
}
