use serde::{Deserialize, Serialize};

/// A single attributed span of transcribed speech.
///
/// Times are in seconds, relative to the start of the session's audio.
/// Interim provider output may not carry an `end` yet; a segment only
/// participates in boundary detection once `end` is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Speaker label assigned by the transcription provider (e.g. "SPEAKER_00")
    pub speaker: String,

    /// Whether the provider attributed this span to the device owner
    pub is_user: bool,

    /// Transcribed text
    pub text: String,

    /// Start of the span in session-relative seconds
    pub start: f64,

    /// End of the span in session-relative seconds, once known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
}

impl TranscriptSegment {
    /// Two segments belong to the same voice when the provider gave them the
    /// same speaker label, or attributed both to the device owner.
    pub fn same_voice(&self, other: &TranscriptSegment) -> bool {
        self.speaker == other.speaker || (self.is_user && other.is_user)
    }

    /// Whitespace-delimited word count of the segment text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}
