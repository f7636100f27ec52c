use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::transcript::TranscriptSegment;

/// Geographic position attached to a memory by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geolocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// The mutable accumulator for one not-yet-finalized memory.
///
/// Created lazily once the session has at least one segment with a known
/// `end`, synced to durable storage while the session runs, and promoted
/// into a [`Memory`] when the boundary detector cuts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingMemory {
    pub id: String,

    pub created_at: DateTime<Utc>,

    /// Wall-clock zero point of the session's audio timeline (unix seconds)
    pub timer_start: f64,

    pub language: String,

    pub transcript_segments: Vec<TranscriptSegment>,

    /// Filled in by downstream enrichment, read back at finalize time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional_feedback: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geolocation: Option<Geolocation>,

    /// Set by the storage collaborator once a memory has been created from
    /// this processing memory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_id: Option<String>,
}

impl ProcessingMemory {
    pub fn new(timer_start: f64, language: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            timer_start,
            language: language.to_string(),
            transcript_segments: Vec::new(),
            emotional_feedback: None,
            geolocation: None,
            memory_id: None,
        }
    }
}

/// A finalized, bounded recording with its transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: String,

    pub created_at: DateTime<Utc>,

    pub language: String,

    pub transcript_segments: Vec<TranscriptSegment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geolocation: Option<Geolocation>,
}

/// Result of promoting a processing memory into a finalized memory.
#[derive(Debug, Clone)]
pub struct CreatedMemory {
    pub memory: Memory,

    /// Derived response artifacts produced alongside the memory
    /// (plugin messages and the like), forwarded to the client as-is
    pub messages: Vec<serde_json::Value>,

    /// The processing memory as updated by the storage collaborator
    pub processing_memory: ProcessingMemory,
}
