use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Downstream post-processing collaborator. Invoked once per finalized
/// memory with the assembled audio container; the actual pipeline
/// (summarization, emotion tagging) lives outside this service.
#[async_trait::async_trait]
pub trait Enrichment: Send + Sync {
    async fn enqueue(
        &self,
        memory_id: &str,
        audio_path: &Path,
        uid: &str,
        emotional_feedback: Option<bool>,
    ) -> Result<()>;
}

/// Stand-in enrichment that only records the hand-off. The audio container
/// is left in place for an external pipeline to pick up.
pub struct LogEnrichment;

#[async_trait::async_trait]
impl Enrichment for LogEnrichment {
    async fn enqueue(
        &self,
        memory_id: &str,
        audio_path: &Path,
        uid: &str,
        emotional_feedback: Option<bool>,
    ) -> Result<()> {
        info!(
            "Enrichment queued: memory={} uid={} audio={:?} emotional_feedback={:?}",
            memory_id, uid, audio_path, emotional_feedback
        );
        Ok(())
    }
}
