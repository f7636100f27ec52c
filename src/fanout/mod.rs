use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::transcript::TranscriptSegment;

/// Queue depth before broadcasts start being dropped.
const QUEUE_DEPTH: usize = 256;

struct SegmentBroadcast {
    uid: String,
    segments: Vec<TranscriptSegment>,
}

/// Fan-out of merged segments to cross-session consumers over NATS.
///
/// Delivery is best-effort: a bounded queue feeds one consumer task, and a
/// full queue drops the broadcast rather than stall the ingest loop. There
/// is no completion tracking and no backpressure toward the session.
pub struct SegmentSink {
    tx: mpsc::Sender<SegmentBroadcast>,
}

impl SegmentSink {
    /// Spawn the consumer task. Without a NATS client the sink drains and
    /// discards, so sessions behave identically in both configurations.
    pub fn start(nats: Option<async_nats::Client>) -> Self {
        let (tx, mut rx) = mpsc::channel::<SegmentBroadcast>(QUEUE_DEPTH);

        tokio::spawn(async move {
            while let Some(broadcast) = rx.recv().await {
                let Some(client) = nats.as_ref() else {
                    continue;
                };
                let subject = format!("transcript.segments.user-{}", broadcast.uid);
                let payload = match serde_json::to_vec(&broadcast.segments) {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!("Failed to serialize segment broadcast: {}", e);
                        continue;
                    }
                };
                if let Err(e) = client.publish(subject, payload.into()).await {
                    warn!("Failed to publish segment broadcast: {}", e);
                }
            }
            info!("Segment fan-out consumer stopped");
        });

        Self { tx }
    }

    /// Hand a batch to the consumer without waiting.
    pub fn offer(&self, uid: &str, segments: &[TranscriptSegment]) {
        let broadcast = SegmentBroadcast {
            uid: uid.to_string(),
            segments: segments.to_vec(),
        };
        if self.tx.try_send(broadcast).is_err() {
            debug!("Segment fan-out queue full, dropping batch");
        }
    }
}
