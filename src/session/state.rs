use chrono::Utc;
use tokio::time::Instant;

use crate::memory::ProcessingMemory;
use crate::transcript::TranscriptSegment;

/// Mutable per-connection state. Owned exclusively by the session driver
/// task; every concurrent activity of a session mutates it from inside
/// that one task, so there is exactly one writer by construction and no
/// locking.
pub struct SessionState {
    /// Cooperative liveness flag, checked at every loop boundary
    pub alive: bool,

    /// Whether automatic boundary detection runs for this session
    pub watch_enabled: bool,

    /// Monotonic zero point of the audio timeline, set on the first frame
    pub timer_start: Option<Instant>,

    /// Wall-clock counterpart of `timer_start` (unix seconds), persisted
    /// into processing memories
    pub timer_start_unix: Option<f64>,

    /// Accumulated merged transcript segments
    pub segments: Vec<TranscriptSegment>,

    /// Count of leading segments already synced to durable storage
    pub synced_index: usize,

    /// Raw audio frames awaiting finalization (boundary-watch sessions only)
    pub frames: Vec<Vec<u8>>,

    /// Count of leading frames consumed by the last finalize
    pub frame_synced_index: usize,

    /// The in-progress memory, once one exists
    pub processing_memory: Option<ProcessingMemory>,
}

impl SessionState {
    pub fn new(watch_enabled: bool) -> Self {
        Self {
            alive: true,
            watch_enabled,
            timer_start: None,
            timer_start_unix: None,
            segments: Vec::new(),
            synced_index: 0,
            frames: Vec::new(),
            frame_synced_index: 0,
            processing_memory: None,
        }
    }

    /// Record the audio timeline zero point. Idempotent; only the first
    /// call takes effect.
    pub fn start_timer(&mut self) {
        if self.timer_start.is_none() {
            self.timer_start = Some(Instant::now());
            self.timer_start_unix = Some(Utc::now().timestamp_millis() as f64 / 1000.0);
        }
    }

    /// Seconds since the first audio frame, if one was received.
    pub fn elapsed_secs(&self) -> Option<f64> {
        self.timer_start.map(|start| start.elapsed().as_secs_f64())
    }
}
