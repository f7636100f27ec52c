use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::boundary::{self, POLL_INTERVAL};
use super::params::ListenParams;
use super::sink::EventSink;
use super::state::SessionState;
use crate::audio::{AudioCodec, AudioEncoder, AudioSpec};
use crate::enrich::Enrichment;
use crate::events::ServerEvent;
use crate::fanout::SegmentSink;
use crate::memory::{Memory, MemoryStore, ProcessingMemory};
use crate::profile::{SpeechProfile, SpeechProfileStore};
use crate::stt::{
    SttProvider, SttStream, SttStreamOptions, TranscriptBatch, CALIBRATION_STREAM, PRIMARY_STREAM,
};
use crate::transcript::combine_segments;

/// Keepalive cadence of the watchdog.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Settle padding added to the stored profile duration when the
/// calibration channel is primed.
const CALIBRATION_PAD_SECS: f64 = 20.0;

/// The in-progress transcript syncs to durable storage whenever the
/// accumulated segment count is a multiple of this.
const SYNC_EVERY_SEGMENTS: usize = 3;

/// Profile replay chunk size when priming the calibration channel.
const PROFILE_CHUNK_BYTES: usize = 4096;

/// Collaborators a session calls into. Shared by every session.
#[derive(Clone)]
pub struct SessionDeps {
    pub provider: Arc<dyn SttProvider>,
    pub store: Arc<dyn MemoryStore>,
    pub profiles: Arc<dyn SpeechProfileStore>,
    pub encoder: Arc<dyn AudioEncoder>,
    pub enrichment: Arc<dyn Enrichment>,
    pub segment_sink: Arc<SegmentSink>,
    /// Directory finalized audio containers are assembled into
    pub temp_dir: PathBuf,
}

/// One client connection's streaming session.
///
/// The driver loop interleaves the ingest loop, the keepalive watchdog and
/// (when boundary-watch is enabled) the boundary poller as branches of a
/// single task, so `SessionState` has exactly one writer. Cancellation is
/// cooperative: each branch flips `state.alive` and the loop exits at the
/// next boundary.
pub struct Session {
    params: ListenParams,
    deps: SessionDeps,
    sink: Box<dyn EventSink>,
    state: SessionState,
}

impl Session {
    pub fn new(params: ListenParams, deps: SessionDeps, sink: Box<dyn EventSink>) -> Self {
        let state = SessionState::new(params.new_memory_watch);
        Self {
            params,
            deps,
            sink,
            state,
        }
    }

    /// Run the session until the client disconnects, the transport fails,
    /// or the provider channel breaks. Consumes the inbound frame stream.
    pub async fn run(mut self, frames: mpsc::Receiver<Vec<u8>>) {
        info!(
            "Session started: uid={} language={} sample_rate={} codec={} channels={} \
             profile={} watch={}",
            self.params.uid,
            self.params.language,
            self.params.sample_rate,
            self.params.codec,
            self.params.channels,
            self.params.include_speech_profile,
            self.params.new_memory_watch,
        );

        let profile = self.load_profile().await;
        let calibration_secs = profile
            .as_ref()
            .map(|p| p.duration_secs + CALIBRATION_PAD_SECS)
            .unwrap_or(0.0);

        let (batch_tx, batch_rx) = mpsc::channel::<TranscriptBatch>(64);
        let options = SttStreamOptions {
            language: self.params.language.clone(),
            sample_rate: self.params.sample_rate,
            codec: self.params.codec,
            channels: self.params.channels,
        };

        // A provider-connect failure at session start is fatal for the
        // session: close the transport, no retry.
        let (primary, calibration) = match self
            .open_provider_streams(&options, profile, batch_tx)
            .await
        {
            Ok(streams) => streams,
            Err(e) => {
                error!("Initial provider setup failed: {:#}", e);
                self.sink.close().await;
                return;
            }
        };

        self.drive(frames, batch_rx, primary, calibration, calibration_secs)
            .await;
        self.teardown().await;
    }

    async fn load_profile(&self) -> Option<SpeechProfile> {
        let params = &self.params;
        let eligible = params.language == "en"
            && params.codec == AudioCodec::Opus
            && params.include_speech_profile;
        if !eligible {
            return None;
        }

        match self.deps.profiles.load(&params.uid).await {
            Ok(Some(profile)) if profile.duration_secs > 0.0 => Some(profile),
            Ok(_) => None,
            Err(e) => {
                warn!("Speech profile lookup failed for {}: {:#}", params.uid, e);
                None
            }
        }
    }

    /// Open the primary channel, and the calibration channel primed with
    /// the stored profile when one exists.
    async fn open_provider_streams(
        &self,
        options: &SttStreamOptions,
        profile: Option<SpeechProfile>,
        batch_tx: mpsc::Sender<TranscriptBatch>,
    ) -> Result<(Box<dyn SttStream>, Option<Box<dyn SttStream>>)> {
        let primary = self
            .deps
            .provider
            .open_stream(PRIMARY_STREAM, options, batch_tx.clone())
            .await
            .context("Failed to open primary provider channel")?;

        let calibration = match profile {
            Some(profile) => {
                let mut stream = self
                    .deps
                    .provider
                    .open_stream(CALIBRATION_STREAM, options, batch_tx)
                    .await
                    .context("Failed to open calibration channel")?;
                for chunk in profile.audio.chunks(PROFILE_CHUNK_BYTES) {
                    stream
                        .send_audio(chunk)
                        .await
                        .context("Failed to replay speech profile")?;
                }
                Some(stream)
            }
            None => None,
        };

        Ok((primary, calibration))
    }

    async fn drive(
        &mut self,
        mut frames: mpsc::Receiver<Vec<u8>>,
        mut batch_rx: mpsc::Receiver<TranscriptBatch>,
        mut primary: Box<dyn SttStream>,
        mut calibration: Option<Box<dyn SttStream>>,
        calibration_secs: f64,
    ) {
        let mut boundary_ticker = interval_at(Instant::now() + POLL_INTERVAL, POLL_INTERVAL);
        boundary_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut ping_ticker = interval_at(Instant::now() + PING_INTERVAL, PING_INTERVAL);
        ping_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut batches_open = true;

        while self.state.alive {
            tokio::select! {
                frame = frames.recv() => match frame {
                    Some(data) => {
                        if let Err(e) = self
                            .ingest_frame(data, &mut primary, &mut calibration, calibration_secs)
                            .await
                        {
                            error!("Could not process audio: {:#}", e);
                            self.state.alive = false;
                        }
                    }
                    None => {
                        info!("Client disconnected: uid={}", self.params.uid);
                        self.state.alive = false;
                    }
                },
                batch = batch_rx.recv(), if batches_open => match batch {
                    Some(batch) => self.on_transcript_batch(batch).await,
                    None => batches_open = false,
                },
                _ = boundary_ticker.tick(), if self.state.watch_enabled => {
                    self.try_flush().await;
                }
                _ = ping_ticker.tick() => self.keepalive().await,
            }
        }

        // Both provider channels close unconditionally, whichever branch
        // ended the loop.
        if let Err(e) = primary.finish().await {
            warn!("Primary provider channel close failed: {:#}", e);
        }
        if let Some(mut stream) = calibration.take() {
            if let Err(e) = stream.finish().await {
                warn!("Calibration channel close failed: {:#}", e);
            }
        }
    }

    /// Route one inbound frame. During the calibration window frames go to
    /// the calibration channel only; from the first frame past it they go
    /// to the primary channel only, and the calibration channel is closed
    /// exactly once at that transition.
    async fn ingest_frame(
        &mut self,
        data: Vec<u8>,
        primary: &mut Box<dyn SttStream>,
        calibration: &mut Option<Box<dyn SttStream>>,
        calibration_secs: f64,
    ) -> Result<()> {
        self.state.start_timer();
        let elapsed = self.state.elapsed_secs().unwrap_or(0.0);

        if elapsed > calibration_secs || calibration.is_none() {
            primary.send_audio(&data).await?;
            if let Some(mut stream) = calibration.take() {
                info!("Calibration window over, closing calibration channel");
                if let Err(e) = stream.finish().await {
                    warn!("Calibration channel close failed: {:#}", e);
                }
            }
        } else if let Some(stream) = calibration.as_mut() {
            stream.send_audio(&data).await?;
        }

        if self.state.watch_enabled {
            self.state.frames.push(data);
        }

        Ok(())
    }

    /// Forward a provider batch to the client and the fan-out sink, and
    /// fold primary-stream segments into the memory accumulator.
    async fn on_transcript_batch(&mut self, batch: TranscriptBatch) {
        if batch.segments.is_empty() {
            return;
        }

        if let Err(e) = self.sink.send_segments(&batch.segments).await {
            warn!("Failed to forward segments: {:#}", e);
        }
        self.deps
            .segment_sink
            .offer(&self.params.uid, &batch.segments);

        if batch.stream_id != PRIMARY_STREAM || !self.state.watch_enabled {
            return;
        }

        combine_segments(&mut self.state.segments, batch.segments);

        if self.state.processing_memory.is_some()
            && self.state.segments.len() % SYNC_EVERY_SEGMENTS == 0
        {
            self.sync_processing_memory().await;
        }
    }

    /// Snapshot the accumulated transcript into the processing memory and
    /// persist it, so a crash loses at most the un-synced tail.
    async fn sync_processing_memory(&mut self) {
        let Some(memory) = self.state.processing_memory.as_mut() else {
            return;
        };

        self.state.synced_index = self.state.segments.len();
        memory.transcript_segments = self.state.segments[..self.state.synced_index].to_vec();

        if let Err(e) = self
            .deps
            .store
            .update_processing_memory(&self.params.uid, memory)
            .await
        {
            warn!("Failed to sync processing memory {}: {:#}", memory.id, e);
        }
    }

    async fn create_processing_memory(&mut self) {
        let Some(timer_start) = self.state.timer_start_unix else {
            return;
        };

        let mut memory = ProcessingMemory::new(timer_start, &self.params.language);
        self.state.synced_index = self.state.segments.len();
        memory.transcript_segments = self.state.segments[..self.state.synced_index].to_vec();

        if let Err(e) = self
            .deps
            .store
            .upsert_processing_memory(&self.params.uid, &memory)
            .await
        {
            warn!("Failed to persist processing memory {}: {:#}", memory.id, e);
        }

        let id = memory.id.clone();
        self.state.processing_memory = Some(memory);
        self.emit(ServerEvent::NewProcessingMemoryCreated {
            processing_memory_id: id,
        })
        .await;
    }

    /// One boundary-detector pass: create the processing memory if it is
    /// due, then finalize when both boundary gates hold.
    async fn try_flush(&mut self) {
        let Some(elapsed) = self.state.elapsed_secs() else {
            debug!("No audio received yet");
            return;
        };

        match self.state.segments.last() {
            None => return,
            Some(last) if last.end.is_none() => {
                debug!("Last segment still open");
                return;
            }
            Some(_) => {}
        }

        if self.state.processing_memory.is_none() && !self.state.segments.is_empty() {
            self.create_processing_memory().await;
        }

        if !boundary::should_finalize(elapsed, &self.state.segments) {
            return;
        }

        self.finalize().await;
    }

    /// Cut a memory from the accumulated state.
    async fn finalize(&mut self) {
        if self.state.processing_memory.is_none() {
            self.create_processing_memory().await;
        } else {
            self.sync_processing_memory().await;
        }
        let Some(memory) = self.state.processing_memory.as_ref() else {
            return;
        };
        let processing_memory_id = memory.id.clone();

        self.emit(ServerEvent::NewMemoryCreating).await;

        let created = match self
            .deps
            .store
            .create_memory(&self.params.uid, &processing_memory_id)
            .await
        {
            Ok(created) => created,
            Err(e) => {
                // Accumulated state stays untouched so the next poll retries.
                warn!(
                    "Memory creation failed for {}: {:#}",
                    processing_memory_id, e
                );
                self.emit(ServerEvent::NewMemoryCreateFailed).await;
                return;
            }
        };

        self.state.processing_memory = Some(created.processing_memory.clone());
        self.emit(ServerEvent::NewMemoryCreated {
            processing_memory_id,
            memory_id: created.memory.id.clone(),
            memory: created.memory.clone(),
            messages: created.messages.clone(),
        })
        .await;

        self.post_process(&created.memory).await;

        // Reset for the next cycle; the un-synced tail carries over.
        self.state.segments.drain(..self.state.synced_index);
        self.state.synced_index = 0;
        self.state.frames.drain(..self.state.frame_synced_index);
        self.state.frame_synced_index = 0;
        self.state.processing_memory = None;
    }

    /// Assemble the unconsumed raw frames into one container and hand it
    /// to enrichment. The memory record already exists at this point, so a
    /// failure here only skips enrichment and is not retried.
    async fn post_process(&mut self, memory: &Memory) {
        self.state.frame_synced_index = self.state.frames.len();
        let frames = &self.state.frames[..self.state.frame_synced_index];

        let path = self
            .deps
            .temp_dir
            .join(format!("{}_{}.wav", memory.id, Uuid::new_v4()));
        let spec = AudioSpec {
            sample_rate: self.params.sample_rate,
            channels: self.params.channels,
            codec: self.params.codec,
        };
        if let Err(e) = self.deps.encoder.encode(frames, &spec, &path) {
            warn!("Failed to assemble audio for {}: {:#}", memory.id, e);
            return;
        }

        let emotional_feedback = self
            .state
            .processing_memory
            .as_ref()
            .and_then(|m| m.emotional_feedback);
        if let Err(e) = self
            .deps
            .enrichment
            .enqueue(&memory.id, &path, &self.params.uid, emotional_feedback)
            .await
        {
            warn!("Failed to queue enrichment for {}: {:#}", memory.id, e);
        }
    }

    /// Watchdog tick: the primary detector of silent disconnects for the
    /// activities that are not themselves reading from the transport.
    async fn keepalive(&mut self) {
        if !self.sink.is_connected() {
            debug!("Transport no longer connected, stopping session");
            self.state.alive = false;
            return;
        }
        if let Err(e) = self.sink.send_event(&ServerEvent::Ping).await {
            warn!("Keepalive failed: {:#}", e);
            self.state.alive = false;
        }
    }

    async fn teardown(&mut self) {
        self.state.alive = false;

        if self.sink.is_connected() {
            self.sink.close().await;
        }

        // Trailing speech gets one best-effort flush before the session
        // goes away.
        if self.state.watch_enabled {
            self.try_flush().await;
        }

        info!("Session closed: uid={}", self.params.uid);
    }

    async fn emit(&mut self, event: ServerEvent) {
        if let Err(e) = self.sink.send_event(&event).await {
            warn!("Failed to send lifecycle event: {:#}", e);
        }
    }
}
