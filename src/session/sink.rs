use anyhow::Result;

use crate::events::ServerEvent;
use crate::transcript::TranscriptSegment;

/// Outbound half of the client transport.
///
/// Send failures are surfaced as errors and logged by the session; they
/// only end the session when the keepalive watchdog hits one.
#[async_trait::async_trait]
pub trait EventSink: Send + Sync {
    /// Push a lifecycle event to the client.
    async fn send_event(&mut self, event: &ServerEvent) -> Result<()>;

    /// Forward a transcript batch to the client as a bare JSON array.
    async fn send_segments(&mut self, segments: &[TranscriptSegment]) -> Result<()>;

    /// Whether the transport still reports an open connection.
    fn is_connected(&self) -> bool;

    /// Close the transport. Best-effort; errors are swallowed.
    async fn close(&mut self);
}
