use serde::Serialize;

use crate::memory::Memory;

/// Lifecycle events pushed to the client over the session connection.
///
/// Events for a given memory are emitted in strict causal order:
/// `new_memory_creating` first, then exactly one of `new_memory_created`
/// or `new_memory_create_failed`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Keepalive heartbeat
    Ping,

    /// A processing memory now exists for the in-progress speech
    NewProcessingMemoryCreated { processing_memory_id: String },

    /// The boundary detector triggered and memory creation started
    NewMemoryCreating,

    /// Memory creation finished; carries the memory and derived artifacts
    NewMemoryCreated {
        processing_memory_id: String,
        memory_id: String,
        memory: Memory,
        messages: Vec<serde_json::Value>,
    },

    /// Memory creation failed; accumulated state is kept for a later retry
    NewMemoryCreateFailed,
}
