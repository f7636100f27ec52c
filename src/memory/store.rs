use anyhow::{bail, Result};
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{CreatedMemory, Memory, ProcessingMemory};

/// Durable storage collaborator for processing memories and memories.
///
/// Only one session ever writes a given processing memory id, so
/// implementations need no locking beyond safe concurrent update-by-id;
/// last-writer-wins is acceptable.
#[async_trait::async_trait]
pub trait MemoryStore: Send + Sync {
    /// Create or replace a processing memory.
    async fn upsert_processing_memory(&self, uid: &str, memory: &ProcessingMemory) -> Result<()>;

    /// Update an existing processing memory.
    async fn update_processing_memory(&self, uid: &str, memory: &ProcessingMemory) -> Result<()>;

    /// Promote a processing memory into a finalized memory. Any error is
    /// treated by the session as a recoverable creation failure.
    async fn create_memory(&self, uid: &str, processing_memory_id: &str) -> Result<CreatedMemory>;
}

/// In-process store backing the binary in development and the tests.
/// Production deployments point the session at a document store instead.
pub struct InMemoryStore {
    processing: RwLock<HashMap<String, HashMap<String, ProcessingMemory>>>,
    memories: RwLock<HashMap<String, Vec<Memory>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            processing: RwLock::new(HashMap::new()),
            memories: RwLock::new(HashMap::new()),
        }
    }

    /// Memories created so far for a user, in creation order.
    pub async fn memories_for(&self, uid: &str) -> Vec<Memory> {
        let memories = self.memories.read().await;
        memories.get(uid).cloned().unwrap_or_default()
    }

    pub async fn processing_memory(&self, uid: &str, id: &str) -> Option<ProcessingMemory> {
        let processing = self.processing.read().await;
        processing.get(uid).and_then(|m| m.get(id)).cloned()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MemoryStore for InMemoryStore {
    async fn upsert_processing_memory(&self, uid: &str, memory: &ProcessingMemory) -> Result<()> {
        let mut processing = self.processing.write().await;
        processing
            .entry(uid.to_string())
            .or_default()
            .insert(memory.id.clone(), memory.clone());
        Ok(())
    }

    async fn update_processing_memory(&self, uid: &str, memory: &ProcessingMemory) -> Result<()> {
        let mut processing = self.processing.write().await;
        match processing.get_mut(uid).and_then(|m| m.get_mut(&memory.id)) {
            Some(stored) => {
                *stored = memory.clone();
                Ok(())
            }
            None => bail!("processing memory {} not found for {}", memory.id, uid),
        }
    }

    async fn create_memory(&self, uid: &str, processing_memory_id: &str) -> Result<CreatedMemory> {
        let mut processing = self.processing.write().await;
        let stored = match processing
            .get_mut(uid)
            .and_then(|m| m.get_mut(processing_memory_id))
        {
            Some(stored) => stored,
            None => bail!(
                "processing memory {} not found for {}",
                processing_memory_id,
                uid
            ),
        };

        let memory = Memory {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            language: stored.language.clone(),
            transcript_segments: stored.transcript_segments.clone(),
            geolocation: stored.geolocation.clone(),
        };

        stored.memory_id = Some(memory.id.clone());
        let updated = stored.clone();

        let mut memories = self.memories.write().await;
        memories
            .entry(uid.to_string())
            .or_default()
            .push(memory.clone());

        Ok(CreatedMemory {
            memory,
            messages: Vec::new(),
            processing_memory: updated,
        })
    }
}
