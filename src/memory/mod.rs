mod model;
mod store;

pub use model::{CreatedMemory, Geolocation, Memory, ProcessingMemory};
pub use store::{InMemoryStore, MemoryStore};
