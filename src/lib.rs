pub mod audio;
pub mod config;
pub mod enrich;
pub mod events;
pub mod fanout;
pub mod http;
pub mod memory;
pub mod profile;
pub mod session;
pub mod stt;
pub mod transcript;

pub use audio::{AudioCodec, AudioEncoder, AudioSpec, WavEncoder};
pub use config::Config;
pub use enrich::{Enrichment, LogEnrichment};
pub use events::ServerEvent;
pub use fanout::SegmentSink;
pub use http::{create_router, AppState};
pub use memory::{CreatedMemory, InMemoryStore, Memory, MemoryStore, ProcessingMemory};
pub use profile::{FileProfileStore, SpeechProfile, SpeechProfileStore};
pub use session::{EventSink, ListenParams, Session, SessionDeps};
pub use stt::{DeepgramProvider, SttProvider, SttStream, SttStreamOptions, TranscriptBatch};
pub use transcript::{combine_segments, TranscriptSegment};
