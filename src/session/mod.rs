//! Streaming session state machine
//!
//! One `Session` per client connection: audio ingest and provider
//! multiplexing, transcript accumulation and periodic durable sync, the
//! memory boundary detector, and the keepalive watchdog.

mod boundary;
mod params;
mod session;
mod sink;
mod state;

pub use boundary::{should_finalize, MIN_WORDS, POLL_INTERVAL, SETTLE_SECONDS};
pub use params::ListenParams;
pub use session::{Session, SessionDeps};
pub use sink::EventSink;
pub use state::SessionState;
