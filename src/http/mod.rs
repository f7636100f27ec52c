//! HTTP surface of the service
//!
//! - GET /v1/listen - WebSocket upgrade into a streaming session
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
