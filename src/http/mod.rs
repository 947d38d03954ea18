//! HTTP control API
//!
//! The UI layer is out of scope; it drives the orchestrator through this
//! small REST surface instead:
//! - POST /session/start - Start the voice session
//! - POST /session/stop - Stop it (idempotent)
//! - GET /session/status - Lifecycle state + transcript size
//! - GET /session/transcript - Full ordered transcript
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
