//! fie-relay: a single-endpoint relay between an FIE builder front end
//! and the Claude messages API.
//!
//! ```text
//! caller ──POST──▶ handler ──POST /messages──▶ provider
//!        ◀─JSON──          ◀──────JSON────────
//! ```
//!
//! The handler is framework-agnostic (`handler::handle`); `server`
//! adapts it to axum and `main` wires configuration and logging.

pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod handler;
pub mod server;

pub use config::RelayConfig;
pub use error::Error;
pub use handler::{handle, RelayReply};
pub use providers::AnthropicClient;
pub use request::{GenerationRequest, RelayResponse, ValidRequest};
pub use server::{build_router, AppState};
