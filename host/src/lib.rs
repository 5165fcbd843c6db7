//! In-process host for the circuit builder.
//!
//! Wraps the evaluation engine with the collaborators the full system needs:
//! storage, the external input source, viewer broadcast, packed circuit
//! loading and structured logging.

mod broadcast;
mod config;
mod error;
mod loader;
mod logging;
mod service;
mod storage;
mod weather;

pub use broadcast::*;
pub use config::*;
pub use error::HostError;
pub use loader::*;
pub use logging::CircuitLog;
pub use service::CircuitService;
pub use storage::*;
pub use weather::*;
