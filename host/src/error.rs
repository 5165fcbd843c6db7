use crate::loader::LoadError;
use crate::weather::InputError;
use circuit_core::CircuitError;

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Circuit not found: {0}")]
    CircuitNotFound(u64),

    #[error("Invalid circuit data: {0}")]
    InvalidCircuit(String),

    #[error("Invalid arguments: {0}")]
    Usage(String),

    #[error("Circuit error: {0}")]
    Circuit(#[from] CircuitError),

    #[error("Circuit load error: {0}")]
    Load(#[from] LoadError),

    #[error("Input source error: {0}")]
    Input(#[from] InputError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
