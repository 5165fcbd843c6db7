//! Logic gate circuits for the visual circuit builder.
//!
//! A circuit is a set of gates (AND, OR, NOT, ...) joined by connections that
//! carry one boolean each. Connections may also read the single external
//! input (the `"weather"` source). [`CircuitEngine::evaluate`] resolves every
//! gate's output in dependency order.

pub mod circuit;
pub mod connection;
pub mod engine;
pub mod gate;
mod ids;
pub mod ports;
pub mod simulation;
pub mod templates;
#[cfg(feature = "wasm")]
pub mod wasm;

pub use circuit::{Circuit, CircuitError, ValidationIssue};
pub use connection::{create_connection, Connection, ConnectionId, Source, EXTERNAL_INPUT};
pub use engine::CircuitEngine;
pub use gate::{create_gate, Gate, GateCategory, GateId, GateKind, InputMap, Position};
pub use ports::{InputPort, OutputPort, OUTPUT_PORT};
pub use simulation::{Simulation, SimulationStats, SimulationStep};
pub use templates::Template;
