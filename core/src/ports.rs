//! Port definitions for gate inputs and outputs.

use serde::{Deserialize, Serialize};

/// Name of the single output port every gate exposes.
pub const OUTPUT_PORT: &str = "out";

/// Definition of an input port on a gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputPort {
    /// Port name (used as the key in `Gate::inputs`)
    pub name: String,
}

/// Definition of the output port on a gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPort {
    /// Port name (displayed in editor)
    pub name: String,
}

impl InputPort {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl OutputPort {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for OutputPort {
    fn default() -> Self {
        Self::new(OUTPUT_PORT)
    }
}
