//! Directed connections between gate ports.

use crate::gate::GateId;
use crate::ids::fresh_id;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved source id for the external boolean input.
pub const EXTERNAL_INPUT: &str = "weather";

/// Unique connection identifier
pub type ConnectionId = String;

/// Where a connection takes its value from.
///
/// Serialized as a plain string: the reserved [`EXTERNAL_INPUT`] id or a
/// gate id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Source {
    /// The single external input supplied to each evaluation pass
    External,
    /// The output of another gate
    Gate(GateId),
}

/// A connection from a source output to one input port of a gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    pub from: Source,
    pub to: GateId,
    /// Output port on the source (empty for the external input)
    #[serde(default)]
    pub from_port: String,
    /// Input port on the destination gate
    pub to_port: String,
}

impl Source {
    pub fn gate(id: impl Into<GateId>) -> Self {
        Source::Gate(id.into())
    }

    pub fn is_external(&self) -> bool {
        matches!(self, Source::External)
    }

    /// The source gate id, if this is not the external input.
    pub fn gate_id(&self) -> Option<&str> {
        match self {
            Source::External => None,
            Source::Gate(id) => Some(id),
        }
    }

    /// True if this source is the given gate.
    pub fn is_gate(&self, gate_id: &str) -> bool {
        self.gate_id() == Some(gate_id)
    }
}

impl From<String> for Source {
    fn from(s: String) -> Self {
        if s == EXTERNAL_INPUT {
            Source::External
        } else {
            Source::Gate(s)
        }
    }
}

impl From<&str> for Source {
    fn from(s: &str) -> Self {
        Source::from(s.to_string())
    }
}

impl From<Source> for String {
    fn from(source: Source) -> Self {
        match source {
            Source::External => EXTERNAL_INPUT.to_string(),
            Source::Gate(id) => id,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::External => f.write_str(EXTERNAL_INPUT),
            Source::Gate(id) => f.write_str(id),
        }
    }
}

impl Connection {
    pub fn new(
        id: impl Into<ConnectionId>,
        from: impl Into<Source>,
        to: impl Into<GateId>,
        from_port: impl Into<String>,
        to_port: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            from_port: from_port.into(),
            to_port: to_port.into(),
        }
    }

    /// True if either endpoint is the given gate.
    pub fn touches(&self, gate_id: &str) -> bool {
        self.to == gate_id || self.from.is_gate(gate_id)
    }
}

/// Creates a new connection with a fresh id.
pub fn create_connection(
    from: impl Into<Source>,
    to: impl Into<GateId>,
    from_port: impl Into<String>,
    to_port: impl Into<String>,
) -> Connection {
    Connection::new(fresh_id("conn"), from, to, from_port, to_port)
}
