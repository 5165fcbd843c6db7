//! Gate type definitions.
//!
//! Every gate is a boolean function with named input ports and one output:
//! - **Basic**: AND / OR / NOT
//! - **Universal**: NAND / NOR
//! - **Exclusive**: XOR
//!
//! Adding a kind means adding a variant, its default ports and its truth rule.

use crate::ids::fresh_id;
use crate::ports::{InputPort, OutputPort};
use crate::CircuitError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Unique gate identifier
pub type GateId = String;

/// Input values keyed by port name.
///
/// Ordered by port name, so the "first" input of a gate is the value on its
/// lexicographically smallest port.
pub type InputMap = BTreeMap<String, bool>;

/// A gate placed in the circuit.
///
/// `inputs` and `output` are derived state: the engine overwrites both on
/// every evaluation pass, callers only read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// Unique identifier, immutable once created
    pub id: GateId,
    /// The gate's truth rule
    #[serde(rename = "type")]
    pub kind: GateKind,
    /// Position in the editor, never read by the evaluator
    pub position: Position,
    #[serde(default)]
    pub(crate) inputs: InputMap,
    #[serde(default)]
    pub(crate) output: bool,
}

/// Canvas position (preserved for editor reload).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The different kinds of gates available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateKind {
    /// True iff at least one input is wired and every input is true
    And,
    /// True iff any input is true
    Or,
    /// Negation of the first input (absent counts as false)
    Not,
    /// Negated AND
    Nand,
    /// Negated OR
    Nor,
    /// True iff an odd number of inputs are true
    Xor,
}

/// Grouping used by template and palette listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateCategory {
    Basic,
    Universal,
    Exclusive,
}

impl Gate {
    /// Builds a gate with zeroed default ports and `output = false`.
    pub fn new(id: impl Into<GateId>, kind: GateKind, position: Position) -> Self {
        let inputs = kind
            .inputs()
            .into_iter()
            .map(|port| (port.name, false))
            .collect();

        Self {
            id: id.into(),
            kind,
            position,
            inputs,
            output: false,
        }
    }

    /// Current input values, as left by the last evaluation pass.
    pub fn inputs(&self) -> &InputMap {
        &self.inputs
    }

    /// Value on a single input port (absent ports read as `None`).
    pub fn input(&self, port: &str) -> Option<bool> {
        self.inputs.get(port).copied()
    }

    /// Current output, as computed by the last evaluation pass.
    pub fn output(&self) -> bool {
        self.output
    }

    /// Restores factory state: default ports zeroed, output false.
    pub(crate) fn reset(&mut self) {
        let fresh = Gate::new(self.id.clone(), self.kind, self.position);
        self.inputs = fresh.inputs;
        self.output = false;
    }
}

/// Creates a new gate of the requested kind with a fresh id.
pub fn create_gate(kind: GateKind, position: Position) -> Gate {
    Gate::new(fresh_id("gate"), kind, position)
}

impl GateKind {
    pub fn all() -> &'static [GateKind] {
        &[
            GateKind::And,
            GateKind::Or,
            GateKind::Not,
            GateKind::Nand,
            GateKind::Nor,
            GateKind::Xor,
        ]
    }

    /// Get display name for the palette
    pub fn display_name(&self) -> &'static str {
        match self {
            GateKind::And => "AND",
            GateKind::Or => "OR",
            GateKind::Not => "NOT",
            GateKind::Nand => "NAND",
            GateKind::Nor => "NOR",
            GateKind::Xor => "XOR",
        }
    }

    pub fn category(&self) -> GateCategory {
        match self {
            GateKind::And | GateKind::Or | GateKind::Not => GateCategory::Basic,
            GateKind::Nand | GateKind::Nor => GateCategory::Universal,
            GateKind::Xor => GateCategory::Exclusive,
        }
    }

    /// Get input port definitions for this gate
    pub fn inputs(&self) -> Vec<InputPort> {
        match self {
            GateKind::Not => vec![InputPort::new("a")],
            GateKind::And | GateKind::Or | GateKind::Nand | GateKind::Nor | GateKind::Xor => {
                vec![InputPort::new("a"), InputPort::new("b")]
            }
        }
    }

    /// Get output port definitions for this gate
    pub fn outputs(&self) -> Vec<OutputPort> {
        vec![OutputPort::default()]
    }

    pub fn has_input(&self, port: &str) -> bool {
        self.inputs().iter().any(|p| p.name == port)
    }

    /// Applies the truth rule to a set of input values.
    pub fn apply(&self, inputs: &InputMap) -> bool {
        let mut values = inputs.values().copied();
        match self {
            GateKind::And => !inputs.is_empty() && values.all(|v| v),
            GateKind::Or => values.any(|v| v),
            GateKind::Not => !values.next().unwrap_or(false),
            GateKind::Nand => !GateKind::And.apply(inputs),
            GateKind::Nor => !GateKind::Or.apply(inputs),
            GateKind::Xor => values.filter(|v| *v).count() % 2 == 1,
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for GateKind {
    type Err = CircuitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GateKind::all()
            .iter()
            .find(|kind| kind.display_name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| CircuitError::UnknownGateKind(s.to_string()))
    }
}

impl GateCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            GateCategory::Basic => "Basic",
            GateCategory::Universal => "Universal",
            GateCategory::Exclusive => "Exclusive",
        }
    }
}
