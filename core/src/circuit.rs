//! Circuit documents: a named gate set plus its connections.
//!
//! This is the form a circuit takes when it is stored, shared or loaded into
//! an engine. Validation here is optional and stricter than evaluation: the
//! engine accepts anything, `validate` reports what looks wrong.

use crate::connection::Connection;
use crate::engine::CircuitEngine;
use crate::gate::{Gate, GateId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A complete circuit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of this circuit
    pub name: String,
    /// All gates, in store order
    pub gates: Vec<Gate>,
    /// Connections between gates, in evaluation tie-break order
    pub connections: Vec<Connection>,
}

/// Something `validate` found suspicious.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ValidationIssue {
    /// Connection reads from a gate that does not exist
    DanglingSource { connection: String, gate: GateId },
    /// Connection feeds a gate that does not exist
    DanglingTarget { connection: String, gate: GateId },
    /// Connection feeds a port the destination kind does not have
    UnknownPort { connection: String, gate: GateId, port: String },
    /// Gate output wired straight back into itself
    SelfLoop { connection: String, gate: GateId },
    /// More than one connection feeds the same port; the last one wins
    DuplicatePort { gate: GateId, port: String, connections: Vec<String> },
    /// Gates that depend on their own output through other gates
    Cycle { gates: Vec<GateId> },
}

#[derive(Debug, thiserror::Error)]
pub enum CircuitError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),
    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),
    #[error("Unknown gate type: {0}")]
    UnknownGateKind(String),
    #[error("Invalid circuit: {0}")]
    Invalid(ValidationIssue),
}

impl Circuit {
    /// Create a new empty circuit
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gates: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Snapshot an engine's current state.
    pub fn from_engine(name: impl Into<String>, engine: &CircuitEngine) -> Self {
        Self {
            name: name.into(),
            gates: engine.gates(),
            connections: engine.connections(),
        }
    }

    /// Load into a fresh engine, keeping document order.
    pub fn into_engine(self) -> CircuitEngine {
        let mut engine = CircuitEngine::new();
        for gate in self.gates {
            engine.add_gate(gate);
        }
        for connection in self.connections {
            engine.add_connection(connection);
        }
        engine
    }

    /// Get a gate by ID
    pub fn gate(&self, id: &str) -> Option<&Gate> {
        self.gates.iter().find(|g| g.id == id)
    }

    /// Report everything that looks wrong, in a stable order.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let gates: HashMap<&str, &Gate> = self.gates.iter().map(|g| (g.id.as_str(), g)).collect();

        for conn in &self.connections {
            if let Some(source) = conn.from.gate_id() {
                if !gates.contains_key(source) {
                    issues.push(ValidationIssue::DanglingSource {
                        connection: conn.id.clone(),
                        gate: source.to_string(),
                    });
                }
                if source == conn.to {
                    issues.push(ValidationIssue::SelfLoop {
                        connection: conn.id.clone(),
                        gate: conn.to.clone(),
                    });
                }
            }

            match gates.get(conn.to.as_str()) {
                None => issues.push(ValidationIssue::DanglingTarget {
                    connection: conn.id.clone(),
                    gate: conn.to.clone(),
                }),
                Some(gate) if !gate.kind.has_input(&conn.to_port) => {
                    issues.push(ValidationIssue::UnknownPort {
                        connection: conn.id.clone(),
                        gate: conn.to.clone(),
                        port: conn.to_port.clone(),
                    })
                }
                Some(_) => {}
            }
        }

        // Several connections on one port, reported in first-seen order
        let mut feeds: Vec<((&str, &str), Vec<String>)> = Vec::new();
        let mut seen: HashMap<(&str, &str), usize> = HashMap::new();
        for conn in &self.connections {
            let key = (conn.to.as_str(), conn.to_port.as_str());
            match seen.get(&key) {
                Some(&slot) => feeds[slot].1.push(conn.id.clone()),
                None => {
                    seen.insert(key, feeds.len());
                    feeds.push((key, vec![conn.id.clone()]));
                }
            }
        }
        for ((gate, port), connections) in feeds {
            if connections.len() > 1 {
                issues.push(ValidationIssue::DuplicatePort {
                    gate: gate.to_string(),
                    port: port.to_string(),
                    connections,
                });
            }
        }

        issues.extend(
            self.find_cycles()
                .into_iter()
                .map(|gates| ValidationIssue::Cycle { gates }),
        );

        issues
    }

    /// Return the first validation issue as an error.
    pub fn check(&self) -> Result<(), CircuitError> {
        match self.validate().into_iter().next() {
            Some(issue) => Err(CircuitError::Invalid(issue)),
            None => Ok(()),
        }
    }

    /// Feedback loops through two or more gates (self loops are reported
    /// separately). Each cycle is listed once, in dependency order.
    pub fn find_cycles(&self) -> Vec<Vec<GateId>> {
        let count = self.gates.len();
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(count);
        for (i, gate) in self.gates.iter().enumerate() {
            index.entry(gate.id.as_str()).or_insert(i);
        }

        // Gates each gate depends on, in connection order
        let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); count];
        for conn in &self.connections {
            let source = conn.from.gate_id().and_then(|id| index.get(id));
            if let (Some(&to), Some(&from)) = (index.get(conn.to.as_str()), source) {
                incoming[to].push(from);
            }
        }

        let mut cycles = Vec::new();
        let mut done = vec![false; count];
        // Depth on the current path, for gates that are on it
        let mut on_path: Vec<Option<usize>> = vec![None; count];
        let mut stack: Vec<Visit> = Vec::new();

        for root in 0..count {
            if done[root] {
                continue;
            }
            on_path[root] = Some(0);
            stack.push(Visit { gate: root, next: 0 });

            loop {
                let Some(visit) = stack.last_mut() else {
                    break;
                };
                let gate = visit.gate;
                let next = visit.next;
                visit.next += 1;

                let Some(&dep) = incoming[gate].get(next) else {
                    stack.pop();
                    on_path[gate] = None;
                    done[gate] = true;
                    continue;
                };

                if let Some(start) = on_path[dep] {
                    if stack.len() - start > 1 {
                        cycles.push(
                            stack[start..]
                                .iter()
                                .map(|v| self.gates[v.gate].id.clone())
                                .collect(),
                        );
                    }
                } else if !done[dep] {
                    on_path[dep] = Some(stack.len());
                    stack.push(Visit { gate: dep, next: 0 });
                }
            }
        }

        cycles
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, CircuitError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON
    pub fn from_json(s: &str) -> Result<Self, CircuitError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String, CircuitError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Deserialize from RON format
    pub fn from_ron(s: &str) -> Result<Self, CircuitError> {
        Ok(ron::from_str(s)?)
    }
}

/// A gate on the cycle search path and its next dependency to follow.
struct Visit {
    gate: usize,
    next: usize,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::DanglingSource { connection, gate } => {
                write!(f, "connection {} reads from missing gate {}", connection, gate)
            }
            ValidationIssue::DanglingTarget { connection, gate } => {
                write!(f, "connection {} feeds missing gate {}", connection, gate)
            }
            ValidationIssue::UnknownPort { connection, gate, port } => {
                write!(f, "connection {} feeds unknown port {}.{}", connection, gate, port)
            }
            ValidationIssue::SelfLoop { connection, gate } => {
                write!(f, "connection {} wires gate {} into itself", connection, gate)
            }
            ValidationIssue::DuplicatePort { gate, port, connections } => write!(
                f,
                "port {}.{} is fed by {} connections ({})",
                gate,
                port,
                connections.len(),
                connections.join(", ")
            ),
            ValidationIssue::Cycle { gates } => {
                write!(f, "feedback loop through {}", gates.join(" -> "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Source;
    use crate::gate::{GateKind, Position};

    fn sample() -> Circuit {
        let mut circuit = Circuit::new("alarm");
        circuit.gates.push(Gate::new("A", GateKind::And, Position::new(200.0, 150.0)));
        circuit.gates.push(Gate::new("B", GateKind::Not, Position::new(350.0, 150.0)));
        circuit.connections.push(Connection::new("c1", "A", "B", "out", "a"));
        circuit.connections.push(Connection::new("c2", "weather", "A", "", "a"));
        circuit.connections.push(Connection::new("c3", "weather", "A", "", "b"));
        circuit
    }

    #[test]
    fn test_valid_circuit_has_no_issues() {
        let circuit = sample();
        assert!(circuit.validate().is_empty());
        assert!(circuit.check().is_ok());
    }

    #[test]
    fn test_into_engine_evaluates() {
        let mut engine = sample().into_engine();
        let gates = engine.evaluate(true);
        assert!(gates[0].output());
        assert!(!gates[1].output());

        let saved = Circuit::from_engine("alarm", &engine);
        assert!(saved.gate("A").unwrap().output());
        assert_eq!(saved.connections.len(), 3);
    }

    #[test]
    fn test_validate_reports_dangling_and_unknown_port() {
        let mut circuit = sample();
        circuit.connections.push(Connection::new("c4", "ghost", "B", "out", "a"));
        circuit.connections.push(Connection::new("c5", "A", "nowhere", "out", "a"));
        circuit.connections.push(Connection::new("c6", "weather", "B", "", "b"));

        let issues = circuit.validate();
        assert!(issues.contains(&ValidationIssue::DanglingSource {
            connection: "c4".to_string(),
            gate: "ghost".to_string(),
        }));
        assert!(issues.contains(&ValidationIssue::DanglingTarget {
            connection: "c5".to_string(),
            gate: "nowhere".to_string(),
        }));
        assert!(issues.contains(&ValidationIssue::UnknownPort {
            connection: "c6".to_string(),
            gate: "B".to_string(),
            port: "b".to_string(),
        }));
        assert!(issues.contains(&ValidationIssue::DuplicatePort {
            gate: "B".to_string(),
            port: "a".to_string(),
            connections: vec!["c1".to_string(), "c4".to_string()],
        }));
    }

    #[test]
    fn test_validate_reports_loops() {
        let mut circuit = Circuit::new("latch");
        circuit.gates.push(Gate::new("X", GateKind::Nor, Position::default()));
        circuit.gates.push(Gate::new("Y", GateKind::Nor, Position::default()));
        circuit.gates.push(Gate::new("Z", GateKind::Not, Position::default()));
        circuit.connections.push(Connection::new("yx", "Y", "X", "out", "b"));
        circuit.connections.push(Connection::new("xy", "X", "Y", "out", "a"));
        circuit.connections.push(Connection::new("zz", "Z", "Z", "out", "a"));

        let issues = circuit.validate();
        assert!(issues.contains(&ValidationIssue::SelfLoop {
            connection: "zz".to_string(),
            gate: "Z".to_string(),
        }));
        assert!(issues.contains(&ValidationIssue::Cycle {
            gates: vec!["X".to_string(), "Y".to_string()],
        }));
        assert_eq!(circuit.find_cycles().len(), 1);

        match circuit.check() {
            Err(CircuitError::Invalid(_)) => {}
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    fn not_chain(len: usize) -> Circuit {
        let mut circuit = Circuit::new("chain");
        for i in 0..len {
            let id = format!("g{}", i);
            circuit.gates.push(Gate::new(id.clone(), GateKind::Not, Position::default()));
            let from = if i == 0 { "weather".to_string() } else { format!("g{}", i - 1) };
            circuit
                .connections
                .push(Connection::new(format!("c{}", i), from, id, "out", "a"));
        }
        // Deepest gate first so the search walks the whole chain at once
        circuit.gates.reverse();
        circuit
    }

    #[test]
    fn test_validate_deep_chain() {
        let chain = not_chain(20_000);
        assert!(chain.validate().is_empty());
        assert!(chain.check().is_ok());
    }

    #[test]
    fn test_find_cycles_long_loop() {
        let mut chain = not_chain(20_000);
        chain
            .connections
            .push(Connection::new("back", "g19999", "g0", "out", "a"));

        let cycles = chain.find_cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 20_000);
        assert_eq!(cycles[0][0], "g19999");
        assert_eq!(cycles[0][19_999], "g0");
    }

    #[test]
    fn test_json_roundtrip_keeps_wire_names() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("\"fromPort\""));
        assert!(json.contains("\"type\":\"AND\""));

        let parsed = Circuit::from_json(&json).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_ron_roundtrip() {
        let ron = sample().to_ron().unwrap();
        let parsed = Circuit::from_ron(&ron).unwrap();
        assert_eq!(parsed.name, "alarm");
        assert_eq!(parsed.gates.len(), 2);
        assert_eq!(parsed.connections[1].from, Source::External);
    }

    #[test]
    fn test_from_json_rejects_bad_shape() {
        assert!(Circuit::from_json(r#"{"name": "x", "gates": 3}"#).is_err());
    }
}
