//! Circuit evaluation engine.
//!
//! The engine owns the gate set and the ordered connection list, and computes
//! every gate's output from its wired inputs plus one external boolean input.
//!
//! Evaluation resolves gates in dependency order. Each gate is resolved at
//! most once per pass; a gate reached again while its own resolution is
//! still in progress (a feedback loop) yields the output it held before the
//! pass started. This terminates on any topology but does not iterate
//! feedback circuits to a fixed point.

use crate::connection::{Connection, Source};
use crate::gate::{Gate, InputMap, Position};
use std::collections::HashMap;

/// Owns the circuit and evaluates it.
///
/// Not internally synchronized: hosts that mutate from several threads must
/// serialize access themselves.
#[derive(Debug, Clone, Default)]
pub struct CircuitEngine {
    /// Gates in insertion order
    gates: Vec<Gate>,
    /// Connections in insertion order (order decides duplicate-port ties)
    connections: Vec<Connection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Resolved,
}

/// One gate on the resolution stack, with the position of the next incoming
/// connection to read.
#[derive(Debug, Clone, Copy)]
struct Frame {
    gate: usize,
    next: usize,
}

/// Scratch state for a single evaluation pass.
struct Pass<'a> {
    external_input: bool,
    index: HashMap<&'a str, usize>,
    incoming: Vec<Vec<&'a Connection>>,
    marks: Vec<Mark>,
    inputs: Vec<InputMap>,
    outputs: Vec<bool>,
}

impl CircuitEngine {
    /// Create a new empty engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a gate, replacing any gate with the same id in place.
    pub fn add_gate(&mut self, gate: Gate) {
        match self.gates.iter_mut().find(|g| g.id == gate.id) {
            Some(existing) => *existing = gate,
            None => self.gates.push(gate),
        }
    }

    /// Remove a gate and every connection touching it.
    pub fn remove_gate(&mut self, gate_id: &str) {
        self.gates.retain(|g| g.id != gate_id);
        self.connections.retain(|c| !c.touches(gate_id));
    }

    /// Append a connection. Endpoints are not checked.
    pub fn add_connection(&mut self, connection: Connection) {
        self.connections.push(connection);
    }

    /// Remove the connection with this id, if any.
    pub fn remove_connection(&mut self, connection_id: &str) {
        if let Some(pos) = self.connections.iter().position(|c| c.id == connection_id) {
            self.connections.remove(pos);
        }
    }

    /// Remove every gate and connection.
    pub fn clear(&mut self) {
        self.gates.clear();
        self.connections.clear();
    }

    /// Move a gate on the canvas. Returns false if the gate does not exist.
    pub fn update_gate_position(&mut self, gate_id: &str, position: Position) -> bool {
        match self.gates.iter_mut().find(|g| g.id == gate_id) {
            Some(gate) => {
                gate.position = position;
                true
            }
            None => false,
        }
    }

    /// Get a gate by ID
    pub fn gate(&self, gate_id: &str) -> Option<&Gate> {
        self.gates.iter().find(|g| g.id == gate_id)
    }

    /// Copies of all gates, in store order.
    pub fn gates(&self) -> Vec<Gate> {
        self.gates.clone()
    }

    /// Copies of all connections, in list order.
    pub fn connections(&self) -> Vec<Connection> {
        self.connections.clone()
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Reset every gate to factory state (zeroed default ports, output false).
    pub fn reset(&mut self) {
        self.gates.iter_mut().for_each(Gate::reset);
    }

    /// Evaluate every gate against the external input.
    ///
    /// Mutates the stored gates in place (each gate's `inputs` are rebuilt
    /// from its incoming connections and its `output` recomputed) and returns
    /// a copy of the whole gate set, so later edits to the engine do not
    /// change the returned values.
    ///
    /// Never fails: a connection from a missing gate contributes `false`, and
    /// when several connections feed the same port the last one in list
    /// order wins.
    pub fn evaluate(&mut self, external_input: bool) -> Vec<Gate> {
        let (inputs, outputs) = {
            let mut pass = Pass::new(&self.gates, &self.connections, external_input);
            for gate in 0..self.gates.len() {
                pass.resolve(gate, &self.gates);
            }
            (pass.inputs, pass.outputs)
        };

        for ((gate, inputs), output) in self.gates.iter_mut().zip(inputs).zip(outputs) {
            gate.inputs = inputs;
            gate.output = output;
        }

        self.gates.clone()
    }
}

impl<'a> Pass<'a> {
    fn new(gates: &'a [Gate], connections: &'a [Connection], external_input: bool) -> Self {
        let index: HashMap<&str, usize> = gates
            .iter()
            .enumerate()
            .map(|(i, g)| (g.id.as_str(), i))
            .collect();

        let mut incoming = vec![Vec::new(); gates.len()];
        for connection in connections {
            if let Some(&to) = index.get(connection.to.as_str()) {
                incoming[to].push(connection);
            }
        }

        Self {
            external_input,
            index,
            incoming,
            marks: vec![Mark::Unvisited; gates.len()],
            inputs: vec![InputMap::new(); gates.len()],
            // Held values from the previous pass, read on feedback re-entry
            outputs: gates.iter().map(|g| g.output).collect(),
        }
    }

    /// Resolve `root` and everything it depends on, depth first, using an
    /// explicit stack.
    fn resolve(&mut self, root: usize, gates: &[Gate]) {
        if self.marks[root] != Mark::Unvisited {
            return;
        }

        let mut stack = vec![self.enter(root)];

        while let Some(&Frame { gate, next }) = stack.last() {
            let Some(connection) = self.incoming[gate].get(next).copied() else {
                self.outputs[gate] = gates[gate].kind.apply(&self.inputs[gate]);
                self.marks[gate] = Mark::Resolved;
                stack.pop();

                // Hand the value back to the gate that was waiting on it
                if let Some(parent) = stack.last_mut() {
                    let port = &self.incoming[parent.gate][parent.next].to_port;
                    self.inputs[parent.gate].insert(port.clone(), self.outputs[gate]);
                    parent.next += 1;
                }
                continue;
            };

            let value = match &connection.from {
                Source::External => Ok(self.external_input),
                Source::Gate(id) => match self.index.get(id.as_str()) {
                    None => Ok(false),
                    Some(&source) => match self.marks[source] {
                        Mark::Unvisited => Err(source),
                        Mark::InProgress | Mark::Resolved => Ok(self.outputs[source]),
                    },
                },
            };

            match value {
                Ok(value) => {
                    self.inputs[gate].insert(connection.to_port.clone(), value);
                    if let Some(frame) = stack.last_mut() {
                        frame.next += 1;
                    }
                }
                // Source not resolved yet: descend, this frame resumes afterwards
                Err(source) => stack.push(self.enter(source)),
            }
        }
    }

    fn enter(&mut self, gate: usize) -> Frame {
        self.marks[gate] = Mark::InProgress;
        self.inputs[gate].clear();
        Frame { gate, next: 0 }
    }
}
