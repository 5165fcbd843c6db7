//! Built-in circuit templates.
//!
//! Every template is fully wired, with its primary inputs tied to the
//! external input, so loading one and evaluating it gives a meaningful
//! result straight away.

use crate::circuit::Circuit;
use crate::connection::{create_connection, Connection, Source};
use crate::engine::CircuitEngine;
use crate::gate::{create_gate, Gate, GateKind, Position};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    Basic,
    Advanced,
    Arithmetic,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// A named, ready-to-load circuit.
#[derive(Debug, Clone, Serialize)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: TemplateCategory,
    pub difficulty: Difficulty,
    pub circuit: Circuit,
}

impl Template {
    /// Build an engine with fresh gate and connection ids, so the same
    /// template can be loaded several times side by side.
    pub fn instantiate(&self) -> CircuitEngine {
        let mut engine = CircuitEngine::new();
        let mut renamed: HashMap<&str, String> = HashMap::new();

        for gate in &self.circuit.gates {
            let fresh = create_gate(gate.kind, gate.position);
            renamed.insert(gate.id.as_str(), fresh.id.clone());
            engine.add_gate(fresh);
        }

        for conn in &self.circuit.connections {
            let from = match &conn.from {
                Source::External => Source::External,
                Source::Gate(id) => Source::Gate(rename(&renamed, id)),
            };
            let to = rename(&renamed, &conn.to);
            engine.add_connection(create_connection(
                from,
                to,
                conn.from_port.clone(),
                conn.to_port.clone(),
            ));
        }

        engine
    }
}

fn rename(renamed: &HashMap<&str, String>, id: &str) -> String {
    renamed.get(id).cloned().unwrap_or_else(|| id.to_string())
}

/// Collects gates and wires for a template under short local ids.
struct Sketch {
    circuit: Circuit,
}

impl Sketch {
    fn new(name: &str) -> Self {
        Self { circuit: Circuit::new(name) }
    }

    fn gate(mut self, id: &str, kind: GateKind, x: f64, y: f64) -> Self {
        self.circuit.gates.push(Gate::new(id, kind, Position::new(x, y)));
        self
    }

    fn external(mut self, to: &str, port: &str) -> Self {
        let id = format!("{}-{}-in", to, port);
        self.circuit
            .connections
            .push(Connection::new(id, Source::External, to, "", port));
        self
    }

    fn wire(mut self, from: &str, to: &str, port: &str) -> Self {
        let id = format!("{}-{}-{}", from, to, port);
        self.circuit
            .connections
            .push(Connection::new(id, Source::gate(from), to, "out", port));
        self
    }

    fn finish(self) -> Circuit {
        self.circuit
    }
}

/// All built-in templates.
pub fn all() -> Vec<Template> {
    vec![
        Template {
            id: "weather-alarm",
            name: "Weather Alarm System",
            description: "Alarm triggers based on weather conditions",
            category: TemplateCategory::Basic,
            difficulty: Difficulty::Beginner,
            circuit: Sketch::new("Weather Alarm System")
                .gate("and", GateKind::And, 200.0, 150.0)
                .gate("not", GateKind::Not, 350.0, 150.0)
                .external("and", "a")
                .external("and", "b")
                .wire("and", "not", "a")
                .finish(),
        },
        Template {
            id: "half-adder",
            name: "Half Adder",
            description: "Adds two single bits with sum and carry output",
            category: TemplateCategory::Arithmetic,
            difficulty: Difficulty::Beginner,
            circuit: Sketch::new("Half Adder")
                .gate("sum", GateKind::Xor, 200.0, 100.0)
                .gate("carry", GateKind::And, 200.0, 200.0)
                .external("sum", "a")
                .external("sum", "b")
                .external("carry", "a")
                .external("carry", "b")
                .finish(),
        },
        Template {
            id: "full-adder",
            name: "Full Adder",
            description: "Adds three bits with sum and carry output",
            category: TemplateCategory::Arithmetic,
            difficulty: Difficulty::Intermediate,
            circuit: Sketch::new("Full Adder")
                .gate("xor1", GateKind::Xor, 150.0, 100.0)
                .gate("sum", GateKind::Xor, 300.0, 100.0)
                .gate("and1", GateKind::And, 150.0, 200.0)
                .gate("and2", GateKind::And, 300.0, 200.0)
                .gate("carry", GateKind::Or, 450.0, 200.0)
                .external("xor1", "a")
                .external("xor1", "b")
                .wire("xor1", "sum", "a")
                .external("sum", "b")
                .external("and1", "a")
                .external("and1", "b")
                .wire("xor1", "and2", "a")
                .external("and2", "b")
                .wire("and1", "carry", "a")
                .wire("and2", "carry", "b")
                .finish(),
        },
        Template {
            id: "decoder-2to4",
            name: "2-to-4 Decoder",
            description: "Decodes 2-bit input to 4 output lines",
            category: TemplateCategory::Advanced,
            difficulty: Difficulty::Intermediate,
            circuit: Sketch::new("2-to-4 Decoder")
                .gate("not-a", GateKind::Not, 100.0, 100.0)
                .gate("not-b", GateKind::Not, 100.0, 200.0)
                .gate("y0", GateKind::And, 250.0, 50.0)
                .gate("y1", GateKind::And, 250.0, 120.0)
                .gate("y2", GateKind::And, 250.0, 190.0)
                .gate("y3", GateKind::And, 250.0, 260.0)
                .external("not-a", "a")
                .external("not-b", "a")
                .wire("not-a", "y0", "a")
                .wire("not-b", "y0", "b")
                .wire("not-a", "y1", "a")
                .external("y1", "b")
                .external("y2", "a")
                .wire("not-b", "y2", "b")
                .external("y3", "a")
                .external("y3", "b")
                .finish(),
        },
        Template {
            id: "sr-latch",
            name: "SR Latch",
            description: "Set-Reset latch memory element",
            category: TemplateCategory::Memory,
            difficulty: Difficulty::Advanced,
            circuit: Sketch::new("SR Latch")
                .gate("q", GateKind::Nor, 200.0, 100.0)
                .gate("q-bar", GateKind::Nor, 200.0, 200.0)
                .external("q", "a")
                .wire("q-bar", "q", "b")
                .wire("q", "q-bar", "a")
                .finish(),
        },
    ]
}

/// Look up a template by id.
pub fn find(id: &str) -> Option<Template> {
    all().into_iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(gates: &[Gate], id: &str) -> bool {
        gates.iter().find(|g| g.id == id).unwrap().output()
    }

    fn evaluate(id: &str, input: bool) -> Vec<Gate> {
        let mut engine = find(id).unwrap().circuit.into_engine();
        engine.evaluate(input)
    }

    #[test]
    fn test_templates_are_fully_wired() {
        for template in all() {
            let issues: Vec<_> = template
                .circuit
                .validate()
                .into_iter()
                .filter(|i| !matches!(i, crate::ValidationIssue::Cycle { .. }))
                .collect();
            assert!(issues.is_empty(), "{}: {:?}", template.id, issues);
        }
    }

    #[test]
    fn test_weather_alarm() {
        let gates = evaluate("weather-alarm", true);
        assert!(output(&gates, "and"));
        assert!(!output(&gates, "not"));
    }

    #[test]
    fn test_half_adder_with_both_bits_set() {
        let gates = evaluate("half-adder", true);
        assert!(!output(&gates, "sum"));
        assert!(output(&gates, "carry"));
    }

    #[test]
    fn test_full_adder_with_all_bits_set() {
        // 1 + 1 + 1 = 0b11
        let gates = evaluate("full-adder", true);
        assert!(output(&gates, "sum"));
        assert!(output(&gates, "carry"));

        let gates = evaluate("full-adder", false);
        assert!(!output(&gates, "sum"));
        assert!(!output(&gates, "carry"));
    }

    #[test]
    fn test_decoder_selects_one_line() {
        let gates = evaluate("decoder-2to4", false);
        let lines: Vec<bool> = ["y0", "y1", "y2", "y3"]
            .iter()
            .map(|id| output(&gates, id))
            .collect();
        assert_eq!(lines, vec![true, false, false, false]);

        let gates = evaluate("decoder-2to4", true);
        let lines: Vec<bool> = ["y0", "y1", "y2", "y3"]
            .iter()
            .map(|id| output(&gates, id))
            .collect();
        assert_eq!(lines, vec![false, false, false, true]);
    }

    #[test]
    fn test_sr_latch_terminates() {
        let template = find("sr-latch").unwrap();
        assert_eq!(template.circuit.find_cycles().len(), 1);

        let gates = evaluate("sr-latch", true);
        assert!(!output(&gates, "q"));
        assert!(output(&gates, "q-bar"));
    }

    #[test]
    fn test_instantiate_uses_fresh_ids() {
        let template = find("weather-alarm").unwrap();
        let mut first = template.instantiate();
        let second = template.instantiate();

        let first_ids: Vec<String> = first.gates().into_iter().map(|g| g.id).collect();
        let second_ids: Vec<String> = second.gates().into_iter().map(|g| g.id).collect();
        assert_eq!(first_ids.len(), 2);
        assert!(first_ids.iter().all(|id| !second_ids.contains(id)));

        // Wiring follows the renamed gates
        let gates = first.evaluate(true);
        assert!(gates[0].output());
        assert!(!gates[1].output());
    }

    #[test]
    fn test_find_unknown_template() {
        assert!(find("jk-flip-flop").is_none());
    }
}
