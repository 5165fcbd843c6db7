//! Step-by-step simulation driver.
//!
//! The UI calls `step` from a timer (or on a button press). Each step is one
//! evaluation pass; the driver only counts steps and summarizes activity.

use crate::engine::CircuitEngine;
use crate::gate::{Gate, GateId};
use serde::Serialize;

/// Result of a single simulation step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationStep {
    pub step: u64,
    pub external_input: bool,
    pub gates: Vec<Gate>,
    /// Ids of gates whose output is true after this step
    pub active: Vec<GateId>,
}

/// Activity summary for the status panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationStats {
    pub step_count: u64,
    pub active_gates: usize,
    pub total_gates: usize,
    /// Rounded percentage of gates with a true output
    pub efficiency: u32,
}

/// Drives an engine one evaluation pass at a time.
#[derive(Debug, Default)]
pub struct Simulation {
    engine: CircuitEngine,
    step_count: u64,
}

impl Simulation {
    pub fn new(engine: CircuitEngine) -> Self {
        Self {
            engine,
            step_count: 0,
        }
    }

    pub fn engine(&self) -> &CircuitEngine {
        &self.engine
    }

    /// Mutable access for edits between steps.
    pub fn engine_mut(&mut self) -> &mut CircuitEngine {
        &mut self.engine
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Run one evaluation pass.
    pub fn step(&mut self, external_input: bool) -> SimulationStep {
        let gates = self.engine.evaluate(external_input);
        self.step_count += 1;

        let active = gates
            .iter()
            .filter(|g| g.output())
            .map(|g| g.id.clone())
            .collect();

        SimulationStep {
            step: self.step_count,
            external_input,
            gates,
            active,
        }
    }

    /// Zero the step counter and put every gate back in factory state.
    pub fn reset(&mut self) {
        self.step_count = 0;
        self.engine.reset();
    }

    pub fn stats(&self) -> SimulationStats {
        let gates = self.engine.gates();
        let total_gates = gates.len();
        let active_gates = gates.iter().filter(|g| g.output()).count();
        let efficiency = if total_gates > 0 {
            ((active_gates as f64 / total_gates as f64) * 100.0).round() as u32
        } else {
            0
        };

        SimulationStats {
            step_count: self.step_count,
            active_gates,
            total_gates,
            efficiency,
        }
    }

    pub fn into_engine(self) -> CircuitEngine {
        self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates;

    fn alarm() -> Simulation {
        Simulation::new(templates::find("weather-alarm").unwrap().circuit.into_engine())
    }

    #[test]
    fn test_step_counts_and_reports_active() {
        let mut sim = alarm();

        let step = sim.step(true);
        assert_eq!(step.step, 1);
        assert_eq!(step.active, vec!["and".to_string()]);

        let step = sim.step(false);
        assert_eq!(step.step, 2);
        assert_eq!(step.active, vec!["not".to_string()]);
        assert_eq!(sim.step_count(), 2);
    }

    #[test]
    fn test_stats() {
        let mut sim = Simulation::new(CircuitEngine::new());
        assert_eq!(sim.stats().efficiency, 0);

        sim = alarm();
        sim.step(true);
        let stats = sim.stats();
        assert_eq!(stats.active_gates, 1);
        assert_eq!(stats.total_gates, 2);
        assert_eq!(stats.efficiency, 50);
        assert_eq!(stats.step_count, 1);
    }

    #[test]
    fn test_reset() {
        let mut sim = alarm();
        sim.step(true);
        sim.reset();

        assert_eq!(sim.step_count(), 0);
        assert_eq!(sim.stats().active_gates, 0);
        assert_eq!(sim.engine().gate("and").unwrap().input("a"), Some(false));
    }

    #[test]
    fn test_feedback_circuit_changes_between_steps() {
        let mut sim = Simulation::new(CircuitEngine::new());
        let engine = sim.engine_mut();
        engine.add_gate(crate::Gate::new("osc", crate::GateKind::Not, Default::default()));
        engine.add_connection(crate::Connection::new("loop", "osc", "osc", "out", "a"));

        let outputs: Vec<bool> = (0..4).map(|_| sim.step(false).active.len() == 1).collect();
        assert_eq!(outputs, vec![true, false, true, false]);
    }
}
