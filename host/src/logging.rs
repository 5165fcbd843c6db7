//! Structured operation logging.
//!
//! Every host operation produces one JSON log entry:
//! - Unique request ID (UUIDv7) and timestamp
//! - Circuit size and activity after evaluation
//! - Processing time
//! - Final outcome

use chrono::Utc;
use circuit_core::{Connection, Gate};
use serde::Serialize;
use std::io::Write;
use std::time::Instant;
use uuid::{timestamp::Timestamp, NoContext, Uuid};

/// Circuit shape at the time of logging.
#[derive(Debug, Default, Serialize)]
struct CircuitDetails {
    gate_count: usize,
    connection_count: usize,
    active_gates: usize,
    external_input: Option<bool>,
}

/// Complete log entry for one host operation.
#[derive(Debug, Serialize)]
pub struct CircuitLog {
    pub request_id: String,
    pub timestamp: String,
    pub operation: String,
    pub processing_time_ms: u64,
    circuit: CircuitDetails,
    pub circuit_id: Option<u64>,
    pub outcome: String,
    #[serde(skip)]
    start_time: Instant,
}

impl CircuitLog {
    /// Creates a new log entry for an operation.
    pub fn new(operation: &str, start_time: Instant) -> Self {
        let now = Utc::now();
        let ts = Timestamp::from_unix(
            &NoContext,
            now.timestamp() as u64,
            now.timestamp_subsec_nanos(),
        );
        let uuid = Uuid::new_v7(ts);

        CircuitLog {
            request_id: uuid.to_string(),
            timestamp: now.to_rfc3339(),
            operation: operation.to_string(),
            processing_time_ms: 0,
            circuit: CircuitDetails::default(),
            circuit_id: None,
            outcome: "initializing".to_string(),
            start_time,
        }
    }

    /// Records the circuit a result was computed over.
    pub fn add_circuit(&mut self, gates: &[Gate], connections: &[Connection]) {
        self.circuit.gate_count = gates.len();
        self.circuit.connection_count = connections.len();
        self.circuit.active_gates = gates.iter().filter(|g| g.output()).count();
    }

    pub fn set_external_input(&mut self, value: bool) {
        self.circuit.external_input = Some(value);
    }

    pub fn set_outcome(&mut self, outcome: &str) {
        self.outcome = outcome.to_string();
    }

    /// Computes the final processing time. Call just before writing.
    pub fn finalize(&mut self) {
        self.processing_time_ms = self.start_time.elapsed().as_millis() as u64;
    }

    /// Finalizes the entry and writes it as one JSON line.
    pub fn write_to(mut self, endpoint: &mut dyn Write) -> std::io::Result<()> {
        self.finalize();
        let line = serde_json::to_string(&self)?;
        writeln!(endpoint, "{}", line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use circuit_core::{CircuitEngine, GateKind, Position};

    #[test]
    fn test_log_line() {
        let mut log = CircuitLog::new("process", Instant::now());
        let mut engine = CircuitEngine::new();
        engine.add_gate(Gate::new("g1", GateKind::Not, Position::default()));
        let gates = engine.evaluate(false);
        log.add_circuit(&gates, &engine.connections());
        log.set_external_input(false);
        log.set_outcome("processed");

        let mut out = Vec::new();
        log.write_to(&mut out).unwrap();
        let line = String::from_utf8(out).unwrap();
        assert!(line.ends_with('\n'));

        let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(value["operation"], "process");
        assert_eq!(value["outcome"], "processed");
        assert_eq!(value["circuit"]["gate_count"], 1);
        assert_eq!(value["circuit"]["active_gates"], 1);
        assert_eq!(value["circuit"]["external_input"], false);
        assert!(value.get("start_time").is_none());

        let id = Uuid::parse_str(value["request_id"].as_str().unwrap()).unwrap();
        assert_eq!(id.get_version_num(), 7);
    }
}
