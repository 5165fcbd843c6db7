//! Host operations behind the builder's request endpoints.
//!
//! Each operation:
//! 1. Validates the request shape
//! 2. Calls storage or the evaluation engine
//! 3. Publishes the result to viewers
//! 4. Writes one structured log entry

use crate::broadcast::{HostEvent, ProcessedCircuit, Publisher};
use crate::config::HostConfig;
use crate::error::HostError;
use crate::logging::CircuitLog;
use crate::storage::{CircuitRecord, CircuitUpdate, Storage};
use crate::weather::{InputSource, ReadingInput, WeatherReading, WeatherReport};
use circuit_core::{Circuit, Connection, Gate};
use std::io::Write;
use std::time::Instant;

pub struct CircuitService<S: Storage, P: Publisher> {
    config: HostConfig,
    storage: S,
    publisher: P,
    logger: Box<dyn Write>,
}

impl<S: Storage, P: Publisher> CircuitService<S, P> {
    pub fn new(config: HostConfig, storage: S, publisher: P, logger: Box<dyn Write>) -> Self {
        Self {
            config,
            storage,
            publisher,
            logger,
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Stores a new circuit and tells viewers about it.
    pub fn save_circuit(&mut self, circuit: Circuit) -> Result<CircuitRecord, HostError> {
        let mut log_entry = CircuitLog::new("save_circuit", Instant::now());

        if circuit.name.trim().is_empty() {
            log_entry.set_outcome("rejected");
            self.write_log(log_entry);
            return Err(HostError::InvalidCircuit("name must not be empty".to_string()));
        }

        let record = self.storage.create_circuit(circuit);
        println!("Saved circuit {} ({})", record.id, record.circuit.name);
        self.publisher.publish(&HostEvent::CircuitSaved(record.clone()));

        log_entry.circuit_id = Some(record.id);
        log_entry.add_circuit(&record.circuit.gates, &record.circuit.connections);
        log_entry.set_outcome("saved");
        self.write_log(log_entry);

        Ok(record)
    }

    pub fn get_circuit(&self, id: u64) -> Result<CircuitRecord, HostError> {
        self.storage
            .get_circuit(id)
            .ok_or(HostError::CircuitNotFound(id))
    }

    /// Applies a partial update and tells viewers about it.
    pub fn update_circuit(
        &mut self,
        id: u64,
        update: CircuitUpdate,
    ) -> Result<CircuitRecord, HostError> {
        let mut log_entry = CircuitLog::new("update_circuit", Instant::now());
        log_entry.circuit_id = Some(id);

        if matches!(&update.name, Some(name) if name.trim().is_empty()) {
            log_entry.set_outcome("rejected");
            self.write_log(log_entry);
            return Err(HostError::InvalidCircuit("name must not be empty".to_string()));
        }

        let Some(record) = self.storage.update_circuit(id, update) else {
            log_entry.set_outcome("not_found");
            self.write_log(log_entry);
            return Err(HostError::CircuitNotFound(id));
        };

        self.publisher.publish(&HostEvent::CircuitUpdated(record.clone()));

        log_entry.add_circuit(&record.circuit.gates, &record.circuit.connections);
        log_entry.set_outcome("updated");
        self.write_log(log_entry);

        Ok(record)
    }

    pub fn delete_circuit(&mut self, id: u64) -> bool {
        let mut log_entry = CircuitLog::new("delete_circuit", Instant::now());
        log_entry.circuit_id = Some(id);

        let deleted = self.storage.delete_circuit(id);
        log_entry.set_outcome(if deleted { "deleted" } else { "not_found" });
        self.write_log(log_entry);

        deleted
    }

    /// Evaluates a circuit sent by a client against the external input.
    pub fn process(
        &mut self,
        gates: Vec<Gate>,
        connections: Vec<Connection>,
        external_input: bool,
    ) -> ProcessedCircuit {
        let mut log_entry = CircuitLog::new("process", Instant::now());

        let circuit = Circuit {
            name: String::new(),
            gates,
            connections,
        };
        let connections = circuit.connections.clone();
        let mut engine = circuit.into_engine();
        let gates = engine.evaluate(external_input);

        let processed = ProcessedCircuit {
            gates,
            connections,
            weather_input: external_input,
        };
        self.publisher
            .publish(&HostEvent::CircuitProcessed(processed.clone()));

        log_entry.add_circuit(&processed.gates, &processed.connections);
        log_entry.set_external_input(external_input);
        log_entry.set_outcome("processed");
        self.write_log(log_entry);

        processed
    }

    /// Evaluates a stored circuit with the input from `source`.
    pub fn process_saved(
        &mut self,
        id: u64,
        source: &dyn InputSource,
    ) -> Result<ProcessedCircuit, HostError> {
        let mut log_entry = CircuitLog::new("process_saved", Instant::now());
        log_entry.circuit_id = Some(id);

        let record = match self.get_circuit(id) {
            Ok(record) => record,
            Err(e) => {
                log_entry.set_outcome("not_found");
                self.write_log(log_entry);
                return Err(e);
            }
        };
        let input = match self.current_input(source) {
            Ok(input) => input,
            Err(e) => {
                println!("Input source failed: {}", e);
                log_entry.add_circuit(&record.circuit.gates, &record.circuit.connections);
                log_entry.set_outcome("input_error");
                self.write_log(log_entry);
                return Err(e);
            }
        };
        Ok(self.process(record.circuit.gates, record.circuit.connections, input))
    }

    /// Stores a weather sample and tells viewers the new logic state.
    pub fn record_weather(&mut self, reading: WeatherReading) -> WeatherReport {
        let mut log_entry = CircuitLog::new("record_weather", Instant::now());

        let record = self.storage.create_weather(reading);
        let report = record.reading.report(self.config.temperature_threshold);
        println!(
            "Weather {}: {}°C {} -> {}",
            record.id, report.reading.temperature, report.reading.condition, report.logic_state
        );
        self.publisher.publish(&HostEvent::WeatherUpdate(report.clone()));

        log_entry.set_external_input(report.logic_state);
        log_entry.set_outcome("recorded");
        self.write_log(log_entry);

        report
    }

    /// Input source backed by the latest stored weather sample.
    pub fn latest_input(&self) -> ReadingInput {
        ReadingInput {
            reading: self.storage.latest_weather().map(|r| r.reading),
            threshold: self.config.temperature_threshold,
        }
    }

    pub fn current_input(&self, source: &dyn InputSource) -> Result<bool, HostError> {
        Ok(source.fetch_current_input()?)
    }

    fn write_log(&mut self, log_entry: CircuitLog) {
        if let Err(e) = log_entry.write_to(&mut self.logger) {
            println!("Failed to write log entry: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::Broadcaster;
    use crate::storage::MemStorage;
    use crate::weather::FixedInput;
    use circuit_core::templates;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Log endpoint the test can read back.
    #[derive(Clone, Default)]
    struct SharedLog(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedLog {
        fn lines(&self) -> Vec<serde_json::Value> {
            String::from_utf8(self.0.borrow().clone())
                .unwrap()
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect()
        }
    }

    fn service() -> (CircuitService<MemStorage, Broadcaster>, SharedLog) {
        let log = SharedLog::default();
        let service = CircuitService::new(
            HostConfig::default(),
            MemStorage::new(),
            Broadcaster::new(16),
            Box::new(log.clone()),
        );
        (service, log)
    }

    fn alarm() -> Circuit {
        templates::find("weather-alarm").unwrap().circuit
    }

    #[test]
    fn test_save_and_get() {
        let (mut service, log) = service();
        let mut viewer = service.publisher().subscribe();

        let record = service.save_circuit(alarm()).unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(service.get_circuit(1).unwrap(), record);
        assert!(matches!(service.get_circuit(2), Err(HostError::CircuitNotFound(2))));

        let message: serde_json::Value = serde_json::from_str(&viewer.try_recv().unwrap()).unwrap();
        assert_eq!(message["type"], "CIRCUIT_SAVED");
        assert_eq!(message["data"]["id"], 1);

        let lines = log.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["operation"], "save_circuit");
        assert_eq!(lines[0]["circuit_id"], 1);
        assert_eq!(lines[0]["circuit"]["gate_count"], 2);
    }

    #[test]
    fn test_save_rejects_empty_name() {
        let (mut service, log) = service();
        let result = service.save_circuit(Circuit::new("  "));
        assert!(matches!(result, Err(HostError::InvalidCircuit(_))));
        assert!(service.storage().list_circuits().is_empty());
        assert_eq!(log.lines()[0]["outcome"], "rejected");
    }

    #[test]
    fn test_update_and_delete() {
        let (mut service, _log) = service();
        service.save_circuit(alarm()).unwrap();
        let mut viewer = service.publisher().subscribe();

        let updated = service
            .update_circuit(
                1,
                CircuitUpdate {
                    name: Some("renamed".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.circuit.name, "renamed");
        assert_eq!(updated.circuit.gates.len(), 2);
        assert!(viewer.try_recv().unwrap().contains("CIRCUIT_UPDATED"));

        assert!(matches!(
            service.update_circuit(7, CircuitUpdate::default()),
            Err(HostError::CircuitNotFound(7))
        ));

        assert!(service.delete_circuit(1));
        assert!(!service.delete_circuit(1));
    }

    #[test]
    fn test_process_publishes_result() {
        let (mut service, log) = service();
        let mut viewer = service.publisher().subscribe();
        let circuit = alarm();

        let processed = service.process(circuit.gates, circuit.connections, true);
        assert!(processed.weather_input);
        assert_eq!(processed.connections.len(), 3);
        let and = processed.gates.iter().find(|g| g.id == "and").unwrap();
        assert!(and.output());
        assert_eq!(and.input("b"), Some(true));

        let message: serde_json::Value = serde_json::from_str(&viewer.try_recv().unwrap()).unwrap();
        assert_eq!(message["type"], "CIRCUIT_PROCESSED");
        assert_eq!(message["data"]["weatherInput"], true);
        assert_eq!(message["data"]["gates"][0]["output"], true);

        let lines = log.lines();
        assert_eq!(lines[0]["circuit"]["active_gates"], 1);
        assert_eq!(lines[0]["circuit"]["external_input"], true);
    }

    #[test]
    fn test_weather_drives_stored_circuit() {
        let (mut service, log) = service();
        service.save_circuit(alarm()).unwrap();

        // No sample yet
        let source = service.latest_input();
        assert!(matches!(
            service.process_saved(1, &source),
            Err(HostError::Input(_))
        ));
        let failed = log.lines().pop().unwrap();
        assert_eq!(failed["operation"], "process_saved");
        assert_eq!(failed["outcome"], "input_error");
        assert_eq!(failed["circuit_id"], 1);

        let report = service.record_weather(WeatherReading {
            temperature: 31.0,
            condition: "Clear".to_string(),
            location: "Default Location".to_string(),
        });
        assert!(report.logic_state);

        let source = service.latest_input();
        let processed = service.process_saved(1, &source).unwrap();
        assert!(processed.weather_input);
        let not = processed.gates.iter().find(|g| g.id == "not").unwrap();
        assert!(!not.output());

        let processed = service.process_saved(1, &FixedInput(false)).unwrap();
        assert!(!processed.weather_input);
        assert!(matches!(
            service.process_saved(9, &FixedInput(true)),
            Err(HostError::CircuitNotFound(9))
        ));
        let missing = log.lines().pop().unwrap();
        assert_eq!(missing["operation"], "process_saved");
        assert_eq!(missing["outcome"], "not_found");
        assert_eq!(missing["circuit_id"], 9);
    }
}
