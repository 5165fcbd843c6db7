//! In-memory persistence for circuits and weather samples.
//!
//! Ids are sequential per collection, starting at 1. Nothing survives the
//! process.

use crate::weather::{WeatherReading, WeatherRecord};
use chrono::{DateTime, Utc};
use circuit_core::{Circuit, Connection, Gate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A stored circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitRecord {
    pub id: u64,
    #[serde(flatten)]
    pub circuit: Circuit,
    pub created_at: DateTime<Utc>,
}

/// Partial update: only the fields present are replaced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CircuitUpdate {
    pub name: Option<String>,
    pub gates: Option<Vec<Gate>>,
    pub connections: Option<Vec<Connection>>,
}

pub trait Storage {
    fn get_circuit(&self, id: u64) -> Option<CircuitRecord>;
    fn create_circuit(&mut self, circuit: Circuit) -> CircuitRecord;
    fn update_circuit(&mut self, id: u64, update: CircuitUpdate) -> Option<CircuitRecord>;
    fn delete_circuit(&mut self, id: u64) -> bool;
    fn list_circuits(&self) -> Vec<CircuitRecord>;

    fn latest_weather(&self) -> Option<WeatherRecord>;
    fn create_weather(&mut self, reading: WeatherReading) -> WeatherRecord;
}

#[derive(Debug)]
pub struct MemStorage {
    circuits: BTreeMap<u64, CircuitRecord>,
    weather: BTreeMap<u64, WeatherRecord>,
    next_circuit_id: u64,
    next_weather_id: u64,
}

impl MemStorage {
    pub fn new() -> Self {
        Self {
            circuits: BTreeMap::new(),
            weather: BTreeMap::new(),
            next_circuit_id: 1,
            next_weather_id: 1,
        }
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemStorage {
    fn get_circuit(&self, id: u64) -> Option<CircuitRecord> {
        self.circuits.get(&id).cloned()
    }

    fn create_circuit(&mut self, circuit: Circuit) -> CircuitRecord {
        let id = self.next_circuit_id;
        self.next_circuit_id += 1;

        let record = CircuitRecord {
            id,
            circuit,
            created_at: Utc::now(),
        };
        self.circuits.insert(id, record.clone());
        record
    }

    fn update_circuit(&mut self, id: u64, update: CircuitUpdate) -> Option<CircuitRecord> {
        let record = self.circuits.get_mut(&id)?;

        if let Some(name) = update.name {
            record.circuit.name = name;
        }
        if let Some(gates) = update.gates {
            record.circuit.gates = gates;
        }
        if let Some(connections) = update.connections {
            record.circuit.connections = connections;
        }

        Some(record.clone())
    }

    fn delete_circuit(&mut self, id: u64) -> bool {
        self.circuits.remove(&id).is_some()
    }

    fn list_circuits(&self) -> Vec<CircuitRecord> {
        self.circuits.values().cloned().collect()
    }

    fn latest_weather(&self) -> Option<WeatherRecord> {
        // Same timestamp: the later insert wins
        self.weather
            .values()
            .max_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)))
            .cloned()
    }

    fn create_weather(&mut self, reading: WeatherReading) -> WeatherRecord {
        let id = self.next_weather_id;
        self.next_weather_id += 1;

        let record = WeatherRecord {
            id,
            reading,
            timestamp: Utc::now(),
        };
        self.weather.insert(id, record.clone());
        record
    }
}
