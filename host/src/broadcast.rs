//! Publication channel for viewers.
//!
//! Events are fire-and-forget: publishing with nobody listening is fine, and
//! a viewer that falls too far behind skips the oldest events.

use crate::storage::CircuitRecord;
use crate::weather::WeatherReport;
use circuit_core::{Connection, Gate};
use serde::Serialize;
use tokio::sync::broadcast;

/// Result of a processing request, as returned to the caller and viewers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedCircuit {
    pub gates: Vec<Gate>,
    pub connections: Vec<Connection>,
    pub weather_input: bool,
}

/// Events pushed to every connected viewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostEvent {
    WeatherUpdate(WeatherReport),
    CircuitSaved(CircuitRecord),
    CircuitUpdated(CircuitRecord),
    CircuitProcessed(ProcessedCircuit),
}

impl HostEvent {
    pub fn name(&self) -> &'static str {
        match self {
            HostEvent::WeatherUpdate(_) => "WEATHER_UPDATE",
            HostEvent::CircuitSaved(_) => "CIRCUIT_SAVED",
            HostEvent::CircuitUpdated(_) => "CIRCUIT_UPDATED",
            HostEvent::CircuitProcessed(_) => "CIRCUIT_PROCESSED",
        }
    }

    /// Wire form sent to viewers.
    pub fn to_message(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

pub trait Publisher {
    fn publish(&self, event: &HostEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPublisher;

impl Publisher for NullPublisher {
    fn publish(&self, _event: &HostEvent) {}
}

/// Fans serialized events out to every subscriber.
pub struct Broadcaster {
    tx: broadcast::Sender<String>,
}

impl Broadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Create a new subscriber
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Publisher for Broadcaster {
    fn publish(&self, event: &HostEvent) {
        match event.to_message() {
            Ok(message) => {
                // Err only means nobody is listening
                let delivered = self.tx.send(message).unwrap_or(0);
                println!("Broadcast {} to {} viewer(s)", event.name(), delivered);
            }
            Err(e) => println!("Failed to serialize {}: {}", event.name(), e),
        }
    }
}
