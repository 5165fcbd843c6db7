//! Command line driver for the circuit host.
//!
//! Usage: `circuit-host <circuit> <input> [config.json]`
//!
//! - `circuit` is a JSON file, a `.ron` file or a packed circuit string file
//! - `input` is `true` / `false`, or a temperature compared against the
//!   configured threshold
//!
//! The processed circuit is printed as JSON. One structured log line per
//! operation goes to the configured log endpoint (`-` for stdout).

use circuit_core::Circuit;
use circuit_host::{
    unpack_circuit, Broadcaster, CircuitService, FixedInput, HostConfig, HostError, MemStorage,
    WeatherReading,
};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), HostError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let [circuit_path, input, rest @ ..] = args.as_slice() else {
        return Err(HostError::Usage(
            "usage: circuit-host <circuit> <input> [config.json]".to_string(),
        ));
    };

    let config = match rest.first() {
        Some(path) => HostConfig::from_json(&fs::read_to_string(path)?)?,
        None => HostConfig::default(),
    };
    println!(
        "Threshold {}°C, logging to {}",
        config.temperature_threshold, config.log_endpoint
    );

    let circuit = load_circuit(circuit_path)?;
    for issue in circuit.validate() {
        println!("Warning: {}", issue);
    }

    let logger = open_log_endpoint(&config.log_endpoint)?;
    let publisher = Broadcaster::new(config.broadcast_capacity);
    let mut service = CircuitService::new(config, MemStorage::new(), publisher, logger);

    let record = service.save_circuit(circuit)?;

    let processed = match input.parse::<bool>() {
        Ok(value) => service.process_saved(record.id, &FixedInput(value))?,
        Err(_) => {
            let temperature: f64 = input.parse().map_err(|_| {
                HostError::Usage(format!(
                    "input must be a boolean or a temperature: {}",
                    input
                ))
            })?;
            let location = service.config().location.clone();
            service.record_weather(WeatherReading {
                temperature,
                condition: "Unknown".to_string(),
                location,
            });
            let source = service.latest_input();
            service.process_saved(record.id, &source)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&processed)?);
    Ok(())
}

/// Reads a circuit in whichever form the file holds.
fn load_circuit(path: &str) -> Result<Circuit, HostError> {
    let contents = fs::read_to_string(path)?;
    let circuit = if path.ends_with(".ron") {
        Circuit::from_ron(&contents)?
    } else if contents.trim_start().starts_with('{') {
        Circuit::from_json(&contents)?
    } else {
        unpack_circuit(&contents)?
    };
    println!(
        "Loaded circuit '{}': {} gates, {} connections",
        circuit.name,
        circuit.gates.len(),
        circuit.connections.len()
    );
    Ok(circuit)
}

fn open_log_endpoint(endpoint: &str) -> Result<Box<dyn Write>, HostError> {
    if endpoint == "-" {
        return Ok(Box::new(std::io::stdout()));
    }
    let file = OpenOptions::new().create(true).append(true).open(endpoint)?;
    Ok(Box::new(file))
}
