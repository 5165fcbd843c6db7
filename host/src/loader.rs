//! Packed circuit payloads.
//!
//! Circuits can travel as a single string (share links, config values):
//! - Packed format: base64(gzip(JSON))
//! - Fallback format: "raw:" + base64(JSON), for clients without gzip
//!
//! Both wrap the circuit in a small versioned envelope.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use circuit_core::Circuit;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Current envelope version.
pub const PACK_VERSION: &str = "1.0";

const RAW_PREFIX: &str = "raw:";

/// Packed payload envelope (matches the editor's share format).
#[derive(Debug, Serialize, Deserialize)]
struct PackedCircuit {
    /// Version string
    v: String,
    /// The circuit itself
    c: Circuit,
}

/// Errors that can occur while unpacking a circuit.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("Gzip error: {0}")]
    DecompressError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid packed circuit format")]
    InvalidFormat,
}

/// Compresses a circuit into the packed format.
pub fn pack_circuit(circuit: &Circuit) -> Result<String, LoadError> {
    let json = envelope_json(circuit)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(json.as_bytes())?;
    Ok(BASE64.encode(encoder.finish()?))
}

/// Encodes a circuit into the uncompressed fallback format.
pub fn pack_circuit_raw(circuit: &Circuit) -> Result<String, LoadError> {
    let json = envelope_json(circuit)?;
    Ok(format!("{}{}", RAW_PREFIX, BASE64.encode(json)))
}

/// Decodes either payload format back into a circuit.
pub fn unpack_circuit(packed: &str) -> Result<Circuit, LoadError> {
    let packed = packed.trim();
    if packed.is_empty() {
        return Err(LoadError::InvalidFormat);
    }

    let json = if let Some(b64) = packed.strip_prefix(RAW_PREFIX) {
        let bytes = BASE64.decode(b64)?;
        String::from_utf8(bytes)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?
    } else {
        let compressed = BASE64.decode(packed)?;
        let mut decoder = GzDecoder::new(&compressed[..]);
        let mut json = String::new();
        decoder.read_to_string(&mut json)?;
        json
    };

    let parsed: PackedCircuit = serde_json::from_str(&json)?;

    // Validate version
    if !parsed.v.starts_with("1.") {
        println!("Warning: Unknown packed circuit version: {}", parsed.v);
    }

    Ok(parsed.c)
}

fn envelope_json(circuit: &Circuit) -> Result<String, LoadError> {
    let envelope = PackedCircuit {
        v: PACK_VERSION.to_string(),
        c: circuit.clone(),
    };
    Ok(serde_json::to_string(&envelope)?)
}
