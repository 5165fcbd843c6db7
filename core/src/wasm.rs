//! Browser bindings.
//!
//! Gates and connections cross the boundary as plain JS objects with the
//! same field names as the JSON form (`type`, `fromPort`, `toPort`, ...).

use crate::{
    create_connection, create_gate, templates, Circuit, CircuitEngine, Connection, Gate,
    GateKind, Position,
};
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    // Plain objects rather than JS Maps for the input port map
    Ok(value.serialize(&Serializer::json_compatible())?)
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
#[derive(Default)]
pub struct WasmCircuitEngine {
    engine: CircuitEngine,
}

#[wasm_bindgen]
impl WasmCircuitEngine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a built-in template under fresh ids.
    #[wasm_bindgen(js_name = fromTemplate)]
    pub fn from_template(id: &str) -> Result<WasmCircuitEngine, JsValue> {
        let template =
            templates::find(id).ok_or_else(|| js_error(format!("Unknown template: {}", id)))?;
        Ok(Self {
            engine: template.instantiate(),
        })
    }

    /// Load a circuit from its JSON form.
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<WasmCircuitEngine, JsValue> {
        let circuit = Circuit::from_json(json).map_err(js_error)?;
        Ok(Self {
            engine: circuit.into_engine(),
        })
    }

    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self, name: &str) -> Result<String, JsValue> {
        Circuit::from_engine(name, &self.engine).to_json().map_err(js_error)
    }

    #[wasm_bindgen(js_name = addGate)]
    pub fn add_gate(&mut self, gate: JsValue) -> Result<(), JsValue> {
        let gate: Gate = serde_wasm_bindgen::from_value(gate)?;
        self.engine.add_gate(gate);
        Ok(())
    }

    /// Create a gate with the factory, add it and return it.
    #[wasm_bindgen(js_name = createGate)]
    pub fn create_gate(&mut self, kind: &str, x: f64, y: f64) -> Result<JsValue, JsValue> {
        let kind: GateKind = kind.parse().map_err(js_error)?;
        let gate = create_gate(kind, Position::new(x, y));
        let value = to_js(&gate)?;
        self.engine.add_gate(gate);
        Ok(value)
    }

    #[wasm_bindgen(js_name = removeGate)]
    pub fn remove_gate(&mut self, gate_id: &str) {
        self.engine.remove_gate(gate_id);
    }

    #[wasm_bindgen(js_name = moveGate)]
    pub fn move_gate(&mut self, gate_id: &str, x: f64, y: f64) -> bool {
        self.engine.update_gate_position(gate_id, Position::new(x, y))
    }

    #[wasm_bindgen(js_name = addConnection)]
    pub fn add_connection(&mut self, connection: JsValue) -> Result<(), JsValue> {
        let connection: Connection = serde_wasm_bindgen::from_value(connection)?;
        self.engine.add_connection(connection);
        Ok(())
    }

    /// Create a connection with a fresh id, add it and return it.
    pub fn connect(
        &mut self,
        from: &str,
        to: &str,
        from_port: &str,
        to_port: &str,
    ) -> Result<JsValue, JsValue> {
        let connection = create_connection(from, to, from_port, to_port);
        let value = to_js(&connection)?;
        self.engine.add_connection(connection);
        Ok(value)
    }

    #[wasm_bindgen(js_name = removeConnection)]
    pub fn remove_connection(&mut self, connection_id: &str) {
        self.engine.remove_connection(connection_id);
    }

    pub fn clear(&mut self) {
        self.engine.clear();
    }

    /// Evaluate against the external input; returns the refreshed gates.
    pub fn evaluate(&mut self, external_input: bool) -> Result<JsValue, JsValue> {
        let gates = self.engine.evaluate(external_input);
        to_js(&gates)
    }

    pub fn gates(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.gates())
    }

    pub fn connections(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.connections())
    }

    /// Validation issues for the current circuit (empty when clean).
    pub fn validate(&self) -> Result<JsValue, JsValue> {
        to_js(&Circuit::from_engine("", &self.engine).validate())
    }
}

/// Built-in templates with their circuits.
#[wasm_bindgen(js_name = listTemplates)]
pub fn list_templates() -> Result<JsValue, JsValue> {
    to_js(&templates::all())
}
