//! WebAssembly bindings for the map generator.
//!
//! This module exposes map generation to a JavaScript renderer through wasm-bindgen.

use wasm_bindgen::prelude::*;

use crate::config::MapConfig;
use crate::map::ClanMap;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// WASM-exposed map wrapper
#[wasm_bindgen]
pub struct WasmMap {
    config: MapConfig,
    map: ClanMap,
}

#[wasm_bindgen]
impl WasmMap {
    /// Generate a map from a JSON config (an empty object uses all defaults)
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmMap, JsValue> {
        let config: MapConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;
        let map = ClanMap::generate(&config)
            .map_err(|e| JsValue::from_str(&format!("Generation failed: {}", e)))?;
        Ok(WasmMap { config, map })
    }

    /// Generate again with the same config and a new seed
    pub fn regenerate(&mut self, seed: u64) -> Result<(), JsValue> {
        let config = MapConfig {
            seed: Some(seed),
            ..self.config.clone()
        };
        self.map = ClanMap::generate(&config)
            .map_err(|e| JsValue::from_str(&format!("Generation failed: {}", e)))?;
        self.config = config;
        Ok(())
    }

    /// Get the full map snapshot as JSON (for rendering)
    #[wasm_bindgen(js_name = getSnapshot)]
    pub fn get_snapshot(&self) -> String {
        self.map
            .snapshot()
            .to_json()
            .unwrap_or_else(|_| "{}".to_string())
    }

    /// Number of cells in the grid
    #[wasm_bindgen(js_name = getCellCount)]
    pub fn get_cell_count(&self) -> usize {
        self.map.grid().len()
    }

    /// Number of owners the grid was split among
    #[wasm_bindgen(js_name = getOwnerCount)]
    pub fn get_owner_count(&self) -> usize {
        self.map.partition().groups.len()
    }

    /// Fraction of territories that came out in more than one piece
    #[wasm_bindgen(js_name = getDisconnectedFraction)]
    pub fn get_disconnected_fraction(&self) -> f64 {
        self.map.partition().disconnected_fraction()
    }
}
