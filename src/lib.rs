// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Neobots Tokenomics Simulation Suite

pub mod params;
pub mod population;
pub mod ap_usage;
pub mod token_rate;
pub mod market;
pub mod utility;
pub mod ledger;
pub mod types;
pub mod summary;
pub mod simulation;

pub use params::{ApType, ApTypeConfig, ParamsError, SimulationParams};
pub use simulation::{run_simulation, SimulationError, TokenomicsSimulation};
pub use types::*;

use wasm_bindgen::prelude::*;

fn to_js_error(err: SimulationError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
impl TokenomicsSimulation {
    /// Default parameters with the given seed.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Result<TokenomicsSimulation, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        Self::with_params(SimulationParams::default(), seed).map_err(to_js_error)
    }

    /// Partial JSON parameter document over the defaults.
    pub fn from_params_json(json: &str, seed: u64) -> Result<TokenomicsSimulation, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let params = SimulationParams::from_json_str(json)
            .map_err(|e| to_js_error(SimulationError::Json(e)))?;
        Self::with_params(params, seed).map_err(to_js_error)
    }

    /// Play one round and return its record, or `null` once finished.
    pub fn step(&mut self) -> Result<JsValue, JsValue> {
        match self.step_round().map_err(to_js_error)? {
            Some(record) => Ok(serde_wasm_bindgen::to_value(record).unwrap_or(JsValue::NULL)),
            None => Ok(JsValue::NULL),
        }
    }

    /// Run to completion; returns the number of recorded rounds.
    pub fn run_to_end(&mut self) -> Result<u32, JsValue> {
        let rows = self.run().map_err(to_js_error)?.len();
        Ok(rows as u32)
    }

    pub fn records(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.records).unwrap_or(JsValue::NULL)
    }

    pub fn token_supply(&self) -> f64 {
        self.state.token_supply
    }

    /// Backing pool per circulating token right now.
    pub fn token_value(&self) -> f64 {
        market::token_value(&self.params, self.state.backing_pool, self.state.token_supply)
    }

    pub fn cumulative_hours(&self) -> f64 {
        self.state.cumulative_hours
    }

    /// Restart from round zero with the same parameters and seed.
    pub fn reset(&mut self) -> Result<(), JsValue> {
        *self = Self::with_params(self.params.clone(), self.seed).map_err(to_js_error)?;
        Ok(())
    }
}
