//! WASM bindings for Pnflow Core.
//!
//! This module provides JavaScript-friendly bindings for solving network
//! descriptions in a web browser.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmTransport } from 'pnflow_core';
//!
//! await init();
//!
//! const networkDsl = `
//!   .cubic 10 10 10 100u g=1n
//!   .dirichlet left 1
//!   .dirichlet right 0
//! `;
//!
//! const alg = new WasmTransport(networkDsl);
//! alg.run();
//! const field = alg.quantity();        // Float64Array, one value per pore
//! const inflow = alg.face_rate("left");
//! const d = alg.effective_property();
//! ```

use wasm_bindgen::prelude::*;

use crate::dsl;
use crate::error::TransportError;
use crate::model::Model;
use crate::transport::RateMode;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn js_error(e: TransportError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// WASM-compatible transport solver.
///
/// Wraps a [`Model`] built from a network description string.
#[wasm_bindgen]
pub struct WasmTransport {
    model: Model,
}

#[wasm_bindgen]
impl WasmTransport {
    /// Build a transport model from a network DSL string.
    ///
    /// # Returns
    /// A new `WasmTransport` or an error if the description is invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(network_dsl: &str) -> Result<WasmTransport, JsValue> {
        let ast = dsl::parse(network_dsl).map_err(js_error)?;
        let model = Model::from_ast(ast).map_err(js_error)?;
        Ok(WasmTransport { model })
    }

    /// Assemble and solve the system.
    #[wasm_bindgen]
    pub fn run(&mut self) -> Result<(), JsValue> {
        self.model.run().map(|_| ()).map_err(js_error)
    }

    /// The solved quantity, one value per pore.
    #[wasm_bindgen]
    pub fn quantity(&self) -> Result<Vec<f64>, JsValue> {
        let results = self.model.transport().results().map_err(js_error)?;
        Ok(results.values.iter().copied().collect())
    }

    /// Name the solved quantity is stored under.
    #[wasm_bindgen(getter)]
    pub fn quantity_name(&self) -> String {
        self.model.transport().settings().quantity.clone()
    }

    /// Net rate into a set of pores.
    ///
    /// # Arguments
    /// * `pores` - Pore indices
    /// * `single` - Return one rate per pore instead of the group total
    #[wasm_bindgen]
    pub fn rate(&self, pores: &[u32], single: bool) -> Result<Vec<f64>, JsValue> {
        let pores: Vec<usize> = pores.iter().map(|&p| p as usize).collect();
        let mode = if single {
            RateMode::Single
        } else {
            RateMode::Group
        };
        self.model.transport().rate(&pores, mode).map_err(js_error)
    }

    /// Net rate into a labelled pore set (e.g. a cubic face).
    #[wasm_bindgen]
    pub fn face_rate(&self, label: &str) -> Result<f64, JsValue> {
        let transport = self.model.transport();
        let pores = transport.network().pores(label).ok_or_else(|| {
            js_error(TransportError::PoreNotFound {
                pore: label.to_string(),
            })
        })?;
        let rate = transport.rate(pores, RateMode::Group).map_err(js_error)?;
        Ok(rate.iter().sum())
    }

    /// Effective transport coefficient between the Dirichlet extremes.
    #[wasm_bindgen]
    pub fn effective_property(&self) -> Result<f64, JsValue> {
        self.model.transport().effective_property().map_err(js_error)
    }

    /// Number of pores in the network.
    #[wasm_bindgen(getter)]
    pub fn num_pores(&self) -> usize {
        use crate::network::Topology;
        self.model.transport().network().num_pores()
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
