//! WASM bindings for skin-mesher.
//!
//! This module provides JavaScript-friendly APIs for use in the browser.

use crate::{export_glb, export_json, MesherConfig, SkinLayout, SkinMesher};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the browser console
    console_error_panic_hook::set_once();
}

/// Mesher configuration options.
#[wasm_bindgen]
pub struct MesherOptions {
    slim: bool,
    include_overlay: bool,
    overlay_inflation: f32,
}

#[wasm_bindgen]
impl MesherOptions {
    #[wasm_bindgen(constructor)]
    pub fn new() -> MesherOptions {
        MesherOptions::default()
    }

    #[wasm_bindgen(setter)]
    pub fn set_slim(&mut self, value: bool) {
        self.slim = value;
    }

    #[wasm_bindgen(setter)]
    pub fn set_include_overlay(&mut self, value: bool) {
        self.include_overlay = value;
    }

    #[wasm_bindgen(setter)]
    pub fn set_overlay_inflation(&mut self, value: f32) {
        self.overlay_inflation = value;
    }
}

impl Default for MesherOptions {
    fn default() -> Self {
        let config = MesherConfig::default();
        Self {
            slim: false,
            include_overlay: config.include_overlay,
            overlay_inflation: config.overlay_inflation,
        }
    }
}

/// A stateful skin mesher. Starts empty; every successful `load` replaces
/// the current model, a failed one keeps it.
#[wasm_bindgen]
pub struct SkinMesherHandle {
    inner: SkinMesher,
}

#[wasm_bindgen]
impl SkinMesherHandle {
    /// Fails if the options hold a non-positive overlay inflation.
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<MesherOptions>) -> Result<SkinMesherHandle, JsError> {
        let options = options.unwrap_or_default();
        let layout = if options.slim {
            SkinLayout::slim()
        } else {
            SkinLayout::classic()
        };
        let config = MesherConfig::default()
            .with_overlay(options.include_overlay)
            .with_inflation(options.overlay_inflation);
        config.validate().map_err(|e| JsError::new(&e.to_string()))?;

        Ok(SkinMesherHandle {
            inner: SkinMesher::with_config(layout, config),
        })
    }

    /// Decode a skin PNG and assemble its model. Returns the part count.
    pub fn load(&mut self, data: &[u8]) -> Result<usize, JsError> {
        let model = self
            .inner
            .assemble_bytes(data)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(model.len())
    }

    /// Whether a model has been assembled.
    #[wasm_bindgen(getter)]
    pub fn is_populated(&self) -> bool {
        self.inner.is_populated()
    }

    /// Export the current model as GLB.
    pub fn glb(&self) -> Result<js_sys::Uint8Array, JsError> {
        let (model, atlas) = self.loaded()?;
        let glb = export_glb(model, atlas).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(js_sys::Uint8Array::from(glb.as_slice()))
    }

    /// The current model's part and UV descriptors as JSON.
    pub fn model_json(&self) -> Result<String, JsError> {
        let (model, _) = self.loaded()?;
        export_json(model).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Return to the empty state.
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

impl SkinMesherHandle {
    fn loaded(&self) -> Result<(&crate::Model, &crate::SkinAtlas), JsError> {
        match (self.inner.model(), self.inner.atlas()) {
            (Some(model), Some(atlas)) => Ok((model, atlas)),
            _ => Err(JsError::new("No skin loaded")),
        }
    }
}
