//! JSON export of the assembled model.
//!
//! The document is the serde form of [`Model`]: parts in order, each with
//! its shells, atlas rectangles, UV quads, materials and translation.

use crate::error::Result;
use crate::mesher::Model;

/// Serialize a model to pretty-printed JSON.
pub fn export_json(model: &Model) -> Result<String> {
    Ok(serde_json::to_string_pretty(model)?)
}

/// Read a model back from [`export_json`] output.
pub fn import_json(data: &str) -> Result<Model> {
    Ok(serde_json::from_str(data)?)
}
