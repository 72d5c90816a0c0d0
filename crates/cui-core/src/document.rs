//! JSON document codec.
//!
//! The exchanged document mirrors the model directly:
//! `{"containers":[{"id","name","elements":[...],"x","y","width","height","parentId"?}]}`
//! with elements `{"id","name","parent","components":[{"type",...}],"fadeIn"?,"fadeOut"?,"destroyUi"?}`.
//! There is no schema validation beyond what deserialization needs; broken
//! references survive import and are reported by `lint_canvas` instead.

use crate::model::Canvas;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed canvas document: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("canvas cannot be serialized: {0}")]
    Unserializable(#[source] serde_json::Error),
}

/// Serialize a canvas as pretty-printed JSON.
///
/// # Errors
/// Only fails for values JSON cannot carry faithfully: a NaN or infinite
/// coordinate, size or fade timer would otherwise be written as `null` and
/// the document could not be imported again.
pub fn export_canvas(canvas: &Canvas) -> Result<String, DocumentError> {
    if let Some(path) = non_finite_value(canvas) {
        log::warn!("canvas export failed: {path} is not a finite number");
        return Err(DocumentError::Unserializable(serde::ser::Error::custom(
            format!("{path} is not a finite number"),
        )));
    }
    serde_json::to_string_pretty(canvas).map_err(DocumentError::Unserializable)
}

/// Location of the first number JSON cannot represent, e.g. `main.width`.
fn non_finite_value(canvas: &Canvas) -> Option<String> {
    for container in &canvas.containers {
        let geometry = [
            ("x", container.x),
            ("y", container.y),
            ("width", container.width),
            ("height", container.height),
        ];
        if let Some((field, _)) = geometry.iter().find(|(_, v)| !v.is_finite()) {
            return Some(format!("{}.{field}", container.id));
        }
        for element in &container.elements {
            let fades = [("fadeIn", element.fade_in), ("fadeOut", element.fade_out)];
            if let Some((field, _)) = fades
                .iter()
                .find(|(_, v)| matches!(v, Some(v) if !v.is_finite()))
            {
                return Some(format!("{}.{field}", element.id));
            }
        }
    }
    None
}

/// Parse a canvas document.
///
/// # Errors
/// Returns `DocumentError::Malformed` when the text is not JSON or does not
/// have the canvas shape. Nothing is partially imported.
pub fn import_canvas(text: &str) -> Result<Canvas, DocumentError> {
    let canvas: Canvas = serde_json::from_str(text).map_err(|e| {
        log::warn!("canvas import failed: {e}");
        DocumentError::Malformed(e)
    })?;
    log::debug!(
        "imported canvas: {} containers, {} elements",
        canvas.containers.len(),
        canvas.element_count()
    );
    Ok(canvas)
}
