use crate::history::DEFAULT_HISTORY_LIMIT;
use cui_core::Viewport;

/// Configuration for `CanvasStore`.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Undoable steps kept. Default: **50**.
    pub history_limit: usize,

    /// Size of containers created with `add_container`. Default: 800×600.
    pub container_size: Viewport,

    /// Size of containers created with `add_nested_container`. Default: 300×200.
    pub nested_container_size: Viewport,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            container_size: Viewport::new(800.0, 600.0),
            nested_container_size: Viewport::new(300.0, 200.0),
        }
    }
}
