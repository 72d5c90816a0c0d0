pub mod document;
pub mod emitter;
pub mod graph;
pub mod hierarchy;
pub mod id;
pub mod layout;
pub mod lint;
pub mod model;
pub mod parser;
pub mod patch;

pub use document::{DocumentError, export_canvas, import_canvas};
pub use emitter::{component_fragment, destroy_fragment};
pub use graph::{ElementLookup, descendants_in_container, parent_cycles, would_create_cycle};
pub use hierarchy::{HierarchyTree, TreeKey, TreeNode, build_hierarchy};
pub use id::{ContainerId, ElementId};
pub use layout::{ElementBounds, Viewport, resolve_layout, resolve_rect};
pub use lint::{LintDiagnostic, LintSeverity, lint_canvas};
pub use model::*;
pub use patch::{
    ButtonPatch, ComponentPatch, ContainerPatch, ElementPatch, ImagePatch, RawImagePatch,
    RectTransformPatch, TextPatch,
};
pub use parser::{parse_color, parse_vec2};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
