//! Editing service for CUI canvases: validated mutations, reparenting,
//! and bounded undo/redo over immutable snapshots.

pub mod config;
pub mod history;
pub mod outcome;
pub mod reparent;
pub mod store;

pub use config::EditorConfig;
pub use history::{DEFAULT_HISTORY_LIMIT, History};
pub use outcome::{EditResult, Outcome, Rejection, Skip};
pub use reparent::ReparentTarget;
pub use store::{CanvasStore, ElementDraft, Listener, SubscriptionId};
