//! Result types shared by every `CanvasStore` edit.

use cui_core::{ComponentType, ContainerId, ElementId};
use std::fmt;
use thiserror::Error;

/// What an edit that was not rejected did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// A new snapshot was committed and pushed to history.
    Committed(T),
    /// Nothing happened: stale id, missing component, or no effective change.
    Skipped(Skip),
}

impl<T> Outcome<T> {
    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed(_))
    }

    /// The committed value, if any.
    pub fn committed(self) -> Option<T> {
        match self {
            Outcome::Committed(v) => Some(v),
            Outcome::Skipped(_) => None,
        }
    }

    pub fn skipped(&self) -> Option<Skip> {
        match self {
            Outcome::Committed(_) => None,
            Outcome::Skipped(skip) => Some(*skip),
        }
    }
}

/// Why an edit was a no-op.
///
/// UI actions can race against ids that were already removed, so a lookup
/// miss is reported here rather than as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    UnknownElement(ElementId),
    UnknownContainer(ContainerId),
    MissingComponent(ElementId, ComponentType),
    AlreadyPresent(ElementId, ComponentType),
    /// The edit would produce an identical canvas.
    Unchanged,
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::UnknownElement(id) => write!(f, "no element `{id}`"),
            Skip::UnknownContainer(id) => write!(f, "no container `{id}`"),
            Skip::MissingComponent(id, ty) => write!(f, "`{id}` has no {ty}"),
            Skip::AlreadyPresent(id, ty) => write!(f, "`{id}` already has a {ty}"),
            Skip::Unchanged => f.write_str("no change"),
        }
    }
}

/// A validation failure. The canvas is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("moving `{element}` under `{new_parent}` would make it its own ancestor")]
    WouldCreateCycle {
        element: ElementId,
        new_parent: ElementId,
    },
    #[error("`{element}` must keep its RectTransform")]
    MandatoryComponent { element: ElementId },
    /// NaN or infinity in a numeric field. JSON cannot carry it.
    #[error("`{field}` must be a finite number")]
    NonFinite { field: &'static str },
}

pub type EditResult<T> = Result<Outcome<T>, Rejection>;
