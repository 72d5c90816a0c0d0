//! Reparenting: hierarchy drag and drop.
//!
//! Within a container a reparent is a plain rewrite of `Element.parent`.
//! Elements live in per-container lists, so moving to another container is
//! an insert into the target plus a delete from the source, both applied to
//! the same working copy and committed as one snapshot. The moved element
//! takes its whole subtree along; every moved element gets a fresh id.

use crate::outcome::{EditResult, Outcome, Rejection, Skip};
use crate::store::fresh_element_id;
use cui_core::graph::{descendants_in_container, would_create_cycle};
use cui_core::{Canvas, ContainerId, ElementId, ParentRef};
use std::collections::HashMap;

/// Where a dragged element is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReparentTarget {
    /// Become a child of this element.
    Element(ElementId),
    /// Go to the root of this container.
    Container(ContainerId),
}

/// Apply a reparent to `canvas`. On success returns the element's id after
/// the move, which differs from `source` when it crossed containers.
pub(crate) fn reparent(
    canvas: &mut Canvas,
    source: ElementId,
    target: ReparentTarget,
) -> EditResult<ElementId> {
    let Some((source_ci, source_ei)) = canvas.locate(source) else {
        return Ok(Outcome::Skipped(Skip::UnknownElement(source)));
    };

    let (dest_ci, new_parent) = match target {
        ReparentTarget::Element(target_id) => {
            if target_id == source {
                return Ok(Outcome::Skipped(Skip::Unchanged));
            }
            let Some((target_ci, _)) = canvas.locate(target_id) else {
                return Ok(Outcome::Skipped(Skip::UnknownElement(target_id)));
            };
            if would_create_cycle(canvas, source, target_id) {
                return Err(Rejection::WouldCreateCycle {
                    element: source,
                    new_parent: target_id,
                });
            }
            (target_ci, ParentRef::Element(target_id))
        }
        ReparentTarget::Container(container_id) => {
            let Some(ci) = canvas.containers.iter().position(|c| c.id == container_id) else {
                return Ok(Outcome::Skipped(Skip::UnknownContainer(container_id)));
            };
            (ci, ParentRef::Root)
        }
    };

    if dest_ci == source_ci {
        let element = &mut canvas.containers[source_ci].elements[source_ei];
        if element.parent == new_parent {
            return Ok(Outcome::Skipped(Skip::Unchanged));
        }
        element.parent = new_parent;
        return Ok(Outcome::Committed(source));
    }

    Ok(Outcome::Committed(move_subtree(
        canvas, source, source_ci, dest_ci, new_parent,
    )))
}

/// Move `source` and its in-container descendants from container
/// `source_ci` to `dest_ci` under fresh ids. References to moved elements
/// (internal parents, parents elsewhere, nested-container anchors) follow
/// the new ids.
fn move_subtree(
    canvas: &mut Canvas,
    source: ElementId,
    source_ci: usize,
    dest_ci: usize,
    new_parent: ParentRef,
) -> ElementId {
    let subtree = descendants_in_container(&canvas.containers[source_ci], source);

    let mut remap: HashMap<ElementId, ElementId> = HashMap::with_capacity(subtree.len() + 1);
    for old in std::iter::once(source).chain(subtree.iter().copied()) {
        remap.insert(old, fresh_element_id(canvas));
    }

    // Take the moved elements out, keeping their relative order.
    let source_elements = std::mem::take(&mut canvas.containers[source_ci].elements);
    let (mut moved, kept): (Vec<_>, Vec<_>) = source_elements
        .into_iter()
        .partition(|e| remap.contains_key(&e.id));
    canvas.containers[source_ci].elements = kept;

    for element in &mut moved {
        let old = element.id;
        element.id = remap[&old];
        element.parent = if old == source {
            new_parent
        } else {
            match element.parent {
                ParentRef::Element(p) => ParentRef::Element(remap.get(&p).copied().unwrap_or(p)),
                ParentRef::Root => ParentRef::Root,
            }
        };
    }
    canvas.containers[dest_ci].elements.extend(moved);

    // Outside references follow the move. Moved elements already point at
    // new ids, which are never keys of `remap`.
    for container in &mut canvas.containers {
        if let Some(new) = container.parent_id.and_then(|a| remap.get(&a)) {
            log::debug!("container {} re-anchored on {new}", container.id);
            container.parent_id = Some(*new);
        }
        for element in &mut container.elements {
            if let Some(new) = element.parent.element().and_then(|p| remap.get(&p)) {
                element.parent = ParentRef::Element(*new);
            }
        }
    }

    let new_id = remap[&source];
    log::debug!(
        "moved {source} (+{} descendants) to container {} as {new_id}",
        subtree.len(),
        canvas.containers[dest_ci].id
    );
    new_id
}
