//! Canvas store: the single owner of the canonical canvas.
//!
//! Every edit clones the current snapshot, changes the clone, and commits it
//! by swapping the `Arc`. The replaced snapshot goes to history; readers
//! holding an older `Arc<Canvas>` keep a consistent view. Committing goes
//! through one private path, so "push clears redo" holds for every edit.

use crate::config::EditorConfig;
use crate::history::History;
use crate::outcome::{EditResult, Outcome, Rejection, Skip};
use crate::reparent::{self, ReparentTarget};
use cui_core::document::{DocumentError, export_canvas, import_canvas};
use cui_core::graph::{descendants_in_container, would_create_cycle};
use cui_core::hierarchy::{HierarchyTree, build_hierarchy};
use cui_core::layout::{ElementBounds, resolve_layout};
use cui_core::lint::{LintDiagnostic, lint_canvas};
use cui_core::model::*;
use cui_core::patch::{ComponentPatch, ContainerPatch, ElementPatch};
use cui_core::{ContainerId, ElementId};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Callback run after every snapshot replacement (edit, undo, redo, import).
pub type Listener = Box<dyn FnMut(&Arc<Canvas>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Everything needed to create an element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementDraft {
    pub name: String,
    pub parent: ParentRef,
    /// A RectTransform is prepended when none is given.
    pub components: SmallVec<[Component; 2]>,
    pub fade_in: Option<f32>,
    pub fade_out: Option<f32>,
    pub destroy_ui: Option<String>,
}

impl ElementDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn under(mut self, parent: ElementId) -> Self {
        self.parent = ParentRef::Element(parent);
        self
    }

    #[must_use]
    pub fn with(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    fn non_finite_field(&self) -> Option<&'static str> {
        [("fadeIn", self.fade_in), ("fadeOut", self.fade_out)]
            .into_iter()
            .find(|(_, v)| matches!(v, Some(v) if !v.is_finite()))
            .map(|(name, _)| name)
    }
}

pub struct CanvasStore {
    current: Arc<Canvas>,
    history: History<Arc<Canvas>>,
    config: EditorConfig,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Default for CanvasStore {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl CanvasStore {
    /// An empty canvas.
    pub fn new(config: EditorConfig) -> Self {
        Self::from_canvas(Canvas::new(), config)
    }

    pub fn from_canvas(canvas: Canvas, config: EditorConfig) -> Self {
        Self {
            current: Arc::new(canvas),
            history: History::new(config.history_limit),
            config,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    // ─── Reads ───────────────────────────────────────────────────────────

    /// The current snapshot. Cheap; never changes under the caller.
    pub fn snapshot(&self) -> Arc<Canvas> {
        Arc::clone(&self.current)
    }

    pub fn canvas(&self) -> &Canvas {
        &self.current
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn layout(&self) -> HashMap<ElementId, ElementBounds> {
        resolve_layout(&self.current)
    }

    pub fn hierarchy(&self) -> HierarchyTree {
        build_hierarchy(&self.current)
    }

    pub fn lint(&self) -> Vec<LintDiagnostic> {
        lint_canvas(&self.current)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─── Subscriptions ───────────────────────────────────────────────────

    pub fn subscribe(&mut self, listener: impl FnMut(&Arc<Canvas>) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener(&self.current);
        }
    }

    // ─── Commit path ─────────────────────────────────────────────────────

    /// Run `f` on a working copy and commit it if `f` says so.
    fn edit<T>(
        &mut self,
        label: &str,
        f: impl FnOnce(&mut Canvas) -> EditResult<T>,
    ) -> EditResult<T> {
        let mut next = Canvas::clone(&self.current);
        match f(&mut next) {
            Ok(Outcome::Committed(value)) => {
                self.commit(next, label);
                Ok(Outcome::Committed(value))
            }
            Ok(Outcome::Skipped(skip)) => {
                log::debug!("{label}: skipped ({skip})");
                Ok(Outcome::Skipped(skip))
            }
            Err(rejection) => {
                log::warn!("{label}: rejected: {rejection}");
                Err(rejection)
            }
        }
    }

    fn commit(&mut self, next: Canvas, label: &str) {
        let previous = std::mem::replace(&mut self.current, Arc::new(next));
        self.history.push(&previous);
        log::debug!(
            "{label}: committed ({} containers, {} elements, {} undoable)",
            self.current.containers.len(),
            self.current.element_count(),
            self.history.len()
        );
        self.notify();
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Restore the previous snapshot. Returns false when there is nothing
    /// to undo; the canvas is then unchanged.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.undo(&self.current) else {
            log::info!("undo: nothing to undo");
            return false;
        };
        self.current = previous;
        log::info!("undo ({} left)", self.history.len());
        self.notify();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.redo(&self.current) else {
            log::info!("redo: nothing to redo");
            return false;
        };
        self.current = next;
        log::info!("redo ({} left)", self.history.redo_len());
        self.notify();
        true
    }

    // ─── Documents ───────────────────────────────────────────────────────

    /// Replace the canvas with a parsed document. Undoable. On error the
    /// store is untouched.
    pub fn import_json(&mut self, text: &str) -> Result<Outcome<()>, DocumentError> {
        let canvas = import_canvas(text)?;
        if canvas == *self.current {
            return Ok(Outcome::Skipped(Skip::Unchanged));
        }
        self.commit(canvas, "import");
        Ok(Outcome::Committed(()))
    }

    pub fn export_json(&self) -> Result<String, DocumentError> {
        export_canvas(&self.current)
    }

    // ─── Containers ──────────────────────────────────────────────────────

    pub fn add_container(&mut self, name: &str) -> EditResult<ContainerId> {
        let size = self.config.container_size;
        self.edit("add container", |canvas| {
            let id = fresh_container_id(canvas);
            canvas
                .containers
                .push(Container::new(id, name, size.width, size.height));
            Ok(Outcome::Committed(id))
        })
    }

    /// A container anchored on `anchor`, placed at the anchor's on-canvas
    /// position.
    pub fn add_nested_container(&mut self, anchor: ElementId, name: &str) -> EditResult<ContainerId> {
        let size = self.config.nested_container_size;
        self.edit("add nested container", |canvas| {
            if !canvas.has_element(anchor) {
                return Ok(Outcome::Skipped(Skip::UnknownElement(anchor)));
            }
            let origin = resolve_layout(canvas)
                .get(&anchor)
                .map(|b| (b.absolute.x, b.absolute.y))
                .unwrap_or_default();
            let id = fresh_container_id(canvas);
            let mut container = Container::new(id, name, size.width, size.height);
            (container.x, container.y) = origin;
            container.parent_id = Some(anchor);
            canvas.containers.push(container);
            Ok(Outcome::Committed(id))
        })
    }

    /// Patch name and geometry. NaN or infinite geometry is rejected.
    pub fn update_container(&mut self, id: ContainerId, patch: &ContainerPatch) -> EditResult<()> {
        self.edit("update container", |canvas| {
            if let Some(field) = patch.non_finite_field() {
                return Err(Rejection::NonFinite { field });
            }
            let Some(container) = canvas.container_mut(id) else {
                return Ok(Outcome::Skipped(Skip::UnknownContainer(id)));
            };
            Ok(changed(patch.apply(container)))
        })
    }

    /// Remove a container with all its elements. Containers nested on those
    /// elements are detached and become top-level.
    pub fn remove_container(&mut self, id: ContainerId) -> EditResult<()> {
        self.edit("remove container", |canvas| {
            let Some(ci) = canvas.containers.iter().position(|c| c.id == id) else {
                return Ok(Outcome::Skipped(Skip::UnknownContainer(id)));
            };
            let removed = canvas.containers.remove(ci);
            let gone: HashSet<ElementId> = removed.elements.iter().map(|e| e.id).collect();
            release_references(canvas, &gone);
            Ok(Outcome::Committed(()))
        })
    }

    // ─── Elements ────────────────────────────────────────────────────────

    /// Create an element from a draft.
    ///
    /// The draft's parent may live in another container. That link is kept
    /// as given and reported by `lint` as `cross-container-parent`; use
    /// `reparent` to move an element between containers instead.
    pub fn add_element(&mut self, container: ContainerId, draft: ElementDraft) -> EditResult<ElementId> {
        self.edit("add element", |canvas| {
            if let Some(field) = draft.non_finite_field() {
                return Err(Rejection::NonFinite { field });
            }
            if !canvas.has_container(container) {
                return Ok(Outcome::Skipped(Skip::UnknownContainer(container)));
            }
            if let ParentRef::Element(parent) = draft.parent {
                if !canvas.has_element(parent) {
                    return Ok(Outcome::Skipped(Skip::UnknownElement(parent)));
                }
            }

            let id = fresh_element_id(canvas);
            let mut element = Element::new(id, draft.name);
            element.parent = draft.parent;
            if draft
                .components
                .iter()
                .any(|c| c.component_type() == ComponentType::RectTransform)
            {
                element.components = draft.components;
            } else {
                element.components.extend(draft.components);
            }
            element.fade_in = draft.fade_in;
            element.fade_out = draft.fade_out;
            element.destroy_ui = draft.destroy_ui;

            if let Some(c) = canvas.container_mut(container) {
                c.elements.push(element);
            }
            Ok(Outcome::Committed(id))
        })
    }

    /// Patch element properties. A parent change is cycle-checked like a
    /// reparent but never moves the element between containers: a parent
    /// in another container is accepted as a cross-container link, which
    /// `lint` reports as `cross-container-parent`. NaN or infinite fade
    /// timers are rejected.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> EditResult<()> {
        self.edit("update element", |canvas| {
            if let Some(field) = patch.non_finite_field() {
                return Err(Rejection::NonFinite { field });
            }
            if !canvas.has_element(id) {
                return Ok(Outcome::Skipped(Skip::UnknownElement(id)));
            }
            if let Some(ParentRef::Element(parent)) = patch.parent {
                if !canvas.has_element(parent) {
                    return Ok(Outcome::Skipped(Skip::UnknownElement(parent)));
                }
                if would_create_cycle(canvas, id, parent) {
                    return Err(Rejection::WouldCreateCycle {
                        element: id,
                        new_parent: parent,
                    });
                }
            }
            let Some(element) = canvas.element_mut(id) else {
                return Ok(Outcome::Skipped(Skip::UnknownElement(id)));
            };
            Ok(changed(patch.apply(element)))
        })
    }

    /// Remove an element and every transitive descendant in its container,
    /// in one step.
    pub fn remove_element(&mut self, id: ElementId) -> EditResult<usize> {
        self.edit("remove element", |canvas| {
            let Some((ci, _)) = canvas.locate(id) else {
                return Ok(Outcome::Skipped(Skip::UnknownElement(id)));
            };
            let mut gone = descendants_in_container(&canvas.containers[ci], id);
            gone.insert(id);

            let elements = &mut canvas.containers[ci].elements;
            let before = elements.len();
            elements.retain(|e| !gone.contains(&e.id));
            let removed = before - elements.len();

            release_references(canvas, &gone);
            Ok(Outcome::Committed(removed))
        })
    }

    /// Move an element under another element or to a container's root.
    /// Returns the element's id afterwards: a move into another container
    /// assigns fresh ids to the element and its subtree.
    pub fn reparent(&mut self, source: ElementId, target: ReparentTarget) -> EditResult<ElementId> {
        self.edit("reparent", |canvas| reparent::reparent(canvas, source, target))
    }

    // ─── Components ──────────────────────────────────────────────────────

    pub fn add_component(&mut self, element: ElementId, component: Component) -> EditResult<()> {
        self.edit("add component", |canvas| {
            let Some(el) = canvas.element_mut(element) else {
                return Ok(Outcome::Skipped(Skip::UnknownElement(element)));
            };
            let ty = component.component_type();
            if el.has_component(ty) {
                return Ok(Outcome::Skipped(Skip::AlreadyPresent(element, ty)));
            }
            el.components.push(component);
            Ok(Outcome::Committed(()))
        })
    }

    /// Remove every component of the given type. The RectTransform cannot
    /// be removed.
    pub fn remove_component(&mut self, element: ElementId, ty: ComponentType) -> EditResult<()> {
        if ty == ComponentType::RectTransform {
            log::warn!("remove component: rejected: `{element}` must keep its RectTransform");
            return Err(Rejection::MandatoryComponent { element });
        }
        self.edit("remove component", |canvas| {
            let Some(el) = canvas.element_mut(element) else {
                return Ok(Outcome::Skipped(Skip::UnknownElement(element)));
            };
            if !el.has_component(ty) {
                return Ok(Outcome::Skipped(Skip::MissingComponent(element, ty)));
            }
            el.components.retain(|c| c.component_type() != ty);
            Ok(Outcome::Committed(()))
        })
    }

    /// Merge a patch into the element's first component of the patch's type.
    pub fn update_component(&mut self, element: ElementId, patch: &ComponentPatch) -> EditResult<()> {
        self.edit("update component", |canvas| {
            let Some(el) = canvas.element_mut(element) else {
                return Ok(Outcome::Skipped(Skip::UnknownElement(element)));
            };
            let ty = patch.component_type();
            let Some(component) = el.component_mut(ty) else {
                return Ok(Outcome::Skipped(Skip::MissingComponent(element, ty)));
            };
            Ok(changed(patch.apply(component)))
        })
    }
}

fn changed(did_change: bool) -> Outcome<()> {
    if did_change {
        Outcome::Committed(())
    } else {
        Outcome::Skipped(Skip::Unchanged)
    }
}

/// Drop references to removed elements: nested containers anchored on them
/// are detached, elements elsewhere that hung under them move to their
/// container's root.
fn release_references(canvas: &mut Canvas, gone: &HashSet<ElementId>) {
    for container in &mut canvas.containers {
        if container.parent_id.is_some_and(|a| gone.contains(&a)) {
            log::debug!("detaching nested container {}", container.id);
            container.parent_id = None;
        }
        for element in &mut container.elements {
            if element.parent.element().is_some_and(|p| gone.contains(&p)) {
                log::debug!("re-rooting {} in {}", element.id, container.id);
                element.parent = ParentRef::Root;
            }
        }
    }
}

/// Is `id` used anywhere in the canvas, as an element or as a reference?
fn element_id_taken(canvas: &Canvas, id: ElementId) -> bool {
    canvas.containers.iter().any(|c| {
        c.parent_id == Some(id) || c.elements.iter().any(|e| e.id == id || e.parent == ParentRef::Element(id))
    })
}

/// A generated element id not already used by the canvas.
pub(crate) fn fresh_element_id(canvas: &Canvas) -> ElementId {
    loop {
        let id = ElementId::generate();
        if !element_id_taken(canvas, id) {
            return id;
        }
    }
}

fn fresh_container_id(canvas: &Canvas) -> ContainerId {
    loop {
        let id = ContainerId::generate();
        if !canvas.has_container(id) {
            return id;
        }
    }
}
