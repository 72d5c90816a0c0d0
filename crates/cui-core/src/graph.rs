//! Parent-link queries over the flat canvas arena.
//!
//! Elements never own each other: nesting lives in `Element.parent`, and
//! element ids are unique across the whole canvas. Everything here therefore
//! builds a child index once per query and walks it with a visited set, so
//! a malformed cycle already present in a document cannot hang a traversal.

use crate::id::ElementId;
use crate::model::{Canvas, Container, ParentRef};
use std::collections::{HashMap, HashSet};

// ─── Lookup ──────────────────────────────────────────────────────────────

/// Id → position index plus a parent → children index over a whole canvas.
#[derive(Debug, Default)]
pub struct ElementLookup {
    positions: HashMap<ElementId, (usize, usize)>,
    children: HashMap<ElementId, Vec<ElementId>>,
}

impl ElementLookup {
    pub fn build(canvas: &Canvas) -> Self {
        let mut lookup = Self::default();
        for (ci, container) in canvas.containers.iter().enumerate() {
            for (ei, element) in container.elements.iter().enumerate() {
                lookup.positions.entry(element.id).or_insert((ci, ei));
                if let ParentRef::Element(parent) = element.parent {
                    lookup.children.entry(parent).or_default().push(element.id);
                }
            }
        }
        lookup
    }

    /// `(container index, element index)` of an element.
    pub fn position(&self, id: ElementId) -> Option<(usize, usize)> {
        self.positions.get(&id).copied()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Direct children, in canvas order.
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every transitive descendant of `id`, excluding `id` itself.
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut visited = HashSet::from([id]);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            for &child in self.children(current) {
                if visited.insert(child) {
                    out.push(child);
                    stack.push(child);
                }
            }
        }
        out
    }

    /// Whether `needle` is a transitive descendant of `from`.
    pub fn reaches(&self, from: ElementId, needle: ElementId) -> bool {
        let mut visited = HashSet::from([from]);
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            for &child in self.children(current) {
                if child == needle {
                    return true;
                }
                if visited.insert(child) {
                    stack.push(child);
                }
            }
        }
        false
    }
}

// ─── Cycle detection ─────────────────────────────────────────────────────

/// Would making `target` the parent of `source` put `source` among its own
/// ancestors?
///
/// True when `source == target`, or when `target` already hangs somewhere
/// below `source` in the canvas. Only the subtree under `source` is walked,
/// so the cost is bounded by O(V + E).
pub fn would_create_cycle(canvas: &Canvas, source: ElementId, target: ElementId) -> bool {
    if source == target {
        return true;
    }
    ElementLookup::build(canvas).reaches(source, target)
}

/// Transitive descendants of `id` inside one container, found by repeated
/// "whose parent is X" expansion. Does not include `id`.
pub fn descendants_in_container(container: &Container, id: ElementId) -> HashSet<ElementId> {
    let mut found = HashSet::new();
    let mut frontier = vec![id];
    while let Some(current) = frontier.pop() {
        for element in &container.elements {
            if element.parent == ParentRef::Element(current)
                && element.id != id
                && found.insert(element.id)
            {
                frontier.push(element.id);
            }
        }
    }
    found
}

/// Elements that sit on a parent-reference loop (`a -> b -> a`).
///
/// Elements that merely hang below a loop are not included. Only reachable
/// through malformed documents: the editor refuses edits that would close a
/// loop.
pub fn parent_cycles(canvas: &Canvas) -> HashSet<ElementId> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        OnPath,
        Done,
    }

    let parents: HashMap<ElementId, ParentRef> = canvas
        .elements()
        .map(|(_, element)| (element.id, element.parent))
        .collect();

    let mut marks: HashMap<ElementId, Mark> = HashMap::with_capacity(parents.len());
    let mut cyclic = HashSet::new();

    for (_, element) in canvas.elements() {
        let mut path = Vec::new();
        let mut current = Some(element.id);
        while let Some(id) = current {
            match marks.get(&id) {
                Some(Mark::Done) => break,
                Some(Mark::OnPath) => {
                    // Loop closes at `id`: everything after it on the path is on the loop.
                    if let Some(start) = path.iter().position(|p| *p == id) {
                        cyclic.extend(path[start..].iter().copied());
                    }
                    break;
                }
                None => {
                    marks.insert(id, Mark::OnPath);
                    path.push(id);
                    current = parents
                        .get(&id)
                        .and_then(ParentRef::element)
                        .filter(|p| parents.contains_key(p));
                }
            }
        }
        for id in path {
            marks.insert(id, Mark::Done);
        }
    }

    cyclic
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ContainerId;
    use crate::model::Element;

    fn el(id: &str, parent: Option<&str>) -> Element {
        let mut e = Element::new(ElementId::intern(id), id);
        e.parent = parent.map_or(ParentRef::Root, |p| ElementId::intern(p).into());
        e
    }

    fn canvas(containers: Vec<Vec<Element>>) -> Canvas {
        Canvas {
            containers: containers
                .into_iter()
                .enumerate()
                .map(|(i, elements)| {
                    let mut c = Container::new(
                        ContainerId::intern(&format!("gr_ctr_{i}")),
                        "C",
                        800.0,
                        600.0,
                    );
                    c.elements = elements;
                    c
                })
                .collect(),
        }
    }

    fn id(s: &str) -> ElementId {
        ElementId::intern(s)
    }

    #[test]
    fn self_target_is_a_cycle() {
        let c = canvas(vec![vec![el("gr_a", None)]]);
        assert!(would_create_cycle(&c, id("gr_a"), id("gr_a")));
    }

    #[test]
    fn descendant_target_is_a_cycle() {
        let c = canvas(vec![vec![
            el("gr_p", None),
            el("gr_c", Some("gr_p")),
            el("gr_gc", Some("gr_c")),
        ]]);
        assert!(would_create_cycle(&c, id("gr_p"), id("gr_gc")));
        assert!(!would_create_cycle(&c, id("gr_gc"), id("gr_p")));
    }

    #[test]
    fn sibling_target_is_fine() {
        let c = canvas(vec![vec![el("gr_s1", None), el("gr_s2", None)]]);
        assert!(!would_create_cycle(&c, id("gr_s1"), id("gr_s2")));
    }

    #[test]
    fn detection_crosses_containers() {
        let c = canvas(vec![
            vec![el("gr_x_root", None)],
            vec![el("gr_x_child", Some("gr_x_root"))],
        ]);
        assert!(would_create_cycle(&c, id("gr_x_root"), id("gr_x_child")));
    }

    #[test]
    fn existing_loop_terminates() {
        let c = canvas(vec![vec![
            el("gr_l1", Some("gr_l2")),
            el("gr_l2", Some("gr_l1")),
            el("gr_free", None),
        ]]);
        assert!(!would_create_cycle(&c, id("gr_free"), id("gr_l1")));
        assert!(would_create_cycle(&c, id("gr_l2"), id("gr_l1")));
    }

    #[test]
    fn descendants_follow_the_whole_chain() {
        let c = canvas(vec![vec![
            el("gr_d_a", None),
            el("gr_d_b", Some("gr_d_a")),
            el("gr_d_c", Some("gr_d_b")),
            el("gr_d_other", None),
        ]]);
        let found = descendants_in_container(&c.containers[0], id("gr_d_a"));
        assert_eq!(found, HashSet::from([id("gr_d_b"), id("gr_d_c")]));

        let lookup = ElementLookup::build(&c);
        assert_eq!(lookup.descendants(id("gr_d_a")).len(), 2);
        assert_eq!(lookup.position(id("gr_d_other")), Some((0, 3)));
    }

    #[test]
    fn parent_cycles_reports_only_loop_members() {
        let c = canvas(vec![vec![
            el("gr_pc_a", Some("gr_pc_b")),
            el("gr_pc_b", Some("gr_pc_a")),
            el("gr_pc_tail", Some("gr_pc_a")),
            el("gr_pc_ok", None),
            el("gr_pc_self", Some("gr_pc_self")),
        ]]);
        assert_eq!(
            parent_cycles(&c),
            HashSet::from([id("gr_pc_a"), id("gr_pc_b"), id("gr_pc_self")])
        );
    }
}
