//! Display tree for the structural browser.
//!
//! Reassembles the nesting that the flat per-container element lists only
//! express through parent references. Every container and every element of
//! the canvas gets exactly one node; broken references are reported as
//! diagnostics and the node is attached somewhere sensible instead of being
//! dropped, so the tree is always complete and acyclic.

use crate::graph::parent_cycles;
use crate::id::{ContainerId, ElementId};
use crate::lint::{LintDiagnostic, LintSeverity};
use crate::model::{Canvas, ParentRef};
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use std::collections::HashMap;
use std::fmt;

/// What a tree node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeKey {
    Container(ContainerId),
    Element(ElementId),
}

impl fmt::Display for TreeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeKey::Container(id) => write!(f, "container `{id}`"),
            TreeKey::Element(id) => write!(f, "element `{id}`"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub key: TreeKey,
    pub name: String,
    /// The container that owns this node (itself, for container nodes).
    pub container: ContainerId,
}

/// The assembled tree. Edges point parent → child.
#[derive(Debug, Default)]
pub struct HierarchyTree {
    pub graph: StableDiGraph<TreeNode, ()>,
    /// Top-level nodes in canvas order.
    pub roots: Vec<NodeIndex>,
    pub index: HashMap<TreeKey, NodeIndex>,
    /// Broken references found while building.
    pub diagnostics: Vec<LintDiagnostic>,
}

impl HierarchyTree {
    pub fn node(&self, idx: NodeIndex) -> &TreeNode {
        &self.graph[idx]
    }

    pub fn find(&self, key: TreeKey) -> Option<NodeIndex> {
        self.index.get(&key).copied()
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
    }

    /// Children in canvas order: nested containers first, then elements.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();
        children.sort();
        children
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Depth-first pre-order walk from the roots, yielding `(depth, node)`.
    pub fn walk(&self) -> Vec<(usize, &TreeNode)> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack: Vec<(usize, NodeIndex)> =
            self.roots.iter().rev().map(|&idx| (0, idx)).collect();
        while let Some((depth, idx)) = stack.pop() {
            out.push((depth, &self.graph[idx]));
            for child in self.children(idx).into_iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        out
    }
}

/// Build the display tree for a canvas.
#[must_use]
pub fn build_hierarchy(canvas: &Canvas) -> HierarchyTree {
    let mut tree = HierarchyTree::default();

    // Containers first, then elements, both in canvas order, so sorting by
    // node index reproduces canvas order.
    for container in &canvas.containers {
        let key = TreeKey::Container(container.id);
        if tree.index.contains_key(&key) {
            continue;
        }
        let idx = tree.graph.add_node(TreeNode {
            key,
            name: container.name.clone(),
            container: container.id,
        });
        tree.index.insert(key, idx);
    }
    for (container, element) in canvas.elements() {
        let key = TreeKey::Element(element.id);
        if tree.index.contains_key(&key) {
            continue;
        }
        let idx = tree.graph.add_node(TreeNode {
            key,
            name: element.name.clone(),
            container: container.id,
        });
        tree.index.insert(key, idx);
    }

    attach_elements(canvas, &mut tree);
    attach_containers(canvas, &mut tree);

    for container in &canvas.containers {
        let Some(idx) = tree.find(TreeKey::Container(container.id)) else {
            continue;
        };
        if tree.parent(idx).is_none() && !tree.roots.contains(&idx) {
            tree.roots.push(idx);
        }
    }

    tree
}

fn attach_elements(canvas: &Canvas, tree: &mut HierarchyTree) {
    let cyclic = parent_cycles(canvas);

    for (container, element) in canvas.elements() {
        let key = TreeKey::Element(element.id);
        let Some(idx) = tree.find(key) else { continue };
        if tree.parent(idx).is_some() {
            // Duplicate id: the first occurrence already owns the node.
            continue;
        }
        let Some(root) = tree.find(TreeKey::Container(container.id)) else {
            continue;
        };

        let parent = match element.parent {
            ParentRef::Root => root,
            ParentRef::Element(_) if cyclic.contains(&element.id) => {
                report(
                    tree,
                    key,
                    "parent-cycle",
                    format!(
                        "`{}` is part of a parent-reference loop; shown at the root of `{}`.",
                        element.id, container.id
                    ),
                );
                root
            }
            ParentRef::Element(parent) => match tree.find(TreeKey::Element(parent)) {
                Some(parent_idx) => parent_idx,
                None => {
                    report(
                        tree,
                        key,
                        "dangling-parent",
                        format!(
                            "`{}` refers to missing parent `{parent}`; shown at the root of `{}`.",
                            element.id, container.id
                        ),
                    );
                    root
                }
            },
        };
        tree.graph.add_edge(parent, idx, ());
    }
}

fn attach_containers(canvas: &Canvas, tree: &mut HierarchyTree) {
    for container in &canvas.containers {
        let Some(anchor) = container.parent_id else {
            continue;
        };
        let key = TreeKey::Container(container.id);
        let Some(idx) = tree.find(key) else { continue };
        if tree.parent(idx).is_some() {
            continue;
        }

        match tree.find(TreeKey::Element(anchor)) {
            None => report(
                tree,
                key,
                "dangling-anchor",
                format!(
                    "`{}` is anchored on missing element `{anchor}`; shown at top level.",
                    container.id
                ),
            ),
            Some(anchor_idx) if is_ancestor_or_self(tree, idx, anchor_idx) => report(
                tree,
                key,
                "anchor-cycle",
                format!(
                    "`{}` is anchored inside its own subtree (on `{anchor}`); shown at top level.",
                    container.id
                ),
            ),
            Some(anchor_idx) => {
                tree.graph.add_edge(anchor_idx, idx, ());
            }
        }
    }
}

/// Is `ancestor` on the path from `idx` up to its root?
fn is_ancestor_or_self(tree: &HierarchyTree, ancestor: NodeIndex, idx: NodeIndex) -> bool {
    let mut current = Some(idx);
    let mut steps = 0;
    while let Some(node) = current {
        if node == ancestor {
            return true;
        }
        // The tree is acyclic by construction; the bound only guards misuse.
        steps += 1;
        if steps > tree.len() {
            return false;
        }
        current = tree.parent(node);
    }
    false
}

fn report(tree: &mut HierarchyTree, node: TreeKey, rule: &'static str, message: String) {
    log::warn!("hierarchy: {message}");
    tree.diagnostics.push(LintDiagnostic {
        node,
        message,
        severity: LintSeverity::Warning,
        rule,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Container, Element};

    fn el(id: &str, parent: Option<&str>) -> Element {
        let mut e = Element::new(ElementId::intern(id), id);
        e.parent = parent.map_or(ParentRef::Root, |p| ElementId::intern(p).into());
        e
    }

    fn ctr(id: &str, elements: Vec<Element>) -> Container {
        let mut c = Container::new(ContainerId::intern(id), id, 800.0, 600.0);
        c.elements = elements;
        c
    }

    fn names(tree: &HierarchyTree) -> Vec<(usize, String)> {
        tree.walk()
            .into_iter()
            .map(|(d, n)| (d, n.name.clone()))
            .collect()
    }

    #[test]
    fn nests_elements_under_their_parents() {
        let canvas = Canvas {
            containers: vec![ctr(
                "hy_main",
                vec![
                    el("hy_panel", None),
                    el("hy_title", Some("hy_panel")),
                    el("hy_close", Some("hy_panel")),
                    el("hy_footer", None),
                ],
            )],
        };
        let tree = build_hierarchy(&canvas);
        assert!(tree.diagnostics.is_empty());
        assert_eq!(
            names(&tree),
            vec![
                (0, "hy_main".into()),
                (1, "hy_panel".into()),
                (2, "hy_title".into()),
                (2, "hy_close".into()),
                (1, "hy_footer".into()),
            ]
        );
    }

    #[test]
    fn child_listed_before_parent_still_nests() {
        let canvas = Canvas {
            containers: vec![ctr(
                "hy_order",
                vec![el("hy_o_child", Some("hy_o_parent")), el("hy_o_parent", None)],
            )],
        };
        let tree = build_hierarchy(&canvas);
        let child = tree.find(TreeKey::Element(ElementId::intern("hy_o_child"))).unwrap();
        let parent = tree.parent(child).unwrap();
        assert_eq!(tree.node(parent).name, "hy_o_parent");
    }

    #[test]
    fn dangling_parent_goes_to_container_root() {
        let canvas = Canvas {
            containers: vec![ctr("hy_dang", vec![el("hy_lost", Some("hy_nowhere"))])],
        };
        let tree = build_hierarchy(&canvas);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.diagnostics.len(), 1);
        assert_eq!(tree.diagnostics[0].rule, "dangling-parent");
        assert_eq!(
            names(&tree),
            vec![(0, "hy_dang".into()), (1, "hy_lost".into())]
        );
    }

    #[test]
    fn loop_members_go_to_container_root() {
        let canvas = Canvas {
            containers: vec![ctr(
                "hy_loop",
                vec![
                    el("hy_la", Some("hy_lb")),
                    el("hy_lb", Some("hy_la")),
                    el("hy_ltail", Some("hy_la")),
                ],
            )],
        };
        let tree = build_hierarchy(&canvas);
        assert_eq!(tree.walk().len(), 4);
        assert_eq!(
            tree.diagnostics
                .iter()
                .filter(|d| d.rule == "parent-cycle")
                .count(),
            2
        );
        let tail = tree.find(TreeKey::Element(ElementId::intern("hy_ltail"))).unwrap();
        assert_eq!(tree.node(tree.parent(tail).unwrap()).name, "hy_la");
    }

    #[test]
    fn nested_container_hangs_under_anchor() {
        let mut nested = ctr("hy_popup", vec![el("hy_popup_body", None)]);
        nested.parent_id = Some(ElementId::intern("hy_anchor"));
        let canvas = Canvas {
            containers: vec![ctr("hy_outer", vec![el("hy_anchor", None)]), nested],
        };
        let tree = build_hierarchy(&canvas);
        assert_eq!(tree.roots.len(), 1);
        assert_eq!(
            names(&tree),
            vec![
                (0, "hy_outer".into()),
                (1, "hy_anchor".into()),
                (2, "hy_popup".into()),
                (3, "hy_popup_body".into()),
            ]
        );
    }

    #[test]
    fn bad_anchors_promote_to_top_level() {
        let mut dangling = ctr("hy_dangling_nest", vec![]);
        dangling.parent_id = Some(ElementId::intern("hy_no_anchor"));
        let mut selfish = ctr("hy_self_nest", vec![el("hy_inner", None)]);
        selfish.parent_id = Some(ElementId::intern("hy_inner"));

        let canvas = Canvas {
            containers: vec![dangling, selfish],
        };
        let tree = build_hierarchy(&canvas);
        assert_eq!(tree.roots.len(), 2);
        let rules: Vec<_> = tree.diagnostics.iter().map(|d| d.rule).collect();
        assert_eq!(rules, vec!["dangling-anchor", "anchor-cycle"]);
    }
}
