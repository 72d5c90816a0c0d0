//! Lint diagnostics for canvas documents.
//!
//! Reports structural issues without modifying the canvas. Everything here
//! is tolerated by the transform engine and the hierarchy builder; lint just
//! makes it visible.

use crate::graph::parent_cycles;
use crate::hierarchy::TreeKey;
use crate::model::{Canvas, Component, Container, Element, ParentRef, RectTransform};
use crate::model::{Color, ComponentType};
use crate::parser::parse_vec2;
use std::collections::{HashMap, HashSet};

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Should be fixed; likely a mistake.
    Warning,
    /// Informational.
    Info,
}

/// A single lint diagnostic for a container or element.
#[derive(Debug, Clone, PartialEq)]
pub struct LintDiagnostic {
    /// The node this diagnostic refers to.
    pub node: TreeKey,
    /// Human-readable message.
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "dangling-parent", "invalid-color").
    pub rule: &'static str,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Run all lint rules over the canvas and return diagnostics.
#[must_use]
pub fn lint_canvas(canvas: &Canvas) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_duplicate_ids(canvas, &mut diags);
    lint_parent_refs(canvas, &mut diags);
    lint_parent_cycles(canvas, &mut diags);
    lint_anchors(canvas, &mut diags);
    for (_, element) in canvas.elements() {
        lint_rect_transforms(element, &mut diags);
        lint_colors(element, &mut diags);
    }
    diags
}

// ─── Rules ────────────────────────────────────────────────────────────────

fn lint_duplicate_ids(canvas: &Canvas, diags: &mut Vec<LintDiagnostic>) {
    let mut containers = HashSet::new();
    for container in &canvas.containers {
        if !containers.insert(container.id) {
            diags.push(LintDiagnostic {
                node: TreeKey::Container(container.id),
                message: format!("Container id `{}` is used more than once.", container.id),
                severity: LintSeverity::Warning,
                rule: "duplicate-id",
            });
        }
    }

    let mut elements = HashSet::new();
    for (_, element) in canvas.elements() {
        if !elements.insert(element.id) {
            diags.push(LintDiagnostic {
                node: TreeKey::Element(element.id),
                message: format!(
                    "Element id `{}` is used more than once; ids must be unique across the canvas.",
                    element.id
                ),
                severity: LintSeverity::Warning,
                rule: "duplicate-id",
            });
        }
    }
}

/// Parents must exist, and normally live in the same container.
fn lint_parent_refs(canvas: &Canvas, diags: &mut Vec<LintDiagnostic>) {
    let owner: HashMap<_, _> = canvas
        .elements()
        .map(|(container, element)| (element.id, container.id))
        .collect();

    for (container, element) in canvas.elements() {
        let ParentRef::Element(parent) = element.parent else {
            continue;
        };
        match owner.get(&parent) {
            None => diags.push(LintDiagnostic {
                node: TreeKey::Element(element.id),
                message: format!(
                    "`{}` refers to parent `{parent}`, which does not exist.",
                    element.id
                ),
                severity: LintSeverity::Warning,
                rule: "dangling-parent",
            }),
            Some(parent_container) if *parent_container != container.id => {
                diags.push(LintDiagnostic {
                    node: TreeKey::Element(element.id),
                    message: format!(
                        "`{}` in `{}` has its parent `{parent}` in `{parent_container}`.",
                        element.id, container.id
                    ),
                    severity: LintSeverity::Info,
                    rule: "cross-container-parent",
                });
            }
            Some(_) => {}
        }
    }
}

fn lint_parent_cycles(canvas: &Canvas, diags: &mut Vec<LintDiagnostic>) {
    let cyclic = parent_cycles(canvas);
    for (_, element) in canvas.elements() {
        if cyclic.contains(&element.id) {
            diags.push(LintDiagnostic {
                node: TreeKey::Element(element.id),
                message: format!("`{}` is its own ancestor.", element.id),
                severity: LintSeverity::Warning,
                rule: "parent-cycle",
            });
        }
    }
}

fn lint_anchors(canvas: &Canvas, diags: &mut Vec<LintDiagnostic>) {
    for container in &canvas.containers {
        let Some(anchor) = container.parent_id else {
            continue;
        };
        if !canvas.has_element(anchor) {
            diags.push(dangling_anchor(container, anchor.as_str()));
        }
    }
}

fn dangling_anchor(container: &Container, anchor: &str) -> LintDiagnostic {
    LintDiagnostic {
        node: TreeKey::Container(container.id),
        message: format!(
            "`{}` is nested in element `{anchor}`, which does not exist.",
            container.id
        ),
        severity: LintSeverity::Warning,
        rule: "dangling-anchor",
    }
}

/// Exactly one RectTransform, with parsable fields.
fn lint_rect_transforms(element: &Element, diags: &mut Vec<LintDiagnostic>) {
    let rects: Vec<&RectTransform> = element
        .components
        .iter()
        .filter_map(|c| match c {
            Component::RectTransform(rt) => Some(rt),
            _ => None,
        })
        .collect();

    match rects.len() {
        0 => diags.push(LintDiagnostic {
            node: TreeKey::Element(element.id),
            message: format!(
                "`{}` has no RectTransform; it will be drawn as a 100×100 box.",
                element.id
            ),
            severity: LintSeverity::Warning,
            rule: "missing-rect-transform",
        }),
        1 => {}
        n => diags.push(LintDiagnostic {
            node: TreeKey::Element(element.id),
            message: format!(
                "`{}` has {n} RectTransforms; only the first is used.",
                element.id
            ),
            severity: LintSeverity::Warning,
            rule: "duplicate-rect-transform",
        }),
    }

    let Some(rt) = rects.first() else { return };
    let fields = [
        ("anchormin", &rt.anchormin),
        ("anchormax", &rt.anchormax),
        ("offsetmin", &rt.offsetmin),
        ("offsetmax", &rt.offsetmax),
    ];
    for (field, value) in fields {
        if parse_vec2(value).is_none() {
            diags.push(LintDiagnostic {
                node: TreeKey::Element(element.id),
                message: format!(
                    "`{}` {field} `{value}` is not an \"x y\" pair; the default box is used.",
                    element.id
                ),
                severity: LintSeverity::Warning,
                rule: "invalid-geometry",
            });
        }
    }
}

fn lint_colors(element: &Element, diags: &mut Vec<LintDiagnostic>) {
    for component in &element.components {
        let color = match component {
            Component::Image(image) => Some(&image.color),
            Component::Text(text) => Some(&text.color),
            Component::RawImage(raw) => raw.color.as_ref(),
            Component::Button(button) => button.color.as_ref(),
            _ => None,
        };
        let Some(color) = color else { continue };
        if Color::from_cui(color).is_none() {
            diags.push(LintDiagnostic {
                node: TreeKey::Element(element.id),
                message: format!(
                    "`{}` {} color `{color}` is not an \"r g b [a]\" string.",
                    element.id,
                    short_name(component.component_type())
                ),
                severity: LintSeverity::Info,
                rule: "invalid-color",
            });
        }
    }
}

fn short_name(ty: ComponentType) -> &'static str {
    let tag = ty.as_str();
    tag.strip_prefix("UnityEngine.UI.").unwrap_or(tag)
}

// ─── Tests ────────────────────────────────────────────────────────────────
