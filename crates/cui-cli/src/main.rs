//! `cui-inspect`: load a canvas document and print what the editor sees.

use anyhow::{Context, Result, bail};
use clap::Parser;
use cui_core::emitter::{component_fragment, destroy_fragment};
use cui_core::hierarchy::{HierarchyTree, TreeKey};
use cui_core::layout::ElementBounds;
use cui_core::lint::{LintDiagnostic, LintSeverity};
use cui_core::model::Canvas;
use cui_core::ElementId;
use cui_editor::CanvasStore;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect a CUI canvas document", long_about = None)]
struct Args {
    /// Canvas document (JSON)
    path: PathBuf,
    /// Print the hierarchy outline
    #[arg(long)]
    tree: bool,
    /// Print resolved rectangles (local and absolute)
    #[arg(long)]
    rects: bool,
    /// Print lint diagnostics
    #[arg(long)]
    lint: bool,
    /// Print component fragments and destroy calls, per container
    #[arg(long)]
    fragments: bool,
    /// Exit with an error when lint reports warnings
    #[arg(long)]
    strict: bool,
}

impl Args {
    /// Without any section flag, show lint and tree.
    fn sections(&self) -> (bool, bool, bool, bool) {
        if self.tree || self.rects || self.lint || self.fragments {
            (self.lint, self.tree, self.rects, self.fragments)
        } else {
            (true, true, false, false)
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let text = std::fs::read_to_string(&args.path)
        .with_context(|| format!("reading {}", args.path.display()))?;
    let mut store = CanvasStore::default();
    store
        .import_json(&text)
        .with_context(|| format!("parsing {}", args.path.display()))?;
    log::info!(
        "loaded {} containers, {} elements",
        store.canvas().containers.len(),
        store.canvas().element_count()
    );

    let diagnostics = store.lint();
    let (lint, tree, rects, fragments) = args.sections();
    let mut out = String::new();
    if lint {
        render_lint(&mut out, &diagnostics);
    }
    if tree {
        render_tree(&mut out, &store.hierarchy());
    }
    if rects {
        render_rects(&mut out, store.canvas(), &store.layout());
    }
    if fragments {
        render_fragments(&mut out, store.canvas());
    }
    print!("{out}");

    let warnings = diagnostics
        .iter()
        .filter(|d| d.severity == LintSeverity::Warning)
        .count();
    if args.strict && warnings > 0 {
        bail!("{warnings} lint warning(s) in {}", args.path.display());
    }
    Ok(())
}

fn render_lint(out: &mut String, diagnostics: &[LintDiagnostic]) {
    if diagnostics.is_empty() {
        out.push_str("lint: clean\n");
        return;
    }
    for d in diagnostics {
        let level = match d.severity {
            LintSeverity::Warning => "warning",
            LintSeverity::Info => "info",
        };
        let _ = writeln!(out, "{level}[{}] {}: {}", d.rule, d.node, d.message);
    }
}

fn render_tree(out: &mut String, tree: &HierarchyTree) {
    for (depth, node) in tree.walk() {
        let marker = match node.key {
            TreeKey::Container(_) => "▣",
            TreeKey::Element(_) => "·",
        };
        let _ = writeln!(out, "{}{marker} {}", "  ".repeat(depth), node.name);
    }
}

fn render_rects(out: &mut String, canvas: &Canvas, layout: &HashMap<ElementId, ElementBounds>) {
    for (container, element) in canvas.elements() {
        let Some(b) = layout.get(&element.id) else {
            continue;
        };
        let _ = writeln!(
            out,
            "{}/{}: local ({}, {}, {}×{}) absolute ({}, {})",
            container.name,
            element.name,
            b.local.x,
            b.local.y,
            b.local.width,
            b.local.height,
            b.absolute.x,
            b.absolute.y,
        );
    }
}

/// Per container: the creation fragments of each element, then one destroy
/// call per element, the way the generated destroy procedure lists them.
fn render_fragments(out: &mut String, canvas: &Canvas) {
    for container in &canvas.containers {
        let _ = writeln!(out, "// {}: create", container.name);
        for element in &container.elements {
            let _ = writeln!(out, "// {}", element.name);
            for component in &element.components {
                let _ = writeln!(out, "{}", component_fragment(component));
            }
        }
        let _ = writeln!(out, "// {}: destroy", container.name);
        for element in &container.elements {
            let _ = writeln!(out, "{}", destroy_fragment(element));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cui_core::document::import_canvas;
    use cui_core::hierarchy::build_hierarchy;
    use cui_core::layout::resolve_layout;

    const DOC: &str = r#"{
      "containers": [{
        "id": "cli_main", "name": "Main", "x": 0, "y": 0, "width": 800, "height": 600,
        "elements": [
          { "id": "cli_panel", "name": "Panel", "parent": "Hud",
            "components": [{ "type": "RectTransform", "anchormin": "0.2 0.2", "anchormax": "0.8 0.8" }] },
          { "id": "cli_label", "name": "Label", "parent": "cli_panel",
            "components": [{ "type": "Text", "text": "Hi" }] }
        ]
      }]
    }"#;

    #[test]
    fn tree_outline_is_indented() {
        let canvas = import_canvas(DOC).unwrap();
        let mut out = String::new();
        render_tree(&mut out, &build_hierarchy(&canvas));
        assert_eq!(out, "▣ Main\n  · Panel\n    · Label\n");
    }

    #[test]
    fn rects_list_every_element() {
        let canvas = import_canvas(DOC).unwrap();
        let mut out = String::new();
        render_rects(&mut out, &canvas, &resolve_layout(&canvas));
        assert_eq!(out.lines().count(), 2);
        assert!(out.starts_with("Main/Panel: local (160, 120, 480×360)"));
    }

    #[test]
    fn lint_reports_missing_rect_transform() {
        let canvas = import_canvas(DOC).unwrap();
        let mut out = String::new();
        render_lint(&mut out, &cui_core::lint::lint_canvas(&canvas));
        assert!(out.contains("warning[missing-rect-transform] element `cli_label`"));
    }

    #[test]
    fn every_element_is_destroyed_by_name() {
        let canvas = import_canvas(DOC).unwrap();
        let mut out = String::new();
        render_fragments(&mut out, &canvas);
        let destroy = out.split("// Main: destroy\n").nth(1).unwrap();
        assert_eq!(
            destroy,
            "CuiHelper.DestroyUi(player, \"Panel\");\n\
             CuiHelper.DestroyUi(player, \"Label\");\n"
        );
        assert!(out.starts_with("// Main: create\n// Panel\nnew CuiRectTransformComponent"));
    }

    #[test]
    fn default_sections_are_lint_and_tree() {
        let args = Args::parse_from(["cui-inspect", "doc.json"]);
        assert_eq!(args.sections(), (true, true, false, false));
        let args = Args::parse_from(["cui-inspect", "doc.json", "--rects"]);
        assert_eq!(args.sections(), (false, false, true, false));
    }
}
