//! Integration tests: JSON document → transform engine → verify rectangles.
//!
//! Exercises the full `cui-core` pipeline: text → Canvas → resolved bounds.

use cui_core::document::import_canvas;
use cui_core::id::{ContainerId, ElementId};
use cui_core::layout::{FALLBACK_BOUNDS, MIN_SIZE, Viewport, resolve_layout, resolve_rect};
use cui_core::model::{Canvas, Container, Element, RectTransform, ResolvedBounds};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn shop() -> Canvas {
    import_canvas(include_str!("fixtures/shop_menu.json")).unwrap()
}

fn bounds_of(canvas: &Canvas, id: &str) -> cui_core::layout::ElementBounds {
    let bounds = resolve_layout(canvas);
    *bounds
        .get(&ElementId::intern(id))
        .unwrap_or_else(|| panic!("no bounds for {id}"))
}

// ─── Root elements ───────────────────────────────────────────────────────

#[test]
fn panel_in_main_resolves_to_inset_rect() {
    let canvas = shop();
    let panel = bounds_of(&canvas, "shop_panel");
    assert_eq!(panel.local, ResolvedBounds::new(160.0, 120.0, 480.0, 360.0));
    assert_eq!(panel.absolute, panel.local);
}

#[test]
fn freshly_built_panel_matches_document_panel() {
    let mut main = Container::new(ContainerId::intern("it_main"), "Main", 800.0, 600.0);
    main.elements
        .push(Element::new(ElementId::intern("it_panel"), "Panel"));
    let canvas = Canvas {
        containers: vec![main],
    };
    assert_eq!(
        bounds_of(&canvas, "it_panel").local,
        ResolvedBounds::new(160.0, 120.0, 480.0, 360.0)
    );
}

// ─── Nested elements ─────────────────────────────────────────────────────

#[test]
fn children_resolve_against_parent_rect() {
    let canvas = shop();

    let title = bounds_of(&canvas, "shop_title");
    assert_eq!(title.local, ResolvedBounds::new(0.0, 0.0, 480.0, 90.0));
    assert_eq!(title.absolute, ResolvedBounds::new(160.0, 120.0, 480.0, 90.0));

    let list = bounds_of(&canvas, "shop_list");
    assert_eq!(list.local, ResolvedBounds::new(0.0, 90.0, 480.0, 270.0));
    assert_eq!(list.absolute, ResolvedBounds::new(160.0, 210.0, 480.0, 270.0));

    let item = bounds_of(&canvas, "shop_item");
    assert_eq!(item.local, ResolvedBounds::new(0.0, 0.0, 240.0, 135.0));
    assert_eq!(item.absolute, ResolvedBounds::new(160.0, 210.0, 240.0, 135.0));
}

#[test]
fn corner_button_is_clamped_to_min_size() {
    let close = bounds_of(&shop(), "shop_close");
    assert_eq!(close.local, ResolvedBounds::new(440.0, 0.0, MIN_SIZE, MIN_SIZE));
}

#[test]
fn element_without_rect_transform_gets_fallback_box() {
    let badge = bounds_of(&shop(), "shop_badge");
    assert_eq!(badge.local, FALLBACK_BOUNDS);
    assert_eq!(badge.absolute, ResolvedBounds::new(160.0, 210.0, 100.0, 100.0));
}

#[test]
fn nested_container_uses_its_own_origin() {
    let tip = bounds_of(&shop(), "tip_text");
    assert_eq!(tip.local, ResolvedBounds::new(150.0, 0.0, 150.0, 200.0));
    assert_eq!(tip.absolute, ResolvedBounds::new(1050.0, 0.0, 150.0, 200.0));
}

#[test]
fn every_element_is_resolved() {
    let canvas = shop();
    assert_eq!(resolve_layout(&canvas).len(), canvas.element_count());
}

// ─── Properties ──────────────────────────────────────────────────────────

fn vec2_string() -> impl Strategy<Value = String> {
    (-2000.0f32..2000.0, -2000.0f32..2000.0).prop_map(|(x, y)| format!("{x} {y}"))
}

fn anchor_string() -> impl Strategy<Value = String> {
    (0.0f32..=1.0, 0.0f32..=1.0).prop_map(|(x, y)| format!("{x} {y}"))
}

proptest! {
    #[test]
    fn resolved_size_never_below_minimum(
        amin in anchor_string(),
        amax in anchor_string(),
        omin in vec2_string(),
        omax in vec2_string(),
        pw in 1.0f32..4000.0,
        ph in 1.0f32..4000.0,
    ) {
        let rt = RectTransform::new(&amin, &amax, &omin, &omax);
        let b = resolve_rect(Some(&rt), Viewport::new(pw, ph));
        prop_assert!(b.width >= MIN_SIZE);
        prop_assert!(b.height >= MIN_SIZE);
        prop_assert!(b.x.is_finite() && b.y.is_finite());
    }

    #[test]
    fn resolve_is_pure(
        amin in anchor_string(),
        amax in anchor_string(),
        omin in vec2_string(),
        omax in vec2_string(),
        pw in 1.0f32..4000.0,
        ph in 1.0f32..4000.0,
    ) {
        let rt = RectTransform::new(&amin, &amax, &omin, &omax);
        let parent = Viewport::new(pw, ph);
        prop_assert_eq!(resolve_rect(Some(&rt), parent), resolve_rect(Some(&rt), parent));
    }

    #[test]
    fn garbage_geometry_never_panics(s in "\\PC{0,12}") {
        let rt = RectTransform::new(&s, &s, &s, &s);
        let b = resolve_rect(Some(&rt), Viewport::default());
        prop_assert!(b.width >= MIN_SIZE || b == FALLBACK_BOUNDS);
    }
}
