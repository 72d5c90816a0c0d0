//! Anchor-based transform engine.
//!
//! Converts an element's RectTransform (normalized anchors + pixel offsets,
//! Y measured bottom-up) into a rectangle in top-down render space, relative
//! to its parent's rectangle. `resolve_layout` applies this down every
//! parent chain of a canvas.

use crate::id::ElementId;
use crate::model::*;
use std::collections::HashMap;

/// Smallest width/height a resolved element can have.
pub const MIN_SIZE: f32 = 50.0;

/// Box used when geometry is missing or unparsable.
pub const FALLBACK_BOUNDS: ResolvedBounds = ResolvedBounds::new(0.0, 0.0, 100.0, 100.0);

/// Size of the rectangle an element is laid out in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    /// The reference screen used when an element has no usable parent.
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Replace non-positive or non-finite dimensions with the defaults.
    fn sanitized(self) -> Self {
        let fallback = Viewport::default();
        let fix = |v: f32, d: f32| if v.is_finite() && v > 0.0 { v } else { d };
        Self {
            width: fix(self.width, fallback.width),
            height: fix(self.height, fallback.height),
        }
    }
}

impl From<ResolvedBounds> for Viewport {
    fn from(b: ResolvedBounds) -> Self {
        Self::new(b.width, b.height)
    }
}

/// Resolved rectangles for one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementBounds {
    /// Relative to the parent rectangle's top-left corner.
    pub local: ResolvedBounds,
    /// In canvas space: offset by the container position and every ancestor.
    pub absolute: ResolvedBounds,
}

/// Resolve one element's rectangle inside a parent of the given size.
///
/// Never fails: a missing RectTransform or any unparsable field yields
/// `FALLBACK_BOUNDS`, and non-finite results are replaced field by field.
#[must_use]
pub fn resolve_rect(rect: Option<&RectTransform>, parent: Viewport) -> ResolvedBounds {
    let Some(rt) = rect else {
        return FALLBACK_BOUNDS;
    };
    let (Some(amin), Some(amax), Some(omin), Some(omax)) = (
        rt.anchor_min(),
        rt.anchor_max(),
        rt.offset_min(),
        rt.offset_max(),
    ) else {
        return FALLBACK_BOUNDS;
    };

    let Viewport {
        width: pw,
        height: ph,
    } = parent.sanitized();

    let x = amin.x * pw + omin.x;
    let right = amax.x * pw + omax.x;

    // Anchors count from the bottom; render space counts from the top.
    let anchor_min_y = ph - amin.y * ph;
    let anchor_max_y = ph - amax.y * ph;
    let lower_edge = anchor_min_y - omin.y;
    let upper_edge = anchor_max_y - omax.y;
    let y = lower_edge.min(upper_edge);
    let bottom = lower_edge.max(upper_edge);

    ResolvedBounds {
        x: finite_or(x, FALLBACK_BOUNDS.x),
        y: finite_or(y, FALLBACK_BOUNDS.y),
        width: extent(right - x, FALLBACK_BOUNDS.width),
        height: extent(bottom - y, FALLBACK_BOUNDS.height),
    }
}

fn finite_or(v: f32, fallback: f32) -> f32 {
    if v.is_finite() { v } else { fallback }
}

fn extent(raw: f32, fallback: f32) -> f32 {
    if raw.is_finite() {
        raw.max(MIN_SIZE)
    } else {
        fallback
    }
}

/// Resolve every element of the canvas.
///
/// Root elements of a container are laid out in the container's size; every
/// other element in its parent's resolved rectangle. Elements whose parent
/// chain never reaches a container root (dangling reference, malformed
/// cycle) are laid out in `Viewport::default()` at their container's origin.
///
/// Uses an explicit work stack, so chain depth is not limited by the call
/// stack.
#[must_use]
pub fn resolve_layout(canvas: &Canvas) -> HashMap<ElementId, ElementBounds> {
    let mut children: HashMap<ElementId, Vec<&Element>> = HashMap::new();
    for (_, element) in canvas.elements() {
        if let ParentRef::Element(parent) = element.parent {
            children.entry(parent).or_default().push(element);
        }
    }

    let mut bounds: HashMap<ElementId, ElementBounds> =
        HashMap::with_capacity(canvas.element_count());
    let mut stack: Vec<(&Element, Viewport, (f32, f32))> = Vec::new();

    for container in &canvas.containers {
        let size = Viewport::new(container.width, container.height);
        let origin = (container.x, container.y);
        for element in container.root_elements() {
            stack.push((element, size, origin));
        }
        drain(&mut stack, &children, &mut bounds);
    }

    // Whatever is left never reached a root.
    for container in &canvas.containers {
        for element in &container.elements {
            if bounds.contains_key(&element.id) {
                continue;
            }
            log::debug!(
                "element {} has no resolvable parent chain, using default viewport",
                element.id
            );
            stack.push((element, Viewport::default(), (container.x, container.y)));
            drain(&mut stack, &children, &mut bounds);
        }
    }

    bounds
}

fn drain<'a>(
    stack: &mut Vec<(&'a Element, Viewport, (f32, f32))>,
    children: &HashMap<ElementId, Vec<&'a Element>>,
    bounds: &mut HashMap<ElementId, ElementBounds>,
) {
    while let Some((element, parent, (ox, oy))) = stack.pop() {
        if bounds.contains_key(&element.id) {
            continue;
        }
        let local = resolve_rect(element.rect_transform(), parent);
        let absolute = local.translate(ox, oy);
        log::trace!(
            "resolved {} local={local:?} absolute={absolute:?}",
            element.id
        );
        bounds.insert(element.id, ElementBounds { local, absolute });

        if let Some(kids) = children.get(&element.id) {
            for kid in kids {
                stack.push((kid, Viewport::from(local), (absolute.x, absolute.y)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ContainerId;

    fn rt(amin: &str, amax: &str, omin: &str, omax: &str) -> RectTransform {
        RectTransform::new(amin, amax, omin, omax)
    }

    #[test]
    fn inset_panel_in_800x600() {
        let b = resolve_rect(
            Some(&rt("0.2 0.2", "0.8 0.8", "0 0", "0 0")),
            Viewport::new(800.0, 600.0),
        );
        assert_eq!(b, ResolvedBounds::new(160.0, 120.0, 480.0, 360.0));
    }

    #[test]
    fn bottom_anchored_strip_lands_at_bottom() {
        // Full width, bottom quarter of the parent.
        let b = resolve_rect(
            Some(&rt("0 0", "1 0.25", "0 0", "0 0")),
            Viewport::new(1000.0, 1000.0),
        );
        assert_eq!(b, ResolvedBounds::new(0.0, 750.0, 1000.0, 250.0));
    }

    #[test]
    fn offsets_move_edges_in_pixels() {
        // Zero-size anchor at the bottom-left with a 200x80 pixel box.
        let b = resolve_rect(
            Some(&rt("0 0", "0 0", "10 20", "210 100")),
            Viewport::new(800.0, 600.0),
        );
        assert_eq!(b.x, 10.0);
        assert_eq!(b.width, 200.0);
        assert_eq!(b.y, 500.0);
        assert_eq!(b.height, 80.0);
    }

    #[test]
    fn tiny_rect_is_clamped_to_min_size() {
        let b = resolve_rect(
            Some(&rt("0.5 0.5", "0.5 0.5", "0 0", "1 1")),
            Viewport::new(800.0, 600.0),
        );
        assert_eq!(b.width, MIN_SIZE);
        assert_eq!(b.height, MIN_SIZE);
    }

    #[test]
    fn missing_rect_transform_gives_fallback() {
        assert_eq!(
            resolve_rect(None, Viewport::new(800.0, 600.0)),
            FALLBACK_BOUNDS
        );
    }

    #[test]
    fn unparsable_field_gives_fallback() {
        let b = resolve_rect(
            Some(&rt("0.2 0.2", "wide", "0 0", "0 0")),
            Viewport::new(800.0, 600.0),
        );
        assert_eq!(b, FALLBACK_BOUNDS);

        let b = resolve_rect(Some(&rt("", "1 1", "0 0", "0 0")), Viewport::default());
        assert_eq!(b, FALLBACK_BOUNDS);
    }

    #[test]
    fn overflowing_result_is_replaced() {
        let b = resolve_rect(
            Some(&rt("0 0", "1 1", "-3e38 0", "3e38 0")),
            Viewport::new(800.0, 600.0),
        );
        // right - x overflows to infinity.
        assert_eq!(b.width, FALLBACK_BOUNDS.width);
        assert!(b.x.is_finite());
    }

    #[test]
    fn bad_parent_size_falls_back_to_reference_screen() {
        let stretch = rt("0 0", "1 1", "0 0", "0 0");
        let b = resolve_rect(Some(&stretch), Viewport::new(0.0, f32::NAN));
        assert_eq!(b, ResolvedBounds::new(0.0, 0.0, 1920.0, 1080.0));
    }

    fn container_with(elements: Vec<Element>) -> Container {
        let mut c = Container::new(ContainerId::intern("layout_main"), "Main", 800.0, 600.0);
        c.x = 100.0;
        c.y = 50.0;
        c.elements = elements;
        c
    }

    fn element(id: &str, parent: ParentRef, rect: RectTransform) -> Element {
        let mut e = Element::new(ElementId::intern(id), id);
        e.parent = parent;
        e.components[0] = Component::RectTransform(rect);
        e
    }

    #[test]
    fn children_resolve_inside_parent_rect() {
        let panel = element("ly_panel", ParentRef::Root, RectTransform::inset());
        let half = element(
            "ly_half",
            ParentRef::Element(ElementId::intern("ly_panel")),
            rt("0 0", "0.5 1", "0 0", "0 0"),
        );
        let canvas = Canvas {
            containers: vec![container_with(vec![half, panel])],
        };

        let bounds = resolve_layout(&canvas);
        let panel_b = bounds[&ElementId::intern("ly_panel")];
        let half_b = bounds[&ElementId::intern("ly_half")];

        assert_eq!(panel_b.local, ResolvedBounds::new(160.0, 120.0, 480.0, 360.0));
        assert_eq!(
            panel_b.absolute,
            ResolvedBounds::new(260.0, 170.0, 480.0, 360.0)
        );
        assert_eq!(half_b.local, ResolvedBounds::new(0.0, 0.0, 240.0, 360.0));
        assert_eq!(
            half_b.absolute,
            ResolvedBounds::new(260.0, 170.0, 240.0, 360.0)
        );
    }

    #[test]
    fn dangling_parent_uses_default_viewport() {
        let orphan = element(
            "ly_orphan",
            ParentRef::Element(ElementId::intern("ly_gone")),
            rt("0 0", "1 1", "0 0", "0 0"),
        );
        let canvas = Canvas {
            containers: vec![container_with(vec![orphan])],
        };
        let bounds = resolve_layout(&canvas);
        let b = bounds[&ElementId::intern("ly_orphan")];
        assert_eq!(b.local, ResolvedBounds::new(0.0, 0.0, 1920.0, 1080.0));
        assert_eq!(b.absolute.x, 100.0);
    }

    #[test]
    fn malformed_cycle_still_terminates() {
        let a = element(
            "ly_cyc_a",
            ParentRef::Element(ElementId::intern("ly_cyc_b")),
            RectTransform::default(),
        );
        let b = element(
            "ly_cyc_b",
            ParentRef::Element(ElementId::intern("ly_cyc_a")),
            RectTransform::default(),
        );
        let canvas = Canvas {
            containers: vec![container_with(vec![a, b])],
        };
        let bounds = resolve_layout(&canvas);
        assert_eq!(bounds.len(), 2);
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let depth = 5_000;
        let mut elements = Vec::with_capacity(depth);
        for i in 0..depth {
            let parent = if i == 0 {
                ParentRef::Root
            } else {
                ParentRef::Element(ElementId::intern(&format!("ly_deep_{}", i - 1)))
            };
            elements.push(element(
                &format!("ly_deep_{i}"),
                parent,
                RectTransform::default(),
            ));
        }
        let canvas = Canvas {
            containers: vec![container_with(elements)],
        };
        let bounds = resolve_layout(&canvas);
        assert_eq!(bounds.len(), depth);
        let last = bounds[&ElementId::intern(&format!("ly_deep_{}", depth - 1))];
        assert_eq!(last.local, ResolvedBounds::new(0.0, 0.0, 800.0, 600.0));
    }
}
