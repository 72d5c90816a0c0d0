//! Partial updates for containers, elements and components.
//!
//! A `None` field leaves the target untouched. Fields that are optional on
//! the target take `Option<Option<T>>` so a patch can clear them. Every
//! `apply` reports whether anything actually changed, which lets the editor
//! skip no-op edits instead of filling history with identical snapshots.

use crate::model::*;

/// Assign `value` to `slot` if present and different.
fn assign<T: PartialEq + Clone>(slot: &mut T, value: &Option<T>) -> bool {
    match value {
        Some(v) if slot != v => {
            *slot = v.clone();
            true
        }
        _ => false,
    }
}

// ─── Containers & elements ───────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerPatch {
    pub name: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

/// First field holding NaN or infinity, if any.
fn first_non_finite(fields: &[(&'static str, Option<f32>)]) -> Option<&'static str> {
    fields
        .iter()
        .find(|(_, v)| matches!(v, Some(v) if !v.is_finite()))
        .map(|&(name, _)| name)
}

impl ContainerPatch {
    /// Name of a geometry field that is not a finite number.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        first_non_finite(&[
            ("x", self.x),
            ("y", self.y),
            ("width", self.width),
            ("height", self.height),
        ])
    }

    pub fn apply(&self, container: &mut Container) -> bool {
        let mut changed = assign(&mut container.name, &self.name);
        changed |= assign(&mut container.x, &self.x);
        changed |= assign(&mut container.y, &self.y);
        changed |= assign(&mut container.width, &self.width);
        changed |= assign(&mut container.height, &self.height);
        changed
    }
}

/// Element properties other than components.
///
/// A `parent` change goes through the same cycle check as a reparent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub name: Option<String>,
    pub parent: Option<ParentRef>,
    pub fade_in: Option<Option<f32>>,
    pub fade_out: Option<Option<f32>>,
    pub destroy_ui: Option<Option<String>>,
}

impl ElementPatch {
    /// Name of a fade timer that is not a finite number.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        first_non_finite(&[
            ("fadeIn", self.fade_in.flatten()),
            ("fadeOut", self.fade_out.flatten()),
        ])
    }

    pub fn apply(&self, element: &mut Element) -> bool {
        let mut changed = assign(&mut element.name, &self.name);
        changed |= assign(&mut element.parent, &self.parent);
        changed |= assign(&mut element.fade_in, &self.fade_in);
        changed |= assign(&mut element.fade_out, &self.fade_out);
        changed |= assign(&mut element.destroy_ui, &self.destroy_ui);
        changed
    }
}

// ─── Components ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RectTransformPatch {
    pub anchormin: Option<String>,
    pub anchormax: Option<String>,
    pub offsetmin: Option<String>,
    pub offsetmax: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImagePatch {
    pub color: Option<String>,
    pub sprite: Option<Option<String>>,
    pub material: Option<Option<String>>,
    pub imagetype: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawImagePatch {
    pub url: Option<Option<String>>,
    pub png: Option<Option<String>>,
    pub steamid: Option<Option<String>>,
    pub color: Option<Option<String>>,
    pub sprite: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextPatch {
    pub text: Option<String>,
    pub font_size: Option<u32>,
    pub font: Option<Option<String>>,
    pub align: Option<TextAnchor>,
    pub color: Option<String>,
    pub vertical_overflow: Option<Option<VerticalWrapMode>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ButtonPatch {
    pub command: Option<Option<String>>,
    pub close: Option<Option<String>>,
    pub color: Option<Option<String>>,
    pub sprite: Option<Option<String>>,
    pub material: Option<Option<String>>,
    pub imagetype: Option<Option<String>>,
}

/// Partial update for the first component of one type. Marker components
/// have no fields and therefore no patch.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentPatch {
    RectTransform(RectTransformPatch),
    Image(ImagePatch),
    RawImage(RawImagePatch),
    Text(TextPatch),
    Button(ButtonPatch),
}

impl ComponentPatch {
    pub fn component_type(&self) -> ComponentType {
        match self {
            ComponentPatch::RectTransform(_) => ComponentType::RectTransform,
            ComponentPatch::Image(_) => ComponentType::Image,
            ComponentPatch::RawImage(_) => ComponentType::RawImage,
            ComponentPatch::Text(_) => ComponentType::Text,
            ComponentPatch::Button(_) => ComponentType::Button,
        }
    }

    /// Merge into `component`. Returns false when the types differ or no
    /// field changes.
    pub fn apply(&self, component: &mut Component) -> bool {
        match (self, component) {
            (ComponentPatch::RectTransform(p), Component::RectTransform(c)) => {
                let mut changed = assign(&mut c.anchormin, &p.anchormin);
                changed |= assign(&mut c.anchormax, &p.anchormax);
                changed |= assign(&mut c.offsetmin, &p.offsetmin);
                changed |= assign(&mut c.offsetmax, &p.offsetmax);
                changed
            }
            (ComponentPatch::Image(p), Component::Image(c)) => {
                let mut changed = assign(&mut c.color, &p.color);
                changed |= assign(&mut c.sprite, &p.sprite);
                changed |= assign(&mut c.material, &p.material);
                changed |= assign(&mut c.imagetype, &p.imagetype);
                changed
            }
            (ComponentPatch::RawImage(p), Component::RawImage(c)) => {
                let mut changed = assign(&mut c.url, &p.url);
                changed |= assign(&mut c.png, &p.png);
                changed |= assign(&mut c.steamid, &p.steamid);
                changed |= assign(&mut c.color, &p.color);
                changed |= assign(&mut c.sprite, &p.sprite);
                changed
            }
            (ComponentPatch::Text(p), Component::Text(c)) => {
                let mut changed = assign(&mut c.text, &p.text);
                changed |= assign(&mut c.font_size, &p.font_size);
                changed |= assign(&mut c.font, &p.font);
                changed |= assign(&mut c.align, &p.align);
                changed |= assign(&mut c.color, &p.color);
                changed |= assign(&mut c.vertical_overflow, &p.vertical_overflow);
                changed
            }
            (ComponentPatch::Button(p), Component::Button(c)) => {
                let mut changed = assign(&mut c.command, &p.command);
                changed |= assign(&mut c.close, &p.close);
                changed |= assign(&mut c.color, &p.color);
                changed |= assign(&mut c.sprite, &p.sprite);
                changed |= assign(&mut c.material, &p.material);
                changed |= assign(&mut c.imagetype, &p.imagetype);
                changed
            }
            _ => false,
        }
    }
}
