//! Core data model for CUI canvas documents.
//!
//! A `Canvas` owns a flat list of `Container`s; each container owns a flat
//! list of `Element`s. Element nesting is expressed through string parent
//! references (`ParentRef`), never through ownership, so the model is a plain
//! arena that can be cloned, diffed and serialized without cycles. A
//! container may be anchored on an element through `parent_id`, which is a
//! weak lookup key as well.

use crate::id::{ContainerId, ElementId};
use crate::parser::{parse_color, parse_vec2};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;

/// Wire value of the root sentinel.
pub const ROOT_PARENT: &str = "Hud";

// ─── Parent references ───────────────────────────────────────────────────

/// Where an element hangs: at its container's root or under another element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParentRef {
    #[default]
    Root,
    Element(ElementId),
}

impl ParentRef {
    pub fn element(&self) -> Option<ElementId> {
        match self {
            ParentRef::Root => None,
            ParentRef::Element(id) => Some(*id),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, ParentRef::Root)
    }
}

impl From<ElementId> for ParentRef {
    fn from(id: ElementId) -> Self {
        ParentRef::Element(id)
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentRef::Root => f.write_str(ROOT_PARENT),
            ParentRef::Element(id) => f.write_str(id.as_str()),
        }
    }
}

impl Serialize for ParentRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParentRef::Root => serializer.serialize_str(ROOT_PARENT),
            ParentRef::Element(id) => serializer.serialize_str(id.as_str()),
        }
    }
}

impl<'de> Deserialize<'de> for ParentRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s == ROOT_PARENT {
            Ok(ParentRef::Root)
        } else {
            Ok(ParentRef::Element(ElementId::intern(&s)))
        }
    }
}

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color, 4 × f32 in [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a CUI color string: `"r g b"` or `"r g b a"`.
    ///
    /// Channels are normally 0–1. When any channel exceeds 1 the whole
    /// string is read as 0–255. Returns `None` for anything unparsable.
    pub fn from_cui(s: &str) -> Option<Self> {
        let (rgb, alpha) = parse_color(s)?;
        let scale = if rgb.iter().chain(alpha.iter()).any(|c| *c > 1.0) {
            255.0
        } else {
            1.0
        };
        let [r, g, b] = rgb.map(|c| (c / scale).clamp(0.0, 1.0));
        let a = alpha.map_or(1.0, |a| (a / scale).clamp(0.0, 1.0));
        Some(Self::rgba(r, g, b, a))
    }

    /// Emit as a CUI color string (`"1 0.5 0 1"`).
    pub fn to_cui(&self) -> String {
        format!(
            "{} {} {} {}",
            format_num(self.r),
            format_num(self.g),
            format_num(self.b),
            format_num(self.a)
        )
    }
}

/// Shortest decimal form: integers without a trailing `.0`, fractions
/// rounded to 3 places.
pub fn format_num(n: f32) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        let s = format!("{n:.3}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// A 2-vector: normalized anchor or pixel offset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

// ─── Components ──────────────────────────────────────────────────────────

/// Geometry of an element: normalized anchors plus pixel offsets.
///
/// Every field is kept as the `"x y"` string found in the document so that
/// malformed input survives a round trip untouched; the transform engine
/// parses on use and falls back to a default box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RectTransform {
    pub anchormin: String,
    pub anchormax: String,
    pub offsetmin: String,
    pub offsetmax: String,
}

impl Default for RectTransform {
    /// Stretch over the whole parent.
    fn default() -> Self {
        Self::new("0 0", "1 1", "0 0", "0 0")
    }
}

impl RectTransform {
    pub fn new(anchormin: &str, anchormax: &str, offsetmin: &str, offsetmax: &str) -> Self {
        Self {
            anchormin: anchormin.into(),
            anchormax: anchormax.into(),
            offsetmin: offsetmin.into(),
            offsetmax: offsetmax.into(),
        }
    }

    /// The geometry given to freshly created elements: 20% inset on every side.
    pub fn inset() -> Self {
        Self::new("0.2 0.2", "0.8 0.8", "0 0", "0 0")
    }

    pub fn anchor_min(&self) -> Option<Vec2> {
        parse_vec2(&self.anchormin)
    }

    pub fn anchor_max(&self) -> Option<Vec2> {
        parse_vec2(&self.anchormax)
    }

    pub fn offset_min(&self) -> Option<Vec2> {
        parse_vec2(&self.offsetmin)
    }

    pub fn offset_max(&self) -> Option<Vec2> {
        parse_vec2(&self.offsetmax)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imagetype: Option<String>,
}

impl Default for Image {
    fn default() -> Self {
        Self {
            color: default_color(),
            sprite: None,
            material: None,
            imagetype: None,
        }
    }
}

/// Image loaded from a URL, a stored PNG id, or a Steam avatar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub png: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steamid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite: Option<String>,
}

/// Text anchor inside the element's rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAnchor {
    UpperLeft,
    UpperCenter,
    UpperRight,
    MiddleLeft,
    #[default]
    MiddleCenter,
    MiddleRight,
    LowerLeft,
    LowerCenter,
    LowerRight,
}

impl TextAnchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAnchor::UpperLeft => "UpperLeft",
            TextAnchor::UpperCenter => "UpperCenter",
            TextAnchor::UpperRight => "UpperRight",
            TextAnchor::MiddleLeft => "MiddleLeft",
            TextAnchor::MiddleCenter => "MiddleCenter",
            TextAnchor::MiddleRight => "MiddleRight",
            TextAnchor::LowerLeft => "LowerLeft",
            TextAnchor::LowerCenter => "LowerCenter",
            TextAnchor::LowerRight => "LowerRight",
        }
    }
}

/// Vertical overflow handling for text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalWrapMode {
    Overflow,
    Truncate,
}

impl VerticalWrapMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerticalWrapMode::Overflow => "Overflow",
            VerticalWrapMode::Truncate => "Truncate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    #[serde(default)]
    pub text: String,
    #[serde(rename = "fontSize", default = "default_font_size")]
    pub font_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(default)]
    pub align: TextAnchor,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(
        rename = "verticalOverflow",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub vertical_overflow: Option<VerticalWrapMode>,
}

impl Default for Text {
    fn default() -> Self {
        Self {
            text: "Text".into(),
            font_size: default_font_size(),
            font: Some("RobotoCondensed-Regular.ttf".into()),
            align: TextAnchor::MiddleCenter,
            color: default_color(),
            vertical_overflow: Some(VerticalWrapMode::Truncate),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Button {
    /// Console command run on click.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Name of the UI element to destroy on click.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imagetype: Option<String>,
}

/// Marker: the UI needs the mouse cursor while visible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NeedsCursor {}

/// Marker: the UI captures keyboard input while visible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NeedsKeyboard {}

fn default_color() -> String {
    "1 1 1 1".into()
}

fn default_font_size() -> u32 {
    14
}

/// A typed component attached to an element, keyed by its `type` string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Component {
    #[serde(rename = "RectTransform")]
    RectTransform(RectTransform),
    #[serde(rename = "UnityEngine.UI.Image", alias = "Image")]
    Image(Image),
    #[serde(rename = "UnityEngine.UI.RawImage", alias = "RawImage")]
    RawImage(RawImage),
    #[serde(rename = "UnityEngine.UI.Text", alias = "Text")]
    Text(Text),
    #[serde(rename = "UnityEngine.UI.Button", alias = "Button")]
    Button(Button),
    #[serde(rename = "NeedsCursor")]
    NeedsCursor(NeedsCursor),
    #[serde(rename = "NeedsKeyboard")]
    NeedsKeyboard(NeedsKeyboard),
}

impl Component {
    pub fn component_type(&self) -> ComponentType {
        match self {
            Component::RectTransform(_) => ComponentType::RectTransform,
            Component::Image(_) => ComponentType::Image,
            Component::RawImage(_) => ComponentType::RawImage,
            Component::Text(_) => ComponentType::Text,
            Component::Button(_) => ComponentType::Button,
            Component::NeedsCursor(_) => ComponentType::NeedsCursor,
            Component::NeedsKeyboard(_) => ComponentType::NeedsKeyboard,
        }
    }

    /// A component of the given type with its editor defaults.
    pub fn default_for(ty: ComponentType) -> Self {
        match ty {
            ComponentType::RectTransform => Component::RectTransform(RectTransform::inset()),
            ComponentType::Image => Component::Image(Image::default()),
            ComponentType::RawImage => Component::RawImage(RawImage {
                color: Some(default_color()),
                ..Default::default()
            }),
            ComponentType::Text => Component::Text(Text::default()),
            ComponentType::Button => Component::Button(Button::default()),
            ComponentType::NeedsCursor => Component::NeedsCursor(NeedsCursor {}),
            ComponentType::NeedsKeyboard => Component::NeedsKeyboard(NeedsKeyboard {}),
        }
    }
}

/// Field-less discriminator of `Component`, used by type-keyed operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    RectTransform,
    Image,
    RawImage,
    Text,
    Button,
    NeedsCursor,
    NeedsKeyboard,
}

impl ComponentType {
    pub const ALL: [ComponentType; 7] = [
        ComponentType::RectTransform,
        ComponentType::Image,
        ComponentType::RawImage,
        ComponentType::Text,
        ComponentType::Button,
        ComponentType::NeedsCursor,
        ComponentType::NeedsKeyboard,
    ];

    /// The canonical `type` tag written to documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::RectTransform => "RectTransform",
            ComponentType::Image => "UnityEngine.UI.Image",
            ComponentType::RawImage => "UnityEngine.UI.RawImage",
            ComponentType::Text => "UnityEngine.UI.Text",
            ComponentType::Button => "UnityEngine.UI.Button",
            ComponentType::NeedsCursor => "NeedsCursor",
            ComponentType::NeedsKeyboard => "NeedsKeyboard",
        }
    }

    /// Resolve a `type` tag, accepting the short aliases (`Image`, `Text`, ...).
    pub fn from_tag(tag: &str) -> Option<Self> {
        let short = tag.strip_prefix("UnityEngine.UI.").unwrap_or(tag);
        ComponentType::ALL
            .into_iter()
            .find(|ty| ty.as_str().strip_prefix("UnityEngine.UI.").unwrap_or(ty.as_str()) == short)
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Elements & containers ───────────────────────────────────────────────

/// A node of the UI tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    pub name: String,
    #[serde(default)]
    pub parent: ParentRef,
    #[serde(default)]
    pub components: SmallVec<[Component; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fade_in: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fade_out: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destroy_ui: Option<String>,
}

impl Element {
    /// A root-level element carrying the default inset RectTransform.
    pub fn new(id: ElementId, name: impl Into<String>) -> Self {
        let mut components = SmallVec::new();
        components.push(Component::RectTransform(RectTransform::inset()));
        Self {
            id,
            name: name.into(),
            parent: ParentRef::Root,
            components,
            fade_in: None,
            fade_out: None,
            destroy_ui: None,
        }
    }

    /// The first RectTransform, if any.
    pub fn rect_transform(&self) -> Option<&RectTransform> {
        self.components.iter().find_map(|c| match c {
            Component::RectTransform(rt) => Some(rt),
            _ => None,
        })
    }

    pub fn component(&self, ty: ComponentType) -> Option<&Component> {
        self.components.iter().find(|c| c.component_type() == ty)
    }

    pub fn component_mut(&mut self, ty: ComponentType) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.component_type() == ty)
    }

    pub fn has_component(&self, ty: ComponentType) -> bool {
        self.component(ty).is_some()
    }
}

/// A positioned rectangular region hosting a tree of elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub id: ContainerId,
    pub name: String,
    #[serde(default)]
    pub elements: Vec<Element>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Element this container is nested in. A lookup key, not ownership.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ElementId>,
}

impl Container {
    pub fn new(id: ContainerId, name: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            id,
            name: name.into(),
            elements: Vec::new(),
            x: 0.0,
            y: 0.0,
            width,
            height,
            parent_id: None,
        }
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Elements hanging directly at this container's root.
    pub fn root_elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| e.parent.is_root())
    }
}

/// Root aggregate of one editing session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    #[serde(default)]
    pub containers: Vec<Container>,
}

impl Canvas {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.iter().find(|c| c.id == id)
    }

    pub fn container_mut(&mut self, id: ContainerId) -> Option<&mut Container> {
        self.containers.iter_mut().find(|c| c.id == id)
    }

    /// Position of an element as `(container index, element index)`.
    pub fn locate(&self, id: ElementId) -> Option<(usize, usize)> {
        self.containers.iter().enumerate().find_map(|(ci, c)| {
            c.elements
                .iter()
                .position(|e| e.id == id)
                .map(|ei| (ci, ei))
        })
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.locate(id)
            .map(|(ci, ei)| &self.containers[ci].elements[ei])
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.locate(id)
            .map(|(ci, ei)| &mut self.containers[ci].elements[ei])
    }

    /// The container holding an element.
    pub fn container_of(&self, id: ElementId) -> Option<&Container> {
        self.locate(id).map(|(ci, _)| &self.containers[ci])
    }

    pub fn has_element(&self, id: ElementId) -> bool {
        self.locate(id).is_some()
    }

    pub fn has_container(&self, id: ContainerId) -> bool {
        self.container(id).is_some()
    }

    pub fn element_count(&self) -> usize {
        self.containers.iter().map(|c| c.elements.len()).sum()
    }

    pub fn elements(&self) -> impl Iterator<Item = (&Container, &Element)> {
        self.containers
            .iter()
            .flat_map(|c| c.elements.iter().map(move |e| (c, e)))
    }

    /// Containers anchored on the given element.
    pub fn nested_containers(&self, element: ElementId) -> impl Iterator<Item = &Container> {
        self.containers
            .iter()
            .filter(move |c| c.parent_id == Some(element))
    }
}

// ─── Resolved rectangles (output of the transform engine) ────────────────

/// An axis-aligned rectangle in top-down render space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResolvedBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ResolvedBounds {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}
