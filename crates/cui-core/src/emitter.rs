//! Emitter: component → C# creation fragment.
//!
//! The script generator concatenates these fragments into one creation and
//! one destruction procedure per container. The mapping is fixed: same
//! component in, same text out.

use crate::model::*;
use std::fmt::Write;

/// The object-initializer expression a component contributes, e.g.
///
/// ```text
/// new CuiRectTransformComponent
/// {
///     AnchorMin = "0.2 0.2",
///     AnchorMax = "0.8 0.8",
///     OffsetMin = "0 0",
///     OffsetMax = "0 0"
/// }
/// ```
#[must_use]
pub fn component_fragment(component: &Component) -> String {
    let mut fields: Vec<(&'static str, String)> = Vec::new();
    let class = match component {
        Component::RectTransform(rt) => {
            fields.push(("AnchorMin", quote(&rt.anchormin)));
            fields.push(("AnchorMax", quote(&rt.anchormax)));
            fields.push(("OffsetMin", quote(&rt.offsetmin)));
            fields.push(("OffsetMax", quote(&rt.offsetmax)));
            "CuiRectTransformComponent"
        }
        Component::Image(image) => {
            fields.push(("Color", quote(&image.color)));
            push_quoted(&mut fields, "Sprite", image.sprite.as_deref());
            push_quoted(&mut fields, "Material", image.material.as_deref());
            if let Some(kind) = &image.imagetype {
                fields.push(("ImageType", format!("Image.Type.{kind}")));
            }
            "CuiImageComponent"
        }
        Component::RawImage(raw) => {
            push_quoted(&mut fields, "Url", raw.url.as_deref());
            push_quoted(&mut fields, "Png", raw.png.as_deref());
            push_quoted(&mut fields, "SteamId", raw.steamid.as_deref());
            push_quoted(&mut fields, "Sprite", raw.sprite.as_deref());
            push_quoted(&mut fields, "Color", raw.color.as_deref());
            "CuiRawImageComponent"
        }
        Component::Text(text) => {
            fields.push(("Text", quote(&text.text)));
            fields.push(("FontSize", text.font_size.to_string()));
            fields.push(("Align", format!("TextAnchor.{}", text.align.as_str())));
            fields.push(("Color", quote(&text.color)));
            push_quoted(&mut fields, "Font", text.font.as_deref());
            if let Some(mode) = text.vertical_overflow {
                fields.push((
                    "VerticalOverflow",
                    format!("VerticalWrapMode.{}", mode.as_str()),
                ));
            }
            "CuiTextComponent"
        }
        Component::Button(button) => {
            push_quoted(&mut fields, "Command", button.command.as_deref());
            push_quoted(&mut fields, "Close", button.close.as_deref());
            push_quoted(&mut fields, "Sprite", button.sprite.as_deref());
            push_quoted(&mut fields, "Material", button.material.as_deref());
            push_quoted(&mut fields, "Color", button.color.as_deref());
            if let Some(kind) = &button.imagetype {
                fields.push(("ImageType", format!("Image.Type.{kind}")));
            }
            "CuiButtonComponent"
        }
        Component::NeedsCursor(_) => "CuiNeedsCursorComponent",
        Component::NeedsKeyboard(_) => "CuiNeedsKeyboardComponent",
    };
    render(class, &fields)
}

/// The call that removes an element's UI from a player's screen.
#[must_use]
pub fn destroy_fragment(element: &Element) -> String {
    format!("CuiHelper.DestroyUi(player, {});", quote(&element.name))
}

fn render(class: &str, fields: &[(&'static str, String)]) -> String {
    if fields.is_empty() {
        return format!("new {class}()");
    }
    let mut out = String::with_capacity(32 + fields.len() * 32);
    let _ = writeln!(out, "new {class}");
    out.push_str("{\n");
    let last = fields.len() - 1;
    for (i, (key, value)) in fields.iter().enumerate() {
        let sep = if i == last { "" } else { "," };
        let _ = writeln!(out, "    {key} = {value}{sep}");
    }
    out.push('}');
    out
}

fn push_quoted(fields: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    if let Some(v) = value {
        fields.push((key, quote(v)));
    }
}

/// C# string literal.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
