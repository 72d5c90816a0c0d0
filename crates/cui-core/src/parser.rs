//! Parsers for the space-separated number strings CUI documents use for
//! geometry (`"0.2 0.8"`) and colors (`"1 1 1 0.5"`).
//!
//! Built on `winnow` 0.7. Both entry points are total: malformed input
//! yields `None`, never an error the caller has to propagate.

use crate::model::Vec2;
use winnow::ascii::{float, multispace0, space1};
use winnow::combinator::{opt, preceded};
use winnow::error::ContextError;
use winnow::prelude::*;

/// Parse an `"x y"` pair.
///
/// Surrounding whitespace is allowed and values past the second are ignored
/// (`"0 0 1"` reads as `(0, 0)`), but each value must be a complete finite
/// number: `"0.5 0.5px"` and `"nan 0"` are rejected.
pub fn parse_vec2(s: &str) -> Option<Vec2> {
    let mut rest = s;
    let v = vec2.parse_next(&mut rest).ok()?;
    if !ends_value(rest) {
        return None;
    }
    (v.x.is_finite() && v.y.is_finite()).then_some(v)
}

/// Parse `"r g b"` or `"r g b a"` into raw channel values (no range
/// normalization). The whole string must be consumed.
pub fn parse_color(s: &str) -> Option<([f32; 3], Option<f32>)> {
    let mut rest = s;
    let (rgb, alpha) = color_channels.parse_next(&mut rest).ok()?;
    skip_space(&mut rest);
    if !rest.is_empty() {
        return None;
    }
    let finite = rgb.iter().chain(alpha.iter()).all(|c| c.is_finite());
    finite.then_some((rgb, alpha))
}

// ─── Low-level parsers ──────────────────────────────────────────────────

fn vec2(input: &mut &str) -> ModalResult<Vec2> {
    skip_space(input);
    let x = number.parse_next(input)?;
    let _ = space1.parse_next(input)?;
    let y = number.parse_next(input)?;
    Ok(Vec2::new(x, y))
}

fn color_channels(input: &mut &str) -> ModalResult<([f32; 3], Option<f32>)> {
    skip_space(input);
    let r = number.parse_next(input)?;
    let _ = space1.parse_next(input)?;
    let g = number.parse_next(input)?;
    let _ = space1.parse_next(input)?;
    let b = number.parse_next(input)?;
    let a = opt(preceded(space1, number)).parse_next(input)?;
    Ok(([r, g, b], a))
}

fn number(input: &mut &str) -> ModalResult<f32> {
    float.parse_next(input)
}

/// Consume optional whitespace (concrete error type avoids inference issues).
fn skip_space(input: &mut &str) {
    let _: Result<&str, winnow::error::ErrMode<ContextError>> = multispace0.parse_next(input);
}

/// A number is complete when followed by end of input or whitespace.
fn ends_value(rest: &str) -> bool {
    rest.chars().next().is_none_or(char::is_whitespace)
}
