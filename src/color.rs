//! Color string parsing for gradient stops.
//!
//! Accepts CSS named colors (the basic set plus a few common extras),
//! `#RGB`, `#RRGGBB`, `#RRGGBBAA`, `rgb(r,g,b)` and `rgba(r,g,b,a)` where `a`
//! is 0.0-1.0.

use crate::error::{Error, Result};
use crate::types::Rgba;

const NAMED: &[(&str, Rgba)] = &[
    ("black", Rgba::opaque(0, 0, 0)),
    ("silver", Rgba::opaque(192, 192, 192)),
    ("gray", Rgba::opaque(128, 128, 128)),
    ("grey", Rgba::opaque(128, 128, 128)),
    ("white", Rgba::opaque(255, 255, 255)),
    ("maroon", Rgba::opaque(128, 0, 0)),
    ("red", Rgba::opaque(255, 0, 0)),
    ("purple", Rgba::opaque(128, 0, 128)),
    ("fuchsia", Rgba::opaque(255, 0, 255)),
    ("magenta", Rgba::opaque(255, 0, 255)),
    ("green", Rgba::opaque(0, 128, 0)),
    ("lime", Rgba::opaque(0, 255, 0)),
    ("olive", Rgba::opaque(128, 128, 0)),
    ("yellow", Rgba::opaque(255, 255, 0)),
    ("navy", Rgba::opaque(0, 0, 128)),
    ("blue", Rgba::opaque(0, 0, 255)),
    ("teal", Rgba::opaque(0, 128, 128)),
    ("aqua", Rgba::opaque(0, 255, 255)),
    ("cyan", Rgba::opaque(0, 255, 255)),
    ("orange", Rgba::opaque(255, 165, 0)),
    ("transparent", Rgba::TRANSPARENT),
];

/// Parse a color string into an [`Rgba`].
pub fn parse_color(s: &str) -> Result<Rgba> {
    let s = s.trim();

    if s.starts_with('#') {
        return parse_hex(s).ok_or_else(|| Error::Color(format!("invalid hex color: {s}")));
    }

    let lower = s.to_ascii_lowercase();
    if lower.starts_with("rgba(") || lower.starts_with("rgb(") {
        return parse_rgb_fn(&lower).ok_or_else(|| Error::Color(format!("invalid rgb color: {s}")));
    }

    NAMED
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, c)| *c)
        .ok_or_else(|| Error::Color(format!("unrecognized color: {s}")))
}

fn parse_hex(s: &str) -> Option<Rgba> {
    let hex = s.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            let nib = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
            Some(Rgba::opaque(nib(0)?, nib(1)?, nib(2)?))
        }
        6 => Some(Rgba::opaque(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn parse_rgb_fn(s: &str) -> Option<Rgba> {
    let open = s.find('(')?;
    let inner = s[open + 1..].strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();

    let channel = |p: &str| p.parse::<u16>().ok().filter(|v| *v <= 255).map(|v| v as u8);
    match *parts.as_slice() {
        [r, g, b] => Some(Rgba::opaque(channel(r)?, channel(g)?, channel(b)?)),
        [r, g, b, a] => {
            let a: f32 = a.parse().ok()?;
            if !(0.0..=1.0).contains(&a) {
                return None;
            }
            Some(Rgba::new(channel(r)?, channel(g)?, channel(b)?, (a * 255.0).round() as u8))
        }
        _ => None,
    }
}
