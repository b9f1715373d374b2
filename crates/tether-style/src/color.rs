#![forbid(unsafe_code)]

//! RGBA color primitive with HTML color-string parsing.
//!
//! Accepted inputs for [`Rgba::parse_html`]:
//!
//! | Form | Example |
//! |------|---------|
//! | `#RGB` / `RGB` | `#f0a` |
//! | `#RGBA` / `RGBA` | `#f0a8` |
//! | `#RRGGBB` / `RRGGBB` | `#ff00aa` |
//! | `#RRGGBBAA` / `RRGGBBAA` | `#ff00aa80` |
//! | named | `red`, `teal`, `lightblue` |
//!
//! Short forms expand each nibble (`f` → `ff`). Forms without an alpha
//! component are fully opaque. [`Rgba::to_hex_rgba`] always emits eight
//! uppercase hex digits without a `#`, and `parse_html` accepts that output
//! back unchanged.

use std::fmt;

/// A packed 8-bit-per-channel RGBA color (`0xRRGGBBAA`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgba(pub u32);

impl Rgba {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const CLEAR: Self = Self::rgba(0, 0, 0, 0);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    #[must_use]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[must_use]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[must_use]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[must_use]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Same color with a different alpha channel.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::rgba(self.r(), self.g(), self.b(), a)
    }

    /// Channels as floats in `0.0..=1.0`.
    #[must_use]
    pub fn to_f32(self) -> [f32; 4] {
        [self.r(), self.g(), self.b(), self.a()].map(|c| f32::from(c) / 255.0)
    }

    /// Build from float channels, clamping to `0.0..=1.0`.
    #[must_use]
    pub fn from_f32(r: f32, g: f32, b: f32, a: f32) -> Self {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgba(q(r), q(g), q(b), q(a))
    }

    /// Parse an HTML color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`,
    /// a color name, or bare `RRGGBBAA` as written by
    /// [`to_hex_rgba`](Self::to_hex_rgba).
    ///
    /// Shorter hex needs the `#`, so words like `add` or `face` are not
    /// colors. Returns `None` for anything that is not a recognized form.
    #[must_use]
    pub fn parse_html(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        if let Some(hex) = input.strip_prefix('#') {
            return parse_hex(hex);
        }
        named(input).or_else(|| {
            if input.len() == 8 {
                parse_hex(input)
            } else {
                None
            }
        })
    }

    /// `RRGGBBAA`, eight uppercase hex digits.
    #[must_use]
    pub fn to_hex_rgba(self) -> String {
        format!("{:08X}", self.0)
    }

    /// `RRGGBB`, six uppercase hex digits (alpha dropped).
    #[must_use]
    pub fn to_hex_rgb(self) -> String {
        format!("{:06X}", self.0 >> 8)
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Debug for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rgba(#{})", self.to_hex_rgba())
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RGBA({}, {}, {}, {})",
            self.r(),
            self.g(),
            self.b(),
            self.a()
        )
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|n| n * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Rgba::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Rgba::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn named(name: &str) -> Option<Rgba> {
    let color = match name.to_ascii_lowercase().as_str() {
        "red" => Rgba::rgb(255, 0, 0),
        "cyan" | "aqua" => Rgba::rgb(0, 255, 255),
        "blue" => Rgba::rgb(0, 0, 255),
        "darkblue" => Rgba::rgb(0, 0, 160),
        "lightblue" => Rgba::rgb(173, 216, 230),
        "purple" => Rgba::rgb(128, 0, 128),
        "yellow" => Rgba::rgb(255, 255, 0),
        "lime" => Rgba::rgb(0, 255, 0),
        "fuchsia" | "magenta" => Rgba::rgb(255, 0, 255),
        "white" => Rgba::WHITE,
        "silver" => Rgba::rgb(192, 192, 192),
        "grey" | "gray" => Rgba::rgb(128, 128, 128),
        "black" => Rgba::BLACK,
        "orange" => Rgba::rgb(255, 165, 0),
        "brown" => Rgba::rgb(165, 42, 42),
        "maroon" => Rgba::rgb(128, 0, 0),
        "green" => Rgba::rgb(0, 128, 0),
        "olive" => Rgba::rgb(128, 128, 0),
        "navy" => Rgba::rgb(0, 0, 128),
        "teal" => Rgba::rgb(0, 128, 128),
        "transparent" | "clear" => Rgba::CLEAR,
        _ => return None,
    };
    Some(color)
}
