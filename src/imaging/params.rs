//! Parameter types for rendering.
//!
//! These describe *what* to draw, not *how*. They are produced by design
//! validation ([`DesignOptions::validate`](crate::config::DesignOptions::validate))
//! and consumed by the renderer and logo compositor.
//!
//! ## Types
//!
//! - [`Color`]: opaque RGB parsed from `#RRGGBB` / `RRGGBB`.
//! - [`PatternStyle`]: closed set of data-module shapes.
//! - [`LogoParams`]: where the logo comes from and how it is prepared.

use std::fmt;
use std::str::FromStr;

/// Opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const WHITE: Color = Color([255, 255, 255]);
    pub const BLACK: Color = Color([0, 0, 0]);

    pub fn rgb(self) -> image::Rgb<u8> {
        image::Rgb(self.0)
    }

    /// Mix `self` over `under` with `coverage` in 0.0..=1.0.
    pub fn blend_over(self, under: Color, coverage: f32) -> Color {
        let a = coverage.clamp(0.0, 1.0);
        let mix = |top: u8, bottom: u8| -> u8 {
            (top as f32 * a + bottom as f32 * (1.0 - a)).round() as u8
        };
        Color([
            mix(self.0[0], under.0[0]),
            mix(self.0[1], under.0[1]),
            mix(self.0[2], under.0[2]),
        ])
    }
}

impl FromStr for Color {
    type Err = ();

    /// Accepts exactly six hex digits, optionally prefixed by `#`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ());
        Ok(Color([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

/// Shape drawn for each dark data module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternStyle {
    /// Full cell.
    Square,
    /// Rounded-corner square filling the cell.
    Rounded,
    /// Circle at 90% of the cell.
    Dots,
    /// Centered square at 80% of the cell.
    Gapped,
    /// Bars 80% wide, full height; vertical neighbours fuse.
    VerticalBars,
    /// Bars 80% tall, full width; horizontal neighbours fuse.
    HorizontalBars,
}

impl PatternStyle {
    pub fn name(self) -> &'static str {
        match self {
            PatternStyle::Square => "square",
            PatternStyle::Rounded => "rounded",
            PatternStyle::Dots => "dots",
            PatternStyle::Gapped => "gapped",
            PatternStyle::VerticalBars => "vertical",
            PatternStyle::HorizontalBars => "horizontal",
        }
    }
}

impl FromStr for PatternStyle {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "square" => Ok(PatternStyle::Square),
            "rounded" => Ok(PatternStyle::Rounded),
            "dots" | "circle" | "circular" => Ok(PatternStyle::Dots),
            "gapped" | "special" => Ok(PatternStyle::Gapped),
            "vertical" => Ok(PatternStyle::VerticalBars),
            "horizontal" => Ok(PatternStyle::HorizontalBars),
            _ => Err(()),
        }
    }
}

/// Logo preparation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LogoParams {
    /// Local path or `http(s)` URL.
    pub location: String,
    /// Logo side as a fraction of the canvas width, in (0, 1).
    pub size: f32,
    /// Flatten onto an opaque white square before placement.
    pub background: bool,
    /// Apply a circular alpha mask.
    pub round: bool,
}
