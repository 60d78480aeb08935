//! Pure geometry for rendering.
//!
//! All functions here are pure and testable without any I/O or images.
//! Pixel coverage is computed by supersampling each pixel on a 4×4 grid,
//! which is enough to give circles and rounded corners a soft edge at the
//! usual 8–20 px box sizes.

use super::params::PatternStyle;

/// Samples per axis when estimating pixel coverage.
const SUBSAMPLES: u32 = 4;

/// Dot diameter as a fraction of the cell.
pub const DOT_RATIO: f32 = 0.9;
/// Gapped square side as a fraction of the cell.
pub const GAP_RATIO: f32 = 0.8;
/// Bar thickness as a fraction of the cell.
pub const BAR_RATIO: f32 = 0.8;
/// Rounded square corner radius as a fraction of the cell.
pub const CORNER_RATIO: f32 = 0.25;

/// Canvas side in pixels: `(modules + 2·border) · box_size`, or `None` when
/// that does not fit a `u32`.
///
/// # Examples
/// ```
/// # use vcard_qr::imaging::calculations::canvas_side;
/// // Version 1 (21 modules), 4-module quiet zone, 10 px boxes → 290 px
/// assert_eq!(canvas_side(21, 4, 10), Some(290));
/// assert_eq!(canvas_side(21, u32::MAX / 2, 10), None);
/// ```
pub fn canvas_side(modules: usize, border: u32, box_size: u32) -> Option<u32> {
    let modules = u32::try_from(modules).ok()?;
    border
        .checked_mul(2)?
        .checked_add(modules)?
        .checked_mul(box_size)
}

/// Pixel position of the top-left corner of module `(x, y)`.
pub fn module_origin(x: usize, y: usize, border: u32, box_size: u32) -> (u32, u32) {
    (
        (x as u32 + border) * box_size,
        (y as u32 + border) * box_size,
    )
}

/// One nested square of a finder pattern, in module units relative to the
/// finder origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinderLayer {
    pub offset: usize,
    pub size: usize,
    /// Eye color when true, background color otherwise.
    pub eye: bool,
}

/// Layers of the canonical eye, painted in order: 7×7 eye, 5×5 background,
/// 3×3 eye.
pub const FINDER_LAYERS: [FinderLayer; 3] = [
    FinderLayer {
        offset: 0,
        size: 7,
        eye: true,
    },
    FinderLayer {
        offset: 1,
        size: 5,
        eye: false,
    },
    FinderLayer {
        offset: 2,
        size: 3,
        eye: true,
    },
];

/// Whether the point `(u, v)`, in pixels relative to the cell's top-left
/// corner, falls inside the shape for `style`.
fn inside_shape(style: PatternStyle, u: f32, v: f32, cell: f32) -> bool {
    match style {
        PatternStyle::Square => (0.0..cell).contains(&u) && (0.0..cell).contains(&v),
        PatternStyle::Gapped => {
            let inset = cell * (1.0 - GAP_RATIO) / 2.0;
            (inset..cell - inset).contains(&u) && (inset..cell - inset).contains(&v)
        }
        PatternStyle::Dots => {
            let r = cell * DOT_RATIO / 2.0;
            let c = cell / 2.0;
            (u - c).powi(2) + (v - c).powi(2) <= r * r
        }
        PatternStyle::Rounded => rounded_rect_contains(u, v, cell, cell * CORNER_RATIO),
        PatternStyle::VerticalBars => {
            let inset = cell * (1.0 - BAR_RATIO) / 2.0;
            (inset..cell - inset).contains(&u) && (0.0..cell).contains(&v)
        }
        PatternStyle::HorizontalBars => {
            let inset = cell * (1.0 - BAR_RATIO) / 2.0;
            (0.0..cell).contains(&u) && (inset..cell - inset).contains(&v)
        }
    }
}

fn rounded_rect_contains(u: f32, v: f32, side: f32, r: f32) -> bool {
    if !(0.0..side).contains(&u) || !(0.0..side).contains(&v) {
        return false;
    }
    // Nearest point of the inner rectangle whose offset by r forms the shape.
    let cx = u.clamp(r, side - r);
    let cy = v.clamp(r, side - r);
    (u - cx).powi(2) + (v - cy).powi(2) <= r * r
}

/// Fraction of pixel `(px, py)` inside a cell of `box_size` covered by the
/// module shape.
pub fn module_coverage(style: PatternStyle, px: u32, py: u32, box_size: u32) -> f32 {
    if style == PatternStyle::Square {
        return 1.0;
    }
    let cell = box_size as f32;
    coverage(px, py, |u, v| inside_shape(style, u, v, cell))
}

/// Antialiased alpha of pixel `(px, py)` for a circle inscribed in a
/// `width × height` image.
pub fn circle_mask_coverage(px: u32, py: u32, width: u32, height: u32) -> f32 {
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let r = width.min(height) as f32 / 2.0;
    coverage(px, py, |u, v| (u - cx).powi(2) + (v - cy).powi(2) <= r * r)
}

fn coverage(px: u32, py: u32, inside: impl Fn(f32, f32) -> bool) -> f32 {
    let step = 1.0 / SUBSAMPLES as f32;
    let mut hits = 0u32;
    for sy in 0..SUBSAMPLES {
        for sx in 0..SUBSAMPLES {
            let u = px as f32 + (sx as f32 + 0.5) * step;
            let v = py as f32 + (sy as f32 + 0.5) * step;
            if inside(u, v) {
                hits += 1;
            }
        }
    }
    hits as f32 / (SUBSAMPLES * SUBSAMPLES) as f32
}

/// Centered logo square on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoPlacement {
    pub x: u32,
    pub y: u32,
    pub side: u32,
}

/// Place a logo of `fraction` × the shorter canvas side at the center.
///
/// Returns `None` when the logo would round down to zero pixels.
pub fn logo_placement(canvas_width: u32, canvas_height: u32, fraction: f32) -> Option<LogoPlacement> {
    let side = (canvas_width.min(canvas_height) as f32 * fraction) as u32;
    if side == 0 {
        return None;
    }
    Some(LogoPlacement {
        x: (canvas_width - side) / 2,
        y: (canvas_height - side) / 2,
        side,
    })
}
