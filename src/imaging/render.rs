//! Styled rasterization of a QR matrix.
//!
//! ## Paint order
//!
//! 1. Fill the whole canvas with the background color (quiet zone included).
//! 2. For every dark module outside the three finder zones, paint the
//!    [`PatternStyle`](super::params::PatternStyle) shape in the module color.
//!    Light modules are left untouched.
//! 3. Paint each finder zone as the canonical eye (7×7 eye color, 5×5
//!    background, 3×3 eye color), ignoring the zone's actual module values.
//!
//! Finder zones are structurally identical in every symbol, which is what
//! lets them carry a separate brand color without affecting decodability.

use super::calculations::{FINDER_LAYERS, canvas_side, module_coverage, module_origin};
use super::params::{Color, PatternStyle};
use crate::config::Design;
use crate::error::ValidationError;
use crate::matrix::QrMatrix;
use image::RgbImage;

/// Render `matrix` with the colors, style and geometry of `design`.
///
/// Fails only when the canvas side would not fit a `u32`, which validated
/// designs cannot reach.
pub fn render(matrix: &QrMatrix, design: &Design) -> Result<RgbImage, ValidationError> {
    let box_size = design.box_size;
    let border = design.border;
    let side = canvas_side(matrix.width(), border, box_size).ok_or(
        ValidationError::CanvasSize {
            modules: matrix.width(),
            border,
            box_size,
        },
    )?;
    let mut canvas = RgbImage::from_pixel(side, side, design.background_color.rgb());

    let cell_mask = cell_coverage_mask(design.pattern_style, box_size);

    for y in 0..matrix.width() {
        for x in 0..matrix.width() {
            if !matrix.is_dark(x, y) || matrix.in_finder_zone(x, y) {
                continue;
            }
            let (ox, oy) = module_origin(x, y, border, box_size);
            paint_cell(
                &mut canvas,
                (ox, oy),
                box_size,
                &cell_mask,
                design.module_color,
                design.background_color,
            );
        }
    }

    for (fx, fy) in matrix.finder_origins() {
        for layer in FINDER_LAYERS {
            let color = if layer.eye {
                design.eye_color
            } else {
                design.background_color
            };
            let (px, py) = module_origin(fx + layer.offset, fy + layer.offset, border, box_size);
            fill_rect(&mut canvas, px, py, layer.size as u32 * box_size, color);
        }
    }

    Ok(canvas)
}

/// Per-pixel coverage for one cell, row-major. Every dark module shares the
/// same shape, so it is computed once per render.
fn cell_coverage_mask(style: PatternStyle, box_size: u32) -> Vec<f32> {
    (0..box_size)
        .flat_map(|py| (0..box_size).map(move |px| module_coverage(style, px, py, box_size)))
        .collect()
}

fn paint_cell(
    canvas: &mut RgbImage,
    (ox, oy): (u32, u32),
    box_size: u32,
    mask: &[f32],
    color: Color,
    background: Color,
) {
    for py in 0..box_size {
        for px in 0..box_size {
            let coverage = mask[(py * box_size + px) as usize];
            if coverage <= 0.0 {
                continue;
            }
            let shade = color.blend_over(background, coverage);
            canvas.put_pixel(ox + px, oy + py, shade.rgb());
        }
    }
}

fn fill_rect(canvas: &mut RgbImage, x: u32, y: u32, side: u32, color: Color) {
    let pixel = color.rgb();
    for py in y..y + side {
        for px in x..x + side {
            canvas.put_pixel(px, py, pixel);
        }
    }
}
