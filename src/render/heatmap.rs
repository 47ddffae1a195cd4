use std::sync::Arc;

use crate::{
    density::normalize::NormalizedGrid,
    foundation::{
        core::{Raster, Rect},
        error::{GazemapError, GazemapResult},
        math::premul_u8,
    },
    render::composite::composite_over,
};

/// Hue used for heat cells, straight RGB.
pub const HEAT_RGB: [u8; 3] = [255, 0, 0];

/// Rasterize `normalized` into a transparent `width × height` layer.
///
/// Cell `(i, j)` covers pixels `[j·s, (j+1)·s) × [i·s, (i+1)·s)` clipped to the
/// layer, filled with `rgb` at alpha equal to the cell intensity. Pixels past
/// the last whole cell stay transparent.
pub fn heatmap_layer(
    normalized: &NormalizedGrid,
    spacing: f64,
    width: u32,
    height: u32,
    rgb: [u8; 3],
) -> GazemapResult<Raster> {
    if !spacing.is_finite() || spacing <= 0.0 {
        return Err(GazemapError::invalid_parameter(format!(
            "grid spacing must be finite and > 0, got {spacing}"
        )));
    }

    let mut layer = Raster::transparent(width, height);
    let bounds = layer.bounds();
    let stride = width as usize * 4;
    let px = Arc::make_mut(&mut layer.rgba8_premul);

    for row in 0..normalized.grid_h {
        for col in 0..normalized.grid_w {
            let alpha = normalized.get(row, col).unwrap_or(0);
            if alpha == 0 {
                continue;
            }
            let cell = Rect::new(
                col as f64 * spacing,
                row as f64 * spacing,
                (col + 1) as f64 * spacing,
                (row + 1) as f64 * spacing,
            )
            .intersect(bounds);
            if cell.is_zero_area() {
                continue;
            }

            let color = [
                premul_u8(rgb[0], alpha),
                premul_u8(rgb[1], alpha),
                premul_u8(rgb[2], alpha),
                alpha,
            ];
            let (x0, x1) = (cell.x0 as usize, cell.x1 as usize);
            for y in cell.y0 as usize..cell.y1 as usize {
                let line = &mut px[y * stride + x0 * 4..y * stride + x1 * 4];
                for dst in line.chunks_exact_mut(4) {
                    dst.copy_from_slice(&color);
                }
            }
        }
    }
    Ok(layer)
}

/// Composite a red heat layer for `normalized` over `background`.
///
/// Returns a new raster; `background` is left as-is.
pub fn render(
    normalized: &NormalizedGrid,
    spacing: f64,
    background: &Raster,
) -> GazemapResult<Raster> {
    render_with_color(normalized, spacing, background, HEAT_RGB)
}

/// [`render`] with a caller-chosen hue.
pub fn render_with_color(
    normalized: &NormalizedGrid,
    spacing: f64,
    background: &Raster,
    rgb: [u8; 3],
) -> GazemapResult<Raster> {
    let layer = heatmap_layer(
        normalized,
        spacing,
        background.width,
        background.height,
        rgb,
    )?;
    composite_over(background, &layer)
}

#[cfg(test)]
#[path = "../../tests/unit/render/heatmap.rs"]
mod tests;
