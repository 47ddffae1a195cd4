use std::sync::Arc;

use crate::foundation::{
    error::{GazemapError, GazemapResult},
    math::{Fnv1a64, premul_u8},
};

pub use kurbo::{Point, Rect};

/// Row-major premultiplied RGBA8 raster.
///
/// Pixel data sits behind an `Arc` so a background can be shared by many
/// in-flight renders without copying; renderers never write into it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl Raster {
    /// Wrap premultiplied RGBA8 bytes, checking the length against the dimensions.
    pub fn new(width: u32, height: u32, rgba8_premul: Vec<u8>) -> GazemapResult<Self> {
        let expected = byte_len(width, height)?;
        if rgba8_premul.len() != expected {
            return Err(GazemapError::invalid_parameter(format!(
                "raster {width}x{height} expects {expected} bytes, got {}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Raster filled with one straight-alpha color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let a = rgba[3];
        let px = [
            premul_u8(rgba[0], a),
            premul_u8(rgba[1], a),
            premul_u8(rgba[2], a),
            a,
        ];
        let count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            rgba8_premul: Arc::new(px.repeat(count)),
        }
    }

    /// Fully transparent raster.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::solid(width, height, [0, 0, 0, 0])
    }

    /// Premultiplied pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.rgba8_premul.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Pixel bounds as a rectangle anchored at the origin.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// FNV-1a digest over dimensions and pixel bytes.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        h.write_u32(self.width);
        h.write_u32(self.height);
        h.write_bytes(&self.rgba8_premul);
        h.finish()
    }
}

pub(crate) fn byte_len(width: u32, height: u32) -> GazemapResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| GazemapError::invalid_parameter("raster buffer size overflow"))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
