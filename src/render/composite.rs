use crate::foundation::{
    core::Raster,
    error::{GazemapError, GazemapResult},
    math::mul_div255_u8,
};

/// Premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over for premultiplied pixels: `src + dst * (1 - src.a)`.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Composite `layer` over `background` into a new raster.
///
/// `background` is only read, so one decoded background can serve many
/// concurrent renders.
pub fn composite_over(background: &Raster, layer: &Raster) -> GazemapResult<Raster> {
    if background.width != layer.width || background.height != layer.height {
        return Err(GazemapError::invalid_parameter(format!(
            "layer {}x{} does not match background {}x{}",
            layer.width, layer.height, background.width, background.height
        )));
    }

    let mut out = background.rgba8_premul.as_ref().clone();
    for (d, s) in out.chunks_exact_mut(4).zip(layer.rgba8_premul.chunks_exact(4)) {
        let px = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&px);
    }
    Raster::new(background.width, background.height, out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
