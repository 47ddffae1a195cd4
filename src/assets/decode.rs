use std::{io::Cursor, path::Path};

use anyhow::Context;

use crate::foundation::{
    core::Raster,
    error::GazemapResult,
    math::{premul_u8, unpremul_u8},
};

/// Decode encoded image bytes into a premultiplied RGBA8 [`Raster`].
///
/// Any still format the `image` crate understands is accepted; images without
/// an alpha channel come out opaque.
pub fn decode_raster(bytes: &[u8]) -> GazemapResult<Raster> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    Raster::new(width, height, rgba8_premul)
}

/// Read and decode an image file.
pub fn load_raster_file(path: &Path) -> GazemapResult<Raster> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_raster(&bytes)
}

/// Encode a raster as PNG with straight (non-premultiplied) alpha.
pub fn encode_png(raster: &Raster) -> GazemapResult<Vec<u8>> {
    let mut straight = raster.rgba8_premul.as_ref().clone();
    unpremultiply_rgba8_in_place(&mut straight);
    let img = image::RgbaImage::from_raw(raster.width, raster.height, straight)
        .context("raster buffer does not match its dimensions")?;

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

/// Encode `raster` as PNG and write it to `path`, creating parent directories.
pub fn write_png(raster: &Raster, path: &Path) -> GazemapResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let bytes = encode_png(raster)?;
    std::fs::write(path, bytes).with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3];
        px[0] = premul_u8(px[0], a);
        px[1] = premul_u8(px[1], a);
        px[2] = premul_u8(px[2], a);
    }
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3];
        if a == 255 {
            continue;
        }
        px[0] = unpremul_u8(px[0], a);
        px[1] = unpremul_u8(px[1], a);
        px[2] = unpremul_u8(px[2], a);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
