use super::*;

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [0, 0, 0, 0];
    assert_eq!(over(dst, src), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [255, 255, 255, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src), src);
}

#[test]
fn over_dst_transparent_returns_src() {
    let dst = [0, 0, 0, 0];
    let src = [100, 0, 0, 100];
    assert_eq!(over(dst, src), src);
}

#[test]
fn half_red_over_white_tints() {
    let white = [255, 255, 255, 255];
    let red_half = [128, 0, 0, 128];
    let out = over(white, red_half);
    assert_eq!(out[0], 255);
    assert_eq!(out[3], 255);
    assert_eq!(out[1], 127);
    assert_eq!(out[2], 127);
}

#[test]
fn composite_leaves_background_untouched() {
    let bg = Raster::solid(2, 2, [255, 255, 255, 255]);
    let before = bg.clone();
    let mut layer_px = vec![0u8; 16];
    layer_px[0..4].copy_from_slice(&[200, 0, 0, 200]);
    let layer = Raster::new(2, 2, layer_px).unwrap();

    let out = composite_over(&bg, &layer).unwrap();
    assert_eq!(bg, before);
    assert_eq!(out.pixel(0, 0), Some([255, 55, 55, 255]));
    assert_eq!(out.pixel(1, 1), Some([255, 255, 255, 255]));
}

#[test]
fn composite_rejects_mismatched_sizes() {
    let bg = Raster::solid(2, 2, [255, 255, 255, 255]);
    let layer = Raster::transparent(3, 2);
    assert!(composite_over(&bg, &layer).is_err());
}
