use super::*;

#[test]
fn raster_new_rejects_wrong_length() {
    assert!(Raster::new(2, 2, vec![0u8; 16]).is_ok());
    assert!(Raster::new(2, 2, vec![0u8; 15]).is_err());
}

#[test]
fn solid_premultiplies_color() {
    let r = Raster::solid(1, 1, [200, 100, 0, 128]);
    let px = r.pixel(0, 0).unwrap();
    assert_eq!(px[3], 128);
    assert_eq!(px[0], ((200u16 * 128 + 127) / 255) as u8);
    assert_eq!(px[1], ((100u16 * 128 + 127) / 255) as u8);
    assert_eq!(px[2], 0);
}

#[test]
fn pixel_out_of_bounds_is_none() {
    let r = Raster::solid(3, 2, [255, 255, 255, 255]);
    assert!(r.pixel(2, 1).is_some());
    assert!(r.pixel(3, 0).is_none());
    assert!(r.pixel(0, 2).is_none());
}

#[test]
fn fingerprint_tracks_pixels_and_shape() {
    let a = Raster::solid(4, 4, [255, 255, 255, 255]);
    let b = Raster::solid(4, 4, [255, 255, 255, 255]);
    let c = Raster::solid(4, 4, [255, 0, 255, 255]);
    let d = Raster::solid(2, 8, [255, 255, 255, 255]);
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.fingerprint(), c.fingerprint());
    assert_ne!(a.fingerprint(), d.fingerprint());
}
