use super::*;
use crate::assets::decode::write_png;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_backgrounds").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn dir_backgrounds_load_png_by_surface_id() {
    let dir = scratch_dir("load");
    let raster = Raster::solid(6, 4, [255, 255, 255, 255]);
    write_png(&raster, &dir.join("p1.png")).unwrap();

    let source = DirBackgrounds::new(&dir);
    assert_eq!(source.root(), dir.as_path());
    let loaded = source.load_background("p1").unwrap().unwrap();
    assert_eq!(*loaded, raster);
    assert!(source.load_background("p2").unwrap().is_none());
}

#[test]
fn dir_backgrounds_reject_path_escapes() {
    let dir = scratch_dir("escape");
    let source = DirBackgrounds::new(dir.join("inner"));
    for id in ["", ".", "..", "../load/p1", "a/b", "a\\b"] {
        assert!(source.load_background(id).unwrap().is_none(), "id {id:?}");
    }
}

#[test]
fn corrupt_background_is_an_error() {
    let dir = scratch_dir("corrupt");
    std::fs::write(dir.join("bad.png"), b"nope").unwrap();
    let source = DirBackgrounds::new(&dir);
    assert!(source.load_background("bad").is_err());
}

#[test]
fn memory_backgrounds_insert_and_replace() {
    let source = MemoryBackgrounds::new();
    assert!(source.load_background("p1").unwrap().is_none());

    source.insert("p1", Raster::solid(2, 2, [0, 0, 0, 255]));
    source.insert("p1", Raster::solid(3, 3, [0, 0, 0, 255]));
    let got = source.load_background("p1").unwrap().unwrap();
    assert_eq!((got.width, got.height), (3, 3));
}
