use std::{
    sync::{Barrier, atomic::AtomicUsize},
    thread,
    time::Duration,
};

use super::*;
use crate::foundation::error::GazemapError;

fn artifact(key: &EstimationKey, shade: u8) -> RenderedArtifact {
    let raster = Raster::solid(4, 4, [shade, shade, shade, 255]);
    RenderedArtifact {
        key: key.clone(),
        fingerprint: raster.fingerprint(),
        raster,
        algorithm: Algorithm::BoundedRadius,
        point_count: 1,
        grid_size: (1, 1),
    }
}

#[test]
fn key_quantizes_float_noise() {
    let a = EstimationKey::new("p1", 10.0, 15.0).unwrap();
    let b = EstimationKey::new("p1", 10.000_000_000_1, 14.999_999_999_9).unwrap();
    let c = EstimationKey::new("p1", 10.5, 15.0).unwrap();
    let d = EstimationKey::new("p2", 10.0, 15.0).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, d);
    assert_eq!(a.bandwidth(), 10.0);
    assert_eq!(a.grid_spacing(), 15.0);
    assert_eq!(c.file_stem(), "heatmap_p1_10.5_15");
}

#[test]
fn hit_skips_compute() {
    let cache = ArtifactCache::new();
    let key = EstimationKey::new("p1", 10.0, 10.0).unwrap();
    let calls = AtomicUsize::new(0);

    let first = cache
        .get_or_compute(&key, || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(artifact(&key, 10))
        })
        .unwrap();
    let second = cache
        .get_or_compute(&key, || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(artifact(&key, 99))
        })
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.raster.pixel(0, 0), Some([10, 10, 10, 255]));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.computations(), 1);
}

#[test]
fn failures_are_not_cached() {
    let cache = ArtifactCache::new();
    let key = EstimationKey::new("p1", 10.0, 10.0).unwrap();

    let err = cache
        .get_or_compute(&key, || Err(GazemapError::no_data("p1")))
        .unwrap_err();
    assert!(matches!(err, GazemapError::NoData(_)));
    assert!(cache.get(&key).is_none());
    assert!(cache.is_empty());

    let ok = cache.get_or_compute(&key, || Ok(artifact(&key, 1))).unwrap();
    assert_eq!(ok.key, key);
    assert_eq!(cache.computations(), 2);
    assert!(cache.get(&key).is_some());
}

#[test]
fn errors_pass_through_unchanged() {
    let cache = ArtifactCache::new();
    let key = EstimationKey::new("p9", 1.0, 1.0).unwrap();
    let err = cache
        .get_or_compute(&key, || Err(GazemapError::missing_background("p9")))
        .unwrap_err();
    assert_eq!(err.to_string(), "missing background for surface 'p9'");
}

#[test]
fn distinct_keys_compute_independently() {
    let cache = ArtifactCache::new();
    let a = EstimationKey::new("p1", 10.0, 10.0).unwrap();
    let b = EstimationKey::new("p1", 20.0, 10.0).unwrap();
    cache.get_or_compute(&a, || Ok(artifact(&a, 1))).unwrap();
    cache.get_or_compute(&b, || Ok(artifact(&b, 2))).unwrap();
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.computations(), 2);
}

#[test]
fn concurrent_requests_compute_once() {
    let cache = Arc::new(ArtifactCache::new());
    let key = EstimationKey::new("p1", 10.0, 10.0).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let key = key.clone();
            let calls = Arc::clone(&calls);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cache
                    .get_or_compute(&key, || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(50));
                        Ok(artifact(&key, 7))
                    })
                    .unwrap()
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    for r in &results {
        assert!(Arc::ptr_eq(r, &results[0]));
    }
}

#[test]
fn key_rejects_values_outside_quantized_range() {
    for (b, s) in [
        (1e-7, 10.0),
        (10.0, 4e-7),
        (0.0, 10.0),
        (1e13, 10.0),
        (10.0, f64::INFINITY),
        (f64::NAN, 10.0),
    ] {
        assert!(matches!(
            EstimationKey::new("p1", b, s),
            Err(GazemapError::InvalidParameter(_))
        ));
    }
    let smallest = EstimationKey::new("p1", 1e-6, 1e-6).unwrap();
    assert_eq!(smallest.bandwidth(), 1e-6);
}

#[test]
fn file_stem_keeps_surface_inside_directory() {
    let key = EstimationKey::new("../../etc/x", 5.0, 4.0).unwrap();
    let stem = key.file_stem();
    assert_eq!(stem, "heatmap_______etc_x_5_4");
    assert!(!stem.contains(['/', '\\']));
    assert_eq!(key.surface_id(), "../../etc/x");

    let plain = EstimationKey::new("page-2_b", 2.5, 4.0).unwrap();
    assert_eq!(plain.file_stem(), "heatmap_page-2_b_2.5_4");
}

#[test]
fn failed_compute_leaves_no_slot() {
    let cache = ArtifactCache::new();
    for id in ["a", "b", "c"] {
        let key = EstimationKey::new(id, 10.0, 10.0).unwrap();
        assert!(cache
            .get_or_compute(&key, || Err(GazemapError::no_data(id)))
            .is_err());
    }
    assert_eq!(cache.slot_count(), 0);
    assert_eq!(cache.computations(), 3);
}

#[test]
fn waiters_retry_after_a_failed_compute() {
    let cache = Arc::new(ArtifactCache::new());
    let key = EstimationKey::new("p1", 10.0, 10.0).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(6));

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let key = key.clone();
            let calls = Arc::clone(&calls);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cache.get_or_compute(&key, || {
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        thread::sleep(Duration::from_millis(50));
                        return Err(GazemapError::no_data("p1"));
                    }
                    Ok(artifact(&key, 3))
                })
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let ok: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(results.len() - ok.len(), 1);
    for r in &ok {
        assert!(Arc::ptr_eq(*r, ok[0]));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.slot_count(), 1);
}
