use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::{
    density::estimate::Algorithm,
    foundation::{
        core::Raster,
        error::{GazemapError, GazemapResult},
    },
};

const MICROS: f64 = 1_000_000.0;

/// Cache identity of one heatmap: surface plus estimation parameters.
///
/// Bandwidth and spacing are quantized to millionths, so values that differ
/// only by float noise (`10.0` vs `10.0000000001`) address the same artifact.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EstimationKey {
    surface_id: String,
    bandwidth_micros: i64,
    spacing_micros: i64,
}

impl EstimationKey {
    /// Build a key, quantizing `bandwidth` and `grid_spacing`.
    ///
    /// # Errors
    /// [`GazemapError::InvalidParameter`] when either value rounds to zero
    /// millionths or does not fit the quantized range.
    pub fn new(
        surface_id: impl Into<String>,
        bandwidth: f64,
        grid_spacing: f64,
    ) -> GazemapResult<Self> {
        Ok(Self {
            surface_id: surface_id.into(),
            bandwidth_micros: quantize("bandwidth", bandwidth)?,
            spacing_micros: quantize("grid spacing", grid_spacing)?,
        })
    }

    /// Surface this key belongs to.
    pub fn surface_id(&self) -> &str {
        &self.surface_id
    }

    /// Quantized bandwidth.
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth_micros as f64 / MICROS
    }

    /// Quantized grid spacing.
    pub fn grid_spacing(&self) -> f64 {
        self.spacing_micros as f64 / MICROS
    }

    /// File stem for a persisted copy: `heatmap_{surface}_{bandwidth}_{spacing}`.
    ///
    /// Characters of the surface id other than ASCII alphanumerics, `-` and `_`
    /// become `_`, so the stem never names another directory.
    pub fn file_stem(&self) -> String {
        let surface: String = self
            .surface_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!(
            "heatmap_{surface}_{}_{}",
            self.bandwidth(),
            self.grid_spacing()
        )
    }
}

fn quantize(name: &str, v: f64) -> GazemapResult<i64> {
    let q = (v * MICROS).round();
    // `i64::MAX as f64` is 2^63, so `q` below it converts exactly.
    if !q.is_finite() || q < 1.0 || q >= i64::MAX as f64 {
        return Err(GazemapError::invalid_parameter(format!(
            "{name} must be between 1e-6 and {:e}, got {v}",
            i64::MAX as f64 / MICROS
        )));
    }
    Ok(q as i64)
}

/// Composited heatmap plus the inputs it was built from.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedArtifact {
    /// Key the artifact was computed for.
    pub key: EstimationKey,
    /// Background with the heat layer composited on top.
    pub raster: Raster,
    /// Estimator used.
    pub algorithm: Algorithm,
    /// Number of points in the surface snapshot.
    pub point_count: usize,
    /// Grid dimensions `(grid_w, grid_h)`.
    pub grid_size: (usize, usize),
    /// FNV-1a digest of `raster`.
    pub fingerprint: u64,
}

type Slot = Arc<Mutex<Option<Arc<RenderedArtifact>>>>;

/// Memoizes rendered artifacts by [`EstimationKey`] for the life of the cache.
///
/// Each key has its own slot lock. Concurrent requests for one key queue on
/// that lock, so only the first runs `compute`; the rest wake up to the stored
/// result. Failures are returned to the caller that hit them and drop the
/// slot, so the next request retries and failed keys take no space.
///
/// Nothing is ever evicted or invalidated: points appended after a key was
/// computed do not change its artifact.
#[derive(Debug, Default)]
pub struct ArtifactCache {
    slots: Mutex<HashMap<EstimationKey, Slot>>,
    computations: AtomicU64,
}

impl ArtifactCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the artifact for `key`, running `compute` only on a miss.
    pub fn get_or_compute<F>(
        &self,
        key: &EstimationKey,
        compute: F,
    ) -> GazemapResult<Arc<RenderedArtifact>>
    where
        F: FnOnce() -> GazemapResult<RenderedArtifact>,
    {
        loop {
            let slot = self.lock_slots().entry(key.clone()).or_default().clone();
            let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = guard.as_ref() {
                tracing::debug!(surface_id = key.surface_id(), "artifact cache hit");
                return Ok(Arc::clone(hit));
            }
            // A failed computation detached this slot while we waited on it.
            if !self.is_current(key, &slot) {
                continue;
            }

            tracing::debug!(surface_id = key.surface_id(), "artifact cache miss");
            self.computations.fetch_add(1, Ordering::Relaxed);
            return match compute() {
                Ok(artifact) => {
                    let artifact = Arc::new(artifact);
                    *guard = Some(Arc::clone(&artifact));
                    Ok(artifact)
                }
                Err(err) => {
                    let mut slots = self.lock_slots();
                    if slots.get(key).is_some_and(|s| Arc::ptr_eq(s, &slot)) {
                        slots.remove(key);
                    }
                    Err(err)
                }
            };
        }
    }

    /// Stored artifact for `key`, without computing.
    ///
    /// Blocks while another caller is computing the same key.
    pub fn get(&self, key: &EstimationKey) -> Option<Arc<RenderedArtifact>> {
        let slot = self.lock_slots().get(key).cloned()?;
        let guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        guard.clone()
    }

    /// Number of stored artifacts.
    pub fn len(&self) -> usize {
        let slots: Vec<Slot> = self.lock_slots().values().cloned().collect();
        slots
            .iter()
            .filter(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).is_some())
            .count()
    }

    /// True when no artifact is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many times `compute` has been invoked.
    pub fn computations(&self) -> u64 {
        self.computations.load(Ordering::Relaxed)
    }

    /// Slots currently held, stored or in flight.
    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        self.lock_slots().len()
    }

    fn is_current(&self, key: &EstimationKey, slot: &Slot) -> bool {
        self.lock_slots()
            .get(key)
            .is_some_and(|s| Arc::ptr_eq(s, slot))
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<EstimationKey, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/artifact.rs"]
mod tests;
