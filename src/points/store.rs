use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock},
};

use crate::foundation::core::Point;

type SurfacePoints = Arc<RwLock<Vec<Point>>>;

/// Append-only store of observation points keyed by surface id.
///
/// The outer map lock is held only long enough to find or create a surface
/// entry; each surface then has its own lock, so uploads to different
/// surfaces do not contend. An `append` is atomic with respect to readers:
/// `points_for` sees either none or all of a batch.
#[derive(Debug, Default)]
pub struct PointStore {
    surfaces: Mutex<HashMap<String, SurfacePoints>>,
}

impl PointStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `points` to `surface_id`, creating the surface on first use.
    ///
    /// Coordinates are not range-checked; points outside the surface simply
    /// contribute little or nothing to the density grid.
    pub fn append(&self, surface_id: &str, points: impl IntoIterator<Item = Point>) {
        let entry = self.entry(surface_id);
        let mut guard = entry.write().unwrap_or_else(PoisonError::into_inner);
        guard.extend(points);
        tracing::debug!(surface_id, total = guard.len(), "appended points");
    }

    /// Full accumulated history for `surface_id` (empty if unknown).
    pub fn points_for(&self, surface_id: &str) -> Vec<Point> {
        let entry = self.lock_map().get(surface_id).cloned();
        match entry {
            Some(points) => points
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            None => Vec::new(),
        }
    }

    /// Number of points stored for `surface_id`.
    pub fn len_for(&self, surface_id: &str) -> usize {
        let entry = self.lock_map().get(surface_id).cloned();
        entry.map_or(0, |points| {
            points.read().unwrap_or_else(PoisonError::into_inner).len()
        })
    }

    /// Surface ids that have received at least one upload, sorted.
    pub fn surface_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.lock_map().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn entry(&self, surface_id: &str) -> SurfacePoints {
        let mut map = self.lock_map();
        map.entry(surface_id.to_owned()).or_default().clone()
    }

    fn lock_map(&self) -> MutexGuard<'_, HashMap<String, SurfacePoints>> {
        self.surfaces.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/points/store.rs"]
mod tests;
