use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
};

use crate::{
    assets::decode::load_raster_file,
    foundation::{core::Raster, error::GazemapResult},
};

/// Lookup of the background raster a surface's heatmap is drawn over.
pub trait BackgroundSource: Send + Sync {
    /// Background for `surface_id`, `Ok(None)` when the surface has none.
    ///
    /// Errors are reserved for backgrounds that exist but cannot be read.
    fn load_background(&self, surface_id: &str) -> GazemapResult<Option<Arc<Raster>>>;
}

/// Backgrounds stored as `{root}/{surface_id}.png`.
#[derive(Clone, Debug)]
pub struct DirBackgrounds {
    root: PathBuf,
}

impl DirBackgrounds {
    /// Serve backgrounds from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory backgrounds are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, surface_id: &str) -> Option<PathBuf> {
        // Ids that could escape `root` have no background.
        let safe = !surface_id.is_empty()
            && !surface_id.contains(['/', '\\'])
            && surface_id != "."
            && surface_id != "..";
        safe.then(|| self.root.join(format!("{surface_id}.png")))
    }
}

impl BackgroundSource for DirBackgrounds {
    fn load_background(&self, surface_id: &str) -> GazemapResult<Option<Arc<Raster>>> {
        let Some(path) = self.path_for(surface_id) else {
            tracing::warn!(surface_id, "rejected unsafe surface id");
            return Ok(None);
        };
        if !path.is_file() {
            return Ok(None);
        }
        tracing::debug!(path = %path.display(), "loading background");
        Ok(Some(Arc::new(load_raster_file(&path)?)))
    }
}

/// In-memory backgrounds registered by the host.
#[derive(Debug, Default)]
pub struct MemoryBackgrounds {
    rasters: RwLock<HashMap<String, Arc<Raster>>>,
}

impl MemoryBackgrounds {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the background for `surface_id`.
    pub fn insert(&self, surface_id: impl Into<String>, raster: Raster) {
        self.rasters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(surface_id.into(), Arc::new(raster));
    }
}

impl BackgroundSource for MemoryBackgrounds {
    fn load_background(&self, surface_id: &str) -> GazemapResult<Option<Arc<Raster>>> {
        Ok(self
            .rasters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(surface_id)
            .cloned())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/backgrounds.rs"]
mod tests;
