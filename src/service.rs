use std::sync::Arc;

use crate::{
    assets::{
        backgrounds::{BackgroundSource, DirBackgrounds},
        decode::write_png,
    },
    cache::artifact::{ArtifactCache, EstimationKey, RenderedArtifact},
    config::ServiceConfig,
    density::{
        estimate::estimate,
        kernel::{GaussianKernel, GridGeometry},
        normalize::normalize,
    },
    foundation::{
        core::Point,
        error::{GazemapError, GazemapResult},
    },
    points::{payload::parse_points_json, store::PointStore},
    render::heatmap::render,
};

/// Owns the point store, background lookup and artifact cache.
///
/// Build one at startup and share it (e.g. behind an `Arc`) with every
/// request handler. All methods take `&self` and are safe to call
/// concurrently.
pub struct HeatmapService {
    config: ServiceConfig,
    points: PointStore,
    backgrounds: Arc<dyn BackgroundSource>,
    cache: ArtifactCache,
}

impl std::fmt::Debug for HeatmapService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeatmapService")
            .field("config", &self.config)
            .field("surfaces", &self.points.surface_ids().len())
            .field("cached_artifacts", &self.cache.len())
            .finish()
    }
}

impl HeatmapService {
    /// Service reading backgrounds from `config.images_dir`.
    pub fn from_config(config: ServiceConfig) -> GazemapResult<Self> {
        let backgrounds = Arc::new(DirBackgrounds::new(config.images_dir.clone()));
        Self::new(config, backgrounds)
    }

    /// Service with an explicit background source.
    pub fn new(
        config: ServiceConfig,
        backgrounds: Arc<dyn BackgroundSource>,
    ) -> GazemapResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            points: PointStore::new(),
            backgrounds,
            cache: ArtifactCache::new(),
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Raw point storage.
    pub fn points(&self) -> &PointStore {
        &self.points
    }

    /// Rendered artifact cache.
    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    /// Append decoded points to `surface_id`.
    pub fn upload(&self, surface_id: &str, points: impl IntoIterator<Item = Point>) {
        self.points.append(surface_id, points);
    }

    /// Decode a `{"points": [[x, y], ...]}` body and append it.
    ///
    /// Nothing is stored when the body fails to parse.
    pub fn upload_json(&self, surface_id: &str, body: &[u8]) -> GazemapResult<usize> {
        let points = parse_points_json(body)?;
        let n = points.len();
        self.upload(surface_id, points);
        Ok(n)
    }

    /// Heatmap for `surface_id` with the configured default parameters.
    pub fn request_default_heatmap(&self, surface_id: &str) -> GazemapResult<Arc<RenderedArtifact>> {
        self.request_heatmap(
            surface_id,
            self.config.default_bandwidth,
            self.config.default_grid_spacing,
        )
    }

    /// Heatmap for `surface_id`, computed once per distinct parameter set.
    ///
    /// # Errors
    /// [`GazemapError::InvalidParameter`] for unusable parameters,
    /// [`GazemapError::NoData`] when the surface has no points,
    /// [`GazemapError::MissingBackground`] when no background exists, and
    /// [`GazemapError::EmptyGrid`] when the background is smaller than a cell.
    #[tracing::instrument(skip(self))]
    pub fn request_heatmap(
        &self,
        surface_id: &str,
        bandwidth: f64,
        grid_spacing: f64,
    ) -> GazemapResult<Arc<RenderedArtifact>> {
        let key = EstimationKey::new(surface_id, bandwidth, grid_spacing)?;
        // Estimation runs on the quantized values.
        GaussianKernel::new(key.bandwidth())?;
        self.cache.get_or_compute(&key, || self.compute(&key))
    }

    fn compute(&self, key: &EstimationKey) -> GazemapResult<RenderedArtifact> {
        let surface_id = key.surface_id();
        let points = self.points.points_for(surface_id);
        if points.is_empty() {
            return Err(GazemapError::no_data(surface_id));
        }
        let background = self
            .backgrounds
            .load_background(surface_id)?
            .ok_or_else(|| GazemapError::missing_background(surface_id))?;

        let algorithm = self.config.algorithm;
        let density = estimate(
            &points,
            background.width,
            background.height,
            key.bandwidth(),
            key.grid_spacing(),
            algorithm,
        )?;
        let GridGeometry { grid_w, grid_h, .. } = density.geometry;
        let normalized = normalize(&density);
        let raster = render(&normalized, key.grid_spacing(), &background)?;

        if let Some(dir) = &self.config.cache_dir {
            let path = dir.join(format!("{}.png", key.file_stem()));
            write_png(&raster, &path)?;
            tracing::debug!(path = %path.display(), "wrote artifact");
        }

        tracing::info!(
            surface_id,
            points = points.len(),
            grid_w,
            grid_h,
            %algorithm,
            "computed heatmap"
        );
        Ok(RenderedArtifact {
            key: key.clone(),
            fingerprint: raster.fingerprint(),
            raster,
            algorithm,
            point_count: points.len(),
            grid_size: (grid_w, grid_h),
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/service.rs"]
mod tests;
