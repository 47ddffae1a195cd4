//! gazemap turns recorded gaze or click points into a kernel density heatmap
//! composited over the page image they were recorded on.
//!
//! # Pipeline overview
//!
//! 1. **Store**: points are appended per surface id ([`PointStore`]).
//! 2. **Estimate**: `points -> DensityGrid` with a Gaussian kernel sampled at
//!    grid-cell centers, either exactly ([`Algorithm::BruteForce`]) or with a
//!    `3σ` cutoff ([`Algorithm::BoundedRadius`]).
//! 3. **Normalize**: `DensityGrid -> NormalizedGrid` in `0..=255`.
//! 4. **Render**: the grid becomes a translucent red layer composited over the
//!    surface background.
//! 5. **Cache**: [`ArtifactCache`] memoizes step 2-4 per [`EstimationKey`].
//!
//! [`HeatmapService`] wires these together behind `upload` /
//! `request_heatmap`. Transport (HTTP, CLI) stays outside the library.
//!
//! Rasters are premultiplied RGBA8 end-to-end; [`encode_png`] converts back to
//! straight alpha.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assets;
mod cache;
mod config;
mod density;
mod foundation;
mod points;
mod render;
mod service;

pub mod simulate;

pub use assets::backgrounds::{BackgroundSource, DirBackgrounds, MemoryBackgrounds};
pub use assets::decode::{decode_raster, encode_png, load_raster_file, write_png};
pub use cache::artifact::{ArtifactCache, EstimationKey, RenderedArtifact};
pub use config::ServiceConfig;
pub use density::estimate::{Algorithm, DensityGrid, estimate};
pub use density::kernel::{
    CUTOFF_SIGMAS, GaussianKernel, GridGeometry, MAX_GRID_CELLS, gaussian_kernel,
};
pub use density::normalize::{NormalizedGrid, normalize};
pub use foundation::core::{Point, Raster, Rect};
pub use foundation::error::{GazemapError, GazemapResult};
pub use points::payload::parse_points_json;
pub use points::store::PointStore;
pub use render::composite::{PremulRgba8, composite_over, over};
pub use render::heatmap::{HEAT_RGB, heatmap_layer, render, render_with_color};
pub use service::HeatmapService;
