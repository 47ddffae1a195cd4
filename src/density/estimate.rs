use std::{fmt, str::FromStr};

use rayon::prelude::*;

use crate::{
    density::kernel::{GaussianKernel, GridGeometry, dist_sq},
    foundation::{
        core::Point,
        error::{GazemapError, GazemapResult},
    },
};

/// Density estimation strategy. Both produce grids of identical shape.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Every cell sums every point. Exact; `O(cells × points)`.
    BruteForce,
    /// Every point touches only cells within `3 × bandwidth`.
    ///
    /// Cells just past the cutoff get zero instead of a vanishing tail, so
    /// results sit slightly below [`Algorithm::BruteForce`]. This truncation is
    /// intentional.
    #[default]
    BoundedRadius,
}

impl Algorithm {
    /// Stable lowercase identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BruteForce => "brute-force",
            Self::BoundedRadius => "bounded-radius",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = GazemapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brute-force" | "brute_force" | "brute" => Ok(Self::BruteForce),
            "bounded-radius" | "bounded_radius" | "bounded" | "accumulate" => {
                Ok(Self::BoundedRadius)
            }
            other => Err(GazemapError::invalid_parameter(format!(
                "unknown algorithm '{other}'"
            ))),
        }
    }
}

/// Row-major grid of kernel density samples, one per cell center.
///
/// All cells are finite and non-negative.
#[derive(Clone, Debug, PartialEq)]
pub struct DensityGrid {
    /// Geometry the grid was sampled on.
    pub geometry: GridGeometry,
    /// `grid_h * grid_w` samples, row-major.
    pub cells: Vec<f64>,
}

impl DensityGrid {
    fn zeros(geometry: GridGeometry) -> Self {
        Self {
            geometry,
            cells: vec![0.0; geometry.len()],
        }
    }

    /// Number of columns.
    pub fn grid_w(&self) -> usize {
        self.geometry.grid_w
    }

    /// Number of rows.
    pub fn grid_h(&self) -> usize {
        self.geometry.grid_h
    }

    /// Sample at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.grid_h() || col >= self.grid_w() {
            return None;
        }
        self.cells.get(row * self.grid_w() + col).copied()
    }

    /// Global `(min, max)` over all cells.
    pub fn min_max(&self) -> (f64, f64) {
        self.cells
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// `(row, col)` of the first maximal cell.
    pub fn argmax(&self) -> (usize, usize) {
        let mut best = 0usize;
        for (idx, &v) in self.cells.iter().enumerate() {
            if v > self.cells[best] {
                best = idx;
            }
        }
        (best / self.grid_w(), best % self.grid_w())
    }
}

/// Estimate point density over a `surface_width × surface_height` surface.
///
/// Points with non-finite coordinates are skipped. An empty point set yields
/// an all-zero grid.
///
/// # Errors
/// [`GazemapError::InvalidParameter`] for a non-positive bandwidth or spacing,
/// [`GazemapError::EmptyGrid`] when the surface holds no whole cell.
#[tracing::instrument(skip(points), fields(n_points = points.len()))]
pub fn estimate(
    points: &[Point],
    surface_width: u32,
    surface_height: u32,
    bandwidth: f64,
    grid_spacing: f64,
    algorithm: Algorithm,
) -> GazemapResult<DensityGrid> {
    let kernel = GaussianKernel::new(bandwidth)?;
    let geometry = GridGeometry::new(surface_width, surface_height, grid_spacing)?;
    let finite: Vec<Point> = points
        .iter()
        .copied()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();
    if finite.len() != points.len() {
        tracing::warn!(
            skipped = points.len() - finite.len(),
            "ignoring points with non-finite coordinates"
        );
    }

    let grid = match algorithm {
        Algorithm::BruteForce => brute_force(&finite, geometry, &kernel),
        Algorithm::BoundedRadius => bounded_radius(&finite, geometry, &kernel),
    };
    Ok(grid)
}

fn brute_force(points: &[Point], geometry: GridGeometry, kernel: &GaussianKernel) -> DensityGrid {
    let mut grid = DensityGrid::zeros(geometry);
    if points.is_empty() {
        return grid;
    }
    grid.cells
        .par_chunks_mut(geometry.grid_w)
        .enumerate()
        .for_each(|(row, cells)| {
            for (col, cell) in cells.iter_mut().enumerate() {
                let center = geometry.cell_center(row, col);
                *cell = points
                    .iter()
                    .map(|&p| kernel.eval(dist_sq(center, p)))
                    .sum();
            }
        });
    grid
}

fn bounded_radius(
    points: &[Point],
    geometry: GridGeometry,
    kernel: &GaussianKernel,
) -> DensityGrid {
    let mut grid = DensityGrid::zeros(geometry);
    let radius = kernel.cutoff_radius();
    let radius_sq = radius * radius;
    let reach = (radius / geometry.spacing).ceil() as i64;
    let max_row = geometry.grid_h as i64 - 1;
    let max_col = geometry.grid_w as i64 - 1;

    for &p in points {
        let (center_row, center_col) = geometry.cell_of(p);
        let row_lo = center_row.saturating_sub(reach).max(0);
        let row_hi = center_row.saturating_add(reach).min(max_row);
        let col_lo = center_col.saturating_sub(reach).max(0);
        let col_hi = center_col.saturating_add(reach).min(max_col);

        for row in row_lo..=row_hi {
            let base = row as usize * geometry.grid_w;
            for col in col_lo..=col_hi {
                let d2 = dist_sq(geometry.cell_center(row as usize, col as usize), p);
                if d2 <= radius_sq {
                    grid.cells[base + col as usize] += kernel.eval(d2);
                }
            }
        }
    }
    grid
}

#[cfg(test)]
#[path = "../../tests/unit/density/estimate.rs"]
mod tests;
