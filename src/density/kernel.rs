use std::f64::consts::PI;

use crate::foundation::{
    core::Point,
    error::{GazemapError, GazemapResult},
};

/// Multiple of the bandwidth beyond which bounded-radius accumulation drops a
/// point's contribution. At `3σ` the kernel is about 1.1% of its peak.
pub const CUTOFF_SIGMAS: f64 = 3.0;

/// Upper bound on `grid_w * grid_h`. Finer grids are rejected rather than
/// allocated.
pub const MAX_GRID_CELLS: usize = 1 << 24;

/// Isotropic 2D Gaussian `exp(-d²/(2b²)) / (2πb²)` evaluated from squared distance.
///
/// A non-positive or non-finite `bandwidth` is clamped to `1.0`; callers that
/// need to reject such input go through [`GaussianKernel::new`].
pub fn gaussian_kernel(dist_sq: f64, bandwidth: f64) -> f64 {
    GaussianKernel::clamped(bandwidth).eval(dist_sq)
}

/// Gaussian kernel with its constants folded for repeated evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GaussianKernel {
    bandwidth: f64,
    inv_two_b2: f64,
    norm: f64,
}

impl GaussianKernel {
    /// Build a kernel, rejecting non-positive or non-finite bandwidths and
    /// bandwidths whose folded constants leave the finite `f64` range.
    pub fn new(bandwidth: f64) -> GazemapResult<Self> {
        if !bandwidth.is_finite() || bandwidth <= 0.0 {
            return Err(GazemapError::invalid_parameter(format!(
                "bandwidth must be finite and > 0, got {bandwidth}"
            )));
        }
        let kernel = Self::from_valid(bandwidth);
        if !kernel.inv_two_b2.is_finite() || !kernel.norm.is_finite() || kernel.norm <= 0.0 {
            return Err(GazemapError::invalid_parameter(format!(
                "bandwidth {bandwidth} is outside the representable kernel range"
            )));
        }
        Ok(kernel)
    }

    /// Build a kernel, substituting `1.0` for an unusable bandwidth.
    pub fn clamped(bandwidth: f64) -> Self {
        if bandwidth.is_finite() && bandwidth > 0.0 {
            Self::from_valid(bandwidth)
        } else {
            Self::from_valid(1.0)
        }
    }

    fn from_valid(bandwidth: f64) -> Self {
        let b2 = bandwidth * bandwidth;
        Self {
            bandwidth,
            inv_two_b2: 1.0 / (2.0 * b2),
            norm: 1.0 / (2.0 * PI * b2),
        }
    }

    /// Bandwidth this kernel was built with.
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Influence radius used by bounded-radius accumulation.
    pub fn cutoff_radius(&self) -> f64 {
        CUTOFF_SIGMAS * self.bandwidth
    }

    /// Kernel value at squared distance `dist_sq`.
    #[inline]
    pub fn eval(&self, dist_sq: f64) -> f64 {
        (-dist_sq * self.inv_two_b2).exp() * self.norm
    }
}

/// Regular grid laid over a surface: `floor(size / spacing)` cells per axis,
/// each sampled at its geometric center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridGeometry {
    /// Number of columns.
    pub grid_w: usize,
    /// Number of rows.
    pub grid_h: usize,
    /// Cell side length in surface pixels.
    pub spacing: f64,
}

impl GridGeometry {
    /// Derive the grid for a `surface_width × surface_height` surface.
    ///
    /// Fails with [`GazemapError::EmptyGrid`] when either axis has no cells and
    /// with [`GazemapError::InvalidParameter`] when the grid would exceed
    /// [`MAX_GRID_CELLS`].
    pub fn new(surface_width: u32, surface_height: u32, spacing: f64) -> GazemapResult<Self> {
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(GazemapError::invalid_parameter(format!(
                "grid spacing must be finite and > 0, got {spacing}"
            )));
        }
        let grid_w = (f64::from(surface_width) / spacing).floor() as usize;
        let grid_h = (f64::from(surface_height) / spacing).floor() as usize;
        if grid_w == 0 || grid_h == 0 {
            return Err(GazemapError::EmptyGrid {
                width: surface_width,
                height: surface_height,
                spacing,
            });
        }
        if grid_w
            .checked_mul(grid_h)
            .is_none_or(|cells| cells > MAX_GRID_CELLS)
        {
            return Err(GazemapError::invalid_parameter(format!(
                "grid spacing {spacing} is too fine for a {surface_width}x{surface_height} surface \
                 (more than {MAX_GRID_CELLS} cells)"
            )));
        }
        Ok(Self {
            grid_w,
            grid_h,
            spacing,
        })
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.grid_w * self.grid_h
    }

    /// Always false: construction rejects zero-sized grids.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Center of cell `(row, col)` in surface pixels.
    #[inline]
    pub fn cell_center(&self, row: usize, col: usize) -> Point {
        Point::new(
            (col as f64 + 0.5) * self.spacing,
            (row as f64 + 0.5) * self.spacing,
        )
    }

    /// `(row, col)` of the cell containing `p`, possibly outside the grid.
    #[inline]
    pub fn cell_of(&self, p: Point) -> (i64, i64) {
        (
            (p.y / self.spacing).floor() as i64,
            (p.x / self.spacing).floor() as i64,
        )
    }
}

#[inline]
pub(crate) fn dist_sq(a: Point, b: Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

#[cfg(test)]
#[path = "../../tests/unit/density/kernel.rs"]
mod tests;
