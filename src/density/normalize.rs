use crate::density::{estimate::DensityGrid, kernel::GridGeometry};

/// Density grid rescaled to 8-bit intensities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedGrid {
    /// Number of columns.
    pub grid_w: usize,
    /// Number of rows.
    pub grid_h: usize,
    /// `grid_h * grid_w` intensities in `0..=255`, row-major.
    pub intensities: Vec<u8>,
}

impl NormalizedGrid {
    /// Intensity at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        if row >= self.grid_h || col >= self.grid_w {
            return None;
        }
        self.intensities.get(row * self.grid_w + col).copied()
    }

    /// All-zero grid with the shape of `geometry`.
    pub fn zeros(geometry: &GridGeometry) -> Self {
        Self {
            grid_w: geometry.grid_w,
            grid_h: geometry.grid_h,
            intensities: vec![0; geometry.len()],
        }
    }
}

/// Linearly map the grid's `[min, max]` onto `[0, 255]`, flooring.
///
/// A constant grid (all zeros included) maps to all zeros.
pub fn normalize(grid: &DensityGrid) -> NormalizedGrid {
    let (min, max) = grid.min_max();
    let range = max - min;
    if !range.is_finite() || range <= 0.0 {
        return NormalizedGrid::zeros(&grid.geometry);
    }

    let intensities = grid
        .cells
        .iter()
        .map(|&v| (255.0 * ((v - min) / range)).floor().clamp(0.0, 255.0) as u8)
        .collect();

    NormalizedGrid {
        grid_w: grid.grid_w(),
        grid_h: grid.grid_h(),
        intensities,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/density/normalize.rs"]
mod tests;
