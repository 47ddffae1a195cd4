//! Synthetic gaze data and estimator benchmarking.

use std::{
    f64::consts::TAU,
    time::{Duration, Instant},
};

use crate::{
    density::estimate::{Algorithm, DensityGrid, estimate},
    foundation::{
        core::Point,
        error::{GazemapError, GazemapResult},
    },
};

/// Shape of a random-walk data set.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RandomWalk {
    /// Number of independent walkers ("respondents").
    pub walkers: usize,
    /// Points emitted per walker.
    pub points_per_walker: usize,
    /// Step length in pixels.
    pub step: f64,
    /// RNG seed; equal seeds give equal point sets.
    pub seed: u64,
}

impl Default for RandomWalk {
    fn default() -> Self {
        Self {
            walkers: 200,
            points_per_walker: 2000,
            step: 5.0,
            seed: 0,
        }
    }
}

/// Random-walk points over a `width × height` surface.
///
/// Each walker starts uniformly inside the surface and takes fixed-length
/// steps in uniformly random directions, clamped to `[0, size - 1]`.
pub fn random_walk_points(width: u32, height: u32, walk: &RandomWalk) -> Vec<Point> {
    let mut rng = fastrand::Rng::with_seed(walk.seed);
    let max_x = (f64::from(width) - 1.0).max(0.0);
    let max_y = (f64::from(height) - 1.0).max(0.0);
    let mut out = Vec::with_capacity(walk.walkers * walk.points_per_walker);

    for _ in 0..walk.walkers {
        let mut x = rng.f64() * f64::from(width);
        let mut y = rng.f64() * f64::from(height);
        for _ in 0..walk.points_per_walker {
            let angle = rng.f64() * TAU;
            x = (x + walk.step * angle.cos()).clamp(0.0, max_x);
            y = (y + walk.step * angle.sin()).clamp(0.0, max_y);
            out.push(Point::new(x, y));
        }
    }
    out
}

/// Timed result of one estimator run.
#[derive(Clone, Debug)]
pub struct TimedGrid {
    /// Estimator that produced `grid`.
    pub algorithm: Algorithm,
    /// Wall-clock time spent in [`estimate`].
    pub elapsed: Duration,
    /// Estimated density.
    pub grid: DensityGrid,
}

/// Side-by-side run of both estimators on the same input.
#[derive(Clone, Debug)]
pub struct Comparison {
    /// Exact reference run.
    pub brute_force: TimedGrid,
    /// Truncated run.
    pub bounded_radius: TimedGrid,
    /// Largest per-cell difference divided by the reference peak.
    pub max_relative_diff: f64,
}

/// Run both estimators and measure how far the truncated one drifts.
pub fn compare_algorithms(
    points: &[Point],
    width: u32,
    height: u32,
    bandwidth: f64,
    grid_spacing: f64,
) -> GazemapResult<Comparison> {
    let brute_force = timed(points, width, height, bandwidth, grid_spacing, Algorithm::BruteForce)?;
    let bounded_radius = timed(
        points,
        width,
        height,
        bandwidth,
        grid_spacing,
        Algorithm::BoundedRadius,
    )?;

    if brute_force.grid.cells.len() != bounded_radius.grid.cells.len() {
        return Err(GazemapError::Other(anyhow::anyhow!(
            "estimators disagree on grid shape"
        )));
    }
    let (_, peak) = brute_force.grid.min_max();
    let max_diff = brute_force
        .grid
        .cells
        .iter()
        .zip(&bounded_radius.grid.cells)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max);
    let max_relative_diff = if peak > 0.0 { max_diff / peak } else { 0.0 };

    tracing::info!(
        brute_ms = brute_force.elapsed.as_secs_f64() * 1e3,
        bounded_ms = bounded_radius.elapsed.as_secs_f64() * 1e3,
        max_relative_diff,
        "compared estimators"
    );
    Ok(Comparison {
        brute_force,
        bounded_radius,
        max_relative_diff,
    })
}

fn timed(
    points: &[Point],
    width: u32,
    height: u32,
    bandwidth: f64,
    grid_spacing: f64,
    algorithm: Algorithm,
) -> GazemapResult<TimedGrid> {
    let start = Instant::now();
    let grid = estimate(points, width, height, bandwidth, grid_spacing, algorithm)?;
    Ok(TimedGrid {
        algorithm,
        elapsed: start.elapsed(),
        grid,
    })
}

#[cfg(test)]
#[path = "../tests/unit/simulate.rs"]
mod tests;
