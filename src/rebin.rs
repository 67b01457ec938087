//! `EqualSpaceCdfUpdate` — rebinning a `Cmap` from recent evidence
//!
//! Builds a data-kernel-smoothed density over a grid spanning the combined
//! support of the prior sampling plot and the newly buffered observations,
//! blends it with the prior plot, integrates to a CDF, and resamples
//! `cmap_size - 1` equally-spaced-in-probability interior boundaries.

use crate::cmap::Cmap;
use crate::config::{KernelShape, SketchConf};
use crate::density::DensityPlot;

/// Grid resolution used for the internal CDF numerical integration. Fixed
/// rather than configurable — it only affects rebinning precision, not
/// sketch semantics, much like a quantile sketch's internal compaction
/// capacities aren't exposed as a tunable knob.
const GRID_RESOLUTION: usize = 512;

/// Weight given to fresh evidence when blending with the prior sampling
/// plot, derived from the `e^-1` generation-decay ratio used everywhere
/// else in this crate: fresh data plays the role of the
/// young generation (weight `1`), the prior plot the role of the
/// generation that's about to age by one (weight `e^-1`), normalized.
fn fresh_evidence_alpha() -> f64 {
    let e_inv = (-1.0_f64).exp();
    1.0 / (1.0 + e_inv)
}

fn kernel_weight(shape: KernelShape, distance: f64, window: f64) -> f64 {
    if window <= 0.0 {
        return if distance == 0.0 { 1.0 } else { 0.0 };
    }
    match shape {
        KernelShape::Triangular => (1.0 - distance.abs() / window).max(0.0),
        KernelShape::Gaussian => {
            let z = distance / window;
            (-0.5 * z * z).exp()
        }
    }
}

/// Evaluate the data-kernel density (unnormalized) of buffered observations
/// at `grid` points, smearing each observation's weight over a window of
/// `data_kernel_window * local_scale`.
fn data_kernel_density(
    observations: &[(f64, f64)],
    grid: &[f64],
    window: f64,
    shape: KernelShape,
) -> Vec<f64> {
    let mut density = vec![0.0; grid.len()];
    if observations.is_empty() || window <= 0.0 {
        return density;
    }
    for &(p, weight) in observations {
        if !p.is_finite() || !weight.is_finite() || weight <= 0.0 {
            continue;
        }
        for (i, &g) in grid.iter().enumerate() {
            density[i] += weight * kernel_weight(shape, g - p, window);
        }
    }
    density
}

/// Evaluate the prior sampling plot's density at `grid` points.
fn prior_density(prior: &DensityPlot, grid: &[f64]) -> Vec<f64> {
    grid.iter().map(|&g| prior.density_at(g)).collect()
}

/// Mirror-reflects mass that falls outside `[lo, hi]` back into the
/// interval, in place.
fn apply_boundary_correction(grid: &[f64], density: &mut [f64], lo: f64, hi: f64) {
    let span = hi - lo;
    if span <= 0.0 {
        return;
    }
    let n = grid.len();
    let mut reflected = vec![0.0; n];
    for i in 0..n {
        let g = grid[i];
        let mass = density[i];
        if mass == 0.0 {
            continue;
        }
        let folded = if g < lo {
            lo + (lo - g)
        } else if g > hi {
            hi - (g - hi)
        } else {
            g
        };
        // Find nearest grid index to the folded point and deposit the mass
        // there; grid is uniform so this is a direct index computation.
        let t = ((folded - grid[0]) / (grid[n - 1] - grid[0])).clamp(0.0, 1.0);
        let idx = (t * (n - 1) as f64).round() as usize;
        reflected[idx] += mass;
    }
    density.copy_from_slice(&reflected);
}

/// Builds a uniform grid spanning the combined support of the prior plot's
/// finite bins and the buffered observations.
fn build_grid(prior: &DensityPlot, observations: &[(f64, f64)], conf: &SketchConf) -> Vec<f64> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;

    for record in &prior.records {
        if record.range.start.is_finite() {
            lo = lo.min(record.range.start);
        }
        if record.range.end.is_finite() {
            hi = hi.max(record.range.end);
        }
    }
    for &(p, _) in observations {
        if p.is_finite() {
            lo = lo.min(p);
            hi = hi.max(p);
        }
    }

    if !lo.is_finite() || !hi.is_finite() {
        lo = conf.cmap_start.unwrap_or(0.0);
        hi = conf.cmap_end.unwrap_or(1.0);
    }
    if hi <= lo {
        hi = lo + 1.0;
    }

    let span = hi - lo;
    // Pad by one data-kernel window on each side so mass near the edges
    // still has room to smear before any boundary correction folds it back.
    let pad = (conf.data_kernel_window * span / conf.cmap_size as f64).max(span * 0.01);
    let lo = lo - pad;
    let hi = hi + pad;
    let step = (hi - lo) / (GRID_RESOLUTION - 1) as f64;
    (0..GRID_RESOLUTION).map(|i| lo + step * i as f64).collect()
}

/// Recomputes a `Cmap` from the prior generation's sampling plot and the
/// observations buffered since the last deep update.
///
/// Falls back to an unchanged `Cmap` when both `prior` and `observations`
/// are empty.
pub fn rebin(current: &Cmap, prior: &DensityPlot, observations: &[(f64, f64)], conf: &SketchConf) -> Cmap {
    if prior.records.is_empty() && observations.is_empty() {
        return current.clone();
    }

    let grid = build_grid(prior, observations, conf);

    let local_scale = {
        let span = grid[grid.len() - 1] - grid[0];
        conf.data_kernel_window * span / conf.cmap_size as f64
    };

    let new_density = data_kernel_density(observations, &grid, local_scale, conf.kernel_shape);
    let old_density = prior_density(prior, &grid);

    let alpha = fresh_evidence_alpha();
    let mut combined: Vec<f64> = new_density
        .iter()
        .zip(old_density.iter())
        .map(|(&n, &o)| alpha * n + (1.0 - alpha) * o)
        .collect();

    if combined.iter().all(|&d| d == 0.0) {
        // No usable evidence at all (degenerate prior, empty buffer) —
        // leave the Cmap untouched rather than emit degenerate boundaries.
        return current.clone();
    }

    if conf.boundary_correction {
        let lo = conf.cmap_start.unwrap_or(grid[0]);
        let hi = conf.cmap_end.unwrap_or(grid[grid.len() - 1]);
        apply_boundary_correction(&grid, &mut combined, lo, hi);
    }

    // Integrate to a CDF via the trapezoid rule.
    let mut cdf = vec![0.0; grid.len()];
    for i in 1..grid.len() {
        let dx = grid[i] - grid[i - 1];
        let trapezoid = 0.5 * (combined[i] + combined[i - 1]) * dx;
        cdf[i] = cdf[i - 1] + trapezoid;
    }
    let total = cdf[cdf.len() - 1];
    if total <= 0.0 {
        return current.clone();
    }
    for v in &mut cdf {
        *v /= total;
    }

    let boundaries = quantile_boundaries(&grid, &cdf, conf.cmap_size);
    Cmap::from_boundaries(boundaries)
}

/// Finds the grid position where `cdf` first reaches `target`, linearly
/// interpolating between grid points, and advancing past ties.
fn interpolate_quantile(grid: &[f64], cdf: &[f64], target: f64) -> f64 {
    for i in 1..cdf.len() {
        if cdf[i] >= target {
            let (c0, c1) = (cdf[i - 1], cdf[i]);
            if c1 > c0 {
                let t = (target - c0) / (c1 - c0);
                return grid[i - 1] + t * (grid[i] - grid[i - 1]);
            }
            return grid[i];
        }
    }
    grid[grid.len() - 1]
}

fn quantile_boundaries(grid: &[f64], cdf: &[f64], cmap_size: usize) -> Vec<f64> {
    let n = cmap_size - 1;
    let mut boundaries: Vec<f64> = (1..cmap_size)
        .map(|k| interpolate_quantile(grid, cdf, k as f64 / cmap_size as f64))
        .collect();
    debug_assert_eq!(boundaries.len(), n);

    // Numerical ties in a near-flat CDF region can produce non-strictly
    // increasing boundaries; nudge duplicates forward by an epsilon so the
    // Cmap invariant (strictly increasing) always holds.
    for i in 1..boundaries.len() {
        if boundaries[i] <= boundaries[i - 1] {
            boundaries[i] = boundaries[i - 1] + f64::EPSILON.max(boundaries[i - 1].abs() * 1e-12);
        }
    }
    boundaries
}
