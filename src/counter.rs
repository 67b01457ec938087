//! `HCounter` — a hashed count-min counter over bin indices
//!
//! Two construction modes, chosen by `SketchConf::is_uncompressed`:
//! - **Uncompressed** (`cmap_size <= counter_size`): one row, identity
//!   hash, exact — no collisions are possible since every bin gets its own
//!   column.
//! - **Compressed**: `counter_no` rows of `counter_size` columns each,
//!   independent deterministic hashes, derived from a single base seed
//!   rather than storing a separate RNG per row.

use crate::hash::{derive_row_seeds, hash_index};

/// A hashed, multi-row sub-linear counter with conservative-update
/// semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct HCounter {
    width: usize,
    depth: usize,
    table: Vec<f64>,
    row_seeds: Vec<u64>,
    uncompressed: bool,
}

impl HCounter {
    /// Builds a fresh, all-zero `HCounter`.
    ///
    /// `cmap_size` and `counter_size`/`counter_no` come straight from
    /// `SketchConf`; `seed` is the sketch-wide seed each generation's rows
    /// are deterministically derived from.
    pub fn new(cmap_size: usize, counter_size: usize, counter_no: usize, seed: u64) -> Self {
        if cmap_size <= counter_size {
            Self {
                width: cmap_size,
                depth: 1,
                table: vec![0.0; cmap_size],
                row_seeds: vec![0],
                uncompressed: true,
            }
        } else {
            let row_seeds = derive_row_seeds(seed, counter_no);
            Self {
                width: counter_size,
                depth: counter_no,
                table: vec![0.0; counter_size * counter_no],
                row_seeds,
                uncompressed: false,
            }
        }
    }

    /// Counter width (columns per row).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Counter depth (rows).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether this counter runs in uncompressed (exact) mode.
    pub fn is_uncompressed(&self) -> bool {
        self.uncompressed
    }

    fn column_for_row(&self, index: usize, row: usize) -> usize {
        if self.uncompressed {
            index
        } else {
            (hash_index(index as i64, self.row_seeds[row]) as usize) % self.width
        }
    }

    /// Conservative update: finds `current_min = min_j C[j][h_j(index)]`,
    /// then sets each row's cell to `max(C[j][h_j(index)], current_min +
    /// delta)` rather than blindly adding, so a collision in one row never
    /// inflates that row past what every other row already agrees on.
    pub fn update(&mut self, index: usize, delta: f64) {
        debug_assert!(delta >= 0.0, "HCounter updates must be non-negative");
        let columns: Vec<usize> = (0..self.depth).map(|row| self.column_for_row(index, row)).collect();

        let current_min = columns
            .iter()
            .enumerate()
            .map(|(row, &col)| self.table[row * self.width + col])
            .fold(f64::INFINITY, f64::min);

        let new_value = current_min + delta;
        for (row, &col) in columns.iter().enumerate() {
            let cell = &mut self.table[row * self.width + col];
            if *cell < new_value {
                *cell = new_value;
            }
        }
    }

    /// Point query: `min_j C[j][h_j(index)]`.
    pub fn count(&self, index: usize) -> f64 {
        (0..self.depth)
            .map(|row| {
                let col = self.column_for_row(index, row);
                self.table[row * self.width + col]
            })
            .fold(f64::INFINITY, f64::min)
    }

    /// Total mass held by the counter: the row sum for uncompressed mode,
    /// or the minimum row sum (a standard count-min under-estimator) for
    /// compressed mode.
    pub fn sum(&self) -> f64 {
        (0..self.depth)
            .map(|row| {
                let start = row * self.width;
                self.table[start..start + self.width].iter().sum::<f64>()
            })
            .fold(f64::INFINITY, f64::min)
    }

    /// Multiplies every cell by `r ∈ [0, 1]`, preserving non-negativity.
    pub fn scale(&mut self, r: f64) {
        debug_assert!((0.0..=1.0).contains(&r), "scale factor must be in [0, 1]");
        for cell in &mut self.table {
            *cell *= r;
        }
    }
}
