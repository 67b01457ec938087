//! Derived read operations — `SketchProp`
//!
//! Every operation here aggregates across the full generation stack with
//! exponential age weighting `wk = exp(-k)`, `k = 0` at the youngest
//! generation. All of them are total: no `Result`, no panics on degenerate
//! input (NaN propagates, infinities saturate).

use crate::cmap::RangeP;
use crate::density::{DensityPlot, DensityRecord};
use crate::measure::Measure;
use crate::sketch::Sketch;
use crate::structures::Structures;

fn generation_weight(age: usize) -> f64 {
    (-(age as f64)).exp()
}

/// `fraction(i, s, e)`: the portion of a generation's bin counted toward a
/// `[lo, hi]` range query. Infinite-width tail bins contribute fully only
/// when the query itself is unbounded on that side; otherwise they
/// contribute zero, matching a "no density past the horizon" convention
/// for a half-open partition that has no further resolution out there.
fn bin_fraction(range: RangeP, lo: f64, hi: f64) -> f64 {
    let overlap = range.overlap_length(lo, hi);
    if overlap == 0.0 {
        0.0
    } else if range.length().is_infinite() {
        if overlap.is_infinite() {
            1.0
        } else {
            0.0
        }
    } else {
        overlap / range.length()
    }
}

/// Weighted partial count over `[lo, hi]`, aggregated across every
/// generation in the stack.
fn weighted_count(structures: &Structures, lo: f64, hi: f64) -> f64 {
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (age, structure) in structures.iter_aged() {
        let wk = generation_weight(age);
        let mut partial = 0.0;
        for (i, range) in structure.cmap.bins().iter().enumerate() {
            let frac = bin_fraction(*range, lo, hi);
            if frac > 0.0 {
                partial += frac * structure.counter.count(i);
            }
        }
        numerator += wk * partial;
        denominator += wk;
    }
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Total observed mass, aggregated the same way as `count` but over
/// `(-∞, +∞)`.
fn weighted_sum(structures: &Structures) -> f64 {
    weighted_count(structures, f64::NEG_INFINITY, f64::INFINITY)
}

/// `probability(s, e) = count(s, e) / sum`, falling back to a flat,
/// non-informative density over the young generation's finite support when
/// the sketch hasn't observed any mass yet.
fn probability(structures: &Structures, lo: f64, hi: f64) -> f64 {
    let total = weighted_sum(structures);
    if total > 0.0 {
        weighted_count(structures, lo, hi) / total
    } else {
        let young = structures.young();
        let span = young.cmap.max() - young.cmap.min();
        if span <= 0.0 {
            return 0.0;
        }
        let flat_density = 1.0 / span;
        let length = (hi - lo).max(0.0);
        (flat_density * length).min(1.0)
    }
}

/// The young generation's sampling plot: one density record per bin of the
/// young `Cmap`, density computed from the full stack's weighted
/// `probability`. Shared between the public
/// `Sketch::density_plot` and rebinning's prior-evidence input.
pub(crate) fn sampling_plot(structures: &Structures, _cmap_size: usize) -> DensityPlot {
    let bins = structures.young().cmap.bins();
    let records = bins
        .into_iter()
        .map(|range| {
            let prob = probability(structures, range.start, range.end);
            let density = if range.length().is_finite() && range.length() > 0.0 {
                prob / range.length()
            } else {
                0.0
            };
            DensityRecord { range, density }
        })
        .collect();
    DensityPlot::new(records)
}

impl<A, M: Measure<A>> Sketch<A, M> {
    /// Converts `s`/`e` through the measure and returns the weighted
    /// partial count over `[s, e]`.
    pub fn count(&self, s: &A, e: &A) -> f64 {
        let (p_s, p_e) = (self.measure_to(s), self.measure_to(e));
        let (lo, hi) = (p_s.min(p_e), p_s.max(p_e));
        weighted_count(self.structures(), lo, hi)
    }

    /// Total observed mass.
    pub fn sum(&self) -> f64 {
        weighted_sum(self.structures())
    }

    /// `count(s, e) / sum`, or a flat-density fallback before any mass has
    /// been observed.
    pub fn probability(&self, s: &A, e: &A) -> f64 {
        let (p_s, p_e) = (self.measure_to(s), self.measure_to(e));
        let (lo, hi) = (p_s.min(p_e), p_s.max(p_e));
        probability(self.structures(), lo, hi)
    }

    /// Locates the young-Cmap bin containing `measure.to(a)`, forms its
    /// three-bin neighbourhood, and returns the piecewise-linear
    /// interpolation of per-bin densities at that point. Clamps to the nearest finite neighbour's density past
    /// the outermost finite boundary.
    pub fn fast_pdf(&self, a: &A) -> f64 {
        let p = self.measure_to(a);
        let young = &self.structures().young().cmap;
        let bins = young.bins();
        let n = bins.len();
        let i = young.apply(p);

        let density_at_bin = |idx: usize| -> f64 {
            let range = bins[idx];
            let prob = probability(self.structures(), range.start, range.end);
            if range.length().is_finite() && range.length() > 0.0 {
                prob / range.length()
            } else {
                0.0
            }
        };
        let center_of = |idx: usize| -> Option<f64> {
            let range = bins[idx];
            if range.length().is_finite() {
                Some(range.start + range.length() / 2.0)
            } else {
                None
            }
        };

        // Nearest finite neighbours around bin i, clamping at either edge.
        let finite_lo = 1usize;
        let finite_hi = n.saturating_sub(2);
        if finite_lo > finite_hi {
            return density_at_bin(finite_lo.min(n - 1));
        }
        let i_clamped = i.clamp(finite_lo, finite_hi);

        let left = if i_clamped > finite_lo { i_clamped - 1 } else { finite_lo };
        let right = if i_clamped < finite_hi { i_clamped + 1 } else { finite_hi };

        match (center_of(left), center_of(i_clamped), center_of(right)) {
            (Some(cl), Some(cm), Some(cr)) if cl < cr => {
                let dl = density_at_bin(left);
                let dm = density_at_bin(i_clamped);
                let dr = density_at_bin(right);
                if p <= cl {
                    dl
                } else if p >= cr {
                    dr
                } else if p <= cm {
                    if cm > cl {
                        dl + (dm - dl) * (p - cl) / (cm - cl)
                    } else {
                        dm
                    }
                } else if cr > cm {
                    dm + (dr - dm) * (p - cm) / (cr - cm)
                } else {
                    dm
                }
            }
            _ => density_at_bin(i_clamped),
        }
    }

    /// Alias for [`Sketch::fast_pdf`] — this crate has no abstract
    /// distribution layer, so `pdf` is just the sketch's own estimator.
    pub fn pdf(&self, a: &A) -> f64 {
        self.fast_pdf(a)
    }

    /// Integrates the sampling plot up to `measure.to(a)`, linearly
    /// interpolating within the bin containing it.
    /// Outside the young Cmap's finite support, treats the corresponding
    /// tail's mass as occurring exactly at the boundary (a flat step),
    /// since a half-open infinite bin carries no further internal
    /// resolution.
    pub fn cdf(&self, a: &A) -> f64 {
        let p = self.measure_to(a);
        let bins = self.structures().young().cmap.bins();
        let mut cumulative = 0.0;
        for range in bins {
            if range.contains(p) {
                if range.length().is_infinite() {
                    return if range.start == f64::NEG_INFINITY {
                        cumulative
                    } else {
                        cumulative + probability(self.structures(), range.start, range.end)
                    };
                }
                let prob = probability(self.structures(), range.start, range.end);
                let t = ((p - range.start) / range.length()).clamp(0.0, 1.0);
                return (cumulative + prob * t).clamp(0.0, 1.0);
            }
            cumulative += probability(self.structures(), range.start, range.end);
        }
        cumulative.clamp(0.0, 1.0)
    }

    /// The inverse-CDF at `0.5`: the point where the young Cmap's bins'
    /// cumulative probability first reaches one half, linearly
    /// interpolated within that bin.
    pub fn median(&self) -> f64 {
        let bins = self.structures().young().cmap.bins();
        let mut cumulative = 0.0;
        for range in &bins {
            let prob = probability(self.structures(), range.start, range.end);
            let next = cumulative + prob;
            if next >= 0.5 {
                if range.length().is_infinite() {
                    return if range.start == f64::NEG_INFINITY {
                        range.end
                    } else {
                        range.start
                    };
                }
                let t = if prob > 0.0 { (0.5 - cumulative) / prob } else { 0.0 };
                return range.start + t.clamp(0.0, 1.0) * range.length();
            }
            cumulative = next;
        }
        bins.last().map_or(0.0, |r| r.start)
    }

    fn measure_to(&self, a: &A) -> f64 {
        self.measure().to(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SketchConf;
    use crate::measure::Identity;

    fn sketch() -> Sketch<f64, Identity> {
        let conf = SketchConf::builder(10, 2)
            .cmap_bounds(-10.0, 10.0)
            .counter_size(10)
            .counter_no(2)
            .queue_size(1024)
            .start_threshold(1024)
            .build()
            .unwrap();
        Sketch::empty(conf, Identity)
    }

    #[test]
    fn test_construction_structures_size_one() {
        assert_eq!(sketch().structures_len(), 1);
    }

    #[test]
    fn test_count_after_updates_bounded_by_total() {
        let mut s = sketch();
        let values: Vec<f64> = (1..10).map(|i| i as f64).collect();
        s.update(&values);
        assert!(s.count(&1.0, &5.0) < 10.0);
        assert!(s.count(&1.0, &5.0) > 0.0);
    }

    #[test]
    fn test_narrow_update_produces_local_count() {
        let mut s = sketch();
        s.narrow_update(&0.0);
        assert!(s.count(&-1.0, &1.0) > 0.0);
    }

    #[test]
    fn test_probability_flat_fallback_on_fresh_sketch() {
        let s = sketch();
        assert!(s.probability(&0.0, &1.0) > 0.0);
    }

    #[test]
    fn test_probability_concentrates_after_single_update() {
        let mut s = sketch();
        s.narrow_update(&-1.0);
        assert!(s.probability(&f64::NEG_INFINITY, &0.0) > 0.9);
        assert!(s.probability(&0.0, &f64::INFINITY) < 0.1);
    }

    #[test]
    fn test_sum_after_updates() {
        let mut s = sketch();
        let values: Vec<f64> = (1..5).map(|i| i as f64).collect();
        s.update(&values);
        assert!((s.sum() - 4.0).abs() < 0.5);
    }

    #[test]
    fn test_sum_decreases_after_rearrange() {
        let mut s = sketch();
        let values: Vec<f64> = (1..5).map(|i| i as f64).collect();
        s.update(&values);
        let before = s.sum();
        s.rearrange();
        let after = s.sum();
        assert!(after < before);
        assert!(after > 0.0);
    }

    #[test]
    fn test_cdf_is_monotone_and_bounded() {
        let mut s = sketch();
        let values: Vec<f64> = (-5..5).map(|i| i as f64).collect();
        s.update(&values);
        let xs = [-20.0, -5.0, -1.0, 0.0, 1.0, 5.0, 20.0];
        let mut prev = 0.0;
        for &x in &xs {
            let c = s.cdf(&x);
            assert!((0.0..=1.0).contains(&c));
            assert!(c >= prev - 1e-9);
            prev = c;
        }
    }

    #[test]
    fn test_density_plot_has_no_nans_and_matches_bounds() {
        let mut s = sketch();
        let values: Vec<f64> = (-5..5).map(|i| i as f64).collect();
        s.update(&values);
        let plot = s.density_plot();
        assert!(plot.is_finite());
        assert_eq!(plot.records.first().unwrap().range.end, -10.0);
        assert_eq!(plot.records.last().unwrap().range.start, 10.0);
    }

    #[test]
    fn test_fast_pdf_finite_at_extremes() {
        let mut s = sketch();
        let values: Vec<f64> = (-5..5).map(|i| i as f64).collect();
        s.update(&values);
        assert!(s.fast_pdf(&-1000.0).is_finite());
        assert!(s.fast_pdf(&1000.0).is_finite());
        assert!(s.pdf(&0.0).is_finite());
    }

    #[test]
    fn test_median_within_support() {
        let mut s = sketch();
        let values: Vec<f64> = (-5..5).map(|i| i as f64).collect();
        s.update(&values);
        let m = s.median();
        assert!((-10.0..=10.0).contains(&m));
    }
}
