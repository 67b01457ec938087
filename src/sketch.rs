//! `Sketch<A>` and the `PeriodicSketch` update policy
//!
//! A sketch is logically single-writer: every public mutator takes
//! `&mut self` and runs to completion synchronously, with no suspension
//! points and no sharing across threads.

use std::marker::PhantomData;

use crate::cmap::Cmap;
use crate::config::SketchConf;
use crate::counter::HCounter;
use crate::density::DensityPlot;
use crate::measure::Measure;
use crate::rebin;
use crate::structures::{Structure, Structures};

/// A streaming density sketch over domain `A`, placed on the real line via
/// `M: Measure<A>`.
///
/// Every mutator is a `PeriodicSketch`: observations are narrow-updated
/// into the young generation immediately (so reads stay live) and also
/// buffered; a deep update fires once the buffer reaches `conf.queue_size`
/// or `conf.start_threshold` arrivals have accumulated since the last deep
/// update, whichever comes first.
#[derive(Debug, Clone)]
pub struct Sketch<A, M: Measure<A>> {
    measure: M,
    conf: SketchConf,
    structures: Structures,
    buffer: Vec<(f64, f64)>,
    arrivals_since_deep: usize,
    _domain: PhantomData<fn(A)>,
}

impl<A, M: Measure<A>> Sketch<A, M> {
    /// Builds an empty sketch: one generation, a uniform initial `Cmap`,
    /// an all-zero `HCounter`.
    pub fn empty(conf: SketchConf, measure: M) -> Self {
        let cmap = Cmap::uniform(&conf);
        let counter = HCounter::new(conf.cmap_size, conf.counter_size, conf.counter_no, conf.seed);
        let structures = Structures::new(Structure::new(cmap, counter), conf.cmap_no);
        Self {
            measure,
            conf,
            structures,
            buffer: Vec::with_capacity(conf.queue_size),
            arrivals_since_deep: 0,
            _domain: PhantomData,
        }
    }

    /// The configuration this sketch was built with.
    pub fn conf(&self) -> &SketchConf {
        &self.conf
    }

    /// Number of generations currently retained (`<= conf.cmap_no`).
    pub fn structures_len(&self) -> usize {
        self.structures.len()
    }

    pub(crate) fn structures(&self) -> &Structures {
        &self.structures
    }

    pub(crate) fn measure(&self) -> &M {
        &self.measure
    }

    /// Streams a batch of observations through `narrow_update`, each one
    /// individually subject to the deep-update trigger.
    pub fn update(&mut self, items: &[A]) {
        for a in items {
            self.narrow_update(a);
        }
    }

    /// Increments the young generation's counter at `youngCmap(measure.to(a))`
    /// by `1`, buffers the observation for the next deep update, and fires
    /// a deep update if the trigger condition is met.
    pub fn narrow_update(&mut self, a: &A) {
        let p = self.measure.to(a);
        let idx = self.structures.young().cmap.apply(p);
        self.structures.young_mut().counter.update(idx, 1.0);
        self.buffer.push((p, 1.0));
        self.arrivals_since_deep += 1;

        if self.buffer.len() >= self.conf.queue_size || self.arrivals_since_deep >= self.conf.start_threshold {
            self.flush_deep_update();
        }
    }

    /// Explicitly triggers a deep update with whatever observations are
    /// currently buffered, even if the trigger condition hasn't fired yet.
    pub fn deep_update(&mut self) {
        self.flush_deep_update();
    }

    fn flush_deep_update(&mut self) {
        let observations = std::mem::take(&mut self.buffer);
        self.rebuild_young(observations);
        self.arrivals_since_deep = 0;
    }

    /// Rotates the generation stack with zero new observations — a pure
    /// refresh that promotes the current young generation one slot older
    /// and installs a fresh, empty young generation built from the
    /// promoted generation's own sampling plot.
    ///
    /// Unlike `deep_update`, this does not touch the pending buffer: a
    /// `rearrange` call mid-batch does not lose observations that haven't
    /// triggered a flush yet.
    pub fn rearrange(&mut self) {
        self.rebuild_young(Vec::new());
    }

    fn rebuild_young(&mut self, observations: Vec<(f64, f64)>) {
        let prior_plot = crate::query::sampling_plot(&self.structures, self.conf.cmap_size);
        let current_cmap = &self.structures.young().cmap;
        let new_cmap = rebin::rebin(current_cmap, &prior_plot, &observations, &self.conf);

        let mut new_counter = HCounter::new(
            self.conf.cmap_size,
            self.conf.counter_size,
            self.conf.counter_no,
            self.conf.seed,
        );
        for &(p, weight) in &observations {
            let idx = new_cmap.apply(p);
            new_counter.update(idx, weight);
        }

        self.structures.push_front_bounded(Structure::new(new_cmap, new_counter));
    }

    /// The raw density plot over the young generation's bins, combined
    /// with the full generation stack's weighted counts.
    pub fn density_plot(&self) -> DensityPlot {
        crate::query::sampling_plot(&self.structures, self.conf.cmap_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::Identity;

    fn conf() -> SketchConf {
        SketchConf::builder(10, 2)
            .cmap_bounds(0.0, 10.0)
            .counter_size(10)
            .counter_no(2)
            .queue_size(1024)
            .start_threshold(1024)
            .build()
            .unwrap()
    }

    #[test]
    fn test_construction_starts_with_one_generation() {
        let sketch: Sketch<f64, Identity> = Sketch::empty(conf(), Identity);
        assert_eq!(sketch.structures_len(), 1);
    }

    #[test]
    fn test_narrow_update_does_not_change_cmap() {
        let mut sketch: Sketch<f64, Identity> = Sketch::empty(conf(), Identity);
        let before = sketch.structures().young().cmap.clone();
        sketch.narrow_update(&0.0);
        let after = sketch.structures().young().cmap.clone();
        assert_eq!(before, after);
    }

    #[test]
    fn test_deep_update_grows_until_capacity_then_caps() {
        let mut sketch: Sketch<f64, Identity> = Sketch::empty(conf(), Identity);
        sketch.update(&[1.0, 2.0, 3.0]);
        sketch.deep_update();
        assert_eq!(sketch.structures_len(), 2);
        sketch.deep_update();
        assert_eq!(sketch.structures_len(), 2);
    }

    #[test]
    fn test_rearrange_does_not_consume_buffer() {
        let mut sketch: Sketch<f64, Identity> = Sketch::empty(conf(), Identity);
        sketch.narrow_update(&5.0);
        sketch.rearrange();
        assert_eq!(sketch.structures_len(), 2);
    }

    #[test]
    fn test_deep_update_changes_young_cmap_when_data_falls_in_support() {
        let mut sketch: Sketch<f64, Identity> = Sketch::empty(conf(), Identity);
        let before = sketch.structures().young().cmap.clone();
        let clustered: Vec<f64> = (0..200).map(|i| 5.0 + (i as f64 - 100.0) * 0.001).collect();
        sketch.update(&clustered);
        sketch.deep_update();
        let after = sketch.structures().young().cmap.clone();
        assert_ne!(before, after);
    }
}
