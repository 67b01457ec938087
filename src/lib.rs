//! adaptive_sketch: a streaming sketch for non-parametric density estimation
//!
//! Feeds an unbounded stream of real-valued observations into a bounded,
//! self-rebinning histogram: regions of high sample density get finer
//! resolution automatically, without any prior knowledge of the input
//! distribution. See [`Sketch`] for the main entry point.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cmap;
pub mod config;
pub mod counter;
pub mod density;
pub mod error;
pub mod hash;
pub mod measure;
pub mod query;
pub mod rebin;
pub mod sketch;
pub mod structures;
pub mod validation;

pub use cmap::{Cmap, RangeP};
pub use config::{KernelShape, SketchConf, SketchConfBuilder};
pub use density::{DensityPlot, DensityRecord};
pub use error::{Result, SketchError};
pub use measure::{Identity, Measure};
pub use sketch::Sketch;
pub use structures::{Structure, Structures};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sketch_round_trips_through_public_api() {
        let conf = SketchConf::builder(10, 2).cmap_bounds(0.0, 10.0).build().unwrap();
        let mut sketch: Sketch<f64, Identity> = Sketch::empty(conf, Identity);
        sketch.update(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(sketch.sum() > 0.0);
        assert!(sketch.probability(&0.0, &10.0) > 0.0);
        assert!(sketch.cdf(&5.0).is_finite());
        assert!(sketch.median().is_finite());
        assert!(sketch.density_plot().is_finite());
    }
}
