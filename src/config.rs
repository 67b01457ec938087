//! `SketchConf` — every recognized configuration field and its effect

use crate::error::Result;
use crate::validation;

/// The data-kernel shape used when smearing buffered observations during
/// rebinning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelShape {
    /// Triangular kernel: linear falloff over the window.
    Triangular,
    /// Gaussian kernel: the window is treated as one standard deviation.
    Gaussian,
}

/// Configuration for a `Sketch`.
///
/// Construct via [`SketchConfBuilder`] rather than the struct literal so
/// invalid combinations are rejected at construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct SketchConf {
    /// Finite bins per generation. Must be `>= 2`.
    pub cmap_size: usize,
    /// Generations retained in the structures stack. Must be `>= 1`.
    pub cmap_no: usize,
    /// Initial uniform Cmap lower bound. `None` means auto-derived from the
    /// first batch of observations.
    pub cmap_start: Option<f64>,
    /// Initial uniform Cmap upper bound. `None` means auto-derived.
    pub cmap_end: Option<f64>,
    /// HCounter width. Must be `>= 1`.
    pub counter_size: usize,
    /// HCounter depth. Must be `>= 1`.
    pub counter_no: usize,
    /// PeriodicSketch buffer capacity. Must be `>= 1`.
    pub queue_size: usize,
    /// Deep-update trigger: a deep update fires after this many arrivals
    /// even if the queue isn't yet full.
    pub start_threshold: usize,
    /// Rebinning smoothing window, as a ratio of the current bin width.
    /// Must be `> 0`.
    pub data_kernel_window: f64,
    /// Shape of the data kernel used while smoothing.
    pub kernel_shape: KernelShape,
    /// Whether to mirror-reflect mass that would fall outside
    /// `[cmap.min, cmap.max]` during rebinning.
    pub boundary_correction: bool,
    /// Sketch-wide seed HCounter's compressed-mode hash rows are derived
    /// from, so runs are reproducible given the same configuration and
    /// stream.
    pub seed: u64,
}

impl SketchConf {
    /// Start building a configuration with the two required sizing
    /// parameters; every other field takes a sensible default that can be
    /// overridden via the builder.
    pub fn builder(cmap_size: usize, cmap_no: usize) -> SketchConfBuilder {
        SketchConfBuilder::new(cmap_size, cmap_no)
    }

    /// Whether the HCounter for this configuration runs uncompressed
    /// (`cmap_size <= counter_size`, exact indexing, `d = 1`).
    pub fn is_uncompressed(&self) -> bool {
        self.cmap_size <= self.counter_size
    }
}

/// Fluent builder for [`SketchConf`].
///
/// `SketchConf` has nine knobs, too many for either a single constructor
/// or a struct literal to stay readable, so construction goes through a
/// terse two-argument entry point (`cmap_size`, `cmap_no`) plus setters
/// for everything else.
#[derive(Debug, Clone)]
pub struct SketchConfBuilder {
    cmap_size: usize,
    cmap_no: usize,
    cmap_start: Option<f64>,
    cmap_end: Option<f64>,
    counter_size: usize,
    counter_no: usize,
    queue_size: usize,
    start_threshold: usize,
    data_kernel_window: f64,
    kernel_shape: KernelShape,
    boundary_correction: bool,
    seed: u64,
}

impl SketchConfBuilder {
    /// Creates a new builder with `cmap_size` finite bins and `cmap_no`
    /// retained generations, and otherwise-reasonable defaults.
    pub fn new(cmap_size: usize, cmap_no: usize) -> Self {
        Self {
            cmap_size,
            cmap_no,
            cmap_start: None,
            cmap_end: None,
            counter_size: cmap_size,
            counter_no: 1,
            queue_size: 1024,
            start_threshold: 1024,
            data_kernel_window: 1.0,
            kernel_shape: KernelShape::Triangular,
            boundary_correction: true,
            seed: 0x5bd1_e995,
        }
    }

    /// Sets the initial uniform Cmap bounds.
    pub fn cmap_bounds(mut self, start: f64, end: f64) -> Self {
        self.cmap_start = Some(start);
        self.cmap_end = Some(end);
        self
    }

    /// Sets the HCounter width.
    pub fn counter_size(mut self, counter_size: usize) -> Self {
        self.counter_size = counter_size;
        self
    }

    /// Sets the HCounter depth.
    pub fn counter_no(mut self, counter_no: usize) -> Self {
        self.counter_no = counter_no;
        self
    }

    /// Sets the PeriodicSketch buffer capacity.
    pub fn queue_size(mut self, queue_size: usize) -> Self {
        self.queue_size = queue_size;
        self
    }

    /// Sets the deep-update arrival threshold.
    pub fn start_threshold(mut self, start_threshold: usize) -> Self {
        self.start_threshold = start_threshold;
        self
    }

    /// Sets the rebinning smoothing window ratio.
    pub fn data_kernel_window(mut self, data_kernel_window: f64) -> Self {
        self.data_kernel_window = data_kernel_window;
        self
    }

    /// Sets the data kernel shape used while smoothing.
    pub fn kernel_shape(mut self, kernel_shape: KernelShape) -> Self {
        self.kernel_shape = kernel_shape;
        self
    }

    /// Sets whether boundary correction (mirror reflection) is applied.
    pub fn boundary_correction(mut self, boundary_correction: bool) -> Self {
        self.boundary_correction = boundary_correction;
        self
    }

    /// Sets the sketch-wide hash seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validates every field and produces a [`SketchConf`].
    ///
    /// # Errors
    /// Returns [`crate::error::SketchError::InvalidConfig`] if any field
    /// violates its own constraints.
    pub fn build(self) -> Result<SketchConf> {
        validation::validate_min_usize(self.cmap_size, 2, "cmap_size")?;
        validation::validate_min_usize(self.cmap_no, 1, "cmap_no")?;
        validation::validate_min_usize(self.counter_size, 1, "counter_size")?;
        validation::validate_min_usize(self.counter_no, 1, "counter_no")?;
        validation::validate_min_usize(self.queue_size, 1, "queue_size")?;
        validation::validate_positive_f64(self.data_kernel_window, "data_kernel_window")?;
        validation::validate_bounds(self.cmap_start, self.cmap_end)?;

        Ok(SketchConf {
            cmap_size: self.cmap_size,
            cmap_no: self.cmap_no,
            cmap_start: self.cmap_start,
            cmap_end: self.cmap_end,
            counter_size: self.counter_size,
            counter_no: self.counter_no,
            queue_size: self.queue_size,
            start_threshold: self.start_threshold,
            data_kernel_window: self.data_kernel_window,
            kernel_shape: self.kernel_shape,
            boundary_correction: self.boundary_correction,
            seed: self.seed,
        })
    }
}
