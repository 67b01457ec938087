//! Validation utilities for `SketchConf` bounds checking

use crate::error::{Result, SketchError};

/// Validate that a `usize` parameter meets a minimum value.
pub fn validate_min_usize(value: usize, min: usize, param: &str) -> Result<()> {
    if value < min {
        return Err(SketchError::InvalidConfig {
            param: param.to_string(),
            value: value.to_string(),
            constraint: format!("must be >= {}", min),
        });
    }
    Ok(())
}

/// Validate that a real-valued parameter is strictly positive.
pub fn validate_positive_f64(value: f64, param: &str) -> Result<()> {
    if !(value > 0.0) || value.is_nan() {
        return Err(SketchError::InvalidConfig {
            param: param.to_string(),
            value: value.to_string(),
            constraint: "must be > 0".to_string(),
        });
    }
    Ok(())
}

/// Validate that `start < end` for an optional pair of initial Cmap bounds.
///
/// Equal bounds are rejected, not just inverted ones: `Cmap::uniform` needs
/// a strictly positive span to place distinct interior boundaries, and a
/// zero span would otherwise produce a non-strictly-increasing `Cmap`.
pub fn validate_bounds(start: Option<f64>, end: Option<f64>) -> Result<()> {
    if let (Some(s), Some(e)) = (start, end) {
        if s.is_nan() || e.is_nan() {
            return Err(SketchError::InvalidConfig {
                param: "cmap_start/cmap_end".to_string(),
                value: format!("{}/{}", s, e),
                constraint: "must not be NaN".to_string(),
            });
        }
        if s >= e {
            return Err(SketchError::InvalidConfig {
                param: "cmap_start/cmap_end".to_string(),
                value: format!("{}/{}", s, e),
                constraint: "cmap_start must be < cmap_end".to_string(),
            });
        }
    }
    Ok(())
}
