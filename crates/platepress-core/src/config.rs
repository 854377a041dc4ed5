//! Caller-facing configuration for a compression call.
//!
//! Everything here is plain data with `serde` support so the same options
//! can come from Rust code or a JS object through the WASM bindings.

use serde::{Deserialize, Serialize};

use crate::decode::FilterType;
use crate::error::CompressError;

/// Default byte budget: 100 KB.
pub const DEFAULT_MAX_BYTES: usize = 100 * 1024;

/// Default acceptance tolerance above the budget (5%).
pub const DEFAULT_TOLERANCE: f64 = 0.05;

/// The caller's byte budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompressionTarget {
    /// Maximum output size in bytes.
    pub max_bytes: usize,
    /// Fraction above `max_bytes` still accepted.
    pub tolerance: f64,
    /// Fraction of the budget a candidate must fill before it is accepted.
    ///
    /// At the default `0.0` the first candidate under the tolerance wins.
    /// A positive value keeps raising quality while candidates use less
    /// than this share of the budget.
    pub fill_ratio: f64,
}

impl Default for CompressionTarget {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            tolerance: DEFAULT_TOLERANCE,
            fill_ratio: 0.0,
        }
    }
}

impl CompressionTarget {
    /// A target with the given budget and default tolerance.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            ..Self::default()
        }
    }

    /// Builder-style setter for `fill_ratio`.
    pub fn with_fill_ratio(mut self, fill_ratio: f64) -> Self {
        self.fill_ratio = fill_ratio;
        self
    }

    /// Largest size accepted for a given budget.
    pub fn acceptance_limit(&self, budget: usize) -> f64 {
        budget as f64 * (1.0 + self.tolerance)
    }

    pub fn validate(&self) -> Result<(), CompressError> {
        if self.max_bytes == 0 {
            return Err(CompressError::InvalidTarget(
                "max_bytes must be greater than zero".to_string(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(CompressError::InvalidTarget(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        if !self.fill_ratio.is_finite() || !(0.0..1.0).contains(&self.fill_ratio) {
            return Err(CompressError::InvalidTarget(format!(
                "fill_ratio must be in [0, 1), got {}",
                self.fill_ratio
            )));
        }
        Ok(())
    }
}

/// Whether a source that already satisfies the budget is re-encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecompressPolicy {
    /// Re-encode every upload, normalising format, resolution and metadata.
    #[default]
    Always,
    /// Pass a JPEG that already fits `max_bytes` through untouched.
    WhenNeeded,
}

/// Options for one compression call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompressOptions {
    #[serde(flatten)]
    pub target: CompressionTarget,
    pub policy: RecompressPolicy,
    /// Resampling filter used when drawing onto the canvas.
    pub filter: FilterType,
    /// Run one tightened extra search if the first misses the budget.
    pub second_pass: bool,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            target: CompressionTarget::default(),
            policy: RecompressPolicy::Always,
            filter: FilterType::Lanczos3,
            second_pass: false,
        }
    }
}

impl CompressOptions {
    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self {
            target: CompressionTarget::new(max_bytes),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_target() {
        let target = CompressionTarget::default();
        assert_eq!(target.max_bytes, 102_400);
        assert_eq!(target.tolerance, 0.05);
        assert_eq!(target.fill_ratio, 0.0);
        assert!(target.validate().is_ok());
    }

    #[test]
    fn test_acceptance_limit() {
        let target = CompressionTarget::new(100_000);
        assert!((target.acceptance_limit(100_000) - 105_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_budget_rejected() {
        assert!(matches!(
            CompressionTarget::new(0).validate(),
            Err(CompressError::InvalidTarget(_))
        ));
    }

    #[test]
    fn test_bad_tolerance_rejected() {
        let mut target = CompressionTarget::default();
        target.tolerance = -0.1;
        assert!(target.validate().is_err());

        target.tolerance = f64::NAN;
        assert!(target.validate().is_err());
    }

    #[test]
    fn test_bad_fill_ratio_rejected() {
        assert!(CompressionTarget::default()
            .with_fill_ratio(1.0)
            .validate()
            .is_err());
        assert!(CompressionTarget::default()
            .with_fill_ratio(0.8)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_default_options() {
        let options = CompressOptions::default();
        assert_eq!(options.policy, RecompressPolicy::Always);
        assert_eq!(options.filter, FilterType::Lanczos3);
        assert!(!options.second_pass);
        assert_eq!(CompressOptions::with_max_bytes(50_000).target.max_bytes, 50_000);
    }
}
