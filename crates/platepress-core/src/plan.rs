//! Dimension and quality planning.
//!
//! Picks the starting point of the search from the encoded size of the
//! source. Bigger uploads start smaller and at lower quality so the search
//! converges in a handful of encodes instead of burning its attempt budget.

use serde::{Deserialize, Serialize};

use crate::config::CompressionTarget;
use crate::decode::{clamp_axis, fit_dimensions};

/// Minimum width/height the pipeline will shrink an axis to.
pub const MIN_DIMENSION: u32 = 400;

/// Source-size bracket selecting the initial plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tier {
    /// More than 15 MB.
    Huge,
    /// More than 10 MB, up to 15 MB.
    VeryLarge,
    /// More than 5 MB, up to 10 MB.
    Large,
    /// More than 2 MB, up to 5 MB.
    Medium,
    /// 2 MB or less.
    Small,
}

impl Tier {
    /// Classify an encoded size in megabytes.
    pub fn from_size_mb(size_mb: f64) -> Self {
        if size_mb > 15.0 {
            Tier::Huge
        } else if size_mb > 10.0 {
            Tier::VeryLarge
        } else if size_mb > 5.0 {
            Tier::Large
        } else if size_mb > 2.0 {
            Tier::Medium
        } else {
            Tier::Small
        }
    }

    /// Square canvas cap for this tier.
    pub fn max_edge(self) -> u32 {
        match self {
            Tier::Huge => 800,
            Tier::VeryLarge => 900,
            Tier::Large => 950,
            Tier::Medium => 1000,
            Tier::Small => 1024,
        }
    }

    /// Starting quality factor for this tier.
    pub fn initial_quality(self) -> f32 {
        match self {
            Tier::Huge => 0.60,
            Tier::VeryLarge => 0.65,
            Tier::Large => 0.72,
            Tier::Medium => 0.78,
            Tier::Small => 0.82,
        }
    }

    /// Share of the caller's budget the search aims for.
    pub fn budget_ratio(self) -> f64 {
        match self {
            Tier::Huge => 0.90,
            Tier::VeryLarge => 0.95,
            _ => 1.0,
        }
    }
}

/// The immutable starting point of one search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanParameters {
    pub tier: Tier,
    /// Upright dimensions of the decoded source.
    pub native_width: u32,
    pub native_height: u32,
    /// Initial canvas size after aspect fit and floor.
    pub target_width: u32,
    pub target_height: u32,
    pub initial_quality: f32,
    /// Budget the search actually aims for.
    pub max_bytes: usize,
}

impl PlanParameters {
    /// Per-axis floor: `MIN_DIMENSION`, or the native size if that is smaller.
    pub fn floor(&self) -> (u32, u32) {
        (
            MIN_DIMENSION.min(self.native_width),
            MIN_DIMENSION.min(self.native_height),
        )
    }

    /// Clamp a proposed canvas size into `[floor, native]` on both axes.
    pub fn clamp(&self, width: u32, height: u32) -> (u32, u32) {
        (
            clamp_axis(width, self.native_width, MIN_DIMENSION),
            clamp_axis(height, self.native_height, MIN_DIMENSION),
        )
    }

    /// Plan for a second, stricter search after the first missed its budget.
    ///
    /// Aims for 95% of the budget, shrinks the canvas cap by 100 px (not
    /// below 600 px) and starts 0.1 lower in quality (not below 0.5).
    pub fn tightened(&self) -> Self {
        let cap = self.tier.max_edge().saturating_sub(100).max(600);
        let (target_width, target_height) = fit_dimensions(
            (self.native_width, self.native_height),
            (cap, cap),
            MIN_DIMENSION,
        );
        Self {
            target_width,
            target_height,
            initial_quality: (self.initial_quality - 0.1).max(0.5),
            max_bytes: ((self.max_bytes as f64) * 0.95).round() as usize,
            ..*self
        }
    }
}

/// Derive the starting plan from the source's encoded length and upright size.
pub fn plan(source_len: usize, native: (u32, u32), target: &CompressionTarget) -> PlanParameters {
    let size_mb = source_len as f64 / (1024.0 * 1024.0);
    let tier = Tier::from_size_mb(size_mb);
    let edge = tier.max_edge();

    let (target_width, target_height) = fit_dimensions(native, (edge, edge), MIN_DIMENSION);
    let max_bytes = ((target.max_bytes as f64) * tier.budget_ratio()).round() as usize;

    PlanParameters {
        tier,
        native_width: native.0,
        native_height: native.1,
        target_width,
        target_height,
        initial_quality: tier.initial_quality(),
        max_bytes: max_bytes.max(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: usize = 1024 * 1024;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(Tier::from_size_mb(20.0), Tier::Huge);
        assert_eq!(Tier::from_size_mb(15.0), Tier::VeryLarge);
        assert_eq!(Tier::from_size_mb(10.5), Tier::VeryLarge);
        assert_eq!(Tier::from_size_mb(10.0), Tier::Large);
        assert_eq!(Tier::from_size_mb(5.0), Tier::Medium);
        assert_eq!(Tier::from_size_mb(2.0), Tier::Small);
        assert_eq!(Tier::from_size_mb(0.05), Tier::Small);
    }

    #[test]
    fn test_plan_huge_source() {
        let plan = plan(20 * MB, (4000, 3000), &CompressionTarget::default());

        assert_eq!(plan.tier, Tier::Huge);
        assert_eq!((plan.target_width, plan.target_height), (800, 600));
        assert_eq!(plan.initial_quality, 0.60);
        assert_eq!(plan.max_bytes, 92_160); // 90 KB
    }

    #[test]
    fn test_plan_very_large_source() {
        let plan = plan(12 * MB, (3000, 4000), &CompressionTarget::default());

        assert_eq!(plan.tier, Tier::VeryLarge);
        assert_eq!((plan.target_width, plan.target_height), (675, 900));
        assert_eq!(plan.initial_quality, 0.65);
        assert_eq!(plan.max_bytes, 97_280); // 95 KB
    }

    #[test]
    fn test_plan_middle_tiers_keep_budget() {
        let target = CompressionTarget::default();

        let large = plan(7 * MB, (5000, 5000), &target);
        assert_eq!(large.tier, Tier::Large);
        assert_eq!((large.target_width, large.target_height), (950, 950));
        assert_eq!(large.initial_quality, 0.72);
        assert_eq!(large.max_bytes, target.max_bytes);

        let medium = plan(3 * MB, (2000, 1000), &target);
        assert_eq!(medium.tier, Tier::Medium);
        assert_eq!((medium.target_width, medium.target_height), (1000, 500));
        assert_eq!(medium.initial_quality, 0.78);
        assert_eq!(medium.max_bytes, target.max_bytes);
    }

    #[test]
    fn test_plan_small_source_never_upscales() {
        let plan = plan(50 * 1024, (600, 600), &CompressionTarget::default());

        assert_eq!(plan.tier, Tier::Small);
        assert_eq!((plan.target_width, plan.target_height), (600, 600));
        assert_eq!(plan.initial_quality, 0.82);
        assert_eq!(plan.floor(), (400, 400));
    }

    #[test]
    fn test_plan_tiny_source_floor() {
        let plan = plan(4 * 1024, (120, 80), &CompressionTarget::default());

        assert_eq!((plan.target_width, plan.target_height), (120, 80));
        assert_eq!(plan.floor(), (120, 80));
    }

    #[test]
    fn test_plan_scales_custom_budget() {
        let plan = plan(16 * MB, (4000, 3000), &CompressionTarget::new(200_000));
        assert_eq!(plan.max_bytes, 180_000);
    }

    #[test]
    fn test_clamp() {
        let plan = plan(20 * MB, (4000, 3000), &CompressionTarget::default());
        assert_eq!(plan.clamp(100, 5000), (400, 3000));
        assert_eq!(plan.clamp(500, 450), (500, 450));
    }

    #[test]
    fn test_tightened() {
        let first = plan(20 * MB, (4000, 3000), &CompressionTarget::default());
        let second = first.tightened();

        // 800 - 100 = 700 cap
        assert_eq!((second.target_width, second.target_height), (700, 525));
        assert!((second.initial_quality - 0.5).abs() < 1e-6);
        assert_eq!(second.max_bytes, 87_552);
        assert_eq!(second.tier, first.tier);
    }

    #[test]
    fn test_tightened_cap_floor() {
        let first = plan(MB, (4000, 3000), &CompressionTarget::default());
        let second = first.tightened();

        // 1024 - 100 = 924 cap, quality 0.82 - 0.1
        assert_eq!((second.target_width, second.target_height), (924, 693));
        assert!((second.initial_quality - 0.72).abs() < 1e-6);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: Larger sources never get a larger cap or higher starting quality.
        #[test]
        fn prop_tiers_monotone(a in 0usize..=40 * 1024 * 1024, b in 0usize..=40 * 1024 * 1024) {
            let (small, large) = if a <= b { (a, b) } else { (b, a) };
            let target = CompressionTarget::default();
            let ps = plan(small, (4000, 4000), &target);
            let pl = plan(large, (4000, 4000), &target);

            prop_assert!(pl.target_width <= ps.target_width);
            prop_assert!(pl.initial_quality <= ps.initial_quality);
            prop_assert!(pl.max_bytes <= ps.max_bytes);
        }

        /// Property: Planned dimensions stay inside [floor, native].
        #[test]
        fn prop_plan_dimensions_bounded(
            len in 1usize..=40 * 1024 * 1024,
            width in 1u32..=9000,
            height in 1u32..=9000,
        ) {
            let p = plan(len, (width, height), &CompressionTarget::default());
            let (fw, fh) = p.floor();

            prop_assert!(p.target_width >= fw && p.target_width <= width);
            prop_assert!(p.target_height >= fh && p.target_height <= height);
            prop_assert!(p.target_width.max(p.target_height) <= p.tier.max_edge().max(MIN_DIMENSION));
        }
    }
}
