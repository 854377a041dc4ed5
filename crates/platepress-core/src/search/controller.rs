//! The search state machine.
//!
//! `SearchController` never encodes anything itself. It hands out an
//! `EncodeRequest`, the driver turns that into a `CandidateEncoding`, and
//! `evaluate` decides what happens next:
//!
//! ```text
//! Init -> Encoding -> Evaluate -> Accept
//!            ^           |------> AdjustQuality     -+
//!            |           |------> AdjustResolution  -+
//!            |           '------> Exhausted          |
//!            '-------------------------------------- +
//! ```

use serde::{Deserialize, Serialize};

use super::{
    ESCALATION_HEADROOM, ESCALATION_LOWER, ESCALATION_MIN_ATTEMPTS, ESCALATION_QUALITY,
    ESCALATION_RATIO, ESCALATION_UPPER, MAX_ATTEMPTS, QUALITY_LOWER, QUALITY_UPPER,
};
use crate::config::CompressionTarget;
use crate::encode::CandidateEncoding;
use crate::plan::PlanParameters;

/// What the driver should encode next.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeRequest {
    /// 1-based attempt number.
    pub attempt: u32,
    pub width: u32,
    pub height: u32,
    pub quality: f32,
    /// Quality bounds in force for this attempt.
    pub quality_lower: f32,
    pub quality_upper: f32,
}

/// Mutable state of one search. Owned by the controller for one call.
#[derive(Debug, Clone)]
pub struct SearchState {
    pub quality: f32,
    pub quality_lower: f32,
    pub quality_upper: f32,
    pub attempts: u32,
    pub width: u32,
    pub height: u32,
    /// Largest candidate seen that still left room in the budget.
    pub best: Option<CandidateEncoding>,
}

/// How a call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Termination {
    /// A candidate landed inside the acceptance window.
    Accepted,
    /// The attempt budget ran out; the closest candidate was returned.
    Exhausted,
    /// The source already complied and was returned untouched.
    PassedThrough,
}

/// A non-terminal move of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Adjustment {
    /// Candidate too large: upper bound drops to the tried quality.
    LowerQuality { from: f32, to: f32 },
    /// Candidate left room to spare: lower bound rises to the tried quality.
    RaiseQuality { from: f32, to: f32 },
    /// Quality alone cannot close the gap: shrink the canvas and reset bounds.
    Downscale {
        from: (u32, u32),
        to: (u32, u32),
        quality: f32,
    },
}

/// Terminal result of a search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub candidate: CandidateEncoding,
    pub attempts: u32,
    pub escalations: u32,
    /// The returned candidate fits `max_bytes * (1 + tolerance)`.
    pub budget_met: bool,
    pub termination: Termination,
    /// Budget this search aimed for.
    pub budget: usize,
}

/// Result of feeding one candidate to the controller.
#[derive(Debug, Clone)]
pub enum Transition {
    Continue(Adjustment),
    Finished(SearchOutcome),
}

/// Bounded binary search over the quality factor with a resolution
/// escalation path.
#[derive(Debug, Clone)]
pub struct SearchController {
    plan: PlanParameters,
    target: CompressionTarget,
    state: SearchState,
    escalations: u32,
}

impl SearchController {
    pub fn new(plan: PlanParameters, target: CompressionTarget) -> Self {
        let (width, height) = plan.clamp(plan.target_width, plan.target_height);
        let quality = plan.initial_quality.clamp(QUALITY_LOWER, QUALITY_UPPER);

        Self {
            plan,
            target,
            state: SearchState {
                quality,
                quality_lower: QUALITY_LOWER,
                quality_upper: QUALITY_UPPER,
                attempts: 0,
                width,
                height,
                best: None,
            },
            escalations: 0,
        }
    }

    pub fn plan(&self) -> &PlanParameters {
        &self.plan
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn attempts(&self) -> u32 {
        self.state.attempts
    }

    /// Enter `Encoding`: count the attempt and describe the encode to run.
    pub fn next_request(&mut self) -> EncodeRequest {
        debug_assert!(
            self.state.attempts < MAX_ATTEMPTS,
            "search already used its attempt budget"
        );
        self.state.attempts += 1;

        EncodeRequest {
            attempt: self.state.attempts,
            width: self.state.width,
            height: self.state.height,
            quality: self.state.quality,
            quality_lower: self.state.quality_lower,
            quality_upper: self.state.quality_upper,
        }
    }

    /// Enter `Evaluate` with the encoder's output for the last request.
    pub fn evaluate(&mut self, candidate: CandidateEncoding) -> Transition {
        let budget = self.plan.max_bytes;
        let size = candidate.len() as f64;
        let limit = self.target.acceptance_limit(budget);
        let fill_floor = budget as f64 * self.target.fill_ratio;

        if size <= limit && size >= fill_floor {
            return Transition::Finished(self.finish(candidate, Termination::Accepted));
        }

        if size < fill_floor {
            let from = self.state.quality;
            self.record_best(candidate);

            if self.state.attempts >= MAX_ATTEMPTS {
                return Transition::Finished(self.exhaust(None));
            }

            self.state.quality_lower = from;
            self.state.quality = midpoint(from, self.state.quality_upper);
            return Transition::Continue(Adjustment::RaiseQuality {
                from,
                to: self.state.quality,
            });
        }

        if self.state.attempts >= MAX_ATTEMPTS {
            return Transition::Finished(self.exhaust(Some(candidate)));
        }

        if size > budget as f64 * ESCALATION_RATIO
            && self.state.attempts >= ESCALATION_MIN_ATTEMPTS
        {
            if let Some(adjustment) = self.escalate(size, budget) {
                return Transition::Continue(adjustment);
            }
        }

        let from = self.state.quality;
        self.state.quality_upper = from;
        self.state.quality = midpoint(from, self.state.quality_lower);
        Transition::Continue(Adjustment::LowerQuality {
            from,
            to: self.state.quality,
        })
    }

    /// Shrink the canvas in proportion to the overshoot. Returns `None` when
    /// the floor leaves nothing to shrink.
    fn escalate(&mut self, size: f64, budget: usize) -> Option<Adjustment> {
        let scale = (budget as f64 * ESCALATION_HEADROOM / size).sqrt();
        let from = (self.state.width, self.state.height);
        let proposed = (
            (from.0 as f64 * scale).floor() as u32,
            (from.1 as f64 * scale).floor() as u32,
        );
        let to = self.plan.clamp(proposed.0, proposed.1);

        if to.0 >= from.0 && to.1 >= from.1 {
            return None;
        }

        self.state.width = to.0;
        self.state.height = to.1;
        self.state.quality = ESCALATION_QUALITY;
        self.state.quality_lower = ESCALATION_LOWER;
        self.state.quality_upper = ESCALATION_UPPER;
        self.escalations += 1;

        Some(Adjustment::Downscale {
            from,
            to,
            quality: ESCALATION_QUALITY,
        })
    }

    fn record_best(&mut self, candidate: CandidateEncoding) {
        let larger = self
            .state
            .best
            .as_ref()
            .map_or(true, |best| candidate.len() > best.len());
        if larger {
            self.state.best = Some(candidate);
        }
    }

    fn exhaust(&mut self, last: Option<CandidateEncoding>) -> SearchOutcome {
        let candidate = match (self.state.best.take(), last) {
            (Some(best), _) => best,
            (None, Some(last)) => last,
            // Only reachable from the room-to-spare branch, which records first
            (None, None) => CandidateEncoding {
                bytes: Vec::new(),
                width: self.state.width,
                height: self.state.height,
                quality: self.state.quality,
            },
        };
        self.finish(candidate, Termination::Exhausted)
    }

    fn finish(&mut self, candidate: CandidateEncoding, termination: Termination) -> SearchOutcome {
        let budget = self.plan.max_bytes;
        let budget_met =
            !candidate.is_empty() && candidate.len() as f64 <= self.target.acceptance_limit(budget);

        SearchOutcome {
            candidate,
            attempts: self.state.attempts,
            escalations: self.escalations,
            budget_met,
            termination,
            budget,
        }
    }
}

fn midpoint(a: f32, b: f32) -> f32 {
    (a + b) / 2.0
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::plan::plan;
    use proptest::prelude::*;

    fn run(
        source_len: usize,
        native: (u32, u32),
        target: CompressionTarget,
        density: f64,
        noise: u64,
    ) -> (SearchOutcome, Vec<EncodeRequest>, Vec<Adjustment>) {
        let p = plan(source_len, native, &target);
        let mut controller = SearchController::new(p, target);
        let mut requests = Vec::new();
        let mut adjustments = Vec::new();

        loop {
            let request = controller.next_request();
            requests.push(request);
            let pixels = request.width as f64 * request.height as f64;
            let wobble = 1.0 + ((noise.wrapping_mul(request.attempt as u64 + 7) % 13) as f64 - 6.0) / 100.0;
            let len = (pixels * density * (0.1 + request.quality as f64).powi(2) * wobble) as usize;
            let produced = CandidateEncoding {
                bytes: vec![0u8; len.max(1)],
                width: request.width,
                height: request.height,
                quality: request.quality,
            };
            match controller.evaluate(produced) {
                Transition::Continue(adjustment) => adjustments.push(adjustment),
                Transition::Finished(outcome) => return (outcome, requests, adjustments),
            }
        }
    }

    fn source_strategy() -> impl Strategy<Value = (usize, (u32, u32))> {
        (1usize..=40 * 1024 * 1024, 1u32..=6000, 1u32..=6000).prop_map(|(len, w, h)| (len, (w, h)))
    }

    proptest! {
        /// Property: The search always stops within the attempt budget.
        #[test]
        fn prop_terminates_within_budget(
            (len, native) in source_strategy(),
            density in 0.01f64..=2.0,
            noise in any::<u64>(),
        ) {
            let (outcome, requests, _) = run(len, native, CompressionTarget::default(), density, noise);
            prop_assert!(requests.len() <= MAX_ATTEMPTS as usize);
            prop_assert_eq!(outcome.attempts as usize, requests.len());
        }

        /// Property: Every attempt's quality lies inside the bounds in force.
        #[test]
        fn prop_quality_within_bounds(
            (len, native) in source_strategy(),
            density in 0.01f64..=2.0,
            noise in any::<u64>(),
            fill in prop_oneof![Just(0.0f64), 0.5f64..0.99],
        ) {
            let target = CompressionTarget::default().with_fill_ratio(fill);
            let (_, requests, _) = run(len, native, target, density, noise);
            for r in &requests {
                prop_assert!(r.quality_lower <= r.quality && r.quality <= r.quality_upper);
                prop_assert!((0.0..=1.0).contains(&r.quality));
            }
        }

        /// Property: Bounds narrow on every quality step and reset only on a downscale.
        #[test]
        fn prop_bounds_narrow_or_reset(
            (len, native) in source_strategy(),
            density in 0.01f64..=2.0,
            noise in any::<u64>(),
            fill in prop_oneof![Just(0.0f64), 0.5f64..0.99],
        ) {
            let target = CompressionTarget::default().with_fill_ratio(fill);
            let (_, requests, adjustments) = run(len, native, target, density, noise);
            for (pair, adjustment) in requests.windows(2).zip(&adjustments) {
                let before = pair[0].quality_upper - pair[0].quality_lower;
                let after = pair[1].quality_upper - pair[1].quality_lower;
                match adjustment {
                    Adjustment::Downscale { .. } => {
                        prop_assert_eq!(pair[1].quality_lower, ESCALATION_LOWER);
                        prop_assert_eq!(pair[1].quality_upper, ESCALATION_UPPER);
                    }
                    _ => prop_assert!(after < before),
                }
            }
        }

        /// Property: Canvas dimensions stay within [floor, native] and never grow.
        #[test]
        fn prop_dimensions_bounded(
            (len, native) in source_strategy(),
            density in 0.01f64..=2.0,
            noise in any::<u64>(),
        ) {
            let (_, requests, _) = run(len, native, CompressionTarget::default(), density, noise);
            let floor = (400.min(native.0), 400.min(native.1));
            for pair in requests.windows(2) {
                prop_assert!(pair[1].width <= pair[0].width && pair[1].height <= pair[0].height);
            }
            for r in &requests {
                prop_assert!(r.width >= floor.0 && r.width <= native.0);
                prop_assert!(r.height >= floor.1 && r.height <= native.1);
            }
        }

        /// Property: Accepted results fit the tolerance; misses are flagged.
        #[test]
        fn prop_budget_flag_is_truthful(
            (len, native) in source_strategy(),
            density in 0.01f64..=2.0,
            noise in any::<u64>(),
        ) {
            let target = CompressionTarget::default();
            let (outcome, _, _) = run(len, native, target, density, noise);
            let limit = target.acceptance_limit(outcome.budget);
            let fits = outcome.candidate.len() as f64 <= limit;

            prop_assert_eq!(outcome.budget_met, fits);
            if outcome.termination == Termination::Accepted {
                prop_assert!(fits);
                prop_assert!(outcome.candidate.len() as f64 <= target.acceptance_limit(target.max_bytes));
            } else {
                prop_assert!(!fits);
            }
        }
    }
}
