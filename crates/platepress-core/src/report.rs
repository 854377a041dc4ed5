//! Progress hooks and the final compression summary.
//!
//! A [`Reporter`] observes a compression call without influencing it. All
//! hooks default to no-ops so an implementation only overrides what it
//! cares about.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::plan::{PlanParameters, Tier};
use crate::search::{Adjustment, AttemptRecord, Termination};

/// Outcome statistics of one compression call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionSummary {
    pub original_bytes: usize,
    pub final_bytes: usize,
    /// Encode attempts summed over all passes. Each search stops at
    /// `MAX_ATTEMPTS`, so a call with a second pass can report up to twice that.
    pub attempts: u32,
    /// Resolution escalations across all passes.
    pub escalations: u32,
    /// Searches run: 0 for a pass-through, 2 when a second pass ran.
    pub passes: u32,
    pub width: u32,
    pub height: u32,
    /// Quality of the returned encode, `None` when the source passed through.
    pub quality: Option<f32>,
    pub tier: Option<Tier>,
    /// Budget the returned result was measured against.
    pub budget: usize,
    pub budget_met: bool,
    pub termination: Termination,
}

impl CompressionSummary {
    /// Size reduction in percent. Negative if the output grew.
    pub fn reduction_percent(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        (1.0 - self.final_bytes as f64 / self.original_bytes as f64) * 100.0
    }

    pub fn original_kb(&self) -> f64 {
        self.original_bytes as f64 / 1024.0
    }

    pub fn final_kb(&self) -> f64 {
        self.final_bytes as f64 / 1024.0
    }
}

/// Observer for a compression call.
pub trait Reporter {
    /// The source was decoded and a plan chosen.
    fn planned(&mut self, _source_len: usize, _plan: &PlanParameters) {}

    /// An encode attempt produced a candidate.
    fn attempt(&mut self, _attempt: &AttemptRecord) {}

    /// The search moved to a new quality or canvas size.
    fn adjusted(&mut self, _adjustment: &Adjustment) {}

    /// The first search missed its budget and a tightened one is starting.
    fn second_pass(&mut self, _plan: &PlanParameters) {}

    /// The call completed.
    fn finished(&mut self, _summary: &CompressionSummary) {}
}

/// Ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl Reporter for NoopReporter {}

/// Forwards progress to `tracing`: attempts at debug, completion at info,
/// a missed budget at warn.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn planned(&mut self, source_len: usize, plan: &PlanParameters) {
        info!(
            "Compressing {:.2} MB source ({:?}): {}x{} -> {}x{} at q={:.2}, budget {} bytes",
            source_len as f64 / (1024.0 * 1024.0),
            plan.tier,
            plan.native_width,
            plan.native_height,
            plan.target_width,
            plan.target_height,
            plan.initial_quality,
            plan.max_bytes
        );
    }

    fn attempt(&mut self, attempt: &AttemptRecord) {
        debug!(
            "Attempt {}: {}x{} q={:.3} [{:.3}, {:.3}] -> {} bytes (budget {})",
            attempt.attempt,
            attempt.width,
            attempt.height,
            attempt.quality,
            attempt.quality_lower,
            attempt.quality_upper,
            attempt.bytes,
            attempt.budget
        );
    }

    fn adjusted(&mut self, adjustment: &Adjustment) {
        if let Adjustment::Downscale { from, to, quality } = adjustment {
            debug!(
                "Downscaling {}x{} -> {}x{}, quality reset to {quality:.2}",
                from.0, from.1, to.0, to.1
            );
        }
    }

    fn second_pass(&mut self, plan: &PlanParameters) {
        info!(
            "Budget missed, retrying at {}x{} q={:.2} with budget {} bytes",
            plan.target_width, plan.target_height, plan.initial_quality, plan.max_bytes
        );
    }

    fn finished(&mut self, summary: &CompressionSummary) {
        info!(
            "Compressed {:.1} KB -> {:.1} KB ({:.1}% smaller) at {}x{} in {} attempt(s), {:?}",
            summary.original_kb(),
            summary.final_kb(),
            summary.reduction_percent(),
            summary.width,
            summary.height,
            summary.attempts,
            summary.termination
        );
        if !summary.budget_met {
            warn!(
                "Result is {} bytes, over the {} byte budget",
                summary.final_bytes, summary.budget
            );
        }
    }
}

/// Everything a [`RecordingReporter`] saw, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    Planned {
        source_len: usize,
        plan: PlanParameters,
    },
    Attempt(AttemptRecord),
    Adjusted(Adjustment),
    SecondPass(PlanParameters),
    Finished(CompressionSummary),
}

/// Keeps every event in memory. Handy in tests and for debugging UIs.
#[derive(Debug, Default, Clone)]
pub struct RecordingReporter {
    events: Vec<ReportEvent>,
}

impl RecordingReporter {
    pub fn events(&self) -> &[ReportEvent] {
        &self.events
    }

    pub fn attempts(&self) -> Vec<AttemptRecord> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ReportEvent::Attempt(record) => Some(*record),
                _ => None,
            })
            .collect()
    }

    pub fn summary(&self) -> Option<&CompressionSummary> {
        self.events.iter().rev().find_map(|event| match event {
            ReportEvent::Finished(summary) => Some(summary),
            _ => None,
        })
    }
}

impl Reporter for RecordingReporter {
    fn planned(&mut self, source_len: usize, plan: &PlanParameters) {
        self.events.push(ReportEvent::Planned {
            source_len,
            plan: *plan,
        });
    }

    fn attempt(&mut self, attempt: &AttemptRecord) {
        self.events.push(ReportEvent::Attempt(*attempt));
    }

    fn adjusted(&mut self, adjustment: &Adjustment) {
        self.events.push(ReportEvent::Adjusted(*adjustment));
    }

    fn second_pass(&mut self, plan: &PlanParameters) {
        self.events.push(ReportEvent::SecondPass(*plan));
    }

    fn finished(&mut self, summary: &CompressionSummary) {
        self.events.push(ReportEvent::Finished(summary.clone()));
    }
}
