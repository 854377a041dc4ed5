//! Reporter that writes compression progress to the browser console.

use js_sys::Date;
use platepress_core::{Adjustment, AttemptRecord, CompressionSummary, PlanParameters, Reporter};
use wasm_bindgen::JsValue;
use web_sys::console;

/// Mirrors the upload log a developer would watch in devtools.
///
/// Timing uses `Date.now()`; `std::time::Instant` is unavailable on
/// `wasm32-unknown-unknown`.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    started_at: Option<f64>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn elapsed_ms(&self) -> f64 {
        self.started_at.map_or(0.0, |start| Date::now() - start)
    }
}

fn log(message: &str) {
    console::log_1(&JsValue::from_str(message));
}

impl Reporter for ConsoleReporter {
    fn planned(&mut self, source_len: usize, plan: &PlanParameters) {
        self.started_at = Some(Date::now());
        log(&format!(
            "[platepress] {:.2} MB source, {}x{} -> {}x{} at q={:.2} ({:?}, budget {:.1} KB)",
            source_len as f64 / (1024.0 * 1024.0),
            plan.native_width,
            plan.native_height,
            plan.target_width,
            plan.target_height,
            plan.initial_quality,
            plan.tier,
            plan.max_bytes as f64 / 1024.0
        ));
    }

    fn attempt(&mut self, attempt: &AttemptRecord) {
        log(&format!(
            "[platepress] attempt {}: {}x{} q={:.3} -> {:.1} KB",
            attempt.attempt,
            attempt.width,
            attempt.height,
            attempt.quality,
            attempt.bytes as f64 / 1024.0
        ));
    }

    fn adjusted(&mut self, adjustment: &Adjustment) {
        if let Adjustment::Downscale { from, to, .. } = adjustment {
            log(&format!(
                "[platepress] downscaling {}x{} -> {}x{}",
                from.0, from.1, to.0, to.1
            ));
        }
    }

    fn second_pass(&mut self, plan: &PlanParameters) {
        log(&format!(
            "[platepress] budget missed, second pass at {}x{} q={:.2}",
            plan.target_width, plan.target_height, plan.initial_quality
        ));
    }

    fn finished(&mut self, summary: &CompressionSummary) {
        log(&format!(
            "[platepress] {:.1} KB -> {:.1} KB ({:.1}% smaller), {}x{}, {} attempt(s) in {:.0} ms",
            summary.original_kb(),
            summary.final_kb(),
            summary.reduction_percent(),
            summary.width,
            summary.height,
            summary.attempts,
            self.elapsed_ms()
        ));
        if !summary.budget_met {
            console::warn_1(&JsValue::from_str(&format!(
                "[platepress] result is {:.1} KB, over the {:.1} KB budget",
                summary.final_kb(),
                summary.budget as f64 / 1024.0
            )));
        }
    }
}
