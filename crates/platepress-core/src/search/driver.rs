//! Loops that run a `SearchController` against a real encoder.

use serde::{Deserialize, Serialize};

use super::controller::{EncodeRequest, SearchController, SearchOutcome, Transition};
use crate::cancel::CancelFlag;
use crate::decode::DecodedImage;
use crate::encode::{AsyncEncoder, CandidateEncoding, Encoder};
use crate::error::CompressError;
use crate::report::Reporter;

/// One encode attempt as seen by a reporter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub attempt: u32,
    pub width: u32,
    pub height: u32,
    pub quality: f32,
    pub quality_lower: f32,
    pub quality_upper: f32,
    /// Size of the candidate produced.
    pub bytes: usize,
    /// Budget the search is aiming for.
    pub budget: usize,
}

impl AttemptRecord {
    fn new(request: &EncodeRequest, candidate: &CandidateEncoding, budget: usize) -> Self {
        Self {
            attempt: request.attempt,
            width: request.width,
            height: request.height,
            quality: request.quality,
            quality_lower: request.quality_lower,
            quality_upper: request.quality_upper,
            bytes: candidate.len(),
            budget,
        }
    }
}

fn check_cancelled(
    controller: &SearchController,
    cancel: Option<&CancelFlag>,
) -> Result<(), CompressError> {
    match cancel {
        Some(flag) if flag.is_cancelled() => Err(CompressError::Cancelled {
            attempts: controller.attempts(),
        }),
        _ => Ok(()),
    }
}

/// Run a search to completion with a synchronous encoder.
///
/// The encoder's `begin` hook runs once before the first attempt.
pub fn run_search<E, R>(
    mut controller: SearchController,
    bitmap: &DecodedImage,
    encoder: &mut E,
    reporter: &mut R,
    cancel: Option<&CancelFlag>,
) -> Result<SearchOutcome, CompressError>
where
    E: Encoder + ?Sized,
    R: Reporter + ?Sized,
{
    let budget = controller.plan().max_bytes;
    encoder.begin(bitmap);

    loop {
        check_cancelled(&controller, cancel)?;

        let request = controller.next_request();
        let candidate = encoder.encode(bitmap, request.width, request.height, request.quality)?;
        reporter.attempt(&AttemptRecord::new(&request, &candidate, budget));

        match controller.evaluate(candidate) {
            Transition::Continue(adjustment) => reporter.adjusted(&adjustment),
            Transition::Finished(outcome) => return Ok(outcome),
        }
    }
}

/// Run a search to completion with an asynchronous encoder.
///
/// Each attempt awaits its encode before the controller evaluates it, so
/// attempts never overlap.
pub async fn run_search_async<E, R>(
    mut controller: SearchController,
    bitmap: &DecodedImage,
    encoder: &mut E,
    reporter: &mut R,
    cancel: Option<&CancelFlag>,
) -> Result<SearchOutcome, CompressError>
where
    E: AsyncEncoder,
    R: Reporter + ?Sized,
{
    let budget = controller.plan().max_bytes;
    encoder.begin(bitmap);

    loop {
        check_cancelled(&controller, cancel)?;

        let request = controller.next_request();
        let candidate = encoder
            .encode(bitmap, request.width, request.height, request.quality)
            .await?;
        reporter.attempt(&AttemptRecord::new(&request, &candidate, budget));

        match controller.evaluate(candidate) {
            Transition::Continue(adjustment) => reporter.adjusted(&adjustment),
            Transition::Finished(outcome) => return Ok(outcome),
        }
    }
}
