//! End-to-end compression: decode, plan, search, report.

use image::ImageFormat;

use crate::cancel::CancelFlag;
use crate::config::{CompressOptions, CompressionTarget, RecompressPolicy};
use crate::decode::{decode_source, probe_source, DecodedImage, SourceImage};
use crate::encode::{AsyncEncoder, CanvasEncoder};
use crate::error::CompressError;
use crate::output::CompressedImage;
use crate::plan::{plan, PlanParameters};
use crate::report::{CompressionSummary, NoopReporter, Reporter};
use crate::search::{run_search, run_search_async, SearchController, SearchOutcome, Termination};

/// Compress `bytes` to a JPEG of at most `max_bytes` (plus tolerance).
pub fn compress(
    bytes: &[u8],
    mime_type: &str,
    max_bytes: usize,
) -> Result<CompressedImage, CompressError> {
    compress_with(
        &SourceImage::new(bytes, mime_type),
        &CompressOptions::with_max_bytes(max_bytes),
        &mut NoopReporter,
        None,
    )
}

/// Compress with the default budget and a tightened retry if the first
/// search misses it.
pub fn compress_smart(bytes: &[u8], mime_type: &str) -> Result<CompressedImage, CompressError> {
    let options = CompressOptions {
        second_pass: true,
        ..CompressOptions::default()
    };
    compress_with(
        &SourceImage::new(bytes, mime_type),
        &options,
        &mut NoopReporter,
        None,
    )
}

/// Compress with full control over options, reporting and cancellation.
pub fn compress_with<R>(
    source: &SourceImage<'_>,
    options: &CompressOptions,
    reporter: &mut R,
    cancel: Option<&CancelFlag>,
) -> Result<CompressedImage, CompressError>
where
    R: Reporter + ?Sized,
{
    let (bitmap, plan) = match prepare(source, options, reporter)? {
        Prepared::PassThrough(image) => return Ok(image),
        Prepared::Search { bitmap, plan } => (bitmap, plan),
    };

    let mut encoder = CanvasEncoder::new(options.filter);
    let first = run_search(
        SearchController::new(plan, options.target),
        &bitmap,
        &mut encoder,
        reporter,
        cancel,
    )?;

    let second = match tightened_plan(&first, &plan, options) {
        Some(tightened) => {
            reporter.second_pass(&tightened);
            Some(run_search(
                SearchController::new(tightened, options.target),
                &bitmap,
                &mut encoder,
                reporter,
                cancel,
            )?)
        }
        None => None,
    };

    Ok(assemble(source.len(), &plan, first, second, reporter))
}

/// Same pipeline as [`compress_with`], driving an asynchronous encoder.
///
/// Decoding and planning run synchronously before the first await.
pub async fn compress_async<E, R>(
    source: &SourceImage<'_>,
    options: &CompressOptions,
    encoder: &mut E,
    reporter: &mut R,
    cancel: Option<&CancelFlag>,
) -> Result<CompressedImage, CompressError>
where
    E: AsyncEncoder,
    R: Reporter + ?Sized,
{
    let (bitmap, plan) = match prepare(source, options, reporter)? {
        Prepared::PassThrough(image) => return Ok(image),
        Prepared::Search { bitmap, plan } => (bitmap, plan),
    };

    let first = run_search_async(
        SearchController::new(plan, options.target),
        &bitmap,
        encoder,
        reporter,
        cancel,
    )
    .await?;

    let second = match tightened_plan(&first, &plan, options) {
        Some(tightened) => {
            reporter.second_pass(&tightened);
            Some(
                run_search_async(
                    SearchController::new(tightened, options.target),
                    &bitmap,
                    encoder,
                    reporter,
                    cancel,
                )
                .await?,
            )
        }
        None => None,
    };

    Ok(assemble(source.len(), &plan, first, second, reporter))
}

enum Prepared {
    PassThrough(CompressedImage),
    Search {
        bitmap: DecodedImage,
        plan: PlanParameters,
    },
}

fn prepare<R>(
    source: &SourceImage<'_>,
    options: &CompressOptions,
    reporter: &mut R,
) -> Result<Prepared, CompressError>
where
    R: Reporter + ?Sized,
{
    options.target.validate()?;

    if options.policy == RecompressPolicy::WhenNeeded {
        if let Some(image) = pass_through(source, &options.target)? {
            reporter.finished(&image.summary);
            return Ok(Prepared::PassThrough(image));
        }
    }

    let bitmap = decode_source(source)?;
    let plan = plan(source.len(), bitmap.dimensions(), &options.target);
    reporter.planned(source.len(), &plan);

    Ok(Prepared::Search { bitmap, plan })
}

/// Return the source untouched if it is already a JPEG inside the budget.
fn pass_through(
    source: &SourceImage<'_>,
    target: &CompressionTarget,
) -> Result<Option<CompressedImage>, CompressError> {
    let (format, width, height) = probe_source(source)?;
    if format != ImageFormat::Jpeg || source.len() > target.max_bytes {
        return Ok(None);
    }

    let summary = CompressionSummary {
        original_bytes: source.len(),
        final_bytes: source.len(),
        attempts: 0,
        escalations: 0,
        passes: 0,
        width,
        height,
        quality: None,
        tier: None,
        budget: target.max_bytes,
        budget_met: true,
        termination: Termination::PassedThrough,
    };

    Ok(Some(CompressedImage {
        bytes: source.bytes().to_vec(),
        width,
        height,
        quality: None,
        summary,
    }))
}

fn tightened_plan(
    first: &SearchOutcome,
    plan: &PlanParameters,
    options: &CompressOptions,
) -> Option<PlanParameters> {
    (options.second_pass && !first.budget_met).then(|| plan.tightened())
}

/// Pick the smaller of the two passes and build the final result.
fn assemble<R>(
    source_len: usize,
    plan: &PlanParameters,
    first: SearchOutcome,
    second: Option<SearchOutcome>,
    reporter: &mut R,
) -> CompressedImage
where
    R: Reporter + ?Sized,
{
    let mut attempts = first.attempts;
    let mut escalations = first.escalations;
    let mut passes = 1;

    let chosen = match second {
        Some(second) => {
            attempts += second.attempts;
            escalations += second.escalations;
            passes += 1;
            if second.candidate.len() < first.candidate.len() {
                second
            } else {
                first
            }
        }
        None => first,
    };

    let candidate = chosen.candidate;
    let summary = CompressionSummary {
        original_bytes: source_len,
        final_bytes: candidate.len(),
        attempts,
        escalations,
        passes,
        width: candidate.width,
        height: candidate.height,
        quality: Some(candidate.quality),
        tier: Some(plan.tier),
        budget: chosen.budget,
        budget_met: chosen.budget_met,
        termination: chosen.termination,
    };
    reporter.finished(&summary);

    CompressedImage {
        bytes: candidate.bytes,
        width: candidate.width,
        height: candidate.height,
        quality: Some(candidate.quality),
        summary,
    }
}
