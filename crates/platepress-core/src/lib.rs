//! Platepress Core - adaptive JPEG compression for uploads
//!
//! This crate turns an arbitrary raster upload (JPEG, PNG, WebP, GIF) into a
//! JPEG that fits a byte budget. It decodes the source, picks a starting
//! resolution and quality from the source size, then runs a bounded search
//! over quality and, when quality alone is not enough, resolution.
//!
//! # Example
//!
//! ```ignore
//! use platepress_core::compress;
//!
//! let result = compress(&bytes, "image/png", 100 * 1024)?;
//! assert_eq!(result.content_type(), "image/jpeg");
//! println!("{} -> {} bytes", bytes.len(), result.len());
//! ```

pub mod cancel;
pub mod compress;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod output;
pub mod plan;
pub mod report;
pub mod search;

pub use cancel::CancelFlag;
pub use compress::{compress, compress_async, compress_smart, compress_with};
pub use config::{
    CompressOptions, CompressionTarget, RecompressPolicy, DEFAULT_MAX_BYTES, DEFAULT_TOLERANCE,
};
pub use decode::{DecodeError, DecodedImage, FilterType, SourceImage};
pub use encode::{AsyncEncoder, Blocking, CandidateEncoding, CanvasEncoder, EncodeError, Encoder};
pub use error::CompressError;
pub use output::{jpeg_file_name, storage_object_name, CompressedImage, CONTENT_TYPE};
pub use plan::{plan, PlanParameters, Tier, MIN_DIMENSION};
pub use report::{
    CompressionSummary, NoopReporter, RecordingReporter, ReportEvent, Reporter, TracingReporter,
};
pub use search::{
    run_search, run_search_async, Adjustment, AttemptRecord, SearchController, SearchOutcome,
    Termination,
};
