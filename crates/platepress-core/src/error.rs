//! Top-level error type for a compression call.

use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;

/// Everything that can make `compress` fail.
///
/// Missing the byte budget is not in here: an exhausted search still
/// succeeds and reports `budget_met == false` in its summary.
#[derive(Debug, Error)]
pub enum CompressError {
    /// The source could not be decoded into a bitmap.
    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// The encoder failed or produced no output.
    #[error("Encode failed: {0}")]
    Encode(#[from] EncodeError),

    /// The compression target is unusable.
    #[error("Invalid compression target: {0}")]
    InvalidTarget(String),

    /// The caller cancelled the search between encode attempts.
    #[error("Compression cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32 },
}
