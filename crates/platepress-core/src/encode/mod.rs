//! Encoding side of the compression pipeline.
//!
//! This module provides functionality for:
//! - Serialising RGB pixel data to JPEG at a given quality
//! - The `Encoder` / `AsyncEncoder` seam the search controller drives
//! - `CanvasEncoder`, which resamples then serialises
//!
//! # Examples
//!
//! ```ignore
//! use platepress_core::encode::{CanvasEncoder, Encoder};
//!
//! let mut encoder = CanvasEncoder::default();
//! let candidate = encoder.encode(&bitmap, 800, 600, 0.72).unwrap();
//! println!("Encoded {} bytes", candidate.len());
//! ```

mod canvas;
mod jpeg;

pub use canvas::{AsyncEncoder, Blocking, CandidateEncoding, CanvasEncoder, Encoder};
pub use jpeg::{encode_jpeg, quality_to_percent, EncodeError};
