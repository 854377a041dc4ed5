//! Source decoding for the compression pipeline.
//!
//! This module provides functionality for:
//! - Decoding any supported raster source (JPEG, PNG, WebP, GIF) into RGB
//! - Honouring EXIF orientation on JPEG sources
//! - Probing stored dimensions without a full decode
//! - Resampling and aspect-ratio fitting for the encoder canvas
//!
//! # Architecture
//!
//! Decoding happens once per compression call. The resulting `DecodedImage`
//! is owned by that call and dropped when it resolves.
//!
//! # Examples
//!
//! ```ignore
//! use platepress_core::decode::{decode_source, SourceImage};
//!
//! let bytes = std::fs::read("pancakes.png").unwrap();
//! let image = decode_source(&SourceImage::new(&bytes, "image/png")).unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod resize;
mod source;
mod types;

pub use resize::{clamp_axis, fit_dimensions, resize};
pub use source::{decode_source, probe_source};
pub use types::{DecodeError, DecodedImage, FilterType, Orientation, SourceImage};
