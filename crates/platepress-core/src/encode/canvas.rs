//! The encoder seam used by the search controller.
//!
//! An encoder turns `(bitmap, width, height, quality)` into one candidate
//! JPEG. It has no notion of the byte budget. Synchronous and asynchronous
//! flavours share the same contract so one state machine can drive either.

use std::future::Future;

use super::jpeg::{encode_jpeg, quality_to_percent, EncodeError};
use crate::decode::{resize, DecodedImage, FilterType};

/// One encoder output, evaluated by the search controller and then either
/// kept as best-so-far or dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateEncoding {
    /// Encoded JPEG bytes.
    pub bytes: Vec<u8>,
    /// Canvas width the bitmap was drawn at.
    pub width: u32,
    /// Canvas height the bitmap was drawn at.
    pub height: u32,
    /// Quality factor (0-1) the encoder was asked for.
    pub quality: f32,
}

impl CandidateEncoding {
    /// Size of the produced blob in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Synchronous encoder.
pub trait Encoder {
    /// Called once before a search starts encoding `bitmap`.
    fn begin(&mut self, _bitmap: &DecodedImage) {}

    fn encode(
        &mut self,
        bitmap: &DecodedImage,
        width: u32,
        height: u32,
        quality: f32,
    ) -> Result<CandidateEncoding, EncodeError>;
}

/// Asynchronous encoder, for hosts where serialisation completes later
/// (a browser canvas `toBlob`, a worker pool, ...).
pub trait AsyncEncoder {
    /// Called once before a search starts encoding `bitmap`.
    fn begin(&mut self, _bitmap: &DecodedImage) {}

    fn encode(
        &mut self,
        bitmap: &DecodedImage,
        width: u32,
        height: u32,
        quality: f32,
    ) -> impl Future<Output = Result<CandidateEncoding, EncodeError>>;
}

/// Runs a synchronous encoder behind the asynchronous interface.
#[derive(Debug, Default)]
pub struct Blocking<E>(pub E);

impl<E: Encoder> AsyncEncoder for Blocking<E> {
    fn begin(&mut self, bitmap: &DecodedImage) {
        self.0.begin(bitmap);
    }

    async fn encode(
        &mut self,
        bitmap: &DecodedImage,
        width: u32,
        height: u32,
        quality: f32,
    ) -> Result<CandidateEncoding, EncodeError> {
        self.0.encode(bitmap, width, height, quality)
    }
}

/// Draws the bitmap onto a canvas of the requested size and serialises it
/// with the `image` crate JPEG encoder.
///
/// The last canvas is cached, so a run of quality steps at one resolution
/// resamples only once. The cache is dropped by [`Encoder::begin`], so one
/// encoder can be reused across searches over different bitmaps.
#[derive(Debug, Default)]
pub struct CanvasEncoder {
    filter: FilterType,
    canvas: Option<Canvas>,
}

#[derive(Debug)]
struct Canvas {
    source: (usize, u32, u32),
    image: DecodedImage,
}

impl CanvasEncoder {
    pub fn new(filter: FilterType) -> Self {
        Self {
            filter,
            canvas: None,
        }
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }

    fn canvas_for(
        &mut self,
        bitmap: &DecodedImage,
        width: u32,
        height: u32,
    ) -> Result<&DecodedImage, EncodeError> {
        let source = (bitmap.pixels.as_ptr() as usize, bitmap.width, bitmap.height);
        let stale = match &self.canvas {
            Some(canvas) => {
                canvas.source != source
                    || canvas.image.width != width
                    || canvas.image.height != height
            }
            None => true,
        };

        if stale {
            let image = resize(bitmap, width, height, self.filter).map_err(|e| {
                EncodeError::ResampleFailed {
                    width,
                    height,
                    reason: e.to_string(),
                }
            })?;
            self.canvas = Some(Canvas { source, image });
        }

        match &self.canvas {
            Some(canvas) => Ok(&canvas.image),
            None => Err(EncodeError::ResampleFailed {
                width,
                height,
                reason: "canvas missing after resample".to_string(),
            }),
        }
    }
}

impl Encoder for CanvasEncoder {
    fn begin(&mut self, _bitmap: &DecodedImage) {
        self.canvas = None;
    }

    fn encode(
        &mut self,
        bitmap: &DecodedImage,
        width: u32,
        height: u32,
        quality: f32,
    ) -> Result<CandidateEncoding, EncodeError> {
        if width == 0 || height == 0 {
            return Err(EncodeError::InvalidDimensions { width, height });
        }

        let canvas = self.canvas_for(bitmap, width, height)?;
        let bytes = encode_jpeg(&canvas.pixels, width, height, quality_to_percent(quality))?;

        Ok(CandidateEncoding {
            bytes,
            width,
            height,
            quality,
        })
    }
}
