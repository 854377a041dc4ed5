//! WASM-compatible wrapper types for compression input and output.

use platepress_core::{CompressOptions, CompressedImage, Termination};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Options accepted by `compress_image`, deserialised from a plain JS object.
///
/// ```typescript
/// compress_image(bytes, file.type, { maxBytes: 150 * 1024, secondPass: true, debug: true });
/// ```
///
/// Every field is optional; missing ones fall back to the core defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JsCompressOptions {
    #[serde(flatten)]
    pub options: CompressOptions,
    /// Log every attempt and the final summary to the browser console.
    pub debug: bool,
}

/// A compressed image for JavaScript.
///
/// The JPEG bytes stay in WASM memory until `bytes()` copies them out as a
/// `Uint8Array`, ready for `new Blob([bytes], { type: result.content_type })`.
#[wasm_bindgen]
pub struct JsCompressedImage {
    inner: CompressedImage,
}

#[wasm_bindgen]
impl JsCompressedImage {
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Quality factor (0-1) of the final encode, or `undefined` if the
    /// source was passed through.
    #[wasm_bindgen(getter)]
    pub fn quality(&self) -> Option<f32> {
        self.inner.quality
    }

    /// Always `image/jpeg`.
    #[wasm_bindgen(getter)]
    pub fn content_type(&self) -> String {
        self.inner.content_type().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.len()
    }

    #[wasm_bindgen(getter)]
    pub fn original_bytes(&self) -> usize {
        self.inner.summary.original_bytes
    }

    #[wasm_bindgen(getter)]
    pub fn reduction_percent(&self) -> f64 {
        self.inner.summary.reduction_percent()
    }

    #[wasm_bindgen(getter)]
    pub fn attempts(&self) -> u32 {
        self.inner.summary.attempts
    }

    /// Whether the result fits the budget (plus tolerance).
    #[wasm_bindgen(getter)]
    pub fn budget_met(&self) -> bool {
        self.inner.summary.budget_met
    }

    /// `"accepted"`, `"exhausted"` or `"passedThrough"`.
    #[wasm_bindgen(getter)]
    pub fn termination(&self) -> String {
        termination_name(self.inner.summary.termination).to_string()
    }

    /// Returns the JPEG bytes as Uint8Array.
    ///
    /// Note: This creates a copy.
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes.clone()
    }

    /// Full compression summary as a plain JS object.
    pub fn summary(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.summary).map_err(JsValue::from)
    }
}

impl JsCompressedImage {
    pub(crate) fn from_compressed(inner: CompressedImage) -> Self {
        Self { inner }
    }
}

fn termination_name(termination: Termination) -> &'static str {
    match termination {
        Termination::Accepted => "accepted",
        Termination::Exhausted => "exhausted",
        Termination::PassedThrough => "passedThrough",
    }
}
