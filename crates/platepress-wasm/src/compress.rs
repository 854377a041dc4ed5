//! Compression WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { compress_image, jpeg_file_name } from '@platepress/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = compress_image(bytes, file.type, { maxBytes: 100 * 1024 });
//! const upload = new File([result.bytes()], jpeg_file_name(file.name), {
//!   type: result.content_type,
//! });
//! ```

use crate::console::ConsoleReporter;
use crate::types::{JsCompressOptions, JsCompressedImage};
use platepress_core::{compress_with, output, CompressError, NoopReporter, SourceImage};
use wasm_bindgen::prelude::*;

/// Compress an image upload to a JPEG that fits a byte budget.
///
/// # Arguments
///
/// * `bytes` - The uploaded file as a `Uint8Array`
/// * `mime_type` - The declared MIME type (`file.type`); the content is
///   sniffed, so a wrong or empty value still decodes
/// * `options` - Optional object: `maxBytes`, `tolerance`, `fillRatio`,
///   `policy` (`"always"` | `"whenNeeded"`), `filter`, `secondPass`, `debug`
///
/// # Errors
///
/// Returns an error string if the options are malformed, the bytes are not
/// a decodable image, or encoding fails. Missing the budget is not an error;
/// check `budget_met` on the result.
#[wasm_bindgen]
pub fn compress_image(
    bytes: &[u8],
    mime_type: &str,
    options: JsValue,
) -> Result<JsCompressedImage, JsValue> {
    let options = parse_options(options)?;
    compress_bytes(bytes, mime_type, &options).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// File name to upload the compressed result under (`photo.PNG` -> `photo.jpg`).
#[wasm_bindgen]
pub fn jpeg_file_name(name: &str) -> String {
    output::jpeg_file_name(name)
}

/// Storage object name for a record id (`42` -> `42.jpg`).
#[wasm_bindgen]
pub fn storage_object_name(id: &str) -> String {
    output::storage_object_name(id)
}

fn parse_options(value: JsValue) -> Result<JsCompressOptions, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(JsCompressOptions::default());
    }
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid options: {e}")))
}

pub(crate) fn compress_bytes(
    bytes: &[u8],
    mime_type: &str,
    options: &JsCompressOptions,
) -> Result<JsCompressedImage, CompressError> {
    let source = SourceImage::new(bytes, mime_type);
    let result = if options.debug {
        compress_with(&source, &options.options, &mut ConsoleReporter::new(), None)?
    } else {
        compress_with(&source, &options.options, &mut NoopReporter, None)?
    };
    Ok(JsCompressedImage::from_compressed(result))
}

/// Tests for compression bindings.
///
/// Functions returning `Result<T, JsValue>` and the console reporter only
/// work on wasm32 targets; these exercise the shared path natively.
#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use platepress_core::{CompressOptions, DecodeError};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 200])
        });
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_compress_bytes_produces_jpeg() {
        let source = png(300, 200);
        let result = compress_bytes(&source, "image/png", &JsCompressOptions::default()).unwrap();

        assert_eq!(result.content_type(), "image/jpeg");
        assert_eq!((result.width(), result.height()), (300, 200));
        assert_eq!(&result.bytes()[0..2], &[0xFF, 0xD8]);
        assert!(result.budget_met());
        assert_eq!(result.termination(), "accepted");
    }

    #[test]
    fn test_compress_bytes_custom_budget() {
        let source = png(500, 500);
        let options = JsCompressOptions {
            options: CompressOptions::with_max_bytes(40 * 1024),
            debug: false,
        };
        let result = compress_bytes(&source, "", &options).unwrap();
        assert!(result.byte_length() as f64 <= 40.0 * 1024.0 * 1.05);
    }

    #[test]
    fn test_compress_bytes_rejects_garbage() {
        let result = compress_bytes(&[1, 2, 3], "image/png", &JsCompressOptions::default());
        assert!(matches!(result, Err(CompressError::Decode(_))));

        let result = compress_bytes(&[], "image/png", &JsCompressOptions::default());
        assert!(matches!(
            result,
            Err(CompressError::Decode(DecodeError::Empty))
        ));
    }

    #[test]
    fn test_file_name_helpers() {
        assert_eq!(jpeg_file_name("lunch.webp"), "lunch.jpg");
        assert_eq!(storage_object_name("17"), "17.jpg");
    }
}
