//! The compressed result and naming helpers for storing it.

use crate::report::CompressionSummary;

/// Content type of every result.
pub const CONTENT_TYPE: &str = "image/jpeg";

/// Extensions rewritten to `.jpg` by [`jpeg_file_name`].
const IMAGE_EXTENSIONS: [&str; 8] = ["png", "webp", "gif", "jpeg", "jpg", "bmp", "tif", "tiff"];

/// Final JPEG blob plus the statistics of the call that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Quality of the encode, `None` if the source passed through unchanged.
    pub quality: Option<f32>,
    pub summary: CompressionSummary,
}

impl CompressedImage {
    pub fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// File name for an upload after compression.
///
/// Known image extensions become `.jpg` (case-insensitive); a name without
/// one gets `.jpg` appended.
pub fn jpeg_file_name(name: &str) -> String {
    if let Some((stem, extension)) = name.rsplit_once('.') {
        if !stem.is_empty() {
            let lower = extension.to_ascii_lowercase();
            if IMAGE_EXTENSIONS.contains(&lower.as_str()) {
                return format!("{stem}.jpg");
            }
        }
    }
    if name.is_empty() {
        return "image.jpg".to_string();
    }
    format!("{name}.jpg")
}

/// Object name for a stored upload keyed by record id.
pub fn storage_object_name(id: &str) -> String {
    format!("{id}.jpg")
}
