//! Source image decoding with format sniffing and EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageFormat, ImageReader};

use super::{DecodeError, DecodedImage, Orientation, SourceImage};

/// Decode a caller-supplied source image into an upright RGB bitmap.
///
/// The declared MIME type seeds the reader's format, then the magic bytes are
/// sniffed and take precedence when recognised. JPEG sources have their EXIF
/// orientation applied. Any alpha channel is dropped.
///
/// # Errors
///
/// * `DecodeError::Empty` for a zero-byte source
/// * `DecodeError::InvalidFormat` when neither sniffing nor the hint yields a format
/// * `DecodeError::CorruptedFile` when the parser rejects the data
/// * `DecodeError::EmptyBitmap` when the result has no pixels
pub fn decode_source(source: &SourceImage<'_>) -> Result<DecodedImage, DecodeError> {
    let (reader, format) = open_reader(source)?;

    let img = reader.decode()?;

    let img = if format == ImageFormat::Jpeg {
        apply_orientation(img, extract_orientation(source.bytes()))
    } else {
        img
    };

    let decoded = DecodedImage::from_rgb_image(img.into_rgb8());
    if decoded.is_empty() {
        return Err(DecodeError::EmptyBitmap);
    }
    Ok(decoded)
}

/// Read the format and upright dimensions without decoding pixel data.
///
/// For JPEG sources the EXIF orientation is honoured, so the dimensions
/// match what `decode_source` would return.
pub fn probe_source(source: &SourceImage<'_>) -> Result<(ImageFormat, u32, u32), DecodeError> {
    let (reader, format) = open_reader(source)?;
    let (width, height) = reader.into_dimensions()?;
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyBitmap);
    }

    if format == ImageFormat::Jpeg && extract_orientation(source.bytes()).swaps_dimensions() {
        return Ok((format, height, width));
    }
    Ok((format, width, height))
}

fn open_reader<'a>(
    source: &SourceImage<'a>,
) -> Result<(ImageReader<Cursor<&'a [u8]>>, ImageFormat), DecodeError> {
    if source.is_empty() {
        return Err(DecodeError::Empty);
    }

    let mut reader = ImageReader::new(Cursor::new(source.bytes()));
    if let Some(hint) = source.format_hint() {
        reader.set_format(hint);
    }

    // Sniffing keeps the hinted format when the magic bytes are unknown
    let reader = reader
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let format = reader.format().ok_or(DecodeError::InvalidFormat)?;
    Ok((reader, format))
}

/// Extract EXIF orientation from JPEG bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
