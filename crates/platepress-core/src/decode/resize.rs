//! Canvas resampling and aspect-ratio fitting.
//!
//! All functions return new `DecodedImage` instances without modifying the input.

use super::{DecodeError, DecodedImage, FilterType};

/// Resize an image to exact dimensions.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` for a zero target dimension and
/// `DecodeError::CorruptedFile` if the pixel buffer does not match its
/// declared dimensions.
pub fn resize(
    image: &DecodedImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidFormat);
    }

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let view = image
        .as_rgb_view()
        .ok_or_else(|| DecodeError::CorruptedFile("Pixel buffer size mismatch".to_string()))?;

    let resized = image::imageops::resize(&view, width, height, filter.to_image_filter());

    Ok(DecodedImage::from_rgb_image(resized))
}

/// Fit `(width, height)` inside a `cap_width x cap_height` box, preserving
/// aspect ratio and never upscaling.
///
/// Each axis of the result is then raised to at least `min(floor, native axis)`,
/// so the floor can never push an axis past its native size. For very wide or
/// tall sources this changes the aspect ratio.
pub fn fit_dimensions(
    (width, height): (u32, u32),
    (cap_width, cap_height): (u32, u32),
    floor: u32,
) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let ratio = (cap_width as f64 / width as f64)
        .min(cap_height as f64 / height as f64)
        .min(1.0);

    let fitted_width = (width as f64 * ratio).round() as u32;
    let fitted_height = (height as f64 * ratio).round() as u32;

    (
        clamp_axis(fitted_width, width, floor),
        clamp_axis(fitted_height, height, floor),
    )
}

/// Clamp one axis into `[min(floor, native), native]`.
pub fn clamp_axis(value: u32, native: u32, floor: u32) -> u32 {
    value.max(floor.min(native)).min(native).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x * 255) / width.max(1)) as u8); // R
                pixels.push(((y * 255) / height.max(1)) as u8); // G
                pixels.push(128); // B
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    #[test]
    fn test_resize_basic() {
        let img = create_test_image(100, 50);
        let resized = resize(&img, 50, 25, FilterType::Lanczos3).unwrap();

        assert_eq!(resized.dimensions(), (50, 25));
        assert_eq!(resized.pixels.len(), 50 * 25 * 3);
    }

    #[test]
    fn test_resize_same_dimensions() {
        let img = create_test_image(100, 50);
        let resized = resize(&img, 100, 50, FilterType::Bilinear).unwrap();

        assert_eq!(resized.dimensions(), (100, 50));
        assert_eq!(resized.pixels, img.pixels);
    }

    #[test]
    fn test_resize_zero_dimensions_error() {
        let img = create_test_image(100, 50);

        assert!(resize(&img, 0, 50, FilterType::Bilinear).is_err());
        assert!(resize(&img, 50, 0, FilterType::Bilinear).is_err());
    }

    #[test]
    fn test_resize_mismatched_buffer_error() {
        let img = DecodedImage {
            width: 10,
            height: 10,
            pixels: vec![0u8; 12],
        };
        assert!(matches!(
            resize(&img, 5, 5, FilterType::Nearest),
            Err(DecodeError::CorruptedFile(_))
        ));
    }

    #[test]
    fn test_all_filter_types() {
        let img = create_test_image(100, 50);

        for filter in [
            FilterType::Nearest,
            FilterType::Bilinear,
            FilterType::CatmullRom,
            FilterType::Lanczos3,
        ] {
            let resized = resize(&img, 50, 25, filter).unwrap();
            assert_eq!(resized.dimensions(), (50, 25));
        }
    }

    #[test]
    fn test_fit_landscape() {
        assert_eq!(fit_dimensions((4000, 3000), (800, 800), 400), (800, 600));
    }

    #[test]
    fn test_fit_portrait() {
        assert_eq!(fit_dimensions((3000, 4000), (1024, 1024), 400), (768, 1024));
    }

    #[test]
    fn test_fit_square() {
        assert_eq!(fit_dimensions((4000, 4000), (950, 950), 400), (950, 950));
    }

    #[test]
    fn test_fit_never_upscales() {
        assert_eq!(fit_dimensions((600, 600), (1024, 1024), 400), (600, 600));
        assert_eq!(fit_dimensions((300, 200), (1024, 1024), 400), (300, 200));
    }

    #[test]
    fn test_fit_floor_on_narrow_axis() {
        // 4000x500 panorama squeezed into 800x800 would be 800x100
        assert_eq!(fit_dimensions((4000, 500), (800, 800), 400), (800, 400));
    }

    #[test]
    fn test_fit_floor_capped_by_native() {
        // Native height below the floor stays at native
        assert_eq!(fit_dimensions((4000, 250), (800, 800), 400), (800, 250));
    }

    #[test]
    fn test_fit_zero_input() {
        assert_eq!(fit_dimensions((0, 0), (800, 800), 400), (0, 0));
    }

    #[test]
    fn test_clamp_axis() {
        assert_eq!(clamp_axis(200, 4000, 400), 400);
        assert_eq!(clamp_axis(200, 300, 400), 300);
        assert_eq!(clamp_axis(900, 800, 400), 800);
        assert_eq!(clamp_axis(500, 800, 400), 500);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
