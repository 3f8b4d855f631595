//! EXIF orientation handling.
//!
//! Cameras record the sensor orientation in EXIF tag 0x0112 instead of
//! rotating pixels. We rotate/flip the decoded image to match the intended
//! view; the later JPEG re-encode writes no EXIF, so no tag survives.

use image::DynamicImage;

/// Read the EXIF orientation tag (1-8) from raw image bytes.
///
/// Returns 1 (normal) when the container has no EXIF or no orientation field.
pub fn read_orientation(data: &[u8]) -> u8 {
    let mut cursor = std::io::Cursor::new(data);
    match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(meta) => meta
            .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(|v| v as u8)
            .unwrap_or(1),
        Err(_) => 1,
    }
}

/// Rotation and flips for a given EXIF orientation value.
/// Returns (rotate_angle_cw, flip_horizontal, flip_vertical).
pub fn orientation_transforms(orientation: u8) -> (Option<u16>, bool, bool) {
    match orientation {
        1 => (None, false, false),      // Normal
        2 => (None, true, false),       // Mirror horizontal
        3 => (Some(180), false, false), // Rotate 180
        4 => (None, false, true),       // Mirror vertical
        5 => (Some(270), true, false),  // Mirror horizontal + Rotate 270 CW
        6 => (Some(90), false, false),  // Rotate 90 CW
        7 => (Some(90), true, false),   // Mirror horizontal + Rotate 90 CW
        8 => (Some(270), false, false), // Rotate 270 CW
        _ => (None, false, false),      // Invalid, treat as normal
    }
}

/// Apply the orientation recorded in `data`'s EXIF to the decoded image.
pub fn apply_exif_orientation(mut img: DynamicImage, data: &[u8]) -> DynamicImage {
    let orientation = read_orientation(data);
    let (rotate, flip_h, flip_v) = orientation_transforms(orientation);

    tracing::debug!(
        orientation = orientation,
        rotate = ?rotate,
        flip_horizontal = flip_h,
        flip_vertical = flip_v,
        "Applying EXIF orientation"
    );

    if let Some(angle) = rotate {
        img = match angle {
            90 => img.rotate90(),
            180 => img.rotate180(),
            270 => img.rotate270(),
            _ => img,
        };
    }
    if flip_h {
        img = img.fliph();
    }
    if flip_v {
        img = img.flipv();
    }

    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    #[test]
    fn test_orientation_transforms_all_values() {
        assert_eq!(orientation_transforms(1), (None, false, false));
        assert_eq!(orientation_transforms(2), (None, true, false));
        assert_eq!(orientation_transforms(3), (Some(180), false, false));
        assert_eq!(orientation_transforms(4), (None, false, true));
        assert_eq!(orientation_transforms(5), (Some(270), true, false));
        assert_eq!(orientation_transforms(6), (Some(90), false, false));
        assert_eq!(orientation_transforms(7), (Some(90), true, false));
        assert_eq!(orientation_transforms(8), (Some(270), false, false));
        // Out-of-range values fall back to normal
        assert_eq!(orientation_transforms(0), (None, false, false));
        assert_eq!(orientation_transforms(9), (None, false, false));
        assert_eq!(orientation_transforms(255), (None, false, false));
    }

    #[test]
    fn test_read_orientation_without_exif() {
        let img = RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]));
        let mut buffer = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut buffer),
            image::ImageFormat::Png,
        )
        .unwrap();
        assert_eq!(read_orientation(&buffer), 1);
        assert_eq!(read_orientation(b"not an image"), 1);
    }

    #[test]
    fn test_apply_without_exif_is_identity() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 2, Rgb([1, 2, 3])));
        let out = apply_exif_orientation(img.clone(), b"");
        assert_eq!(out.dimensions(), (4, 2));
    }

    #[test]
    fn test_rotation_swaps_dimensions() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 2, Rgb([0, 0, 255])));

        assert_eq!(img.rotate90().dimensions(), (2, 4));
        assert_eq!(img.rotate180().dimensions(), (4, 2));
        assert_eq!(img.rotate270().dimensions(), (2, 4));
    }

    #[test]
    fn test_rotate90_moves_pixels_clockwise() {
        // 2x1: red at (0,0), blue at (1,0)
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 0, 255]));
        let rotated = DynamicImage::ImageRgb8(img).rotate90();

        // After 90 CW: 1x2 with red on top
        assert_eq!(rotated.dimensions(), (1, 2));
        let rgb = rotated.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(rgb.get_pixel(0, 1), &Rgb([0, 0, 255]));
    }
}
