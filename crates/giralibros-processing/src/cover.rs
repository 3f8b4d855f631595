//! The cover normalization pipeline.
//!
//! Decode, orient, flatten, center-crop to 2:3, fit inside the envelope
//! without upscaling, and re-encode as an optimized JPEG. The output aspect
//! ratio is exactly 2:3 for every input: final dimensions are snapped to a
//! (2k, 3k) pair after the floor-division crop.

use bytes::Bytes;
use image::{imageops, DynamicImage, GenericImageView};
use std::io::Cursor;

use crate::orientation;

/// Target aspect ratio, width:height.
pub const ASPECT_W: u32 = 2;
pub const ASPECT_H: u32 = 3;

/// The single error class for anything a client can submit wrong:
/// oversized payloads, disallowed types, undecodable bytes, and any
/// processing failure downstream of them.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct InvalidImage(pub String);

/// Normalization parameters. The envelope must itself be an exact 2:3 pair.
#[derive(Debug, Clone, Copy)]
pub struct CoverSpec {
    pub max_width: u32,
    pub max_height: u32,
    pub jpeg_quality: u8,
}

impl Default for CoverSpec {
    fn default() -> Self {
        Self {
            max_width: 400,
            max_height: 600,
            jpeg_quality: 85,
        }
    }
}

/// A normalized cover: JPEG bytes plus final dimensions.
#[derive(Debug, Clone)]
pub struct NormalizedCover {
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
}

pub struct CoverNormalizer {
    spec: CoverSpec,
}

impl CoverNormalizer {
    pub fn new(spec: CoverSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> CoverSpec {
        self.spec
    }

    /// Run the full pipeline on raw upload bytes.
    ///
    /// Pure and synchronous; CPU-bound, so callers on an async runtime should
    /// wrap it in `spawn_blocking`.
    pub fn normalize(&self, data: &[u8]) -> Result<NormalizedCover, InvalidImage> {
        let img = decode(data)?;
        let img = orientation::apply_exif_orientation(img, data);
        // Palette and alpha inputs flatten to plain RGB here; nothing
        // downstream sees transparency.
        let img = DynamicImage::ImageRgb8(img.to_rgb8());
        let img = center_crop(img);
        let img = fit_envelope(img, self.spec.max_width, self.spec.max_height);

        let (width, height) = img.dimensions();
        let bytes = encode_jpeg(&img, self.spec.jpeg_quality)?;

        Ok(NormalizedCover {
            bytes,
            width,
            height,
        })
    }
}

fn decode(data: &[u8]) -> Result<DynamicImage, InvalidImage> {
    image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| InvalidImage(format!("Unreadable image data: {}", e)))?
        .decode()
        .map_err(|e| InvalidImage(format!("Could not decode image: {}", e)))
}

/// Dimensions of the centered 2:3 crop box for a w x h image.
///
/// Floor division keeps the box inside the image; the box is within one pixel
/// of the exact ratio, and the later (2k, 3k) snap absorbs the remainder.
fn crop_box(w: u32, h: u32) -> (u32, u32) {
    if w * ASPECT_H > h * ASPECT_W {
        // Wider than 2:3: crop width symmetrically.
        ((h * ASPECT_W / ASPECT_H).max(1), h)
    } else if w * ASPECT_H < h * ASPECT_W {
        // Taller than 2:3: crop height symmetrically.
        (w, (w * ASPECT_H / ASPECT_W).max(1))
    } else {
        (w, h)
    }
}

fn center_crop(img: DynamicImage) -> DynamicImage {
    let (w, h) = img.dimensions();
    let (cw, ch) = crop_box(w, h);
    if (cw, ch) == (w, h) {
        return img;
    }
    let x = (w - cw) / 2;
    let y = (h - ch) / 2;
    img.crop_imm(x, y, cw, ch)
}

/// Select a resampling filter based on how far the image is downscaled.
fn select_filter(orig_width: u32, orig_height: u32, new_width: u32, new_height: u32) -> imageops::FilterType {
    let width_ratio = orig_width as f32 / new_width as f32;
    let height_ratio = orig_height as f32 / new_height as f32;
    let max_ratio = width_ratio.max(height_ratio);

    if max_ratio > 2.0 {
        imageops::FilterType::Triangle
    } else if max_ratio > 1.5 {
        imageops::FilterType::CatmullRom
    } else {
        imageops::FilterType::Lanczos3
    }
}

/// Snap to an exact (2k, 3k) pair no larger than the envelope or the cropped
/// image. Downscale only: k never exceeds what the source provides, except
/// for degenerate sub-2x3 inputs where the minimal 2x3 output is produced.
fn fit_envelope(img: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    let (cw, ch) = img.dimensions();
    let k = (cw / ASPECT_W)
        .min(ch / ASPECT_H)
        .min(max_width / ASPECT_W)
        .min(max_height / ASPECT_H)
        .max(1);
    let (ow, oh) = (ASPECT_W * k, ASPECT_H * k);
    if (ow, oh) == (cw, ch) {
        return img;
    }
    let filter = select_filter(cw, ch, ow, oh);
    img.resize_exact(ow, oh, filter)
}

/// Encode as JPEG with optimized Huffman tables and progressive scan.
fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Bytes, InvalidImage> {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
    comp.set_size(width as usize, height as usize);
    comp.set_quality(quality as f32);
    comp.set_progressive_mode();
    comp.set_optimize_coding(true);

    let mut comp = comp
        .start_compress(Vec::new())
        .map_err(|e| InvalidImage(format!("JPEG encoding failed: {}", e)))?;
    comp.write_scanlines(&rgb)
        .map_err(|e| InvalidImage(format!("JPEG encoding failed: {}", e)))?;
    let jpeg_data = comp
        .finish()
        .map_err(|e| InvalidImage(format!("JPEG encoding failed: {}", e)))?;

    Ok(Bytes::from(jpeg_data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

    fn png_bytes(img: &DynamicImage) -> Vec<u8> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn solid_png(width: u32, height: u32) -> Vec<u8> {
        png_bytes(&DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            Rgb([120, 80, 40]),
        )))
    }

    fn normalizer() -> CoverNormalizer {
        CoverNormalizer::new(CoverSpec::default())
    }

    /// Build a JPEG carrying an EXIF orientation tag: SOI, then an APP1
    /// segment with a single-entry IFD (tag 0x0112), then the rest of a
    /// plain encoded JPEG.
    fn jpeg_with_orientation(img: &DynamicImage, orientation: u8) -> Vec<u8> {
        let mut plain = Vec::new();
        img.write_to(&mut Cursor::new(&mut plain), ImageFormat::Jpeg)
            .unwrap();
        assert_eq!(&plain[..2], &[0xFF, 0xD8]);

        let mut tiff: Vec<u8> = Vec::new();
        tiff.extend_from_slice(b"II*\0"); // little-endian TIFF header
        tiff.extend_from_slice(&8u32.to_le_bytes()); // IFD offset
        tiff.extend_from_slice(&1u16.to_le_bytes()); // one entry
        tiff.extend_from_slice(&0x0112u16.to_le_bytes()); // Orientation
        tiff.extend_from_slice(&3u16.to_le_bytes()); // SHORT
        tiff.extend_from_slice(&1u32.to_le_bytes()); // count
        tiff.extend_from_slice(&(orientation as u16).to_le_bytes());
        tiff.extend_from_slice(&0u16.to_le_bytes()); // value padding
        tiff.extend_from_slice(&0u32.to_le_bytes()); // no next IFD

        let mut app1: Vec<u8> = Vec::new();
        app1.extend_from_slice(b"Exif\0\0");
        app1.extend_from_slice(&tiff);
        let app1_len = (app1.len() + 2) as u16;

        let mut out = Vec::new();
        out.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xE1]);
        out.extend_from_slice(&app1_len.to_be_bytes());
        out.extend_from_slice(&app1);
        out.extend_from_slice(&plain[2..]);
        out
    }

    #[test]
    fn test_crop_box_ratios() {
        // Wider than 2:3
        assert_eq!(crop_box(4000, 2000), (1333, 2000));
        // Taller than 2:3
        assert_eq!(crop_box(2000, 4000), (2000, 3000));
        // Exactly 2:3
        assert_eq!(crop_box(400, 600), (400, 600));
        // Square
        assert_eq!(crop_box(900, 900), (600, 900));
    }

    #[test]
    fn test_output_is_exact_two_thirds_for_any_input() {
        let n = normalizer();
        for (w, h) in [(4000, 2000), (2000, 4000), (999, 1001), (100, 100), (31, 7)] {
            let cover = n.normalize(&solid_png(w, h)).unwrap();
            assert_eq!(
                cover.width * ASPECT_H,
                cover.height * ASPECT_W,
                "{}x{} -> {}x{}",
                w,
                h,
                cover.width,
                cover.height
            );
            assert!(cover.width <= 400 && cover.height <= 600);
        }
    }

    #[test]
    fn test_large_landscape_hits_envelope() {
        let cover = normalizer().normalize(&solid_png(4000, 2000)).unwrap();
        assert_eq!((cover.width, cover.height), (400, 600));
    }

    #[test]
    fn test_small_input_is_not_upscaled() {
        // 100x151 crops to 100x151-ish and snaps to 100x150, never up to 400x600.
        let cover = normalizer().normalize(&solid_png(100, 151)).unwrap();
        assert_eq!((cover.width, cover.height), (100, 150));
    }

    #[test]
    fn test_output_is_jpeg() {
        let cover = normalizer().normalize(&solid_png(300, 300)).unwrap();
        // JPEG SOI marker
        assert_eq!(&cover.bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::ImageReader::new(Cursor::new(cover.bytes.as_ref()))
            .with_guessed_format()
            .unwrap();
        assert_eq!(decoded.format(), Some(ImageFormat::Jpeg));
    }

    #[test]
    fn test_alpha_input_flattens_to_opaque_jpeg() {
        let rgba = RgbaImage::from_pixel(200, 300, Rgba([255, 0, 0, 128]));
        let data = png_bytes(&DynamicImage::ImageRgba8(rgba));

        let cover = normalizer().normalize(&data).unwrap();
        let decoded = image::load_from_memory(&cover.bytes).unwrap();
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn test_normalize_is_idempotent_on_dimensions() {
        let n = normalizer();
        let first = n.normalize(&solid_png(4000, 2000)).unwrap();
        let second = n.normalize(&first.bytes).unwrap();
        // Already 2:3 and within the envelope: the crop and resize are no-ops.
        assert_eq!((second.width, second.height), (first.width, first.height));
    }

    #[test]
    fn test_exif_orientation_rotates_before_crop() {
        // 40x20 landscape with orientation 6 (90 CW) becomes 20x40 portrait,
        // which crops to 20x30. Without the rotation it would crop to 12x18.
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 20, Rgb([9, 9, 9])));
        let data = jpeg_with_orientation(&img, 6);
        assert_eq!(orientation::read_orientation(&data), 6);

        let cover = normalizer().normalize(&data).unwrap();
        assert_eq!((cover.width, cover.height), (20, 30));
    }

    #[test]
    fn test_output_carries_no_orientation_tag() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 20, Rgb([9, 9, 9])));
        let data = jpeg_with_orientation(&img, 6);
        let cover = normalizer().normalize(&data).unwrap();
        assert_eq!(orientation::read_orientation(&cover.bytes), 1);
    }

    #[test]
    fn test_rotated_scenario_large_png() {
        // The 4000x2000 PNG with a 90-degree rotation: PNG carries no EXIF
        // container here, so exercise the same path by rotating first.
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4000, 2000, Rgb([1, 2, 3])));
        let rotated = img.rotate90();
        let cover = normalizer().normalize(&png_bytes(&rotated)).unwrap();
        assert_eq!((cover.width, cover.height), (400, 600));
    }

    #[test]
    fn test_undecodable_bytes_rejected() {
        let err = normalizer().normalize(b"definitely not an image").unwrap_err();
        assert!(err.to_string().contains("decode") || err.to_string().contains("Unreadable"));
    }

    #[test]
    fn test_degenerate_input_produces_minimal_cover() {
        let cover = normalizer().normalize(&solid_png(1, 1)).unwrap();
        assert_eq!((cover.width, cover.height), (2, 3));
    }
}
