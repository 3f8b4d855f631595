//! Image fixtures and multipart helpers.

use axum_test::multipart::{MultipartForm, Part};
use image::{DynamicImage, Rgb, RgbImage};
use std::io::Cursor;

/// A solid-color PNG of the given dimensions.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([90, 120, 180])));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .unwrap();
    buffer
}

/// Multipart form with a single "file" field.
pub fn file_form(data: Vec<u8>, content_type: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(data)
            .file_name("upload.png")
            .mime_type(content_type),
    )
}
