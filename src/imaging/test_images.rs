//! Shared synthetic image fixtures for the test suite.

use image::ImageEncoder;
use std::path::Path;

/// Write a small valid JPEG with a gradient pattern.
pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a small opaque PNG.
pub fn write_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 64])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

/// Write an RGBA PNG whose top-left quadrant is fully transparent.
pub fn write_transparent_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        let alpha = if x < width / 2 && y < height / 2 { 0 } else { 255 };
        image::Rgba([200, 50, 50, alpha])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

/// Write a small valid lossless WebP.
pub fn write_webp(path: &Path, width: u32, height: u32) {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 32, 255])
    });
    let file = std::fs::File::create(path).unwrap();
    image::codecs::webp::WebPEncoder::new_lossless(file)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
}
