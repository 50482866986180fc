//! Fallback codec backend: pure-Rust lossless encoder over a pixel buffer.
//!
//! Uses `image::codecs::webp::WebPEncoder`, which only does lossless
//! encoding, so the quality setting cannot be honored here — this backend
//! exists to keep conversions working when the primary backend fails on an
//! input. The source is flattened to a true-color buffer before encoding:
//! palette PNGs are promoted to RGBA (palette indices corrupt transparency if
//! fed to the encoder raw), JPEGs go through RGB since they carry no alpha
//! channel and compositing against a background is unnecessary.

use super::backend::{BackendError, Quality, WebpBackend};
use image::codecs::webp::WebPEncoder;
use image::{ImageEncoder, ImageFormat, ImageReader};
use std::io::BufWriter;
use std::path::Path;

/// Pure-Rust fallback encoder.
pub struct PixelBufferBackend;

impl PixelBufferBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PixelBufferBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl WebpBackend for PixelBufferBackend {
    fn name(&self) -> &'static str {
        "pixelbuf"
    }

    fn encode(&self, source: &Path, dest: &Path, _quality: Quality) -> Result<(), BackendError> {
        let reader = ImageReader::open(source)
            .map_err(BackendError::Io)?
            .with_guessed_format()
            .map_err(BackendError::Io)?;
        let format = reader.format();
        let img = reader.decode().map_err(|e| {
            BackendError::EncodingFailed(format!("decode {} failed: {e}", source.display()))
        })?;

        let file = std::fs::File::create(dest).map_err(BackendError::Io)?;
        let writer = BufWriter::new(file);
        let encoder = WebPEncoder::new_lossless(writer);

        let result = match format {
            // JPEG has no alpha channel; a three-channel buffer is enough.
            Some(ImageFormat::Jpeg) => {
                let rgb = img.to_rgb8();
                encoder.write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    image::ExtendedColorType::Rgb8,
                )
            }
            // PNG (incl. palette) and anything else: promote to true-color
            // with alpha so indexed pixels and transparency survive.
            _ => {
                let rgba = img.to_rgba8();
                encoder.write_image(
                    rgba.as_raw(),
                    rgba.width(),
                    rgba.height(),
                    image::ExtendedColorType::Rgba8,
                )
            }
        };

        result.map_err(|e| BackendError::EncodingFailed(format!("webp encode failed: {e}")))
    }
}
