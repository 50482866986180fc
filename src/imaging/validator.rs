//! Input and output validation around codec invocations.
//!
//! Input checks run in a fixed order, first failure wins: file exists → size
//! within policy → decodable JPEG/PNG (header probe only, no full decode) →
//! dimensions within policy → estimated decode memory within budget. Every
//! rejection is a [`SkipReason`], not an error: oversized or unreadable
//! inputs are a policy boundary the caller counts as skipped.
//!
//! Output checks exist because codecs can report success at the API level
//! while writing a truncated or empty file under memory pressure; validation
//! is the only backstop. The converter deletes the output when
//! [`validate_output`] rejects it, so a failed conversion never leaves a
//! partial file behind.

use crate::settings::ConversionSettings;
use image::{ImageFormat, ImageReader};
use std::fmt;
use std::path::Path;

/// Decoded RGBA working set is width × height × 4; the factor covers the
/// source copy and encoder-side buffers on top of that.
const MEMORY_SAFETY_FACTOR: u64 = 3;

/// Why an input was skipped rather than converted. Policy boundaries, not
/// errors — see the module docs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyWebp,
    FileNotFound,
    FileTooLarge { size: u64, limit: u64 },
    UnsupportedType(String),
    Undecodable(String),
    DimensionsTooLarge { width: u32, height: u32, limit: u32 },
    MemoryBudgetExceeded { estimated: u64, budget: u64 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyWebp => write!(f, "already webp"),
            Self::FileNotFound => write!(f, "file not found"),
            Self::FileTooLarge { size, limit } => {
                write!(f, "file too large ({size} bytes, limit {limit})")
            }
            Self::UnsupportedType(t) => write!(f, "unsupported image type: {t}"),
            Self::Undecodable(e) => write!(f, "undecodable image: {e}"),
            Self::DimensionsTooLarge {
                width,
                height,
                limit,
            } => write!(f, "dimensions too large ({width}x{height}, limit {limit})"),
            Self::MemoryBudgetExceeded { estimated, budget } => {
                write!(f, "memory budget exceeded ({estimated} bytes, budget {budget})")
            }
        }
    }
}

/// Probe result for a validated input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub file_size: u64,
}

/// Conservative estimate of peak memory needed to decode and re-encode.
pub fn estimated_decode_bytes(width: u32, height: u32) -> u64 {
    width as u64 * height as u64 * 4 * MEMORY_SAFETY_FACTOR
}

/// Validate a candidate input file against conversion policy.
pub fn validate_input(path: &Path, settings: &ConversionSettings) -> Result<ImageInfo, SkipReason> {
    let metadata = std::fs::metadata(path).map_err(|_| SkipReason::FileNotFound)?;
    let file_size = metadata.len();
    if file_size > settings.max_file_size_bytes {
        return Err(SkipReason::FileTooLarge {
            size: file_size,
            limit: settings.max_file_size_bytes,
        });
    }

    let reader = ImageReader::open(path)
        .map_err(|_| SkipReason::FileNotFound)?
        .with_guessed_format()
        .map_err(|e| SkipReason::Undecodable(e.to_string()))?;
    let format = match reader.format() {
        Some(f @ (ImageFormat::Jpeg | ImageFormat::Png)) => f,
        Some(other) => return Err(SkipReason::UnsupportedType(format!("{other:?}"))),
        None => return Err(SkipReason::Undecodable("unknown format".into())),
    };
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| SkipReason::Undecodable(e.to_string()))?;

    if width > settings.max_dimension_px || height > settings.max_dimension_px {
        return Err(SkipReason::DimensionsTooLarge {
            width,
            height,
            limit: settings.max_dimension_px,
        });
    }

    let estimated = estimated_decode_bytes(width, height);
    if estimated > settings.memory_budget_bytes {
        return Err(SkipReason::MemoryBudgetExceeded {
            estimated,
            budget: settings.memory_budget_bytes,
        });
    }

    Ok(ImageInfo {
        format,
        width,
        height,
        file_size,
    })
}

/// Validate a freshly written output file: exists, non-empty, re-decodable.
///
/// The caller is responsible for deleting the output when this rejects it.
pub fn validate_output(path: &Path) -> Result<(), String> {
    let metadata =
        std::fs::metadata(path).map_err(|_| format!("output missing: {}", path.display()))?;
    if metadata.len() == 0 {
        return Err(format!("output is empty: {}", path.display()));
    }
    image::image_dimensions(path).map_err(|e| format!("output undecodable: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::test_images;

    #[test]
    fn accepts_small_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("a.jpg");
        test_images::write_jpeg(&path, 120, 90);

        let info = validate_input(&path, &ConversionSettings::default()).unwrap();
        assert_eq!(info.format, ImageFormat::Jpeg);
        assert_eq!((info.width, info.height), (120, 90));
        assert!(info.file_size > 0);
    }

    #[test]
    fn missing_file_is_a_skip() {
        let err = validate_input(
            Path::new("/nonexistent/a.jpg"),
            &ConversionSettings::default(),
        )
        .unwrap_err();
        assert_eq!(err, SkipReason::FileNotFound);
    }

    #[test]
    fn oversized_file_is_a_skip_before_decoding() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("a.jpg");
        // Not even a valid image: the size check must win first.
        std::fs::write(&path, vec![0u8; 2048]).unwrap();

        let settings = ConversionSettings {
            max_file_size_bytes: 1024,
            ..Default::default()
        };
        let err = validate_input(&path, &settings).unwrap_err();
        assert!(matches!(err, SkipReason::FileTooLarge { size: 2048, .. }));
    }

    #[test]
    fn non_image_content_is_a_skip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("a.jpg");
        std::fs::write(&path, b"plain text").unwrap();

        let err = validate_input(&path, &ConversionSettings::default()).unwrap_err();
        assert!(matches!(err, SkipReason::Undecodable(_)));
    }

    #[test]
    fn unsupported_format_is_a_skip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("a.webp");
        test_images::write_webp(&path, 8, 8);

        let err = validate_input(&path, &ConversionSettings::default()).unwrap_err();
        assert!(matches!(err, SkipReason::UnsupportedType(_)));
    }

    #[test]
    fn oversized_dimensions_are_a_skip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("a.jpg");
        test_images::write_jpeg(&path, 300, 100);

        let settings = ConversionSettings {
            max_dimension_px: 200,
            ..Default::default()
        };
        let err = validate_input(&path, &settings).unwrap_err();
        assert!(matches!(
            err,
            SkipReason::DimensionsTooLarge {
                width: 300,
                height: 100,
                limit: 200
            }
        ));
    }

    #[test]
    fn memory_budget_is_enforced() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("a.jpg");
        test_images::write_jpeg(&path, 100, 100);

        let settings = ConversionSettings {
            memory_budget_bytes: 1024,
            ..Default::default()
        };
        let err = validate_input(&path, &settings).unwrap_err();
        assert!(matches!(err, SkipReason::MemoryBudgetExceeded { .. }));
    }

    #[test]
    fn estimate_scales_with_pixel_count() {
        assert_eq!(estimated_decode_bytes(100, 100), 100 * 100 * 4 * 3);
    }

    #[test]
    fn output_validation_rejects_missing_empty_and_corrupt() {
        let tmp = tempfile::TempDir::new().unwrap();

        assert!(validate_output(&tmp.path().join("missing.webp")).is_err());

        let empty = tmp.path().join("empty.webp");
        std::fs::write(&empty, b"").unwrap();
        assert!(validate_output(&empty).is_err());

        let corrupt = tmp.path().join("corrupt.webp");
        std::fs::write(&corrupt, b"garbage").unwrap();
        assert!(validate_output(&corrupt).is_err());

        let good = tmp.path().join("good.webp");
        test_images::write_webp(&good, 4, 4);
        assert!(validate_output(&good).is_ok());
    }
}
