//! Single-image conversion: the engine's core contract.
//!
//! [`Converter::convert_image`] walks one file through
//! `Validating → Encoding → Verifying` and always returns a tagged
//! [`ConversionOutcome`] — never an error. Skips are policy boundaries
//! (already WebP, too large, out-of-budget), failures are real problems
//! (all backends exhausted, corrupt output, unwritable directory), and both
//! leave the original file untouched. There are no retries within a call;
//! re-invocation is idempotent via the up-to-date fast path, so bulk re-runs
//! are the caller's retry mechanism.
//!
//! ## Destination naming
//!
//! The WebP path replaces the source's extension (`photo.jpg → photo.webp`),
//! the same convention [`urls::webp_url_for`](crate::urls::webp_url_for)
//! applies to URLs. One convention everywhere — scanner, converter, rewriter
//! — or the pieces stop agreeing on which file belongs to which reference.

use crate::imaging::{
    LibwebpBackend, PixelBufferBackend, Quality, SkipReason, WebpBackend, validate_input,
    validate_output,
};
use crate::settings::ConversionSettings;
use std::path::{Path, PathBuf};

/// A successful conversion's bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    pub output_path: PathBuf,
    pub original_size: u64,
    pub output_size: u64,
    /// True when the destination already existed, was newer than the source
    /// and non-empty, so no encode was performed.
    pub up_to_date: bool,
}

impl Converted {
    /// Space saved by the conversion, clamped to zero.
    pub fn bytes_saved(&self) -> u64 {
        self.original_size.saturating_sub(self.output_size)
    }
}

/// Result of converting one file. Every code path through the converter ends
/// in exactly one of these; no error type crosses this boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    Success(Converted),
    Skipped(SkipReason),
    Failed(String),
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Derive the canonical WebP destination for a raster source path.
pub fn webp_destination(path: &Path) -> PathBuf {
    path.with_extension("webp")
}

/// The production backend list in priority order.
pub fn default_backends() -> Vec<Box<dyn WebpBackend>> {
    vec![
        Box::new(LibwebpBackend::new()),
        Box::new(PixelBufferBackend::new()),
    ]
}

/// Orchestrates validation, backend selection, output verification and
/// original-removal for single images.
pub struct Converter {
    settings: ConversionSettings,
    backends: Vec<Box<dyn WebpBackend>>,
}

impl Converter {
    pub fn new(settings: ConversionSettings) -> Self {
        Self::with_backends(settings, default_backends())
    }

    /// Build a converter with an explicit backend list. Unavailable backends
    /// are dropped here, once, so the per-image path never re-probes.
    pub fn with_backends(
        settings: ConversionSettings,
        backends: Vec<Box<dyn WebpBackend>>,
    ) -> Self {
        let backends = backends.into_iter().filter(|b| b.available()).collect();
        Self { settings, backends }
    }

    pub fn settings(&self) -> &ConversionSettings {
        &self.settings
    }

    /// Convert one raster file to WebP.
    pub fn convert_image(&self, path: &Path) -> ConversionOutcome {
        if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("webp"))
        {
            return ConversionOutcome::Skipped(SkipReason::AlreadyWebp);
        }

        let info = match validate_input(path, &self.settings) {
            Ok(info) => info,
            Err(reason) => return ConversionOutcome::Skipped(reason),
        };

        let dest = webp_destination(path);
        if destination_up_to_date(path, &dest) {
            let output_size = std::fs::metadata(&dest).map(|m| m.len()).unwrap_or(0);
            return ConversionOutcome::Success(Converted {
                output_path: dest,
                original_size: info.file_size,
                output_size,
                up_to_date: true,
            });
        }

        if let Some(dir) = dest.parent() {
            if let Err(e) = std::fs::create_dir_all(dir) {
                return ConversionOutcome::Failed(format!(
                    "directory not writable: {}: {e}",
                    dir.display()
                ));
            }
        }

        if self.backends.is_empty() {
            return ConversionOutcome::Failed("no conversion backend available".into());
        }

        // Probe writability for the current user by creating the destination
        // now; the winning backend overwrites it, failure paths remove it.
        if let Err(e) = std::fs::File::create(&dest) {
            return ConversionOutcome::Failed(format!(
                "destination not writable: {}: {e}",
                dest.display()
            ));
        }

        let quality = Quality::new(self.settings.quality);
        let mut last_error = String::new();
        let mut encoded = false;
        for backend in &self.backends {
            match backend.encode(path, &dest, quality) {
                Ok(()) => {
                    encoded = true;
                    break;
                }
                Err(e) => last_error = format!("{}: {e}", backend.name()),
            }
        }
        if !encoded {
            remove_if_present(&dest);
            return ConversionOutcome::Failed(format!("no backend succeeded ({last_error})"));
        }

        if let Err(reason) = validate_output(&dest) {
            remove_if_present(&dest);
            return ConversionOutcome::Failed(reason);
        }

        let output_size = std::fs::metadata(&dest).map(|m| m.len()).unwrap_or(0);

        // Delete the source only after the output has been validated.
        if !self.settings.keep_original {
            let _ = std::fs::remove_file(path);
        }

        ConversionOutcome::Success(Converted {
            output_path: dest,
            original_size: info.file_size,
            output_size,
            up_to_date: false,
        })
    }
}

/// Fast path: destination exists, is non-empty and at least as new as the
/// source. Doubles as the cheap mutual-exclusion heuristic across repeated
/// calls — no locking needed for this workload.
fn destination_up_to_date(source: &Path, dest: &Path) -> bool {
    let Ok(dest_meta) = std::fs::metadata(dest) else {
        return false;
    };
    if !dest_meta.is_file() || dest_meta.len() == 0 {
        return false;
    }
    match (
        std::fs::metadata(source).and_then(|m| m.modified()),
        dest_meta.modified(),
    ) {
        (Ok(src_mtime), Ok(dest_mtime)) => dest_mtime >= src_mtime,
        _ => false,
    }
}

fn remove_if_present(path: &Path) {
    let _ = std::fs::remove_file(path);
}
