//! Codec backend trait and shared types.
//!
//! The [`WebpBackend`] trait defines the single operation every backend must
//! support: encode one raster file to WebP at a given quality. Backends are
//! resolved once at startup into an ordered list; the converter tries them in
//! priority order and treats any [`BackendError`] as "try the next one", so a
//! backend failure never crosses the converter's public contract.
//!
//! Production implementations:
//! - [`LibwebpBackend`](super::libwebp::LibwebpBackend) — libwebp, lossy,
//!   quality + compression-method tuning (first choice)
//! - [`PixelBufferBackend`](super::pixelbuf::PixelBufferBackend) — pure-Rust
//!   lossless encoder over a flattened pixel buffer (fallback)

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Quality setting for lossy WebP encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Trait for WebP codec backends.
///
/// `available()` is queried once when the converter assembles its backend
/// list, so backends compiled in but unusable at runtime can opt out without
/// changing caller code.
pub trait WebpBackend: Sync {
    /// Short identifier used in failure reasons and CLI output.
    fn name(&self) -> &'static str;

    /// Whether this backend can encode on the current system.
    fn available(&self) -> bool {
        true
    }

    /// Encode `source` (JPEG/PNG) to WebP at `dest`.
    fn encode(&self, source: &Path, dest: &Path, quality: Quality) -> Result<(), BackendError>;
}
