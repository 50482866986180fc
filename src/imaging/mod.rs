//! WebP codec work — backends, validation, quality.
//!
//! | Concern | Module |
//! |---|---|
//! | Backend contract + quality | [`backend`] |
//! | Primary encoder (libwebp, lossy) | [`libwebp`] |
//! | Fallback encoder (pure Rust, lossless) | [`pixelbuf`] |
//! | Input/output validation, skip taxonomy | [`validator`] |
//!
//! The split keeps codec selection policy out of the encoders: backends only
//! encode, the [`Converter`](crate::convert::Converter) owns ordering,
//! fallback, and cleanup.

pub mod backend;
pub mod libwebp;
pub mod pixelbuf;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_images;

pub use backend::{BackendError, Quality, WebpBackend};
pub use libwebp::LibwebpBackend;
pub use pixelbuf::PixelBufferBackend;
pub use validator::{ImageInfo, SkipReason, validate_input, validate_output};
