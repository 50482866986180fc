//! Content work — finding image references and rewriting them.
//!
//! | Concern | Module |
//! |---|---|
//! | Reference discovery in markup | [`scanner`] |
//! | Reference discovery in block trees | [`blocks`] |
//! | URL substitution + dual-source fallback | [`rewriter`] |
//!
//! Scanning and rewriting are pure functions of their inputs; all filesystem
//! knowledge comes in through [`SiteContext`](crate::site::SiteContext).

pub mod blocks;
pub mod rewriter;
pub mod scanner;

pub use blocks::{Block, collect_image_urls, extract_from_blocks};
pub use rewriter::rewrite;
pub use scanner::{ImageReference, ReferenceKind, extract_images};
