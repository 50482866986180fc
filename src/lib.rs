//! # Webpress
//!
//! A WebP conversion and content-rewriting engine. Point it at the images a
//! site serves and the documents that reference them: it converts JPEG/PNG
//! files to WebP, rewrites the references with a dual-source fallback, and
//! keeps a durable ledger of per-document conversion status.
//!
//! # Architecture: Three Concerns
//!
//! ```text
//! 1. Imaging   JPEG/PNG file  →  .webp file      (codec backends + validation)
//! 2. Content   document text  →  rewritten text  (scan references, substitute URLs)
//! 3. Ledger    document id    →  status row      (durable SQLite bookkeeping)
//! ```
//!
//! The [`batch`] driver composes all three per document; the [`convert`]
//! module is usable on its own for one-off file conversion. This separation
//! exists for three reasons:
//!
//! - **Restartability**: scanning and rewriting are pure functions, and the
//!   converter's up-to-date fast path makes re-runs cheap, so an interrupted
//!   batch is simply run again.
//! - **Testability**: each concern is exercised in isolation — a scripted
//!   mock backend for conversion policy, string fixtures for content work,
//!   an in-memory database for the ledger.
//! - **Embeddability**: a hosting environment supplies a
//!   [`site::SiteContext`] and a [`batch::DocumentStore`] and gets the whole
//!   pipeline; nothing reads global state.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Codec backends (libwebp lossy, pure-Rust lossless fallback), input/output validation |
//! | [`convert`] | Single-image conversion state machine — the `ConversionOutcome` contract |
//! | [`content`] | Reference scanning (markup + block trees) and URL rewriting |
//! | [`site`] | URL ↔ filesystem mapping supplied by the hosting environment |
//! | [`urls`] | Pure URL string conventions: normalization, extension logic, WebP derivation |
//! | [`ledger`] | SQLite-backed per-document conversion status |
//! | [`batch`] | Per-document pipeline and batch aggregation |
//! | [`settings`] | `webpress.toml` loading and validation |
//! | [`output`] | CLI output formatting — pure formatters plus print wrappers |
//!
//! # Design Decisions
//!
//! ## Outcomes, Not Errors
//!
//! [`convert::Converter::convert_image`] never returns `Err`. Every call ends
//! in a tagged [`convert::ConversionOutcome`]: `Success` with size
//! bookkeeping, `Skipped` with a typed [`imaging::SkipReason`], or `Failed`
//! with a human-readable reason. Skips are policy boundaries and failures are
//! real problems, and callers aggregate both without unwinding a batch.
//!
//! ## Fallback, Never Replacement
//!
//! Rewritten documents keep the original reference verbatim inside a
//! `<picture>` dual-source construct. A consumer that cannot render WebP
//! falls back to the untouched JPEG/PNG source; deleting originals is a
//! separate, explicit setting (`keep_original = false`) that only applies
//! after output validation.
//!
//! ## One Naming Convention Everywhere
//!
//! The WebP name replaces the raster extension (`photo.jpg → photo.webp`),
//! for files and URLs alike. Converter, scanner, rewriter and the URL mapping
//! all go through the same helpers ([`convert::webp_destination`],
//! [`urls::webp_url_for`]), so the pieces cannot disagree about which output
//! belongs to which reference.
//!
//! ## Durable Ledger Over In-Process State
//!
//! Conversion status lives in SQLite, written with the database's native
//! atomic upsert. Batch runs can be interrupted, resumed, or repeated and the
//! ledger stays consistent; an absent row reads as "not converted".

pub mod batch;
pub mod content;
pub mod convert;
pub mod imaging;
pub mod ledger;
pub mod output;
pub mod settings;
pub mod site;
pub mod urls;
