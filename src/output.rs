//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every entity (image, document, batch) is what happened to it — the
//! conversion result and sizes — with filesystem paths as the identity line
//! and detail shown via indented context lines.
//!
//! # Output Format
//!
//! ## Convert
//!
//! ```text
//! photo.jpg → photo.webp
//!     234.5 KB → 81.2 KB (saved 153.3 KB)
//! logo.png: skipped (already WebP)
//! broken.jpg: failed (no backend succeeded)
//! ```
//!
//! ## Batch
//!
//! ```text
//! document 12: converted (3 images, saved 412.0 KB)
//! document 13: partially converted (1/3 images)
//! document 14: no images
//!
//! Batch: 4 converted, 2 failed, 1 skipped, 2 documents updated, saved 512.3 KB
//! ```
//!
//! ## Status
//!
//! ```text
//! document 12  converted            2026-08-23T10:15:00+00:00
//! document 13  partially_converted  2026-08-23T10:15:01+00:00
//!
//! 2 documents: 1 converted, 1 partially converted, 0 not converted, 0 without images
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>` or `String`)
//! for testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::batch::{BatchSummary, DocumentReport};
use crate::convert::ConversionOutcome;
use crate::ledger::{DocumentStatus, LedgerEntry, LedgerStats};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a byte count as a human-readable decimal size.
fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

// ============================================================================
// Stage 1: Convert output
// ============================================================================

/// Format the result of converting one file.
pub fn format_outcome(source: &Path, outcome: &ConversionOutcome) -> Vec<String> {
    let name = source.display();
    match outcome {
        ConversionOutcome::Success(c) => {
            let dest = c
                .output_path
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| c.output_path.display().to_string());
            let mut lines = vec![format!("{name} \u{2192} {dest}")];
            if c.up_to_date {
                lines.push("    up to date".to_string());
            } else {
                lines.push(format!(
                    "    {} \u{2192} {} (saved {})",
                    human_bytes(c.original_size),
                    human_bytes(c.output_size),
                    human_bytes(c.bytes_saved()),
                ));
            }
            lines
        }
        ConversionOutcome::Skipped(reason) => vec![format!("{name}: skipped ({reason})")],
        ConversionOutcome::Failed(reason) => vec![format!("{name}: failed ({reason})")],
    }
}

/// Print a per-file conversion result to stdout.
pub fn print_outcome(source: &Path, outcome: &ConversionOutcome) {
    for line in format_outcome(source, outcome) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Batch output
// ============================================================================

/// Format one document's batch result as a single line.
pub fn format_document_report(report: &DocumentReport) -> String {
    let id = report.document_id;
    match report.status {
        DocumentStatus::NoImages => format!("document {id}: no images"),
        DocumentStatus::Converted => format!(
            "document {id}: converted ({} images, saved {})",
            report.converted,
            human_bytes(report.bytes_saved),
        ),
        DocumentStatus::PartiallyConverted => format!(
            "document {id}: partially converted ({}/{} images)",
            report.converted,
            report.converted + report.failed + report.skipped,
        ),
        DocumentStatus::NotConverted => format!(
            "document {id}: not converted ({} failed, {} skipped)",
            report.failed, report.skipped,
        ),
    }
}

/// Format a whole batch run: one line per document plus a summary line.
pub fn format_batch_summary(summary: &BatchSummary) -> Vec<String> {
    let mut lines: Vec<String> = summary.reports.iter().map(format_document_report).collect();
    lines.push(String::new());
    lines.push(format!(
        "Batch: {} converted, {} failed, {} skipped, {} documents updated, saved {}",
        summary.converted,
        summary.failed,
        summary.skipped,
        summary.updated_documents,
        human_bytes(summary.bytes_saved),
    ));
    lines
}

/// Print batch output to stdout.
pub fn print_batch_summary(summary: &BatchSummary) {
    for line in format_batch_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 3: Status output
// ============================================================================

/// Format the ledger dump: aligned per-document rows plus a stats line.
pub fn format_status(entries: &[LedgerEntry], stats: &LedgerStats) -> Vec<String> {
    let mut lines = Vec::new();
    for entry in entries {
        lines.push(format!(
            "document {:<6} {:<20} {}",
            entry.document_id,
            entry.status,
            entry.last_converted.as_deref().unwrap_or("-"),
        ));
    }
    if !entries.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "{} documents: {} converted, {} partially converted, {} not converted, {} without images",
        stats.total(),
        stats.converted,
        stats.partially_converted,
        stats.not_converted,
        stats.no_images,
    ));
    lines
}

/// Print status output to stdout.
pub fn print_status(entries: &[LedgerEntry], stats: &LedgerStats) {
    for line in format_status(entries, stats) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
