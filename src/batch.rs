//! Batch driver: conversion + rewriting across a set of documents.
//!
//! The driver owns the per-document pipeline — scan, convert, map, rewrite,
//! store, record — and the aggregation across documents. Per-image failures
//! are data (they land in the counts and the document's ledger status);
//! storage and ledger failures are errors and abort the batch, since a
//! half-recorded run is worse than a stopped one. Documents and images are
//! processed synchronously in caller order.

use crate::content::{extract_images, rewrite};
use crate::convert::{ConversionOutcome, Converter};
use crate::ledger::{DocumentStatus, Ledger, LedgerError, status_for_counts};
use crate::site::SiteContext;
use crate::urls;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("document store error: {0}")]
    Store(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Where document content lives. The engine never touches document storage
/// directly; the hosting environment supplies this seam.
pub trait DocumentStore {
    fn load_content(&self, document_id: i64) -> Result<String, BatchError>;
    fn store_content(&mut self, document_id: i64, content: &str) -> Result<(), BatchError>;
}

/// Per-document result of one batch pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    pub document_id: i64,
    pub status: DocumentStatus,
    pub converted: usize,
    pub failed: usize,
    pub skipped: usize,
    pub bytes_saved: u64,
    pub content_changed: bool,
}

/// Aggregate of a whole batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub converted: usize,
    pub failed: usize,
    pub skipped: usize,
    pub updated_documents: usize,
    pub bytes_saved: u64,
    pub reports: Vec<DocumentReport>,
}

/// Run the full pipeline for one document.
///
/// Every unique image URL the document references (primaries and responsive
/// candidates) is attempted once; the document's ledger status is the
/// converted-over-attempted ratio. The rewrite only happens for URLs whose
/// conversion succeeded, so a partially converted document keeps its
/// unconverted references untouched.
pub fn process_document(
    document_id: i64,
    store: &mut dyn DocumentStore,
    converter: &Converter,
    ctx: &SiteContext,
    ledger: &Ledger,
) -> Result<DocumentReport, BatchError> {
    let content = store.load_content(document_id)?;
    let refs = extract_images(&content, ctx);

    let mut attempted: HashSet<String> = HashSet::new();
    let mut mapping: HashMap<String, String> = HashMap::new();
    let mut converted = 0;
    let mut failed = 0;
    let mut skipped = 0;
    let mut bytes_saved = 0u64;

    for reference in &refs {
        for url in std::iter::once(&reference.primary_url).chain(&reference.candidate_urls) {
            if !attempted.insert(url.clone()) {
                continue;
            }
            let Some(path) = ctx.path_for_url(url) else {
                // Internal URL with no file behind it (outside the upload
                // prefix). Nothing to convert.
                skipped += 1;
                continue;
            };
            match converter.convert_image(&path) {
                ConversionOutcome::Success(c) => {
                    converted += 1;
                    bytes_saved += c.bytes_saved();
                    let webp_url = ctx
                        .url_for_path(&c.output_path)
                        .or_else(|| urls::webp_url_for(url));
                    if let Some(webp_url) = webp_url {
                        mapping.insert(url.clone(), webp_url);
                    }
                }
                ConversionOutcome::Skipped(_) => skipped += 1,
                ConversionOutcome::Failed(_) => failed += 1,
            }
        }
    }

    let rewritten = rewrite(&content, &refs, &mapping, ctx);
    let content_changed = rewritten != content;
    if content_changed {
        store.store_content(document_id, &rewritten)?;
    }

    let status = status_for_counts(converted, attempted.len());
    ledger.upsert_status(document_id, status)?;

    Ok(DocumentReport {
        document_id,
        status,
        converted,
        failed,
        skipped,
        bytes_saved,
        content_changed,
    })
}

/// Process documents in order, accumulating a summary. A document whose
/// images fail still completes and the batch continues; only storage and
/// ledger errors abort.
pub fn process_batch(
    document_ids: &[i64],
    store: &mut dyn DocumentStore,
    converter: &Converter,
    ctx: &SiteContext,
    ledger: &Ledger,
) -> Result<BatchSummary, BatchError> {
    let mut summary = BatchSummary::default();
    for &id in document_ids {
        let report = process_document(id, store, converter, ctx, ledger)?;
        summary.converted += report.converted;
        summary.failed += report.failed;
        summary.skipped += report.skipped;
        summary.bytes_saved += report.bytes_saved;
        if report.content_changed {
            summary.updated_documents += 1;
        }
        summary.reports.push(report);
    }
    Ok(summary)
}
