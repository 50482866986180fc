//! Structured-content traversal: pull image URLs out of block trees.
//!
//! Some document stores keep content as a tree of typed blocks with JSON
//! attribute bags rather than flat markup. Rather than special-case known
//! block types, the walk is generic: every string-valued attribute anywhere
//! in the tree is checked for a raster image URL, depth-first, so new block
//! types need no code changes here.

use super::scanner::{ImageReference, ReferenceKind};
use crate::site::SiteContext;
use crate::urls;
use serde::Deserialize;
use std::collections::HashSet;

/// One node of a structured-content tree.
#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    /// Type identifier, e.g. `core/image`. Informational only; the walk does
    /// not dispatch on it.
    #[serde(default)]
    pub block_type: String,
    /// Arbitrary JSON attribute bag. String leaves are probed for URLs.
    #[serde(default)]
    pub attributes: serde_json::Value,
    #[serde(default)]
    pub children: Vec<Block>,
}

/// Collect raster image URLs from a block tree, depth-first, attributes
/// before children, de-duplicated in first-seen order.
pub fn collect_image_urls(blocks: &[Block], ctx: &SiteContext) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();
    for block in blocks {
        walk(block, ctx, &mut seen, &mut found);
    }
    found
}

/// Adapt block-tree URLs into scanner references so the conversion pipeline
/// treats structured content and flat markup uniformly. The fragment is the
/// raw URL itself: block content is rewritten attribute-by-attribute, not by
/// markup wrapping.
pub fn extract_from_blocks(blocks: &[Block], ctx: &SiteContext) -> Vec<ImageReference> {
    collect_image_urls(blocks, ctx)
        .into_iter()
        .map(|url| ImageReference {
            primary_url: url.clone(),
            candidate_urls: Vec::new(),
            fragment: url,
            kind: ReferenceKind::Shortcode,
        })
        .collect()
}

fn walk(block: &Block, ctx: &SiteContext, seen: &mut HashSet<String>, found: &mut Vec<String>) {
    probe_value(&block.attributes, ctx, seen, found);
    for child in &block.children {
        walk(child, ctx, seen, found);
    }
}

fn probe_value(
    value: &serde_json::Value,
    ctx: &SiteContext,
    seen: &mut HashSet<String>,
    found: &mut Vec<String>,
) {
    match value {
        serde_json::Value::String(s) => {
            let normalized = urls::normalize(s, ctx.base_url());
            if ctx.is_internal(&normalized)
                && urls::is_raster(&normalized)
                && seen.insert(normalized.clone())
            {
                found.push(normalized);
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                probe_value(item, ctx, seen, found);
            }
        }
        serde_json::Value::Object(map) => {
            for item in map.values() {
                probe_value(item, ctx, seen, found);
            }
        }
        _ => {}
    }
}
