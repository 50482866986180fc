//! Content scanning: discover image references in document text.
//!
//! [`extract_images`] is a pure function of `(content, site context)` — no
//! hidden state, restartable, same input same output. It pulls references
//! from three sources, in order, accumulating and de-duplicating by primary
//! URL:
//!
//! 1. `<img>`-style tags with a `src` attribute (plus `srcset` candidates)
//! 2. inline `background-image: url(...)` declarations
//! 3. bracket shortcodes carrying a `url=` parameter
//!
//! URLs are normalized (query/fragment stripped, protocol-relative and
//! root-relative forms expanded) before classification; only references on
//! the site's own host survive. References that already point at WebP are
//! excluded, but the scanner tries to recover the pre-conversion original by
//! probing sibling `.jpg/.jpeg/.png` files on disk, so previously-converted
//! images stay representable for status accounting.

use crate::site::SiteContext;
use crate::urls;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img\b[^>]*>").unwrap());
pub(crate) static SRC_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bsrc\s*=\s*["']([^"']+)["']"#).unwrap());
pub(crate) static SRCSET_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bsrcset\s*=\s*["']([^"']+)["']"#).unwrap());
static BG_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)background-image\s*:\s*url\(\s*['"]?([^'")]+)['"]?\s*\)"#).unwrap()
});
static SHORTCODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[[\w-]+\b[^\]]*?\burl\s*=\s*["']?([^"'\s\]]+)["']?[^\]]*\]"#).unwrap()
});

/// Where a reference was extracted from. Tag references get the dual-source
/// fallback treatment on rewrite; the others are substituted in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Tag,
    Style,
    Shortcode,
}

/// One discovered image reference. Created fresh per scan, immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Normalized main URL. Never a WebP URL: already-converted references
    /// are recovered to their original or dropped.
    pub primary_url: String,
    /// Normalized responsive candidates, in srcset order. May be empty.
    pub candidate_urls: Vec<String>,
    /// The exact content substring this reference came from, used for
    /// precise rewriting.
    pub fragment: String,
    pub kind: ReferenceKind,
}

/// Extract all internal image references from document content.
pub fn extract_images(content: &str, ctx: &SiteContext) -> Vec<ImageReference> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut refs = Vec::new();

    for tag in IMG_TAG.find_iter(content) {
        let fragment = tag.as_str();
        let Some(src) = SRC_ATTR.captures(fragment).map(|c| c[1].to_string()) else {
            continue;
        };
        let Some(primary) = resolve_primary(&src, ctx) else {
            continue;
        };

        let candidates = SRCSET_ATTR
            .captures(fragment)
            .map(|c| parse_srcset_urls(&c[1], ctx))
            .unwrap_or_default();

        push_unique(
            &mut refs,
            &mut seen,
            ImageReference {
                primary_url: primary,
                candidate_urls: candidates,
                fragment: fragment.to_string(),
                kind: ReferenceKind::Tag,
            },
        );
    }

    for caps in BG_IMAGE.captures_iter(content) {
        let Some(primary) = resolve_primary(&caps[1], ctx) else {
            continue;
        };
        push_unique(
            &mut refs,
            &mut seen,
            ImageReference {
                primary_url: primary,
                candidate_urls: Vec::new(),
                fragment: caps[0].to_string(),
                kind: ReferenceKind::Style,
            },
        );
    }

    for caps in SHORTCODE.captures_iter(content) {
        let Some(primary) = resolve_primary(&caps[1], ctx) else {
            continue;
        };
        push_unique(
            &mut refs,
            &mut seen,
            ImageReference {
                primary_url: primary,
                candidate_urls: Vec::new(),
                fragment: caps[0].to_string(),
                kind: ReferenceKind::Shortcode,
            },
        );
    }

    refs
}

/// Normalize, classify, and (for WebP URLs) recover the original. Returns
/// `None` when the reference is external, non-raster, or unrecoverable.
fn resolve_primary(raw: &str, ctx: &SiteContext) -> Option<String> {
    let normalized = urls::normalize(raw, ctx.base_url());
    if !ctx.is_internal(&normalized) {
        return None;
    }
    if urls::is_webp(&normalized) {
        return recover_original(&normalized, ctx);
    }
    if !urls::is_raster(&normalized) {
        return None;
    }
    Some(normalized)
}

/// Probe `.jpg/.jpeg/.png` siblings of a WebP URL on disk.
fn recover_original(webp_url: &str, ctx: &SiteContext) -> Option<String> {
    urls::original_candidates(webp_url).into_iter().find(|c| {
        ctx.path_for_url(c)
            .is_some_and(|p| p.exists())
    })
}

/// Parse a srcset attribute value into normalized internal candidate URLs.
///
/// Entries are comma-separated `url descriptor` pairs; only the URL token is
/// kept. Order is preserved. Candidates go through the same resolution as
/// primaries, so already-WebP entries in a rewritten srcset are recovered to
/// their originals instead of vanishing from the reference.
fn parse_srcset_urls(srcset: &str, ctx: &SiteContext) -> Vec<String> {
    srcset
        .split(',')
        .filter_map(|entry| entry.split_whitespace().next())
        .filter_map(|u| resolve_primary(u, ctx))
        .collect()
}

fn push_unique(
    refs: &mut Vec<ImageReference>,
    seen: &mut HashSet<String>,
    reference: ImageReference,
) {
    if seen.insert(reference.primary_url.clone()) {
        refs.push(reference);
    }
}
