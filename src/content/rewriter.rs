//! Content rewriting: substitute converted URLs while keeping fallbacks.
//!
//! [`rewrite`] is pure string substitution keyed by the scanner's exact
//! markup fragments — no DOM round trip, so whatever the author wrote
//! survives byte-for-byte outside the touched fragments. A URL appearing
//! identically in two places is rewritten in both; dedup upstream already
//! collapsed references to one canonical URL each.
//!
//! Tag references get a dual-source construct so non-WebP-capable consumers
//! still render:
//!
//! ```text
//! <picture><source type="image/webp" srcset="a.webp"><img src="a.jpg"></picture>
//! ```
//!
//! The original tag is kept verbatim as the fallback. Style and shortcode
//! references have no such construct, so they are substituted in place.
//! Re-running with an already-applied mapping is a no-op: occurrences that
//! already sit inside their exact dual-source construct are left alone.

use super::scanner::{ImageReference, ReferenceKind, SRC_ATTR, SRCSET_ATTR};
use crate::site::SiteContext;
use crate::urls;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Raw raster URL tokens inside a fragment (src values, srcset entries,
/// url() arguments). Raw forms are matched so root-relative references keep
/// their shape after substitution.
static RASTER_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)[^\s"'(),]+\.(?:jpe?g|png)"#).unwrap());

/// Apply a URL mapping to scanned content, producing rewritten content.
///
/// `mapping` is keyed by normalized original URL (the scanner's
/// `primary_url`/`candidate_urls`), valued by the converted WebP URL.
pub fn rewrite(
    content: &str,
    refs: &[ImageReference],
    mapping: &HashMap<String, String>,
    ctx: &SiteContext,
) -> String {
    let mut result = content.to_string();

    for reference in refs {
        if !mapping.contains_key(&reference.primary_url) {
            continue;
        }
        let rewritten = rewrite_fragment(&reference.fragment, mapping, ctx);
        if rewritten == reference.fragment {
            // Recovered-original references: the fragment already points at
            // WebP, nothing to substitute.
            continue;
        }

        match reference.kind {
            ReferenceKind::Tag => {
                let srcset = webp_srcset(&rewritten, &reference.primary_url, mapping);
                let prefix = format!(r#"<picture><source type="image/webp" srcset="{srcset}">"#);
                result = wrap_occurrences(&result, &reference.fragment, &prefix);
            }
            ReferenceKind::Style | ReferenceKind::Shortcode => {
                result = result.replace(&reference.fragment, &rewritten);
            }
        }
    }

    result
}

/// Replace every mapped raster URL inside a fragment with its WebP form,
/// preserving the raw (possibly relative) spelling and srcset descriptors.
fn rewrite_fragment(
    fragment: &str,
    mapping: &HashMap<String, String>,
    ctx: &SiteContext,
) -> String {
    RASTER_URL
        .replace_all(fragment, |caps: &regex::Captures<'_>| {
            let raw = &caps[0];
            let normalized = urls::normalize(raw, ctx.base_url());
            if mapping.contains_key(&normalized) {
                urls::webp_url_for(raw).unwrap_or_else(|| raw.to_string())
            } else {
                raw.to_string()
            }
        })
        .into_owned()
}

/// The srcset value for the preferred-format `<source>`: the rewritten
/// srcset when the tag has one (descriptors intact), else the rewritten
/// src, else the mapped primary.
fn webp_srcset(
    rewritten_fragment: &str,
    primary_url: &str,
    mapping: &HashMap<String, String>,
) -> String {
    if let Some(caps) = SRCSET_ATTR.captures(rewritten_fragment) {
        return caps[1].to_string();
    }
    if let Some(caps) = SRC_ATTR.captures(rewritten_fragment) {
        return caps[1].to_string();
    }
    mapping.get(primary_url).cloned().unwrap_or_default()
}

/// Wrap each occurrence of `fragment` in `prefix … </picture>`, skipping
/// occurrences already inside that exact construct.
fn wrap_occurrences(content: &str, fragment: &str, prefix: &str) -> String {
    const SUFFIX: &str = "</picture>";
    let mut out = String::with_capacity(content.len() + prefix.len() + SUFFIX.len());
    let mut cursor = 0;

    while let Some(pos) = content[cursor..].find(fragment) {
        let start = cursor + pos;
        let end = start + fragment.len();
        out.push_str(&content[cursor..start]);

        let already_wrapped =
            content[..start].ends_with(prefix) && content[end..].starts_with(SUFFIX);
        if already_wrapped {
            out.push_str(fragment);
        } else {
            out.push_str(prefix);
            out.push_str(fragment);
            out.push_str(SUFFIX);
        }
        cursor = end;
    }
    out.push_str(&content[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::scanner::extract_images;
    use std::path::Path;

    fn ctx() -> SiteContext {
        SiteContext::new("https://example.com", "/media", Path::new("/srv/media"))
    }

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn wraps_img_tag_with_dual_source_and_keeps_fallback() {
        let content = r#"<img src="/media/a.png">"#;
        let ctx = ctx();
        let refs = extract_images(content, &ctx);
        let mapping = map(&[(
            "https://example.com/media/a.png",
            "https://example.com/media/a.webp",
        )]);

        let result = rewrite(content, &refs, &mapping, &ctx);
        assert!(result.contains(r#"<source type="image/webp" srcset="/media/a.webp">"#));
        assert!(
            result.contains(r#"<img src="/media/a.png">"#),
            "original fragment must survive verbatim as fallback"
        );
        assert!(result.starts_with("<picture>"));
        assert!(result.ends_with("</picture>"));
    }

    #[test]
    fn rewrite_is_idempotent() {
        let content = r#"<p>before</p><img src="/media/a.png"><p>after</p>"#;
        let ctx = ctx();
        let refs = extract_images(content, &ctx);
        let mapping = map(&[(
            "https://example.com/media/a.png",
            "https://example.com/media/a.webp",
        )]);

        let once = rewrite(content, &refs, &mapping, &ctx);
        let refs_again = extract_images(&once, &ctx);
        let twice = rewrite(&once, &refs_again, &mapping, &ctx);
        assert_eq!(once, twice, "re-applying a fully applied mapping must be a no-op");
    }

    #[test]
    fn rewrites_srcset_preserving_descriptors() {
        let content =
            r#"<img src="/media/a.jpg" srcset="/media/a-400.jpg 400w, /media/a-800.jpg 800w">"#;
        let ctx = ctx();
        let refs = extract_images(content, &ctx);
        let mapping = map(&[
            (
                "https://example.com/media/a.jpg",
                "https://example.com/media/a.webp",
            ),
            (
                "https://example.com/media/a-400.jpg",
                "https://example.com/media/a-400.webp",
            ),
            (
                "https://example.com/media/a-800.jpg",
                "https://example.com/media/a-800.webp",
            ),
        ]);

        let result = rewrite(content, &refs, &mapping, &ctx);
        assert!(result.contains(r#"srcset="/media/a-400.webp 400w, /media/a-800.webp 800w""#));
        // Fallback keeps the original srcset.
        assert!(result.contains(r#"srcset="/media/a-400.jpg 400w, /media/a-800.jpg 800w""#));
    }

    #[test]
    fn substitutes_style_reference_in_place_without_wrapper() {
        let content = r#"<div style="background-image: url(/media/bg.png)">x</div>"#;
        let ctx = ctx();
        let refs = extract_images(content, &ctx);
        let mapping = map(&[(
            "https://example.com/media/bg.png",
            "https://example.com/media/bg.webp",
        )]);

        let result = rewrite(content, &refs, &mapping, &ctx);
        assert!(result.contains("background-image: url(/media/bg.webp)"));
        assert!(!result.contains("<picture>"));
        assert!(!result.contains("bg.png"));
    }

    #[test]
    fn substitutes_shortcode_url_in_place() {
        let content = r#"[gallery url="/media/shot.jpeg" size=large]"#;
        let ctx = ctx();
        let refs = extract_images(content, &ctx);
        let mapping = map(&[(
            "https://example.com/media/shot.jpeg",
            "https://example.com/media/shot.webp",
        )]);

        let result = rewrite(content, &refs, &mapping, &ctx);
        assert_eq!(result, r#"[gallery url="/media/shot.webp" size=large]"#);
    }

    #[test]
    fn unmapped_references_are_untouched() {
        let content = r#"<img src="/media/a.png"><img src="/media/b.png">"#;
        let ctx = ctx();
        let refs = extract_images(content, &ctx);
        let mapping = map(&[(
            "https://example.com/media/a.png",
            "https://example.com/media/a.webp",
        )]);

        let result = rewrite(content, &refs, &mapping, &ctx);
        assert!(result.contains(r#"<img src="/media/b.png">"#));
        assert!(!result.contains("b.webp"));
    }

    #[test]
    fn same_url_in_two_places_is_rewritten_in_both() {
        let content = r#"<img src="/media/a.png"> ... <img src="/media/a.png">"#;
        let ctx = ctx();
        let refs = extract_images(content, &ctx);
        assert_eq!(refs.len(), 1, "dedup collapses to one reference");
        let mapping = map(&[(
            "https://example.com/media/a.png",
            "https://example.com/media/a.webp",
        )]);

        let result = rewrite(content, &refs, &mapping, &ctx);
        assert_eq!(result.matches("<picture>").count(), 2);
    }

    #[test]
    fn pure_function_same_input_same_output() {
        let content = r#"<img src="/media/a.png">"#;
        let ctx = ctx();
        let refs = extract_images(content, &ctx);
        let mapping = map(&[(
            "https://example.com/media/a.png",
            "https://example.com/media/a.webp",
        )]);

        assert_eq!(
            rewrite(content, &refs, &mapping, &ctx),
            rewrite(content, &refs, &mapping, &ctx)
        );
    }
}
