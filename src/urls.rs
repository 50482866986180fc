//! Centralized URL conventions for image references.
//!
//! Every component that touches an image URL — scanner, converter, rewriter,
//! ledger accounting — goes through this module so the WebP naming convention
//! is applied uniformly. The convention is **extension replacement**:
//! `photo.jpg → photo.webp`. Mixing this with the append convention
//! (`photo.jpg.webp`) would desynchronize scanner and converter, so the
//! alternate form is deliberately not implemented anywhere.
//!
//! ## Normalization
//!
//! Discovered URLs are normalized before classification and dedup:
//! - query string and fragment are stripped (`a.jpg?v=2#top` → `a.jpg`)
//! - protocol-relative URLs are expanded to https (`//host/a.jpg` → `https://host/a.jpg`)
//! - root-relative paths are expanded against the site base URL
//!   (`/media/a.jpg` → `https://host/media/a.jpg`)

/// Raster extensions eligible for WebP conversion, lowercase.
pub const RASTER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Strip query string and fragment from a URL.
pub fn strip_query_and_fragment(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

/// Normalize a discovered URL against the site base URL.
///
/// `base_url` must be absolute with no trailing slash (`https://example.com`).
pub fn normalize(url: &str, base_url: &str) -> String {
    let url = strip_query_and_fragment(url.trim());
    if let Some(rest) = url.strip_prefix("//") {
        return format!("https://{rest}");
    }
    if url.starts_with('/') {
        return format!("{base_url}{url}");
    }
    url.to_string()
}

/// Extract the host (including port, if any) from an absolute URL.
pub fn host(url: &str) -> Option<&str> {
    let rest = url.split_once("://")?.1;
    let end = rest.find('/').unwrap_or(rest.len());
    Some(&rest[..end])
}

/// The lowercase extension of a URL or path-like string, if any.
fn extension(url: &str) -> Option<String> {
    let name = url.rsplit('/').next()?;
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

/// Whether the URL points at a convertible raster image (JPEG/PNG).
pub fn is_raster(url: &str) -> bool {
    extension(url).is_some_and(|e| RASTER_EXTENSIONS.contains(&e.as_str()))
}

/// Whether the URL already points at a WebP file.
pub fn is_webp(url: &str) -> bool {
    extension(url).is_some_and(|e| e == "webp")
}

/// Derive the WebP URL for a raster URL by replacing the extension.
///
/// Returns `None` for non-raster URLs so callers cannot accidentally derive
/// a destination for an unsupported source.
pub fn webp_url_for(url: &str) -> Option<String> {
    if !is_raster(url) {
        return None;
    }
    let dot = url.rfind('.')?;
    Some(format!("{}.webp", &url[..dot]))
}

/// Candidate pre-conversion URLs for an already-WebP URL.
///
/// Used by the scanner to keep previously-converted images representable:
/// the same path is tested with each raster extension substituted.
pub fn original_candidates(webp_url: &str) -> Vec<String> {
    let Some(dot) = webp_url.rfind('.') else {
        return Vec::new();
    };
    if !is_webp(webp_url) {
        return Vec::new();
    }
    let base = &webp_url[..dot];
    RASTER_EXTENSIONS
        .iter()
        .map(|ext| format!("{base}.{ext}"))
        .collect()
}
