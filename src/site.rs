//! Site context: the URL ↔ filesystem mapping the engine runs against.
//!
//! The core never guesses where a document's images live. The hosting
//! environment supplies a [`SiteContext`] describing the site's base URL, the
//! public URL prefix under which uploaded media is served, and the filesystem
//! directory backing that prefix. Everything the scanner classifies as
//! "internal" and everything the batch driver resolves to a path goes through
//! this one mapping.

use crate::urls;
use std::path::{Path, PathBuf};

/// URL ↔ path mapping for one site.
#[derive(Debug, Clone)]
pub struct SiteContext {
    base_url: String,
    upload_url_path: String,
    upload_dir: PathBuf,
}

impl SiteContext {
    /// Create a context. Trailing slashes on `base_url` and `upload_url_path`
    /// are trimmed; `upload_url_path` gains a leading slash if missing.
    pub fn new(base_url: &str, upload_url_path: &str, upload_dir: &Path) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let mut upload_url_path = upload_url_path.trim_end_matches('/').to_string();
        if !upload_url_path.starts_with('/') {
            upload_url_path.insert(0, '/');
        }
        Self {
            base_url,
            upload_url_path,
            upload_dir: upload_dir.to_path_buf(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The site's host, e.g. `example.com`.
    pub fn site_host(&self) -> &str {
        urls::host(&self.base_url).unwrap_or(&self.base_url)
    }

    /// Whether a normalized URL belongs to this site: the host matches and
    /// the path falls under the upload prefix or the site root.
    pub fn is_internal(&self, url: &str) -> bool {
        match urls::host(url) {
            Some(h) => h == self.site_host(),
            None => false,
        }
    }

    /// Resolve a normalized URL to a filesystem path.
    ///
    /// Only URLs under the upload prefix resolve; anything else returns
    /// `None` — internal pages, external hosts, and generated assets have no
    /// convertible file behind them.
    pub fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        if !self.is_internal(url) {
            return None;
        }
        let upload_base = format!("{}{}/", self.base_url, self.upload_url_path);
        let relative = url.strip_prefix(&upload_base)?;
        if relative.is_empty() || relative.contains("..") {
            return None;
        }
        Some(self.upload_dir.join(relative))
    }

    /// Inverse of [`path_for_url`](Self::path_for_url): the public URL for a
    /// file under the upload directory.
    pub fn url_for_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.upload_dir).ok()?;
        let mut url = format!("{}{}", self.base_url, self.upload_url_path);
        for component in relative.components() {
            url.push('/');
            url.push_str(&component.as_os_str().to_string_lossy());
        }
        Some(url)
    }
}
