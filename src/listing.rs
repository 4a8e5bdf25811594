//! Apache `mod_autoindex` page interpreter.
//!
//! An autoindex page is a plain HTML document whose interesting content is a
//! list of anchors, one per directory entry, wrapped in whatever chrome the
//! server's `IndexOptions` produce (`<pre>`, `<table>`, `<ul>`, fancy or not):
//!
//! ```text
//! <title>Index of /photos</title>
//! <h1>Index of /photos</h1>
//! <a href="?C=N;O=D">Name</a> <a href="?C=M;O=A">Last modified</a> ...
//! <a href="/">Parent Directory</a>
//! <a href="2024/">2024/</a>
//! <a href="dawn.jpg">dawn.jpg</a>
//! ```
//!
//! Only the anchor targets matter. Each one is classified by its suffix into
//! an [`EntryKind`]; sort-bar links, parent links and self links come out as
//! [`EntryKind::Other`] and never reach the state machine.
//!
//! This is deliberately not an HTML parser. Unclosed tags, stray markup and
//! truncated documents are all fine: whatever anchors can be found are used,
//! and a page without any yields an empty listing.

use crate::urls::{basename, percent_decode};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("input is binary data, not an HTML document")]
    Binary,
}

/// Extensions recognized as images when no config overrides them.
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\shref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("valid href regex")
});

static INDEX_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(?:title|h1)[^>]*>\s*Index of\s+([^<]*?)\s*</(?:title|h1)>")
        .expect("valid title regex")
});

/// Classification of a single anchor target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Image,
    Directory,
    Other,
}

/// One anchor from an index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingEntry {
    /// Decoded basename of the href (empty for query-only links).
    pub name: String,
    pub kind: EntryKind,
}

/// Images and subdirectories found on one index page, in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryListing {
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subdirectories: Vec<String>,
}

impl DirectoryListing {
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.subdirectories.is_empty()
    }
}

/// Index page interpreter configured with the set of image extensions.
#[derive(Debug, Clone)]
pub struct IndexParser {
    /// Lowercase extensions without the leading dot.
    extensions: Vec<String>,
    directories: bool,
}

impl Default for IndexParser {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_EXTENSIONS.iter().copied())
    }
}

impl IndexParser {
    /// Build a parser recognizing the given extensions (case-insensitive, a
    /// leading dot is tolerated). Directory collection starts disabled.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self {
            extensions,
            directories: false,
        }
    }

    /// Whether [`parse`](Self::parse) collects subdirectories.
    pub fn with_directories(mut self, enabled: bool) -> Self {
        self.directories = enabled;
        self
    }

    /// Parse an index page into its images and (optionally) subdirectories.
    ///
    /// Source order is preserved and duplicates keep their first occurrence.
    /// Fails only for input that cannot be HTML at all.
    pub fn parse(&self, html: &str) -> Result<DirectoryListing, ParseError> {
        Ok(self.collect(self.classify_all(html, None)?))
    }

    /// Like [`parse`](Self::parse) for a page fetched from `page_path`.
    ///
    /// The path stands in for the page's own directory when the document has
    /// no `Index of` header, so absolute parent and self links are still
    /// recognized.
    pub fn parse_at(&self, html: &str, page_path: &str) -> Result<DirectoryListing, ParseError> {
        Ok(self.collect(self.classify_all(html, Some(page_path))?))
    }

    fn collect(&self, entries: Vec<ListingEntry>) -> DirectoryListing {
        let mut listing = DirectoryListing::default();
        let mut seen_images = HashSet::new();
        let mut seen_dirs = HashSet::new();
        for entry in entries {
            match entry.kind {
                EntryKind::Image => {
                    if seen_images.insert(entry.name.clone()) {
                        listing.images.push(entry.name);
                    }
                }
                EntryKind::Directory if self.directories => {
                    if seen_dirs.insert(entry.name.clone()) {
                        listing.subdirectories.push(entry.name);
                    }
                }
                EntryKind::Directory | EntryKind::Other => {}
            }
        }

        log::debug!(
            "parsed index page: {} images, {} subdirectories",
            listing.images.len(),
            listing.subdirectories.len()
        );
        listing
    }

    /// Every anchor on the page, classified, including `Other` entries.
    pub fn entries(&self, html: &str) -> Result<Vec<ListingEntry>, ParseError> {
        self.classify_all(html, None)
    }

    /// Like [`entries`](Self::entries) for a page fetched from `page_path`.
    pub fn entries_at(&self, html: &str, page_path: &str) -> Result<Vec<ListingEntry>, ParseError> {
        self.classify_all(html, Some(page_path))
    }

    fn classify_all(
        &self,
        html: &str,
        page_path: Option<&str>,
    ) -> Result<Vec<ListingEntry>, ParseError> {
        if html.contains('\0') {
            return Err(ParseError::Binary);
        }

        let html = COMMENT_RE.replace_all(html, "");
        let own_dir = own_directory(&html).or_else(|| page_path.map(directory_path));

        let entries = HREF_RE
            .captures_iter(&html)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
            .map(|m| self.classify(&decode_entities(m.as_str()), own_dir.as_deref()))
            .collect();
        Ok(entries)
    }

    /// Classify a single (entity-decoded) href.
    fn classify(&self, href: &str, own_dir: Option<&str>) -> ListingEntry {
        let other = |name: &str| ListingEntry {
            name: name.to_string(),
            kind: EntryKind::Other,
        };

        // Sort bar links are query-only; `#top` style anchors are fragment-only.
        let path = href
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();
        if path.is_empty() {
            return other("");
        }

        let decoded = percent_decode(path);
        let name = basename(&decoded).to_string();

        if decoded.ends_with('/') {
            if is_child_directory(&decoded, own_dir) {
                return ListingEntry {
                    name,
                    kind: EntryKind::Directory,
                };
            }
            return other(&name);
        }

        if self.is_image_name(&name) {
            ListingEntry {
                name,
                kind: EntryKind::Image,
            }
        } else {
            other(&name)
        }
    }

    fn is_image_name(&self, name: &str) -> bool {
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            }
            _ => false,
        }
    }
}

/// Whether a directory href (ending in `/`) names a child of this page.
fn is_child_directory(path: &str, own_dir: Option<&str>) -> bool {
    let name = basename(path);
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }
    if path.split('/').any(|seg| seg == "..") {
        return false;
    }

    let absolute_path = if let Some(rest) = path.split_once("://").map(|(_, r)| r) {
        // scheme://host/path/ → /path/
        Some(rest.find('/').map(|i| &rest[i..]).unwrap_or("/"))
    } else if path.starts_with('/') {
        Some(path)
    } else {
        None
    };

    match (absolute_path, own_dir) {
        (Some(abs), Some(own)) => abs == format!("{own}{name}/"),
        // Without a known location an absolute link may well be the parent.
        (Some(_), None) => false,
        (None, _) => true,
    }
}

/// The directory an index page describes, from its `Index of /x` header,
/// normalized to start and end with `/`.
fn own_directory(html: &str) -> Option<String> {
    let caps = INDEX_TITLE_RE.captures(html)?;
    Some(directory_path(&decode_entities(caps.get(1)?.as_str().trim())))
}

/// Normalize a (possibly percent-encoded) path to a decoded `/dir/` form.
fn directory_path(path: &str) -> String {
    let raw = percent_decode(path);
    let mut dir = if raw.starts_with('/') {
        raw
    } else {
        format!("/{raw}")
    };
    if !dir.ends_with('/') {
        dir.push('/');
    }
    dir
}

/// Decode the handful of entities Apache emits inside attribute values.
fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}
