//! URL handling shared by the parser, the state machine and the controller.
//!
//! Every listing the viewer fetches hangs off a single *base URL*: the
//! directory the user submitted. Subdirectory listings and image URLs are
//! derived from it by appending path segments:
//!
//! ```text
//! http://host/photos/                       ← base (trailing slash enforced)
//! http://host/photos/2024%20trip/           ← subdirectory listing
//! http://host/photos/2024%20trip/dawn.jpg   ← displayed image
//! ```
//!
//! Names come out of the parser already percent-decoded, so they are pushed as
//! path segments (which re-encodes them) rather than string-concatenated. That
//! keeps names like `a#b.jpg` or `50% off.png` pointing at the right file and
//! never produces double slashes.

use percent_encoding::percent_decode_str;
use reqwest::Url;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("invalid URL '{0}': {1}")]
    Invalid(String, String),
    #[error("unsupported URL scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),
}

/// Normalize a user-submitted base URL.
///
/// - Surrounding whitespace is trimmed.
/// - Only `http` and `https` are accepted.
/// - Query and fragment are dropped; autoindex sort parameters are not part
///   of the directory identity.
/// - The path always ends with `/`.
pub fn normalize_base_url(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    let mut url =
        Url::parse(trimmed).map_err(|e| UrlError::Invalid(trimmed.to_string(), e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::UnsupportedScheme(url.scheme().to_string()));
    }

    url.set_query(None);
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// URL of a subdirectory's own index page: `base + name + "/"`.
pub fn subdir_url(base: &Url, subdir: &str) -> Url {
    join_segments(base, &[subdir, ""])
}

/// URL of a displayed image: `base + (subdir + "/")? + filename`.
pub fn resolve_image_url(base: &Url, subdir: Option<&str>, filename: &str) -> Url {
    match subdir {
        Some(dir) => join_segments(base, &[dir, filename]),
        None => join_segments(base, &[filename]),
    }
}

fn join_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    // http(s) URLs always have a hierarchical path, so this cannot fail for a
    // base produced by `normalize_base_url`.
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty();
        path.extend(segments);
    }
    url
}

/// Final path segment of an href, ignoring a trailing slash.
///
/// `"/a/b/c.jpg"` → `"c.jpg"`, `"sub/dir/"` → `"dir"`, `"x.png"` → `"x.png"`.
pub fn basename(path: &str) -> &str {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    match trimmed.rfind('/') {
        Some(pos) => &trimmed[pos + 1..],
        None => trimmed,
    }
}

/// Decode `%XX` escapes. Malformed escapes are kept literally and invalid
/// UTF-8 is replaced, so decoding never fails.
pub fn percent_decode(input: &str) -> String {
    percent_decode_str(input).decode_utf8_lossy().into_owned()
}
