//! Shared test utilities for the autoindex-viewer test suite.
//!
//! Provides Apache-style page builders, listing shorthands and an in-memory
//! [`MockTransport`] serving a small fake site.
//!
//! # Usage
//!
//! ```text
//! use crate::test_helpers::*;
//!
//! let html = apache_index("/mock-images", &["image1.jpg", "sub/"]);
//! let mut c = GalleryController::new(mock_site(), IndexParser::default());
//! c.submit("http://localhost/mock-images/", false);
//! assert_eq!(c.transport().requests(), vec!["http://localhost/mock-images/"]);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use crate::listing::DirectoryListing;
use crate::transport::{NetworkError, Transport};
use reqwest::Url;

// =========================================================================
// Page builders
// =========================================================================

/// Render an index page the way `mod_autoindex` does with `FancyIndexing`:
/// title, sort bar, absolute parent link, then one row per entry.
pub fn apache_index(dir: &str, entries: &[&str]) -> String {
    let dir = dir.trim_end_matches('/');
    let parent = match dir.rfind('/') {
        Some(pos) => &dir[..=pos],
        None => "/",
    };

    let mut html = format!(
        "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 3.2 Final//EN\">\n\
         <html>\n <head>\n  <title>Index of {dir}</title>\n </head>\n <body>\n\
         <h1>Index of {dir}</h1>\n\
         <pre><img src=\"/icons/blank.gif\" alt=\"Icon \"> \
         <a href=\"?C=N;O=D\">Name</a>                    \
         <a href=\"?C=M;O=A\">Last modified</a>      \
         <a href=\"?C=S;O=A\">Size</a>  \
         <a href=\"?C=D;O=A\">Description</a><hr>\
         <img src=\"/icons/back.gif\" alt=\"[PARENTDIR]\"> \
         <a href=\"{parent}\">Parent Directory</a>                             -   \n"
    );
    for entry in entries {
        let icon = if entry.ends_with('/') { "folder" } else { "image2" };
        html.push_str(&format!(
            "<img src=\"/icons/{icon}.gif\" alt=\"[   ]\"> \
             <a href=\"{entry}\">{entry}</a>     2024-05-01 10:00  1.2M  \n"
        ));
    }
    html.push_str("<hr></pre>\n</body></html>\n");
    html
}

/// Bare anchors, one per href, with no Apache chrome at all.
pub fn anchors(hrefs: &[String]) -> String {
    hrefs
        .iter()
        .map(|h| format!("<a href=\"{h}\">{h}</a>\n"))
        .collect()
}

pub fn listing(images: &[&str], subdirectories: &[&str]) -> DirectoryListing {
    DirectoryListing {
        images: images.iter().map(|s| s.to_string()).collect(),
        subdirectories: subdirectories.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn base_url() -> Url {
    Url::parse("http://localhost/mock-images/").unwrap()
}

// =========================================================================
// Mock transport
// =========================================================================

/// In-memory transport: known URLs return their page, everything else 404s.
/// Every requested URL is recorded in order.
#[derive(Debug, Default)]
pub struct MockTransport {
    pages: HashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl MockTransport {
    pub fn with_page(mut self, url: &str, html: String) -> Self {
        self.pages.insert(url.to_string(), html);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Transport for MockTransport {
    fn fetch_text(&self, url: &str) -> Result<String, NetworkError> {
        self.requests.borrow_mut().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| NetworkError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// The fake site used across controller tests.
///
/// ```text
/// /mock-images/      image1.jpg image2.png
/// /mock-no-images/   readme.txt
/// /nested/           top.jpg subdir1/ subdir2/
///   subdir1/         s1-a.jpg s1-b.jpg
///   subdir2/         s2-a.jpg
/// /empty-nested/     empty/ (no images)
/// /broken-nested/    missing/ (404)
/// /half-broken/      ok/ gone/ (404)
/// /binary/           NUL bytes
/// ```
pub fn mock_site() -> MockTransport {
    let h = "http://localhost";
    MockTransport::default()
        .with_page(
            &format!("{h}/mock-images/"),
            apache_index("/mock-images", &["image1.jpg", "image2.png"]),
        )
        .with_page(
            &format!("{h}/mock-no-images/"),
            apache_index("/mock-no-images", &["readme.txt"]),
        )
        .with_page(
            &format!("{h}/nested/"),
            apache_index("/nested", &["top.jpg", "subdir1/", "subdir2/"]),
        )
        .with_page(
            &format!("{h}/nested/subdir1/"),
            apache_index("/nested/subdir1", &["s1-a.jpg", "s1-b.jpg"]),
        )
        .with_page(
            &format!("{h}/nested/subdir2/"),
            apache_index("/nested/subdir2", &["s2-a.jpg"]),
        )
        .with_page(
            &format!("{h}/empty-nested/"),
            apache_index("/empty-nested", &["empty/"]),
        )
        .with_page(
            &format!("{h}/empty-nested/empty/"),
            apache_index("/empty-nested/empty", &["notes.txt"]),
        )
        .with_page(
            &format!("{h}/broken-nested/"),
            apache_index("/broken-nested", &["missing/"]),
        )
        .with_page(
            &format!("{h}/half-broken/"),
            apache_index("/half-broken", &["ok/", "gone/"]),
        )
        .with_page(
            &format!("{h}/half-broken/ok/"),
            apache_index("/half-broken/ok", &["ok-a.jpg", "ok-b.jpg"]),
        )
        .with_page(&format!("{h}/binary/"), "\u{89}PNG\r\n\u{1a}\n\0\0\0".to_string())
}

/// The page [`mock_site`] serves at `url`. Panics if there is none.
pub fn page(url: &str) -> String {
    mock_site()
        .fetch_text(url)
        .unwrap_or_else(|e| panic!("mock site has no page at {url}: {e}"))
}
