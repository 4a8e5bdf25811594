//! Navigation state for one browsing session.
//!
//! A session has two cursors: which subdirectory is active (only in
//! subdirectory mode) and which image inside the active directory is shown.
//!
//! ```text
//! base_url ── subdirectories: [subdir1, subdir2, subdir3]
//!                                 ▲ current_subdir
//!             current_images:  [a.jpg, b.jpg, c.png]
//!                                        ▲ current_image
//! ```
//!
//! Image moves are synchronous and handled entirely here. Subdirectory moves
//! need the new directory's listing first, so this module only *answers* which
//! subdirectory a move would land on ([`GalleryState::next_subdir`] and
//! friends); the cursor is committed by [`GalleryState::enter_subdir`] once
//! the controller has the listing in hand. A failed fetch therefore never
//! leaves the cursor pointing at images that were not loaded.
//!
//! Everything the UI shows comes from [`GalleryState::view`], recomputed on
//! every call.

use crate::listing::DirectoryListing;
use crate::urls::resolve_image_url;
use reqwest::Url;
use serde::Serialize;

/// Result of a synchronous cursor move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved,
    /// Already at the edge (or nothing to move over); state unchanged.
    AtBoundary,
    /// Seek target does not exist; state unchanged.
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryState {
    base_url: Url,
    subdirs_enabled: bool,
    subdirectories: Vec<String>,
    current_subdir: Option<usize>,
    current_images: Vec<String>,
    current_image: Option<usize>,
}

impl GalleryState {
    /// Start a session from the base directory's listing.
    ///
    /// In subdirectory mode the image list stays empty until the first
    /// subdirectory is entered. When subdirectory mode finds no
    /// subdirectories at all, the base directory's own images are used.
    pub fn load_base(base_url: Url, listing: DirectoryListing, subdirs_enabled: bool) -> Self {
        let subdirectories = if subdirs_enabled {
            listing.subdirectories
        } else {
            Vec::new()
        };
        let current_subdir = if subdirectories.is_empty() {
            None
        } else {
            Some(0)
        };
        let current_images = if current_subdir.is_some() {
            Vec::new()
        } else {
            listing.images
        };
        let current_image = first_index(&current_images);

        Self {
            base_url,
            subdirs_enabled,
            subdirectories,
            current_subdir,
            current_images,
            current_image,
        }
    }

    /// Replace the image list with a freshly fetched directory's images.
    pub fn load_subdir_images(&mut self, listing: DirectoryListing) {
        self.current_images = listing.images;
        self.current_image = first_index(&self.current_images);
    }

    /// Commit a subdirectory move whose listing has been fetched.
    ///
    /// Returns `false` (and changes nothing) for an out-of-range index.
    pub fn enter_subdir(&mut self, index: usize, listing: DirectoryListing) -> bool {
        if index >= self.subdirectories.len() {
            return false;
        }
        self.current_subdir = Some(index);
        self.load_subdir_images(listing);
        true
    }

    // ------------------------------------------------------------------
    // Image cursor
    // ------------------------------------------------------------------

    pub fn next_image(&mut self) -> Step {
        match self.current_image {
            Some(i) if i + 1 < self.current_images.len() => self.move_image(i + 1),
            _ => Step::AtBoundary,
        }
    }

    pub fn prev_image(&mut self) -> Step {
        match self.current_image {
            Some(i) if i > 0 => self.move_image(i - 1),
            _ => Step::AtBoundary,
        }
    }

    pub fn first_image(&mut self) -> Step {
        match self.current_image {
            Some(i) if i > 0 => self.move_image(0),
            _ => Step::AtBoundary,
        }
    }

    pub fn last_image(&mut self) -> Step {
        let last = self.current_images.len().saturating_sub(1);
        match self.current_image {
            Some(i) if i < last => self.move_image(last),
            _ => Step::AtBoundary,
        }
    }

    /// Jump to an image by exact (case-sensitive) filename.
    pub fn seek_image(&mut self, name: &str) -> Step {
        match position(&self.current_images, name) {
            Some(i) => self.move_image(i),
            None => Step::NotFound,
        }
    }

    fn move_image(&mut self, index: usize) -> Step {
        self.current_image = Some(index);
        Step::Moved
    }

    // ------------------------------------------------------------------
    // Subdirectory cursor (queries only; see `enter_subdir`)
    // ------------------------------------------------------------------

    /// Index a "next subdirectory" move would land on, `None` at the end.
    pub fn next_subdir(&self) -> Option<usize> {
        self.current_subdir
            .map(|i| i + 1)
            .filter(|&i| i < self.subdirectories.len())
    }

    /// Index a "previous subdirectory" move would land on, `None` at the start.
    pub fn prev_subdir(&self) -> Option<usize> {
        self.current_subdir.and_then(|i| i.checked_sub(1))
    }

    /// Index of a subdirectory by exact name. Always `None` when subdirectory
    /// mode is off.
    pub fn seek_subdir(&self, name: &str) -> Option<usize> {
        if !self.subdirs_enabled {
            return None;
        }
        position(&self.subdirectories, name)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn subdirs_enabled(&self) -> bool {
        self.subdirs_enabled
    }

    pub fn subdirectories(&self) -> &[String] {
        &self.subdirectories
    }

    pub fn current_subdir(&self) -> Option<usize> {
        self.current_subdir
    }

    pub fn current_images(&self) -> &[String] {
        &self.current_images
    }

    pub fn current_image(&self) -> Option<usize> {
        self.current_image
    }

    pub fn subdir_name(&self, index: usize) -> Option<&str> {
        self.subdirectories.get(index).map(String::as_str)
    }

    pub fn current_subdir_name(&self) -> Option<&str> {
        self.current_subdir.and_then(|i| self.subdir_name(i))
    }

    pub fn current_filename(&self) -> Option<&str> {
        self.current_image
            .and_then(|i| self.current_images.get(i))
            .map(String::as_str)
    }

    /// Derive everything the UI renders from the current cursors.
    pub fn view(&self) -> View {
        let filename = self.current_filename();
        let subdir = self.current_subdir_name();

        View {
            base_url: self.base_url.to_string(),
            subdirs_enabled: self.subdirs_enabled,
            has_prev_image: self.current_image.is_some_and(|i| i > 0),
            has_next_image: self
                .current_image
                .is_some_and(|i| i + 1 < self.current_images.len()),
            has_prev_subdir: self.prev_subdir().is_some(),
            has_next_subdir: self.next_subdir().is_some(),
            displayed_url: filename
                .map(|f| resolve_image_url(&self.base_url, subdir, f).to_string()),
            displayed_filename: filename.map(str::to_string),
            displayed_subdir_name: subdir.map(str::to_string),
            image_position: self
                .current_image
                .map(|i| (i + 1, self.current_images.len())),
            subdir_position: self
                .current_subdir
                .map(|i| (i + 1, self.subdirectories.len())),
        }
    }
}

/// Snapshot of what the UI should show. Prev/next controls are enabled
/// exactly when the matching `has_*` flag is true; subdirectory controls are
/// hidden when `subdirs_enabled` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    pub base_url: String,
    pub subdirs_enabled: bool,
    pub has_prev_image: bool,
    pub has_next_image: bool,
    pub has_prev_subdir: bool,
    pub has_next_subdir: bool,
    pub displayed_url: Option<String>,
    pub displayed_filename: Option<String>,
    pub displayed_subdir_name: Option<String>,
    /// 1-based `(position, total)` within the current image list.
    pub image_position: Option<(usize, usize)>,
    /// 1-based `(position, total)` within the subdirectory list.
    pub subdir_position: Option<(usize, usize)>,
}

fn first_index<T>(items: &[T]) -> Option<usize> {
    if items.is_empty() { None } else { Some(0) }
}

fn position(items: &[String], name: &str) -> Option<usize> {
    items.iter().position(|item| item == name)
}
