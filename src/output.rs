//! Terminal output formatting for the viewer front end.
//!
//! # Display Contract
//!
//! The front end is a stand-in for a graphical viewer, so what it prints maps
//! one-to-one onto what a GUI would show:
//!
//! ```text
//! Base: http://localhost/nested/
//! Subdirectory 001/002 subdir1        [P] prev  [N] next
//! Image 002/002 s1-b.jpg              [p] prev  [-] next
//!     URL: http://localhost/nested/subdir1/s1-b.jpg
//! ```
//!
//! - A control whose `has_*` flag is false is drawn disabled (`[-]`).
//! - The subdirectory line is omitted entirely when subdirectory mode is off.
//! - When there is nothing to display, the image lines are replaced by the
//!   status message and no controls are drawn.
//!
//! # Listings
//!
//! ```text
//! Images (2)
//! 001 image1.jpg
//! 002 image2.png
//!
//! Subdirectories (1)
//! 001 subdir1/
//! ```
//!
//! # Architecture
//!
//! Each `format_*` function returns `Vec<String>` (or a single line) and is
//! pure; the `print_*` wrappers write to stdout.

use crate::controller::{LoadOutcome, NavOutcome};
use crate::listing::{DirectoryListing, EntryKind, ListingEntry};
use crate::state::View;

/// Commands understood by `browse`, shown by `?`.
pub const HELP_COMMANDS: &str = "\
Commands:
  n / p         : Next / previous image
  home / end    : First / last image
  N / P         : Next / previous subdirectory
  /NAME         : Jump to image NAME
  :NAME         : Jump to subdirectory NAME
  s             : Toggle subdirectory mode (reloads)
  v             : Show the current view again
  ?             : This help
  q             : Quit
";

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `[k] label` when enabled, `[-] label` when not.
fn control(enabled: bool, key: &str, label: &str) -> String {
    if enabled {
        format!("[{key}] {label}")
    } else {
        format!("[-] {label}")
    }
}

fn position_line(kind: &str, position: Option<(usize, usize)>, name: &str) -> String {
    match position {
        Some((pos, total)) => format!(
            "{kind} {}/{} {name}",
            format_index(pos),
            format_index(total)
        ),
        None => format!("{kind} {name}"),
    }
}

/// Pad `left` to a fixed column before appending the controls.
fn with_controls(left: String, controls: [String; 2]) -> String {
    format!("{left:<36}{}  {}", controls[0], controls[1])
}

/// Render the current view.
///
/// `status` is the message of the last load outcome, if any; it replaces the
/// image lines when nothing is displayed.
pub fn format_view(view: &View, status: Option<&str>) -> Vec<String> {
    let mut lines = vec![format!("Base: {}", view.base_url)];

    if view.subdirs_enabled
        && let Some(name) = &view.displayed_subdir_name
    {
        lines.push(with_controls(
            position_line("Subdirectory", view.subdir_position, &format!("{name}/")),
            [
                control(view.has_prev_subdir, "P", "prev"),
                control(view.has_next_subdir, "N", "next"),
            ],
        ));
    }

    match (&view.displayed_filename, &view.displayed_url) {
        (Some(filename), Some(url)) => {
            lines.push(with_controls(
                position_line("Image", view.image_position, filename),
                [
                    control(view.has_prev_image, "p", "prev"),
                    control(view.has_next_image, "n", "next"),
                ],
            ));
            lines.push(format!("{}URL: {}", indent(1), url));
        }
        _ => lines.push(status.unwrap_or("No images found").to_string()),
    }
    lines
}

/// One-line feedback for a navigation request, `None` when the move simply
/// happened.
pub fn format_nav_outcome(outcome: &NavOutcome, target: Option<&str>) -> Option<String> {
    match outcome {
        NavOutcome::Moved | NavOutcome::Load(LoadOutcome::Loaded) => None,
        NavOutcome::AtBoundary => Some("Already at the end of the list".to_string()),
        NavOutcome::NotFound => Some(match target {
            Some(name) => format!("Not found: {name}"),
            None => "Not found".to_string(),
        }),
        NavOutcome::Busy => Some("Still loading, request ignored".to_string()),
        NavOutcome::Unavailable => {
            Some("Not available (no gallery or subdirectory mode off)".to_string())
        }
        NavOutcome::Load(other) => other.message(),
    }
}

/// Numbered images and subdirectories of one listing.
pub fn format_listing(listing: &DirectoryListing) -> Vec<String> {
    if listing.is_empty() {
        return vec!["No images or subdirectories found".to_string()];
    }
    let mut lines = vec![format!("Images ({})", listing.images.len())];
    lines.extend(
        listing
            .images
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{} {}", format_index(i + 1), name)),
    );

    if !listing.subdirectories.is_empty() {
        lines.push(String::new());
        lines.push(format!("Subdirectories ({})", listing.subdirectories.len()));
        lines.extend(
            listing
                .subdirectories
                .iter()
                .enumerate()
                .map(|(i, name)| format!("{} {}/", format_index(i + 1), name)),
        );
    }
    lines
}

/// Every classified anchor, including ignored ones.
pub fn format_entries(entries: &[ListingEntry]) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let kind = match entry.kind {
                EntryKind::Image => "image",
                EntryKind::Directory => "dir",
                EntryKind::Other => "other",
            };
            let name = if entry.name.is_empty() {
                "(no name)"
            } else {
                entry.name.as_str()
            };
            format!("{} {:<5} {}", format_index(i + 1), kind, name)
        })
        .collect()
}

pub fn print_view(view: &View, status: Option<&str>) {
    for line in format_view(view, status) {
        println!("{}", line);
    }
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
