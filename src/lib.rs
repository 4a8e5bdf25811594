//! # Autoindex Viewer
//!
//! Browse the images exposed by an Apache `mod_autoindex` "Index of /" page,
//! one at a time, with next/previous controls. Optionally the viewer treats
//! each subdirectory of the base listing as a gallery of its own.
//!
//! # Architecture: Fetch → Parse → State → View
//!
//! ```text
//! URL ──► Transport ──► IndexParser ──► GalleryState ──► View ──► UI
//!          (HTTP)        (listing)      (cursors)        (flags)
//!                 ▲                                        │
//!                 └──────── GalleryController ◄────────────┘
//!                            (requests, tickets)
//! ```
//!
//! The UI never touches the state directly. It sends requests to the
//! [`controller::GalleryController`] and re-reads the [`state::View`] after
//! every transition; the view carries everything a front end needs to enable
//! or disable its buttons.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`listing`] | `IndexParser`: autoindex HTML → image names and subdirectory names |
//! | [`state`] | `GalleryState`: the two-level cursor and its derived `View` |
//! | [`controller`] | Orchestrates fetches with tokens; the only mutator of state |
//! | [`transport`] | `Transport` trait and the blocking `reqwest` implementation |
//! | [`urls`] | Base URL normalization, image URL resolution, name decoding |
//! | [`config`] | `config.toml` loading, stock defaults, validation |
//! | [`output`] | Terminal formatting of views, listings and outcomes |
//!
//! # Design Decisions
//!
//! ## Parsing Without a DOM
//!
//! Autoindex pages are generated by one well-known module and are simple: a
//! table or `<pre>` of anchors. The parser reads `href` attributes with a
//! regex instead of building a DOM, and decides what each anchor is from the
//! href alone. Column-sort links, the parent link, absolute links elsewhere on
//! the server and external links all fall out as "other".
//!
//! ## Explicit Fetch Tickets
//!
//! Every listing fetch is represented by a `FetchTicket` carrying a
//! monotonically increasing token. Only the latest token is honoured, so a
//! slow response from an abandoned session can never overwrite a newer one.
//! The synchronous `submit`/`request_*` methods use the same path internally.
//!
//! ## Failures Are Outcomes
//!
//! Network errors, empty listings and missed seeks come back as values
//! (`LoadOutcome`, `NavOutcome`) rather than errors: each one has a defined
//! effect on the state and a message for the user.

pub mod config;
pub mod controller;
pub mod listing;
pub mod output;
pub mod state;
pub mod transport;
pub mod urls;

#[cfg(test)]
pub(crate) mod test_helpers;
