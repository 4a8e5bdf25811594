//! Session orchestration: fetch, parse, update state, report.
//!
//! The controller owns the single active [`GalleryState`] and is the only
//! thing that mutates it. Transitions that need a directory listing go
//! through a *ticket*:
//!
//! ```text
//! begin_submit / begin_subdir_fetch ──► FetchTicket { token, url }
//!                                             │  (caller or `Transport` fetches url)
//! complete(ticket, Result<html, _>) ◄─────────┘
//!     ├─ Progress::Fetch(next)   another listing is needed (first subdirectory)
//!     ├─ Progress::Done(outcome) state updated (or left alone on error)
//!     └─ Progress::Discarded     token is not the latest one; ignored
//! ```
//!
//! Tokens increase monotonically and only the most recently issued one is
//! accepted, so a slow response can never overwrite a newer session.
//!
//! ## Overlapping requests
//!
//! While a ticket is outstanding the controller is *loading*. Navigation
//! requests arriving in that window are rejected with [`NavOutcome::Busy`];
//! they are not queued. A new [`submit`](GalleryController::submit) is always
//! accepted and supersedes whatever was in flight.
//!
//! The `submit` / `request_*` methods run the whole ticket sequence
//! synchronously through the controller's [`Transport`]. Callers that fetch on
//! their own (an async UI, say) use the `begin_*` / `complete` pair directly.

use crate::listing::{DirectoryListing, IndexParser};
use crate::state::{GalleryState, Step, View};
use crate::transport::{NetworkError, Transport};
use crate::urls::{normalize_base_url, subdir_url};
use reqwest::Url;

/// Outcome of loading a listing that changes what is displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// Fetch and parse succeeded but there are no images to show.
    EmptyNoImages,
    FetchError(NetworkError),
}

impl LoadOutcome {
    /// User-facing status text; `None` when images are showing.
    pub fn message(&self) -> Option<String> {
        match self {
            LoadOutcome::Loaded => None,
            LoadOutcome::EmptyNoImages => Some("No images found".to_string()),
            LoadOutcome::FetchError(e) => Some(format!("Error loading images: {e}")),
        }
    }
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    Moved,
    AtBoundary,
    NotFound,
    /// A fetch is outstanding; the request was dropped.
    Busy,
    /// No session, or subdirectory navigation while subdirectory mode is off.
    Unavailable,
    /// The request fetched a new subdirectory listing.
    Load(LoadOutcome),
}

impl From<Step> for NavOutcome {
    fn from(step: Step) -> Self {
        match step {
            Step::Moved => NavOutcome::Moved,
            Step::AtBoundary => NavOutcome::AtBoundary,
            Step::NotFound => NavOutcome::NotFound,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Purpose {
    Base { base_url: Url, subdirs_enabled: bool },
    FirstSubdir,
    Subdir { index: usize },
}

/// A listing the controller is waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    token: u64,
    url: Url,
    purpose: Purpose,
}

impl FetchTicket {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }
}

/// What [`GalleryController::complete`] did with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Fetch(FetchTicket),
    Done(LoadOutcome),
    Discarded,
}

pub struct GalleryController<T> {
    transport: T,
    parser: IndexParser,
    session: Option<GalleryState>,
    /// Base-level state waiting for its first subdirectory listing.
    staged: Option<GalleryState>,
    /// Last submitted base URL and mode, for re-submission on mode toggle.
    submitted: Option<(Url, bool)>,
    pending: Option<u64>,
    last_token: u64,
}

impl<T: Transport> GalleryController<T> {
    pub fn new(transport: T, parser: IndexParser) -> Self {
        Self {
            transport,
            parser: parser.with_directories(false),
            session: None,
            staged: None,
            submitted: None,
            pending: None,
            last_token: 0,
        }
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    /// Current view, `None` when no session is loaded.
    pub fn view(&self) -> Option<View> {
        self.session.as_ref().map(GalleryState::view)
    }

    pub fn state(&self) -> Option<&GalleryState> {
        self.session.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ------------------------------------------------------------------
    // Synchronous API
    // ------------------------------------------------------------------

    /// Start a new session at `url`, replacing any previous one.
    pub fn submit(&mut self, url: &str, subdirs_enabled: bool) -> LoadOutcome {
        match self.begin_submit(url, subdirs_enabled) {
            Ok(ticket) => self.drive(ticket),
            Err(outcome) => outcome,
        }
    }

    /// Switch subdirectory mode by reloading the last submitted URL.
    ///
    /// Returns `None` if nothing has been submitted yet.
    pub fn set_subdirs_enabled(&mut self, enabled: bool) -> Option<LoadOutcome> {
        let (base_url, _) = self.submitted.clone()?;
        Some(self.submit(base_url.as_str(), enabled))
    }

    pub fn request_next_image(&mut self) -> NavOutcome {
        self.with_image_cursor(GalleryState::next_image)
    }

    pub fn request_prev_image(&mut self) -> NavOutcome {
        self.with_image_cursor(GalleryState::prev_image)
    }

    pub fn request_first_image(&mut self) -> NavOutcome {
        self.with_image_cursor(GalleryState::first_image)
    }

    pub fn request_last_image(&mut self) -> NavOutcome {
        self.with_image_cursor(GalleryState::last_image)
    }

    pub fn request_seek_image(&mut self, name: &str) -> NavOutcome {
        self.with_image_cursor(|state| state.seek_image(name))
    }

    pub fn request_next_subdir(&mut self) -> NavOutcome {
        self.with_subdir_target(|state| state.next_subdir().ok_or(NavOutcome::AtBoundary))
    }

    pub fn request_prev_subdir(&mut self) -> NavOutcome {
        self.with_subdir_target(|state| state.prev_subdir().ok_or(NavOutcome::AtBoundary))
    }

    pub fn request_seek_subdir(&mut self, name: &str) -> NavOutcome {
        self.with_subdir_target(|state| state.seek_subdir(name).ok_or(NavOutcome::NotFound))
    }

    fn with_image_cursor(&mut self, step: impl FnOnce(&mut GalleryState) -> Step) -> NavOutcome {
        if self.is_loading() {
            return NavOutcome::Busy;
        }
        match self.session.as_mut() {
            Some(state) => step(state).into(),
            None => NavOutcome::Unavailable,
        }
    }

    fn with_subdir_target(
        &mut self,
        target: impl FnOnce(&GalleryState) -> Result<usize, NavOutcome>,
    ) -> NavOutcome {
        if self.is_loading() {
            return NavOutcome::Busy;
        }
        let index = match self.session.as_ref() {
            Some(state) if state.subdirs_enabled() => match target(state) {
                Ok(index) => index,
                Err(outcome) => return outcome,
            },
            _ => return NavOutcome::Unavailable,
        };
        match self.begin_subdir_fetch(index) {
            Ok(ticket) => NavOutcome::Load(self.drive(ticket)),
            Err(outcome) => outcome,
        }
    }

    /// Run a ticket chain to completion through the transport.
    fn drive(&mut self, mut ticket: FetchTicket) -> LoadOutcome {
        loop {
            let result = self.transport.fetch_text(ticket.url());
            match self.complete(ticket, result) {
                Progress::Fetch(next) => ticket = next,
                Progress::Done(outcome) => return outcome,
                // Superseded while in flight; report what is on screen now.
                Progress::Discarded => return self.settled_outcome(),
            }
        }
    }

    // ------------------------------------------------------------------
    // Ticket API
    // ------------------------------------------------------------------

    /// Begin a new session. The previous session is dropped immediately and
    /// any outstanding ticket becomes stale.
    ///
    /// An unusable URL fails right away with `FetchError`.
    pub fn begin_submit(
        &mut self,
        url: &str,
        subdirs_enabled: bool,
    ) -> Result<FetchTicket, LoadOutcome> {
        self.session = None;
        self.staged = None;
        self.pending = None;

        let base_url = normalize_base_url(url).map_err(|e| {
            log::warn!("rejected base URL: {e}");
            LoadOutcome::FetchError(NetworkError::InvalidUrl(e.to_string()))
        })?;
        log::info!(
            "loading {base_url} (subdirectories {})",
            if subdirs_enabled { "on" } else { "off" }
        );
        self.submitted = Some((base_url.clone(), subdirs_enabled));

        Ok(self.issue(
            base_url.clone(),
            Purpose::Base {
                base_url,
                subdirs_enabled,
            },
        ))
    }

    /// Begin a move to subdirectory `index` of the current session.
    pub fn begin_subdir_fetch(&mut self, index: usize) -> Result<FetchTicket, NavOutcome> {
        if self.is_loading() {
            return Err(NavOutcome::Busy);
        }
        let state = match self.session.as_ref() {
            Some(state) if state.subdirs_enabled() => state,
            _ => return Err(NavOutcome::Unavailable),
        };
        let Some(name) = state.subdir_name(index) else {
            return Err(NavOutcome::NotFound);
        };
        let url = subdir_url(state.base_url(), name);
        Ok(self.issue(url, Purpose::Subdir { index }))
    }

    /// Apply the response for `ticket`.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<String, NetworkError>,
    ) -> Progress {
        if self.pending != Some(ticket.token) {
            log::warn!(
                "discarding stale response #{} for {}",
                ticket.token,
                ticket.url
            );
            return Progress::Discarded;
        }
        self.pending = None;

        let html = match result {
            Ok(html) => html,
            Err(e) => {
                log::warn!("fetch failed: {e}");
                // A failed subdirectory move leaves the session untouched.
                self.staged = None;
                return Progress::Done(LoadOutcome::FetchError(e));
            }
        };

        match ticket.purpose {
            Purpose::Base {
                base_url,
                subdirs_enabled,
            } => {
                let parser = self.parser.clone().with_directories(subdirs_enabled);
                let listing = parse_or_empty(&parser, &html, &ticket.url);
                let state = GalleryState::load_base(base_url, listing, subdirs_enabled);

                match state.current_subdir_name() {
                    Some(first) => {
                        let url = subdir_url(state.base_url(), first);
                        self.staged = Some(state);
                        Progress::Fetch(self.issue(url, Purpose::FirstSubdir))
                    }
                    None => Progress::Done(self.install(state)),
                }
            }
            Purpose::FirstSubdir => {
                let Some(mut state) = self.staged.take() else {
                    return Progress::Discarded;
                };
                state.load_subdir_images(parse_or_empty(&self.parser, &html, &ticket.url));
                Progress::Done(self.install(state))
            }
            Purpose::Subdir { index } => {
                let listing = parse_or_empty(&self.parser, &html, &ticket.url);
                let Some(state) = self.session.as_mut() else {
                    return Progress::Discarded;
                };
                if !state.enter_subdir(index, listing) {
                    return Progress::Discarded;
                }
                Progress::Done(effective_outcome(state))
            }
        }
    }

    fn settled_outcome(&self) -> LoadOutcome {
        self.session
            .as_ref()
            .map_or(LoadOutcome::EmptyNoImages, effective_outcome)
    }

    fn issue(&mut self, url: Url, purpose: Purpose) -> FetchTicket {
        self.last_token += 1;
        self.pending = Some(self.last_token);
        FetchTicket {
            token: self.last_token,
            url,
            purpose,
        }
    }

    fn install(&mut self, state: GalleryState) -> LoadOutcome {
        log::info!(
            "session ready at {}: {} subdirectories, {} images",
            state.base_url(),
            state.subdirectories().len(),
            state.current_images().len()
        );
        let outcome = effective_outcome(&state);
        self.session = Some(state);
        outcome
    }
}

fn effective_outcome(state: &GalleryState) -> LoadOutcome {
    if state.current_images().is_empty() {
        LoadOutcome::EmptyNoImages
    } else {
        LoadOutcome::Loaded
    }
}

/// Binary or otherwise un-parseable pages count as empty listings.
fn parse_or_empty(parser: &IndexParser, html: &str, url: &Url) -> DirectoryListing {
    parser.parse_at(html, url.path()).unwrap_or_else(|e| {
        log::warn!("could not parse {url}: {e}");
        DirectoryListing::default()
    })
}
