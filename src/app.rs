use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, warn};
use tokio::sync::mpsc;

use crate::event::Event;
use crate::fs::listing::ListingLoader;
use crate::nav::action::{update, Action, Effect};
use crate::nav::state::{NavigationState, Ticket};
use crate::opener::OpenRequest;

/// Application mode.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum AppMode {
    #[default]
    Normal,
    /// Typing a search query after `/`.
    Search { query: String },
}

/// Main application state and effect runner.
///
/// Owns the `NavigationState`; every change goes through `dispatch`, which
/// applies the reducer and carries out the effects it returns. Loads run as
/// tokio tasks and report back on the event channel.
pub struct App {
    pub nav: NavigationState,
    pub mode: AppMode,
    pub should_quit: bool,
    pub status_message: Option<(String, Instant)>,
    /// Query of the last confirmed search, repeated with `n`.
    pub last_search: Option<String>,
    pending_open: Option<OpenRequest>,
    loader: Arc<ListingLoader>,
    event_tx: mpsc::UnboundedSender<Event>,
}

impl App {
    pub fn new(
        nav: NavigationState,
        loader: ListingLoader,
        event_tx: mpsc::UnboundedSender<Event>,
    ) -> Self {
        Self {
            nav,
            mode: AppMode::Normal,
            should_quit: false,
            status_message: None,
            last_search: None,
            pending_open: None,
            loader: Arc::new(loader),
            event_tx,
        }
    }

    /// Apply `action` and every follow-up action it produces, in order.
    pub fn dispatch(&mut self, action: Action) {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            for effect in update(&mut self.nav, action) {
                match effect {
                    Effect::Load { slot, path, ticket } => {
                        debug!("loading {} into {} pane ({})", path.display(), slot, ticket);
                        self.spawn_load(path, ticket);
                    }
                    Effect::Open { path, target } => {
                        self.pending_open = Some(OpenRequest { path, target });
                    }
                    Effect::Dispatch(next) => queue.push_back(next),
                    Effect::Notify(message) => self.set_status_message(message),
                }
            }
        }
    }

    fn spawn_load(&self, path: PathBuf, ticket: Ticket) {
        let loader = Arc::clone(&self.loader);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = loader.load(&path).await;
            let action = Action::ContentsLoaded { ticket, result };
            if tx.send(Event::Navigation(action)).is_err() {
                warn!("event loop gone, dropping load of {}", path.display());
            }
        });
    }

    /// The file the user asked to open, if any. Cleared on read.
    pub fn take_pending_open(&mut self) -> Option<OpenRequest> {
        self.pending_open.take()
    }

    /// Set a status message with current timestamp.
    pub fn set_status_message(&mut self, msg: String) {
        self.status_message = Some((msg, Instant::now()));
    }

    /// Clear the status message if it has been displayed for more than 3 seconds.
    pub fn clear_expired_status(&mut self) {
        if let Some((_, ref created)) = self.status_message {
            if created.elapsed().as_secs() > 3 {
                self.status_message = None;
            }
        }
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        let len = self.nav.current_len();
        let selected = self.nav.current_selected();
        if len > 0 && selected < len - 1 {
            self.dispatch(Action::SelectItem(selected + 1));
        }
    }

    /// Move selection up by one item.
    pub fn select_previous(&mut self) {
        let selected = self.nav.current_selected();
        if selected > 0 {
            self.dispatch(Action::SelectItem(selected - 1));
        }
    }

    /// Jump to the first item.
    pub fn select_first(&mut self) {
        if self.nav.current_len() > 0 && self.nav.current_selected() != 0 {
            self.dispatch(Action::SelectItem(0));
        }
    }

    /// Jump to the last item.
    pub fn select_last(&mut self) {
        let len = self.nav.current_len();
        if len > 0 && self.nav.current_selected() != len - 1 {
            self.dispatch(Action::SelectItem(len - 1));
        }
    }

    pub fn go_back(&mut self) {
        self.dispatch(Action::GoBack);
    }

    pub fn go_forward(&mut self) {
        self.dispatch(Action::GoForward);
    }

    // ── Search input ─────────────────────────────────────────────────────────

    pub fn start_search(&mut self) {
        self.mode = AppMode::Search {
            query: String::new(),
        };
    }

    pub fn search_input_char(&mut self, c: char) {
        if let AppMode::Search { query } = &mut self.mode {
            query.push(c);
        }
    }

    pub fn search_delete_char(&mut self) {
        if let AppMode::Search { query } = &mut self.mode {
            query.pop();
        }
    }

    pub fn cancel_search(&mut self) {
        self.mode = AppMode::Normal;
    }

    /// Leave search input and select the first match. An empty query only
    /// closes the prompt.
    pub fn confirm_search(&mut self) {
        let AppMode::Search { query } = std::mem::take(&mut self.mode) else {
            return;
        };
        if query.is_empty() {
            return;
        }
        self.last_search = Some(query.clone());
        self.dispatch(Action::Search(query));
    }

    /// Repeat the last search from the entry after the cursor.
    pub fn search_next(&mut self) {
        match self.last_search.clone() {
            Some(query) => self.dispatch(Action::SearchNext(query)),
            None => self.set_status_message("No previous search".to_string()),
        }
    }
}
