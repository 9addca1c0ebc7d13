//! # Actions
//!
//! Everything that moves the browser becomes an `Action`. A key press is
//! `Action::GoForward`; a finished directory read is
//! `Action::ContentsLoaded { .. }`.
//!
//! `update()` applies one action to the state and returns the effects the
//! runner must perform. It never touches the filesystem beyond canonicalizing
//! paths, and never spawns anything itself.
//!
//! ```text
//! State + Action  →  update()  →  State' + [Effect]
//!                                      │
//!                       runner ◄───────┘   (results come back as Actions)
//! ```

use std::mem;
use std::path::PathBuf;

use log::{debug, warn};

use crate::error::Result;
use crate::fs::listing::{Listing, Preview};
use crate::nav::path;
use crate::nav::state::{NavigationState, Pane, Slot, Ticket};
use crate::opener::OpenTarget;

#[derive(Debug)]
pub enum Action {
    /// Start browsing at a path.
    Init(PathBuf),
    /// The starting directory has been read; prefetch its neighbours.
    InitSucceeded,
    /// A load finished. Ignored unless some pane still holds `ticket`.
    ContentsLoaded {
        ticket: Ticket,
        result: Result<Listing>,
    },
    /// Move the cursor in the current pane.
    SelectItem(usize),
    /// Select the first entry whose name contains the query, ignoring case.
    Search(String),
    /// Like `Search`, but starts after the cursor and wraps around.
    SearchNext(String),
    GoBack,
    GoForward,
}

impl Action {
    /// Short description for the log; listings are never dumped.
    pub fn describe(&self) -> String {
        match self {
            Action::Init(path) => format!("Init({})", path.display()),
            Action::InitSucceeded => "InitSucceeded".to_string(),
            Action::ContentsLoaded { ticket, result } => format!(
                "ContentsLoaded({}, {})",
                ticket,
                if result.is_ok() { "ok" } else { "failed" }
            ),
            Action::SelectItem(index) => format!("SelectItem({})", index),
            Action::Search(query) => format!("Search({:?})", query),
            Action::SearchNext(query) => format!("SearchNext({:?})", query),
            Action::GoBack => "GoBack".to_string(),
            Action::GoForward => "GoForward".to_string(),
        }
    }
}

/// Work requested by `update()`, carried out by the runner.
#[derive(Debug)]
pub enum Effect {
    /// Read `path` and answer with `Action::ContentsLoaded { ticket, .. }`.
    Load {
        slot: Slot,
        path: PathBuf,
        ticket: Ticket,
    },
    /// Hand the file to an external program.
    Open { path: PathBuf, target: OpenTarget },
    /// Apply another action after this one.
    Dispatch(Action),
    /// Show a short diagnostic to the user.
    Notify(String),
}

/// Apply `action` to `state`.
pub fn update(state: &mut NavigationState, action: Action) -> Vec<Effect> {
    debug!("{}", action.describe());
    match action {
        Action::Init(path) => init(state, path),
        Action::InitSucceeded => init_succeeded(state),
        Action::ContentsLoaded { ticket, result } => contents_loaded(state, ticket, result),
        Action::SelectItem(index) => select_item(state, index),
        Action::Search(query) => search(state, &query, 0),
        Action::SearchNext(query) => {
            let start = state.current_selected() + 1;
            search(state, &query, start)
        }
        Action::GoBack => go_back(state),
        Action::GoForward => go_forward(state),
    }
}

fn init(state: &mut NavigationState, path: PathBuf) -> Vec<Effect> {
    let current = path::current_path(&path);
    state.parent = Pane::default();
    state.child = Pane::default();
    state.current = Pane::at(current);
    state.current.selected = Some(0);
    state.initializing = true;
    load(state, Slot::Current).into_iter().collect()
}

fn init_succeeded(state: &mut NavigationState) -> Vec<Effect> {
    let Some(current) = state.current.path.clone() else {
        return Vec::new();
    };
    state.parent = path::parent_path(&current)
        .map(Pane::at)
        .unwrap_or_default();

    let mut effects = Vec::new();
    effects.extend(load(state, Slot::Parent));
    effects.extend(refresh_child(state));
    effects
}

fn contents_loaded(state: &mut NavigationState, ticket: Ticket, result: Result<Listing>) -> Vec<Effect> {
    let Some(slot) = state.redeem(ticket) else {
        debug!("discarding stale load {}", ticket);
        return Vec::new();
    };

    let listing = match result {
        Ok(listing) => listing,
        Err(e) => {
            warn!("{} pane not updated: {}", slot, e);
            if slot == Slot::Current {
                state.initializing = false;
            }
            return vec![Effect::Notify(e.to_string())];
        }
    };

    match slot {
        Slot::Current => merge_current(state, listing),
        Slot::Parent => {
            let name = state.current.path.as_deref().and_then(path::basename);
            state.parent.selected = name.and_then(|n| listing.position_of(n));
            state.parent.listing = Some(listing);
            Vec::new()
        }
        Slot::Child => {
            let remembered = state
                .child
                .path
                .as_deref()
                .and_then(|p| state.history.selected(p))
                .unwrap_or(0);
            state.child.selected = Some(clamp(&listing, remembered));
            state.child.listing = Some(listing);
            Vec::new()
        }
    }
}

fn merge_current(state: &mut NavigationState, listing: Listing) -> Vec<Effect> {
    // Keep the cursor on the directory we came back from, if it is listed.
    let from_child = state
        .child
        .path
        .as_deref()
        .and_then(path::basename)
        .and_then(|n| listing.position_of(n));
    let selected = from_child.or(state.current.selected).unwrap_or(0);
    state.current.selected = Some(clamp(&listing, selected));
    state.current.listing = Some(listing);

    if state.initializing {
        state.initializing = false;
        return vec![Effect::Dispatch(Action::InitSucceeded)];
    }

    let expected = resolved_child(state);
    if expected.as_deref() == state.child.path.as_deref() {
        return Vec::new();
    }
    refresh_child(state).into_iter().collect()
}

fn select_item(state: &mut NavigationState, index: usize) -> Vec<Effect> {
    if index >= state.current_len() {
        debug!("selection {} out of range", index);
        return Vec::new();
    }
    state.current.selected = Some(index);
    refresh_child(state).into_iter().collect()
}

fn search(state: &NavigationState, query: &str, start: usize) -> Vec<Effect> {
    let Some(listing) = state.current.listing.as_ref().filter(|l| l.is_directory()) else {
        return Vec::new();
    };
    let entries = listing.entries();
    if entries.is_empty() {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    let start = start % entries.len();
    let found = (0..entries.len())
        .map(|offset| (start + offset) % entries.len())
        .find(|&i| entries[i].name.to_lowercase().contains(&needle));

    match found {
        Some(index) => vec![Effect::Dispatch(Action::SelectItem(index))],
        None => vec![Effect::Notify(format!("No match for \"{}\"", query))],
    }
}

fn go_back(state: &mut NavigationState) -> Vec<Effect> {
    if state.parent.path.is_none() {
        return Vec::new();
    }
    state.remember_positions();

    let old_parent = mem::take(&mut state.parent);
    let old_current = mem::take(&mut state.current);
    state.child = old_current;
    state.current = old_parent;
    if state.current.selected.is_none() && state.current.listing.is_some() {
        let remembered = state
            .current
            .path
            .as_deref()
            .and_then(|p| state.history.selected(p))
            .unwrap_or(0);
        state.current.selected = Some(remembered);
    }

    state.parent = state
        .current
        .path
        .as_deref()
        .and_then(path::parent_path)
        .map(Pane::at)
        .unwrap_or_default();
    load(state, Slot::Parent).into_iter().collect()
}

fn go_forward(state: &mut NavigationState) -> Vec<Effect> {
    let (Some(child_path), Some(child_listing)) = (&state.child.path, &state.child.listing) else {
        debug!("forward ignored: child not loaded");
        return Vec::new();
    };

    if let Listing::File { preview, .. } = child_listing {
        let target = match preview {
            Preview::Binary => OpenTarget::Viewer,
            _ => OpenTarget::Editor,
        };
        return vec![Effect::Open {
            path: child_path.clone(),
            target,
        }];
    }

    state.remember_positions();
    let old_current = mem::take(&mut state.current);
    let old_child = mem::take(&mut state.child);
    state.parent = old_current;
    state.current = old_child;

    let remembered = state
        .current
        .path
        .as_deref()
        .and_then(|p| state.history.selected(p))
        .unwrap_or(0);
    let selected = match &state.current.listing {
        Some(listing) => clamp(listing, remembered),
        None => remembered,
    };
    state.current.selected = Some(selected);
    refresh_child(state).into_iter().collect()
}

/// Issue a load for `slot` if it has a path.
fn load(state: &mut NavigationState, slot: Slot) -> Option<Effect> {
    let path = state.pane(slot).path.clone()?;
    let ticket = state.issue_ticket(slot);
    Some(Effect::Load { slot, path, ticket })
}

fn resolved_child(state: &NavigationState) -> Option<PathBuf> {
    let current = state.current.path.as_deref()?;
    let listing = state.current.listing.as_ref()?;
    path::child_path(current, listing, state.current_selected())
}

/// Point the child pane at the current selection and load it. Any listing
/// or in-flight load the child pane had is dropped.
fn refresh_child(state: &mut NavigationState) -> Option<Effect> {
    state.child = resolved_child(state).map(Pane::at).unwrap_or_default();
    load(state, Slot::Child)
}

fn clamp(listing: &Listing, index: usize) -> usize {
    index.min(listing.entries().len().saturating_sub(1))
}
