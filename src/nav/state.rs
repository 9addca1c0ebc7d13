//! Navigation state: three panes plus the selection history.
//!
//! ```text
//! NavigationState
//! ├── parent:  Pane   // directory containing `current`
//! ├── current: Pane   // focused directory (or file, when started on one)
//! ├── child:   Pane   // entry selected in `current`
//! └── history: History
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::fs::entry::Entry;
use crate::fs::listing::Listing;
use crate::nav::history::History;

/// Which of the three panes a load or merge targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Parent,
    Current,
    Child,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Slot::Parent => "parent",
            Slot::Current => "current",
            Slot::Child => "child",
        };
        f.write_str(name)
    }
}

/// Tag attached to an in-flight load. A pane accepts a result only while it
/// still holds the ticket the load was issued with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One column of the browser.
#[derive(Debug, Clone, Default)]
pub struct Pane {
    pub path: Option<PathBuf>,
    pub listing: Option<Listing>,
    /// Cursor inside `listing`. For the parent pane this is the position of
    /// the current directory, `None` when it is not listed there.
    pub selected: Option<usize>,
    pending: Option<Ticket>,
}

impl Pane {
    pub fn at(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            ..Default::default()
        }
    }

    /// Whether a load for this pane is still in flight.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        let listing = self.listing.as_ref()?;
        listing.entries().get(self.selected?)
    }
}

/// The aggregate root of the navigation engine.
#[derive(Debug, Clone)]
pub struct NavigationState {
    pub parent: Pane,
    pub current: Pane,
    pub child: Pane,
    pub history: History,
    pub(crate) initializing: bool,
    next_ticket: u64,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new(History::default())
    }
}

impl NavigationState {
    pub fn new(history: History) -> Self {
        Self {
            parent: Pane::default(),
            current: Pane::default(),
            child: Pane::default(),
            history,
            initializing: false,
            next_ticket: 0,
        }
    }

    pub fn pane(&self, slot: Slot) -> &Pane {
        match slot {
            Slot::Parent => &self.parent,
            Slot::Current => &self.current,
            Slot::Child => &self.child,
        }
    }

    pub fn pane_mut(&mut self, slot: Slot) -> &mut Pane {
        match slot {
            Slot::Parent => &mut self.parent,
            Slot::Current => &mut self.current,
            Slot::Child => &mut self.child,
        }
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current.path.as_deref()
    }

    pub fn parent_path(&self) -> Option<&Path> {
        self.parent.path.as_deref()
    }

    pub fn child_path(&self) -> Option<&Path> {
        self.child.path.as_deref()
    }

    pub fn current_selected(&self) -> usize {
        self.current.selected.unwrap_or(0)
    }

    /// Number of real entries in the current pane.
    pub fn current_len(&self) -> usize {
        self.current
            .listing
            .as_ref()
            .map_or(0, |l| l.entries().len())
    }

    /// Whether any pane is waiting for a load.
    pub fn is_loading(&self) -> bool {
        self.parent.is_loading() || self.current.is_loading() || self.child.is_loading()
    }

    pub fn is_initializing(&self) -> bool {
        self.initializing
    }

    /// Hand `slot` a fresh ticket, superseding any load already in flight.
    pub(crate) fn issue_ticket(&mut self, slot: Slot) -> Ticket {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        self.pane_mut(slot).pending = Some(ticket);
        ticket
    }

    /// Find the pane still waiting on `ticket` and clear its pending mark.
    /// Panes carry their ticket when the window shifts, so the result lands
    /// wherever the pane has moved to.
    pub(crate) fn redeem(&mut self, ticket: Ticket) -> Option<Slot> {
        let slot = [Slot::Parent, Slot::Current, Slot::Child]
            .into_iter()
            .find(|&s| self.pane(s).pending == Some(ticket))?;
        self.pane_mut(slot).pending = None;
        Some(slot)
    }

    /// Store the cursor of every loaded directory pane in the history.
    pub(crate) fn remember_positions(&mut self) {
        for slot in [Slot::Parent, Slot::Current, Slot::Child] {
            let pane = self.pane(slot);
            let is_dir = pane.listing.as_ref().is_some_and(Listing::is_directory);
            let (Some(path), Some(selected)) = (pane.path.clone(), pane.selected) else {
                continue;
            };
            if is_dir {
                self.history.record(&path, selected);
            }
        }
    }
}
