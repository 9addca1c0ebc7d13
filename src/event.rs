use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, MouseEvent};
use tokio::sync::mpsc;

use crate::error::Result;
use crate::nav::action::Action;

/// Application events.
#[derive(Debug)]
pub enum Event {
    /// A key press event.
    Key(KeyEvent),
    /// A mouse event.
    Mouse(MouseEvent),
    /// A periodic tick for rendering.
    Tick,
    /// Terminal resize event.
    Resize(u16, u16),
    /// A navigation action produced by a background task, such as a
    /// finished listing load.
    Navigation(Action),
}

/// Async event handler that polls crossterm events and forwards them via a channel.
///
/// Polling can be paused while another program owns the terminal; keys typed
/// in that program are then left alone.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    tx: mpsc::UnboundedSender<Event>,
    active: Arc<AtomicBool>,
}

impl EventHandler {
    /// Create a new EventHandler with the given tick rate.
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();
        let active = Arc::new(AtomicBool::new(true));
        let poll_active = Arc::clone(&active);

        tokio::spawn(async move {
            loop {
                if !poll_active.load(Ordering::SeqCst) {
                    if event_tx.is_closed() {
                        break;
                    }
                    tokio::time::sleep(tick_rate).await;
                    continue;
                }
                if event::poll(tick_rate).unwrap_or(false) {
                    if let Some(ev) = read_if_active(&poll_active, event::read) {
                        if event_tx.send(ev).is_err() {
                            break;
                        }
                    }
                } else if event_tx.send(Event::Tick).is_err() {
                    break;
                }
                tokio::task::yield_now().await;
            }
        });

        Self { rx, tx, active }
    }

    /// Get a sender clone for async tasks to report back into the loop.
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.tx.clone()
    }

    /// Stop reading terminal input.
    pub fn pause(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// Start reading terminal input again.
    pub fn resume(&self) {
        self.active.store(true, Ordering::SeqCst);
    }

    /// Receive the next event (blocks until available).
    pub async fn next(&mut self) -> Result<Event> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| crate::error::AppError::Terminal("Event channel closed".into()))
    }
}

/// Read one pending terminal event unless input capture was paused while
/// `poll` was blocked. A paused reader leaves the event queued for the
/// program that now owns the terminal.
fn read_if_active(
    active: &AtomicBool,
    read: impl FnOnce() -> io::Result<CrosstermEvent>,
) -> Option<Event> {
    if !active.load(Ordering::SeqCst) {
        return None;
    }
    match read() {
        Ok(CrosstermEvent::Key(key)) => Some(Event::Key(key)),
        Ok(CrosstermEvent::Mouse(mouse)) => Some(Event::Mouse(mouse)),
        Ok(CrosstermEvent::Resize(w, h)) => Some(Event::Resize(w, h)),
        _ => None,
    }
}
