//! Popover content.
//!
//! Two kinds of popovers exist: a user card fetched from the server while
//! the pointer hovers a user name, and a file-action menu built locally.
//!
//! Hover handling: `hover_in` issues a ticket, `show` waits the hover delay
//! and then fetches. `hover_out` invalidates the ticket, which cancels the
//! pending delay, aborts the in-flight fetch, or hides the shown popover.
//! A response that arrives for an invalidated ticket is discarded, so a
//! popover never appears after the pointer has left.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::{Labels, DEFAULT_POPOVER_DELAY_MS};
use crate::error::FestivalResult;
use crate::html;

/// Source of user popup fragments.
#[async_trait]
pub trait PopupSource: Send + Sync {
    async fn user_popup(&self, username: &str) -> FestivalResult<String>;
}

/// File-action popover: copy and delete links for one chronicle file.
pub fn file_actions(file_name: &str, labels: &Labels) -> String {
    let arg = html::escape_js_arg(file_name);
    [
        format!(
            "<div><a onclick=\"copyMarkdownPath('{}')\" href=\"#\">{}</a></div>",
            arg,
            html::escape(&labels.copy)
        ),
        format!(
            "<div><a onclick=\"deleteImage('{}')\" href=\"#\">{}</a></div>",
            arg,
            html::escape(&labels.delete)
        ),
    ]
    .join("")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopoverState {
    Hidden,
    /// Waiting out the hover delay.
    Pending,
    Fetching,
    Shown(String),
}

/// Identifies one hover. Stale once the pointer leaves or re-enters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverTicket(u64);

/// How a `show` call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowOutcome {
    Shown,
    /// Ticket invalidated before the response arrived.
    Cancelled,
    /// Response arrived for an invalidated ticket and was dropped.
    Discarded,
    Failed,
}

/// What `hover_out` interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverExit {
    CancelledDelay,
    AbortedFetch,
    Destroyed,
    Idle,
}

/// Hover-triggered user popover.
pub struct UserPopover<P> {
    source: P,
    delay: Duration,
    generation: watch::Sender<u64>,
    state: Mutex<PopoverState>,
}

impl<P: PopupSource> UserPopover<P> {
    pub fn new(source: P) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            source,
            delay: Duration::from_millis(DEFAULT_POPOVER_DELAY_MS),
            generation,
            state: Mutex::new(PopoverState::Hidden),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn state(&self) -> PopoverState {
        self.lock_state().clone()
    }

    /// Pointer entered the user name.
    pub fn hover_in(&self) -> HoverTicket {
        let mut state = self.lock_state();
        let ticket = self.bump();
        *state = PopoverState::Pending;
        ticket
    }

    /// Pointer left the user name.
    pub fn hover_out(&self) -> HoverExit {
        let mut state = self.lock_state();
        self.bump();
        let exit = match &*state {
            PopoverState::Pending => HoverExit::CancelledDelay,
            PopoverState::Fetching => HoverExit::AbortedFetch,
            PopoverState::Shown(_) => HoverExit::Destroyed,
            PopoverState::Hidden => HoverExit::Idle,
        };
        *state = PopoverState::Hidden;
        debug!(?exit, "Popover hover ended");
        exit
    }

    /// Wait the hover delay, fetch the popup for `username` and show it,
    /// unless the ticket is invalidated in between.
    pub async fn show(&self, ticket: HoverTicket, username: &str) -> ShowOutcome {
        let mut generation = self.generation.subscribe();

        tokio::select! {
            _ = tokio::time::sleep(self.delay) => {}
            _ = invalidated(&mut generation, ticket) => return ShowOutcome::Cancelled,
        }
        if !self.transition(ticket, PopoverState::Fetching) {
            return ShowOutcome::Cancelled;
        }

        let username = username.trim();
        let fetched = tokio::select! {
            result = self.source.user_popup(username) => result,
            _ = invalidated(&mut generation, ticket) => {
                debug!(username, "Popover fetch aborted");
                return ShowOutcome::Cancelled;
            }
        };

        match fetched {
            Ok(content) => {
                if self.transition(ticket, PopoverState::Shown(content)) {
                    ShowOutcome::Shown
                } else {
                    debug!(username, "Discarding popover for a finished hover");
                    ShowOutcome::Discarded
                }
            }
            Err(e) => {
                warn!(username, error = %e, "Failed to fetch user popup");
                self.transition(ticket, PopoverState::Hidden);
                ShowOutcome::Failed
            }
        }
    }

    fn bump(&self) -> HoverTicket {
        let mut next = 0;
        self.generation.send_modify(|g| {
            *g += 1;
            next = *g;
        });
        HoverTicket(next)
    }

    /// Set the state if `ticket` is still current.
    fn transition(&self, ticket: HoverTicket, next: PopoverState) -> bool {
        let mut state = self.lock_state();
        if *self.generation.borrow() != ticket.0 {
            return false;
        }
        *state = next;
        true
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, PopoverState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Resolves once `ticket` is no longer the current hover.
async fn invalidated(generation: &mut watch::Receiver<u64>, ticket: HoverTicket) {
    while *generation.borrow_and_update() == ticket.0 {
        if generation.changed().await.is_err() {
            // Popover dropped; nothing can invalidate the ticket anymore.
            std::future::pending::<()>().await;
        }
    }
}
