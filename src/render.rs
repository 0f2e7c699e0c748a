//! The render target: the one mutable "currently displayed entries" surface.
//!
//! [`RenderSink`] is the only writer. It is owned by the loader, so nothing
//! else can change what is on screen. Readers hold a [`FeedView`], which
//! only hands out complete snapshots.
//!
//! Each load takes a [`RenderTicket`] when it is issued. A commit carrying a
//! ticket older than the one behind the current view is discarded, so a slow
//! load can never overwrite the result of a load issued after it.

use crate::feed::Entry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// A committed entry list together with the feed it came from.
#[derive(Debug, Clone)]
pub struct RenderedView {
    /// Registry index of the displayed feed, `None` until the first commit.
    pub feed: Option<usize>,
    pub entries: Arc<[Entry]>,
    generation: u64,
}

impl RenderedView {
    fn blank() -> Self {
        Self {
            feed: None,
            entries: Arc::from(Vec::new()),
            generation: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Permission to commit one entry list, taken when a load is issued.
#[derive(Debug)]
pub struct RenderTicket {
    generation: u64,
    feed: usize,
}

impl RenderTicket {
    pub fn feed(&self) -> usize {
        self.feed
    }
}

/// What happened to a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// The view now shows exactly the committed entries.
    Applied,
    /// A later-issued load already committed; the entries were dropped.
    Stale,
}

/// Sole writer of the rendered view.
#[derive(Debug)]
pub struct RenderSink {
    view: watch::Sender<RenderedView>,
    next_generation: AtomicU64,
}

impl RenderSink {
    pub fn new() -> Self {
        let (view, _) = watch::channel(RenderedView::blank());
        Self {
            view,
            next_generation: AtomicU64::new(1),
        }
    }

    /// Take a ticket for a load of `feed`. Tickets are strictly increasing in issue order.
    pub fn issue(&self, feed: usize) -> RenderTicket {
        RenderTicket {
            generation: self.next_generation.fetch_add(1, Ordering::Relaxed),
            feed,
        }
    }

    /// Replace the displayed entries in one step.
    ///
    /// Returns once the new list is visible to every reader, or immediately
    /// with [`Commit::Stale`] if a newer ticket has already been committed.
    pub fn render(&self, ticket: RenderTicket, entries: Vec<Entry>) -> Commit {
        let entries: Arc<[Entry]> = entries.into();
        let count = entries.len();

        let applied = self.view.send_if_modified(|view| {
            if ticket.generation < view.generation {
                return false;
            }
            *view = RenderedView {
                feed: Some(ticket.feed),
                entries,
                generation: ticket.generation,
            };
            true
        });

        if applied {
            tracing::debug!(
                feed = ticket.feed,
                generation = ticket.generation,
                entries = count,
                "View committed"
            );
            Commit::Applied
        } else {
            tracing::debug!(
                feed = ticket.feed,
                generation = ticket.generation,
                "Discarding stale render, a newer load already committed"
            );
            Commit::Stale
        }
    }

    /// Read-only handle on the view.
    pub fn view(&self) -> FeedView {
        FeedView {
            rx: self.view.subscribe(),
        }
    }
}

impl Default for RenderSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only access to the rendered view.
#[derive(Debug, Clone)]
pub struct FeedView {
    rx: watch::Receiver<RenderedView>,
}

impl FeedView {
    /// The current view. Never a mix of two commits.
    pub fn snapshot(&self) -> RenderedView {
        self.rx.borrow().clone()
    }

    /// True if a commit happened since the last `snapshot_if_changed`.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Snapshot and mark the current commit as seen.
    pub fn snapshot_if_changed(&mut self) -> Option<RenderedView> {
        match self.rx.has_changed() {
            Ok(true) => Some(self.rx.borrow_and_update().clone()),
            _ => None,
        }
    }

    /// Wait until the next commit.
    pub async fn changed(&mut self) -> RenderedView {
        // the sender lives as long as the loader; if it is gone nothing will change again
        if self.rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
        self.rx.borrow_and_update().clone()
    }
}
