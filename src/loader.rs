//! The feed-loading pipeline: registry lookup → fetch → parse → render.
//!
//! [`FeedLoader::load`] validates the index synchronously, takes a render
//! ticket, spawns the pipeline and returns a [`LoadHandle`] straight away.
//! Awaiting the handle yields the [`LoadOutcome`] exactly once, and only
//! after the render sink has committed (or the load has failed or been
//! superseded). Dropping the handle does not stop the load.
//!
//! Each load walks the state machine
//!
//! ```text
//! Idle → Fetching → Parsing → Rendering → Done
//!           │          │          └──────→ Superseded
//!           └──────────┴─────────────────→ Failed
//! ```
//!
//! and the current state can be watched through [`LoadHandle::state_changes`].
//! Loads are independent of each other and cannot be cancelled; a newer load
//! simply wins at the render sink.

use crate::feed::{parse_feed, Fetcher, NetworkError, ParseError};
use crate::registry::FeedRegistry;
use crate::render::{Commit, FeedView, RenderSink, RenderTicket};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::{oneshot, watch};
use url::Url;

/// A caller asked for something that can never succeed. Not retryable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("Feed index {index} out of range (registry has {len} feeds)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Why a load ended in [`LoadState::Failed`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The pipeline task panicked or was torn down before reporting.
    #[error("Load task failed: {0}")]
    TaskPanicked(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Fetching,
    Parsing,
    Rendering,
    Done,
    Failed,
    Superseded,
}

impl LoadState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Superseded)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Parsing => "parsing",
            Self::Rendering => "rendering",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Superseded => "superseded",
        }
    }
}

/// Final result of one load.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The view now shows `entries` entries of feed `feed`.
    Rendered { feed: usize, entries: usize },
    /// Nothing was rendered; the previous view is untouched.
    Failed { feed: usize, error: LoadError },
    /// Parsed fine but a later-issued load had already committed.
    Superseded { feed: usize },
}

impl LoadOutcome {
    pub fn feed(&self) -> usize {
        match self {
            Self::Rendered { feed, .. } | Self::Failed { feed, .. } | Self::Superseded { feed } => {
                *feed
            }
        }
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }

    pub fn error(&self) -> Option<&LoadError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Completion handle for one load. Resolves exactly once.
#[derive(Debug)]
pub struct LoadHandle {
    feed: usize,
    state: watch::Receiver<LoadState>,
    done: oneshot::Receiver<LoadOutcome>,
}

impl LoadHandle {
    pub fn feed(&self) -> usize {
        self.feed
    }

    /// The state the load is in right now.
    pub fn state(&self) -> LoadState {
        *self.state.borrow()
    }

    /// A receiver that observes every state transition of this load.
    pub fn state_changes(&self) -> watch::Receiver<LoadState> {
        self.state.clone()
    }
}

impl Future for LoadHandle {
    type Output = LoadOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let feed = self.feed;
        Pin::new(&mut self.done).poll(cx).map(|result| {
            result.unwrap_or_else(|_| LoadOutcome::Failed {
                feed,
                error: LoadError::TaskPanicked("load task dropped before completing".into()),
            })
        })
    }
}

struct Inner {
    registry: FeedRegistry,
    fetcher: Fetcher,
    sink: RenderSink,
}

/// Drives loads of registry feeds into a render sink.
///
/// Cheap to clone; clones share the registry, HTTP client and sink.
#[derive(Clone)]
pub struct FeedLoader {
    inner: Arc<Inner>,
}

impl FeedLoader {
    /// Takes ownership of the sink: after this the loader is its only writer.
    pub fn new(registry: FeedRegistry, fetcher: Fetcher, sink: RenderSink) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry,
                fetcher,
                sink,
            }),
        }
    }

    pub fn registry(&self) -> &FeedRegistry {
        &self.inner.registry
    }

    /// Read-only handle on what the loader has rendered.
    pub fn view(&self) -> FeedView {
        self.inner.sink.view()
    }

    /// Start loading feed `index`.
    ///
    /// Returns immediately. An out-of-range index is rejected here and
    /// nothing is spawned or rendered. Must be called within a tokio runtime.
    pub fn load(&self, index: usize) -> Result<LoadHandle, PreconditionError> {
        let descriptor =
            self.inner
                .registry
                .get(index)
                .ok_or(PreconditionError::IndexOutOfRange {
                    index,
                    len: self.inner.registry.len(),
                })?;
        let url = descriptor.url().clone();
        tracing::info!(feed = index, source = %descriptor, "Loading feed");

        // issued here, not in the task, so ticket order is call order
        let ticket = self.inner.sink.issue(index);
        let (state_tx, state_rx) = watch::channel(LoadState::Idle);
        let (done_tx, done_rx) = oneshot::channel();
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            let outcome =
                match catch_task_panic(run_pipeline(&inner, url, ticket, &state_tx)).await {
                    Ok(outcome) => outcome,
                    Err(panic_msg) => {
                        tracing::error!(feed = index, error = %panic_msg, "Load task panicked");
                        state_tx.send_replace(LoadState::Failed);
                        LoadOutcome::Failed {
                            feed: index,
                            error: LoadError::TaskPanicked(panic_msg),
                        }
                    }
                };

            // receiver gone means the caller did not want to be told
            let _ = done_tx.send(outcome);
        });

        Ok(LoadHandle {
            feed: index,
            state: state_rx,
            done: done_rx,
        })
    }

    /// Callback flavour of [`load`](Self::load): `on_complete` runs once,
    /// after the outcome is final.
    pub fn load_with<F>(&self, index: usize, on_complete: F) -> Result<(), PreconditionError>
    where
        F: FnOnce(LoadOutcome) + Send + 'static,
    {
        let handle = self.load(index)?;
        tokio::spawn(async move {
            on_complete(handle.await);
        });
        Ok(())
    }
}

async fn run_pipeline(
    inner: &Inner,
    url: Url,
    ticket: RenderTicket,
    state: &watch::Sender<LoadState>,
) -> LoadOutcome {
    let feed = ticket.feed();

    transition(state, feed, LoadState::Fetching);
    let raw = match inner.fetcher.fetch(&url).await {
        Ok(raw) => raw,
        Err(e) => return fail(state, feed, e.into()),
    };

    transition(state, feed, LoadState::Parsing);
    let entries = match parse_feed(&raw) {
        Ok(entries) => entries,
        Err(e) => return fail(state, feed, e.into()),
    };

    transition(state, feed, LoadState::Rendering);
    let count = entries.len();
    match inner.sink.render(ticket, entries) {
        Commit::Applied => {
            transition(state, feed, LoadState::Done);
            tracing::info!(feed, entries = count, "Feed loaded");
            LoadOutcome::Rendered {
                feed,
                entries: count,
            }
        }
        Commit::Stale => {
            transition(state, feed, LoadState::Superseded);
            LoadOutcome::Superseded { feed }
        }
    }
}

fn transition(state: &watch::Sender<LoadState>, feed: usize, next: LoadState) {
    let prev = state.send_replace(next);
    tracing::debug!(feed, from = prev.label(), to = next.label(), "Load state");
}

fn fail(state: &watch::Sender<LoadState>, feed: usize, error: LoadError) -> LoadOutcome {
    tracing::warn!(feed, error = %error, "Feed load failed");
    transition(state, feed, LoadState::Failed);
    LoadOutcome::Failed { feed, error }
}

/// Run `future`, turning a panic into `Err(message)`.
async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future).catch_unwind().await.map_err(|panic| {
        if let Some(s) = panic.downcast_ref::<&'static str>() {
            s.to_string()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        }
    })
}
