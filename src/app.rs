use crate::feed::Entry;
use crate::loader::{FeedLoader, LoadOutcome, LoadState};
use crate::menu::Menu;
use crate::registry::{FeedDescriptor, FeedRegistry};
use crate::render::{FeedView, RenderedView};
use std::borrow::Cow;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

/// How long a status message stays in the status bar.
const STATUS_TTL_SECS: u64 = 3;

/// Events from background tasks
#[derive(Debug)]
pub enum AppEvent {
    /// A load started by the UI has reached its final outcome.
    LoadFinished(LoadOutcome),
}

/// The most recently started load, for the status bar spinner.
pub struct ActiveLoad {
    pub feed: usize,
    pub state: watch::Receiver<LoadState>,
}

impl ActiveLoad {
    pub fn state(&self) -> LoadState {
        *self.state.borrow()
    }
}

/// Central application state
pub struct App {
    pub loader: FeedLoader,
    view: FeedView,

    /// Last committed view, refreshed from the render sink.
    pub displayed: RenderedView,

    // UI State
    pub menu: Menu,
    /// Highlighted row in the feed menu.
    pub menu_cursor: usize,
    pub selected_entry: usize,

    pub active_load: Option<ActiveLoad>,

    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub show_help: bool,

    /// Dirty flag to skip unnecessary frame renders
    pub needs_redraw: bool,

    /// Current frame of the loading spinner animation.
    pub spinner_frame: usize,
}

impl App {
    pub fn new(loader: FeedLoader) -> Self {
        let view = loader.view();
        let displayed = view.snapshot();
        Self {
            loader,
            view,
            displayed,
            menu: Menu::default(),
            menu_cursor: 0,
            selected_entry: 0,
            active_load: None,
            status_message: None,
            show_help: false,
            needs_redraw: true,
            spinner_frame: 0,
        }
    }

    pub fn registry(&self) -> &FeedRegistry {
        self.loader.registry()
    }

    /// Feed currently on screen, if any load has committed yet.
    pub fn displayed_feed(&self) -> Option<&FeedDescriptor> {
        self.displayed.feed.and_then(|i| self.registry().get(i))
    }

    pub fn entries(&self) -> &[Entry] {
        &self.displayed.entries
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.displayed.entries.get(self.selected_entry)
    }

    pub fn is_loading(&self) -> bool {
        self.active_load
            .as_ref()
            .is_some_and(|load| !load.state().is_terminal())
    }

    /// Kick off a load of feed `index`; the outcome arrives as `AppEvent::LoadFinished`.
    pub fn start_load(&mut self, index: usize, event_tx: &mpsc::Sender<AppEvent>) {
        let handle = match self.loader.load(index) {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(error = %e, "Rejected feed load");
                self.set_status(format!("Error: {}", e));
                return;
            }
        };

        if let Some(feed) = self.registry().get(index) {
            self.set_status(format!("Loading {}...", feed.name()));
        }
        self.active_load = Some(ActiveLoad {
            feed: index,
            state: handle.state_changes(),
        });

        let tx = event_tx.clone();
        tokio::spawn(async move {
            let outcome = handle.await;
            if let Err(e) = tx.send(AppEvent::LoadFinished(outcome)).await {
                tracing::warn!(error = %e, event = "LoadFinished", "Channel send failed (receiver dropped)");
            }
        });
    }

    /// Reload whatever is on screen, or the menu selection before the first commit.
    pub fn reload(&mut self, event_tx: &mpsc::Sender<AppEvent>) {
        let index = self.displayed.feed.unwrap_or(self.menu_cursor);
        self.start_load(index, event_tx);
    }

    /// Load the feed under the menu cursor and close the menu.
    pub fn choose_menu_feed(&mut self, event_tx: &mpsc::Sender<AppEvent>) {
        self.menu.hide();
        self.start_load(self.menu_cursor, event_tx);
    }

    /// Pull a new snapshot from the render sink if one was committed.
    ///
    /// Returns true when the displayed entries changed.
    pub fn sync_view(&mut self) -> bool {
        let Some(view) = self.view.snapshot_if_changed() else {
            return false;
        };
        if view.feed != self.displayed.feed {
            if let Some(feed) = view.feed {
                self.menu_cursor = feed;
            }
        }
        self.displayed = view;
        self.selected_entry = 0;
        self.needs_redraw = true;
        true
    }

    pub fn handle_load_finished(&mut self, outcome: LoadOutcome) {
        self.sync_view();

        let name = self
            .registry()
            .get(outcome.feed())
            .map(|f| f.name().to_string())
            .unwrap_or_default();

        match &outcome {
            LoadOutcome::Rendered { entries, .. } => {
                self.set_status(format!("{}: {} entries", name, entries));
            }
            LoadOutcome::Failed { error, .. } => {
                self.set_status(format!("Failed to load {}: {}", name, error));
            }
            LoadOutcome::Superseded { feed } => {
                tracing::debug!(feed, "Load superseded by a newer one");
            }
        }

        if self
            .active_load
            .as_ref()
            .is_some_and(|load| load.state().is_terminal())
        {
            self.active_load = None;
        }
        self.needs_redraw = true;
    }

    pub fn nav_down(&mut self) {
        if self.menu.is_visible() {
            let max_index = self.registry().len().saturating_sub(1);
            self.menu_cursor = self.menu_cursor.saturating_add(1).min(max_index);
        } else if !self.displayed.is_empty() {
            let max_index = self.displayed.len().saturating_sub(1);
            self.selected_entry = self.selected_entry.saturating_add(1).min(max_index);
        }
    }

    pub fn nav_up(&mut self) {
        if self.menu.is_visible() {
            self.menu_cursor = self.menu_cursor.saturating_sub(1);
        } else {
            self.selected_entry = self.selected_entry.saturating_sub(1);
        }
    }

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired.
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{Fetcher, DEFAULT_MAX_FEED_BYTES};
    use crate::registry::FeedSource;
    use crate::render::RenderSink;
    use std::time::Duration;
    use tokio::time;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_app() -> App {
        let registry = FeedRegistry::new(vec![
            FeedSource::new("One", "http://127.0.0.1:9/one"),
            FeedSource::new("Two", "http://127.0.0.1:9/two"),
        ])
        .unwrap();
        let fetcher = Fetcher::new(Duration::from_secs(1), DEFAULT_MAX_FEED_BYTES).unwrap();
        App::new(FeedLoader::new(registry, fetcher, RenderSink::new()))
    }

    #[test]
    fn test_nav_empty_list() {
        let mut app = test_app();
        assert!(app.selected_entry().is_none());
        app.nav_down();
        assert_eq!(app.selected_entry, 0);
        app.nav_up();
        assert_eq!(app.selected_entry, 0);
    }

    #[test]
    fn test_menu_cursor_clamped_to_registry() {
        let mut app = test_app();
        app.menu.toggle();
        app.nav_down();
        app.nav_down();
        app.nav_down();
        assert_eq!(app.menu_cursor, 1);
        app.nav_up();
        app.nav_up();
        assert_eq!(app.menu_cursor, 0);
    }

    #[test]
    fn test_starts_with_menu_hidden_and_nothing_displayed() {
        let app = test_app();
        assert!(app.menu.is_hidden());
        assert!(app.displayed_feed().is_none());
        assert!(!app.is_loading());
    }

    #[tokio::test]
    async fn test_out_of_range_load_sets_status() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(4);
        app.start_load(7, &tx);
        assert!(app.active_load.is_none());
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert!(msg.contains("out of range"));
    }

    #[tokio::test]
    async fn test_failed_first_load_reports_error() {
        let mut app = test_app();
        let (tx, mut rx) = mpsc::channel(4);

        app.start_load(0, &tx);
        assert!(app.active_load.is_some());

        let AppEvent::LoadFinished(outcome) = rx.recv().await.unwrap();
        assert!(outcome.error().is_some());
        app.handle_load_finished(outcome);

        assert!(app.displayed_feed().is_none());
        assert!(app.active_load.is_none());
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert!(msg.starts_with("Failed to load One"));
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_entries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/good"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"<?xml version="1.0"?><rss version="2.0"><channel><title>t</title>
<item><title>Still here</title><link>https://example.com/1</link></item>
</channel></rss>"#,
                "application/rss+xml",
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let registry = FeedRegistry::new(vec![
            FeedSource::new("Good", format!("{}/good", server.uri())),
            FeedSource::new("Broken", format!("{}/broken", server.uri())),
        ])
        .unwrap();
        let fetcher = Fetcher::new(Duration::from_secs(5), DEFAULT_MAX_FEED_BYTES).unwrap();
        let mut app = App::new(FeedLoader::new(registry, fetcher, RenderSink::new()));
        let (tx, mut rx) = mpsc::channel(4);

        app.start_load(0, &tx);
        let AppEvent::LoadFinished(outcome) = rx.recv().await.unwrap();
        assert!(outcome.is_rendered());
        app.handle_load_finished(outcome);
        assert_eq!(app.displayed_feed().map(|f| f.name()), Some("Good"));

        app.start_load(1, &tx);
        let AppEvent::LoadFinished(outcome) = rx.recv().await.unwrap();
        assert!(outcome.error().is_some());
        app.handle_load_finished(outcome);

        assert_eq!(app.displayed_feed().map(|f| f.name()), Some("Good"));
        let titles: Vec<&str> = app.entries().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Still here"]);
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert!(msg.starts_with("Failed to load Broken"));
    }

    #[tokio::test]
    async fn test_status_expires_after_3_seconds() {
        let mut app = test_app();
        time::pause();
        app.set_status("Test message");

        time::advance(Duration::from_secs(2)).await;
        assert!(!app.clear_expired_status());
        assert!(app.status_message.is_some());

        time::advance(Duration::from_secs(2)).await;
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }
}
