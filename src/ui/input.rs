//! Input handling for the TUI.
//!
//! Keys are dispatched by mode: the help overlay captures everything while
//! open, the feed menu takes navigation keys while visible, and otherwise
//! keys act on the entry list.

use crate::app::{App, AppEvent};
use crate::util::validate_url_for_open;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::Action;

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Action::Quit;
    }

    if app.show_help {
        handle_help_input(app, code);
        return Action::Continue;
    }

    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('m') => app.menu.toggle(),
        KeyCode::Esc => app.menu.hide(),
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Enter if app.menu.is_visible() => app.choose_menu_feed(event_tx),
        KeyCode::Enter | KeyCode::Char('o') => open_selected_entry(app),
        KeyCode::Char('r') => app.reload(event_tx),
        KeyCode::Char(c @ '1'..='9') => {
            // digits are 1-based; anything past the registry is ignored
            let index = (c as usize) - ('1' as usize);
            if index < app.registry().len() {
                app.menu.hide();
                app.start_load(index, event_tx);
            }
        }
        _ => {}
    }
    Action::Continue
}

/// Handle input while the help overlay is visible.
fn handle_help_input(app: &mut App, code: KeyCode) {
    if matches!(
        code,
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')
    ) {
        app.show_help = false;
    }
}

fn open_selected_entry(app: &mut App) {
    let Some(entry) = app.selected_entry() else {
        app.set_status("No entry selected");
        return;
    };

    let url = match validate_url_for_open(&entry.link) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(link = %entry.link, error = %e, "Refusing to open entry link");
            app.set_status(format!("Cannot open link: {}", e));
            return;
        }
    };

    match open::that_detached(url.as_str()) {
        Ok(()) => app.set_status(format!("Opened {}", url)),
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Failed to launch browser");
            app.set_status(format!("Failed to open browser: {}", e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{Fetcher, DEFAULT_MAX_FEED_BYTES};
    use crate::loader::FeedLoader;
    use crate::registry::{FeedRegistry, FeedSource};
    use crate::render::RenderSink;
    use std::time::Duration;

    fn test_app() -> App {
        let registry = FeedRegistry::new(vec![
            FeedSource::new("One", "http://127.0.0.1:9/one"),
            FeedSource::new("Two", "http://127.0.0.1:9/two"),
        ])
        .unwrap();
        let fetcher = Fetcher::new(Duration::from_secs(1), DEFAULT_MAX_FEED_BYTES).unwrap();
        App::new(FeedLoader::new(registry, fetcher, RenderSink::new()))
    }

    fn press(app: &mut App, code: KeyCode, tx: &mpsc::Sender<AppEvent>) -> Action {
        handle_input(app, code, KeyModifiers::NONE, tx)
    }

    #[tokio::test]
    async fn test_m_toggles_menu() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(4);

        press(&mut app, KeyCode::Char('m'), &tx);
        assert!(app.menu.is_visible());
        press(&mut app, KeyCode::Char('m'), &tx);
        assert!(app.menu.is_hidden());
    }

    #[tokio::test]
    async fn test_enter_in_menu_loads_and_hides() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(4);

        press(&mut app, KeyCode::Char('m'), &tx);
        press(&mut app, KeyCode::Down, &tx);
        press(&mut app, KeyCode::Enter, &tx);

        assert!(app.menu.is_hidden());
        assert_eq!(app.active_load.as_ref().map(|l| l.feed), Some(1));
    }

    #[tokio::test]
    async fn test_digit_past_registry_ignored() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(4);

        press(&mut app, KeyCode::Char('9'), &tx);
        assert!(app.active_load.is_none());

        press(&mut app, KeyCode::Char('2'), &tx);
        assert_eq!(app.active_load.as_ref().map(|l| l.feed), Some(1));
    }

    #[tokio::test]
    async fn test_help_captures_keys() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(4);

        press(&mut app, KeyCode::Char('?'), &tx);
        assert!(app.show_help);
        assert!(matches!(press(&mut app, KeyCode::Char('m'), &tx), Action::Continue));
        assert!(app.menu.is_hidden());
        press(&mut app, KeyCode::Esc, &tx);
        assert!(!app.show_help);
    }

    #[tokio::test]
    async fn test_quit_keys() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(4);

        assert!(matches!(press(&mut app, KeyCode::Char('q'), &tx), Action::Quit));
        assert!(matches!(
            handle_input(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL, &tx),
            Action::Quit
        ));
    }

    #[tokio::test]
    async fn test_open_without_entries_sets_status() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(4);

        press(&mut app, KeyCode::Char('o'), &tx);
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg, "No entry selected");
    }
}
