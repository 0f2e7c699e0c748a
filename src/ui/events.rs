//! Application event handling.
//!
//! Processes completion events from background load tasks.

use crate::app::{App, AppEvent};

pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::LoadFinished(outcome) => {
            tracing::debug!(feed = outcome.feed(), rendered = outcome.is_rendered(), "Load finished");
            app.handle_load_finished(outcome);
        }
    }
}
