use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Number of frames in the loading spinner animation.
pub(super) const SPINNER_FRAMES: usize = SPINNER.len();

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = match (&app.active_load, &app.status_message) {
        (Some(load), _) if app.is_loading() => {
            let name = app
                .registry()
                .get(load.feed)
                .map(|feed| feed.name())
                .unwrap_or("feed");
            Cow::Owned(format!(
                "{} {} {}...",
                SPINNER[app.spinner_frame % SPINNER_FRAMES],
                load.state().label(),
                name
            ))
        }
        (_, Some((msg, _))) => Cow::Borrowed(&**msg),
        _ if app.menu.is_visible() => {
            Cow::Borrowed("[j/k]move [Enter]load [m]close menu [?]help [q]uit")
        }
        _ => Cow::Borrowed("[m]enu [j/k]move [o]pen [r]eload [1-9]feed [?]help [q]uit"),
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}
