//! Help overlay: a centered table of keybindings.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Row, Table},
    Frame,
};

const BINDINGS: [(&str, &str); 10] = [
    ("m", "Show/hide the feed menu"),
    ("j / Down", "Next entry (or feed in menu)"),
    ("k / Up", "Previous entry (or feed in menu)"),
    ("Enter", "Load highlighted feed (menu)"),
    ("1-9", "Load feed by number"),
    ("r", "Reload current feed"),
    ("o", "Open entry in browser"),
    ("?", "Toggle this help"),
    ("Esc", "Close menu or help"),
    ("q", "Quit"),
];

/// Render the help overlay on top of the current view.
pub fn render(f: &mut Frame) {
    let overlay = centered_rect(60, 60, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    f.render_widget(Clear, overlay);

    let rows = BINDINGS
        .iter()
        .map(|(key, description)| Row::new(vec![format!("  {}", key), description.to_string()]));

    let table = Table::new(rows, [Constraint::Length(12), Constraint::Min(20)])
        .block(Block::default().borders(Borders::ALL).title(" Help (? to close) "))
        .header(
            Row::new(vec!["Key", "Action"])
                .style(
                    Style::default()
                        .add_modifier(Modifier::BOLD)
                        .add_modifier(Modifier::UNDERLINED),
                )
                .bottom_margin(1),
        );

    f.render_widget(table, overlay);
}

/// Create a centered rectangle with the given percentage of the parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = (area.width as u32 * percent_x as u32 / 100) as u16;
    let height = (area.height as u32 * percent_y as u32 / 100) as u16;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_stays_inside_parent() {
        let parent = Rect::new(0, 0, 100, 40);
        let r = centered_rect(60, 60, parent);
        assert_eq!((r.width, r.height), (60, 24));
        assert_eq!((r.x, r.y), (20, 8));
    }

    #[test]
    fn test_centered_rect_on_very_wide_terminal() {
        let parent = Rect::new(0, 0, 2000, 20);
        let r = centered_rect(60, 60, parent);
        assert_eq!((r.width, r.height), (1200, 12));
        assert_eq!((r.x, r.y), (400, 4));
    }
}
