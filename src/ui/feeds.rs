use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Render the feed menu panel
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let loading = app.active_load.as_ref().filter(|_| app.is_loading());

    let items: Vec<ListItem> = app
        .registry()
        .iter()
        .enumerate()
        .map(|(i, feed)| {
            let style = if app.displayed.feed == Some(i) {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let mut spans = vec![
                Span::styled(format!("{} ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(feed.name(), style),
            ];
            if loading.is_some_and(|load| load.feed == i) {
                spans.push(Span::styled(" …", Style::default().fg(Color::Yellow)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(format!("Feeds ({})", app.registry().len())),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    state.select(Some(app.menu_cursor));
    f.render_stateful_widget(list, area, &mut state);
}
