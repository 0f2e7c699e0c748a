use crate::app::App;
use crate::util::truncate_to_width;
use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

/// Format a publication date relative to `now` ("5m", "3h", "2d", "Sep 06").
pub fn format_relative_time(published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(ts) = published else {
        return String::new();
    };

    let diff = (now - ts).num_seconds();

    // future dates come from malformed feeds
    if diff < 0 {
        return "now".to_string();
    }
    if diff < 3600 {
        return format!("{}m", diff / 60);
    }
    if diff < 86400 {
        return format!("{}h", diff / 3600);
    }
    if diff < 604800 {
        return format!("{}d", diff / 86400);
    }
    ts.format("%b %d").to_string()
}

/// Render the entry list plus a detail pane for the selected entry.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(6)])
        .split(area);

    render_list(f, app, chunks[0]);
    render_detail(f, app, chunks[1]);
}

fn render_list(f: &mut Frame, app: &App, area: Rect) {
    let now = Utc::now();
    // borders plus the "  12d" column
    let title_width = area.width.saturating_sub(10) as usize;

    let items: Vec<ListItem> = if app.displayed.feed.is_none() {
        vec![ListItem::new("Nothing loaded yet")]
    } else if app.entries().is_empty() {
        vec![ListItem::new("No entries")]
    } else {
        app.entries()
            .iter()
            .map(|entry| {
                let mut spans = vec![Span::styled(
                    truncate_to_width(&entry.title, title_width).into_owned(),
                    Style::default().add_modifier(Modifier::BOLD),
                )];
                let time_str = format_relative_time(entry.published, now);
                if !time_str.is_empty() {
                    spans.push(Span::styled(
                        format!("  {}", time_str),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect()
    };

    let title = match app.displayed_feed() {
        Some(feed) => format!("{} ({})", feed.name(), app.entries().len()),
        None => "Entries".to_string(),
    };

    let border_style = if app.menu.is_hidden() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    if !app.entries().is_empty() {
        state.select(Some(app.selected_entry));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn render_detail(f: &mut Frame, app: &App, area: Rect) {
    let text = match app.selected_entry() {
        Some(entry) => {
            let summary = if entry.summary.is_empty() {
                "(no summary)"
            } else {
                entry.summary.as_str()
            };
            vec![
                Line::from(Span::styled(
                    entry.link.as_str(),
                    Style::default().fg(Color::Blue),
                )),
                Line::from(summary),
            ]
        }
        None => vec![Line::from("")],
    };

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Summary"))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
