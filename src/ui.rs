use crate::app::{App, Focus};
use crate::domain::Entry;
use chrono::{DateTime, Local};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Alignment, Color, Line, Modifier, Span, Style};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use std::time::SystemTime;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_location(frame, app, outer[0]);
    draw_list(frame, app, outer[1]);
    draw_input(frame, app, outer[2]);
    draw_message(frame, app, outer[3]);
    draw_status_bar(frame, app, outer[4]);
}

fn draw_location(frame: &mut Frame, app: &App, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", app.workflow.kind().title()),
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::raw(app.engine.location().display().to_string()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let viewport_rows = area.height.saturating_sub(2) as usize;
    app.sync_list_scroll(viewport_rows);
    let app: &App = app;

    let details = app.config.show_details;
    let items: Vec<ListItem> = app
        .engine
        .visible_entries()
        .iter()
        .map(|entry| ListItem::new(format_entry(app, entry, details)))
        .collect();

    let border_style = if app.focus == Focus::List {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let title = match app.active_filter_name() {
        Some(filter) => format!(" Entries [{filter}] "),
        None => " Entries ".to_string(),
    };

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut state = ListState::default().with_offset(app.list_scroll());
    state.select(app.engine.highlighted_index());
    frame.render_stateful_widget(list, area, &mut state);
}

fn format_entry(app: &App, entry: &Entry, details: bool) -> String {
    let icon = app.icons.icon(entry);
    let mut name = entry.to_string();
    if entry.kind.is_symlink() {
        name.push_str(" ->");
    }
    if !details || entry.is_parent() {
        return format!("{icon} {name}");
    }

    let size = if entry.is_directory() {
        String::new()
    } else {
        human_size(entry.size)
    };
    format!(
        "{icon} {name:<40} {size:>9}  {}",
        format_mtime(entry.modified)
    )
}

pub(crate) fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["K", "M", "G", "T"];
    if bytes < 1024 {
        return format!("{bytes}B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1}{}", UNITS[unit])
}

pub(crate) fn format_mtime(modified: SystemTime) -> String {
    let local: DateTime<Local> = modified.into();
    local.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let border_style = if app.focus == Focus::Input {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let input = app.workflow.input();
    let mut spans = vec![Span::raw(input.to_string())];
    if let Some(rest) = app
        .suggestion()
        .and_then(|suggestion| suggestion.strip_prefix(input))
    {
        spans.push(Span::styled(
            rest.to_string(),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let label = format!(" {} ", app.workflow.kind().select_label());
    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(label)
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(paragraph, area);

    if app.focus == Focus::Input {
        frame.set_cursor_position(input_cursor(area, input));
    }
}

fn input_cursor(area: Rect, input: &str) -> (u16, u16) {
    let typed = u16::try_from(input.chars().count()).unwrap_or(u16::MAX);
    let x = area.x.saturating_add(1).saturating_add(typed);
    (x.min(area.right().saturating_sub(2)), area.y.saturating_add(1))
}

fn draw_message(frame: &mut Frame, app: &App, area: Rect) {
    let line = match app.workflow.error() {
        Some(error) => Line::from(Span::styled(
            format!(" {error}"),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        None => Line::from(Span::styled(
            app.logs
                .last()
                .map(|line| format!(" {line}"))
                .unwrap_or_default(),
            Style::default().fg(Color::Gray),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let busy = if app.is_scanning() { "SCAN" } else { "IDLE" };
    let hints = match app.focus {
        Focus::List => {
            "j/k move | enter open | bksp up | . hidden | s sort | f filter | tab input | ^S select | esc cancel"
        }
        Focus::Input => "enter submit | tab complete | up/down list | ^S select | esc cancel",
    };
    let text = Line::from(vec![
        Span::styled(
            format!(" {busy} "),
            if app.is_scanning() {
                Style::default().bg(Color::Yellow).fg(Color::Black)
            } else {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            },
        ),
        Span::raw("  "),
        Span::styled(hints, Style::default().fg(Color::Gray)),
    ]);

    let paragraph = Paragraph::new(text).alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}
