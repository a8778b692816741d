// Drawing - library list, dialog overlays and the status bar
// Everything here reads state, nothing here changes it

use crate::dialog::{DialogPhase, PlaylistAppendDialog, PlaylistCreationDialog};
use crate::library::StreamEntity;
use crate::playlist::PlaylistDuplicatesEntry;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn render_header(f: &mut Frame, area: Rect, marked: usize) {
    let title = format!("🎵 PanPipe - Add to Playlist  |  {} marked", marked);
    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

pub fn render_library(
    f: &mut Frame,
    area: Rect,
    streams: &[StreamEntity],
    marked: &BTreeSet<usize>,
    list_state: &mut ListState,
) {
    let items: Vec<ListItem> = streams
        .iter()
        .enumerate()
        .map(|(i, stream)| {
            let is_marked = marked.contains(&i);
            let content = library_row_label(stream, is_marked);

            let style = if is_marked {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(content).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Library"))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("► ");

    f.render_stateful_widget(list, area, list_state);
}

pub fn library_row_label(stream: &StreamEntity, is_marked: bool) -> String {
    let mark = if is_marked { "[x] " } else { "[ ] " };
    format!("{}{}", mark, stream.display_title())
}

/// Row text for a playlist, with the duplicate count when the track is already in it
pub fn playlist_row_label(entry: &PlaylistDuplicatesEntry) -> String {
    let name = entry.ordering_name().unwrap_or("(unnamed)");
    if entry.contains_duplicates() {
        format!("✓ {}  ({}x)", name, entry.times_stream_is_contained)
    } else {
        format!("  {}", name)
    }
}

pub fn render_append_dialog(f: &mut Frame, area: Rect, dialog: &PlaylistAppendDialog) {
    let popup_area = centered_rect(60, 70, area);
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" Add {} track(s) to playlist ", dialog.streams().len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .style(Style::default().bg(Color::Black));
    f.render_widget(block, popup_area);

    let inner = popup_area.inner(Margin { horizontal: 1, vertical: 1 });
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // filter
            Constraint::Length(if dialog.is_duplicate_indicator_visible() { 1 } else { 0 }),
            Constraint::Min(1),    // playlists
            Constraint::Length(1), // hints
        ])
        .split(inner);

    let filter = Paragraph::new(format!("🔍 Filter: {}", dialog.filter_text()))
        .style(Style::default().fg(Color::White));
    f.render_widget(filter, chunks[0]);

    if dialog.is_duplicate_indicator_visible() {
        let indicator = Paragraph::new("Playlists marked ✓ already contain this item")
            .style(Style::default().fg(Color::Yellow));
        f.render_widget(indicator, chunks[1]);
    }

    if dialog.is_list_visible() {
        let items: Vec<ListItem> = dialog
            .adapter()
            .items()
            .iter()
            .map(|entry| {
                let style = if entry.contains_duplicates() {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default().fg(Color::White)
                };
                ListItem::new(playlist_row_label(entry)).style(style)
            })
            .collect();

        let empty = items.is_empty();
        let list = List::new(items)
            .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(dialog.adapter().selected());
        f.render_stateful_widget(list, chunks[2], &mut list_state);

        if empty && matches!(dialog.phase(), DialogPhase::Listing { filtered: true }) {
            let none = Paragraph::new("No playlist matches the filter")
                .style(Style::default().fg(Color::Gray))
                .alignment(Alignment::Center);
            f.render_widget(none, chunks[2]);
        }
    } else {
        let loading = Paragraph::new("Loading playlists...")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center);
        f.render_widget(loading, chunks[2]);
    }

    let hints = Paragraph::new("↑↓: Navigate | Enter: Add | Ctrl+N: New playlist | Esc: Cancel")
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    f.render_widget(hints, chunks[3]);
}

pub fn render_creation_dialog(f: &mut Frame, area: Rect, dialog: &PlaylistCreationDialog) {
    let popup_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(4)),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area)[1];

    let input = Paragraph::new(format!("🎵 Playlist Name: {}", dialog.name()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(
                    "New playlist with {} track(s) - Enter to confirm, Esc to cancel",
                    dialog.streams().len()
                ))
                .border_style(Style::default().fg(Color::Blue)),
        )
        .style(Style::default().fg(Color::White).bg(Color::Black));

    f.render_widget(Clear, popup_area);
    f.render_widget(input, popup_area);
}

pub fn render_status_bar(
    f: &mut Frame,
    area: Rect,
    status_message: Option<&(String, Instant)>,
    toast_duration: Duration,
) {
    let status_text = match status_message {
        Some((message, shown_at)) if shown_at.elapsed() < toast_duration => message.as_str(),
        _ => "Space: mark | a: add to playlist | q: quit",
    };

    let status = Paragraph::new(status_text)
        .style(Style::default().fg(Color::Green))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, area);
}
