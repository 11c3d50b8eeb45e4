//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  This makes it easy to change the
//! visual layout without touching business logic.
//!
//! ## For contributors
//!
//! * The layout is a three-row split: the notification pane on top, the
//!   pending pane (with the URL draft line) below it, and a one-line status
//!   bar at the bottom.
//! * Recency buckets are recomputed from the raw timestamps on every frame,
//!   so a site quietly ages from "Just now" into "1 minute ago" without any
//!   backend traffic.
//! * Colours and styles are defined inline — feel free to extract them into
//!   constants or a theme struct if the palette grows.

use chrono::Utc;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, Mode, Pane};
use crate::recency::{classify, Recency};

/// Draw the complete UI for one frame.
///
/// Called once per tick from the main loop.  Delegates to helper functions
/// for each screen region.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [notification_area, pending_area, status_area] = Layout::vertical([
        Constraint::Percentage(60),
        Constraint::Min(6),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_notification_pane(app, frame, notification_area);
    draw_pending_pane(app, frame, pending_area);
    draw_status_bar(app, frame, status_area);
}

/// Bordered block for a pane, highlighted when it has focus.
fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let block = Block::default().title(title).borders(Borders::ALL);
    if focused {
        block.border_style(Style::default().fg(Color::Cyan))
    } else {
        block
    }
}

fn recency_style(bucket: &Recency) -> Style {
    let color = match bucket {
        Recency::JustNow | Recency::MinutesAgo(_) => Color::Green,
        Recency::HoursAgo(_) => Color::Cyan,
        Recency::DaysAgo(_) => Color::Yellow,
        Recency::StaleBeyondThreshold(_) | Recency::Invalid => Color::Red,
        Recency::NeverUpdated => Color::DarkGray,
    };
    Style::default().fg(color)
}

/// Render the monitored sites with their recency buckets.
fn draw_notification_pane(app: &mut App, frame: &mut Frame, area: Rect) {
    let now = Utc::now();
    let items = app.notification_items();
    let list_items: Vec<ListItem> = items
        .iter()
        .map(|site| {
            let bucket = classify(site.last_updated.as_deref(), now);

            let line = Line::from(vec![
                Span::styled(format!("{:<24}", bucket.to_string()), recency_style(&bucket)),
                Span::raw(" "),
                Span::styled(&site.title, Style::default().fg(Color::White)),
            ]);

            ListItem::new(line)
        })
        .collect();

    let title = if app.sorted_by_recency() {
        " Notification Sites (latest first) "
    } else {
        " Notification Sites "
    };

    let list = List::new(list_items)
        .block(pane_block(title, app.focus == Pane::Notification))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.notification_state);
}

/// Render the URL draft line and the submitted URLs below it.
fn draw_pending_pane(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = pane_block(" Pending Sites ", app.focus == Pane::Pending);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [draft_area, list_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);

    draw_draft_line(app, frame, draft_area);

    let items = app.pending_items();
    let list_items: Vec<ListItem> = items
        .iter()
        .map(|site| {
            ListItem::new(Line::from(Span::styled(
                &site.url,
                Style::default().fg(Color::White),
            )))
        })
        .collect();

    let list = List::new(list_items)
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, list_area, &mut app.pending_state);
}

fn draw_draft_line(app: &App, frame: &mut Frame, area: Rect) {
    let line = if app.mode == Mode::EditingUrl {
        Line::from(vec![
            Span::styled("URL> ", Style::default().fg(Color::Yellow)),
            Span::raw(&app.draft),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ])
    } else if app.draft.is_empty() {
        Line::from(Span::styled(
            "URL> e.g., https://example.com",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        // A failed add leaves the draft behind for correction; keep it
        // visible outside edit mode too.
        Line::from(vec![
            Span::styled("URL> ", Style::default().fg(Color::DarkGray)),
            Span::raw(&app.draft),
        ])
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the bottom status bar: confirmation prompts take it over, edit
/// mode shows its own hints, otherwise status message + counts + keys.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let prompt_style = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);

    let line = match app.mode {
        Mode::ConfirmDelete => {
            let question = match app.pending_delete.as_ref() {
                Some(target) if target.label != target.url => {
                    format!(" Delete {} - {}? ", target.label, target.url)
                }
                Some(target) => format!(" Delete {}? ", target.url),
                None => " Delete? ".to_string(),
            };
            Line::from(vec![
                Span::styled(question, prompt_style),
                Span::raw(" y: delete  n: keep"),
            ])
        }
        Mode::ConfirmPromote => Line::from(vec![
            Span::styled(" Promote every pending site to notification? ", prompt_style),
            Span::raw(" y: promote  n: keep"),
        ]),
        Mode::EditingUrl => Line::from(vec![
            Span::styled(" Editing URL ", Style::default().fg(Color::Yellow)),
            Span::raw(" Enter: submit  Esc: keep draft"),
        ]),
        Mode::Normal => {
            let (notification_count, pending_count) = app.counts();
            let mut spans = vec![Span::raw(" ")];
            if app.busy {
                spans.push(Span::styled("⟳ ", Style::default().fg(Color::Cyan)));
            }
            spans.push(Span::styled(&app.status, Style::default().fg(Color::Yellow)));
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format!("{notification_count} notification / {pending_count} pending"),
                Style::default().fg(Color::Green),
            ));
            spans.push(Span::raw(
                "  q: quit  Tab: pane  a: add  d: delete  p: promote  r: refresh  s: sort  o: open",
            ));
            Line::from(spans)
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}
