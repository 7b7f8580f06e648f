//! Top-level layout: header tabs, body, status bar

use crate::app::App;
use crate::state::View;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Split the screen into header, body, and status bar
pub fn chunks(area: Rect) -> (Rect, Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);
    (rows[0], rows[1], rows[2])
}

/// Draw the header with view tabs and connection state
pub fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        " finch ",
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    )];

    for view in [View::Dashboard, View::Investments] {
        let style = if app.state.current_view == view {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", view.title()), style));
    }

    if app.state.current_view.is_form_view() {
        spans.push(Span::styled(
            format!(" {} ", app.state.current_view.title()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    }

    let connection = if app.state.api_connected {
        Span::styled("connected", Style::default().fg(Color::Green))
    } else {
        Span::styled("offline", Style::default().fg(Color::Red))
    };
    spans.push(Span::raw("  "));
    spans.push(connection);

    let header = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

/// Draw the status bar: pending error, transient status, or key hints
pub fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let line = if let Some(error) = app.state.current_error() {
        Line::from(vec![
            Span::styled(
                " error ",
                Style::default().fg(Color::Black).bg(Color::Red),
            ),
            Span::styled(format!(" {error} (Enter to dismiss)"), Style::default().fg(Color::Red)),
        ])
    } else if let Some(message) = &app.status_message {
        Line::from(Span::styled(
            format!(" {message}"),
            Style::default().fg(Color::Green),
        ))
    } else {
        hint_line(app)
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn hint_line(app: &App) -> Line<'static> {
    let hints: &[(&str, &str)] = match app.state.current_view {
        View::Dashboard => &[
            ("t", "new transaction"),
            ("s", "sort"),
            ("d", "direction"),
            ("r", "refresh"),
            ("Tab", "investments"),
            ("q", "quit"),
        ],
        View::Investments => &[
            ("i", "new investment"),
            ("r", "refresh"),
            ("Tab", "dashboard"),
            ("q", "quit"),
        ],
        _ => &[
            ("Tab", "next field"),
            (crate::platform::SAVE_SHORTCUT, "submit"),
            ("Esc", "cancel"),
        ],
    };
    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(
            format!(" {key}"),
            Style::default().fg(Color::Cyan),
        ));
        spans.push(Span::styled(
            format!(" {label} "),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}
