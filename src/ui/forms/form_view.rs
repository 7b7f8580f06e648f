//! Whole-form rendering: fields, banner, buttons row

use super::field_renderer::{draw_field, field_height, FieldRender};
use crate::app::App;
use crate::forms::{AutoSaveStatus, FieldDescriptor, FormLayout, FormOrchestrator};
use crate::ui::components::{render_button, BUTTON_HEIGHT};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Draw the mounted form
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let Some(form) = &app.form else {
        return;
    };

    let title = form
        .config()
        .title
        .clone()
        .map(|t| format!(" {t} "))
        .unwrap_or_default();
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(4),
            Constraint::Length(1),
            Constraint::Length(BUTTON_HEIGHT),
        ])
        .split(inner);

    draw_fields(frame, rows[0], form);
    draw_banner(frame, rows[1], form);
    draw_buttons(frame, rows[2], app, form);
}

fn draw_fields(frame: &mut Frame, area: Rect, form: &FormOrchestrator) {
    let fields = form.visible_fields();
    let indexed: Vec<(usize, &FieldDescriptor)> = fields.into_iter().enumerate().collect();
    match form.config().layout {
        FormLayout::TwoColumn | FormLayout::Grid => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(area);
            let (left, right): (Vec<_>, Vec<_>) =
                indexed.into_iter().partition(|(i, _)| i % 2 == 0);
            draw_column(frame, columns[0], form, &left);
            draw_column(frame, columns[1], form, &right);
        }
        FormLayout::Single => {
            draw_column(frame, area, form, &indexed);
        }
    }
}

fn draw_column(
    frame: &mut Frame,
    area: Rect,
    form: &FormOrchestrator,
    fields: &[(usize, &FieldDescriptor)],
) {
    let mut y = area.y;
    for &(index, descriptor) in fields {
        let height = field_height(descriptor).min(area.bottom().saturating_sub(y));
        if height < 3 {
            break;
        }
        let slot = Rect::new(area.x, y, area.width, height);
        let flags = form.visibility().flags(&descriptor.name);
        let own_required = descriptor
            .validation
            .as_ref()
            .map(|r| r.required)
            .unwrap_or(false);
        draw_field(
            frame,
            slot,
            &FieldRender {
                descriptor,
                value: form.state().get(&descriptor.name),
                is_active: form.active_field_index() == index && !form.is_buttons_row_active(),
                required: own_required || flags.required,
                disabled: flags.disabled,
                error: form.field_error(&descriptor.name),
                choice_cursor: form.choice_cursor(),
            },
        );
        y += height;
    }
}

/// One-line banner: form-level error, else auto-save state
fn draw_banner(frame: &mut Frame, area: Rect, form: &FormOrchestrator) {
    let line = if let Some(error) = form.form_error() {
        Line::from(Span::styled(
            format!(" {error}"),
            Style::default().fg(Color::Red),
        ))
    } else {
        match form.auto_save_status() {
            AutoSaveStatus::Saving => Line::from(Span::styled(
                " Saving…",
                Style::default().fg(Color::Yellow),
            )),
            AutoSaveStatus::Saved { .. } => Line::from(Span::styled(
                " Draft saved",
                Style::default().fg(Color::Green),
            )),
            AutoSaveStatus::Error { message, .. } => Line::from(Span::styled(
                format!(" {message}"),
                Style::default().fg(Color::Red),
            )),
            AutoSaveStatus::Idle => Line::default(),
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_buttons(frame: &mut Frame, area: Rect, app: &App, form: &FormOrchestrator) {
    let config = form.config();
    let mut labels: Vec<(&str, Option<Color>)> =
        vec![(config.submit_text.as_str(), Some(Color::Green))];
    if config.show_reset {
        labels.push((config.reset_text.as_str(), Some(Color::Yellow)));
    }
    labels.push(("Cancel", Some(Color::Gray)));

    let constraints: Vec<Constraint> = labels
        .iter()
        .map(|(label, _)| Constraint::Length(label.chars().count() as u16 + 4))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();
    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    let buttons_active = form.is_buttons_row_active();
    for (i, (label, accent)) in labels.iter().enumerate() {
        render_button(
            frame,
            slots[i],
            label,
            buttons_active && app.state.form_button == i,
            *accent,
        );
    }
}
