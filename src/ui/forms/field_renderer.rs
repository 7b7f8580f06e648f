//! Field rendering driven by the registry's render strategy

use crate::forms::{format_value, render_strategy, FieldDescriptor, FieldValue, RenderStrategy};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Everything needed to draw one field
pub struct FieldRender<'a> {
    pub descriptor: &'a FieldDescriptor,
    pub value: Option<&'a FieldValue>,
    pub is_active: bool,
    pub required: bool,
    pub disabled: bool,
    pub error: Option<&'a str>,
    /// Highlighted option row for choice fields
    pub choice_cursor: usize,
}

/// Rows a field occupies in the form column
pub fn field_height(descriptor: &FieldDescriptor) -> u16 {
    match render_strategy(descriptor.ty) {
        RenderStrategy::MultilineInput => 5,
        RenderStrategy::ChoiceList | RenderStrategy::MultiChoiceList => {
            descriptor.options.len() as u16 + 2
        }
        _ => 3,
    }
}

/// Draw one form field
pub fn draw_field(frame: &mut Frame, area: Rect, field: &FieldRender) {
    let border_style = if field.error.is_some() {
        Style::default().fg(Color::Red)
    } else if field.is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let value_style = if field.disabled {
        Style::default().fg(Color::DarkGray)
    } else if field.is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let label = if field.required {
        format!(" {} * ", field.descriptor.label)
    } else {
        format!(" {} ", field.descriptor.label)
    };
    let mut block = Block::default()
        .title(label)
        .borders(Borders::ALL)
        .border_style(border_style);
    if let Some(error) = field.error {
        block = block.title_bottom(
            Line::from(Span::styled(
                format!(" {error} "),
                Style::default().fg(Color::Red),
            ))
            .right_aligned(),
        );
    }

    let content = match render_strategy(field.descriptor.ty) {
        RenderStrategy::ChoiceList => choice_lines(field, false),
        RenderStrategy::MultiChoiceList => choice_lines(field, true),
        RenderStrategy::Toggle => toggle_line(field),
        strategy => input_lines(field, strategy),
    };

    frame.render_widget(
        Paragraph::new(content)
            .style(value_style)
            .wrap(Wrap { trim: false })
            .block(block),
        area,
    );
}

fn display_text(field: &FieldRender) -> String {
    let raw = field.value.map(FieldValue::as_text).unwrap_or_default();
    // Formatted display while the field is not being edited
    if !field.is_active {
        if let Some(rule) = &field.descriptor.formatting {
            if !raw.is_empty() {
                return format_value(&raw, rule);
            }
        }
    }
    raw
}

fn input_lines<'a>(field: &FieldRender, strategy: RenderStrategy) -> Vec<Line<'a>> {
    let mut text = display_text(field);
    if strategy == RenderStrategy::MaskedInput {
        text = "•".repeat(text.chars().count());
    }
    if text.is_empty() && !field.is_active {
        let placeholder = field
            .descriptor
            .placeholder
            .clone()
            .unwrap_or_else(|| "(empty)".to_string());
        return vec![Line::from(Span::styled(
            placeholder,
            Style::default().fg(Color::DarkGray),
        ))];
    }

    let cursor = if field.is_active { "▌" } else { "" };
    let mut lines: Vec<Line> = text
        .split('\n')
        .map(|l| Line::from(l.to_string()))
        .collect();
    if field.is_active {
        if let Some(last) = lines.last_mut() {
            last.spans
                .push(Span::styled(cursor, Style::default().fg(Color::Cyan)));
        }
    }
    lines
}

fn choice_lines<'a>(field: &FieldRender, multi: bool) -> Vec<Line<'a>> {
    let selected_single = field.value.map(FieldValue::as_text).unwrap_or_default();
    field
        .descriptor
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let picked = if multi {
                field
                    .value
                    .and_then(FieldValue::as_list)
                    .map(|items| items.iter().any(|v| *v == option.value))
                    .unwrap_or(false)
            } else {
                option.value == selected_single
            };
            let marker = match (multi, picked) {
                (true, true) => "[x]",
                (true, false) => "[ ]",
                (false, true) => "(•)",
                (false, false) => "( )",
            };
            let style = if field.is_active && i == field.choice_cursor {
                Style::default().fg(Color::Cyan)
            } else if option.disabled {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            Line::from(Span::styled(format!("{marker} {}", option.label), style))
        })
        .collect()
}

fn toggle_line<'a>(field: &FieldRender) -> Vec<Line<'a>> {
    let on = field.value.and_then(FieldValue::as_bool).unwrap_or(false);
    let text = if on { "[on]" } else { "[off]" };
    let color = if on { Color::Green } else { Color::DarkGray };
    vec![Line::from(Span::styled(
        text,
        Style::default().fg(color),
    ))]
}
