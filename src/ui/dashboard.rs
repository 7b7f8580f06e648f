//! Dashboard view: balance summary and transaction table

use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(4)])
        .split(area);

    draw_summary(frame, chunks[0], app);
    draw_transactions(frame, chunks[1], app);
}

fn draw_summary(frame: &mut Frame, area: Rect, app: &App) {
    let symbol = app.config.currency_symbol.as_deref().unwrap_or("$");
    let net = app.state.net_balance();
    let net_color = if net < 0.0 { Color::Red } else { Color::Green };

    let line = Line::from(vec![
        Span::raw(" Income "),
        Span::styled(
            format!("{symbol}{:.2}", app.state.total_income()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("   Expenses "),
        Span::styled(
            format!("{symbol}{:.2}", app.state.total_expenses()),
            Style::default().fg(Color::Red),
        ),
        Span::raw("   Net "),
        Span::styled(
            format!("{symbol}{net:.2}"),
            Style::default().fg(net_color).add_modifier(Modifier::BOLD),
        ),
    ]);

    let block = Block::default().borders(Borders::ALL).title(" Overview ");
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_transactions(frame: &mut Frame, area: Rect, app: &App) {
    let title = format!(
        " Transactions · {} {} ",
        app.state.transaction_sort_field.label(),
        app.state.transaction_sort_direction.symbol()
    );
    let block = Block::default().borders(Borders::ALL).title(title);

    let transactions = app.state.sorted_transactions();
    if transactions.is_empty() {
        let empty = Paragraph::new("  No transactions yet. Press 't' to add one.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty.block(block), area);
        return;
    }

    let header = Row::new(vec!["Date", "Type", "Category", "Description", "Amount"])
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    let rows = transactions.iter().enumerate().map(|(i, txn)| {
        let amount_color = if txn.is_expense() {
            Color::Red
        } else {
            Color::Green
        };
        let style = if i == app.state.selected_index {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        Row::new(vec![
            Cell::from(txn.date.to_string()),
            Cell::from(txn.kind.clone()),
            Cell::from(txn.category.clone().unwrap_or_default()),
            Cell::from(txn.description.clone().unwrap_or_default()),
            Cell::from(format!("{:.2} {}", txn.signed_amount(), txn.currency))
                .style(Style::default().fg(amount_color)),
        ])
        .style(style)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(14),
            Constraint::Min(16),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(block);

    frame.render_widget(table, area);
}
