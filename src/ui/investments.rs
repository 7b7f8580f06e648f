//! Investments table view

use crate::app::App;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL).title(" Investments ");

    if app.state.investments.is_empty() {
        let empty = Paragraph::new("  No investments yet. Press 'i' to add one.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty.block(block), area);
        return;
    }

    let header = Row::new(vec![
        "Symbol",
        "Type",
        "Shares",
        "Price",
        "Cost basis",
        "Purchased",
        "Gain/Loss",
    ])
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    let rows = app.state.investments.iter().enumerate().map(|(i, inv)| {
        let style = if i == app.state.selected_index {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        let performance = match inv.performance() {
            Some(gain) => {
                let color = if gain < 0.0 { Color::Red } else { Color::Green };
                Cell::from(format!("{gain:+.2}")).style(Style::default().fg(color))
            }
            None => Cell::from("—").style(Style::default().fg(Color::DarkGray)),
        };
        Row::new(vec![
            Cell::from(inv.symbol.clone()),
            Cell::from(inv.asset_type.clone()),
            Cell::from(format!("{}", inv.shares)),
            Cell::from(format!("{:.2}", inv.price_per_share)),
            Cell::from(format!("{:.2}", inv.cost_basis())),
            Cell::from(inv.purchase_date.to_string()),
            performance,
        ])
        .style(style)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(block);

    frame.render_widget(table, area);
}
