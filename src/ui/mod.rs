//! UI module for rendering the TUI

mod components;
mod dashboard;
mod forms;
mod investments;
mod layout;

use crate::app::App;
use crate::state::View;
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let (header_area, body_area, status_area) = layout::chunks(area);

    layout::draw_header(frame, header_area, app);

    match app.state.current_view {
        View::Dashboard => dashboard::draw(frame, body_area, app),
        View::Investments => investments::draw(frame, body_area, app),
        View::TransactionCreate | View::InvestmentCreate | View::Register => {
            forms::draw(frame, body_area, app);
        }
    }

    layout::draw_status_bar(frame, status_area, app);
}
