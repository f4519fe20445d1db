//! Loading and error screens

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Paragraph, Wrap},
    Frame,
};

/// Centers a block of `height` rows vertically
fn centered_row(area: Rect, height: u16) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(height),
            Constraint::Percentage(45),
        ])
        .split(area);
    chunks[1]
}

/// Renders a loading message while the catalog is being fetched
pub fn render_loading(frame: &mut Frame) {
    let area = centered_row(frame.area(), 3);

    let loading_text = Paragraph::new("Loading...")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);

    frame.render_widget(loading_text, area);
}

/// Renders the error message of a failed fetch
pub fn render_error(frame: &mut Frame, message: &str) {
    let area = centered_row(frame.area(), 3);

    let error_text = Paragraph::new(format!("Error: {}", message))
        .style(Style::default().fg(Color::Red))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(error_text, area);
}
