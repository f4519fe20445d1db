//! Catalog screen rendering
//!
//! Renders the search bar, the responsive grid of product cards and a
//! footer with the match count and key bindings.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::widgets::{ProductCard, CARD_HEIGHT};
use crate::app::App;
use crate::data::Product;

/// Number of grid columns for a terminal width
///
/// One column on narrow terminals, two from 80 columns, three from 120.
pub fn grid_columns(width: u16) -> usize {
    if width >= 120 {
        3
    } else if width >= 80 {
        2
    } else {
        1
    }
}

/// First row to draw, keeping at least the last row on screen
fn clamp_scroll(scroll_row: usize, total_rows: usize) -> usize {
    scroll_row.min(total_rows.saturating_sub(1))
}

/// Renders the catalog screen for a loaded snapshot
///
/// # Arguments
/// * `frame` - The ratatui Frame to render to
/// * `app` - The application state holding the search term and scroll offset
/// * `products` - Products matching the search term, in catalog order
pub fn render(frame: &mut Frame, app: &App, products: &[&Product]) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Length(3), // Search bar
            Constraint::Min(0),    // Grid
            Constraint::Length(1), // Footer
        ])
        .split(area);

    render_header(frame, chunks[0]);
    render_search(frame, chunks[1], &app.search_term);
    render_grid(frame, chunks[2], products, app.scroll_row);
    render_footer(frame, chunks[3], products.len(), app.is_refreshing());
}

fn render_header(frame: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            "SHOPGRID",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Product catalog", Style::default().fg(Color::White)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Renders the search input with its current value
fn render_search(frame: &mut Frame, area: Rect, term: &str) {
    let content = if term.is_empty() {
        Line::from(vec![
            Span::styled("\u{25B8} ", Style::default().fg(Color::Cyan)), // ▸
            Span::styled("Search", Style::default().fg(Color::DarkGray)),
        ])
    } else {
        Line::from(vec![
            Span::styled("\u{25B8} ", Style::default().fg(Color::Cyan)),
            Span::styled(term, Style::default().fg(Color::White)),
            Span::styled("\u{258F}", Style::default().fg(Color::Cyan)), // ▏ cursor
        ])
    };

    let block = Block::default()
        .title(" Search ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Paragraph::new(content).block(block), area);
}

/// Renders the visible rows of cards
///
/// An empty product list renders an empty area.
fn render_grid(frame: &mut Frame, area: Rect, products: &[&Product], scroll_row: usize) {
    if products.is_empty() || area.height == 0 {
        return;
    }

    let columns = grid_columns(area.width);
    let total_rows = products.len().div_ceil(columns);
    let visible_rows = usize::from((area.height / CARD_HEIGHT).max(1));
    let first_row = clamp_scroll(scroll_row, total_rows);
    let last_row = (first_row + visible_rows).min(total_rows);

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
        .split(area);

    for (slot, row) in (first_row..last_row).enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
            .split(row_areas[slot]);

        for (column, cell) in cells.iter().enumerate() {
            if let Some(product) = products.get(row * columns + column) {
                frame.render_widget(ProductCard::new(product), *cell);
            }
        }
    }
}

/// Renders the match count and key bindings
fn render_footer(frame: &mut Frame, area: Rect, matches: usize, refreshing: bool) {
    let noun = if matches == 1 { "product" } else { "products" };
    let mut spans = vec![Span::styled(
        format!("{} {}", matches, noun),
        Style::default().fg(Color::White),
    )];
    if refreshing {
        spans.push(Span::styled(
            " (Refreshing...)",
            Style::default().fg(Color::Cyan),
        ));
    }
    spans.extend([
        Span::raw("  "),
        Span::styled("Type", Style::default().fg(Color::Yellow)),
        Span::raw(" Search  "),
        Span::styled("Ctrl+U", Style::default().fg(Color::Yellow)),
        Span::raw(" Clear  "),
        Span::styled("↑/↓ PgUp/PgDn", Style::default().fg(Color::Yellow)),
        Span::raw(" Scroll  "),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::raw(" Quit"),
    ]);
    let line = Line::from(spans);

    frame.render_widget(
        Paragraph::new(line).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
