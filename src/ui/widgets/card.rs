//! Product card widget for the catalog grid

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::data::Product;

/// Rows a card occupies, borders included
pub const CARD_HEIGHT: u16 = 9;

/// A bordered card showing one product
///
/// The card title carries the product id so every card on screen is
/// identifiable by it.
pub struct ProductCard<'a> {
    /// Product to show
    product: &'a Product,
}

impl<'a> ProductCard<'a> {
    pub fn new(product: &'a Product) -> Self {
        Self { product }
    }

    fn title(&self) -> String {
        format!(" #{} ", self.product.id)
    }
}

impl<'a> Widget for ProductCard<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height < 3 {
            return;
        }

        let block = Block::default()
            .title(self.title())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Image
                Constraint::Length(1), // Title
                Constraint::Min(1),    // Description
                Constraint::Length(1), // Price
                Constraint::Length(1), // Category
            ])
            .split(inner);

        Paragraph::new(Line::from(vec![
            Span::styled("img ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                self.product.image.as_str(),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ]))
        .render(rows[0], buf);

        Paragraph::new(Span::styled(
            self.product.title.as_str(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .render(rows[1], buf);

        Paragraph::new(self.product.description.as_str())
            .style(Style::default().fg(Color::Gray))
            .wrap(Wrap { trim: true })
            .render(rows[2], buf);

        Paragraph::new(Span::styled(
            self.product.display_price(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
        .render(rows[3], buf);

        Paragraph::new(Span::styled(
            self.product.category.as_str(),
            Style::default().fg(Color::DarkGray),
        ))
        .render(rows[4], buf);
    }
}
