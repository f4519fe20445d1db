//! UI rendering module for shopgrid
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod catalog;
pub mod status;
pub mod widgets;

use ratatui::Frame;

use crate::app::{App, ViewState};
use crate::filter::filter_products;

/// Renders the UI based on the current view state
///
/// The filtered list is derived here from the current snapshot and search
/// term on every frame, so it can never lag behind either of them.
pub fn render(frame: &mut Frame, app: &App) {
    match app.view_state() {
        ViewState::Loading => status::render_loading(frame),
        ViewState::Error(message) => status::render_error(frame, &message),
        ViewState::Ready(products) => {
            let visible = filter_products(&products, &app.search_term);
            catalog::render(frame, app, &visible);
        }
    }
}
