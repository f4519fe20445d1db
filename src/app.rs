//! Application state management for shopgrid
//!
//! This module contains the catalog view state: the search term, grid
//! scrolling, keyboard handling, and the query subscription that supplies
//! the product snapshot.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::cli::StartupConfig;
use crate::data::{CatalogError, Product, ProductSource};
use crate::filter::filter_products;
use crate::query::{fetcher, Fetcher, QueryError, QueryLayer, QueryState};
use crate::ui::catalog::grid_columns;

/// Cache key under which the product list is stored
pub const PRODUCTS_QUERY_KEY: &str = "products";

/// Number of grid rows moved by PageUp/PageDown
const PAGE_ROWS: usize = 5;

/// Message shown for errors the view does not recognise
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Query layer specialised to the product catalog
pub type ProductQuery = dyn QueryLayer<Vec<Product>, CatalogError>;

/// What the view should render right now
#[derive(Debug, Clone)]
pub enum ViewState {
    /// Waiting for the first result
    Loading,
    /// The fetch failed; holds the message to display
    Error(String),
    /// Catalog snapshot available
    Ready(Arc<Vec<Product>>),
}

impl ViewState {
    fn from_query(state: QueryState<Vec<Product>, CatalogError>) -> Self {
        match state {
            QueryState::Pending => ViewState::Loading,
            QueryState::Success(products) => ViewState::Ready(products),
            QueryState::Error(err) => ViewState::Error(error_message(&err)),
        }
    }
}

/// Picks the message to show for a failed query
pub fn error_message(err: &QueryError<CatalogError>) -> String {
    match err {
        QueryError::Failed(err) => err.to_string(),
        QueryError::Unknown(_) => UNKNOWN_ERROR_MESSAGE.to_string(),
    }
}

/// Main application struct: one mounted catalog view
pub struct App {
    /// Current search term, replaced wholesale on every edit
    pub search_term: String,
    /// First grid row shown
    pub scroll_row: usize,
    /// Cards per grid row at the current terminal width
    columns: usize,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Request cache supplying the products
    query: Arc<ProductQuery>,
}

impl App {
    /// Mounts the view: subscribes to the product query
    ///
    /// The fetch itself runs in the background; the view starts in
    /// [`ViewState::Loading`] unless the query layer already holds data.
    pub fn new(query: Arc<ProductQuery>, source: Arc<dyn ProductSource>) -> Self {
        let products: Fetcher<Vec<Product>, CatalogError> = fetcher(move || {
            let source = Arc::clone(&source);
            async move { source.fetch_products().await }
        });
        let initial = query.query(PRODUCTS_QUERY_KEY, &products);
        tracing::debug!(pending = initial.is_pending(), "catalog view mounted");

        Self {
            search_term: String::new(),
            scroll_row: 0,
            columns: 1,
            should_quit: false,
            query,
        }
    }

    /// Mounts the view and applies startup options such as an initial search
    pub fn with_startup_config(
        query: Arc<ProductQuery>,
        source: Arc<dyn ProductSource>,
        config: &StartupConfig,
    ) -> Self {
        let mut app = Self::new(query, source);
        if let Some(term) = &config.initial_search {
            app.set_search_term(term.clone());
        }
        app
    }

    /// Current render state, read from the query layer
    pub fn view_state(&self) -> ViewState {
        ViewState::from_query(self.query.state(PRODUCTS_QUERY_KEY))
    }

    /// Returns true while stale data is shown and a refetch is running
    pub fn is_refreshing(&self) -> bool {
        matches!(self.view_state(), ViewState::Ready(_))
            && self.query.is_fetching(PRODUCTS_QUERY_KEY)
    }

    /// Products matching the search term, in catalog order
    ///
    /// Empty unless the catalog has loaded.
    pub fn visible_products(&self) -> Vec<Product> {
        match self.view_state() {
            ViewState::Ready(products) => filter_products(&products, &self.search_term)
                .into_iter()
                .cloned()
                .collect(),
            ViewState::Loading | ViewState::Error(_) => Vec::new(),
        }
    }

    /// Number of products matching the search term
    fn visible_count(&self) -> usize {
        match self.view_state() {
            ViewState::Ready(products) => filter_products(&products, &self.search_term).len(),
            ViewState::Loading | ViewState::Error(_) => 0,
        }
    }

    /// Last row the grid can start at: the final row stays on screen
    fn max_scroll_row(&self) -> usize {
        self.visible_count()
            .div_ceil(self.columns)
            .saturating_sub(1)
    }

    /// Records the terminal width so scrolling knows the grid shape
    pub fn set_viewport_width(&mut self, width: u16) {
        self.columns = grid_columns(width);
        self.scroll_row = self.scroll_row.min(self.max_scroll_row());
    }

    /// Replaces the search term and scrolls back to the top of the grid
    pub fn set_search_term(&mut self, term: String) {
        self.search_term = term;
        self.scroll_row = 0;
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - Printable characters: append to the search term
    /// - `Backspace`: delete the last character of the search term
    /// - `Ctrl+U`: clear the search term
    /// - `Up`/`Down`: scroll the grid one row
    /// - `PageUp`/`PageDown`: scroll the grid one page
    /// - `Home`: back to the top of the grid
    /// - `Esc` or `Ctrl+C`: quit
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);

        match key_event.code {
            KeyCode::Esc => self.quit(),
            KeyCode::Char('c') if ctrl => self.quit(),
            KeyCode::Char('u') if ctrl => self.set_search_term(String::new()),
            KeyCode::Char(_) if ctrl => {}
            KeyCode::Char(c) => {
                let mut term = self.search_term.clone();
                term.push(c);
                self.set_search_term(term);
            }
            KeyCode::Backspace => {
                let mut term = self.search_term.clone();
                if term.pop().is_some() {
                    self.set_search_term(term);
                }
            }
            KeyCode::Up => self.scroll_up(1),
            KeyCode::Down => self.scroll_down(1),
            KeyCode::PageUp => self.scroll_up(PAGE_ROWS),
            KeyCode::PageDown => self.scroll_down(PAGE_ROWS),
            KeyCode::Home => self.scroll_row = 0,
            _ => {}
        }
    }

    /// Scrolls the grid up, stopping at the first row
    pub fn scroll_up(&mut self, rows: usize) {
        self.scroll_row = self.scroll_row.saturating_sub(rows);
    }

    /// Scrolls the grid down, stopping at the last row
    pub fn scroll_down(&mut self, rows: usize) {
        self.scroll_row = self
            .scroll_row
            .saturating_add(rows)
            .min(self.max_scroll_row());
    }

    fn quit(&mut self) {
        tracing::info!("quit requested");
        self.should_quit = true;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::ProductId;
    use crate::query::{QueryClient, QueryOptions};
    use async_trait::async_trait;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Query layer that always reports the state it was given
    pub(crate) struct FixedQuery {
        pub(crate) state: Mutex<QueryState<Vec<Product>, CatalogError>>,
        pub(crate) mounts: AtomicUsize,
        pub(crate) fetching: AtomicBool,
    }

    impl FixedQuery {
        pub(crate) fn new(state: QueryState<Vec<Product>, CatalogError>) -> Arc<Self> {
            Arc::new(Self {
                state: Mutex::new(state),
                mounts: AtomicUsize::new(0),
                fetching: AtomicBool::new(false),
            })
        }

        pub(crate) fn set(&self, state: QueryState<Vec<Product>, CatalogError>) {
            *self.state.lock().unwrap() = state;
        }
    }

    impl QueryLayer<Vec<Product>, CatalogError> for FixedQuery {
        fn query(
            &self,
            _key: &str,
            _fetcher: &Fetcher<Vec<Product>, CatalogError>,
        ) -> QueryState<Vec<Product>, CatalogError> {
            self.mounts.fetch_add(1, Ordering::SeqCst);
            self.state(PRODUCTS_QUERY_KEY)
        }

        fn state(&self, _key: &str) -> QueryState<Vec<Product>, CatalogError> {
            self.state.lock().unwrap().clone()
        }

        fn is_fetching(&self, _key: &str) -> bool {
            self.fetching.load(Ordering::SeqCst)
        }
    }

    /// Product source returning a fixed catalog
    pub(crate) struct StaticSource {
        pub(crate) products: Vec<Product>,
        pub(crate) calls: AtomicUsize,
    }

    impl StaticSource {
        pub(crate) fn new(products: Vec<Product>) -> Arc<Self> {
            Arc::new(Self {
                products,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ProductSource for StaticSource {
        async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.products.clone())
        }
    }

    pub(crate) fn product(id: i64, title: &str) -> Product {
        Product {
            id: ProductId::Number(id),
            title: title.to_string(),
            image: format!("https://fakestoreapi.com/img/{}.jpg", id),
            description: format!("About the {}", title),
            price: 9.99,
            category: "clothing".to_string(),
        }
    }

    pub(crate) fn sample_catalog() -> Vec<Product> {
        vec![
            product(1, "Red Shirt"),
            product(2, "Blue Jeans"),
            product(3, "Dark RED Jacket"),
        ]
    }

    pub(crate) fn ready_app(products: Vec<Product>) -> App {
        let query = FixedQuery::new(QueryState::Success(Arc::new(products)));
        App::new(query, StaticSource::new(Vec::new()))
    }

    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key_event(KeyCode::Char(c)));
        }
    }

    fn visible_ids(app: &App) -> Vec<ProductId> {
        app.visible_products().into_iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_mount_subscribes_once() {
        let query = FixedQuery::new(QueryState::Pending);
        let _app = App::new(query.clone(), StaticSource::new(Vec::new()));
        assert_eq!(query.mounts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_initial_state_is_loading_with_empty_grid() {
        let query = FixedQuery::new(QueryState::Pending);
        let app = App::new(query, StaticSource::new(Vec::new()));

        assert!(matches!(app.view_state(), ViewState::Loading));
        assert!(app.visible_products().is_empty());
        assert!(app.search_term.is_empty());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_ready_with_empty_term_shows_everything() {
        let app = ready_app(sample_catalog());
        assert_eq!(
            visible_ids(&app),
            vec![ProductId::Number(1), ProductId::Number(2), ProductId::Number(3)]
        );
    }

    #[test]
    fn test_typing_filters_case_insensitively() {
        let mut app = ready_app(sample_catalog());
        type_text(&mut app, "red");

        assert_eq!(app.search_term, "red");
        assert_eq!(
            visible_ids(&app),
            vec![ProductId::Number(1), ProductId::Number(3)]
        );
    }

    #[test]
    fn test_unmatched_term_yields_empty_grid_not_error() {
        let mut app = ready_app(vec![product(1, "Red Shirt")]);
        type_text(&mut app, "blue");

        assert!(matches!(app.view_state(), ViewState::Ready(_)));
        assert!(app.visible_products().is_empty());
    }

    #[test]
    fn test_filter_applies_as_soon_as_data_arrives() {
        let query = FixedQuery::new(QueryState::Pending);
        let mut app = App::new(query.clone(), StaticSource::new(Vec::new()));
        type_text(&mut app, "jeans");
        assert!(app.visible_products().is_empty());

        query.set(QueryState::Success(Arc::new(sample_catalog())));

        assert_eq!(visible_ids(&app), vec![ProductId::Number(2)]);
    }

    #[test]
    fn test_backspace_removes_last_char() {
        let mut app = ready_app(sample_catalog());
        type_text(&mut app, "reds");
        app.handle_key(key_event(KeyCode::Backspace));

        assert_eq!(app.search_term, "red");
        assert_eq!(visible_ids(&app).len(), 2);
    }

    #[test]
    fn test_backspace_on_empty_term_is_noop() {
        let mut app = ready_app(sample_catalog());
        app.scroll_row = 2;
        app.handle_key(key_event(KeyCode::Backspace));
        assert!(app.search_term.is_empty());
        assert_eq!(app.scroll_row, 2);
    }

    #[test]
    fn test_ctrl_u_clears_term() {
        let mut app = ready_app(sample_catalog());
        type_text(&mut app, "jacket");
        app.handle_key(ctrl('u'));
        assert!(app.search_term.is_empty());
        assert_eq!(visible_ids(&app).len(), 3);
    }

    #[test]
    fn test_set_search_term_replaces_wholesale() {
        let mut app = ready_app(sample_catalog());
        type_text(&mut app, "red");
        app.set_search_term("jeans".to_string());
        assert_eq!(app.search_term, "jeans");
        assert_eq!(visible_ids(&app), vec![ProductId::Number(2)]);
    }

    #[test]
    fn test_q_is_typed_not_quit() {
        let mut app = ready_app(sample_catalog());
        app.handle_key(key_event(KeyCode::Char('q')));
        assert!(!app.should_quit);
        assert_eq!(app.search_term, "q");
    }

    #[test]
    fn test_esc_quits() {
        let mut app = ready_app(sample_catalog());
        app.handle_key(key_event(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let query = FixedQuery::new(QueryState::Pending);
        let mut app = App::new(query, StaticSource::new(Vec::new()));
        app.handle_key(ctrl('c'));
        assert!(app.should_quit);
        assert!(app.search_term.is_empty());
    }

    #[test]
    fn test_other_ctrl_chords_are_ignored() {
        let mut app = ready_app(sample_catalog());
        app.handle_key(ctrl('x'));
        assert!(app.search_term.is_empty());
        assert!(!app.should_quit);
    }

    fn many_products(count: i64) -> Vec<Product> {
        (1..=count).map(|id| product(id, &format!("Item {}", id))).collect()
    }

    #[test]
    fn test_scrolling() {
        let mut app = ready_app(many_products(20));
        app.handle_key(key_event(KeyCode::Down));
        app.handle_key(key_event(KeyCode::Down));
        assert_eq!(app.scroll_row, 2);

        app.handle_key(key_event(KeyCode::Up));
        assert_eq!(app.scroll_row, 1);

        app.handle_key(key_event(KeyCode::PageDown));
        assert_eq!(app.scroll_row, 1 + PAGE_ROWS);

        app.handle_key(key_event(KeyCode::PageUp));
        app.handle_key(key_event(KeyCode::PageUp));
        assert_eq!(app.scroll_row, 0);

        app.handle_key(key_event(KeyCode::Down));
        app.handle_key(key_event(KeyCode::Home));
        assert_eq!(app.scroll_row, 0);
    }

    #[test]
    fn test_scroll_down_stops_at_last_row() {
        let mut app = ready_app(sample_catalog());
        for _ in 0..20 {
            app.scroll_down(1);
        }
        assert_eq!(app.scroll_row, 2);

        app.scroll_up(1);
        assert_eq!(app.scroll_row, 1);
    }

    #[test]
    fn test_scroll_limit_follows_columns() {
        let mut app = ready_app(many_products(7));
        app.set_viewport_width(120);
        app.handle_key(key_event(KeyCode::PageDown));
        // 7 cards in 3 columns make 3 rows
        assert_eq!(app.scroll_row, 2);

        app.set_viewport_width(80);
        app.handle_key(key_event(KeyCode::PageDown));
        assert_eq!(app.scroll_row, 3);

        // Widening the terminal pulls the offset back onto the grid
        app.set_viewport_width(200);
        assert_eq!(app.scroll_row, 2);
    }

    #[test]
    fn test_scroll_limit_follows_filter() {
        let mut app = ready_app(sample_catalog());
        type_text(&mut app, "red");
        app.handle_key(key_event(KeyCode::PageDown));
        assert_eq!(app.scroll_row, 1);
    }

    #[test]
    fn test_no_scrolling_while_loading() {
        let query = FixedQuery::new(QueryState::Pending);
        let mut app = App::new(query, StaticSource::new(Vec::new()));
        app.handle_key(key_event(KeyCode::PageDown));
        assert_eq!(app.scroll_row, 0);
    }

    #[test]
    fn test_refreshing_only_with_data_shown() {
        let query = FixedQuery::new(QueryState::Pending);
        query.fetching.store(true, Ordering::SeqCst);
        let app = App::new(query.clone(), StaticSource::new(Vec::new()));
        assert!(!app.is_refreshing());

        query.set(QueryState::Success(Arc::new(sample_catalog())));
        assert!(app.is_refreshing());

        query.fetching.store(false, Ordering::SeqCst);
        assert!(!app.is_refreshing());
    }

    #[test]
    fn test_editing_term_resets_scroll() {
        let mut app = ready_app(sample_catalog());
        app.scroll_row = 4;
        type_text(&mut app, "r");
        assert_eq!(app.scroll_row, 0);
    }

    #[test]
    fn test_network_error_message() {
        let err = QueryError::Failed(CatalogError::Network {
            status: reqwest::StatusCode::BAD_GATEWAY,
        });
        let query = FixedQuery::new(QueryState::Error(Arc::new(err)));
        let app = App::new(query, StaticSource::new(Vec::new()));

        match app.view_state() {
            ViewState::Error(message) => assert_eq!(message, "Network response was not ok!"),
            other => panic!("expected error state, got {:?}", other),
        }
        assert!(app.visible_products().is_empty());
    }

    #[test]
    fn test_decode_error_shows_parser_message() {
        let decode = serde_json::from_str::<Vec<Product>>("not json").unwrap_err();
        let expected = decode.to_string();
        let err = QueryError::Failed(CatalogError::Decode(decode));
        let query = FixedQuery::new(QueryState::Error(Arc::new(err)));
        let app = App::new(query, StaticSource::new(Vec::new()));

        match app.view_state() {
            ViewState::Error(message) => assert_eq!(message, expected),
            other => panic!("expected error state, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_error_uses_generic_message() {
        let err = QueryError::Unknown("boom".to_string());
        let query = FixedQuery::new(QueryState::Error(Arc::new(err)));
        let app = App::new(query, StaticSource::new(Vec::new()));

        match app.view_state() {
            ViewState::Error(message) => assert_eq!(message, UNKNOWN_ERROR_MESSAGE),
            other => panic!("expected error state, got {:?}", other),
        }
    }

    #[test]
    fn test_with_startup_config_applies_initial_search() {
        let query = FixedQuery::new(QueryState::Success(Arc::new(sample_catalog())));
        let config = StartupConfig {
            initial_search: Some("JEANS".to_string()),
            ..StartupConfig::default()
        };
        let app = App::with_startup_config(query, StaticSource::new(Vec::new()), &config);

        assert_eq!(app.search_term, "JEANS");
        assert_eq!(visible_ids(&app), vec![ProductId::Number(2)]);
    }

    struct PanickingSource;

    #[async_trait]
    impl ProductSource for PanickingSource {
        async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
            panic!("catalog source exploded");
        }
    }

    #[tokio::test]
    async fn test_panicking_source_shows_unknown_error() {
        let client: QueryClient<Vec<Product>, CatalogError> = QueryClient::new(QueryOptions {
            retry: 0,
            ..QueryOptions::default()
        });
        let app = App::new(Arc::new(client), Arc::new(PanickingSource));

        for _ in 0..200 {
            if !matches!(app.view_state(), ViewState::Loading) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        match app.view_state() {
            ViewState::Error(message) => assert_eq!(message, UNKNOWN_ERROR_MESSAGE),
            other => panic!("expected error state, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_remount_reuses_cached_catalog() {
        let client: QueryClient<Vec<Product>, CatalogError> = QueryClient::new(QueryOptions {
            retry: 0,
            ..QueryOptions::default()
        });
        let source = StaticSource::new(sample_catalog());

        let first = App::new(Arc::new(client.clone()), source.clone());
        for _ in 0..200 {
            if !matches!(first.view_state(), ViewState::Loading) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(matches!(first.view_state(), ViewState::Ready(_)));
        drop(first);

        let second = App::new(Arc::new(client.clone()), source.clone());
        assert!(matches!(second.view_state(), ViewState::Ready(_)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
