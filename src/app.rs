//! Application state and navigation logic.
//!
//! [`App`] is the composition root: it owns the [`DashboardState`], the
//! polling and view-mode controllers, the timers driving them, and the
//! navigation state of the terminal UI.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{info, warn};

use crate::data::{Environment, Product};
use crate::poll::{Applied, FetchOutcome, FetchRequest, Fetched, Fetcher, PollingScheduler};
use crate::report::Report;
use crate::source::{Bookmark, FetchError};
use crate::state::{DashboardState, ViewMode};
use crate::timer::Timers;
use crate::ui::Theme;
use crate::view::{ScrollState, ViewModeController};

/// How long a status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(4);

/// The current view/tab in the TUI.
///
/// Environment detail is shown as an overlay (controlled by
/// `App::show_detail_overlay`) rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Every product environment with its uptime.
    Environments,
    /// Saved links, with server-side search.
    Bookmarks,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Environments => View::Bookmarks,
            View::Bookmarks => View::Environments,
        }
    }

    /// Cycle to the previous view. With two views this is the same as `next`.
    pub fn prev(self) -> Self {
        self.next()
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Environments => "Environments",
            View::Bookmarks => "Bookmarks",
        }
    }
}

/// One row of the environments table.
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentRow<'a> {
    pub product: &'a Product,
    pub environment: &'a Environment,
}

/// Bookmarks and the search applied to them.
#[derive(Debug, Default)]
pub struct BookmarksPane {
    /// Everything from `/api/bookmarks`.
    pub all: Vec<Bookmark>,
    /// What the view shows: `all`, or the latest search results.
    pub shown: Vec<Bookmark>,
    /// Query whose results are shown (empty for the full list).
    pub query: String,
    pub requested: bool,
    pub loading: bool,
    pub error: Option<String>,
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Dashboard core
    pub state: DashboardState,
    pub poller: PollingScheduler,
    pub view: ViewModeController,
    pub timers: Timers,
    fetcher: Box<dyn Fetcher>,
    backend_description: String,
    /// Enter monitor mode once the first inventory has loaded.
    monitor_on_load: bool,

    // Navigation state
    pub selected_index: usize,
    pub selected_bookmark: usize,
    pub bookmarks: BookmarksPane,
    pub scroll: ScrollState,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("running", &self.running)
            .field("current_view", &self.current_view)
            .field("view_mode", &self.state.view_mode)
            .field("backend", &self.backend_description)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Create a new App. Nothing is fetched until [`App::start`].
    pub fn new(
        fetcher: Box<dyn Fetcher>,
        poller: PollingScheduler,
        view: ViewModeController,
        backend_description: impl Into<String>,
    ) -> Self {
        Self {
            running: true,
            current_view: View::Environments,
            show_help: false,
            show_detail_overlay: false,
            state: DashboardState::new(),
            poller,
            view,
            timers: Timers::new(),
            fetcher,
            backend_description: backend_description.into(),
            monitor_on_load: false,
            selected_index: 0,
            selected_bookmark: 0,
            bookmarks: BookmarksPane::default(),
            scroll: ScrollState::new(),
            filter_text: String::new(),
            filter_active: false,
            theme: Theme::dark(),
            status_message: None,
        }
    }

    /// Enter monitor mode after the first successful inventory load.
    pub fn with_monitor_on_load(mut self, enabled: bool) -> Self {
        self.monitor_on_load = enabled;
        self
    }

    /// Returns a description of the backend.
    pub fn source_description(&self) -> &str {
        &self.backend_description
    }

    /// Issue the startup fetches and start polling.
    pub fn start(&mut self) {
        info!(backend = %self.backend_description, "dashboard starting");
        self.poller
            .start(&mut self.state, &mut self.timers, self.fetcher.as_mut());
    }

    /// Stop every timer and quit.
    pub fn shutdown(&mut self) {
        self.view.teardown(&mut self.timers);
        self.poller.teardown(&mut self.timers);
        self.running = false;
    }

    /// Advance the timer clock to `now` and run whatever fired.
    pub fn advance_clock(&mut self, now: Duration) {
        for task in self.timers.advance_to(now) {
            if !self.poller.on_tick(task, self.fetcher.as_mut()) {
                self.view.on_tick(task, &mut self.scroll);
            }
        }
    }

    /// Apply an outcome as if requested by the current polling run.
    pub fn handle_outcome(&mut self, outcome: FetchOutcome) {
        self.handle_fetched(Fetched {
            generation: self.poller.generation(),
            outcome,
        });
    }

    /// Apply an outcome delivered by the fetcher.
    ///
    /// Poll results from an earlier polling run are dropped; bookmark
    /// results are not tied to a run.
    pub fn handle_fetched(&mut self, fetched: Fetched) {
        let generation = fetched.generation;
        match fetched.outcome {
            FetchOutcome::Bookmarks(result) => self.apply_bookmarks(result),
            FetchOutcome::BookmarkSearch { query, result } => {
                self.apply_bookmark_search(query, result)
            }
            outcome => {
                let applied = self
                    .poller
                    .apply_fetched(Fetched { generation, outcome }, &mut self.state);
                if matches!(applied, Applied::Updated { first_inventory: true })
                    && self.monitor_on_load
                {
                    self.view
                        .enter(ViewMode::Monitor, &mut self.state, &mut self.timers);
                }
                self.clamp_selection();
            }
        }
    }

    /// Force a fresh health check.
    pub fn refresh(&mut self) {
        if self.state.refreshing {
            return;
        }
        self.poller
            .refresh_health(&mut self.state, self.fetcher.as_mut());
        if self.state.refreshing {
            self.set_status_message("Refreshing health...".to_string());
        }
    }

    /// Switch between normal and monitor mode.
    pub fn toggle_monitor(&mut self) {
        self.show_detail_overlay = false;
        self.show_help = false;
        self.filter_active = false;
        self.view.toggle(&mut self.state, &mut self.timers);
    }

    /// The user left full-screen (Esc while the chrome is hidden).
    pub fn exit_fullscreen(&mut self) {
        self.view
            .on_fullscreen_change(false, &mut self.state, &mut self.timers);
    }

    pub fn in_monitor_mode(&self) -> bool {
        self.state.view_mode == ViewMode::Monitor
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Get breadcrumb trail for current navigation.
    pub fn breadcrumb(&self) -> String {
        match self.selected_row() {
            Some(row) if self.show_detail_overlay => format!(
                "{} > {} > {}",
                self.current_view.label(),
                row.product.name,
                row.environment.name
            ),
            _ => self.current_view.label().to_string(),
        }
    }

    /// Environments that match the filter, in inventory order.
    pub fn environment_rows(&self) -> Vec<EnvironmentRow<'_>> {
        self.state
            .inventory()
            .environments()
            .filter(|(product, env)| {
                self.matches_filter(&product.name) || self.matches_filter(&env.name)
            })
            .map(|(product, environment)| EnvironmentRow {
                product,
                environment,
            })
            .collect()
    }

    /// The environment under the cursor.
    pub fn selected_row(&self) -> Option<EnvironmentRow<'_>> {
        self.environment_rows().get(self.selected_index).copied()
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
        self.show_detail_overlay = false;
        self.filter_active = false;
        self.filter_text.clear();
        if view == View::Bookmarks && !self.bookmarks.requested {
            self.load_bookmarks();
        }
    }

    /// Fetch the full bookmark list.
    pub fn load_bookmarks(&mut self) {
        self.bookmarks.requested = true;
        self.bookmarks.loading = true;
        self.fetcher
            .spawn(self.poller.generation(), FetchRequest::Bookmarks);
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.item_count().saturating_sub(1);
        let index = self.selected_mut();
        *index = (*index + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        let index = self.selected_mut();
        *index = index.saturating_sub(n);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        *self.selected_mut() = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        let last = self.item_count().saturating_sub(1);
        *self.selected_mut() = last;
    }

    fn item_count(&self) -> usize {
        match self.current_view {
            View::Environments => self.environment_rows().len(),
            View::Bookmarks => self.bookmarks.shown.len(),
        }
    }

    fn selected_mut(&mut self) -> &mut usize {
        match self.current_view {
            View::Environments => &mut self.selected_index,
            View::Bookmarks => &mut self.selected_bookmark,
        }
    }

    fn clamp_selection(&mut self) {
        let rows = self.environment_rows().len();
        if self.selected_index >= rows {
            self.selected_index = rows.saturating_sub(1);
        }
        if self.selected_bookmark >= self.bookmarks.shown.len() {
            self.selected_bookmark = self.bookmarks.shown.len().saturating_sub(1);
        }
    }

    /// Open the detail overlay for the selected environment.
    pub fn enter_detail(&mut self) {
        if self.current_view == View::Environments && self.selected_row().is_some() {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close the overlay first, then clear the filter.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
        } else if !self.filter_text.is_empty() {
            self.clear_filter();
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Confirm the filter. In the bookmarks view this runs the search.
    pub fn apply_filter(&mut self) {
        self.filter_active = false;
        if self.current_view == View::Bookmarks {
            self.search_bookmarks();
        }
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
        if self.current_view == View::Bookmarks {
            self.search_bookmarks();
        }
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        *self.selected_mut() = 0;
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
        *self.selected_mut() = 0;
    }

    /// Check if a name matches the current environments filter.
    pub fn matches_filter(&self, name: &str) -> bool {
        if self.filter_text.is_empty() || self.current_view != View::Environments {
            return true;
        }
        name.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    fn search_bookmarks(&mut self) {
        let query = self.filter_text.trim().to_string();
        if query.is_empty() {
            self.bookmarks.query.clear();
            self.bookmarks.shown = self.bookmarks.all.clone();
            self.selected_bookmark = 0;
            return;
        }
        self.bookmarks.loading = true;
        self.fetcher
            .spawn(self.poller.generation(), FetchRequest::SearchBookmarks(query));
    }

    fn apply_bookmarks(&mut self, result: Result<Vec<Bookmark>, FetchError>) {
        self.bookmarks.loading = false;
        match result {
            Ok(bookmarks) => {
                self.bookmarks.error = None;
                if self.bookmarks.query.is_empty() {
                    self.bookmarks.shown = bookmarks.clone();
                }
                self.bookmarks.all = bookmarks;
            }
            Err(e) => {
                warn!(error = %e, "bookmarks fetch failed");
                self.bookmarks.error = Some(format!("Failed to load bookmarks: {e}"));
            }
        }
        self.clamp_selection();
    }

    fn apply_bookmark_search(
        &mut self,
        query: String,
        result: Result<Vec<Bookmark>, FetchError>,
    ) {
        // A newer query (or a cleared one) supersedes this result.
        if query != self.filter_text.trim() {
            return;
        }
        self.bookmarks.loading = false;
        match result {
            Ok(found) => {
                self.bookmarks.shown = found;
                self.bookmarks.query = query;
            }
            Err(e) => {
                warn!(error = %e, query = %query, "bookmark search failed, showing all bookmarks");
                self.bookmarks.shown = self.bookmarks.all.clone();
                self.bookmarks.query.clear();
                self.set_status_message("Search failed, showing all bookmarks".to_string());
            }
        }
        self.selected_bookmark = 0;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.shutdown();
    }

    /// Export the current uptime report to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(ref tree) = self.state.inventory else {
            anyhow::bail!("No data to export");
        };
        Report::build(tree, &self.state.health).write_json(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{HealthMap, InventoryTree, Microservice};
    use crate::poll::testing::RecordingFetcher;
    use crate::poll::{Generation, PollConfig, PollMode};
    use crate::source::DashboardData;
    use crate::timer::Task;
    use crate::view::TerminalFullscreen;

    /// A fetcher whose requests the test can read after handing it to the app.
    #[derive(Debug, Default, Clone)]
    struct SharedFetcher(std::rc::Rc<std::cell::RefCell<RecordingFetcher>>);

    impl SharedFetcher {
        fn take(&self) -> Vec<FetchRequest> {
            self.0.borrow_mut().take()
        }
    }

    impl Fetcher for SharedFetcher {
        fn spawn(&mut self, generation: Generation, request: FetchRequest) {
            self.0.borrow_mut().spawn(generation, request);
        }
    }

    fn app() -> (App, SharedFetcher) {
        let fetcher = SharedFetcher::default();
        let config = PollConfig::fallback();
        let app = App::new(
            Box::new(fetcher.clone()),
            PollingScheduler::new(PollMode::Combined, config),
            ViewModeController::new(Box::new(TerminalFullscreen::new()))
                .with_config(&config)
                .with_bottom_threshold(2),
            "memory",
        );
        (app, fetcher)
    }

    fn tree() -> InventoryTree {
        let env = |name: &str, url: &str| Environment {
            name: name.into(),
            url: url.into(),
            microservices: vec![Microservice::new(format!("{url}/svc"))],
            databases: vec![],
        };
        InventoryTree {
            products: vec![
                Product {
                    name: "Billing".into(),
                    environments: vec![env("prod", "https://b-prod"), env("qa", "https://b-qa")],
                },
                Product {
                    name: "Search".into(),
                    environments: vec![env("prod", "https://s-prod")],
                },
            ],
        }
    }

    fn dashboard(health: HealthMap) -> FetchOutcome {
        FetchOutcome::Dashboard(Ok(DashboardData {
            environments: tree(),
            health,
        }))
    }

    fn bookmark(name: &str) -> Bookmark {
        Bookmark {
            name: name.into(),
            url: format!("https://{name}"),
            ..Bookmark::default()
        }
    }

    #[test]
    fn test_start_and_poll() {
        let (mut app, fetcher) = app();
        app.start();
        assert_eq!(fetcher.take(), vec![FetchRequest::Dashboard]);

        app.advance_clock(Duration::from_secs(15));
        let requests = fetcher.take();
        assert!(requests.contains(&FetchRequest::Health));
        assert!(requests.contains(&FetchRequest::Dashboard));
    }

    #[test]
    fn test_monitor_on_load() {
        let (app, _) = app();
        let mut app = app.with_monitor_on_load(true);
        app.start();
        assert!(!app.in_monitor_mode());

        app.handle_outcome(dashboard(HealthMap::new()));
        assert!(app.in_monitor_mode());
        assert!(app.view.is_fullscreen());

        // Leaving monitor mode is not undone by later refreshes.
        app.exit_fullscreen();
        app.handle_outcome(dashboard(HealthMap::new()));
        assert!(!app.in_monitor_mode());
        assert!(!app.view.is_fullscreen());
    }

    #[test]
    fn test_monitor_scrolls_board() {
        let (mut app, _) = app();
        app.start();
        app.handle_outcome(dashboard(HealthMap::new()));
        app.scroll.set_extent(10, 100);

        app.toggle_monitor();
        assert_eq!(app.timers.active_for(Task::AutoScroll), 1);
        app.advance_clock(Duration::from_secs(8));
        assert_eq!(app.scroll.offset(), 8);

        app.toggle_monitor();
        app.advance_clock(Duration::from_secs(16));
        assert_eq!(app.scroll.offset(), 8);
    }

    #[test]
    fn test_shutdown_cancels_everything() {
        let (mut app, fetcher) = app();
        app.start();
        app.toggle_monitor();
        fetcher.take();

        app.quit();
        assert!(!app.running);
        assert_eq!(app.timers.active(), 0);

        app.advance_clock(Duration::from_secs(120));
        assert!(fetcher.take().is_empty());
    }

    #[test]
    fn test_filter_environments() {
        let (mut app, _) = app();
        app.start();
        app.handle_outcome(dashboard(HealthMap::new()));
        assert_eq!(app.environment_rows().len(), 3);

        for c in "bill".chars() {
            app.filter_push(c);
        }
        let rows = app.environment_rows();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.product.name == "Billing"));

        app.select_last();
        assert_eq!(app.selected_row().unwrap().environment.name, "qa");

        app.clear_filter();
        assert_eq!(app.environment_rows().len(), 3);
    }

    #[test]
    fn test_detail_overlay_and_breadcrumb() {
        let (mut app, _) = app();
        app.start();
        app.enter_detail();
        assert!(!app.show_detail_overlay);

        app.handle_outcome(dashboard(HealthMap::new()));
        app.select_next();
        app.enter_detail();
        assert!(app.show_detail_overlay);
        assert_eq!(app.breadcrumb(), "Environments > Billing > qa");

        app.go_back();
        assert!(!app.show_detail_overlay);
    }

    #[test]
    fn test_refresh() {
        let (mut app, fetcher) = app();
        app.start();
        fetcher.take();

        app.refresh();
        app.refresh();
        assert_eq!(fetcher.take(), vec![FetchRequest::HealthCheck]);
        assert!(app.get_status_message().is_some());

        app.handle_outcome(FetchOutcome::HealthCheck(Err(FetchError::Timeout)));
        assert!(!app.state.refreshing);
    }

    #[test]
    fn test_bookmark_search_falls_back() {
        let (mut app, fetcher) = app();
        app.set_view(View::Bookmarks);
        assert_eq!(fetcher.take(), vec![FetchRequest::Bookmarks]);

        app.handle_outcome(FetchOutcome::Bookmarks(Ok(vec![
            bookmark("grafana"),
            bookmark("jenkins"),
        ])));
        assert_eq!(app.bookmarks.shown.len(), 2);

        app.start_filter();
        for c in "graf".chars() {
            app.filter_push(c);
        }
        app.apply_filter();
        assert_eq!(
            fetcher.take(),
            vec![FetchRequest::SearchBookmarks("graf".into())]
        );

        app.handle_outcome(FetchOutcome::BookmarkSearch {
            query: "graf".into(),
            result: Ok(vec![bookmark("grafana")]),
        });
        assert_eq!(app.bookmarks.shown, vec![bookmark("grafana")]);

        app.handle_outcome(FetchOutcome::BookmarkSearch {
            query: "graf".into(),
            result: Err(FetchError::Timeout),
        });
        assert_eq!(app.bookmarks.shown.len(), 2);

        app.clear_filter();
        assert_eq!(app.bookmarks.shown.len(), 2);
        assert!(fetcher.take().is_empty());
    }

    #[test]
    fn test_filter_typing_resets_current_view_cursor() {
        let (mut app, _) = app();
        app.start();
        app.handle_outcome(dashboard(HealthMap::new()));
        app.select_next();
        assert_eq!(app.selected_index, 1);

        app.set_view(View::Bookmarks);
        app.handle_outcome(FetchOutcome::Bookmarks(Ok(vec![
            bookmark("a"),
            bookmark("b"),
            bookmark("c"),
        ])));
        app.select_last();
        assert_eq!(app.selected_bookmark, 2);

        app.start_filter();
        app.filter_push('b');
        assert_eq!(app.selected_bookmark, 0);
        assert_eq!(app.selected_index, 1);

        app.select_next();
        app.filter_pop();
        assert_eq!(app.selected_bookmark, 0);
        assert_eq!(app.selected_index, 1);
    }

    #[test]
    fn test_results_from_before_start_dropped() {
        let (mut app, _) = app();
        app.set_view(View::Bookmarks);
        let before = app.poller.generation();
        app.start();

        app.handle_fetched(Fetched {
            generation: before,
            outcome: dashboard(HealthMap::new()),
        });
        assert!(app.state.inventory.is_none());

        // Bookmarks requested before the run started still land.
        app.handle_fetched(Fetched {
            generation: before,
            outcome: FetchOutcome::Bookmarks(Ok(vec![bookmark("a")])),
        });
        assert_eq!(app.bookmarks.shown, vec![bookmark("a")]);
    }

    #[test]
    fn test_stale_search_ignored() {
        let (mut app, _) = app();
        app.set_view(View::Bookmarks);
        app.handle_outcome(FetchOutcome::Bookmarks(Ok(vec![bookmark("a"), bookmark("b")])));

        app.filter_push('b');
        app.handle_outcome(FetchOutcome::BookmarkSearch {
            query: "a".into(),
            result: Ok(vec![bookmark("a")]),
        });
        assert_eq!(app.bookmarks.shown.len(), 2);
    }

    #[test]
    fn test_export_state() {
        let (mut app, _) = app();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vision_export.json");
        assert!(app.export_state(&path).is_err());

        app.start();
        app.handle_outcome(dashboard(HealthMap::new()));
        app.export_state(&path).unwrap();
        assert!(path.exists());
    }
}
