use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};

/// File written by the `e` key.
pub const EXPORT_FILE: &str = "vision_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.in_monitor_mode() {
        handle_monitor_key(app, key);
        return;
    }

    // If detail overlay is shown, handle overlay-specific keys
    if app.show_detail_overlay {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                app.close_overlay();
            }
            // Allow moving through environments while the overlay is open
            KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::Char('r') => app.refresh(),
            _ => {}
        }
        return;
    }

    // If filter input is active, handle text input
    if app.filter_active {
        handle_filter_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Char('1') => app.set_view(View::Environments),
        KeyCode::Char('2') => app.set_view(View::Bookmarks),

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        KeyCode::Enter => app.enter_detail(),
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('m') => app.toggle_monitor(),
        KeyCode::Char('?') => app.toggle_help(),

        KeyCode::Char('/') => app.start_filter(),
        KeyCode::Char('c') => {
            if !app.filter_text.is_empty() {
                app.clear_filter();
            }
        }

        KeyCode::Char('e') => export(app),

        _ => {}
    }
}

/// Keys while the monitor board is shown.
fn handle_monitor_key(app: &mut App, key: KeyEvent) {
    match key.code {
        // Esc stands in for the platform leaving full-screen.
        KeyCode::Esc => {
            if app.view.is_fullscreen() {
                app.exit_fullscreen();
            } else {
                app.toggle_monitor();
            }
        }
        KeyCode::Char('m') => app.toggle_monitor(),
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('e') => export(app),
        KeyCode::Up | KeyCode::Char('k') => app.scroll.scroll_by(-1),
        KeyCode::Down | KeyCode::Char('j') => app.scroll.scroll_by(1),
        KeyCode::PageUp => app.scroll.scroll_by(-10),
        KeyCode::PageDown => app.scroll.scroll_by(10),
        KeyCode::Home => app.scroll.scroll_by(i32::MIN),
        KeyCode::Char('?') => app.toggle_help(),
        _ => {}
    }
}

fn export(app: &mut App) {
    let export_path = PathBuf::from(EXPORT_FILE);
    match app.export_state(&export_path) {
        Ok(()) => {
            app.set_status_message(format!("Exported to {}", export_path.display()));
        }
        Err(e) => {
            app.set_status_message(format!("Export failed: {}", e));
        }
    }
}

/// Handle key input while filter is active
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        // Confirm filter (runs the search in the bookmarks view)
        KeyCode::Enter => app.apply_filter(),

        // Cancel filter (keep text but exit input mode)
        KeyCode::Esc => app.cancel_filter(),

        // Clear and exit
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_filter();
        }

        KeyCode::Backspace => {
            app.filter_pop();
            if app.filter_text.is_empty() {
                app.clear_filter();
            }
        }

        KeyCode::Char(c) => app.filter_push(c),

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    if app.in_monitor_mode() {
        match mouse.kind {
            MouseEventKind::ScrollUp => app.scroll.scroll_by(-1),
            MouseEventKind::ScrollDown => app.scroll.scroll_by(1),
            _ => {}
        }
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        // Click to select
        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            // Content rows start after the header, tabs, block border and table header
            if clicked_row > content_start_row {
                let item_row = (clicked_row - content_start_row - 1) as usize;
                match app.current_view {
                    View::Environments => {
                        if item_row < app.environment_rows().len() {
                            app.selected_index = item_row;
                        }
                    }
                    View::Bookmarks => {
                        if item_row < app.bookmarks.shown.len() {
                            app.selected_bookmark = item_row;
                        }
                    }
                }
            }

            // Tab clicks (row 1, after header)
            if clicked_row == 1 {
                let col = mouse.column;
                // Approximate tab positions: Environments (0-17), Bookmarks (18-32)
                if col < 18 {
                    app.set_view(View::Environments);
                } else if col < 33 {
                    app.set_view(View::Bookmarks);
                }
            }
        }

        MouseEventKind::Down(MouseButton::Right) => app.go_back(),

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poll::{FetchRequest, Fetcher, Generation, PollConfig, PollMode, PollingScheduler};
    use crate::state::ViewMode;
    use crate::view::{TerminalFullscreen, ViewModeController};

    #[derive(Debug)]
    struct NullFetcher;

    impl Fetcher for NullFetcher {
        fn spawn(&mut self, _generation: Generation, _request: FetchRequest) {}
    }

    fn app() -> App {
        let config = PollConfig::fallback();
        let mut app = App::new(
            Box::new(NullFetcher),
            PollingScheduler::new(PollMode::Combined, config),
            ViewModeController::new(Box::new(TerminalFullscreen::new())).with_config(&config),
            "test",
        );
        app.start();
        app
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_m_toggles_monitor() {
        let mut app = app();
        press(&mut app, KeyCode::Char('m'));
        assert_eq!(app.state.view_mode, ViewMode::Monitor);
        press(&mut app, KeyCode::Char('m'));
        assert_eq!(app.state.view_mode, ViewMode::Normal);
    }

    #[test]
    fn test_esc_leaves_fullscreen_monitor() {
        let mut app = app();
        press(&mut app, KeyCode::Char('m'));
        assert!(app.view.is_fullscreen());

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state.view_mode, ViewMode::Normal);
        assert!(!app.view.is_fullscreen());
        assert!(!app.view.is_scrolling());
    }

    #[test]
    fn test_filter_typing() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        assert!(app.filter_active);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.running);
        assert_eq!(app.filter_text, "q");

        press(&mut app, KeyCode::Backspace);
        assert!(!app.filter_active);
        assert!(app.filter_text.is_empty());
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
        assert_eq!(app.timers.active(), 0);
    }

    #[test]
    fn test_view_switch_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.current_view, View::Bookmarks);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.current_view, View::Environments);
    }
}
