//! Normal / monitor view-mode state machine.
//!
//! Entering monitor mode requests full-screen and starts the auto-scroll
//! timer; leaving it does the reverse. Both resources are only touched on
//! transitions, so repeated `enter` calls never stack timers.

use std::fmt::Debug;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::poll::{PollConfig, DEFAULT_SCROLL_FRACTION, DEFAULT_SCROLL_INTERVAL};
use crate::state::{DashboardState, ViewMode};
use crate::timer::{self, Scheduler, Task, TimerHandle};

/// Bottom threshold in viewport units when the caller does not set one.
pub const DEFAULT_BOTTOM_THRESHOLD: u32 = 100;

#[derive(Debug, Error)]
pub enum FullscreenError {
    #[error("full-screen is not supported here")]
    Unsupported,
    #[error("full-screen request failed: {0}")]
    Failed(String),
}

/// Platform full-screen control.
pub trait Fullscreen: Debug {
    fn request(&mut self) -> Result<(), FullscreenError>;
    fn exit(&mut self) -> Result<(), FullscreenError>;
    fn is_active(&self) -> bool;

    /// The platform left full-screen without being asked to.
    fn exited_externally(&mut self) {}
}

/// Full-screen in a terminal: the dashboard hides its header, tabs and status bar.
#[derive(Debug, Default)]
pub struct TerminalFullscreen {
    active: bool,
}

impl TerminalFullscreen {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Fullscreen for TerminalFullscreen {
    fn request(&mut self) -> Result<(), FullscreenError> {
        self.active = true;
        Ok(())
    }

    fn exit(&mut self) -> Result<(), FullscreenError> {
        self.active = false;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn exited_externally(&mut self) {
        self.active = false;
    }
}

/// For surfaces that cannot go full-screen (e.g. export or headless runs).
#[derive(Debug, Default)]
pub struct NoFullscreen;

impl Fullscreen for NoFullscreen {
    fn request(&mut self) -> Result<(), FullscreenError> {
        Err(FullscreenError::Unsupported)
    }

    fn exit(&mut self) -> Result<(), FullscreenError> {
        Err(FullscreenError::Unsupported)
    }

    fn is_active(&self) -> bool {
        false
    }
}

/// A scrollable document as seen by the auto-scroller.
pub trait Viewport {
    /// Offset of the top of the viewport.
    fn position(&self) -> u32;
    fn viewport_height(&self) -> u32;
    fn document_height(&self) -> u32;
    fn scroll_to(&mut self, position: u32);
}

/// Row-based scroll state of a rendered board.
///
/// Rendering reports the extents with [`ScrollState::set_extent`]; the offset
/// is clamped so the last page stays filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    offset: u32,
    viewport: u32,
    document: u32,
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn set_extent(&mut self, viewport: u32, document: u32) {
        self.viewport = viewport;
        self.document = document;
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn scroll_by(&mut self, delta: i32) {
        let target = if delta.is_negative() {
            self.offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.offset.saturating_add(delta as u32)
        };
        self.scroll_to(target);
    }

    fn max_offset(&self) -> u32 {
        self.document.saturating_sub(self.viewport)
    }
}

impl Viewport for ScrollState {
    fn position(&self) -> u32 {
        self.offset
    }

    fn viewport_height(&self) -> u32 {
        self.viewport
    }

    fn document_height(&self) -> u32 {
        self.document
    }

    fn scroll_to(&mut self, position: u32) {
        self.offset = position.min(self.max_offset());
    }
}

/// Next scroll position: back to the top when within `threshold` of the
/// bottom, otherwise `fraction` of a viewport further down (at least one unit).
pub fn scroll_step(
    position: u32,
    viewport: u32,
    document: u32,
    fraction: f64,
    threshold: u32,
) -> u32 {
    if position.saturating_add(viewport) >= document.saturating_sub(threshold) {
        return 0;
    }
    let step = (fraction * f64::from(viewport)).floor() as u32;
    position.saturating_add(step.max(1))
}

/// Controls the dashboard's view mode.
#[derive(Debug)]
pub struct ViewModeController {
    fullscreen: Box<dyn Fullscreen>,
    scroll_timer: Option<TimerHandle>,
    scroll_interval: Duration,
    scroll_fraction: f64,
    bottom_threshold: u32,
}

impl ViewModeController {
    pub fn new(fullscreen: Box<dyn Fullscreen>) -> Self {
        Self {
            fullscreen,
            scroll_timer: None,
            scroll_interval: DEFAULT_SCROLL_INTERVAL,
            scroll_fraction: DEFAULT_SCROLL_FRACTION,
            bottom_threshold: DEFAULT_BOTTOM_THRESHOLD,
        }
    }

    /// Take scroll timing from the poll config.
    pub fn with_config(mut self, config: &PollConfig) -> Self {
        self.scroll_interval = config.scroll_interval;
        self.scroll_fraction = config.scroll_fraction;
        self
    }

    pub fn with_bottom_threshold(mut self, threshold: u32) -> Self {
        self.bottom_threshold = threshold;
        self
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen.is_active()
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroll_timer.is_some()
    }

    /// Switch to `mode`. Entering the current mode again changes nothing.
    pub fn enter(
        &mut self,
        mode: ViewMode,
        state: &mut DashboardState,
        scheduler: &mut dyn Scheduler,
    ) {
        match mode {
            ViewMode::Monitor => {
                if state.view_mode == ViewMode::Monitor && self.scroll_timer.is_some() {
                    return;
                }
                match self.fullscreen.request() {
                    Ok(()) => {}
                    Err(FullscreenError::Unsupported) => {
                        debug!("full-screen unsupported, entering monitor mode without it")
                    }
                    Err(e) => warn!(error = %e, "full-screen request failed"),
                }
                timer::restart(
                    &mut self.scroll_timer,
                    scheduler,
                    self.scroll_interval,
                    Task::AutoScroll,
                );
                state.view_mode = ViewMode::Monitor;
                info!(
                    interval_ms = self.scroll_interval.as_millis() as u64,
                    "monitor mode on"
                );
            }
            ViewMode::Normal => {
                let was_monitor = state.view_mode == ViewMode::Monitor;
                timer::stop(&mut self.scroll_timer, scheduler);
                if self.fullscreen.is_active() {
                    if let Err(e) = self.fullscreen.exit() {
                        debug!(error = %e, "full-screen exit failed");
                    }
                }
                state.view_mode = ViewMode::Normal;
                if was_monitor {
                    info!("monitor mode off");
                }
            }
        }
    }

    pub fn toggle(&mut self, state: &mut DashboardState, scheduler: &mut dyn Scheduler) {
        let next = match state.view_mode {
            ViewMode::Normal => ViewMode::Monitor,
            ViewMode::Monitor => ViewMode::Normal,
        };
        self.enter(next, state, scheduler);
    }

    /// Full-screen changed outside the controller.
    ///
    /// Leaving full-screen while in monitor mode drops back to normal mode
    /// without asking the platform to exit again.
    pub fn on_fullscreen_change(
        &mut self,
        active: bool,
        state: &mut DashboardState,
        scheduler: &mut dyn Scheduler,
    ) {
        if active || state.view_mode != ViewMode::Monitor {
            return;
        }
        self.fullscreen.exited_externally();
        timer::stop(&mut self.scroll_timer, scheduler);
        state.view_mode = ViewMode::Normal;
        info!("full-screen left, monitor mode off");
    }

    /// Advance `viewport` on an auto-scroll tick. Returns false for tasks
    /// this controller does not own.
    pub fn on_tick(&mut self, task: Task, viewport: &mut dyn Viewport) -> bool {
        if task != Task::AutoScroll {
            return false;
        }
        if self.scroll_timer.is_some() {
            let next = scroll_step(
                viewport.position(),
                viewport.viewport_height(),
                viewport.document_height(),
                self.scroll_fraction,
                self.bottom_threshold,
            );
            debug!(from = viewport.position(), to = next, "auto-scroll");
            viewport.scroll_to(next);
        }
        true
    }

    /// Stop auto-scrolling regardless of mode.
    pub fn teardown(&mut self, scheduler: &mut dyn Scheduler) {
        timer::stop(&mut self.scroll_timer, scheduler);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::timer::Timers;

    #[derive(Debug, Default)]
    struct CountingFullscreen {
        active: bool,
        requests: Rc<Cell<u32>>,
        exits: Rc<Cell<u32>>,
    }

    impl Fullscreen for CountingFullscreen {
        fn request(&mut self) -> Result<(), FullscreenError> {
            self.requests.set(self.requests.get() + 1);
            self.active = true;
            Ok(())
        }

        fn exit(&mut self) -> Result<(), FullscreenError> {
            self.exits.set(self.exits.get() + 1);
            self.active = false;
            Ok(())
        }

        fn is_active(&self) -> bool {
            self.active
        }

        fn exited_externally(&mut self) {
            self.active = false;
        }
    }

    /// Counts scroll calls on a tall document.
    #[derive(Debug, Default)]
    struct CountingViewport {
        position: u32,
        scrolls: u32,
    }

    impl Viewport for CountingViewport {
        fn position(&self) -> u32 {
            self.position
        }
        fn viewport_height(&self) -> u32 {
            1_000
        }
        fn document_height(&self) -> u32 {
            1_000_000
        }
        fn scroll_to(&mut self, position: u32) {
            self.scrolls += 1;
            self.position = position;
        }
    }

    fn controller() -> (ViewModeController, Rc<Cell<u32>>, Rc<Cell<u32>>) {
        let fullscreen = CountingFullscreen::default();
        let requests = Rc::clone(&fullscreen.requests);
        let exits = Rc::clone(&fullscreen.exits);
        (
            ViewModeController::new(Box::new(fullscreen)),
            requests,
            exits,
        )
    }

    fn run_for(
        controller: &mut ViewModeController,
        timers: &mut Timers,
        viewport: &mut CountingViewport,
        duration: Duration,
    ) {
        for task in timers.advance(duration) {
            controller.on_tick(task, viewport);
        }
    }

    #[test]
    fn test_double_enter_keeps_one_timer() {
        let (mut controller, requests, _) = controller();
        let mut state = DashboardState::new();
        let mut timers = Timers::new();
        let mut viewport = CountingViewport::default();

        controller.enter(ViewMode::Monitor, &mut state, &mut timers);
        controller.enter(ViewMode::Monitor, &mut state, &mut timers);
        assert_eq!(timers.active_for(Task::AutoScroll), 1);
        assert_eq!(requests.get(), 1);

        run_for(&mut controller, &mut timers, &mut viewport, Duration::from_secs(80));
        assert_eq!(viewport.scrolls, 10);
    }

    #[test]
    fn test_teardown_stops_scrolling() {
        let (mut controller, _, _) = controller();
        let mut state = DashboardState::new();
        let mut timers = Timers::new();
        let mut viewport = CountingViewport::default();

        controller.enter(ViewMode::Monitor, &mut state, &mut timers);
        controller.teardown(&mut timers);

        run_for(&mut controller, &mut timers, &mut viewport, Duration::from_secs(80));
        assert_eq!(viewport.scrolls, 0);
    }

    #[test]
    fn test_enter_normal_exits_fullscreen() {
        let (mut controller, _, exits) = controller();
        let mut state = DashboardState::new();
        let mut timers = Timers::new();

        controller.enter(ViewMode::Monitor, &mut state, &mut timers);
        assert!(controller.is_fullscreen());

        controller.enter(ViewMode::Normal, &mut state, &mut timers);
        assert_eq!(state.view_mode, ViewMode::Normal);
        assert_eq!(timers.active(), 0);
        assert_eq!(exits.get(), 1);

        controller.enter(ViewMode::Normal, &mut state, &mut timers);
        assert_eq!(exits.get(), 1);
    }

    #[test]
    fn test_external_exit_reconciles() {
        let (mut controller, _, exits) = controller();
        let mut state = DashboardState::new();
        let mut timers = Timers::new();

        controller.enter(ViewMode::Monitor, &mut state, &mut timers);
        controller.on_fullscreen_change(false, &mut state, &mut timers);

        assert_eq!(state.view_mode, ViewMode::Normal);
        assert!(!controller.is_scrolling());
        assert!(!controller.is_fullscreen());
        assert_eq!(exits.get(), 0);
    }

    #[test]
    fn test_toggle() {
        let (mut controller, _, _) = controller();
        let mut state = DashboardState::new();
        let mut timers = Timers::new();

        controller.toggle(&mut state, &mut timers);
        assert_eq!(state.view_mode, ViewMode::Monitor);
        controller.toggle(&mut state, &mut timers);
        assert_eq!(state.view_mode, ViewMode::Normal);
        assert_eq!(timers.active(), 0);
    }

    #[test]
    fn test_unsupported_fullscreen_still_enters_monitor() {
        let mut controller = ViewModeController::new(Box::new(NoFullscreen));
        let mut state = DashboardState::new();
        let mut timers = Timers::new();

        controller.enter(ViewMode::Monitor, &mut state, &mut timers);
        assert_eq!(state.view_mode, ViewMode::Monitor);
        assert!(controller.is_scrolling());

        controller.enter(ViewMode::Normal, &mut state, &mut timers);
        assert_eq!(state.view_mode, ViewMode::Normal);
    }

    #[test]
    fn test_scroll_interval_from_config() {
        let (controller, _, _) = controller();
        let config = PollConfig {
            scroll_interval: Duration::from_secs(2),
            ..PollConfig::fallback()
        };
        let mut controller = controller.with_config(&config);
        let mut state = DashboardState::new();
        let mut timers = Timers::new();
        let mut viewport = CountingViewport::default();

        controller.enter(ViewMode::Monitor, &mut state, &mut timers);
        run_for(&mut controller, &mut timers, &mut viewport, Duration::from_secs(10));
        assert_eq!(viewport.scrolls, 5);
    }

    #[test]
    fn test_scroll_step() {
        // advance by 80% of the viewport
        assert_eq!(scroll_step(0, 500, 5_000, 0.8, 100), 400);
        // within threshold of the bottom: wrap
        assert_eq!(scroll_step(4_450, 500, 5_000, 0.8, 100), 0);
        // document shorter than the viewport
        assert_eq!(scroll_step(0, 40, 30, 0.8, 2), 0);
        // tiny viewport still moves
        assert_eq!(scroll_step(0, 1, 100, 0.5, 2), 1);
    }

    #[test]
    fn test_scroll_state_clamps() {
        let mut scroll = ScrollState::new();
        scroll.set_extent(10, 25);
        scroll.scroll_to(100);
        assert_eq!(scroll.offset(), 15);

        scroll.scroll_by(-20);
        assert_eq!(scroll.offset(), 0);

        scroll.scroll_to(15);
        scroll.set_extent(10, 12);
        assert_eq!(scroll.offset(), 2);
    }
}
