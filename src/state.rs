//! Dashboard state shared by the polling and view-mode controllers.

use std::time::Instant;

use crate::data::{HealthMap, InventoryTree};

/// Display mode of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// Interactive mode with header, tabs and status bar.
    #[default]
    Normal,
    /// Full-screen, auto-scrolling display for unattended screens.
    Monitor,
}

impl ViewMode {
    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Normal => "Normal",
            ViewMode::Monitor => "Monitor",
        }
    }
}

/// Snapshot of everything fetched from the backend plus the current view mode.
///
/// Pure storage: the [`PollingScheduler`](crate::poll::PollingScheduler) writes
/// inventory and health, the [`ViewModeController`](crate::view::ViewModeController)
/// writes the view mode, and rendering reads.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// Last successfully fetched inventory, if any.
    pub inventory: Option<InventoryTree>,
    /// Last successfully fetched health map.
    pub health: HealthMap,
    /// True until the first inventory response (success or failure) lands.
    pub loading: bool,
    /// Blocking error from the last inventory fetch.
    pub error: Option<String>,
    /// True while a manual health refresh is in flight.
    pub refreshing: bool,
    /// When health data was last replaced.
    pub last_updated: Option<Instant>,
    pub view_mode: ViewMode,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            inventory: None,
            health: HealthMap::new(),
            loading: true,
            error: None,
            refreshing: false,
            last_updated: None,
            view_mode: ViewMode::Normal,
        }
    }

    /// Borrow the inventory, or an empty one before the first load.
    pub fn inventory(&self) -> &InventoryTree {
        static EMPTY: InventoryTree = InventoryTree {
            products: Vec::new(),
        };
        self.inventory.as_ref().unwrap_or(&EMPTY)
    }
}
