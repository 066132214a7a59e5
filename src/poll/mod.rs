//! Polling orchestration.
//!
//! [`PollingScheduler`] owns the health and dashboard timers, turns timer
//! ticks into [`FetchRequest`]s, and applies [`FetchOutcome`]s to the
//! [`DashboardState`]. It never awaits anything itself.

mod config;
mod fetch;

pub use config::{
    PollConfig, DEFAULT_FULL_INTERVAL, DEFAULT_SCROLL_FRACTION, DEFAULT_SCROLL_INTERVAL,
    FALLBACK_INTERVAL, LEGACY_HEALTH_INTERVAL,
};
#[cfg(test)]
pub(crate) use fetch::testing;
pub use fetch::{
    perform, FetchInbox, FetchOutcome, FetchRequest, Fetched, Fetcher, Generation, TokioFetcher,
};

use std::time::Instant;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::data::{HealthMap, InventoryTree};
use crate::state::DashboardState;
use crate::timer::{self, Scheduler, Task, TimerHandle};

/// Which endpoints keep the dashboard fresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PollMode {
    /// `/api/dashboard_data` on the full interval plus `/api/health` on the health interval.
    #[default]
    Combined,
    /// `/api/environments` once at startup, then `/api/health` only.
    Split,
}

/// What applying an outcome did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// State was replaced. `first_inventory` is set the first time an inventory lands.
    Updated { first_inventory: bool },
    /// The fetch failed and the previous data was kept.
    Failed,
    /// The scheduler is torn down, the outcome belongs to an earlier
    /// generation, or it is not a poll result.
    Ignored,
}

/// Drives the periodic health and inventory fetches.
#[derive(Debug)]
pub struct PollingScheduler {
    mode: PollMode,
    config: PollConfig,
    health_timer: Option<TimerHandle>,
    full_timer: Option<TimerHandle>,
    live: bool,
    generation: Generation,
    inventory_seen: bool,
}

impl PollingScheduler {
    pub fn new(mode: PollMode, config: PollConfig) -> Self {
        Self {
            mode,
            config,
            health_timer: None,
            full_timer: None,
            live: false,
            generation: Generation::default(),
            inventory_seen: false,
        }
    }

    pub fn mode(&self) -> PollMode {
        self.mode
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Whether results are still being applied.
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// The generation stamped on requests issued now.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Issue the startup fetches and (re)start the timers.
    ///
    /// Calling this again cancels the previous timers first. Results of
    /// requests issued before the call are no longer applied.
    pub fn start(
        &mut self,
        state: &mut DashboardState,
        scheduler: &mut dyn Scheduler,
        fetcher: &mut dyn Fetcher,
    ) {
        self.live = true;
        self.generation = self.generation.next();
        // A health check from the previous run will never be applied.
        state.refreshing = false;
        if state.inventory.is_none() {
            state.loading = true;
        }

        match self.mode {
            PollMode::Combined => {
                fetcher.spawn(self.generation, FetchRequest::Dashboard);
                timer::restart(
                    &mut self.full_timer,
                    scheduler,
                    self.config.full_interval,
                    Task::DashboardPoll,
                );
            }
            PollMode::Split => {
                fetcher.spawn(self.generation, FetchRequest::Inventory);
                fetcher.spawn(self.generation, FetchRequest::Health);
                timer::stop(&mut self.full_timer, scheduler);
            }
        }
        timer::restart(
            &mut self.health_timer,
            scheduler,
            self.config.health_interval,
            Task::HealthPoll,
        );

        info!(
            mode = ?self.mode,
            health_ms = self.config.health_interval.as_millis() as u64,
            full_ms = self.config.full_interval.as_millis() as u64,
            "polling started"
        );
    }

    /// React to a fired timer. Returns false for tasks this scheduler does not own.
    pub fn on_tick(&mut self, task: Task, fetcher: &mut dyn Fetcher) -> bool {
        let request = match task {
            Task::HealthPoll => FetchRequest::Health,
            Task::DashboardPoll => FetchRequest::Dashboard,
            Task::AutoScroll => return false,
        };
        if self.live {
            debug!(?request, "poll tick");
            fetcher.spawn(self.generation, request);
        }
        true
    }

    /// Force a fresh server-side health check.
    ///
    /// Does nothing while a previous refresh is still in flight.
    pub fn refresh_health(&mut self, state: &mut DashboardState, fetcher: &mut dyn Fetcher) {
        if !self.live || state.refreshing {
            return;
        }
        state.refreshing = true;
        fetcher.spawn(self.generation, FetchRequest::HealthCheck);
    }

    /// Apply an outcome of the current generation to `state`.
    pub fn apply(&mut self, outcome: FetchOutcome, state: &mut DashboardState) -> Applied {
        self.apply_fetched(
            Fetched {
                generation: self.generation,
                outcome,
            },
            state,
        )
    }

    /// Apply a stamped outcome, dropping it unless it belongs to the current run.
    pub fn apply_fetched(&mut self, fetched: Fetched, state: &mut DashboardState) -> Applied {
        if !self.live {
            debug!("dropping fetch result after teardown");
            return Applied::Ignored;
        }
        if fetched.generation != self.generation {
            debug!(
                stale = ?fetched.generation,
                current = ?self.generation,
                "dropping fetch result from an earlier run"
            );
            return Applied::Ignored;
        }

        match fetched.outcome {
            FetchOutcome::Inventory(Ok(tree)) => {
                let first_inventory = self.replace_inventory(state, tree);
                Applied::Updated { first_inventory }
            }
            FetchOutcome::Inventory(Err(e)) => {
                warn!(error = %e, "inventory fetch failed");
                Self::inventory_failed(state, &e.to_string());
                Applied::Failed
            }
            FetchOutcome::Dashboard(Ok(data)) => {
                let first_inventory = self.replace_inventory(state, data.environments);
                Self::replace_health(state, data.health);
                Applied::Updated { first_inventory }
            }
            FetchOutcome::Dashboard(Err(e)) => {
                warn!(error = %e, "dashboard fetch failed");
                Self::inventory_failed(state, &e.to_string());
                Applied::Failed
            }
            FetchOutcome::Health(Ok(map)) => {
                Self::replace_health(state, map);
                Applied::Updated {
                    first_inventory: false,
                }
            }
            FetchOutcome::Health(Err(e)) => {
                warn!(error = %e, "health fetch failed, keeping previous health");
                Applied::Failed
            }
            FetchOutcome::HealthCheck(result) => {
                state.refreshing = false;
                match result {
                    Ok(map) => {
                        Self::replace_health(state, map);
                        Applied::Updated {
                            first_inventory: false,
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "health check failed, keeping previous health");
                        Applied::Failed
                    }
                }
            }
            FetchOutcome::Bookmarks(_) | FetchOutcome::BookmarkSearch { .. } => Applied::Ignored,
        }
    }

    /// Cancel both timers and stop applying results.
    pub fn teardown(&mut self, scheduler: &mut dyn Scheduler) {
        timer::stop(&mut self.health_timer, scheduler);
        timer::stop(&mut self.full_timer, scheduler);
        if self.live {
            info!("polling stopped");
        }
        self.live = false;
        self.generation = self.generation.next();
    }

    fn replace_inventory(&mut self, state: &mut DashboardState, tree: InventoryTree) -> bool {
        let legacy = tree.legacy_keyed_services();
        if legacy > 0 {
            warn!(
                count = legacy,
                "microservices keyed by service_url; health keys expect server_url"
            );
        }
        info!(
            products = tree.products.len(),
            environments = tree.environments().count(),
            "inventory loaded"
        );

        state.inventory = Some(tree);
        state.loading = false;
        state.error = None;

        let first = !self.inventory_seen;
        self.inventory_seen = true;
        first
    }

    fn replace_health(state: &mut DashboardState, map: HealthMap) {
        debug!(keys = map.len(), "health updated");
        state.health = map;
        state.last_updated = Some(Instant::now());
    }

    fn inventory_failed(state: &mut DashboardState, reason: &str) {
        state.loading = false;
        state.error = Some(format!("Failed to load environment data: {reason}"));
    }
}
