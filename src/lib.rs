//! # vision-dashboard
//!
//! A terminal dashboard and library for watching the health of product
//! environments served by a Vision backend.
//!
//! The backend publishes an inventory of products, their environments, and
//! each environment's microservices and databases, plus a flat map of health
//! booleans keyed per entity. This crate polls both, joins them, and shows
//! uptime per product, per environment and overall, with a full-screen,
//! auto-scrolling monitor mode for wall displays.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                            Application                           │
//! │  ┌───────────┐ ticks ┌──────────┐ outcomes ┌──────────────────┐  │
//! │  │  timer    │──────▶│  poll    │◀─────────│ poll::Fetcher    │  │
//! │  │ (Timers)  │       │(scheduler)          │ (tokio tasks)    │  │
//! │  └─────┬─────┘       └────┬─────┘          └────────┬─────────┘  │
//! │        │ AutoScroll       │ apply                   │            │
//! │        ▼                  ▼                         ▼            │
//! │  ┌───────────┐      ┌──────────┐             ┌────────────┐      │
//! │  │   view    │─────▶│  state   │────▶ data ─▶│     ui     │      │
//! │  │ (monitor) │      │(Dashboard│  (aggregate)│ (ratatui)  │      │
//! │  └───────────┘      │  State)  │             └────────────┘      │
//! │                     └──────────┘     source ◀── HttpBackend      │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`data`]**: Inventory models, health keys and uptime aggregation
//! - **[`source`]**: The [`Backend`] trait, its HTTP client and wire types
//! - **[`poll`]**: [`PollingScheduler`], poll intervals and request dispatch
//! - **[`view`]**: [`ViewModeController`] for normal/monitor mode and auto-scroll
//! - **[`timer`]**: The [`Scheduler`] trait and the virtual-clock [`Timers`]
//! - **[`app`]**, **[`events`]**, **[`ui`]**: The terminal application
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch a backend
//! vision-dashboard --base-url http://vision.internal:5000
//!
//! # Start straight into monitor mode
//! vision-dashboard --base-url "http://vision.internal:5000/?mode=monitor"
//!
//! # Write an uptime report and exit
//! vision-dashboard --export report.json
//! ```
//!
//! ### As a library
//!
//! ```
//! use vision_dashboard::data::{aggregate, InventoryTree, HealthMap, Scope};
//!
//! let tree: InventoryTree = serde_json::from_str(r#"{
//!     "product_versions": [{
//!         "name": "Billing",
//!         "environments": [{ "name": "prod", "url": "https://billing" }]
//!     }]
//! }"#).unwrap();
//!
//! let mut health = HealthMap::new();
//! health.insert("env_https://billing".into(), true);
//!
//! let stat = aggregate(&tree, &health, Scope::Overall);
//! assert_eq!(stat.uptime_percent, 100);
//! ```
//!
//! ### Driving the scheduler by hand
//!
//! ```
//! use std::time::Duration;
//! use vision_dashboard::{DashboardState, PollConfig, PollMode, PollingScheduler, Timers};
//! use vision_dashboard::poll::{FetchRequest, Fetcher, Generation};
//!
//! #[derive(Debug, Default)]
//! struct Queue(Vec<FetchRequest>);
//!
//! impl Fetcher for Queue {
//!     fn spawn(&mut self, _generation: Generation, request: FetchRequest) {
//!         self.0.push(request);
//!     }
//! }
//!
//! let mut state = DashboardState::new();
//! let mut timers = Timers::new();
//! let mut queue = Queue::default();
//!
//! let mut poller = PollingScheduler::new(PollMode::Split, PollConfig::fallback());
//! poller.start(&mut state, &mut timers, &mut queue);
//! assert_eq!(queue.0, vec![FetchRequest::Inventory, FetchRequest::Health]);
//!
//! for task in timers.advance(Duration::from_secs(15)) {
//!     poller.on_tick(task, &mut queue);
//! }
//! assert_eq!(queue.0.len(), 3);
//! ```

pub mod app;
pub mod data;
pub mod events;
pub mod logging;
pub mod poll;
pub mod report;
pub mod settings;
pub mod source;
pub mod state;
pub mod timer;
pub mod ui;
pub mod view;

// Re-export main types for convenience
pub use app::App;
pub use data::{EntityStatus, HealthMap, InventoryTree, Scope, UptimeStat};
pub use poll::{PollConfig, PollMode, PollingScheduler};
pub use report::Report;
pub use settings::Settings;
pub use source::{Backend, FetchError, HttpBackend, MemoryBackend};
pub use state::{DashboardState, ViewMode};
pub use timer::{Scheduler, Task, Timers};
pub use view::{Fullscreen, FullscreenError, ViewModeController};
