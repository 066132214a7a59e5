//! Inventory models and health aggregation.
//!
//! This module turns the raw inventory and health map served by the backend
//! into the statistics shown on the dashboard.
//!
//! ## Submodules
//!
//! - [`inventory`]: Products, environments, microservices and databases
//! - [`keys`]: Health key derivation for each entity kind
//! - [`health`]: The health map and per-entity [`EntityStatus`]
//! - [`aggregate`]: Uptime statistics per scope and per-category tallies
//! - [`duration`]: Interval parsing and age formatting
//!
//! ## Data Flow
//!
//! ```text
//! InventoryTree ──┐
//!                 ├──▶ keys::*_key() ──▶ HealthMap lookup
//! HealthMap ──────┘            │
//!                              ▼
//!                 aggregate(tree, health, Scope) ──▶ UptimeStat
//!                 category_stats(tree, health)   ──▶ CategoryStats
//! ```

pub mod aggregate;
pub mod duration;
pub mod health;
pub mod inventory;
pub mod keys;

pub use aggregate::{
    aggregate, category_stats, environment_names, group_status, healthy_count, CategoryStats,
    GroupStatus, Scope, Tally, UptimeStat,
};
pub use health::{EntityStatus, HealthMap};
pub use inventory::{Database, Environment, InventoryTree, Microservice, Port, Product};
