//! Health map and per-entity status.

use std::collections::BTreeMap;

/// Health key to up/down, as reported by the backend.
///
/// A key that is absent means the entity has not been checked yet (or its key
/// does not match what the backend used).
pub type HealthMap = BTreeMap<String, bool>;

/// Status of a single monitored entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntityStatus {
    Down,
    Unknown,
    Up,
}

impl EntityStatus {
    /// Look up one key in the health map.
    pub fn lookup(health: &HealthMap, key: &str) -> Self {
        match health.get(key) {
            Some(true) => EntityStatus::Up,
            Some(false) => EntityStatus::Down,
            None => EntityStatus::Unknown,
        }
    }

    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            EntityStatus::Up => "Online",
            EntityStatus::Down => "Offline",
            EntityStatus::Unknown => "Checking...",
        }
    }

    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            EntityStatus::Up => "UP",
            EntityStatus::Down => "DOWN",
            EntityStatus::Unknown => "...",
        }
    }
}
