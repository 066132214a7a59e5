//! Uptime aggregation over the inventory.
//!
//! Statistics are derived on demand from the current [`InventoryTree`] and
//! [`HealthMap`]; nothing here is cached or mutated, so every render pass sees
//! numbers consistent with the latest poll.

use serde::Serialize;

use super::health::HealthMap;
use super::inventory::{Environment, InventoryTree, Product};
use super::keys::{database_key, environment_key, environment_keys, microservice_key};

/// Uptime for a scope.
///
/// Only entities whose key is present in the health map are counted;
/// unknown entities do not count against uptime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UptimeStat {
    pub online: u32,
    pub offline: u32,
    pub total: u32,
    /// Rounded percentage in `0..=100`.
    pub uptime_percent: u8,
}

/// What to aggregate over.
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    /// Every environment of every product.
    Overall,
    /// The environments of one product.
    Product(&'a Product),
    /// A single environment.
    Environment(&'a Environment),
    /// Every environment, across all products, with this name.
    EnvironmentName(&'a str),
}

impl Scope<'_> {
    /// Percentage reported when nothing in scope has a known status.
    ///
    /// A product with no confirmed entities reads as healthy so it is not
    /// flagged red; overall and environment scopes report 0.
    pub fn empty_uptime_percent(&self) -> u8 {
        match self {
            Scope::Product(_) => 100,
            Scope::Overall | Scope::Environment(_) | Scope::EnvironmentName(_) => 0,
        }
    }
}

/// Aggregate health for `scope`.
///
/// For each environment in scope, looks up the environment key, then each
/// microservice key, then each database key.
pub fn aggregate(tree: &InventoryTree, health: &HealthMap, scope: Scope<'_>) -> UptimeStat {
    let mut stat = UptimeStat::default();

    match scope {
        Scope::Overall => {
            for (_, env) in tree.environments() {
                tally_environment(&mut stat, env, health);
            }
        }
        Scope::Product(product) => {
            for env in &product.environments {
                tally_environment(&mut stat, env, health);
            }
        }
        Scope::Environment(env) => tally_environment(&mut stat, env, health),
        Scope::EnvironmentName(name) => {
            for (_, env) in tree.environments().filter(|(_, env)| env.name == name) {
                tally_environment(&mut stat, env, health);
            }
        }
    }

    stat.uptime_percent = if stat.total > 0 {
        rounded_percent(stat.online, stat.total)
    } else {
        scope.empty_uptime_percent()
    };
    stat
}

fn tally_environment(stat: &mut UptimeStat, env: &Environment, health: &HealthMap) {
    for key in environment_keys(env) {
        match health.get(&key) {
            Some(true) => {
                stat.online += 1;
                stat.total += 1;
            }
            Some(false) => {
                stat.offline += 1;
                stat.total += 1;
            }
            None => {}
        }
    }
}

/// Distinct environment names in first-seen order.
pub fn environment_names(tree: &InventoryTree) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for (_, env) in tree.environments() {
        if !names.contains(&env.name.as_str()) {
            names.push(&env.name);
        }
    }
    names
}

/// `round(100 * part / whole)` with halves rounded away from zero. `whole` must be non-zero.
fn rounded_percent(part: u32, whole: u32) -> u8 {
    let part = u64::from(part);
    let whole = u64::from(whole);
    ((200 * part + whole) / (2 * whole)).min(100) as u8
}

/// Up/total counter for one entity category.
///
/// Unlike [`UptimeStat`], `total` counts every entity in the inventory,
/// including ones whose status is still unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub up: u32,
    pub total: u32,
}

impl Tally {
    fn record(&mut self, up: bool) {
        self.total += 1;
        if up {
            self.up += 1;
        }
    }

    pub fn status(&self) -> GroupStatus {
        GroupStatus::from_counts(self.up, self.total)
    }
}

/// Summary colour of a group of entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GroupStatus {
    /// Every entity in the group is up.
    AllUp,
    /// No entity in the group is up.
    AllDown,
    /// Some, but not all, entities are up.
    Partial,
    /// The group is empty.
    Checking,
}

impl GroupStatus {
    fn from_counts(up: u32, total: u32) -> Self {
        if total == 0 {
            GroupStatus::Checking
        } else if up == total {
            GroupStatus::AllUp
        } else if up == 0 {
            GroupStatus::AllDown
        } else {
            GroupStatus::Partial
        }
    }
}

/// Per-category counts across the whole inventory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub environments: Tally,
    pub microservices: Tally,
    pub databases: Tally,
}

/// Count up/total environments, microservices and databases.
pub fn category_stats(tree: &InventoryTree, health: &HealthMap) -> CategoryStats {
    let mut stats = CategoryStats::default();
    let is_up = |key: String| health.get(&key).copied().unwrap_or(false);

    for (_, env) in tree.environments() {
        stats.environments.record(is_up(environment_key(env)));
        for ms in &env.microservices {
            stats.microservices.record(is_up(microservice_key(ms)));
        }
        for db in &env.databases {
            stats.databases.record(is_up(database_key(db)));
        }
    }
    stats
}

/// Number of keys in `keys` reported up.
pub fn healthy_count<I>(keys: I, health: &HealthMap) -> u32
where
    I: IntoIterator<Item = String>,
{
    keys.into_iter().filter(|k| health.get(k).copied().unwrap_or(false)).count() as u32
}

/// Group status of an arbitrary set of keys (e.g. one environment's microservices).
pub fn group_status<I>(keys: I, health: &HealthMap) -> GroupStatus
where
    I: IntoIterator<Item = String>,
{
    let mut tally = Tally::default();
    for key in keys {
        tally.record(health.get(&key).copied().unwrap_or(false));
    }
    tally.status()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::inventory::{Database, Microservice};

    fn env_with_services(url: &str, services: &[&str]) -> Environment {
        Environment {
            name: url.to_string(),
            url: url.to_string(),
            microservices: services.iter().map(|s| Microservice::new(*s)).collect(),
            databases: Vec::new(),
        }
    }

    fn tree_of(products: Vec<Product>) -> InventoryTree {
        InventoryTree { products }
    }

    fn health_of(entries: &[(&str, bool)]) -> HealthMap {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_overall_empty_health_is_zero() {
        let tree = tree_of(vec![Product {
            name: "p".into(),
            environments: vec![env_with_services("e", &["a", "b"])],
        }]);

        let stat = aggregate(&tree, &HealthMap::new(), Scope::Overall);
        assert_eq!(stat.total, 0);
        assert_eq!(stat.uptime_percent, 0);
    }

    #[test]
    fn test_product_without_environments_is_fully_healthy() {
        let product = Product {
            name: "empty".into(),
            environments: Vec::new(),
        };
        let tree = tree_of(vec![product.clone()]);
        let health = health_of(&[("ms_unrelated", false)]);

        let stat = aggregate(&tree, &health, Scope::Product(&product));
        assert_eq!(stat.total, 0);
        assert_eq!(stat.uptime_percent, 100);
    }

    #[test]
    fn test_zero_denominator_policy_is_asymmetric() {
        let env = env_with_services("e", &["a"]);
        let product = Product {
            name: "p".into(),
            environments: vec![env.clone()],
        };
        let tree = tree_of(vec![product.clone()]);
        let health = HealthMap::new();

        assert_eq!(aggregate(&tree, &health, Scope::Overall).uptime_percent, 0);
        assert_eq!(aggregate(&tree, &health, Scope::Environment(&env)).uptime_percent, 0);
        assert_eq!(aggregate(&tree, &health, Scope::Product(&product)).uptime_percent, 100);
    }

    #[test]
    fn test_three_services_two_up() {
        let env = env_with_services("e", &["a", "b", "c"]);
        let tree = tree_of(vec![Product {
            name: "p".into(),
            environments: vec![env.clone()],
        }]);
        let health = health_of(&[("ms_a", true), ("ms_b", true), ("ms_c", false)]);

        let stat = aggregate(&tree, &health, Scope::Environment(&env));
        assert_eq!(
            stat,
            UptimeStat {
                online: 2,
                offline: 1,
                total: 3,
                uptime_percent: 67
            }
        );
        assert_eq!(aggregate(&tree, &health, Scope::Overall), stat);
    }

    #[test]
    fn test_unknown_keys_excluded_from_total() {
        let env = Environment {
            name: "prod".into(),
            url: "https://prod".into(),
            microservices: vec![Microservice::new("a"), Microservice::new("b")],
            databases: vec![Database::new("h", 5432, "d")],
        };
        let health = health_of(&[("env_https://prod", true), ("db_h:5432/d", false)]);

        let stat = aggregate(&InventoryTree::default(), &health, Scope::Environment(&env));
        assert_eq!(stat.online, 1);
        assert_eq!(stat.offline, 1);
        assert_eq!(stat.total, 2);
        assert_eq!(stat.uptime_percent, 50);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let env = env_with_services("e", &["a", "b"]);
        let tree = tree_of(vec![Product {
            name: "p".into(),
            environments: vec![env],
        }]);
        let health = health_of(&[("ms_a", true), ("ms_b", false), ("env_e", true)]);
        let health_before = health.clone();
        let tree_before = tree.clone();

        let first = aggregate(&tree, &health, Scope::Overall);
        let second = aggregate(&tree, &health, Scope::Overall);
        assert_eq!(first, second);
        assert_eq!(health, health_before);
        assert_eq!(tree, tree_before);
    }

    #[test]
    fn test_environment_name_spans_products() {
        let named = |name: &str, url: &str, services: &[&str]| Environment {
            name: name.into(),
            ..env_with_services(url, services)
        };
        let tree = tree_of(vec![
            Product {
                name: "billing".into(),
                environments: vec![named("prod", "bp", &["a"]), named("qa", "bq", &["b"])],
            },
            Product {
                name: "search".into(),
                environments: vec![named("prod", "sp", &["c", "d"])],
            },
        ]);
        let health = health_of(&[
            ("ms_a", true),
            ("ms_b", false),
            ("ms_c", true),
            ("ms_d", false),
        ]);

        let prod = aggregate(&tree, &health, Scope::EnvironmentName("prod"));
        assert_eq!(
            prod,
            UptimeStat {
                online: 2,
                offline: 1,
                total: 3,
                uptime_percent: 67
            }
        );
        assert_eq!(
            aggregate(&tree, &health, Scope::EnvironmentName("qa")).uptime_percent,
            0
        );

        let missing = aggregate(&tree, &health, Scope::EnvironmentName("staging"));
        assert_eq!(missing.total, 0);
        assert_eq!(missing.uptime_percent, 0);

        assert_eq!(environment_names(&tree), vec!["prod", "qa"]);
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(rounded_percent(1, 8), 13); // 12.5
        assert_eq!(rounded_percent(1, 3), 33);
        assert_eq!(rounded_percent(2, 3), 67);
        assert_eq!(rounded_percent(1, 200), 1); // 0.5
        assert_eq!(rounded_percent(5, 5), 100);
        assert_eq!(rounded_percent(0, 7), 0);
    }

    #[test]
    fn test_overall_spans_products() {
        let tree = tree_of(vec![
            Product {
                name: "p1".into(),
                environments: vec![env_with_services("e1", &["a"])],
            },
            Product {
                name: "p2".into(),
                environments: vec![env_with_services("e2", &["b"])],
            },
        ]);
        let health = health_of(&[("ms_a", true), ("ms_b", false)]);

        let stat = aggregate(&tree, &health, Scope::Overall);
        assert_eq!(stat.total, 2);
        assert_eq!(stat.uptime_percent, 50);
        assert_eq!(
            aggregate(&tree, &health, Scope::Product(&tree.products[0])).uptime_percent,
            100
        );
    }

    #[test]
    fn test_category_stats_count_unknown_in_total() {
        let env = Environment {
            name: "prod".into(),
            url: "u".into(),
            microservices: vec![Microservice::new("a"), Microservice::new("b")],
            databases: vec![Database::new("h", 1, "d")],
        };
        let tree = tree_of(vec![Product {
            name: "p".into(),
            environments: vec![env],
        }]);
        let health = health_of(&[("env_u", true), ("ms_a", true)]);

        let stats = category_stats(&tree, &health);
        assert_eq!(stats.environments, Tally { up: 1, total: 1 });
        assert_eq!(stats.microservices, Tally { up: 1, total: 2 });
        assert_eq!(stats.databases, Tally { up: 0, total: 1 });

        assert_eq!(stats.environments.status(), GroupStatus::AllUp);
        assert_eq!(stats.microservices.status(), GroupStatus::Partial);
        assert_eq!(stats.databases.status(), GroupStatus::AllDown);
        assert_eq!(Tally::default().status(), GroupStatus::Checking);
    }

    #[test]
    fn test_group_status_and_healthy_count() {
        let health = health_of(&[("ms_a", true), ("ms_b", true)]);
        let keys = || vec!["ms_a".to_string(), "ms_b".to_string()];

        assert_eq!(group_status(keys(), &health), GroupStatus::AllUp);
        assert_eq!(healthy_count(keys(), &health), 2);
        assert_eq!(group_status(Vec::new(), &health), GroupStatus::Checking);
        assert_eq!(
            group_status(vec!["ms_a".to_string(), "ms_x".to_string()], &health),
            GroupStatus::Partial
        );
    }
}
