//! JSON export of the current uptime picture.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::data::{
    aggregate, category_stats, environment_names, group_status, healthy_count, keys, CategoryStats, EntityStatus,
    GroupStatus, HealthMap, InventoryTree, Scope, Tally, UptimeStat,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub overall: UptimeStat,
    pub categories: CategoryStats,
    /// Uptime per environment name, pooled across products.
    pub environment_tiers: Vec<TierReport>,
    pub products: Vec<ProductReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierReport {
    pub name: String,
    pub uptime: UptimeStat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductReport {
    pub name: String,
    pub uptime: UptimeStat,
    pub environments: Vec<EnvironmentReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentReport {
    pub name: String,
    pub url: String,
    pub status: &'static str,
    pub uptime: UptimeStat,
    pub microservices: Tally,
    pub microservice_status: GroupStatus,
    pub databases: Tally,
    pub database_status: GroupStatus,
}

impl Report {
    pub fn build(tree: &InventoryTree, health: &HealthMap) -> Self {
        let products = tree
            .products
            .iter()
            .map(|product| ProductReport {
                name: product.name.clone(),
                uptime: aggregate(tree, health, Scope::Product(product)),
                environments: product
                    .environments
                    .iter()
                    .map(|env| {
                        let ms_keys = || env.microservices.iter().map(keys::microservice_key);
                        let db_keys = || env.databases.iter().map(keys::database_key);
                        EnvironmentReport {
                            name: env.name.clone(),
                            url: env.url.clone(),
                            status: EntityStatus::lookup(health, &keys::environment_key(env))
                                .label(),
                            uptime: aggregate(tree, health, Scope::Environment(env)),
                            microservices: Tally {
                                up: healthy_count(ms_keys(), health),
                                total: env.microservices.len() as u32,
                            },
                            microservice_status: group_status(ms_keys(), health),
                            databases: Tally {
                                up: healthy_count(db_keys(), health),
                                total: env.databases.len() as u32,
                            },
                            database_status: group_status(db_keys(), health),
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            overall: aggregate(tree, health, Scope::Overall),
            categories: category_stats(tree, health),
            environment_tiers: environment_names(tree)
                .into_iter()
                .map(|name| TierReport {
                    name: name.to_string(),
                    uptime: aggregate(tree, health, Scope::EnvironmentName(name)),
                })
                .collect(),
            products,
        }
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write export to {}", path.display()))?;
        Ok(())
    }
}
