//! Inventory of deployed products, environments, microservices and databases.
//!
//! These types match the JSON served by the Vision backend under
//! `/api/environments` (and the `environments` half of `/api/dashboard_data`).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The complete inventory being monitored.
///
/// Replaced as a whole on every successful inventory fetch; never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryTree {
    /// Products in display order.
    #[serde(rename = "product_versions", default)]
    pub products: Vec<Product>,
}

/// A product and the environments it is deployed to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, alias = "product_name", alias = "product")]
    pub name: String,
    #[serde(default)]
    pub environments: Vec<Environment>,
}

/// One deployment environment (e.g. staging, production) of a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    #[serde(default, alias = "environment_name")]
    pub name: String,
    /// Public URL of the environment; also its health key.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub microservices: Vec<Microservice>,
    #[serde(default)]
    pub databases: Vec<Database>,
}

/// A microservice running in an environment.
///
/// Older inventories name the health-checked URL `service_url` instead of
/// `server_url`. Both are kept so the key deriver can tell which one was used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Microservice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<Port>,
}

impl Microservice {
    /// Create a microservice identified by its canonical server URL.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: Some(server_url.into()),
            ..Self::default()
        }
    }

    /// The URL used for health lookups: `server_url`, else the legacy `service_url`.
    pub fn url(&self) -> &str {
        self.server_url.as_deref().or(self.service_url.as_deref()).unwrap_or_default()
    }

    /// True when only the legacy `service_url` field identifies this service.
    pub fn uses_legacy_url(&self) -> bool {
        self.server_url.is_none() && self.service_url.is_some()
    }

    /// Display name, falling back to the URL.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.url())
    }
}

/// A database attached to an environment.
///
/// Connection fields beyond the ones used for the health key are preserved in
/// `extra` so the entry can be handed back to `/api/db/execute` unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: Port,
    #[serde(default)]
    pub database_name: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Database {
    pub fn new(host: impl Into<String>, port: u16, database_name: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Port::from(port),
            database_name: database_name.into(),
            extra: BTreeMap::new(),
        }
    }
}

/// A port as the backend sent it.
///
/// Inventories written by hand carry ports as numbers or as strings. The value
/// is kept verbatim so derived health keys match the backend's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Port {
    Number(u64),
    Text(String),
}

impl Default for Port {
    fn default() -> Self {
        Port::Text(String::new())
    }
}

impl From<u16> for Port {
    fn from(port: u16) -> Self {
        Port::Number(port.into())
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Port::Number(n) => write!(f, "{n}"),
            Port::Text(s) => f.write_str(s),
        }
    }
}

impl InventoryTree {
    /// Iterate over every environment with the product it belongs to.
    pub fn environments(&self) -> impl Iterator<Item = (&Product, &Environment)> {
        self.products.iter().flat_map(|p| p.environments.iter().map(move |e| (p, e)))
    }

    /// Number of microservices keyed through the legacy `service_url` field.
    pub fn legacy_keyed_services(&self) -> usize {
        self.environments()
            .flat_map(|(_, env)| env.microservices.iter())
            .filter(|ms| ms.uses_legacy_url())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
