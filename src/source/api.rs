//! Wire types for the Vision backend API.
//!
//! Field names follow the backend's JSON. Unknown fields are ignored so the
//! dashboard keeps working against newer backends.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::{Database, HealthMap, InventoryTree};

/// Endpoint paths, relative to the backend base URL.
pub mod endpoints {
    pub const CONFIG: &str = "/api/config";
    pub const ENVIRONMENTS: &str = "/api/environments";
    pub const HEALTH: &str = "/api/health";
    pub const HEALTH_CHECK: &str = "/api/health/check";
    pub const DASHBOARD: &str = "/api/dashboard_data";
    pub const BOOKMARKS: &str = "/api/bookmarks";
    pub const BOOKMARKS_SEARCH: &str = "/api/bookmarks/search";
    pub const DB_EXECUTE: &str = "/api/db/execute";
}

/// `GET /api/config`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    #[serde(default)]
    pub health_check_interval_ms: Option<u64>,
    #[serde(default)]
    pub dashboard_refresh_interval_ms: Option<u64>,
    #[serde(default)]
    pub monitor_scroll_interval_ms: Option<u64>,
    /// Either a percentage (`80`) or a fraction (`0.8`) of the viewport height.
    #[serde(default)]
    pub monitor_scroll_percentage: Option<f64>,
}

/// `GET /api/health/check`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    #[serde(default)]
    pub status: Option<String>,
    pub health: HealthMap,
}

/// `GET /api/dashboard_data`: inventory and health from the same backend generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub environments: InventoryTree,
    #[serde(default)]
    pub health: HealthMap,
}

/// A saved link shown in the bookmarks view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    #[serde(default, alias = "title")]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// `GET /api/bookmarks` and `GET /api/bookmarks/search`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookmarksResponse {
    #[serde(default)]
    pub bookmarks: Vec<Bookmark>,
}

/// `POST /api/db/execute` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub db_config: Database,
    pub query: String,
}

/// `POST /api/db/execute` response. The backend owns the SQL semantics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        default,
        rename = "executedQuery",
        skip_serializing_if = "Option::is_none"
    )]
    pub executed_query: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_config() {
        let json = r#"{
            "healthCheckIntervalMs": 20000,
            "monitorScrollIntervalMs": 8000,
            "monitorScrollPercentage": 80,
            "theme": "dark"
        }"#;

        let config: RemoteConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.health_check_interval_ms, Some(20000));
        assert_eq!(config.monitor_scroll_interval_ms, Some(8000));
        assert_eq!(config.monitor_scroll_percentage, Some(80.0));
        assert!(config.dashboard_refresh_interval_ms.is_none());
    }

    #[test]
    fn test_deserialize_dashboard_data() {
        let json = r#"{
            "environments": { "product_versions": [ { "name": "P", "environments": [] } ] },
            "health": { "env_https://x": true }
        }"#;

        let data: DashboardData = serde_json::from_str(json).unwrap();
        assert_eq!(data.environments.products.len(), 1);
        assert_eq!(data.health.get("env_https://x"), Some(&true));
    }

    #[test]
    fn test_deserialize_query_failure() {
        let json = r#"{ "success": false, "error": "syntax error", "executedQuery": "SELEC 1" }"#;

        let response: QueryResponse = serde_json::from_str(json).unwrap();
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("syntax error"));
        assert_eq!(response.executed_query.as_deref(), Some("SELEC 1"));
        assert!(response.rows.is_none());
    }

    #[test]
    fn test_bookmark_title_alias() {
        let json = r#"{ "bookmarks": [ { "title": "Grafana", "url": "https://grafana", "tags": ["ops"] } ] }"#;

        let response: BookmarksResponse = serde_json::from_str(json).unwrap();
        let bookmark = &response.bookmarks[0];
        assert_eq!(bookmark.name, "Grafana");
        assert!(bookmark.extra.contains_key("tags"));
    }
}
