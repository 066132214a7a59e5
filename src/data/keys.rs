//! Health key derivation.
//!
//! The backend health checker stores one boolean per monitored entity under a
//! string key. These functions rebuild the same key from an inventory entry so
//! it can be looked up in a [`HealthMap`](super::HealthMap).
//!
//! No normalization is applied: a URL that differs from the one the backend
//! checked (case, trailing slash) produces a key that is never found, which
//! shows up as "checking" rather than as an error.

use super::inventory::{Database, Environment, Microservice};

pub const ENVIRONMENT_PREFIX: &str = "env_";
pub const MICROSERVICE_PREFIX: &str = "ms_";
pub const DATABASE_PREFIX: &str = "db_";

/// `env_<url>`
pub fn environment_key(env: &Environment) -> String {
    format!("{}{}", ENVIRONMENT_PREFIX, env.url)
}

/// `ms_<server_url>`, using the legacy `service_url` when `server_url` is absent.
pub fn microservice_key(ms: &Microservice) -> String {
    format!("{}{}", MICROSERVICE_PREFIX, ms.url())
}

/// `db_<host>:<port>/<database_name>`
pub fn database_key(db: &Database) -> String {
    format!(
        "{}{}:{}/{}",
        DATABASE_PREFIX, db.host, db.port, db.database_name
    )
}

/// Every key an environment contributes, in aggregation order:
/// the environment itself, then its microservices, then its databases.
pub fn environment_keys(env: &Environment) -> impl Iterator<Item = String> + '_ {
    std::iter::once(environment_key(env))
        .chain(env.microservices.iter().map(microservice_key))
        .chain(env.databases.iter().map(database_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_key() {
        let env = Environment {
            url: "https://app.example.com/".into(),
            ..Environment::default()
        };
        assert_eq!(environment_key(&env), "env_https://app.example.com/");
    }

    #[test]
    fn test_microservice_key() {
        assert_eq!(
            microservice_key(&Microservice::new("http://svc:8080")),
            "ms_http://svc:8080"
        );
    }

    #[test]
    fn test_microservice_key_legacy_field() {
        let ms = Microservice {
            service_url: Some("http://old".into()),
            ..Microservice::default()
        };
        assert_eq!(microservice_key(&ms), "ms_http://old");
    }

    #[test]
    fn test_database_key() {
        let db = Database::new("db.internal", 1433, "orders");
        assert_eq!(database_key(&db), "db_db.internal:1433/orders");
    }

    #[test]
    fn test_keys_are_stable() {
        let db = Database::new("h", 5432, "d");
        let ms = Microservice::new("u");
        for _ in 0..3 {
            assert_eq!(database_key(&db), database_key(&db.clone()));
            assert_eq!(microservice_key(&ms), "ms_u");
        }
    }

    #[test]
    fn test_no_normalization() {
        let a = Microservice::new("HTTP://Svc/");
        let b = Microservice::new("http://svc");
        assert_ne!(microservice_key(&a), microservice_key(&b));
    }

    #[test]
    fn test_environment_keys_order() {
        let env = Environment {
            url: "e".into(),
            microservices: vec![Microservice::new("m1"), Microservice::new("m2")],
            databases: vec![Database::new("h", 1, "d")],
            ..Environment::default()
        };
        let keys: Vec<String> = environment_keys(&env).collect();
        assert_eq!(keys, vec!["env_e", "ms_m1", "ms_m2", "db_h:1/d"]);
    }
}
