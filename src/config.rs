use std::env;
use std::fmt;
use std::time::Duration;

/// Settings used to verify bearer tokens issued by the identity service.
#[derive(Clone, Debug)]
pub struct JwtSettings {
    pub secret: String,
    pub audience: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub run_migrations: bool,
    pub bind_address: String,
    pub workers: usize,
    pub jwt: JwtSettings,
    pub draft_idle: Duration,
    pub draft_capacity: u64,
    pub metrics_app_label: String,
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid(key, value) => write!(f, "{} has an invalid value: {}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Reads the configuration from the process environment.
    /// Call `dotenv().ok()` first to pick up a local `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let workers: usize = parse_or(&lookup, "WORKERS", num_cpus::get())?;
        if workers == 0 {
            return Err(ConfigError::Invalid("WORKERS", workers.to_string()));
        }

        Ok(Config {
            database_url,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            run_migrations: parse_or(&lookup, "RUN_MIGRATIONS", true)?,
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            workers,
            jwt: JwtSettings {
                secret: jwt_secret,
                audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "authenticated".to_string()),
            },
            draft_idle: Duration::from_secs(60 * parse_or(&lookup, "DRAFT_IDLE_MINUTES", 240u64)?),
            draft_capacity: parse_or(&lookup, "DRAFT_CAPACITY", 10_000)?,
            metrics_app_label: lookup("METRICS_APP_LABEL").unwrap_or_else(|| "gymlog".to_string()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn applies_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/gymlog"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.database_max_connections, 10);
        assert!(config.run_migrations);
        assert_eq!(config.jwt.audience, "authenticated");
        assert_eq!(config.draft_idle, Duration::from_secs(240 * 60));
        assert!(config.workers >= 1);
    }

    #[test]
    fn rejects_empty_secret() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/gymlog"),
            ("JWT_SECRET", "  "),
        ]))
        .unwrap_err();

        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn rejects_unparsable_numbers() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/gymlog"),
            ("JWT_SECRET", "secret"),
            ("WORKERS", "many"),
        ]))
        .unwrap_err();

        assert_eq!(err, ConfigError::Invalid("WORKERS", "many".to_string()));
    }

    #[test]
    fn rejects_zero_workers() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/gymlog"),
            ("JWT_SECRET", "secret"),
            ("WORKERS", "0"),
        ]))
        .unwrap_err();

        assert_eq!(err, ConfigError::Invalid("WORKERS", "0".to_string()));
    }
}
