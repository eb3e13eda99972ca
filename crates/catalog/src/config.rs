use std::ops::RangeInclusive;
use std::time::Duration;

const DEFAULT_RETENTION_DAYS: u32 = 30;

const MAX_CONNECTIONS_RANGE: RangeInclusive<u32> = 1..=1_000;
/// One second to one day.
const TIMEOUT_SECS_RANGE: RangeInclusive<u64> = 1..=86_400;
/// Up to one hundred years.
const RETENTION_DAYS_RANGE: RangeInclusive<u32> = 0..=36_500;
/// One second to one week.
const INTERVAL_SECS_RANGE: RangeInclusive<u64> = 1..=604_800;

/// Catalog configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. Values that
/// fail to parse, or fall outside the accepted range, fall back to the
/// default and log a warning.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    /// Maximum pool size (default: `20`).
    pub max_connections: u32,
    /// Bound for ordinary short transactions (default: 30s).
    pub transaction_timeout: Duration,
    /// Bound for the snapshot transaction, which waits on a full base copy
    /// (default: 600s).
    pub big_transaction_timeout: Duration,
    /// Bucket for template covers written without one (default: `templates`).
    pub template_bucket: String,
    /// How long retired snapshot bases are kept before purging (default: 30 days).
    pub retired_base_retention: chrono::Duration,
    /// Period of the maintenance worker (default: 1 hour).
    pub maintenance_interval: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_connections: 20,
            transaction_timeout: Duration::from_secs(30),
            big_transaction_timeout: Duration::from_secs(600),
            template_bucket: "templates".to_string(),
            retired_base_retention: chrono::Duration::days(i64::from(DEFAULT_RETENTION_DAYS)),
            maintenance_interval: Duration::from_secs(3600),
        }
    }
}

impl CatalogConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default     | Accepted        |
    /// |--------------------------------|-------------|-----------------|
    /// | `DB_MAX_CONNECTIONS`           | `20`        | `1..=1000`      |
    /// | `TRANSACTION_TIMEOUT_SECS`     | `30`        | `1..=86400`     |
    /// | `BIG_TRANSACTION_TIMEOUT_SECS` | `600`       | `1..=86400`     |
    /// | `TEMPLATE_BUCKET`              | `templates` | non-blank       |
    /// | `RETIRED_BASE_RETENTION_DAYS`  | `30`        | `0..=36500`     |
    /// | `MAINTENANCE_INTERVAL_SECS`    | `3600`      | `1..=604800`    |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `from_env` uses the process
    /// environment; tests pass a map.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let max_connections = parse_or(
            &lookup,
            "DB_MAX_CONNECTIONS",
            MAX_CONNECTIONS_RANGE,
            defaults.max_connections,
        );
        let transaction_timeout = Duration::from_secs(parse_or(
            &lookup,
            "TRANSACTION_TIMEOUT_SECS",
            TIMEOUT_SECS_RANGE,
            defaults.transaction_timeout.as_secs(),
        ));
        let big_transaction_timeout = Duration::from_secs(parse_or(
            &lookup,
            "BIG_TRANSACTION_TIMEOUT_SECS",
            TIMEOUT_SECS_RANGE,
            defaults.big_transaction_timeout.as_secs(),
        ));
        let template_bucket = lookup("TEMPLATE_BUCKET")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.template_bucket);
        let retention_days: u32 = parse_or(
            &lookup,
            "RETIRED_BASE_RETENTION_DAYS",
            RETENTION_DAYS_RANGE,
            DEFAULT_RETENTION_DAYS,
        );
        let retired_base_retention = chrono::Duration::days(i64::from(retention_days));
        let maintenance_interval = Duration::from_secs(parse_or(
            &lookup,
            "MAINTENANCE_INTERVAL_SECS",
            INTERVAL_SECS_RANGE,
            defaults.maintenance_interval.as_secs(),
        ));

        if big_transaction_timeout < transaction_timeout {
            tracing::warn!(
                big_secs = big_transaction_timeout.as_secs(),
                transaction_secs = transaction_timeout.as_secs(),
                "BIG_TRANSACTION_TIMEOUT_SECS is shorter than TRANSACTION_TIMEOUT_SECS"
            );
        }

        Self {
            max_connections,
            transaction_timeout,
            big_transaction_timeout,
            template_bucket,
            retired_base_retention,
            maintenance_interval,
        }
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    accepted: RangeInclusive<T>,
    default: T,
) -> T
where
    T: std::str::FromStr + Copy + PartialOrd + std::fmt::Display + std::fmt::Debug,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if accepted.contains(&value) => value,
        Ok(value) => {
            tracing::warn!(
                key,
                %value,
                ?accepted,
                %default,
                "Config value out of range, using default"
            );
            default
        }
        Err(_) => {
            tracing::warn!(key, value = %raw, %default, "Invalid config value, using default");
            default
        }
    }
}
