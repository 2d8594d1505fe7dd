//! Runtime configuration from environment variables
//!
//! Every knob has a default so the binaries run against a conventional
//! layout (`data/alphaflow.db`, `state/`, `out/`) with no .env present.

use crate::signal_core::detector::DetectorConfig;
use std::collections::HashSet;
use std::env;

/// Configuration for a signal/P&L run
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite trade log written by the normalizer
    pub db_path: String,

    /// Output path for emitted alerts (JSONL, appended)
    pub alerts_output_path: String,

    /// State file holding already-emitted alert ids
    pub seen_alerts_path: String,

    /// Cross-source correlation window in days
    pub trinity_window_days: i64,

    /// Tight-window bonus threshold for convergence scoring (days)
    pub tight_window_days: i64,

    /// Minimum spacing between valuation requests (milliseconds)
    pub price_min_interval_ms: u64,

    /// Extended wait after an upstream rate-limit response (seconds)
    pub price_backoff_secs: u64,

    /// Per-request HTTP timeout (seconds)
    pub request_timeout_secs: u64,

    /// Detector thresholds
    pub detector: DetectorConfig,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables (all optional):
    /// - `ALPHAFLOW_DB_PATH` (default: data/alphaflow.db)
    /// - `ALERTS_OUTPUT_PATH` (default: out/alerts.jsonl)
    /// - `SEEN_ALERTS_PATH` (default: state/seen_alerts.json)
    /// - `TRINITY_WINDOW_DAYS` (default: 30)
    /// - `TIGHT_WINDOW_DAYS` (default: 14)
    /// - `PRICE_MIN_INTERVAL_MS` (default: 500)
    /// - `PRICE_BACKOFF_SECS` (default: 60)
    /// - `REQUEST_TIMEOUT_SECS` (default: 10)
    /// - `HIGH_CONVICTION_IDS` (comma-separated canonical actor ids)
    /// - detector thresholds, see [`DetectorConfig`] field names upper-cased
    pub fn from_env() -> Self {
        Self {
            db_path: env::var("ALPHAFLOW_DB_PATH")
                .unwrap_or_else(|_| "data/alphaflow.db".to_string()),

            alerts_output_path: env::var("ALERTS_OUTPUT_PATH")
                .unwrap_or_else(|_| "out/alerts.jsonl".to_string()),

            seen_alerts_path: env::var("SEEN_ALERTS_PATH")
                .unwrap_or_else(|_| "state/seen_alerts.json".to_string()),

            trinity_window_days: env_parse("TRINITY_WINDOW_DAYS", 30),
            tight_window_days: env_parse("TIGHT_WINDOW_DAYS", 14),
            price_min_interval_ms: env_parse("PRICE_MIN_INTERVAL_MS", 500),
            price_backoff_secs: env_parse("PRICE_BACKOFF_SECS", 60),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 10),

            detector: detector_config_from_env(),
        }
    }
}

fn detector_config_from_env() -> DetectorConfig {
    let defaults = DetectorConfig::default();

    DetectorConfig {
        cluster_window_days: env_parse("CLUSTER_WINDOW_DAYS", defaults.cluster_window_days),
        min_insider_cluster: env_parse("MIN_INSIDER_CLUSTER", defaults.min_insider_cluster),
        min_cluster_buy_value: env_parse("MIN_CLUSTER_BUY_VALUE", defaults.min_cluster_buy_value),
        legislator_cluster_window_days: env_parse(
            "LEGISLATOR_CLUSTER_WINDOW_DAYS",
            defaults.legislator_cluster_window_days,
        ),
        min_legislator_cluster: env_parse(
            "MIN_LEGISLATOR_CLUSTER",
            defaults.min_legislator_cluster,
        ),
        min_legislator_cluster_value: env_parse(
            "MIN_LEGISLATOR_CLUSTER_VALUE",
            defaults.min_legislator_cluster_value,
        ),
        min_bearish_cluster: env_parse("MIN_BEARISH_CLUSTER", defaults.min_bearish_cluster),
        min_bearish_cluster_value: env_parse(
            "MIN_BEARISH_CLUSTER_VALUE",
            defaults.min_bearish_cluster_value,
        ),
        min_ceo_cfo_buy: env_parse("MIN_CEO_CFO_BUY", defaults.min_ceo_cfo_buy),
        min_large_buy: env_parse("MIN_LARGE_BUY", defaults.min_large_buy),
        min_first_buy_12m: env_parse("MIN_FIRST_BUY_12M", defaults.min_first_buy_12m),
        high_conviction_ids: env_id_set("HIGH_CONVICTION_IDS")
            .unwrap_or(defaults.high_conviction_ids),
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Comma-separated canonical actor ids, e.g. "nancy-pelosi,dan-crenshaw"
fn env_id_set(key: &str) -> Option<HashSet<String>> {
    env::var(key).ok().map(|s| {
        s.split(',')
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        env::remove_var("ALPHAFLOW_DB_PATH");
        env::remove_var("TRINITY_WINDOW_DAYS");

        let config = Config::from_env();

        assert_eq!(config.db_path, "data/alphaflow.db");
        assert_eq!(config.trinity_window_days, 30);
        assert_eq!(config.tight_window_days, 14);
        assert_eq!(config.price_min_interval_ms, 500);
        assert!(!config.detector.high_conviction_ids.is_empty());
    }

    #[test]
    fn test_custom_allowlist() {
        env::set_var("HIGH_CONVICTION_IDS", "alice-a, bob-b,,");

        let config = Config::from_env();

        assert_eq!(config.detector.high_conviction_ids.len(), 2);
        assert!(config.detector.high_conviction_ids.contains("alice-a"));
        assert!(config.detector.high_conviction_ids.contains("bob-b"));

        env::remove_var("HIGH_CONVICTION_IDS");
    }
}
