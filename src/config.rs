use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Load environment variables from .env file with robust parsing.
/// Handles values with spaces without requiring quotes.
pub fn load_dotenv() {
    let env_path = Path::new(".env");
    if !env_path.exists() {
        return;
    }

    let content = match fs::read_to_string(env_path) {
        Ok(c) => c,
        Err(_) => return,
    };

    for line in content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Find the first '=' and split there
        if let Some(eq_pos) = line.find('=') {
            let key = line[..eq_pos].trim();
            let mut value = line[eq_pos + 1..].trim();

            // Remove surrounding quotes if present
            if (value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\''))
            {
                value = &value[1..value.len() - 1];
            }

            // Only set if not already set (env vars take precedence)
            if std::env::var(key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub schedule: ScheduleConfig,
}

/// Connection settings for the Home Assistant REST API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub base_url: String,
    pub token: String,
    pub request_timeout_secs: u64,
}

/// Cadence settings for the three collector timers plus the retention cutoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Reading-poll cadence in milliseconds.
    pub collection_interval_ms: u64,
    /// Roster refresh cadence in milliseconds.
    pub rediscovery_interval_ms: u64,
    /// Eviction cadence in milliseconds.
    pub cleanup_interval_ms: u64,
    /// Maximum age of a reading before eviction.
    pub retention_days: i64,
}

impl ScheduleConfig {
    pub fn collection_interval(&self) -> Duration {
        Duration::from_millis(self.collection_interval_ms)
    }

    pub fn rediscovery_interval(&self) -> Duration {
        Duration::from_millis(self.rediscovery_interval_ms)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }

    pub fn retention_window(&self) -> chrono::Duration {
        chrono::Duration::days(self.retention_days)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig {
                base_url: "http://homeassistant.local:8123".to_string(),
                token: String::new(),
                request_timeout_secs: 10,
            },
            schedule: ScheduleConfig {
                collection_interval_ms: 60_000,
                rediscovery_interval_ms: 300_000,
                cleanup_interval_ms: 3_600_000,
                retention_days: 30,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("HA_BASE_URL") {
            config.source.base_url = url;
        }
        if let Ok(token) = std::env::var("HA_TOKEN") {
            config.source.token = token;
        }
        if let Ok(timeout) = std::env::var("HA_REQUEST_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                config.source.request_timeout_secs = t;
            }
        }

        // Scheduler cadences
        if let Ok(interval) = std::env::var("COLLECTION_INTERVAL_MS") {
            if let Ok(ms) = interval.parse() {
                config.schedule.collection_interval_ms = ms;
            }
        }
        if let Ok(interval) = std::env::var("REDISCOVERY_INTERVAL_MS") {
            if let Ok(ms) = interval.parse() {
                config.schedule.rediscovery_interval_ms = ms;
            }
        }
        if let Ok(interval) = std::env::var("CLEANUP_INTERVAL_MS") {
            if let Ok(ms) = interval.parse() {
                config.schedule.cleanup_interval_ms = ms;
            }
        }
        if let Ok(days) = std::env::var("RETENTION_DAYS") {
            if let Ok(d) = days.parse() {
                config.schedule.retention_days = d;
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let config = Config::default();
        assert_eq!(config.schedule.collection_interval_ms, 60_000);
        assert_eq!(config.schedule.rediscovery_interval_ms, 300_000);
        assert_eq!(config.schedule.cleanup_interval_ms, 3_600_000);
        assert_eq!(config.schedule.retention_days, 30);
    }

    #[test]
    fn test_interval_helpers() {
        let config = Config::default();
        assert_eq!(
            config.schedule.collection_interval(),
            Duration::from_secs(60)
        );
        assert_eq!(
            config.schedule.retention_window(),
            chrono::Duration::days(30)
        );
    }
}
