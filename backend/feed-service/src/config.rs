use std::env;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub presence: PresenceConfig,
    pub sample: SampleConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct PresenceConfig {
    /// Minutes of inactivity after which a user is no longer "online".
    pub default_cutoff_minutes: i64,
    /// Interval of the shared background poller.
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SampleConfig {
    /// Salt mixed into the daily pivot hash.
    pub salt: String,
    /// Fixed reference offset for the day boundary, in hours east of UTC.
    pub utc_offset_hours: i32,
}

// Default value functions
fn default_app_host() -> String {
    "0.0.0.0".to_string()
}

fn default_app_port() -> u16 {
    8081
}

fn default_db_max_connections() -> u32 {
    20
}

fn default_presence_cutoff_minutes() -> i64 {
    15
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_sample_salt() -> String {
    "vigor-daily-sample-v1".to_string()
}

fn default_sample_utc_offset_hours() -> i32 {
    -5
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Config("DATABASE_URL must be set".to_string()))?;

        Ok(Config {
            app: AppConfig {
                host: env::var("APP_HOST").unwrap_or_else(|_| default_app_host()),
                port: env_or("APP_PORT", default_app_port()),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: env_or("DATABASE_MAX_CONNECTIONS", default_db_max_connections()),
            },
            presence: PresenceConfig {
                default_cutoff_minutes: env_or(
                    "PRESENCE_CUTOFF_MINUTES",
                    default_presence_cutoff_minutes(),
                ),
                poll_interval_secs: env_or("PRESENCE_POLL_INTERVAL_SECS", default_poll_interval_secs()),
            },
            sample: SampleConfig {
                salt: env::var("DAILY_SAMPLE_SALT").unwrap_or_else(|_| default_sample_salt()),
                utc_offset_hours: env_or(
                    "DAILY_SAMPLE_UTC_OFFSET_HOURS",
                    default_sample_utc_offset_hours(),
                ),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        assert_eq!(default_app_port(), 8081);
        assert_eq!(default_db_max_connections(), 20);
        assert_eq!(default_presence_cutoff_minutes(), 15);
        assert_eq!(default_sample_utc_offset_hours(), -5);
    }
}
