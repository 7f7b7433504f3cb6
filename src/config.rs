use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub app: AppConfig,
    pub scheduling: SchedulingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub environment: Environment,
}

/// Business constants of the scheduling and dashboard rules.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SchedulingConfig {
    /// How far in the past a new session may start.
    pub past_grace_minutes: i64,
    /// Reject sessions that overlap another session of the same instructor
    /// (or, for practical sessions, the same trainee).
    pub reject_overlaps: bool,
    pub required_practical_hours: f64,
    pub course_fee: f64,
    /// Minimum tenure for the behind-schedule report.
    pub behind_schedule_min_days: i64,
    pub dashboard_list_limit: i64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            past_grace_minutes: 60,
            reject_overlaps: false,
            required_practical_hours: 30.0,
            course_fee: 4000.0,
            behind_schedule_min_days: 30,
            dashboard_list_limit: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .with_context(|| format!("Failed to parse {}", key)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Database configuration
        let db_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://drivingschool.db?mode=rwc".to_string());
        let db_max_connections = Some(env_or("DATABASE_MAX_CONNECTIONS", 10u32)?);
        let db_min_connections = Some(env_or("DATABASE_MIN_CONNECTIONS", 1u32)?);

        // App configuration
        let environment: Environment = env::var("APP_ENVIRONMENT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        let app_name = env::var("APP_NAME").unwrap_or_else(|_| "Driving School".to_string());

        // Scheduling rules
        let defaults = SchedulingConfig::default();
        let scheduling = SchedulingConfig {
            past_grace_minutes: env_or("SCHEDULING_PAST_GRACE_MINUTES", defaults.past_grace_minutes)?,
            reject_overlaps: env_or("SCHEDULING_REJECT_OVERLAPS", defaults.reject_overlaps)?,
            required_practical_hours: env_or(
                "REQUIRED_PRACTICAL_HOURS",
                defaults.required_practical_hours,
            )?,
            course_fee: env_or("COURSE_FEE", defaults.course_fee)?,
            behind_schedule_min_days: env_or(
                "BEHIND_SCHEDULE_MIN_DAYS",
                defaults.behind_schedule_min_days,
            )?,
            dashboard_list_limit: env_or("DASHBOARD_LIST_LIMIT", defaults.dashboard_list_limit)?,
        };

        Ok(Config {
            database: DatabaseConfig {
                url: db_url,
                max_connections: db_max_connections,
                min_connections: db_min_connections,
            },
            app: AppConfig {
                name: app_name,
                environment,
            },
            scheduling,
        })
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Environment::Production),
            "staging" => Ok(Environment::Staging),
            "development" => Ok(Environment::Development),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

// Use once_cell for a global config instance that's initialized once
use once_cell::sync::OnceCell;

static CONFIG: OnceCell<Config> = OnceCell::new();

pub fn init() -> Result<&'static Config> {
    CONFIG.get_or_try_init(Config::from_env)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduling_defaults_match_school_rules() {
        let defaults = SchedulingConfig::default();
        assert_eq!(defaults.past_grace_minutes, 60);
        assert_eq!(defaults.required_practical_hours, 30.0);
        assert_eq!(defaults.course_fee, 4000.0);
        assert_eq!(defaults.behind_schedule_min_days, 30);
        assert_eq!(defaults.dashboard_list_limit, 5);
        assert!(!defaults.reject_overlaps);
    }

    #[test]
    fn environment_parses_case_insensitively() {
        assert_eq!("Production".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!("staging".parse::<Environment>(), Ok(Environment::Staging));
        assert!("qa".parse::<Environment>().is_err());
    }

    #[test]
    fn env_or_falls_back_when_unset() {
        let value: i64 = env_or("DRIVINGSCHOOL_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
