use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::filter::{DEFAULT_MAX_AGE, DEFAULT_MIN_AGE};
use crate::domain::schedule::{DEFAULT_WINDOW_DAYS, MATCH_DURATION_HOURS};
use crate::domain::FilterState;

#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// SQLite file backing the remote store; `None` runs in local-only mode
    pub database_path: Option<String>,
    pub local_dir: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            database_path: Some("scout_desk.db".to_string()),
            local_dir: PathBuf::from("local_store"),
        }
    }
}

impl StoreSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_path: match env::var("DATABASE_PATH") {
                Ok(path) if path.trim().is_empty() => None,
                Ok(path) => Some(path),
                Err(_) => defaults.database_path,
            },
            local_dir: env::var("SCOUT_LOCAL_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.local_dir),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RefreshSettings {
    pub interval: Duration,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(45),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterSettings {
    pub default_min_age: u32,
    pub default_max_age: u32,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            default_min_age: DEFAULT_MIN_AGE,
            default_max_age: DEFAULT_MAX_AGE,
        }
    }
}

impl FilterSettings {
    pub fn initial_filter(&self) -> FilterState {
        FilterState::with_age_range(self.default_min_age, self.default_max_age)
    }
}

#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub rate_limit_ms: u64,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-flash".to_string(),
            rate_limit_ms: 1000,
            user_agent: "ScoutDesk/1.0".to_string(),
            timeout_secs: 60,
        }
    }
}

impl ReportSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: env::var("SCOUT_AI_API_KEY").ok().filter(|key| !key.trim().is_empty()),
            base_url: env::var("SCOUT_AI_BASE_URL").unwrap_or(defaults.base_url),
            model: env::var("SCOUT_AI_MODEL").unwrap_or(defaults.model),
            ..defaults
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScheduleSettings {
    pub window_days: i64,
    pub match_duration: chrono::Duration,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            match_duration: chrono::Duration::hours(MATCH_DURATION_HOURS),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub store: StoreSettings,
    pub refresh: RefreshSettings,
    pub filter: FilterSettings,
    pub report: ReportSettings,
    pub schedule: ScheduleSettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by the environment; passed explicitly, never global
    pub fn from_env() -> Self {
        Self {
            store: StoreSettings::from_env(),
            report: ReportSettings::from_env(),
            ..Self::default()
        }
    }
}
