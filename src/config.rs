//! Service settings.
//!
//! Loaded from `~/.config/propcal/config.toml` when present; every field
//! has a sensible default so embedders can also construct settings
//! directly.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use propcal_core::{CalendarError, CalendarResult, ExpansionLimits};

fn default_store_adapter() -> String {
    "rest".to_string()
}

fn default_horizon_days() -> i64 {
    730
}

fn default_max_iterations() -> u32 {
    1000
}

fn default_store_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarSettings {
    /// Store adapter binary suffix (`propcal-store-{name}`).
    #[serde(default = "default_store_adapter")]
    pub store_adapter: String,

    /// Forward horizon for never-ending recurrence rules, in days.
    #[serde(default = "default_horizon_days")]
    pub recurrence_horizon_days: i64,

    /// Hard cap on occurrences considered per expansion.
    #[serde(default = "default_max_iterations")]
    pub recurrence_max_iterations: u32,

    #[serde(default = "default_store_timeout_secs")]
    pub store_timeout_secs: u64,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        CalendarSettings {
            store_adapter: default_store_adapter(),
            recurrence_horizon_days: default_horizon_days(),
            recurrence_max_iterations: default_max_iterations(),
            store_timeout_secs: default_store_timeout_secs(),
        }
    }
}

impl CalendarSettings {
    pub fn config_path() -> CalendarResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalendarError::Config("Could not determine config directory".into()))?
            .join("propcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load settings from the config file, falling back to defaults when
    /// the file does not exist.
    pub fn load() -> CalendarResult<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content).map_err(|e| CalendarError::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> CalendarResult<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| CalendarError::Config(e.to_string()))?;

        std::fs::write(&path, content)
            .map_err(|e| CalendarError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    pub fn expansion_limits(&self) -> ExpansionLimits {
        ExpansionLimits {
            horizon_days: self.recurrence_horizon_days,
            max_iterations: self.recurrence_max_iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_in_defaults() {
        let settings: CalendarSettings = toml::from_str("store_adapter = \"mock\"").unwrap();

        assert_eq!(settings.store_adapter, "mock");
        assert_eq!(settings.recurrence_horizon_days, 730);
        assert_eq!(settings.recurrence_max_iterations, 1000);
        assert_eq!(settings.store_timeout_secs, 10);
    }

    #[test]
    fn test_limits_round_trip_into_expansion_limits() {
        let settings = CalendarSettings {
            recurrence_horizon_days: 365,
            recurrence_max_iterations: 500,
            ..Default::default()
        };

        let limits = settings.expansion_limits();

        assert_eq!(limits.horizon_days, 365);
        assert_eq!(limits.max_iterations, 500);
    }
}
