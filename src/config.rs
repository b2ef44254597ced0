//! Trafficd configuration types and loading.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::inbox::DEFAULT_INBOX_CAPACITY;

/// Main trafficd configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Phase and crossing durations
    pub timing: TimingConfig,

    /// Arrival inbox sizing
    pub inbox: InboxConfig,

    /// Background vehicle generator
    pub generator: GeneratorConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .trafficd.yml
        let local_config = PathBuf::from(".trafficd.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/trafficd/trafficd.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("trafficd").join("trafficd.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Phase and crossing durations. Every real-time delay the controller takes
/// is named here so tests can substitute near-zero values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Normal green phase budget in milliseconds
    #[serde(rename = "green-duration-ms")]
    pub green_duration_ms: u64,

    /// Time one vehicle occupies the intersection, in milliseconds
    #[serde(rename = "crossing-ms")]
    pub crossing_ms: u64,

    /// All-stop safety gap between phases, in milliseconds
    #[serde(rename = "all-red-ms")]
    pub all_red_ms: u64,

    /// Idle wait when every lane is empty, in milliseconds
    #[serde(rename = "idle-poll-ms")]
    pub idle_poll_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            green_duration_ms: 8_000,
            crossing_ms: 1_500,
            all_red_ms: 1_000,
            idle_poll_ms: 200,
        }
    }
}

impl TimingConfig {
    pub fn green_duration(&self) -> Duration {
        Duration::from_millis(self.green_duration_ms)
    }

    pub fn crossing_time(&self) -> Duration {
        Duration::from_millis(self.crossing_ms)
    }

    pub fn all_red_time(&self) -> Duration {
        Duration::from_millis(self.all_red_ms)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }
}

/// Arrival inbox sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InboxConfig {
    /// Maximum pending arrivals before producers see Full
    pub capacity: usize,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_INBOX_CAPACITY,
        }
    }
}

/// Background vehicle generator tuning. The class percentages are cumulative
/// slices of a 0..100 roll; whatever remains is Regular.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Shortest gap between generated arrivals, in milliseconds
    #[serde(rename = "min-interval-ms")]
    pub min_interval_ms: u64,

    /// Longest gap between generated arrivals, in milliseconds
    #[serde(rename = "max-interval-ms")]
    pub max_interval_ms: u64,

    /// Percentage of arrivals that are ambulances
    #[serde(rename = "ambulance-pct")]
    pub ambulance_pct: u32,

    /// Percentage of arrivals that are police
    #[serde(rename = "police-pct")]
    pub police_pct: u32,

    /// Percentage of arrivals that are fire trucks
    #[serde(rename = "fire-truck-pct")]
    pub fire_truck_pct: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 3_000,
            max_interval_ms: 6_000,
            ambulance_pct: 5,
            police_pct: 3,
            fire_truck_pct: 2,
        }
    }
}
