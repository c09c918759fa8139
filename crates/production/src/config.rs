//! Runner configuration loaded from TOML.
//!
//! ```toml
//! [platform]
//! index = 0
//! name = "A"
//! roster = "./roster.json"
//! group = "M73-A"
//! emit_sounds = true
//!
//! [timing]
//! decision_settle_ms = 3000
//! decision_reset_ms = 3000
//!
//! [competition]
//! masters = false
//! competition_year = 2024
//! ```

use barbell_fop::FopConfig;
use barbell_types::{CompetitionConfig, Group, PlatformIndex};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level runner configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub platform: PlatformSection,
    pub timing: TimingSection,
    pub competition: CompetitionConfig,
}

/// Platform identity and channels.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlatformSection {
    pub index: u32,
    /// Display name of the platform.
    pub name: String,
    /// JSON roster with groups and athletes.
    pub roster: Option<PathBuf>,
    /// Group to load at startup.
    pub group: Option<String>,
    /// Whether the platform server plays sounds itself.
    pub emit_sounds: bool,
    /// Capacity of the inbound event channel.
    pub channel_capacity: usize,
    /// Capacity of the UI broadcast bus.
    pub ui_bus_capacity: usize,
}

impl Default for PlatformSection {
    fn default() -> Self {
        Self {
            index: 0,
            name: "A".to_string(),
            roster: None,
            group: None,
            emit_sounds: false,
            channel_capacity: 1024,
            ui_bus_capacity: 256,
        }
    }
}

/// Overrides of the field-of-play delays and warning thresholds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingSection {
    pub decision_settle_ms: u64,
    pub decision_reset_ms: u64,
    pub initial_warning_secs: u64,
    pub final_warning_secs: u64,
}

impl Default for TimingSection {
    fn default() -> Self {
        let fop = FopConfig::default();
        Self {
            decision_settle_ms: fop.decision_settle_delay.as_millis() as u64,
            decision_reset_ms: fop.decision_reset_delay.as_millis() as u64,
            initial_warning_secs: fop.initial_warning.as_secs(),
            final_warning_secs: fop.final_warning.as_secs(),
        }
    }
}

impl RunnerConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: RunnerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.platform.channel_capacity == 0 || self.platform.ui_bus_capacity == 0 {
            return Err(ConfigError::Invalid(
                "channel capacities must be positive".to_string(),
            ));
        }
        if self.timing.final_warning_secs >= self.timing.initial_warning_secs {
            return Err(ConfigError::Invalid(format!(
                "final warning ({}s) must come after the initial warning ({}s)",
                self.timing.final_warning_secs, self.timing.initial_warning_secs
            )));
        }
        Ok(())
    }

    pub fn platform_index(&self) -> PlatformIndex {
        PlatformIndex(self.platform.index)
    }

    pub fn startup_group(&self) -> Option<Group> {
        self.platform.group.as_deref().map(Group::new)
    }

    /// Field-of-play configuration derived from the timing and competition
    /// sections.
    pub fn fop_config(&self) -> FopConfig {
        FopConfig {
            decision_settle_delay: Duration::from_millis(self.timing.decision_settle_ms),
            decision_reset_delay: Duration::from_millis(self.timing.decision_reset_ms),
            initial_warning: Duration::from_secs(self.timing.initial_warning_secs),
            final_warning: Duration::from_secs(self.timing.final_warning_secs),
            emit_sounds: self.platform.emit_sounds,
            competition: self.competition.clone(),
        }
    }
}
