//! # Configuration Management
//!
//! Tunable parameters for the analytics engines. Every section has defaults,
//! so a TOML file only needs the keys it changes.

use crate::error::{AnalyticsError, Result};
use crate::pulse::PlayoffRules;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Main configuration for League Analytics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// League pulse configuration
    pub pulse: PulseConfig,
    /// Rivalry configuration
    pub rivalry: RivalryConfig,
    /// Trade grading configuration
    pub trades: TradeConfig,
    /// Keeper evaluation configuration
    pub keepers: KeeperConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// Width of each scoring distribution bucket (points)
    pub bucket_width: f64,
    /// Number of playoff seats
    pub playoff_spots: usize,
    /// Wins clear of the cutoff needed to clinch
    pub clinch_margin: i64,
    /// Wins behind the cutoff beyond which a team is eliminated
    pub elimination_margin: i64,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self { bucket_width: 10.0, playoff_spots: 6, clinch_margin: 3, elimination_margin: 4 }
    }
}

impl PulseConfig {
    pub fn playoff_rules(&self) -> PlayoffRules {
        PlayoffRules {
            playoff_spots: self.playoff_spots,
            clinch_margin: self.clinch_margin,
            elimination_margin: self.elimination_margin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RivalryConfig {
    /// How many closest games a rivalry report lists
    pub closest_games: usize,
}

impl Default for RivalryConfig {
    fn default() -> Self {
        Self { closest_games: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeConfig {
    /// Weeks after the trade week that count toward a grade
    pub evaluation_window_weeks: u32,
    /// Regular season length, used as the last week of past seasons
    pub season_weeks: u32,
    /// Value of a current-season pick by round; the last entry covers all later rounds
    pub pick_values: Vec<f64>,
    /// Multiplier applied per season a pick lies beyond the trade
    pub future_pick_discount: f64,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            evaluation_window_weeks: 4,
            season_weeks: 17,
            pick_values: vec![30.0, 18.0, 10.0, 5.0, 2.0],
            future_pick_discount: 0.85,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeeperConfig {
    /// Worst positional finish that still counts as a starter
    pub starter_thresholds: HashMap<String, u32>,
}

impl Default for KeeperConfig {
    fn default() -> Self {
        let starter_thresholds = [("QB", 12), ("RB", 24), ("WR", 24), ("TE", 12), ("K", 12), ("DEF", 12)]
            .into_iter()
            .map(|(pos, n)| (pos.to_string(), n))
            .collect();
        Self { starter_thresholds }
    }
}

impl KeeperConfig {
    /// Starter threshold for a position, if the position is tracked
    pub fn threshold_for(&self, position: &str) -> Option<u32> {
        self.starter_thresholds.get(&position.to_ascii_uppercase()).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "league_analytics=debug"
    pub level: String,
    /// plain, pretty or json
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "plain".to_string() }
    }
}

impl AnalyticsConfig {
    /// Load configuration from file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AnalyticsConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Defaults overridden by `LEAGUE_ANALYTICS_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from any key lookup. Unparseable values keep the current setting.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup("LEAGUE_ANALYTICS_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(format) = lookup("LEAGUE_ANALYTICS_LOG_FORMAT") {
            self.logging.format = format;
        }

        if let Some(width) = lookup("LEAGUE_ANALYTICS_BUCKET_WIDTH") {
            self.pulse.bucket_width = width.parse().unwrap_or(self.pulse.bucket_width);
        }

        if let Some(spots) = lookup("LEAGUE_ANALYTICS_PLAYOFF_SPOTS") {
            self.pulse.playoff_spots = spots.parse().unwrap_or(self.pulse.playoff_spots);
        }

        if let Some(closest) = lookup("LEAGUE_ANALYTICS_CLOSEST_GAMES") {
            self.rivalry.closest_games = closest.parse().unwrap_or(self.rivalry.closest_games);
        }

        if let Some(window) = lookup("LEAGUE_ANALYTICS_TRADE_WINDOW") {
            self.trades.evaluation_window_weeks = window.parse().unwrap_or(self.trades.evaluation_window_weeks);
        }

        if let Some(weeks) = lookup("LEAGUE_ANALYTICS_SEASON_WEEKS") {
            self.trades.season_weeks = weeks.parse().unwrap_or(self.trades.season_weeks);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.pulse.bucket_width.is_finite() && self.pulse.bucket_width > 0.0) {
            return Err(AnalyticsError::InvalidConfig("pulse.bucket_width must be positive".to_string()));
        }
        if self.pulse.playoff_spots == 0 {
            return Err(AnalyticsError::InvalidConfig("pulse.playoff_spots must be at least 1".to_string()));
        }
        if self.trades.evaluation_window_weeks == 0 {
            return Err(AnalyticsError::InvalidConfig(
                "trades.evaluation_window_weeks must be at least 1".to_string(),
            ));
        }
        if !(self.trades.future_pick_discount > 0.0 && self.trades.future_pick_discount <= 1.0) {
            return Err(AnalyticsError::InvalidConfig(
                "trades.future_pick_discount must be in (0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}
