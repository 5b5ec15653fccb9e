//! # League Snapshot
//!
//! A JSON document holding every raw record the engines read. It is the
//! hand-off format between whatever syncs a league and the analytics.

use crate::error::{AnalyticsError, Result};
use crate::types::{
    KeeperRecord, Player, PlayerWeeklyPoints, Roster, Season, SeasonId, TransactionRecord, WeeklyScoreRow,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueSnapshot {
    pub seasons: Vec<Season>,
    pub rosters: Vec<Roster>,
    pub players: Vec<Player>,
    /// One row per roster per game
    pub matchups: Vec<WeeklyScoreRow>,
    pub transactions: Vec<TransactionRecord>,
    pub player_points: Vec<PlayerWeeklyPoints>,
    pub keepers: Vec<KeeperRecord>,
}

impl LeagueSnapshot {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let snapshot = Self::from_json(&content)?;
        debug!(
            "Loaded snapshot {}: {} seasons, {} rosters, {} score rows, {} transactions",
            path.display(),
            snapshot.seasons.len(),
            snapshot.rosters.len(),
            snapshot.matchups.len(),
            snapshot.transactions.len()
        );
        Ok(snapshot)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The season flagged current, or the latest by year when none is flagged
    pub fn current_season(&self) -> Result<&Season> {
        self.seasons
            .iter()
            .find(|s| s.is_current)
            .or_else(|| self.seasons.iter().max_by_key(|s| s.season_year))
            .ok_or(AnalyticsError::NoCurrentSeason)
    }

    pub fn season(&self, season_id: SeasonId) -> Result<&Season> {
        self.seasons
            .iter()
            .find(|s| s.id == season_id)
            .ok_or(AnalyticsError::SeasonNotFound(season_id))
    }

    /// Latest week with a played score in `season_id`, 0 before kickoff
    pub fn latest_scored_week(&self, season_id: SeasonId) -> u32 {
        self.matchups
            .iter()
            .filter(|row| row.season_id == season_id && row.score().is_played())
            .map(|row| row.week)
            .max()
            .unwrap_or(0)
    }
}
