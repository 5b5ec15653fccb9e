//! # League Analytics
//!
//! Derived statistics for a fantasy football league, computed from raw
//! weekly scores, rosters, seasons, transactions and player points.
//!
//! Every engine is a pure function over immutable input: standings and
//! streaks, power rankings, head-to-head rivalries, the league pulse
//! (weekly extremes, game of the week, parity, records, playoff race),
//! transaction activity, trade grades and keeper evaluations.
//! [`LeagueAnalytics`] ties them to a [`LeagueSnapshot`] and an
//! [`AnalyticsConfig`].

pub mod cli;
pub mod config;
pub mod error;
pub mod keepers;
pub mod logging;
pub mod pairing;
pub mod power;
pub mod pulse;
pub mod rivalry;
pub mod snapshot;
pub mod standings;
pub mod stats;
pub mod trades;
pub mod transactions;
pub mod types;


// Re-export main types for easy usage
pub use config::AnalyticsConfig;
pub use error::{AnalyticsError, Result};
pub use keepers::{evaluate_keepers, KeeperEvaluation, KeeperVerdict};
pub use pairing::{for_season, pair_matchups, pair_rivalry, sort_chronologically};
pub use power::{compute_power_rankings, PowerRankingRow};
pub use pulse::{league_pulse, LeaguePulse, PlayoffRules};
pub use rivalry::{analyze_rivalry, rivals_of, RivalryReport};
pub use snapshot::LeagueSnapshot;
pub use standings::{compute_standings, StandingsRow};
pub use trades::{grade_trade, grade_trade_for_all, EvaluationContext, TradeGrade, TradeVerdict};
pub use types::*;

use rivalry::OpponentRecord;
use serde::Serialize;
use tracing::debug;
use transactions::{ManagerActivity, PositionChurn, TradePartners};

/// Transaction views for one scope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionSummary {
    pub activity: Vec<ManagerActivity>,
    pub trade_partners: Vec<TradePartners>,
    pub position_churn: Vec<PositionChurn>,
}

/// Runs the engines against a snapshot with one configuration.
///
/// `season` arguments scope a view to one season; `None` means all time.
#[derive(Debug, Clone, Default)]
pub struct LeagueAnalytics {
    config: AnalyticsConfig,
}

impl LeagueAnalytics {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Paired, chronologically ordered games
    pub fn matchups(&self, snapshot: &LeagueSnapshot, season: Option<SeasonId>) -> Vec<MatchupPair> {
        let pairs = pair_matchups(&snapshot.matchups, &snapshot.seasons);
        match season {
            Some(season_id) => for_season(&pairs, season_id),
            None => pairs,
        }
    }

    pub fn standings(&self, snapshot: &LeagueSnapshot, season: Option<SeasonId>) -> Vec<StandingsRow> {
        let pairs = self.matchups(snapshot, season);
        compute_standings(&pairs, &snapshot.rosters)
    }

    pub fn power_rankings(&self, snapshot: &LeagueSnapshot, season: Option<SeasonId>) -> Vec<PowerRankingRow> {
        let pairs = self.matchups(snapshot, season);
        let rows = compute_power_rankings(&pairs, &snapshot.rosters);
        debug!("Power rankings over {} games for {} rosters", pairs.len(), rows.len());
        rows
    }

    pub fn rivalry(
        &self,
        snapshot: &LeagueSnapshot,
        team_a: RosterId,
        team_b: RosterId,
        season: Option<SeasonId>,
    ) -> RivalryReport {
        analyze_rivalry(
            &snapshot.matchups,
            &snapshot.seasons,
            &snapshot.rosters,
            team_a,
            team_b,
            season,
            self.config.rivalry.closest_games,
        )
    }

    pub fn rivals(&self, snapshot: &LeagueSnapshot, roster_id: RosterId, season: Option<SeasonId>) -> Vec<OpponentRecord> {
        let pairs = self.matchups(snapshot, season);
        rivals_of(&pairs, &snapshot.rosters, roster_id)
    }

    pub fn pulse(&self, snapshot: &LeagueSnapshot, season: Option<SeasonId>) -> LeaguePulse {
        let pairs = self.matchups(snapshot, season);
        league_pulse(
            &pairs,
            &snapshot.rosters,
            self.config.pulse.bucket_width,
            self.config.pulse.playoff_rules(),
        )
    }

    pub fn transactions(&self, snapshot: &LeagueSnapshot, season: Option<SeasonId>) -> TransactionSummary {
        let scoped: Vec<TransactionRecord> = snapshot
            .transactions
            .iter()
            .filter(|t| season.map_or(true, |s| t.season_id == s))
            .cloned()
            .collect();
        TransactionSummary {
            activity: transactions::manager_activity(&scoped, &snapshot.rosters),
            trade_partners: transactions::trade_partners(&scoped),
            position_churn: transactions::position_churn(&scoped, &snapshot.players),
        }
    }

    /// Current season and its latest scored week
    pub fn evaluation_context(&self, snapshot: &LeagueSnapshot) -> Result<EvaluationContext> {
        let current = snapshot.current_season()?;
        Ok(EvaluationContext {
            current_season_id: current.id,
            current_week: snapshot.latest_scored_week(current.id),
        })
    }

    /// Grades for every side of one trade
    pub fn grade_trade(&self, snapshot: &LeagueSnapshot, transaction_id: &str) -> Result<Vec<TradeGrade>> {
        let trade = snapshot
            .transactions
            .iter()
            .find(|t| t.transaction_id == transaction_id)
            .ok_or_else(|| AnalyticsError::TransactionNotFound(transaction_id.to_string()))?;
        let ctx = self.evaluation_context(snapshot)?;
        Ok(grade_trade_for_all(
            trade,
            &snapshot.player_points,
            &snapshot.players,
            &snapshot.seasons,
            &snapshot.rosters,
            ctx,
            &self.config.trades,
        ))
    }

    /// Grades for every side of every completed trade, oldest first
    pub fn trade_grades(&self, snapshot: &LeagueSnapshot, season: Option<SeasonId>) -> Result<Vec<TradeGrade>> {
        let mut trades: Vec<&TransactionRecord> = snapshot
            .transactions
            .iter()
            .filter(|t| season.map_or(true, |s| t.season_id == s))
            .filter(|t| t.kind == TransactionType::Trade && t.is_complete())
            .collect();
        if trades.is_empty() {
            return Ok(Vec::new());
        }
        let ctx = self.evaluation_context(snapshot)?;
        trades.sort_by_key(|t| t.created_at);

        let grades: Vec<TradeGrade> = trades
            .into_iter()
            .flat_map(|trade| {
                grade_trade_for_all(
                    trade,
                    &snapshot.player_points,
                    &snapshot.players,
                    &snapshot.seasons,
                    &snapshot.rosters,
                    ctx,
                    &self.config.trades,
                )
            })
            .collect();
        debug!("Graded {} trade sides", grades.len());
        Ok(grades)
    }

    pub fn keepers(&self, snapshot: &LeagueSnapshot, season: Option<SeasonId>) -> Result<Vec<KeeperEvaluation>> {
        let scoped: Vec<KeeperRecord> = snapshot
            .keepers
            .iter()
            .filter(|k| season.map_or(true, |s| k.season_id == s))
            .cloned()
            .collect();
        if scoped.is_empty() {
            return Ok(Vec::new());
        }
        let ctx = self.evaluation_context(snapshot)?;
        Ok(evaluate_keepers(
            &scoped,
            &snapshot.player_points,
            &snapshot.players,
            &snapshot.rosters,
            ctx,
            &self.config.keepers,
            &self.config.trades,
        ))
    }
}
