//! # League Records
//!
//! Raw records as delivered by the sync layer and the derived matchup pair
//! every engine builds on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type SeasonId = u32;
pub type RosterId = u32;
pub type GameId = u32;
pub type PlayerId = String;
pub type TransactionId = String;

/// Score of one roster in one week
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    /// Game finished (or in progress) with this many points
    Played(f64),
    /// No points recorded yet
    NotYetPlayed,
}

impl Score {
    /// Points used for arithmetic; an unplayed game counts as 0
    pub fn value(&self) -> f64 {
        match self {
            Score::Played(points) => *points,
            Score::NotYetPlayed => 0.0,
        }
    }

    pub fn is_played(&self) -> bool {
        matches!(self, Score::Played(_))
    }
}

/// One row per roster per week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyScoreRow {
    pub season_id: SeasonId,
    pub week: u32,
    pub game_id: GameId,
    pub roster_id: RosterId,
    #[serde(default)]
    pub points: Option<f64>,
}

impl WeeklyScoreRow {
    pub fn score(&self) -> Score {
        match self.points {
            Some(points) => Score::Played(points),
            None => Score::NotYetPlayed,
        }
    }
}

/// A fantasy team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub roster_id: RosterId,
    #[serde(default)]
    pub team_name: Option<String>,
}

impl Roster {
    pub fn new(roster_id: RosterId, team_name: impl Into<String>) -> Self {
        Self { roster_id, team_name: Some(team_name.into()) }
    }

    /// Team name, or "Team {id}" when the platform has none
    pub fn display_name(&self) -> String {
        match &self.team_name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => fallback_team_name(self.roster_id),
        }
    }
}

fn fallback_team_name(roster_id: RosterId) -> String {
    format!("Team {roster_id}")
}

/// Resolve a team name, falling back to "Team {id}" for unknown rosters
pub fn team_name(rosters: &[Roster], roster_id: RosterId) -> String {
    rosters
        .iter()
        .find(|r| r.roster_id == roster_id)
        .map(Roster::display_name)
        .unwrap_or_else(|| fallback_team_name(roster_id))
}

/// One league season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub id: SeasonId,
    pub season_year: i32,
    #[serde(default)]
    pub is_current: bool,
}

/// Season id -> season year
pub fn season_years(seasons: &[Season]) -> HashMap<SeasonId, i32> {
    seasons.iter().map(|s| (s.id, s.season_year)).collect()
}

/// NFL player as known to the fantasy platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: PlayerId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

impl Player {
    pub fn display_name(&self) -> String {
        self.full_name.clone().unwrap_or_else(|| self.player_id.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Trade,
    FreeAgent,
    Waiver,
    Commissioner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Complete,
    Failed,
    Pending,
}

/// Draft pick moved by a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPick {
    /// Draft year the pick belongs to
    pub season: i32,
    pub round: u32,
    /// Roster the pick originally belonged to
    pub roster_id: RosterId,
    pub previous_owner_id: RosterId,
    pub owner_id: RosterId,
}

/// A completed, failed or pending league transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: TransactionId,
    pub season_id: SeasonId,
    pub week: u32,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub status: TransactionStatus,
    #[serde(default)]
    pub roster_ids: Vec<RosterId>,
    /// player -> receiving roster
    #[serde(default)]
    pub adds: HashMap<PlayerId, RosterId>,
    /// player -> releasing roster
    #[serde(default)]
    pub drops: HashMap<PlayerId, RosterId>,
    #[serde(default)]
    pub draft_picks: Vec<DraftPick>,
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    pub fn is_complete(&self) -> bool {
        self.status == TransactionStatus::Complete
    }
}

/// Fantasy points scored by one player in one week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerWeeklyPoints {
    pub player_id: PlayerId,
    pub season_id: SeasonId,
    pub week: u32,
    pub points: f64,
}

/// A player retained across the season boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeeperRecord {
    pub player_id: PlayerId,
    pub roster_id: RosterId,
    /// Season the player was kept for
    pub season_id: SeasonId,
    /// Draft round surrendered to keep the player
    #[serde(default)]
    pub round_cost: Option<u32>,
}

/// Outcome of a head-to-head pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    TeamA,
    TeamB,
    Tie,
}

/// One side of a head-to-head pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    TeamA,
    TeamB,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::TeamA => Side::TeamB,
            Side::TeamB => Side::TeamA,
        }
    }
}

/// Two rosters that shared a game id in one week
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupPair {
    pub season_id: SeasonId,
    pub season_year: i32,
    pub week: u32,
    pub game_id: GameId,
    pub team_a_roster_id: RosterId,
    pub team_b_roster_id: RosterId,
    pub team_a_points: f64,
    pub team_b_points: f64,
    pub winner: Winner,
    pub margin: f64,
}

impl MatchupPair {
    /// Build a pair from both sides' points, resolving winner and margin.
    /// Returns `None` for a 0-0 pairing, which is treated as not yet played,
    /// and for any other level score that is not positive: a tie needs both
    /// sides above zero.
    pub fn new(
        season_id: SeasonId,
        season_year: i32,
        week: u32,
        game_id: GameId,
        team_a: (RosterId, Score),
        team_b: (RosterId, Score),
    ) -> Option<Self> {
        let a_points = team_a.1.value();
        let b_points = team_b.1.value();
        if a_points == b_points && a_points <= 0.0 {
            return None;
        }

        let margin = (a_points - b_points).abs();
        let winner = if margin == 0.0 {
            Winner::Tie
        } else if a_points > b_points {
            Winner::TeamA
        } else {
            Winner::TeamB
        };

        Some(Self {
            season_id,
            season_year,
            week,
            game_id,
            team_a_roster_id: team_a.0,
            team_b_roster_id: team_b.0,
            team_a_points: a_points,
            team_b_points: b_points,
            winner,
            margin,
        })
    }

    /// Chronological sort key
    pub fn chrono_key(&self) -> (i32, u32, GameId) {
        (self.season_year, self.week, self.game_id)
    }

    pub fn combined_points(&self) -> f64 {
        self.team_a_points + self.team_b_points
    }

    pub fn involves(&self, roster_id: RosterId) -> bool {
        self.team_a_roster_id == roster_id || self.team_b_roster_id == roster_id
    }

    pub fn roster(&self, side: Side) -> RosterId {
        match side {
            Side::TeamA => self.team_a_roster_id,
            Side::TeamB => self.team_b_roster_id,
        }
    }

    pub fn points(&self, side: Side) -> f64 {
        match side {
            Side::TeamA => self.team_a_points,
            Side::TeamB => self.team_b_points,
        }
    }

    /// Which side `roster_id` played on, if any
    pub fn side_of(&self, roster_id: RosterId) -> Option<Side> {
        if self.team_a_roster_id == roster_id {
            Some(Side::TeamA)
        } else if self.team_b_roster_id == roster_id {
            Some(Side::TeamB)
        } else {
            None
        }
    }

    pub fn winning_side(&self) -> Option<Side> {
        match self.winner {
            Winner::TeamA => Some(Side::TeamA),
            Winner::TeamB => Some(Side::TeamB),
            Winner::Tie => None,
        }
    }

    /// Result of this pair from `side`'s point of view
    pub fn outcome_for(&self, side: Side) -> Outcome {
        match self.winning_side() {
            None => Outcome::Tie,
            Some(w) if w == side => Outcome::Win,
            Some(_) => Outcome::Loss,
        }
    }

    pub fn winner_roster(&self) -> Option<RosterId> {
        self.winning_side().map(|s| self.roster(s))
    }

    pub fn winning_points(&self) -> Option<f64> {
        self.winning_side().map(|s| self.points(s))
    }
}

/// Single-team result of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Loss,
    Tie,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_resolves_winner_and_margin() {
        let pair =
            MatchupPair::new(1, 2024, 3, 7, (1, Score::Played(98.5)), (2, Score::Played(110.25)))
                .unwrap();
        assert_eq!(pair.winner, Winner::TeamB);
        assert_eq!(pair.margin, 11.75);
        assert_eq!(pair.outcome_for(Side::TeamA), Outcome::Loss);
        assert_eq!(pair.winner_roster(), Some(2));
    }

    #[test]
    fn test_zero_zero_pair_is_dropped() {
        assert!(MatchupPair::new(1, 2024, 1, 1, (1, Score::NotYetPlayed), (2, Score::Played(0.0)))
            .is_none());
    }

    #[test]
    fn test_level_non_positive_scores_are_dropped() {
        assert!(MatchupPair::new(1, 2024, 1, 1, (1, Score::Played(-2.0)), (2, Score::Played(-2.0)))
            .is_none());
        let pair =
            MatchupPair::new(1, 2024, 1, 1, (1, Score::Played(-2.0)), (2, Score::Played(-3.5)))
                .unwrap();
        assert_eq!(pair.winner, Winner::TeamA);
        assert_eq!(pair.margin, 1.5);
    }

    #[test]
    fn test_equal_scores_tie() {
        let pair =
            MatchupPair::new(1, 2024, 1, 1, (1, Score::Played(100.0)), (2, Score::Played(100.0)))
                .unwrap();
        assert_eq!(pair.winner, Winner::Tie);
        assert_eq!(pair.margin, 0.0);
        assert_eq!(pair.winner_roster(), None);
    }

    #[test]
    fn test_team_name_fallback() {
        let rosters = vec![Roster::new(1, "Gridiron Gang"), Roster { roster_id: 2, team_name: None }];
        assert_eq!(team_name(&rosters, 1), "Gridiron Gang");
        assert_eq!(team_name(&rosters, 2), "Team 2");
        assert_eq!(team_name(&rosters, 9), "Team 9");
    }

    #[test]
    fn test_transaction_deserializes_platform_shape() {
        let json = r#"{
            "transaction_id": "tx-1",
            "season_id": 3,
            "week": 5,
            "type": "free_agent",
            "status": "complete",
            "roster_ids": [4],
            "adds": {"4046": 4},
            "created_at": "2024-10-02T12:00:00Z"
        }"#;
        let tx: TransactionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(tx.kind, TransactionType::FreeAgent);
        assert!(tx.is_complete());
        assert_eq!(tx.adds.get("4046"), Some(&4));
        assert!(tx.drops.is_empty());
    }
}
