//! # Standings and Streaks
//!
//! Folds chronologically ordered pairs into per-team records.

use crate::types::{team_name, MatchupPair, Outcome, Roster, RosterId, Side};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakKind {
    Win,
    Loss,
}

/// Current run of identical results, counted back from the latest game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Streak {
    pub kind: Option<StreakKind>,
    pub length: u32,
}

impl Streak {
    pub fn none() -> Self {
        Self::default()
    }

    /// "W3", "L1" or "-"
    pub fn label(&self) -> String {
        match self.kind {
            Some(StreakKind::Win) => format!("W{}", self.length),
            Some(StreakKind::Loss) => format!("L{}", self.length),
            None => "-".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingsRow {
    pub roster_id: RosterId,
    pub team_name: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: f64,
    pub points_against: f64,
    pub streak: Streak,
}

impl StandingsRow {
    fn empty(roster_id: RosterId, team_name: String) -> Self {
        Self {
            roster_id,
            team_name,
            wins: 0,
            losses: 0,
            ties: 0,
            points_for: 0.0,
            points_against: 0.0,
            streak: Streak::none(),
        }
    }

    pub fn games_played(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    /// (wins + half a win per tie) / games
    pub fn win_rate(&self) -> f64 {
        let games = self.games_played();
        if games == 0 {
            return 0.0;
        }
        (self.wins as f64 + 0.5 * self.ties as f64) / games as f64
    }
}

/// Each roster's results in the order the pairs were given
pub fn outcomes_by_roster(pairs: &[MatchupPair]) -> BTreeMap<RosterId, Vec<Outcome>> {
    let mut outcomes: BTreeMap<RosterId, Vec<Outcome>> = BTreeMap::new();
    for pair in pairs {
        for side in [Side::TeamA, Side::TeamB] {
            outcomes.entry(pair.roster(side)).or_default().push(pair.outcome_for(side));
        }
    }
    outcomes
}

/// Scan back from the most recent result. A tie ends the streak; a tie as
/// the latest result means no streak at all.
pub fn current_streak(outcomes: &[Outcome]) -> Streak {
    let kind = match outcomes.last() {
        Some(Outcome::Win) => StreakKind::Win,
        Some(Outcome::Loss) => StreakKind::Loss,
        Some(Outcome::Tie) | None => return Streak::none(),
    };
    let target = match kind {
        StreakKind::Win => Outcome::Win,
        StreakKind::Loss => Outcome::Loss,
    };
    let length = outcomes.iter().rev().take_while(|o| **o == target).count() as u32;
    Streak { kind: Some(kind), length }
}

/// Compute standings over `pairs`, which must be in chronological order.
///
/// Every roster in `rosters` gets a row, as does any roster that appears in
/// a pair. Sorted by wins, then points for (both descending), then roster id.
pub fn compute_standings(pairs: &[MatchupPair], rosters: &[Roster]) -> Vec<StandingsRow> {
    let mut rows: BTreeMap<RosterId, StandingsRow> = rosters
        .iter()
        .map(|r| (r.roster_id, StandingsRow::empty(r.roster_id, r.display_name())))
        .collect();

    for pair in pairs {
        for side in [Side::TeamA, Side::TeamB] {
            let roster_id = pair.roster(side);
            let row = rows
                .entry(roster_id)
                .or_insert_with(|| StandingsRow::empty(roster_id, team_name(rosters, roster_id)));
            row.points_for += pair.points(side);
            row.points_against += pair.points(side.other());
            match pair.outcome_for(side) {
                Outcome::Win => row.wins += 1,
                Outcome::Loss => row.losses += 1,
                Outcome::Tie => row.ties += 1,
            }
        }
    }

    for (roster_id, outcomes) in outcomes_by_roster(pairs) {
        if let Some(row) = rows.get_mut(&roster_id) {
            row.streak = current_streak(&outcomes);
        }
    }

    let mut standings: Vec<StandingsRow> = rows.into_values().collect();
    sort_standings(&mut standings);
    standings
}

pub fn sort_standings(standings: &mut [StandingsRow]) {
    standings.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then_with(|| b.points_for.total_cmp(&a.points_for))
            .then_with(|| a.roster_id.cmp(&b.roster_id))
    });
}
