//! # Rivalries
//!
//! Head-to-head history between two specific teams: all-time record,
//! scoring comparison, blowouts, closest games and revenge games.

use crate::pairing::pair_rivalry;
use crate::stats::mean;
use crate::types::{
    team_name, MatchupPair, Outcome, Roster, RosterId, Season, SeasonId, Side, WeeklyScoreRow,
    Winner,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Weeks per season used to approximate the gap between seasons
pub const WEEKS_PER_SEASON: i32 = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AllTimeRecord {
    pub team_a_wins: u32,
    pub team_b_wins: u32,
    pub ties: u32,
    pub total_games: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScoringComparison {
    pub team_a_total: f64,
    pub team_b_total: f64,
    pub team_a_avg: f64,
    pub team_b_avg: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BiggestBlowouts {
    /// Team A's largest winning margin
    pub team_a: Option<MatchupPair>,
    /// Team B's largest winning margin
    pub team_b: Option<MatchupPair>,
    /// The larger of the two; an equal margin goes to team A
    pub overall: Option<MatchupPair>,
}

/// A win that follows an unavenged loss to the same opponent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevengeGame {
    pub loss_matchup: MatchupPair,
    pub revenge_matchup: MatchupPair,
    /// Week gap; across seasons approximated as years * 17 + week delta
    pub weeks_between: i32,
    pub avenged_by: Side,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RivalryReport {
    pub team_a_roster_id: RosterId,
    pub team_b_roster_id: RosterId,
    pub team_a_name: String,
    pub team_b_name: String,
    /// Chronological
    pub matchups: Vec<MatchupPair>,
    pub all_time_record: AllTimeRecord,
    pub scoring: ScoringComparison,
    pub biggest_blowouts: BiggestBlowouts,
    pub closest_games: Vec<MatchupPair>,
    pub revenge_games: Vec<RevengeGame>,
}

/// Build the full rivalry report between `team_a` and `team_b`
pub fn analyze_rivalry(
    rows: &[WeeklyScoreRow],
    seasons: &[Season],
    rosters: &[Roster],
    team_a: RosterId,
    team_b: RosterId,
    season_filter: Option<SeasonId>,
    closest_limit: usize,
) -> RivalryReport {
    let matchups = pair_rivalry(rows, seasons, team_a, team_b, season_filter);
    debug!("Rivalry {} vs {}: {} matchups", team_a, team_b, matchups.len());

    RivalryReport {
        team_a_roster_id: team_a,
        team_b_roster_id: team_b,
        team_a_name: team_name(rosters, team_a),
        team_b_name: team_name(rosters, team_b),
        all_time_record: all_time_record(&matchups),
        scoring: scoring_comparison(&matchups),
        biggest_blowouts: biggest_blowouts(&matchups),
        closest_games: closest_games(&matchups, closest_limit),
        revenge_games: find_revenge_games(&matchups),
        matchups,
    }
}

pub fn all_time_record(matchups: &[MatchupPair]) -> AllTimeRecord {
    matchups.iter().fold(AllTimeRecord::default(), |mut record, pair| {
        match pair.winner {
            Winner::TeamA => record.team_a_wins += 1,
            Winner::TeamB => record.team_b_wins += 1,
            Winner::Tie => record.ties += 1,
        }
        record.total_games += 1;
        record
    })
}

pub fn scoring_comparison(matchups: &[MatchupPair]) -> ScoringComparison {
    let a: Vec<f64> = matchups.iter().map(|p| p.team_a_points).collect();
    let b: Vec<f64> = matchups.iter().map(|p| p.team_b_points).collect();
    ScoringComparison {
        team_a_total: a.iter().sum(),
        team_b_total: b.iter().sum(),
        team_a_avg: mean(&a),
        team_b_avg: mean(&b),
    }
}

fn largest_win(matchups: &[MatchupPair], side: Side) -> Option<&MatchupPair> {
    matchups
        .iter()
        .filter(|p| p.winning_side() == Some(side))
        // first of equal margins wins
        .fold(None, |best: Option<&MatchupPair>, p| match best {
            Some(b) if b.margin >= p.margin => Some(b),
            _ => Some(p),
        })
}

pub fn biggest_blowouts(matchups: &[MatchupPair]) -> BiggestBlowouts {
    let team_a = largest_win(matchups, Side::TeamA).cloned();
    let team_b = largest_win(matchups, Side::TeamB).cloned();
    let overall = match (&team_a, &team_b) {
        (Some(a), Some(b)) => Some(if b.margin > a.margin { b.clone() } else { a.clone() }),
        (Some(a), None) => Some(a.clone()),
        (None, Some(b)) => Some(b.clone()),
        (None, None) => None,
    };
    BiggestBlowouts { team_a, team_b, overall }
}

/// Non-tie games by ascending margin, at most `limit`
pub fn closest_games(matchups: &[MatchupPair], limit: usize) -> Vec<MatchupPair> {
    let mut decided: Vec<MatchupPair> =
        matchups.iter().filter(|p| p.winner != Winner::Tie).cloned().collect();
    decided.sort_by(|a, b| a.margin.total_cmp(&b.margin));
    decided.truncate(limit);
    decided
}

pub fn weeks_between(earlier: &MatchupPair, later: &MatchupPair) -> i32 {
    let week_delta = later.week as i32 - earlier.week as i32;
    if earlier.season_year == later.season_year {
        week_delta
    } else {
        (later.season_year - earlier.season_year) * WEEKS_PER_SEASON + week_delta
    }
}

#[derive(Debug, Default)]
struct RevengeState {
    pending_a: Option<MatchupPair>,
    pending_b: Option<MatchupPair>,
}

impl RevengeState {
    fn pending_mut(&mut self, side: Side) -> &mut Option<MatchupPair> {
        match side {
            Side::TeamA => &mut self.pending_a,
            Side::TeamB => &mut self.pending_b,
        }
    }
}

/// Scan chronologically ordered matchups for wins that avenge the winner's
/// most recent unavenged loss. Ties leave the state untouched.
pub fn find_revenge_games(matchups: &[MatchupPair]) -> Vec<RevengeGame> {
    let mut state = RevengeState::default();
    let mut revenge = Vec::new();

    for pair in matchups {
        let Some(winner) = pair.winning_side() else { continue };

        if let Some(loss) = state.pending_mut(winner).take() {
            revenge.push(RevengeGame {
                weeks_between: weeks_between(&loss, pair),
                loss_matchup: loss,
                revenge_matchup: pair.clone(),
                avenged_by: winner,
            });
        }
        *state.pending_mut(winner.other()) = Some(pair.clone());
    }

    revenge
}

/// Head-to-head record of one roster against each opponent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpponentRecord {
    pub opponent_roster_id: RosterId,
    pub opponent_name: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub games: u32,
    pub points_for: f64,
    pub points_against: f64,
}

/// Every opponent `roster_id` has faced in `pairs`, most-played first
pub fn rivals_of(pairs: &[MatchupPair], rosters: &[Roster], roster_id: RosterId) -> Vec<OpponentRecord> {
    let mut records: BTreeMap<RosterId, OpponentRecord> = BTreeMap::new();

    for pair in pairs {
        let Some(side) = pair.side_of(roster_id) else { continue };
        let opponent = pair.roster(side.other());
        let record = records.entry(opponent).or_insert_with(|| OpponentRecord {
            opponent_roster_id: opponent,
            opponent_name: team_name(rosters, opponent),
            wins: 0,
            losses: 0,
            ties: 0,
            games: 0,
            points_for: 0.0,
            points_against: 0.0,
        });
        match pair.outcome_for(side) {
            Outcome::Win => record.wins += 1,
            Outcome::Loss => record.losses += 1,
            Outcome::Tie => record.ties += 1,
        }
        record.games += 1;
        record.points_for += pair.points(side);
        record.points_against += pair.points(side.other());
    }

    let mut out: Vec<OpponentRecord> = records.into_values().collect();
    out.sort_by(|a, b| b.games.cmp(&a.games).then_with(|| a.opponent_roster_id.cmp(&b.opponent_roster_id)));
    out
}
