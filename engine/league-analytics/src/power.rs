//! # Power Rankings
//!
//! Scores every team on four factors and ranks by the weighted composite:
//!
//! | factor                       | weight |
//! |------------------------------|--------|
//! | actual win rate              | 35%    |
//! | average points               | 30%    |
//! | expected (all-play) wins     | 20%    |
//! | consistency (lower is better)| 15%    |
//!
//! Each factor is min-max normalized across the ranked teams before weighting.
//! Alongside the composite the engine reports luck (actual minus expected
//! wins), a record against the weekly median, and strength of schedule.

use crate::stats::{median, min_max_normalize, population_std_dev, round_to};
use crate::types::{MatchupPair, Outcome, Roster, RosterId, SeasonId, Side};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

pub const WIN_RATE_WEIGHT: f64 = 0.35;
pub const AVG_POINTS_WEIGHT: f64 = 0.30;
pub const EXPECTED_WINS_WEIGHT: f64 = 0.20;
pub const CONSISTENCY_WEIGHT: f64 = 0.15;

/// Rank held after a given week
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankTrendPoint {
    pub season_year: i32,
    pub week: u32,
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerRankingRow {
    pub roster_id: RosterId,
    pub team_name: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: f64,
    pub points_against: f64,
    pub avg_points: f64,
    /// Sum over weeks of (opponents outscored / other teams that week).
    /// At most one per week, in the same units as `wins`.
    pub expected_wins: f64,
    /// Actual wins minus expected wins
    pub luck_index: f64,
    pub median_wins: u32,
    pub median_losses: u32,
    /// Population std-dev of weekly scores, one decimal
    pub consistency: f64,
    /// Average points scored by actual opponents
    pub strength_of_schedule: f64,
    /// Weighted composite on a 0-100 scale
    pub power_score: f64,
    pub power_rank: u32,
    pub rank_trend: Vec<RankTrendPoint>,
}

#[derive(Debug, Clone, Default)]
struct TeamAccumulator {
    wins: u32,
    losses: u32,
    ties: u32,
    scores: Vec<f64>,
    opponent_scores: Vec<f64>,
    expected_wins: f64,
    median_wins: u32,
    median_losses: u32,
}

impl TeamAccumulator {
    fn games(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    fn win_rate(&self) -> f64 {
        match self.games() {
            0 => 0.0,
            games => (self.wins as f64 + 0.5 * self.ties as f64) / games as f64,
        }
    }

    fn points_for(&self) -> f64 {
        self.scores.iter().sum()
    }

    fn avg_points(&self) -> f64 {
        crate::stats::mean(&self.scores)
    }
}

type WeekKey = (i32, u32, SeasonId);

fn week_key(pair: &MatchupPair) -> WeekKey {
    (pair.season_year, pair.week, pair.season_id)
}

/// Fold one week's pairs into the accumulators: head-to-head results,
/// all-play expected wins and the median record.
fn accumulate_week(accumulators: &mut HashMap<RosterId, TeamAccumulator>, week: &[&MatchupPair]) {
    let mut week_scores: Vec<(RosterId, f64)> = Vec::with_capacity(week.len() * 2);

    for pair in week {
        for side in [Side::TeamA, Side::TeamB] {
            let acc = accumulators.entry(pair.roster(side)).or_default();
            acc.scores.push(pair.points(side));
            acc.opponent_scores.push(pair.points(side.other()));
            match pair.outcome_for(side) {
                Outcome::Win => acc.wins += 1,
                Outcome::Loss => acc.losses += 1,
                Outcome::Tie => acc.ties += 1,
            }
            week_scores.push((pair.roster(side), pair.points(side)));
        }
    }

    let opponents = week_scores.len().saturating_sub(1);
    let scores: Vec<f64> = week_scores.iter().map(|(_, s)| *s).collect();
    let week_median = median(&scores);

    for (roster_id, score) in &week_scores {
        let acc = accumulators.entry(*roster_id).or_default();
        if opponents > 0 {
            let outscored = scores.iter().filter(|other| **other < *score).count();
            acc.expected_wins += outscored as f64 / opponents as f64;
        }
        if *score >= week_median {
            acc.median_wins += 1;
        } else {
            acc.median_losses += 1;
        }
    }
}

/// Composite scores and ranks for `rosters`, in rank order
fn rank_teams(
    accumulators: &HashMap<RosterId, TeamAccumulator>,
    rosters: &[Roster],
) -> Vec<(RosterId, f64, u32)> {
    let empty = TeamAccumulator::default();
    let teams: Vec<(RosterId, &TeamAccumulator)> = rosters
        .iter()
        .map(|r| (r.roster_id, accumulators.get(&r.roster_id).unwrap_or(&empty)))
        .collect();

    let win_rates: Vec<f64> = teams.iter().map(|(_, a)| a.win_rate()).collect();
    let avg_points: Vec<f64> = teams.iter().map(|(_, a)| a.avg_points()).collect();
    let expected: Vec<f64> = teams.iter().map(|(_, a)| a.expected_wins).collect();
    let dispersion: Vec<f64> = teams.iter().map(|(_, a)| population_std_dev(&a.scores)).collect();

    let win_rates = min_max_normalize(&win_rates);
    let avg_points = min_max_normalize(&avg_points);
    let expected = min_max_normalize(&expected);
    let dispersion = min_max_normalize(&dispersion);

    let mut scored: Vec<(RosterId, f64, f64)> = teams
        .iter()
        .enumerate()
        .map(|(i, (roster_id, acc))| {
            let composite = WIN_RATE_WEIGHT * win_rates[i]
                + AVG_POINTS_WEIGHT * avg_points[i]
                + EXPECTED_WINS_WEIGHT * expected[i]
                + CONSISTENCY_WEIGHT * (1.0 - dispersion[i]);
            (*roster_id, composite * 100.0, acc.points_for())
        })
        .collect();

    // power score, then points for, then roster id
    scored.sort_by(|a, b| {
        b.1.total_cmp(&a.1).then_with(|| b.2.total_cmp(&a.2)).then_with(|| a.0.cmp(&b.0))
    });

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (roster_id, score, _))| (roster_id, score, i as u32 + 1))
        .collect()
}

/// Power rankings for `rosters` over chronologically ordered `pairs`.
///
/// Returns exactly one row per roster passed in, ranked 1..N. Teams absent
/// from `rosters` still count as all-play opponents in the weeks they played.
pub fn compute_power_rankings(pairs: &[MatchupPair], rosters: &[Roster]) -> Vec<PowerRankingRow> {
    let mut weeks: BTreeMap<WeekKey, Vec<&MatchupPair>> = BTreeMap::new();
    for pair in pairs {
        weeks.entry(week_key(pair)).or_default().push(pair);
    }

    let mut accumulators: HashMap<RosterId, TeamAccumulator> = HashMap::new();
    let mut trends: HashMap<RosterId, Vec<RankTrendPoint>> = HashMap::new();
    let mut latest: Vec<(RosterId, f64, u32)> = rank_teams(&accumulators, rosters);

    for ((season_year, week, _), week_pairs) in &weeks {
        accumulate_week(&mut accumulators, week_pairs);
        latest = rank_teams(&accumulators, rosters);
        for (roster_id, _, rank) in &latest {
            trends.entry(*roster_id).or_default().push(RankTrendPoint {
                season_year: *season_year,
                week: *week,
                rank: *rank,
            });
        }
    }

    let empty = TeamAccumulator::default();
    let rows: Vec<PowerRankingRow> = latest
        .into_iter()
        .map(|(roster_id, power_score, power_rank)| {
            let acc = accumulators.get(&roster_id).unwrap_or(&empty);
            PowerRankingRow {
                roster_id,
                team_name: crate::types::team_name(rosters, roster_id),
                wins: acc.wins,
                losses: acc.losses,
                ties: acc.ties,
                points_for: acc.points_for(),
                points_against: acc.opponent_scores.iter().sum(),
                avg_points: acc.avg_points(),
                expected_wins: acc.expected_wins,
                luck_index: acc.wins as f64 - acc.expected_wins,
                median_wins: acc.median_wins,
                median_losses: acc.median_losses,
                consistency: round_to(population_std_dev(&acc.scores), 1),
                strength_of_schedule: crate::stats::mean(&acc.opponent_scores),
                power_score,
                power_rank,
                rank_trend: trends.remove(&roster_id).unwrap_or_default(),
            }
        })
        .collect();

    debug!("Ranked {} teams across {} weeks", rows.len(), weeks.len());
    rows
}
