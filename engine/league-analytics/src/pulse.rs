//! # League Pulse
//!
//! League-wide views over the pair stream: weekly high/low scores, the game
//! of the week, the scoring histogram, parity, all-time records and the
//! playoff race.

use crate::standings::{compute_standings, outcomes_by_roster};
use crate::types::{team_name, MatchupPair, Outcome, Roster, RosterId, SeasonId, Side};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Margin below which a game counts as close
pub const CLOSE_GAME_MARGIN: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamScore {
    pub roster_id: RosterId,
    pub team_name: String,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyExtreme {
    pub season_id: SeasonId,
    pub season_year: i32,
    pub week: u32,
    pub high: TeamScore,
    pub low: TeamScore,
}

type WeekKey = (i32, u32, SeasonId);

fn group_by_week(pairs: &[MatchupPair]) -> BTreeMap<WeekKey, Vec<&MatchupPair>> {
    let mut weeks: BTreeMap<WeekKey, Vec<&MatchupPair>> = BTreeMap::new();
    for pair in pairs {
        weeks.entry((pair.season_year, pair.week, pair.season_id)).or_default().push(pair);
    }
    weeks
}

/// Played sides of the given pairs, skipping zero (unplayed) scores.
/// Negative scores are real results and are kept.
fn played_scores<'a>(pairs: impl IntoIterator<Item = &'a MatchupPair>) -> Vec<(RosterId, f64)> {
    pairs
        .into_iter()
        .flat_map(|p| [Side::TeamA, Side::TeamB].map(|s| (p.roster(s), p.points(s))))
        .filter(|(_, points)| *points != 0.0)
        .collect()
}

/// Highest and lowest scorer of every week, chronologically
pub fn weekly_extremes(pairs: &[MatchupPair], rosters: &[Roster]) -> Vec<WeeklyExtreme> {
    let to_team_score = |(roster_id, points): (RosterId, f64)| TeamScore {
        roster_id,
        team_name: team_name(rosters, roster_id),
        points,
    };

    group_by_week(pairs)
        .into_iter()
        .filter_map(|((season_year, week, season_id), week_pairs)| {
            let scores = played_scores(week_pairs);
            // first of equal scores is kept
            let high = scores.iter().copied().reduce(|best, s| if s.1 > best.1 { s } else { best })?;
            let low = scores.iter().copied().reduce(|best, s| if s.1 < best.1 { s } else { best })?;
            Some(WeeklyExtreme {
                season_id,
                season_year,
                week,
                high: to_team_score(high),
                low: to_team_score(low),
            })
        })
        .collect()
}

/// Label for why a game was picked as game of the week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameReason {
    #[serde(rename = "Photo Finish")]
    PhotoFinish,
    #[serde(rename = "Nail-biter")]
    NailBiter,
    #[serde(rename = "Shootout")]
    Shootout,
    #[serde(rename = "Statement Win")]
    StatementWin,
    #[serde(rename = "Classic Clash")]
    ClassicClash,
}

impl GameReason {
    /// Rules are checked in priority order
    pub fn classify(margin: f64, combined_points: f64) -> Self {
        if margin < 3.0 {
            GameReason::PhotoFinish
        } else if margin < 10.0 {
            GameReason::NailBiter
        } else if combined_points > 280.0 {
            GameReason::Shootout
        } else if margin > 50.0 {
            GameReason::StatementWin
        } else {
            GameReason::ClassicClash
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GameReason::PhotoFinish => "Photo Finish",
            GameReason::NailBiter => "Nail-biter",
            GameReason::Shootout => "Shootout",
            GameReason::StatementWin => "Statement Win",
            GameReason::ClassicClash => "Classic Clash",
        }
    }
}

impl fmt::Display for GameReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameOfTheWeek {
    pub matchup: MatchupPair,
    pub excitement: f64,
    pub closeness: f64,
    pub scoring: f64,
    pub reason: GameReason,
}

/// `(excitement, closeness, scoring)` for one game given the week's
/// average team score
pub fn excitement_score(pair: &MatchupPair, week_avg: f64) -> (f64, f64, f64) {
    let closeness = (50.0 - pair.margin).max(0.0) * 2.0;
    let scoring = if week_avg > 0.0 {
        (pair.combined_points() / (2.0 * week_avg) * 50.0).min(100.0)
    } else {
        0.0
    };
    (0.6 * closeness + 0.4 * scoring, closeness, scoring)
}

/// Most exciting game of the latest week present in `pairs`
pub fn game_of_the_week(pairs: &[MatchupPair]) -> Option<GameOfTheWeek> {
    let weeks = group_by_week(pairs);
    let (_, latest) = weeks.iter().next_back()?;

    let team_scores: Vec<f64> = played_scores(latest.iter().copied()).into_iter().map(|(_, s)| s).collect();
    let week_avg = crate::stats::mean(&team_scores);

    let mut ordered: Vec<&MatchupPair> = latest.clone();
    ordered.sort_by_key(|p| p.game_id);

    let mut best: Option<GameOfTheWeek> = None;
    for pair in ordered {
        let (excitement, closeness, scoring) = excitement_score(pair, week_avg);
        if best.as_ref().map_or(true, |b| excitement > b.excitement) {
            best = Some(GameOfTheWeek {
                matchup: (*pair).clone(),
                excitement,
                closeness,
                scoring,
                reason: GameReason::classify(pair.margin, pair.combined_points()),
            });
        }
    }
    best
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBucket {
    /// Inclusive
    pub lower: f64,
    /// Exclusive
    pub upper: f64,
    pub count: u32,
}

/// Histogram of played team scores with fixed `bucket_width`
pub fn scoring_distribution(pairs: &[MatchupPair], bucket_width: f64) -> Vec<ScoreBucket> {
    if bucket_width <= 0.0 {
        return Vec::new();
    }
    let scores: Vec<f64> = played_scores(pairs).into_iter().map(|(_, s)| s).collect();
    if scores.is_empty() {
        return Vec::new();
    }

    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let start = (min / bucket_width).floor() * bucket_width;
    let bucket_count = ((max / bucket_width).floor() - (min / bucket_width).floor()) as usize + 1;

    let mut buckets: Vec<ScoreBucket> = (0..bucket_count)
        .map(|i| {
            let lower = start + i as f64 * bucket_width;
            ScoreBucket { lower, upper: lower + bucket_width, count: 0 }
        })
        .collect();

    for score in scores {
        let idx = (((score - start) / bucket_width).floor() as usize).min(bucket_count - 1);
        buckets[idx].count += 1;
    }
    buckets
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ParityReport {
    pub games: u32,
    pub avg_margin: f64,
    /// Percent of games decided by less than the close-game margin
    pub close_game_pct: f64,
    /// 0 (dominated) to 100 (highly competitive)
    pub parity_index: u32,
}

/// `round(max(0, 100 - 2 * avg_margin) * 0.6 + close_game_pct * 0.4)`
pub fn parity_index(avg_margin: f64, close_game_pct: f64) -> u32 {
    let margin_factor = (100.0 - 2.0 * avg_margin).max(0.0);
    (margin_factor * 0.6 + close_game_pct * 0.4).round().clamp(0.0, 100.0) as u32
}

pub fn league_parity(pairs: &[MatchupPair]) -> ParityReport {
    if pairs.is_empty() {
        return ParityReport::default();
    }
    let margins: Vec<f64> = pairs.iter().map(|p| p.margin).collect();
    let avg_margin = crate::stats::mean(&margins);
    let close = margins.iter().filter(|m| **m < CLOSE_GAME_MARGIN).count();
    let close_game_pct = close as f64 / pairs.len() as f64 * 100.0;
    ParityReport {
        games: pairs.len() as u32,
        avg_margin,
        close_game_pct,
        parity_index: parity_index(avg_margin, close_game_pct),
    }
}

/// A single-team score worth remembering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRecord {
    pub roster_id: RosterId,
    pub team_name: String,
    pub points: f64,
    pub season_year: i32,
    pub week: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreakRecord {
    pub roster_id: RosterId,
    pub team_name: String,
    pub length: u32,
    pub start_season_year: i32,
    pub start_week: u32,
    pub end_season_year: i32,
    pub end_week: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LeagueRecords {
    pub highest_score: Option<ScoreRecord>,
    pub lowest_score: Option<ScoreRecord>,
    pub lowest_winning_score: Option<ScoreRecord>,
    pub biggest_blowout: Option<MatchupPair>,
    /// Smallest non-zero margin
    pub closest_game: Option<MatchupPair>,
    pub longest_win_streak: Option<StreakRecord>,
}

/// Record book over `pairs`, which must be chronological. Pass one
/// season's pairs for season records or every season for all-time records.
pub fn league_records(pairs: &[MatchupPair], rosters: &[Roster]) -> LeagueRecords {
    let score_record = |pair: &MatchupPair, side: Side| ScoreRecord {
        roster_id: pair.roster(side),
        team_name: team_name(rosters, pair.roster(side)),
        points: pair.points(side),
        season_year: pair.season_year,
        week: pair.week,
    };

    let mut records = LeagueRecords::default();
    for pair in pairs {
        for side in [Side::TeamA, Side::TeamB] {
            let points = pair.points(side);
            if records.highest_score.as_ref().map_or(true, |r| points > r.points) {
                records.highest_score = Some(score_record(pair, side));
            }
            if points != 0.0 && records.lowest_score.as_ref().map_or(true, |r| points < r.points) {
                records.lowest_score = Some(score_record(pair, side));
            }
        }

        if let Some(side) = pair.winning_side() {
            let points = pair.points(side);
            if records.lowest_winning_score.as_ref().map_or(true, |r| points < r.points) {
                records.lowest_winning_score = Some(score_record(pair, side));
            }
            if records.biggest_blowout.as_ref().map_or(true, |r| pair.margin > r.margin) {
                records.biggest_blowout = Some(pair.clone());
            }
            if records.closest_game.as_ref().map_or(true, |r| pair.margin < r.margin) {
                records.closest_game = Some(pair.clone());
            }
        }
    }

    records.longest_win_streak = longest_win_streak(pairs, rosters);
    records
}

/// Longest run of consecutive wins by any team; ties and losses end a run
pub fn longest_win_streak(pairs: &[MatchupPair], rosters: &[Roster]) -> Option<StreakRecord> {
    let mut games_by_roster: BTreeMap<RosterId, Vec<&MatchupPair>> = BTreeMap::new();
    for pair in pairs {
        games_by_roster.entry(pair.team_a_roster_id).or_default().push(pair);
        games_by_roster.entry(pair.team_b_roster_id).or_default().push(pair);
    }

    let mut best: Option<StreakRecord> = None;
    for (roster_id, outcomes) in outcomes_by_roster(pairs) {
        let games = &games_by_roster[&roster_id];
        let mut run_start = 0usize;
        let mut run = 0u32;
        for (i, outcome) in outcomes.iter().enumerate() {
            if *outcome != Outcome::Win {
                run = 0;
                continue;
            }
            if run == 0 {
                run_start = i;
            }
            run += 1;
            if best.as_ref().map_or(true, |b| run > b.length) {
                best = Some(StreakRecord {
                    roster_id,
                    team_name: team_name(rosters, roster_id),
                    length: run,
                    start_season_year: games[run_start].season_year,
                    start_week: games[run_start].week,
                    end_season_year: games[i].season_year,
                    end_week: games[i].week,
                });
            }
        }
    }
    best
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayoffStatus {
    Clinched,
    Contending,
    InHunt,
    Eliminated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayoffRaceEntry {
    pub rank: u32,
    pub roster_id: RosterId,
    pub team_name: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: f64,
    /// Wins behind the last playoff seat, floored at zero
    pub games_back: u32,
    pub in_playoff_position: bool,
    pub status: PlayoffStatus,
}

/// Thresholds for playoff status classification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayoffRules {
    pub playoff_spots: usize,
    /// A seeded team this many wins clear of the cutoff has clinched
    pub clinch_margin: i64,
    /// A chasing team more than this many wins back is eliminated
    pub elimination_margin: i64,
}

impl Default for PlayoffRules {
    fn default() -> Self {
        Self { playoff_spots: 6, clinch_margin: 3, elimination_margin: 4 }
    }
}

/// Rank by (wins, points for) and classify each team against the last
/// playoff seat. With fewer teams than seats the last team is the cutoff.
pub fn playoff_race(pairs: &[MatchupPair], rosters: &[Roster], rules: PlayoffRules) -> Vec<PlayoffRaceEntry> {
    let standings = compute_standings(pairs, rosters);
    if standings.is_empty() || rules.playoff_spots == 0 {
        return Vec::new();
    }
    let cutoff_index = rules.playoff_spots.min(standings.len()) - 1;
    let cutoff_wins = standings[cutoff_index].wins as i64;

    standings
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let games_back = cutoff_wins - row.wins as i64;
            let in_playoff_position = i < rules.playoff_spots;
            let status = if in_playoff_position {
                if games_back <= -rules.clinch_margin {
                    PlayoffStatus::Clinched
                } else {
                    PlayoffStatus::Contending
                }
            } else if games_back > rules.elimination_margin {
                PlayoffStatus::Eliminated
            } else {
                PlayoffStatus::InHunt
            };
            PlayoffRaceEntry {
                rank: i as u32 + 1,
                roster_id: row.roster_id,
                team_name: row.team_name,
                wins: row.wins,
                losses: row.losses,
                ties: row.ties,
                points_for: row.points_for,
                games_back: games_back.max(0) as u32,
                in_playoff_position,
                status,
            }
        })
        .collect()
}

/// All pulse views for one call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaguePulse {
    pub weekly_extremes: Vec<WeeklyExtreme>,
    pub game_of_the_week: Option<GameOfTheWeek>,
    pub scoring_distribution: Vec<ScoreBucket>,
    pub parity: ParityReport,
    pub records: LeagueRecords,
    pub playoff_race: Vec<PlayoffRaceEntry>,
}

pub fn league_pulse(
    pairs: &[MatchupPair],
    rosters: &[Roster],
    bucket_width: f64,
    rules: PlayoffRules,
) -> LeaguePulse {
    let pulse = LeaguePulse {
        weekly_extremes: weekly_extremes(pairs, rosters),
        game_of_the_week: game_of_the_week(pairs),
        scoring_distribution: scoring_distribution(pairs, bucket_width),
        parity: league_parity(pairs),
        records: league_records(pairs, rosters),
        playoff_race: playoff_race(pairs, rosters, rules),
    };
    debug!(
        "League pulse over {} games: parity {}, {} weeks",
        pairs.len(),
        pulse.parity.parity_index,
        pulse.weekly_extremes.len()
    );
    pulse
}
