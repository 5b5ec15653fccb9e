//! # Trade Grading
//!
//! Values each side of a trade by the fantasy points the moved players score
//! in a fixed window after the trade, plus a table value for draft picks.
//!
//! A grade stays `pending` until the full window has been played; after that
//! it is `favorable` when the differential is positive and `unfavorable`
//! otherwise. The window never crosses into the next season.

use crate::config::TradeConfig;
use crate::types::{
    season_years, team_name, DraftPick, Player, PlayerId, PlayerWeeklyPoints, Roster, RosterId, Season,
    SeasonId, TransactionRecord, TransactionType,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Where the league currently is in its schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationContext {
    pub current_season_id: SeasonId,
    /// Latest week with final scores in the current season
    pub current_week: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeVerdict {
    Favorable,
    Unfavorable,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerValue {
    pub player_id: PlayerId,
    pub player_name: String,
    pub position: Option<String>,
    /// Points scored inside the evaluation window
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickValue {
    pub season: i32,
    pub round: u32,
    pub original_roster_id: RosterId,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeGrade {
    pub transaction_id: String,
    pub roster_id: RosterId,
    pub team_name: String,
    pub season_id: SeasonId,
    pub trade_week: u32,
    pub acquired: Vec<PlayerValue>,
    pub lost: Vec<PlayerValue>,
    pub picks_received: Vec<PickValue>,
    pub picks_given: Vec<PickValue>,
    pub acquired_points: f64,
    pub lost_points: f64,
    /// Received pick value minus given pick value
    pub pick_value: f64,
    /// acquired - lost + pick value
    pub total_differential: f64,
    pub grade: TradeVerdict,
    pub weeks_analyzed: u32,
}

/// Table value of a pick, discounted for each year beyond the trade's season
pub fn draft_pick_value(pick: &DraftPick, trade_year: Option<i32>, config: &TradeConfig) -> f64 {
    let base = match config.pick_values.as_slice() {
        [] => 0.0,
        values => {
            let idx = (pick.round.max(1) as usize - 1).min(values.len() - 1);
            values[idx]
        }
    };
    let years_out = trade_year.map_or(0, |year| (pick.season - year).max(0));
    base * config.future_pick_discount.powi(years_out)
}

/// Last week (inclusive) counted for a trade, and how many weeks that covers
fn evaluation_window(trade: &TransactionRecord, ctx: EvaluationContext, config: &TradeConfig) -> (u32, u32) {
    let last_available = if trade.season_id == ctx.current_season_id {
        ctx.current_week
    } else {
        config.season_weeks
    };
    let end = (trade.week + config.evaluation_window_weeks).min(last_available);
    (end, end.saturating_sub(trade.week))
}

/// Grade `trade` from the point of view of `roster_id`
#[allow(clippy::too_many_arguments)]
pub fn grade_trade(
    trade: &TransactionRecord,
    roster_id: RosterId,
    player_points: &[PlayerWeeklyPoints],
    players: &[Player],
    seasons: &[Season],
    rosters: &[Roster],
    ctx: EvaluationContext,
    config: &TradeConfig,
) -> TradeGrade {
    let (window_end, weeks_analyzed) = evaluation_window(trade, ctx, config);

    let mut window_points: HashMap<&str, f64> = HashMap::new();
    for p in player_points {
        if p.season_id == trade.season_id && p.week > trade.week && p.week <= window_end {
            *window_points.entry(p.player_id.as_str()).or_insert(0.0) += p.points;
        }
    }

    let player_value = |player_id: &PlayerId| {
        let player = players.iter().find(|p| &p.player_id == player_id);
        PlayerValue {
            player_id: player_id.clone(),
            player_name: player.map_or_else(|| player_id.clone(), Player::display_name),
            position: player.and_then(|p| p.position.clone()),
            points: window_points.get(player_id.as_str()).copied().unwrap_or(0.0),
        }
    };
    let moved = |moves: &HashMap<PlayerId, RosterId>| {
        let mut values: Vec<PlayerValue> =
            moves.iter().filter(|(_, r)| **r == roster_id).map(|(id, _)| player_value(id)).collect();
        values.sort_by(|a, b| b.points.total_cmp(&a.points).then_with(|| a.player_id.cmp(&b.player_id)));
        values
    };
    let acquired = moved(&trade.adds);
    let lost = moved(&trade.drops);

    let trade_year = season_years(seasons).get(&trade.season_id).copied();
    let pick_value = |pick: &DraftPick| PickValue {
        season: pick.season,
        round: pick.round,
        original_roster_id: pick.roster_id,
        value: draft_pick_value(pick, trade_year, config),
    };
    let picks_received: Vec<PickValue> =
        trade.draft_picks.iter().filter(|p| p.owner_id == roster_id).map(pick_value).collect();
    let picks_given: Vec<PickValue> =
        trade.draft_picks.iter().filter(|p| p.previous_owner_id == roster_id).map(pick_value).collect();

    let acquired_points: f64 = acquired.iter().map(|p| p.points).sum();
    let lost_points: f64 = lost.iter().map(|p| p.points).sum();
    let pick_value = picks_received.iter().map(|p| p.value).sum::<f64>()
        - picks_given.iter().map(|p| p.value).sum::<f64>();
    let total_differential = acquired_points - lost_points + pick_value;

    let grade = if weeks_analyzed < config.evaluation_window_weeks {
        TradeVerdict::Pending
    } else if total_differential > 0.0 {
        TradeVerdict::Favorable
    } else {
        TradeVerdict::Unfavorable
    };

    debug!(
        "Graded trade {} for roster {}: {:+.2} over {} weeks ({:?})",
        trade.transaction_id, roster_id, total_differential, weeks_analyzed, grade
    );

    TradeGrade {
        transaction_id: trade.transaction_id.clone(),
        roster_id,
        team_name: team_name(rosters, roster_id),
        season_id: trade.season_id,
        trade_week: trade.week,
        acquired,
        lost,
        picks_received,
        picks_given,
        acquired_points,
        lost_points,
        pick_value,
        total_differential,
        grade,
        weeks_analyzed,
    }
}

/// One grade per participating roster of a completed trade; empty for any
/// other transaction
#[allow(clippy::too_many_arguments)]
pub fn grade_trade_for_all(
    trade: &TransactionRecord,
    player_points: &[PlayerWeeklyPoints],
    players: &[Player],
    seasons: &[Season],
    rosters: &[Roster],
    ctx: EvaluationContext,
    config: &TradeConfig,
) -> Vec<TradeGrade> {
    if trade.kind != TransactionType::Trade || !trade.is_complete() {
        return Vec::new();
    }
    let mut parties: Vec<RosterId> = trade.roster_ids.clone();
    parties.sort_unstable();
    parties.dedup();
    parties
        .into_iter()
        .map(|roster_id| grade_trade(trade, roster_id, player_points, players, seasons, rosters, ctx, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionStatus;
    use chrono::{TimeZone, Utc};

    fn seasons() -> Vec<Season> {
        vec![
            Season { id: 1, season_year: 2023, is_current: false },
            Season { id: 2, season_year: 2024, is_current: true },
        ]
    }

    fn players() -> Vec<Player> {
        vec![
            Player { player_id: "rb1".into(), full_name: Some("Runner One".into()), position: Some("RB".into()) },
            Player { player_id: "wr1".into(), full_name: Some("Wideout One".into()), position: Some("WR".into()) },
        ]
    }

    /// Roster 1 sends wr1 to roster 2 for rb1 in week 5 of 2024
    fn trade(season_id: u32, week: u32) -> TransactionRecord {
        TransactionRecord {
            transaction_id: "trade-1".into(),
            season_id,
            week,
            kind: TransactionType::Trade,
            status: TransactionStatus::Complete,
            roster_ids: vec![1, 2],
            adds: HashMap::from([("rb1".to_string(), 1), ("wr1".to_string(), 2)]),
            drops: HashMap::from([("rb1".to_string(), 2), ("wr1".to_string(), 1)]),
            draft_picks: Vec::new(),
            created_at: Utc.with_ymd_and_hms(2024, 10, 8, 3, 0, 0).unwrap(),
        }
    }

    fn points(player_id: &str, season_id: u32, week: u32, points: f64) -> PlayerWeeklyPoints {
        PlayerWeeklyPoints { player_id: player_id.into(), season_id, week, points }
    }

    fn weekly(season_id: u32, weeks: std::ops::RangeInclusive<u32>, rb: f64, wr: f64) -> Vec<PlayerWeeklyPoints> {
        weeks.flat_map(|w| [points("rb1", season_id, w, rb), points("wr1", season_id, w, wr)]).collect()
    }

    #[test]
    fn test_pending_until_window_elapses() {
        let pts = weekly(2, 1..=7, 15.0, 10.0);
        let ctx = EvaluationContext { current_season_id: 2, current_week: 7 };
        let grade = grade_trade(&trade(2, 5), 1, &pts, &players(), &seasons(), &[], ctx, &TradeConfig::default());
        assert_eq!(grade.weeks_analyzed, 2);
        assert_eq!(grade.acquired_points, 30.0);
        assert_eq!(grade.lost_points, 20.0);
        assert_eq!(grade.grade, TradeVerdict::Pending);
    }

    #[test]
    fn test_window_excludes_trade_week_and_caps_at_four() {
        let pts = weekly(2, 1..=14, 15.0, 10.0);
        let ctx = EvaluationContext { current_season_id: 2, current_week: 14 };
        let config = TradeConfig::default();
        let winner = grade_trade(&trade(2, 5), 1, &pts, &players(), &seasons(), &[], ctx, &config);
        assert_eq!(winner.weeks_analyzed, 4);
        assert_eq!(winner.acquired[0].player_name, "Runner One");
        assert_eq!(winner.acquired_points, 60.0);
        assert_eq!(winner.total_differential, 20.0);
        assert_eq!(winner.grade, TradeVerdict::Favorable);

        let loser = grade_trade(&trade(2, 5), 2, &pts, &players(), &seasons(), &[], ctx, &config);
        assert_eq!(loser.total_differential, -20.0);
        assert_eq!(loser.grade, TradeVerdict::Unfavorable);
        assert_eq!(loser.team_name, "Team 2");
    }

    #[test]
    fn test_late_season_trade_in_past_season_is_capped_by_season_length() {
        let pts = weekly(1, 14..=17, 15.0, 10.0);
        let ctx = EvaluationContext { current_season_id: 2, current_week: 3 };
        let grade = grade_trade(&trade(1, 15), 1, &pts, &players(), &seasons(), &[], ctx, &TradeConfig::default());
        // weeks 16 and 17 only
        assert_eq!(grade.weeks_analyzed, 2);
        assert_eq!(grade.grade, TradeVerdict::Pending);
        assert_eq!(grade.acquired_points, 30.0);
    }

    #[test]
    fn test_pick_values_by_round_and_year() {
        let config = TradeConfig::default();
        let pick = |season, round| DraftPick { season, round, roster_id: 3, previous_owner_id: 2, owner_id: 1 };
        assert_eq!(draft_pick_value(&pick(2024, 1), Some(2024), &config), 30.0);
        assert_eq!(draft_pick_value(&pick(2024, 9), Some(2024), &config), 2.0);
        assert!((draft_pick_value(&pick(2026, 2), Some(2024), &config) - 18.0 * 0.85 * 0.85).abs() < 1e-9);
        assert_eq!(draft_pick_value(&pick(2026, 1), None, &config), 30.0);
        let empty = TradeConfig { pick_values: Vec::new(), ..TradeConfig::default() };
        assert_eq!(draft_pick_value(&pick(2024, 1), Some(2024), &empty), 0.0);
    }

    #[test]
    fn test_picks_move_the_differential() {
        let mut deal = trade(2, 5);
        deal.draft_picks.push(DraftPick { season: 2025, round: 1, roster_id: 2, previous_owner_id: 2, owner_id: 1 });
        let pts = weekly(2, 1..=14, 10.0, 10.0);
        let ctx = EvaluationContext { current_season_id: 2, current_week: 14 };
        let grades = grade_trade_for_all(&deal, &pts, &players(), &seasons(), &[], ctx, &TradeConfig::default());
        assert_eq!(grades.len(), 2);
        let receiver = &grades[0];
        assert_eq!(receiver.roster_id, 1);
        assert_eq!(receiver.picks_received.len(), 1);
        assert!((receiver.pick_value - 25.5).abs() < 1e-9);
        assert_eq!(receiver.grade, TradeVerdict::Favorable);
        let giver = &grades[1];
        assert_eq!(giver.picks_given.len(), 1);
        assert!((giver.total_differential + 25.5).abs() < 1e-9);
    }

    #[test]
    fn test_non_trades_are_not_graded() {
        let mut waiver = trade(2, 5);
        waiver.kind = TransactionType::Waiver;
        let ctx = EvaluationContext { current_season_id: 2, current_week: 14 };
        assert!(grade_trade_for_all(&waiver, &[], &[], &seasons(), &[], ctx, &TradeConfig::default()).is_empty());
        let mut failed = trade(2, 5);
        failed.status = TransactionStatus::Failed;
        assert!(grade_trade_for_all(&failed, &[], &[], &seasons(), &[], ctx, &TradeConfig::default()).is_empty());
    }

    #[test]
    fn test_zero_differential_is_unfavorable() {
        let pts = weekly(2, 1..=14, 10.0, 10.0);
        let ctx = EvaluationContext { current_season_id: 2, current_week: 14 };
        let grade = grade_trade(&trade(2, 5), 1, &pts, &players(), &seasons(), &[], ctx, &TradeConfig::default());
        assert_eq!(grade.total_differential, 0.0);
        assert_eq!(grade.grade, TradeVerdict::Unfavorable);
    }
}
