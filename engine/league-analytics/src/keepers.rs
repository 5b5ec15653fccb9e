//! Keeper evaluation: did a retained player finish as a starter at the position?

use crate::config::{KeeperConfig, TradeConfig};
use crate::trades::EvaluationContext;
use crate::types::{team_name, KeeperRecord, Player, PlayerId, PlayerWeeklyPoints, Roster, RosterId, SeasonId};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeeperVerdict {
    Hit,
    Miss,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeeperEvaluation {
    pub player_id: PlayerId,
    pub player_name: String,
    pub position: Option<String>,
    pub roster_id: RosterId,
    pub team_name: String,
    pub season_id: SeasonId,
    pub round_cost: Option<u32>,
    pub total_points: f64,
    pub games_played: u32,
    pub points_per_game: f64,
    /// 1-based finish among players of the same position by season total
    pub positional_rank: Option<u32>,
    pub starter_threshold: Option<u32>,
    pub verdict: KeeperVerdict,
}

#[derive(Debug, Default)]
struct SeasonLine {
    total: f64,
    weeks: BTreeSet<u32>,
}

/// Season totals per player for `season_id`
fn season_lines(player_points: &[PlayerWeeklyPoints], season_id: SeasonId) -> HashMap<&str, SeasonLine> {
    let mut lines: HashMap<&str, SeasonLine> = HashMap::new();
    for p in player_points.iter().filter(|p| p.season_id == season_id) {
        let line = lines.entry(p.player_id.as_str()).or_default();
        line.total += p.points;
        if p.points != 0.0 {
            line.weeks.insert(p.week);
        }
    }
    lines
}

/// Rank of `player_id` among same-position players by season total.
/// Equal totals share the better rank. None when the player never scored.
fn positional_rank(
    player_id: &str,
    position: &str,
    lines: &HashMap<&str, SeasonLine>,
    positions: &HashMap<&str, &str>,
) -> Option<u32> {
    let own = lines.get(player_id)?.total;
    let better = lines
        .iter()
        .filter(|(id, line)| positions.get(*id) == Some(&position) && line.total > own)
        .count();
    Some(better as u32 + 1)
}

pub fn evaluate_keepers(
    keepers: &[KeeperRecord],
    player_points: &[PlayerWeeklyPoints],
    players: &[Player],
    rosters: &[Roster],
    ctx: EvaluationContext,
    keeper_config: &KeeperConfig,
    trade_config: &TradeConfig,
) -> Vec<KeeperEvaluation> {
    let positions: HashMap<&str, &str> = players
        .iter()
        .filter_map(|p| p.position.as_deref().map(|pos| (p.player_id.as_str(), pos)))
        .collect();
    let mut lines_by_season: HashMap<SeasonId, HashMap<&str, SeasonLine>> = HashMap::new();

    let evaluations: Vec<KeeperEvaluation> = keepers
        .iter()
        .map(|keeper| {
            let lines: &HashMap<&str, SeasonLine> = lines_by_season
                .entry(keeper.season_id)
                .or_insert_with(|| season_lines(player_points, keeper.season_id));
            let player = players.iter().find(|p| p.player_id == keeper.player_id);
            let position = positions.get(keeper.player_id.as_str()).copied();

            let (total_points, games_played) = lines
                .get(keeper.player_id.as_str())
                .map_or((0.0, 0), |l| (l.total, l.weeks.len() as u32));
            let points_per_game = if games_played == 0 { 0.0 } else { total_points / games_played as f64 };

            let rank = position.and_then(|pos| positional_rank(&keeper.player_id, pos, lines, &positions));
            let threshold = position.and_then(|pos| keeper_config.threshold_for(pos));

            let weeks_elapsed = if keeper.season_id == ctx.current_season_id {
                ctx.current_week
            } else {
                trade_config.season_weeks
            };
            let verdict = if weeks_elapsed < trade_config.evaluation_window_weeks {
                KeeperVerdict::Pending
            } else {
                match (rank, threshold) {
                    (Some(rank), Some(threshold)) if rank <= threshold => KeeperVerdict::Hit,
                    _ => KeeperVerdict::Miss,
                }
            };

            KeeperEvaluation {
                player_id: keeper.player_id.clone(),
                player_name: player.map_or_else(|| keeper.player_id.clone(), Player::display_name),
                position: position.map(String::from),
                roster_id: keeper.roster_id,
                team_name: team_name(rosters, keeper.roster_id),
                season_id: keeper.season_id,
                round_cost: keeper.round_cost,
                total_points,
                games_played,
                points_per_game,
                positional_rank: rank,
                starter_threshold: threshold,
                verdict,
            }
        })
        .collect();

    debug!(
        "Evaluated {} keepers: {} hits",
        evaluations.len(),
        evaluations.iter().filter(|e| e.verdict == KeeperVerdict::Hit).count()
    );
    evaluations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str, position: Option<&str>) -> Player {
        Player { player_id: id.into(), full_name: Some(id.to_uppercase()), position: position.map(String::from) }
    }

    fn keeper(id: &str, roster_id: u32, season_id: u32) -> KeeperRecord {
        KeeperRecord { player_id: id.into(), roster_id, season_id, round_cost: Some(3) }
    }

    /// 13 quarterbacks in season 1: qb1 scores 260, qb2 250, ... qb13 140
    fn qb_season() -> (Vec<Player>, Vec<PlayerWeeklyPoints>) {
        let mut players = Vec::new();
        let mut points = Vec::new();
        for i in 1..=13u32 {
            let id = format!("qb{i}");
            players.push(player(&id, Some("QB")));
            let weekly = (270.0 - 10.0 * i as f64) / 10.0;
            for week in 1..=10 {
                points.push(PlayerWeeklyPoints { player_id: id.clone(), season_id: 1, week, points: weekly });
            }
        }
        (players, points)
    }

    fn past_season_ctx() -> EvaluationContext {
        EvaluationContext { current_season_id: 2, current_week: 1 }
    }

    #[test]
    fn test_hit_and_miss_by_positional_finish() {
        let (players, points) = qb_season();
        let keepers = vec![keeper("qb1", 1, 1), keeper("qb12", 2, 1), keeper("qb13", 3, 1)];
        let evals = evaluate_keepers(
            &keepers,
            &points,
            &players,
            &[Roster::new(1, "Alpha")],
            past_season_ctx(),
            &KeeperConfig::default(),
            &TradeConfig::default(),
        );

        assert_eq!(evals[0].positional_rank, Some(1));
        assert_eq!(evals[0].verdict, KeeperVerdict::Hit);
        assert_eq!(evals[0].team_name, "Alpha");
        assert_eq!(evals[0].games_played, 10);
        assert!((evals[0].total_points - 260.0).abs() < 1e-9);
        assert!((evals[0].points_per_game - 26.0).abs() < 1e-9);

        assert_eq!(evals[1].positional_rank, Some(12));
        assert_eq!(evals[1].verdict, KeeperVerdict::Hit);
        assert_eq!(evals[2].positional_rank, Some(13));
        assert_eq!(evals[2].starter_threshold, Some(12));
        assert_eq!(evals[2].verdict, KeeperVerdict::Miss);
    }

    #[test]
    fn test_pending_early_in_current_season() {
        let (players, points) = qb_season();
        let ctx = EvaluationContext { current_season_id: 1, current_week: 3 };
        let evals = evaluate_keepers(
            &[keeper("qb1", 1, 1)],
            &points,
            &players,
            &[],
            ctx,
            &KeeperConfig::default(),
            &TradeConfig::default(),
        );
        assert_eq!(evals[0].verdict, KeeperVerdict::Pending);
    }

    #[test]
    fn test_unknown_position_and_scoreless_players() {
        let players = vec![player("ghost", None), player("bench", Some("TE"))];
        let keepers = vec![keeper("ghost", 1, 1), keeper("bench", 1, 1), keeper("nobody", 2, 1)];
        let evals = evaluate_keepers(
            &keepers,
            &[],
            &players,
            &[],
            past_season_ctx(),
            &KeeperConfig::default(),
            &TradeConfig::default(),
        );

        assert_eq!(evals[0].position, None);
        assert_eq!(evals[0].verdict, KeeperVerdict::Miss);
        assert_eq!(evals[1].positional_rank, None);
        assert_eq!(evals[1].verdict, KeeperVerdict::Miss);
        assert_eq!(evals[1].games_played, 0);
        assert_eq!(evals[1].points_per_game, 0.0);
        assert_eq!(evals[2].player_name, "nobody");
        assert_eq!(evals[2].team_name, "Team 2");
        assert_eq!(evals[2].verdict, KeeperVerdict::Miss);
    }

    #[test]
    fn test_position_without_threshold_is_a_miss() {
        let players = vec![player("lb1", Some("LB"))];
        let points = vec![PlayerWeeklyPoints { player_id: "lb1".into(), season_id: 1, week: 1, points: 12.0 }];
        let evals = evaluate_keepers(
            &[keeper("lb1", 1, 1)],
            &points,
            &players,
            &[],
            past_season_ctx(),
            &KeeperConfig::default(),
            &TradeConfig::default(),
        );
        assert_eq!(evals[0].positional_rank, Some(1));
        assert_eq!(evals[0].starter_threshold, None);
        assert_eq!(evals[0].verdict, KeeperVerdict::Miss);
    }
}
