//! # Matchup Pairing
//!
//! Groups per-roster weekly score rows into head-to-head pairs keyed by
//! (season, week, game id). Every downstream engine consumes the
//! chronologically sorted output of this module.

use crate::types::{GameId, MatchupPair, RosterId, Season, SeasonId, WeeklyScoreRow};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

type GroupKey = (SeasonId, u32, GameId);

fn group_rows<'a>(
    rows: impl IntoIterator<Item = &'a WeeklyScoreRow>,
) -> BTreeMap<GroupKey, Vec<&'a WeeklyScoreRow>> {
    let mut groups: BTreeMap<GroupKey, Vec<&WeeklyScoreRow>> = BTreeMap::new();
    for row in rows {
        groups.entry((row.season_id, row.week, row.game_id)).or_default().push(row);
    }
    groups
}

fn year_of(years: &HashMap<SeasonId, i32>, season_id: SeasonId) -> i32 {
    years.get(&season_id).copied().unwrap_or(0)
}

/// Pair every game id shared by exactly two rosters.
///
/// Team A is the lower roster id. Groups of any other size are dropped, as are
/// 0-0 pairings (not yet played). Output is sorted chronologically.
pub fn pair_matchups(rows: &[WeeklyScoreRow], seasons: &[Season]) -> Vec<MatchupPair> {
    let years = crate::types::season_years(seasons);
    let groups = group_rows(rows);
    let group_count = groups.len();

    let mut pairs: Vec<MatchupPair> = groups
        .into_iter()
        .filter_map(|((season_id, week, game_id), mut group)| {
            if group.len() != 2 || group[0].roster_id == group[1].roster_id {
                return None;
            }
            group.sort_by_key(|r| r.roster_id);
            let (a, b) = (group[0], group[1]);
            MatchupPair::new(
                season_id,
                year_of(&years, season_id),
                week,
                game_id,
                (a.roster_id, a.score()),
                (b.roster_id, b.score()),
            )
        })
        .collect();

    sort_chronologically(&mut pairs);
    debug!("Paired {} rows into {} matchups ({} groups)", rows.len(), pairs.len(), group_count);
    pairs
}

/// Pair only games played between `team_a` and `team_b`, optionally within
/// one season. `team_a` is always side A of the output.
pub fn pair_rivalry(
    rows: &[WeeklyScoreRow],
    seasons: &[Season],
    team_a: RosterId,
    team_b: RosterId,
    season_filter: Option<SeasonId>,
) -> Vec<MatchupPair> {
    if team_a == team_b {
        return Vec::new();
    }
    let years = crate::types::season_years(seasons);
    let in_scope = rows.iter().filter(|r| season_filter.map_or(true, |s| r.season_id == s));

    // Group before matching rosters: a game shared with a third roster is malformed
    let mut pairs: Vec<MatchupPair> = group_rows(in_scope)
        .into_iter()
        .filter_map(|((season_id, week, game_id), group)| {
            if group.len() != 2 || group[0].roster_id == group[1].roster_id {
                return None;
            }
            let a = group.iter().find(|r| r.roster_id == team_a)?;
            let b = group.iter().find(|r| r.roster_id == team_b)?;
            MatchupPair::new(
                season_id,
                year_of(&years, season_id),
                week,
                game_id,
                (a.roster_id, a.score()),
                (b.roster_id, b.score()),
            )
        })
        .collect();

    sort_chronologically(&mut pairs);
    pairs
}

/// Sort by (season year, week, game id)
pub fn sort_chronologically(pairs: &mut [MatchupPair]) {
    pairs.sort_by_key(MatchupPair::chrono_key);
}

/// Pairs belonging to one season, order preserved
pub fn for_season(pairs: &[MatchupPair], season_id: SeasonId) -> Vec<MatchupPair> {
    pairs.iter().filter(|p| p.season_id == season_id).cloned().collect()
}
