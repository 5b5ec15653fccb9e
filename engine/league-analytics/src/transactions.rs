//! # Transaction Analytics
//!
//! Activity counts per manager, who trades with whom, and add/drop churn by
//! position. Only completed transactions are counted.

use crate::types::{team_name, Player, Roster, RosterId, TransactionRecord, TransactionType};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Positions tracked for churn, in display order
pub const CHURN_POSITIONS: [&str; 6] = ["QB", "RB", "WR", "TE", "K", "DEF"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagerActivity {
    pub roster_id: RosterId,
    pub team_name: String,
    pub trades: u32,
    pub waivers: u32,
    pub free_agents: u32,
    pub commissioner: u32,
    pub total: u32,
}

impl ManagerActivity {
    fn new(roster_id: RosterId, team_name: String) -> Self {
        Self { roster_id, team_name, trades: 0, waivers: 0, free_agents: 0, commissioner: 0, total: 0 }
    }

    fn record(&mut self, kind: TransactionType) {
        match kind {
            TransactionType::Trade => self.trades += 1,
            TransactionType::Waiver => self.waivers += 1,
            TransactionType::FreeAgent => self.free_agents += 1,
            TransactionType::Commissioner => self.commissioner += 1,
        }
        self.total += 1;
    }
}

fn completed(transactions: &[TransactionRecord]) -> impl Iterator<Item = &TransactionRecord> {
    transactions.iter().filter(|t| t.is_complete())
}

/// Transaction counts per roster, most active first. Every roster in
/// `rosters` gets a row even with no activity.
pub fn manager_activity(transactions: &[TransactionRecord], rosters: &[Roster]) -> Vec<ManagerActivity> {
    let mut activity: BTreeMap<RosterId, ManagerActivity> = rosters
        .iter()
        .map(|r| (r.roster_id, ManagerActivity::new(r.roster_id, r.display_name())))
        .collect();

    for tx in completed(transactions) {
        let mut seen = Vec::with_capacity(tx.roster_ids.len());
        for roster_id in &tx.roster_ids {
            if seen.contains(roster_id) {
                continue;
            }
            seen.push(*roster_id);
            activity
                .entry(*roster_id)
                .or_insert_with(|| ManagerActivity::new(*roster_id, team_name(rosters, *roster_id)))
                .record(tx.kind);
        }
    }

    let mut out: Vec<ManagerActivity> = activity.into_values().collect();
    out.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.roster_id.cmp(&b.roster_id)));
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradePartners {
    /// Lower roster id of the pair
    pub roster_a: RosterId,
    pub roster_b: RosterId,
    pub trades: u32,
}

/// Symmetric count of completed two-team trades, keyed by sorted roster pair
pub fn trade_matrix(transactions: &[TransactionRecord]) -> BTreeMap<(RosterId, RosterId), u32> {
    let mut matrix = BTreeMap::new();
    for tx in completed(transactions).filter(|t| t.kind == TransactionType::Trade) {
        if let [a, b] = tx.roster_ids.as_slice() {
            if a == b {
                continue;
            }
            *matrix.entry((*a.min(b), *a.max(b))).or_insert(0) += 1;
        }
    }
    matrix
}

/// Trade matrix flattened to rows, most frequent partners first
pub fn trade_partners(transactions: &[TransactionRecord]) -> Vec<TradePartners> {
    let mut rows: Vec<TradePartners> = trade_matrix(transactions)
        .into_iter()
        .map(|((roster_a, roster_b), trades)| TradePartners { roster_a, roster_b, trades })
        .collect();
    rows.sort_by(|x, y| y.trades.cmp(&x.trades).then_with(|| (x.roster_a, x.roster_b).cmp(&(y.roster_a, y.roster_b))));
    rows
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionChurn {
    pub position: String,
    pub adds: u32,
    pub drops: u32,
    pub net: i64,
}

/// League-wide adds and drops per tracked position. Players with an unknown
/// or untracked position are ignored.
pub fn position_churn(transactions: &[TransactionRecord], players: &[Player]) -> Vec<PositionChurn> {
    let positions: HashMap<&str, &str> = players
        .iter()
        .filter_map(|p| p.position.as_deref().map(|pos| (p.player_id.as_str(), pos)))
        .collect();

    let mut counts: HashMap<&str, (u32, u32)> = CHURN_POSITIONS.iter().map(|p| (*p, (0, 0))).collect();
    for tx in completed(transactions) {
        for player_id in tx.adds.keys() {
            if let Some(entry) = positions.get(player_id.as_str()).and_then(|pos| counts.get_mut(pos)) {
                entry.0 += 1;
            }
        }
        for player_id in tx.drops.keys() {
            if let Some(entry) = positions.get(player_id.as_str()).and_then(|pos| counts.get_mut(pos)) {
                entry.1 += 1;
            }
        }
    }

    CHURN_POSITIONS
        .iter()
        .map(|pos| {
            let (adds, drops) = counts[pos];
            PositionChurn { position: pos.to_string(), adds, drops, net: adds as i64 - drops as i64 }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionStatus;
    use chrono::{TimeZone, Utc};

    fn tx(id: &str, kind: TransactionType, status: TransactionStatus, rosters: &[u32]) -> TransactionRecord {
        TransactionRecord {
            transaction_id: id.to_string(),
            season_id: 1,
            week: 3,
            kind,
            status,
            roster_ids: rosters.to_vec(),
            adds: HashMap::new(),
            drops: HashMap::new(),
            draft_picks: Vec::new(),
            created_at: Utc.with_ymd_and_hms(2024, 9, 20, 12, 0, 0).unwrap(),
        }
    }

    fn player(id: &str, position: Option<&str>) -> Player {
        Player { player_id: id.to_string(), full_name: None, position: position.map(String::from) }
    }

    #[test]
    fn test_manager_activity_counts_complete_only() {
        use crate::types::TransactionStatus::*;
        use crate::types::TransactionType::*;
        let txs = vec![
            tx("1", Trade, Complete, &[1, 2]),
            tx("2", Waiver, Complete, &[1]),
            tx("3", FreeAgent, Complete, &[1]),
            tx("4", FreeAgent, Failed, &[2]),
            tx("5", Commissioner, Complete, &[3]),
            tx("6", Waiver, Pending, &[3]),
        ];
        let rosters = vec![Roster::new(1, "Alpha"), Roster::new(2, "Bravo"), Roster::new(4, "Delta")];
        let activity = manager_activity(&txs, &rosters);

        assert_eq!(activity[0].roster_id, 1);
        assert_eq!((activity[0].trades, activity[0].waivers, activity[0].free_agents, activity[0].total), (1, 1, 1, 3));
        let bravo = activity.iter().find(|a| a.roster_id == 2).unwrap();
        assert_eq!(bravo.total, 1);
        let unknown = activity.iter().find(|a| a.roster_id == 3).unwrap();
        assert_eq!((unknown.team_name.as_str(), unknown.commissioner), ("Team 3", 1));
        assert_eq!(activity.last().unwrap().roster_id, 4);
        assert_eq!(activity.last().unwrap().total, 0);
    }

    #[test]
    fn test_trade_matrix_is_symmetric_and_two_party_only() {
        use crate::types::TransactionStatus::*;
        use crate::types::TransactionType::*;
        let txs = vec![
            tx("1", Trade, Complete, &[2, 1]),
            tx("2", Trade, Complete, &[1, 2]),
            tx("3", Trade, Complete, &[1, 2, 3]),
            tx("4", Trade, Failed, &[1, 3]),
            tx("5", Waiver, Complete, &[1, 3]),
            tx("6", Trade, Complete, &[3, 4]),
        ];
        let matrix = trade_matrix(&txs);
        assert_eq!(matrix.get(&(1, 2)), Some(&2));
        assert_eq!(matrix.get(&(3, 4)), Some(&1));
        assert_eq!(matrix.len(), 2);

        let partners = trade_partners(&txs);
        assert_eq!((partners[0].roster_a, partners[0].roster_b, partners[0].trades), (1, 2, 2));
    }

    #[test]
    fn test_position_churn() {
        let mut waiver = tx("1", TransactionType::Waiver, TransactionStatus::Complete, &[1]);
        waiver.adds.insert("rb1".into(), 1);
        waiver.drops.insert("wr1".into(), 1);
        let mut fa = tx("2", TransactionType::FreeAgent, TransactionStatus::Complete, &[2]);
        fa.adds.insert("rb2".into(), 2);
        fa.adds.insert("mystery".into(), 2);
        fa.drops.insert("flex".into(), 2);
        let mut failed = tx("3", TransactionType::FreeAgent, TransactionStatus::Failed, &[2]);
        failed.adds.insert("qb1".into(), 2);

        let players = vec![
            player("rb1", Some("RB")),
            player("rb2", Some("RB")),
            player("wr1", Some("WR")),
            player("qb1", Some("QB")),
            player("flex", Some("LB")),
            player("mystery", None),
        ];
        let churn = position_churn(&[waiver, fa, failed], &players);
        let positions: Vec<&str> = churn.iter().map(|c| c.position.as_str()).collect();
        assert_eq!(positions, CHURN_POSITIONS.to_vec());

        let rb = &churn[1];
        assert_eq!((rb.adds, rb.drops, rb.net), (2, 0, 2));
        let wr = &churn[2];
        assert_eq!((wr.adds, wr.drops, wr.net), (0, 1, -1));
        assert_eq!(churn[0].adds, 0);
    }
}
