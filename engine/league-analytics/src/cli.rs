//! # Command Line Interface
//!
//! Loads a league snapshot and prints any engine's output as JSON.

use crate::config::AnalyticsConfig;
use crate::error::AnalyticsError;
use crate::snapshot::LeagueSnapshot;
use crate::types::{RosterId, SeasonId};
use crate::LeagueAnalytics;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// League analytics CLI for inspecting a league snapshot
#[derive(Parser)]
#[command(name = "league-analytics-cli")]
#[command(about = "Standings, power rankings, rivalries and trade grades for a fantasy league")]
pub struct Cli {
    /// Path to the league snapshot (JSON)
    #[arg(short, long, default_value = "./league_snapshot.json")]
    pub snapshot: PathBuf,

    /// Path to a TOML config file; defaults plus LEAGUE_ANALYTICS_* variables otherwise
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Season id to scope to; defaults to the current season
    #[arg(long, global = true)]
    pub season: Option<SeasonId>,

    /// Use every season instead of one
    #[arg(long, global = true, conflicts_with = "season")]
    pub all_time: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show standings with streaks
    Standings,
    /// Show power rankings
    Power,
    /// Show the head-to-head history of two rosters
    Rivalry {
        team_a: RosterId,
        team_b: RosterId,
    },
    /// Show one roster's record against every opponent
    Rivals {
        roster: RosterId,
    },
    /// Show the full league pulse
    Pulse,
    /// Show league records
    Records,
    /// Show the playoff race
    Playoffs,
    /// Show transaction activity, trade partners and position churn
    Transactions,
    /// Grade one trade for every side
    Trade {
        transaction_id: String,
    },
    /// Grade every completed trade
    Trades,
    /// Evaluate keepers
    Keepers,
    /// Write the effective configuration to a TOML file
    InitConfig {
        path: PathBuf,
    },
}

impl Cli {
    /// Config file when given, then environment overrides
    pub fn load_config(&self) -> Result<AnalyticsConfig> {
        match &self.config {
            Some(path) => {
                let mut config = AnalyticsConfig::load_from_file(path)
                    .with_context(|| format!("loading config {}", path.display()))?;
                config.apply_overrides(|key| std::env::var(key).ok());
                config.validate()?;
                Ok(config)
            }
            None => Ok(AnalyticsConfig::from_env()?),
        }
    }
}

/// CLI handler
pub struct CliHandler {
    analytics: LeagueAnalytics,
    snapshot: LeagueSnapshot,
}

impl CliHandler {
    /// Create new CLI handler
    pub fn new(snapshot_path: &Path, config: AnalyticsConfig) -> Result<Self> {
        let snapshot = LeagueSnapshot::load_from_file(snapshot_path)
            .with_context(|| format!("loading snapshot {}", snapshot_path.display()))?;
        info!(
            "Loaded league snapshot with {} seasons and {} rosters",
            snapshot.seasons.len(),
            snapshot.rosters.len()
        );
        Ok(Self::with_snapshot(snapshot, config))
    }

    pub fn with_snapshot(snapshot: LeagueSnapshot, config: AnalyticsConfig) -> Self {
        Self { analytics: LeagueAnalytics::new(config), snapshot }
    }

    /// Resolve `--season` / `--all-time` to a season scope
    pub fn scope(&self, season: Option<SeasonId>, all_time: bool) -> Result<Option<SeasonId>> {
        if all_time {
            return Ok(None);
        }
        let season = match season {
            Some(id) => self.snapshot.season(id)?,
            None => self.snapshot.current_season()?,
        };
        Ok(Some(season.id))
    }

    fn ensure_roster(&self, roster_id: RosterId) -> Result<()> {
        let known = self.snapshot.rosters.iter().any(|r| r.roster_id == roster_id)
            || self.snapshot.matchups.iter().any(|row| row.roster_id == roster_id);
        if known {
            Ok(())
        } else {
            Err(AnalyticsError::RosterNotFound(roster_id).into())
        }
    }

    /// Handle CLI commands
    pub fn handle_command(&self, command: Commands, season: Option<SeasonId>, all_time: bool) -> Result<()> {
        if let Commands::InitConfig { path } = &command {
            return write_config(self.analytics.config(), path);
        }

        let snapshot = &self.snapshot;
        let analytics = &self.analytics;
        let scope = self.scope(season, all_time)?;
        let label = scope.map_or_else(|| "all time".to_string(), |id| format!("season {id}"));

        match command {
            Commands::Standings => {
                print_section(&format!("🏆 Standings ({label})"), &analytics.standings(snapshot, scope))?;
            }
            Commands::Power => {
                print_section(&format!("⚡ Power Rankings ({label})"), &analytics.power_rankings(snapshot, scope))?;
            }
            Commands::Rivalry { team_a, team_b } => {
                self.ensure_roster(team_a)?;
                self.ensure_roster(team_b)?;
                let report = analytics.rivalry(snapshot, team_a, team_b, scope);
                print_section(
                    &format!("🤝 {} vs {} ({label})", report.team_a_name, report.team_b_name),
                    &report,
                )?;
            }
            Commands::Rivals { roster } => {
                self.ensure_roster(roster)?;
                print_section(&format!("🤝 Opponents of roster {roster} ({label})"), &analytics.rivals(snapshot, roster, scope))?;
            }
            Commands::Pulse => {
                print_section(&format!("📈 League Pulse ({label})"), &analytics.pulse(snapshot, scope))?;
            }
            Commands::Records => {
                print_section(&format!("📜 League Records ({label})"), &analytics.pulse(snapshot, scope).records)?;
            }
            Commands::Playoffs => {
                print_section(&format!("🎯 Playoff Race ({label})"), &analytics.pulse(snapshot, scope).playoff_race)?;
            }
            Commands::Transactions => {
                print_section(&format!("🔁 Transactions ({label})"), &analytics.transactions(snapshot, scope))?;
            }
            Commands::Trade { transaction_id } => {
                print_section(&format!("📊 Trade {transaction_id}"), &analytics.grade_trade(snapshot, &transaction_id)?)?;
            }
            Commands::Trades => {
                print_section(&format!("📊 Trade Grades ({label})"), &analytics.trade_grades(snapshot, scope)?)?;
            }
            Commands::Keepers => {
                print_section(&format!("🔒 Keepers ({label})"), &analytics.keepers(snapshot, scope)?)?;
            }
            Commands::InitConfig { .. } => {}
        }
        Ok(())
    }
}

/// Write the effective configuration without needing a snapshot
pub fn write_config(config: &AnalyticsConfig, path: &Path) -> Result<()> {
    config.save_to_file(path).with_context(|| format!("writing config {}", path.display()))?;
    info!("Wrote configuration to {}", path.display());
    Ok(())
}

fn print_section<T: Serialize>(title: &str, value: &T) -> Result<()> {
    println!("{title}");
    println!("{}", "=".repeat(50));
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Roster, Season, WeeklyScoreRow};

    fn handler() -> CliHandler {
        let snapshot = LeagueSnapshot {
            seasons: vec![
                Season { id: 1, season_year: 2023, is_current: false },
                Season { id: 2, season_year: 2024, is_current: true },
            ],
            rosters: vec![Roster::new(1, "Alpha"), Roster::new(2, "Bravo")],
            matchups: vec![
                WeeklyScoreRow { season_id: 2, week: 1, game_id: 1, roster_id: 1, points: Some(100.0) },
                WeeklyScoreRow { season_id: 2, week: 1, game_id: 1, roster_id: 2, points: Some(90.0) },
            ],
            ..LeagueSnapshot::default()
        };
        CliHandler::with_snapshot(snapshot, AnalyticsConfig::default())
    }

    #[test]
    fn test_scope_resolution() {
        let handler = handler();
        assert_eq!(handler.scope(None, false).unwrap(), Some(2));
        assert_eq!(handler.scope(Some(1), false).unwrap(), Some(1));
        assert_eq!(handler.scope(None, true).unwrap(), None);
        assert!(handler.scope(Some(9), false).is_err());
    }

    #[test]
    fn test_unknown_roster_is_rejected() {
        let handler = handler();
        assert!(handler.ensure_roster(1).is_ok());
        let err = handler.handle_command(Commands::Rivals { roster: 42 }, None, false).unwrap_err();
        assert!(matches!(err.downcast_ref::<AnalyticsError>(), Some(AnalyticsError::RosterNotFound(42))));
    }

    #[test]
    fn test_commands_run_against_snapshot() {
        let handler = handler();
        for command in [Commands::Standings, Commands::Power, Commands::Pulse, Commands::Transactions] {
            handler.handle_command(command, None, false).unwrap();
        }
        handler.handle_command(Commands::Rivalry { team_a: 1, team_b: 2 }, None, true).unwrap();
        handler.handle_command(Commands::Trades, None, false).unwrap();
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from(["league-analytics-cli", "--snapshot", "league.json", "power", "--all-time"]).unwrap();
        assert!(cli.all_time);
        assert_eq!(cli.snapshot, PathBuf::from("league.json"));
        assert!(matches!(cli.command, Commands::Power));

        let cli = Cli::try_parse_from(["league-analytics-cli", "rivalry", "1", "2", "--season", "7"]).unwrap();
        assert_eq!(cli.season, Some(7));
        assert!(matches!(cli.command, Commands::Rivalry { team_a: 1, team_b: 2 }));
    }
}
