//! Read-only data the engine consumes.
//!
//! Ingestion owns these records; the engine only asks questions of them through
//! [`SeasonData`]. Absence is always `Ok(None)` or an empty `Vec`, never an error.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{Fixture, Player, RiskFlags, Round, RoundStat};

pub trait SeasonData: Sync {
    /// Stats strictly before `before_round`, most recent first, at most `limit` rows.
    fn history(&self, player_id: u32, before_round: u32, limit: usize) -> Result<Vec<RoundStat>>;

    /// First fixture in `round_id` involving `club_id`.
    fn fixture(&self, round_id: u32, club_id: u32) -> Result<Option<Fixture>>;

    fn risk_flags(&self, player_id: u32) -> Result<Option<RiskFlags>>;

    fn round_by_number(&self, number: u32) -> Result<Option<Round>>;

    fn current_round(&self) -> Result<Option<Round>>;

    fn next_round(&self) -> Result<Option<Round>>;

    /// Highest-numbered round known.
    fn latest_round(&self) -> Result<Option<Round>>;

    /// Unfinished rounds with `number >= from_number`, ascending, at most `limit`.
    fn upcoming_rounds(&self, from_number: u32, limit: usize) -> Result<Vec<Round>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRiskFlags {
    pub player_id: u32,
    #[serde(flatten)]
    pub flags: RiskFlags,
}

/// Everything a season needs, as one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonSnapshot {
    #[serde(default)]
    pub rounds: Vec<Round>,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub stats: Vec<RoundStat>,
    #[serde(default)]
    pub fixtures: Vec<Fixture>,
    #[serde(default)]
    pub risk_flags: Vec<PlayerRiskFlags>,
}

impl SeasonSnapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read season snapshot {}", path.display()))?;
        let snapshot: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parse season snapshot {}", path.display()))?;
        snapshot
            .validate()
            .with_context(|| format!("invalid season snapshot {}", path.display()))?;
        Ok(snapshot)
    }

    /// Rejects fixture ratings outside 1..=5.
    pub fn validate(&self) -> Result<()> {
        for fixture in &self.fixtures {
            fixture.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemorySeason {
    players: Vec<Player>,
    rounds: Vec<Round>,
    by_number: HashMap<u32, usize>,
    // Per player, sorted ascending by round number.
    stats: HashMap<u32, Vec<RoundStat>>,
    fixtures: Vec<Fixture>,
    flags: HashMap<u32, RiskFlags>,
}

impl MemorySeason {
    pub fn from_snapshot(snapshot: SeasonSnapshot) -> Self {
        let mut season = Self::default();
        for round in snapshot.rounds {
            season.upsert_round(round);
        }
        for player in snapshot.players {
            season.upsert_player(player);
        }
        for stat in snapshot.stats {
            season.upsert_stat(stat);
        }
        for fixture in snapshot.fixtures {
            season.add_fixture(fixture);
        }
        for item in snapshot.risk_flags {
            season.set_risk_flags(item.player_id, item.flags);
        }
        season
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn upsert_player(&mut self, player: Player) {
        match self.players.iter_mut().find(|p| p.id == player.id) {
            Some(existing) => *existing = player,
            None => self.players.push(player),
        }
    }

    /// Rounds are keyed by number; a stored round sharing the number or the id
    /// is replaced.
    pub fn upsert_round(&mut self, round: Round) {
        self.rounds
            .retain(|r| r.number != round.number && r.id != round.id);
        self.rounds.push(round);
        self.rounds.sort_by_key(|r| r.number);
        self.by_number = self
            .rounds
            .iter()
            .enumerate()
            .map(|(idx, r)| (r.number, idx))
            .collect();
    }

    /// One row per (player, round); a second insert replaces the first.
    pub fn upsert_stat(&mut self, stat: RoundStat) {
        let rows = self.stats.entry(stat.player_id).or_default();
        match rows.binary_search_by_key(&stat.round_number, |r| r.round_number) {
            Ok(idx) => rows[idx] = stat,
            Err(idx) => rows.insert(idx, stat),
        }
    }

    /// Fixtures keep insertion order; lookups return the first match.
    pub fn add_fixture(&mut self, fixture: Fixture) {
        self.fixtures.push(fixture);
    }

    pub fn set_risk_flags(&mut self, player_id: u32, flags: RiskFlags) {
        self.flags.insert(player_id, flags);
    }
}

impl SeasonData for MemorySeason {
    fn history(&self, player_id: u32, before_round: u32, limit: usize) -> Result<Vec<RoundStat>> {
        let Some(rows) = self.stats.get(&player_id) else {
            return Ok(Vec::new());
        };
        Ok(rows
            .iter()
            .rev()
            .filter(|r| r.round_number < before_round)
            .take(limit)
            .cloned()
            .collect())
    }

    fn fixture(&self, round_id: u32, club_id: u32) -> Result<Option<Fixture>> {
        Ok(self
            .fixtures
            .iter()
            .find(|f| f.round_id == round_id && f.involves(club_id))
            .cloned())
    }

    fn risk_flags(&self, player_id: u32) -> Result<Option<RiskFlags>> {
        Ok(self.flags.get(&player_id).cloned())
    }

    fn round_by_number(&self, number: u32) -> Result<Option<Round>> {
        Ok(self
            .by_number
            .get(&number)
            .and_then(|idx| self.rounds.get(*idx))
            .cloned())
    }

    fn current_round(&self) -> Result<Option<Round>> {
        Ok(self.rounds.iter().find(|r| r.is_current).cloned())
    }

    fn next_round(&self) -> Result<Option<Round>> {
        Ok(self.rounds.iter().find(|r| r.is_next).cloned())
    }

    fn latest_round(&self) -> Result<Option<Round>> {
        Ok(self.rounds.iter().max_by_key(|r| r.number).cloned())
    }

    fn upcoming_rounds(&self, from_number: u32, limit: usize) -> Result<Vec<Round>> {
        let mut out: Vec<Round> = self
            .rounds
            .iter()
            .filter(|r| r.number >= from_number && !r.is_finished)
            .cloned()
            .collect();
        out.sort_by_key(|r| r.number);
        out.truncate(limit);
        Ok(out)
    }
}
