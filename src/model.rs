use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

/// Opponent ratings run from 1 (easiest) to 5 (hardest).
pub const DIFFICULTY_RANGE: RangeInclusive<u8> = 1..=5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "GKP", alias = "GOALKEEPER")]
    Goalkeeper,
    #[serde(rename = "DEF", alias = "DEFENDER")]
    Defender,
    #[serde(rename = "MID", alias = "MIDFIELDER")]
    Midfielder,
    #[serde(rename = "FWD", alias = "FORWARD")]
    Forward,
}

impl Position {
    pub fn code(self) -> &'static str {
        match self {
            Position::Goalkeeper => "GKP",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }

    pub fn from_code(raw: &str) -> Option<Self> {
        let s = raw.trim().to_ascii_uppercase();
        match s.as_str() {
            "GKP" | "GK" | "GOALKEEPER" => Some(Position::Goalkeeper),
            "DEF" | "DEFENDER" => Some(Position::Defender),
            "MID" | "MIDFIELDER" => Some(Position::Midfielder),
            "FWD" | "FW" | "FORWARD" => Some(Position::Forward),
            _ => None,
        }
    }
}

/// A player as seen by the engine. Id 0 means "no identity" and is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    #[serde(default)]
    pub web_name: String,
    pub position: Position,
    /// Current price, in the game's millions (e.g. 7.5).
    pub cost: f64,
    #[serde(default)]
    pub club_id: Option<u32>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub id: u32,
    pub number: u32,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub is_next: bool,
    #[serde(default)]
    pub is_finished: bool,
}

/// Per-player, per-round statistics. Missing xG/xA means "not recorded", not zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundStat {
    pub player_id: u32,
    pub round_number: u32,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub total_points: i32,
    #[serde(default)]
    pub goals_scored: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub clean_sheets: u32,
    #[serde(default)]
    pub goals_conceded: u32,
    #[serde(default)]
    pub bonus: u32,
    #[serde(default)]
    pub xg: Option<f64>,
    #[serde(default)]
    pub xa: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub id: u32,
    pub round_id: u32,
    pub home_club_id: u32,
    pub away_club_id: u32,
    #[serde(default)]
    pub home_difficulty: Option<u8>,
    #[serde(default)]
    pub away_difficulty: Option<u8>,
    #[serde(default)]
    pub finished: bool,
}

impl Fixture {
    pub fn involves(&self, club_id: u32) -> bool {
        self.home_club_id == club_id || self.away_club_id == club_id
    }

    /// Difficulty from `club_id`'s side of the fixture. Ratings outside 1..=5
    /// count as unrated.
    pub fn difficulty_for(&self, club_id: u32) -> Option<u8> {
        let raw = if self.home_club_id == club_id {
            self.home_difficulty
        } else {
            self.away_difficulty
        };
        raw.filter(|d| DIFFICULTY_RANGE.contains(d))
    }

    pub fn validate(&self) -> Result<()> {
        for (side, rating) in [("home", self.home_difficulty), ("away", self.away_difficulty)] {
            if let Some(d) = rating {
                ensure!(
                    DIFFICULTY_RANGE.contains(&d),
                    "fixture {} has {side} difficulty {d}, expected 1-5",
                    self.id
                );
            }
        }
        Ok(())
    }
}

/// Curated availability risks, each a probability in [0, 1].
///
/// A player without flags is treated as `RiskFlags::default()`: no risk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskFlags {
    #[serde(default)]
    pub injury_risk: f64,
    #[serde(default)]
    pub rotation_risk: f64,
    #[serde(default)]
    pub note: Option<String>,
}

/// Every intermediate value behind a single-round projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectionBreakdown {
    pub player_id: u32,
    pub round_number: u32,
    pub window_len: usize,
    pub form_score: f64,
    pub fixture_difficulty: f64,
    pub fixture_score: f64,
    pub underlying_score: f64,
    pub minutes_probability: f64,
    pub risk_factor: f64,
    pub trend_factor: f64,
    pub base: f64,
    pub availability: f64,
    pub expected_points: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoundProjection {
    pub expected_points: f64,
    pub fixture_difficulty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HorizonAggregate {
    pub player_id: u32,
    pub from_round: u32,
    pub horizon: u32,
    /// Keyed by round number, ascending.
    pub per_round: BTreeMap<u32, RoundProjection>,
    pub total: f64,
    pub average: f64,
    pub avg_fixture_difficulty: f64,
}

impl HorizonAggregate {
    pub fn empty(player_id: u32, from_round: u32, horizon: u32) -> Self {
        Self {
            player_id,
            from_round,
            horizon,
            per_round: BTreeMap::new(),
            total: 0.0,
            average: 0.0,
            avg_fixture_difficulty: 0.0,
        }
    }

    /// Number of rounds actually aggregated (may be less than `horizon`).
    pub fn rounds_found(&self) -> usize {
        self.per_round.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferScore {
    pub player_id: u32,
    pub from_round: u32,
    pub horizon: u32,
    pub ep_next: f64,
    pub ep_horizon_total: f64,
    pub ep_horizon_avg: f64,
    pub fixture_run_score: f64,
    pub value_score: f64,
    pub minutes_stability: f64,
    pub consistency: f64,
    pub upside: f64,
    pub transfer_score: f64,
}

impl TransferScore {
    pub fn empty(player_id: u32, from_round: u32, horizon: u32) -> Self {
        Self {
            player_id,
            from_round,
            horizon,
            ep_next: 0.0,
            ep_horizon_total: 0.0,
            ep_horizon_avg: 0.0,
            fixture_run_score: 0.0,
            value_score: 0.0,
            minutes_stability: 0.0,
            consistency: 0.0,
            upside: 0.0,
            transfer_score: 0.0,
        }
    }
}

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    // Adding 0.0 folds -0.0 into 0.0 so zero scores compare equal.
    (value * 100.0).round() / 100.0 + 0.0
}
