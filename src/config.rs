use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

/// Blend of the three single-round signals into the base score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionWeights {
    pub form: f64,
    pub fixture: f64,
    pub underlying: f64,
}

impl Default for ProjectionWeights {
    fn default() -> Self {
        Self {
            form: 0.5,
            fixture: 0.2,
            underlying: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionParams {
    /// Rounds of history behind form, underlying and minutes signals.
    pub window: usize,
    /// Difficulty used when no fixture (or no rating) is known.
    pub neutral_difficulty: f64,
    /// `fixture_score = difficulty_pivot - difficulty`, so easier fixtures score higher.
    pub difficulty_pivot: f64,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            window: 4,
            neutral_difficulty: 3.0,
            difficulty_pivot: 6.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendParams {
    pub short_window: usize,
    pub long_window: usize,
    pub sensitivity: f64,
    pub min_factor: f64,
    pub max_factor: f64,
}

impl Default for TrendParams {
    fn default() -> Self {
        Self {
            short_window: 2,
            long_window: 6,
            sensitivity: 0.2,
            min_factor: 0.9,
            max_factor: 1.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferWeights {
    pub horizon_avg: f64,
    pub fixture_run: f64,
    pub value: f64,
    pub minutes_stability: f64,
    pub consistency: f64,
    pub upside: f64,
}

impl Default for TransferWeights {
    fn default() -> Self {
        Self {
            horizon_avg: 0.40,
            fixture_run: 0.15,
            value: 0.15,
            minutes_stability: 0.10,
            consistency: 0.10,
            upside: 0.10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferParams {
    pub stability_window: usize,
    /// Minutes that count as a "secure" start.
    pub stability_minutes: u32,
    pub consistency_window: usize,
    /// Points at or above which a round counts as a return.
    pub return_points: i32,
    pub upside_window: usize,
    /// Points that map to an upside of 1.0.
    pub upside_ceiling: f64,
}

impl Default for TransferParams {
    fn default() -> Self {
        Self {
            stability_window: 4,
            stability_minutes: 60,
            consistency_window: 6,
            return_points: 5,
            upside_window: 6,
            upside_ceiling: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub projection_weights: ProjectionWeights,
    pub projection: ProjectionParams,
    pub trend: TrendParams,
    pub transfer_weights: TransferWeights,
    pub transfer: TransferParams,
    pub default_horizon: u32,
    pub default_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            projection_weights: ProjectionWeights::default(),
            projection: ProjectionParams::default(),
            trend: TrendParams::default(),
            transfer_weights: TransferWeights::default(),
            transfer: TransferParams::default(),
            default_horizon: 3,
            default_limit: 20,
        }
    }
}

impl EngineConfig {
    /// Defaults, overlaid with `FPL_WEIGHTS_FILE` and the scalar env overrides.
    pub fn from_env() -> Result<Self> {
        let mut cfg = match opt_env("FPL_WEIGHTS_FILE") {
            Some(path) => Self::load_file(Path::new(&path))?,
            None => Self::default(),
        };
        if let Some(h) = opt_env("FPL_HORIZON").and_then(|v| v.parse::<u32>().ok()) {
            cfg.default_horizon = h;
        }
        if let Some(l) = opt_env("FPL_RANK_LIMIT").and_then(|v| v.parse::<usize>().ok()) {
            cfg.default_limit = l;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Missing fields in the file keep their defaults.
    pub fn load_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read weights file {}", path.display()))?;
        let cfg: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parse weights file {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let pw = &self.projection_weights;
        let tw = &self.transfer_weights;
        let weights = [
            pw.form,
            pw.fixture,
            pw.underlying,
            tw.horizon_avg,
            tw.fixture_run,
            tw.value,
            tw.minutes_stability,
            tw.consistency,
            tw.upside,
        ];
        ensure!(
            weights.iter().all(|w| w.is_finite()),
            "weights must be finite numbers"
        );
        ensure!(self.projection.window > 0, "projection window must be > 0");
        ensure!(
            self.trend.short_window > 0 && self.trend.long_window > 0,
            "trend windows must be > 0"
        );
        ensure!(
            self.trend.min_factor <= self.trend.max_factor,
            "trend min_factor {} exceeds max_factor {}",
            self.trend.min_factor,
            self.trend.max_factor
        );
        ensure!(
            self.transfer.stability_window > 0
                && self.transfer.consistency_window > 0
                && self.transfer.upside_window > 0,
            "transfer look-back windows must be > 0"
        );
        ensure!(
            self.transfer.upside_ceiling > 0.0,
            "upside ceiling must be positive"
        );
        ensure!(self.default_horizon > 0, "default horizon must be > 0");
        Ok(())
    }
}

pub(crate) fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .and_then(|val| if val.trim().is_empty() { None } else { Some(val) })
}
