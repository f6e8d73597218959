//! Single-round expected points.
//!
//! `base = form * w_form + fixture * w_fixture + underlying * w_underlying`, scaled by
//! availability (minutes probability times curated risk) and a bounded trend factor.
//! The result is clamped at zero and rounded to two decimals.

use anyhow::Result;
use tracing::debug;

use crate::config::EngineConfig;
use crate::fixtures::fixture_difficulty;
use crate::model::{Player, ProjectionBreakdown, Round, round2};
use crate::provider::SeasonData;
use crate::rounds::resolve_default_round;
use crate::signals;
use crate::window::{ensure_identity, stats_window};

pub fn project_expected_points<D: SeasonData + ?Sized>(
    data: &D,
    cfg: &EngineConfig,
    player: &Player,
    round: &Round,
) -> Result<f64> {
    Ok(explain_expected_points(data, cfg, player, round)?.expected_points)
}

/// Same as [`project_expected_points`] but keeps every intermediate value.
pub fn explain_expected_points<D: SeasonData + ?Sized>(
    data: &D,
    cfg: &EngineConfig,
    player: &Player,
    round: &Round,
) -> Result<ProjectionBreakdown> {
    cfg.validate()?;
    let window = stats_window(data, player, round.number, cfg.projection.window)?;

    let difficulty = fixture_difficulty(data, &cfg.projection, player, round)?;
    let fixture_score = cfg.projection.difficulty_pivot - difficulty;
    let flags = data.risk_flags(player.id)?;
    let risk_factor = signals::risk_factor(flags.as_ref());

    // No history: components keep their neutral values, the projection is zero.
    if window.is_empty() {
        return Ok(ProjectionBreakdown {
            player_id: player.id,
            round_number: round.number,
            fixture_difficulty: difficulty,
            fixture_score,
            risk_factor,
            trend_factor: 1.0,
            ..Default::default()
        });
    }

    let form_score = signals::points_per_90(&window);
    let underlying_score = signals::xgi_per_90(&window);
    let minutes_probability = signals::minutes_probability(&window);

    let trend_window = stats_window(data, player, round.number, cfg.trend.long_window)?;
    let trend_factor = signals::trend_factor(&trend_window, &cfg.trend);

    let w = &cfg.projection_weights;
    let base = form_score * w.form + fixture_score * w.fixture + underlying_score * w.underlying;
    let availability = minutes_probability * risk_factor;
    let expected_points = round2((base * availability * trend_factor).max(0.0));

    debug!(
        player_id = player.id,
        round = round.number,
        form_score,
        fixture_score,
        underlying_score,
        availability,
        trend_factor,
        expected_points,
        "projected expected points"
    );

    Ok(ProjectionBreakdown {
        player_id: player.id,
        round_number: round.number,
        window_len: window.len(),
        form_score,
        fixture_difficulty: difficulty,
        fixture_score,
        underlying_score,
        minutes_probability,
        risk_factor,
        trend_factor,
        base,
        availability,
        expected_points,
    })
}

/// Projection for whichever round the season currently plans from; 0.0 if none.
pub fn project_this_round<D: SeasonData + ?Sized>(
    data: &D,
    cfg: &EngineConfig,
    player: &Player,
) -> Result<f64> {
    ensure_identity(player)?;
    match resolve_default_round(data)? {
        Some(round) => project_expected_points(data, cfg, player, &round),
        None => Ok(0.0),
    }
}
