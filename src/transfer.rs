//! Multi-round transfer ranking.
//!
//! The composite blends the horizon average with fixture-run quality, cost
//! efficiency and three reliability signals read from the rounds before the
//! start round. Ranking sorts by the composite, descending, and leaves ties in
//! input order.

use anyhow::{Result, ensure};
use rayon::prelude::*;
use tracing::info;

use crate::config::EngineConfig;
use crate::horizon::aggregate_horizon;
use crate::model::{Player, Round, TransferScore, round2};
use crate::provider::SeasonData;
use crate::rounds::resolve_from_round;
use crate::signals;
use crate::window::{ensure_identity, stats_window};

/// Transfer score for one player. `from_round = None` plans from the default round.
pub fn score_transfer<D: SeasonData + ?Sized>(
    data: &D,
    cfg: &EngineConfig,
    player: &Player,
    from_round: Option<&Round>,
    horizon: u32,
) -> Result<TransferScore> {
    cfg.validate()?;
    ensure_identity(player)?;
    ensure!(horizon > 0, "horizon must be > 0, got {horizon}");
    let from = resolve_from_round(data, from_round)?;
    score_from(data, cfg, player, from.as_ref(), horizon)
}

fn score_from<D: SeasonData + ?Sized>(
    data: &D,
    cfg: &EngineConfig,
    player: &Player,
    from: Option<&Round>,
    horizon: u32,
) -> Result<TransferScore> {
    ensure_identity(player)?;
    let Some(from) = from else {
        return Ok(TransferScore::empty(player.id, 0, horizon));
    };

    let agg = aggregate_horizon(data, cfg, player, from, horizon)?;
    let Some(first) = agg.per_round.values().next() else {
        return Ok(TransferScore::empty(player.id, from.number, horizon));
    };
    let ep_next = first.expected_points;

    let fixture_run_score = cfg.projection.difficulty_pivot - agg.avg_fixture_difficulty;
    let value_score = if player.cost.is_finite() && player.cost > 0.0 {
        agg.total / player.cost
    } else {
        0.0
    };

    let tp = &cfg.transfer;
    let stability_window = stats_window(data, player, from.number, tp.stability_window)?;
    let consistency_window = stats_window(data, player, from.number, tp.consistency_window)?;
    let upside_window = stats_window(data, player, from.number, tp.upside_window)?;
    let minutes_stability = signals::minutes_stability(&stability_window, tp);
    let consistency = signals::consistency(&consistency_window, tp);
    let upside = signals::upside(&upside_window, tp);

    let w = &cfg.transfer_weights;
    let composite = agg.average * w.horizon_avg
        + fixture_run_score * w.fixture_run
        + value_score * w.value
        + minutes_stability * w.minutes_stability
        + consistency * w.consistency
        + upside * w.upside;

    Ok(TransferScore {
        player_id: player.id,
        from_round: from.number,
        horizon,
        ep_next: round2(ep_next),
        ep_horizon_total: round2(agg.total),
        ep_horizon_avg: round2(agg.average),
        fixture_run_score: round2(fixture_run_score),
        value_score: round2(value_score),
        minutes_stability: round2(minutes_stability),
        consistency: round2(consistency),
        upside: round2(upside),
        transfer_score: round2(composite.max(0.0)),
    })
}

/// Scores every candidate (in parallel) and returns them best first.
///
/// Equal composites keep their relative order from `pool`. `limit = None`
/// returns the whole pool.
pub fn rank_candidates<D: SeasonData + ?Sized>(
    data: &D,
    cfg: &EngineConfig,
    pool: &[Player],
    from_round: Option<&Round>,
    horizon: u32,
    limit: Option<usize>,
) -> Result<Vec<TransferScore>> {
    cfg.validate()?;
    ensure!(horizon > 0, "horizon must be > 0, got {horizon}");
    if pool.is_empty() {
        return Ok(Vec::new());
    }
    let from = resolve_from_round(data, from_round)?;

    let mut scores = pool
        .par_iter()
        .map(|player| score_from(data, cfg, player, from.as_ref(), horizon))
        .collect::<Result<Vec<_>>>()?;

    sort_by_score_desc(&mut scores);
    if let Some(limit) = limit {
        scores.truncate(limit);
    }

    info!(
        candidates = pool.len(),
        returned = scores.len(),
        from_round = from.as_ref().map(|r| r.number),
        horizon,
        "ranked transfer candidates"
    );
    Ok(scores)
}

/// Stable sort, descending by composite.
pub fn sort_by_score_desc(scores: &mut [TransferScore]) {
    scores.sort_by(|a, b| b.transfer_score.total_cmp(&a.transfer_score));
}
