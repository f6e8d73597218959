use anyhow::{Result, ensure};
use tracing::debug;

use crate::config::EngineConfig;
use crate::expected_points::project_expected_points;
use crate::fixtures::fixture_difficulty;
use crate::model::{HorizonAggregate, Player, Round, RoundProjection};
use crate::provider::SeasonData;
use crate::window::ensure_identity;

/// Projects `player` over up to `horizon` unfinished rounds starting at `from_round`.
///
/// Near the end of a season fewer rounds may remain; totals and averages are
/// over the rounds actually found. With none left the aggregate is all zero.
/// Totals are sums of the already-rounded per-round projections and are not
/// rounded again here.
pub fn aggregate_horizon<D: SeasonData + ?Sized>(
    data: &D,
    cfg: &EngineConfig,
    player: &Player,
    from_round: &Round,
    horizon: u32,
) -> Result<HorizonAggregate> {
    ensure_identity(player)?;
    ensure!(horizon > 0, "horizon must be > 0, got {horizon}");

    let rounds = data.upcoming_rounds(from_round.number, horizon as usize)?;
    let mut out = HorizonAggregate::empty(player.id, from_round.number, horizon);
    if rounds.is_empty() {
        return Ok(out);
    }

    let mut difficulty_sum = 0.0;
    for round in &rounds {
        let expected_points = project_expected_points(data, cfg, player, round)?;
        let difficulty = fixture_difficulty(data, &cfg.projection, player, round)?;
        out.total += expected_points;
        difficulty_sum += difficulty;
        out.per_round.insert(
            round.number,
            RoundProjection {
                expected_points,
                fixture_difficulty: difficulty,
            },
        );
    }

    let count = out.per_round.len() as f64;
    out.average = out.total / count;
    out.avg_fixture_difficulty = difficulty_sum / count;

    debug!(
        player_id = player.id,
        from_round = from_round.number,
        rounds = out.per_round.len(),
        total = out.total,
        "aggregated horizon"
    );
    Ok(out)
}
