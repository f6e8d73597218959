use anyhow::{Result, anyhow};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::expected_points::project_expected_points;
use crate::provider::SeasonData;
use crate::store::SqliteSeason;

#[derive(Debug, Clone, Default)]
pub struct BackfillSummary {
    pub round_number: u32,
    pub updated: usize,
    pub skipped: usize,
}

/// Computes expected points for every player with a stats row in `round_number`
/// and stores it on that row. Rows whose player is unknown are skipped.
pub fn backfill_round(
    store: &SqliteSeason,
    cfg: &EngineConfig,
    round_number: u32,
) -> Result<BackfillSummary> {
    let round = store
        .round_by_number(round_number)?
        .ok_or_else(|| anyhow!("no round with number {round_number}"))?;

    let mut summary = BackfillSummary {
        round_number,
        ..Default::default()
    };
    for player_id in store.player_ids_with_stats(round_number)? {
        let Some(player) = store.player(player_id)? else {
            warn!(player_id, round = round_number, "stats row without player, skipped");
            summary.skipped += 1;
            continue;
        };
        let ep = project_expected_points(store, cfg, &player, &round)?;
        if store.set_expected_points(player_id, round_number, ep)? {
            summary.updated += 1;
        } else {
            summary.skipped += 1;
        }
    }

    info!(
        round = round_number,
        updated = summary.updated,
        skipped = summary.skipped,
        "backfilled expected points"
    );
    Ok(summary)
}
