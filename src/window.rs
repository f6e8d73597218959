use anyhow::{Result, ensure};

use crate::model::{Player, RoundStat};
use crate::provider::SeasonData;

/// The last `limit` rounds of `player` strictly before round `before_round`,
/// most recent first. No history yields an empty window.
pub fn stats_window<D: SeasonData + ?Sized>(
    data: &D,
    player: &Player,
    before_round: u32,
    limit: usize,
) -> Result<Vec<RoundStat>> {
    ensure_identity(player)?;
    ensure!(limit > 0, "stats window limit must be > 0");
    let mut rows = data.history(player.id, before_round, limit)?;
    // Scorers must never see the target round or later.
    rows.retain(|r| r.round_number < before_round);
    rows.truncate(limit);
    Ok(rows)
}

pub(crate) fn ensure_identity(player: &Player) -> Result<()> {
    ensure!(player.id != 0, "player has no identity (id 0)");
    Ok(())
}
