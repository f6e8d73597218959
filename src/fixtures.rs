use anyhow::Result;
use tracing::trace;

use crate::config::ProjectionParams;
use crate::model::{Player, Round};
use crate::provider::SeasonData;

/// Opponent difficulty (1 easiest, 5 hardest) for `player` in `round`.
///
/// Falls back to the neutral difficulty when the player has no club, no fixture
/// is scheduled, or the fixture carries no rating for the player's side. Double
/// rounds are not modelled: only the first fixture found is used.
pub fn fixture_difficulty<D: SeasonData + ?Sized>(
    data: &D,
    params: &ProjectionParams,
    player: &Player,
    round: &Round,
) -> Result<f64> {
    let Some(club_id) = player.club_id else {
        return Ok(params.neutral_difficulty);
    };
    let Some(fixture) = data.fixture(round.id, club_id)? else {
        trace!(player_id = player.id, round = round.number, "no fixture, neutral difficulty");
        return Ok(params.neutral_difficulty);
    };
    Ok(fixture
        .difficulty_for(club_id)
        .map(|d| d as f64)
        .unwrap_or(params.neutral_difficulty))
}
