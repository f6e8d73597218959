use anyhow::Result;

use crate::model::Round;
use crate::provider::SeasonData;

/// The round to plan from when the caller does not name one: the current round,
/// else the next round, else the highest-numbered round known.
pub fn resolve_default_round<D: SeasonData + ?Sized>(data: &D) -> Result<Option<Round>> {
    if let Some(round) = data.current_round()? {
        return Ok(Some(round));
    }
    if let Some(round) = data.next_round()? {
        return Ok(Some(round));
    }
    data.latest_round()
}

/// `explicit` if given, otherwise [`resolve_default_round`].
pub fn resolve_from_round<D: SeasonData + ?Sized>(
    data: &D,
    explicit: Option<&Round>,
) -> Result<Option<Round>> {
    match explicit {
        Some(round) => Ok(Some(round.clone())),
        None => resolve_default_round(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemorySeason;

    fn round(number: u32, is_current: bool, is_next: bool) -> Round {
        Round {
            id: 100 + number,
            number,
            is_current,
            is_next,
            is_finished: false,
        }
    }

    #[test]
    fn prefers_current_then_next_then_latest() {
        let mut season = MemorySeason::default();
        season.upsert_round(round(3, false, false));
        season.upsert_round(round(7, false, false));
        season.upsert_round(round(5, false, false));
        assert_eq!(resolve_default_round(&season).unwrap().unwrap().number, 7);

        season.upsert_round(round(4, false, true));
        assert_eq!(resolve_default_round(&season).unwrap().unwrap().number, 4);

        season.upsert_round(round(2, true, false));
        assert_eq!(resolve_default_round(&season).unwrap().unwrap().number, 2);
    }

    #[test]
    fn empty_calendar_resolves_to_none() {
        let season = MemorySeason::default();
        assert!(resolve_default_round(&season).unwrap().is_none());
    }

    #[test]
    fn explicit_round_wins() {
        let mut season = MemorySeason::default();
        season.upsert_round(round(2, true, false));
        let chosen = round(9, false, false);
        let got = resolve_from_round(&season, Some(&chosen)).unwrap().unwrap();
        assert_eq!(got.number, 9);
    }
}
