#![allow(dead_code)]

use fpl_forecast::{Fixture, MemorySeason, Player, Position, RiskFlags, Round, RoundStat};

pub const HOME_CLUB: u32 = 1;
pub const AWAY_CLUB: u32 = 2;

pub fn player(id: u32) -> Player {
    Player {
        id,
        web_name: format!("Player {id}"),
        position: Position::Midfielder,
        cost: 6.0,
        club_id: Some(HOME_CLUB),
        active: true,
    }
}

pub fn round(number: u32) -> Round {
    Round {
        id: 100 + number,
        number,
        is_current: false,
        is_next: false,
        is_finished: false,
    }
}

pub fn stat(player_id: u32, round_number: u32, minutes: u32, points: i32) -> RoundStat {
    RoundStat {
        player_id,
        round_number,
        minutes,
        total_points: points,
        goals_scored: 0,
        assists: 0,
        clean_sheets: 0,
        goals_conceded: 0,
        bonus: 0,
        xg: None,
        xa: None,
    }
}

pub fn fixture(id: u32, round_number: u32, home_difficulty: Option<u8>, away_difficulty: Option<u8>) -> Fixture {
    Fixture {
        id,
        round_id: 100 + round_number,
        home_club_id: HOME_CLUB,
        away_club_id: AWAY_CLUB,
        home_difficulty,
        away_difficulty,
        finished: false,
    }
}

pub fn flags(injury_risk: f64, rotation_risk: f64) -> RiskFlags {
    RiskFlags {
        injury_risk,
        rotation_risk,
        note: None,
    }
}

/// Rounds 1..=`rounds`, with 1..`first_open` finished and `first_open` current.
pub fn season_with_rounds(rounds: u32, first_open: u32) -> MemorySeason {
    let mut season = MemorySeason::default();
    for n in 1..=rounds {
        let mut r = round(n);
        r.is_finished = n < first_open;
        r.is_current = n == first_open;
        season.upsert_round(r);
    }
    season
}

/// Flat history: `minutes` and `points` in every round from 1 to `upto`.
pub fn add_flat_history(season: &mut MemorySeason, player_id: u32, upto: u32, minutes: u32, points: i32) {
    for n in 1..=upto {
        season.upsert_stat(stat(player_id, n, minutes, points));
    }
}
