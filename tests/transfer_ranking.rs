mod common;

use common::*;
use fpl_forecast::{Engine, EngineConfig, MemorySeason, rank_candidates, score_transfer};

fn base_season() -> MemorySeason {
    let mut season = season_with_rounds(10, 5);
    add_flat_history(&mut season, 1, 4, 90, 6);
    season
}

#[test]
fn composite_blends_all_components() {
    let season = base_season();
    let cfg = EngineConfig::default();
    let s = score_transfer(&season, &cfg, &player(1), None, 3).unwrap();

    assert_eq!(s.from_round, 5);
    assert_eq!(s.horizon, 3);
    assert_eq!(s.ep_next, 3.6);
    assert_eq!(s.ep_horizon_total, 10.8);
    assert_eq!(s.ep_horizon_avg, 3.6);
    assert_eq!(s.fixture_run_score, 3.0);
    assert_eq!(s.value_score, 1.8);
    assert_eq!(s.minutes_stability, 1.0);
    assert_eq!(s.consistency, 1.0);
    assert_eq!(s.upside, 0.4);
    // 3.6*0.40 + 3.0*0.15 + 1.8*0.15 + 0.10 + 0.10 + 0.4*0.10
    assert_eq!(s.transfer_score, 2.4);
}

#[test]
fn reliability_metrics_look_back_before_start_round() {
    let mut season = season_with_rounds(10, 7);
    for (n, mins, pts) in [(1, 90, 2), (2, 90, 15), (3, 30, 1), (4, 90, 5), (5, 45, 2), (6, 90, 8)] {
        season.upsert_stat(stat(1, n, mins, pts));
    }
    // Rows at or after the start round are ignored.
    season.upsert_stat(stat(1, 7, 90, 20));
    let cfg = EngineConfig::default();
    let s = score_transfer(&season, &cfg, &player(1), Some(&round(7)), 2).unwrap();

    // Last 4 before round 7: rounds 6,5,4,3 -> 60+ in rounds 6 and 4.
    assert_eq!(s.minutes_stability, 0.5);
    // Last 6: returns in rounds 2, 4, 6.
    assert_eq!(s.consistency, 0.5);
    // Best haul 15 -> full ceiling.
    assert_eq!(s.upside, 1.0);
}

#[test]
fn zero_cost_has_no_value_score() {
    let season = base_season();
    let cfg = EngineConfig::default();
    let mut free = player(1);
    free.cost = 0.0;
    let s = score_transfer(&season, &cfg, &free, None, 3).unwrap();
    assert_eq!(s.value_score, 0.0);
}

#[test]
fn default_round_falls_back_to_next_then_latest() {
    let cfg = EngineConfig::default();

    let mut season = MemorySeason::default();
    for n in 1..=8 {
        let mut r = round(n);
        r.is_finished = n < 6;
        r.is_next = n == 6;
        season.upsert_round(r);
    }
    add_flat_history(&mut season, 1, 5, 90, 6);
    let s = score_transfer(&season, &cfg, &player(1), None, 3).unwrap();
    assert_eq!(s.from_round, 6);

    let mut no_flags = MemorySeason::default();
    for n in 1..=8 {
        no_flags.upsert_round(round(n));
    }
    let s = score_transfer(&no_flags, &cfg, &player(1), None, 3).unwrap();
    assert_eq!(s.from_round, 8);
}

#[test]
fn unresolvable_or_exhausted_calendar_gives_empty_scores() {
    let cfg = EngineConfig::default();

    let empty = MemorySeason::default();
    let s = score_transfer(&empty, &cfg, &player(1), None, 3).unwrap();
    assert_eq!(s.from_round, 0);
    assert_eq!(s.transfer_score, 0.0);
    assert_eq!(s.fixture_run_score, 0.0);

    let mut done = season_with_rounds(38, 39);
    add_flat_history(&mut done, 1, 38, 90, 6);
    let s = score_transfer(&done, &cfg, &player(1), None, 3).unwrap();
    assert_eq!(s.from_round, 38);
    assert_eq!(s.horizon, 3);
    assert_eq!(s.transfer_score, 0.0);
    assert_eq!(s.minutes_stability, 0.0);
}

#[test]
fn equal_scores_keep_input_order() {
    let mut season = base_season();
    add_flat_history(&mut season, 2, 4, 90, 6);
    add_flat_history(&mut season, 3, 4, 90, 10);
    let cfg = EngineConfig::default();

    let pool = vec![player(1), player(3), player(2)];
    let ranked = rank_candidates(&season, &cfg, &pool, None, 3, None).unwrap();
    let ids: Vec<u32> = ranked.iter().map(|s| s.player_id).collect();
    assert_eq!(ids, vec![3, 1, 2]);
    assert_eq!(ranked[1].transfer_score, ranked[2].transfer_score);

    let pool = vec![player(2), player(1)];
    let ranked = rank_candidates(&season, &cfg, &pool, None, 3, None).unwrap();
    let ids: Vec<u32> = ranked.iter().map(|s| s.player_id).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[test]
fn ranking_is_sorted_and_limited() {
    let mut season = season_with_rounds(10, 5);
    let mut pool = Vec::new();
    for id in 1..=12u32 {
        for n in 1..=4 {
            let mins = if (id + n) % 3 == 0 { 45 } else { 90 };
            season.upsert_stat(stat(id, n, mins, ((id * 7 + n * 3) % 13) as i32));
        }
        let mut p = player(id);
        p.cost = 4.0 + id as f64 * 0.5;
        pool.push(p);
    }
    season.add_fixture(fixture(1, 5, Some(2), Some(4)));
    let cfg = EngineConfig::default();

    let all = rank_candidates(&season, &cfg, &pool, None, 3, None).unwrap();
    assert_eq!(all.len(), 12);
    assert!(all.windows(2).all(|w| w[0].transfer_score >= w[1].transfer_score));

    let top = rank_candidates(&season, &cfg, &pool, None, 3, Some(5)).unwrap();
    assert_eq!(top.len(), 5);
    assert_eq!(top, all[..5].to_vec());
}

#[test]
fn ranking_is_deterministic_across_runs() {
    let mut season = base_season();
    for id in 2..=40u32 {
        add_flat_history(&mut season, id, 4, 60 + id % 31, (id % 9) as i32);
    }
    let pool: Vec<_> = (1..=40).map(player).collect();
    let cfg = EngineConfig::default();
    let a = rank_candidates(&season, &cfg, &pool, None, 3, None).unwrap();
    let b = rank_candidates(&season, &cfg, &pool, None, 3, None).unwrap();
    assert_eq!(a, b);
}

#[test]
fn empty_pool_ranks_to_empty() {
    let season = base_season();
    let cfg = EngineConfig::default();
    assert!(rank_candidates(&season, &cfg, &[], None, 3, Some(10)).unwrap().is_empty());
}

#[test]
fn invalid_preconditions_fail_fast() {
    let season = base_season();
    let cfg = EngineConfig::default();
    assert!(score_transfer(&season, &cfg, &player(1), None, 0).is_err());
    assert!(score_transfer(&season, &cfg, &player(0), None, 3).is_err());
    let pool = vec![player(1), player(0)];
    assert!(rank_candidates(&season, &cfg, &pool, None, 3, None).is_err());
}

#[test]
fn invalid_config_fails_before_scoring() {
    let season = base_season();
    let mut cfg = EngineConfig::default();
    cfg.transfer.upside_ceiling = 0.0;
    assert!(score_transfer(&season, &cfg, &player(1), None, 3).is_err());
    assert!(rank_candidates(&season, &cfg, &[], None, 3, None).is_err());
}

#[test]
fn zero_scores_keep_input_order() {
    let season = MemorySeason::default();
    let cfg = EngineConfig::default();
    let pool = vec![player(4), player(2), player(9)];
    let ranked = rank_candidates(&season, &cfg, &pool, None, 3, None).unwrap();
    let ids: Vec<u32> = ranked.iter().map(|s| s.player_id).collect();
    assert_eq!(ids, vec![4, 2, 9]);
}

#[test]
fn engine_facade_matches_free_functions() {
    let season = base_season();
    let engine = Engine::new(&season, EngineConfig::default());
    let direct = score_transfer(&season, engine.config(), &player(1), None, 3).unwrap();
    assert_eq!(engine.score_transfer(&player(1), None, 3).unwrap(), direct);
    assert_eq!(engine.project_this_round(&player(1)).unwrap(), 3.6);
    let agg = engine.aggregate_horizon(&player(1), &round(5), 2).unwrap();
    assert_eq!(agg.rounds_found(), 2);
}
