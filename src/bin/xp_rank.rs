use anyhow::{Context, Result, anyhow};

use fpl_forecast::cli::{arg_value, parse_arg, path_arg};
use fpl_forecast::logging::init_logging;
use fpl_forecast::store::{SqliteSeason, default_db_path};
use fpl_forecast::{
    Engine, EngineConfig, MemorySeason, Player, Position, SeasonData, SeasonSnapshot,
};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let cfg = EngineConfig::from_env()?;

    if let Some(path) = path_arg(&args, "--snapshot") {
        let season = MemorySeason::from_snapshot(SeasonSnapshot::load(&path)?);
        let pool: Vec<Player> = season.players().iter().filter(|p| p.active).cloned().collect();
        return run(&season, cfg, pool, &args);
    }

    let db_path = path_arg(&args, "--db")
        .or_else(default_db_path)
        .context("unable to resolve sqlite path")?;
    let store = SqliteSeason::open(&db_path)?;
    let pool = store.players(true)?;
    run(&store, cfg, pool, &args)
}

fn run<D: SeasonData>(data: &D, cfg: EngineConfig, mut pool: Vec<Player>, args: &[String]) -> Result<()> {
    let horizon = parse_arg::<u32>(args, "--horizon")?.unwrap_or(cfg.default_horizon);
    let limit = parse_arg::<usize>(args, "--limit")?.unwrap_or(cfg.default_limit);

    if let Some(code) = arg_value(args, "--position") {
        let position =
            Position::from_code(&code).ok_or_else(|| anyhow!("unknown position {code:?}"))?;
        pool.retain(|p| p.position == position);
    }

    let from_round = match parse_arg::<u32>(args, "--round")? {
        Some(n) => Some(
            data.round_by_number(n)?
                .ok_or_else(|| anyhow!("no round with number {n}"))?,
        ),
        None => None,
    };

    let engine = Engine::new(data, cfg);
    let ranked = engine.rank_candidates(&pool, from_round.as_ref(), horizon, Some(limit))?;

    let names: std::collections::HashMap<u32, &Player> = pool.iter().map(|p| (p.id, p)).collect();
    println!(
        "{:>3}  {:<18} {:>4} {:>5}  {:>6} {:>6} {:>6} {:>5} {:>5} {:>5} {:>5} {:>6}",
        "#", "Player", "Pos", "Cost", "EPnext", "EPtot", "EPavg", "Fix", "Value", "Mins", "Cons", "Score"
    );
    for (idx, row) in ranked.iter().enumerate() {
        let (name, pos, cost) = names
            .get(&row.player_id)
            .map(|p| (p.web_name.as_str(), p.position.code(), p.cost))
            .unwrap_or(("?", "?", 0.0));
        println!(
            "{:>3}  {:<18} {:>4} {:>5.1}  {:>6.2} {:>6.2} {:>6.2} {:>5.2} {:>5.2} {:>5.2} {:>5.2} {:>6.2}",
            idx + 1,
            name,
            pos,
            cost,
            row.ep_next,
            row.ep_horizon_total,
            row.ep_horizon_avg,
            row.fixture_run_score,
            row.value_score,
            row.minutes_stability,
            row.consistency,
            row.transfer_score
        );
    }
    if ranked.is_empty() {
        println!("No candidates.");
    }
    Ok(())
}
