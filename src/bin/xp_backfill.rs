use anyhow::{Context, Result};

use fpl_forecast::EngineConfig;
use fpl_forecast::backfill::backfill_round;
use fpl_forecast::cli::{parse_arg, path_arg};
use fpl_forecast::logging::init_logging;
use fpl_forecast::store::{SqliteSeason, default_db_path};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let round_number: u32 =
        parse_arg(&args, "--round")?.context("usage: xp_backfill --round=N [--db=PATH]")?;
    let db_path = path_arg(&args, "--db")
        .or_else(default_db_path)
        .context("unable to resolve sqlite path")?;

    let cfg = EngineConfig::from_env()?;
    let store = SqliteSeason::open(&db_path)?;

    println!("Computing expected points for round {round_number}...");
    let summary = backfill_round(&store, &cfg, round_number)?;
    println!(
        "Updated expected_points on {} rows in round {} ({} skipped).",
        summary.updated, summary.round_number, summary.skipped
    );
    Ok(())
}
