use anyhow::{Context, Result};

use fpl_forecast::cli::path_arg;
use fpl_forecast::logging::init_logging;
use fpl_forecast::provider::SeasonSnapshot;
use fpl_forecast::store::{SqliteSeason, default_db_path};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let snapshot_path =
        path_arg(&args, "--snapshot").context("usage: snapshot_ingest --snapshot=FILE [--db=PATH]")?;
    let db_path = path_arg(&args, "--db")
        .or_else(default_db_path)
        .context("unable to resolve sqlite path")?;

    let snapshot = SeasonSnapshot::load(&snapshot_path)?;
    let store = SqliteSeason::open(&db_path)?;
    let summary = store.import_snapshot(&snapshot)?;

    println!("Snapshot ingest complete");
    println!("DB: {}", db_path.display());
    println!("Rounds: {}", summary.rounds);
    println!("Players: {}", summary.players);
    println!("Stats rows: {}", summary.stats);
    println!("Fixtures: {}", summary.fixtures);
    println!("Risk flags: {}", summary.risk_flags);
    Ok(())
}
