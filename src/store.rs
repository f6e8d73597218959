use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::info;

use crate::config::opt_env;
use crate::model::{Fixture, Player, Position, RiskFlags, Round, RoundStat};
use crate::provider::{SeasonData, SeasonSnapshot};

const CACHE_DIR: &str = "fpl_forecast";
const DB_FILE: &str = "season.sqlite";

const ROUND_COLS: &str = "id, number, is_current, is_next, is_finished";
const STAT_COLS: &str = "player_id, round_number, minutes, total_points, goals_scored, assists, \
                         clean_sheets, goals_conceded, bonus, xg, xa";
const FIXTURE_COLS: &str =
    "id, round_id, home_club_id, away_club_id, home_difficulty, away_difficulty, finished";
const PLAYER_COLS: &str = "id, web_name, position, cost, club_id, active";

#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub rounds: usize,
    pub players: usize,
    pub stats: usize,
    pub fixtures: usize,
    pub risk_flags: usize,
}

/// SQLite-backed season data. Access to the connection is serialised.
pub struct SqliteSeason {
    conn: Mutex<Connection>,
}

/// `$FPL_DB_PATH`, else `$XDG_CACHE_HOME/fpl_forecast/season.sqlite`, else `~/.cache/...`.
pub fn default_db_path() -> Option<PathBuf> {
    if let Some(path) = opt_env("FPL_DB_PATH") {
        return Some(PathBuf::from(path));
    }
    if let Some(base) = opt_env("XDG_CACHE_HOME") {
        return Some(PathBuf::from(base).join(CACHE_DIR).join(DB_FILE));
    }
    let home = opt_env("HOME")?;
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR).join(DB_FILE))
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS rounds (
            id INTEGER PRIMARY KEY,
            number INTEGER NOT NULL UNIQUE,
            is_current INTEGER NOT NULL DEFAULT 0,
            is_next INTEGER NOT NULL DEFAULT 0,
            is_finished INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS players (
            id INTEGER PRIMARY KEY,
            web_name TEXT NOT NULL,
            position TEXT NOT NULL,
            cost REAL NOT NULL,
            club_id INTEGER NULL,
            active INTEGER NOT NULL DEFAULT 1,
            updated_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS round_stats (
            player_id INTEGER NOT NULL,
            round_number INTEGER NOT NULL,
            minutes INTEGER NOT NULL DEFAULT 0,
            total_points INTEGER NOT NULL DEFAULT 0,
            goals_scored INTEGER NOT NULL DEFAULT 0,
            assists INTEGER NOT NULL DEFAULT 0,
            clean_sheets INTEGER NOT NULL DEFAULT 0,
            goals_conceded INTEGER NOT NULL DEFAULT 0,
            bonus INTEGER NOT NULL DEFAULT 0,
            xg REAL NULL,
            xa REAL NULL,
            expected_points REAL NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (player_id, round_number)
        );
        CREATE TABLE IF NOT EXISTS fixtures (
            id INTEGER PRIMARY KEY,
            round_id INTEGER NOT NULL,
            home_club_id INTEGER NOT NULL,
            away_club_id INTEGER NOT NULL,
            home_difficulty INTEGER NULL,
            away_difficulty INTEGER NULL,
            finished INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_fixtures_round ON fixtures(round_id);
        CREATE TABLE IF NOT EXISTS risk_flags (
            player_id INTEGER PRIMARY KEY,
            injury_risk REAL NOT NULL DEFAULT 0,
            rotation_risk REAL NOT NULL DEFAULT 0,
            note TEXT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

impl SqliteSeason {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn =
            Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .context("enable wal")?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("season store connection lock poisoned"))
    }

    pub fn import_snapshot(&self, snapshot: &SeasonSnapshot) -> Result<ImportSummary> {
        snapshot.validate()?;
        let mut conn = self.conn()?;
        let tx = conn.transaction().context("begin snapshot import")?;
        for round in &snapshot.rounds {
            upsert_round(&tx, round)?;
        }
        for player in &snapshot.players {
            upsert_player(&tx, player)?;
        }
        for stat in &snapshot.stats {
            upsert_stat(&tx, stat)?;
        }
        for fixture in &snapshot.fixtures {
            upsert_fixture(&tx, fixture)?;
        }
        for item in &snapshot.risk_flags {
            upsert_risk_flags(&tx, item.player_id, &item.flags)?;
        }
        tx.commit().context("commit snapshot import")?;

        let summary = ImportSummary {
            rounds: snapshot.rounds.len(),
            players: snapshot.players.len(),
            stats: snapshot.stats.len(),
            fixtures: snapshot.fixtures.len(),
            risk_flags: snapshot.risk_flags.len(),
        };
        info!(?summary, "imported season snapshot");
        Ok(summary)
    }

    pub fn upsert_round(&self, round: &Round) -> Result<()> {
        upsert_round(&*self.conn()?, round)
    }

    pub fn upsert_player(&self, player: &Player) -> Result<()> {
        upsert_player(&*self.conn()?, player)
    }

    pub fn upsert_stat(&self, stat: &RoundStat) -> Result<()> {
        upsert_stat(&*self.conn()?, stat)
    }

    pub fn upsert_fixture(&self, fixture: &Fixture) -> Result<()> {
        upsert_fixture(&*self.conn()?, fixture)
    }

    pub fn upsert_risk_flags(&self, player_id: u32, flags: &RiskFlags) -> Result<()> {
        upsert_risk_flags(&*self.conn()?, player_id, flags)
    }

    pub fn player(&self, id: u32) -> Result<Option<Player>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {PLAYER_COLS} FROM players WHERE id = ?1"),
            params![id],
            player_from_row,
        )
        .optional()
        .context("load player")
    }

    pub fn players(&self, active_only: bool) -> Result<Vec<Player>> {
        let conn = self.conn()?;
        let sql = if active_only {
            format!("SELECT {PLAYER_COLS} FROM players WHERE active = 1 ORDER BY id")
        } else {
            format!("SELECT {PLAYER_COLS} FROM players ORDER BY id")
        };
        let mut stmt = conn.prepare(&sql).context("prepare players query")?;
        let rows = stmt
            .query_map([], player_from_row)
            .context("query players")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("read players")?;
        Ok(rows)
    }

    /// Players with a stats row in `round_number`.
    pub fn player_ids_with_stats(&self, round_number: u32) -> Result<Vec<u32>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT player_id FROM round_stats WHERE round_number = ?1 ORDER BY player_id")
            .context("prepare stats players query")?;
        let ids = stmt
            .query_map(params![round_number], |row| row.get::<_, u32>(0))
            .context("query stats players")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("read stats players")?;
        Ok(ids)
    }

    /// Returns `false` when no stats row exists for the pair.
    pub fn set_expected_points(
        &self,
        player_id: u32,
        round_number: u32,
        expected_points: f64,
    ) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE round_stats SET expected_points = ?3, updated_at = ?4
                 WHERE player_id = ?1 AND round_number = ?2",
                params![
                    player_id,
                    round_number,
                    expected_points,
                    Utc::now().to_rfc3339()
                ],
            )
            .context("store expected points")?;
        Ok(changed > 0)
    }

    pub fn expected_points(&self, player_id: u32, round_number: u32) -> Result<Option<f64>> {
        let conn = self.conn()?;
        let value = conn
            .query_row(
                "SELECT expected_points FROM round_stats WHERE player_id = ?1 AND round_number = ?2",
                params![player_id, round_number],
                |row| row.get::<_, Option<f64>>(0),
            )
            .optional()
            .context("load expected points")?;
        Ok(value.flatten())
    }

    fn query_round(&self, filter: &str, args: impl rusqlite::Params) -> Result<Option<Round>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {ROUND_COLS} FROM rounds {filter} LIMIT 1"),
            args,
            round_from_row,
        )
        .optional()
        .context("load round")
    }
}

impl SeasonData for SqliteSeason {
    fn history(&self, player_id: u32, before_round: u32, limit: usize) -> Result<Vec<RoundStat>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {STAT_COLS} FROM round_stats
                 WHERE player_id = ?1 AND round_number < ?2
                 ORDER BY round_number DESC LIMIT ?3"
            ))
            .context("prepare history query")?;
        let rows = stmt
            .query_map(
                params![player_id, before_round, limit as i64],
                stat_from_row,
            )
            .context("query history")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("read history")?;
        Ok(rows)
    }

    fn fixture(&self, round_id: u32, club_id: u32) -> Result<Option<Fixture>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {FIXTURE_COLS} FROM fixtures
                 WHERE round_id = ?1 AND (home_club_id = ?2 OR away_club_id = ?2)
                 ORDER BY id LIMIT 1"
            ),
            params![round_id, club_id],
            fixture_from_row,
        )
        .optional()
        .context("load fixture")
    }

    fn risk_flags(&self, player_id: u32) -> Result<Option<RiskFlags>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT injury_risk, rotation_risk, note FROM risk_flags WHERE player_id = ?1",
            params![player_id],
            |row| {
                Ok(RiskFlags {
                    injury_risk: row.get(0)?,
                    rotation_risk: row.get(1)?,
                    note: row.get(2)?,
                })
            },
        )
        .optional()
        .context("load risk flags")
    }

    fn round_by_number(&self, number: u32) -> Result<Option<Round>> {
        self.query_round("WHERE number = ?1", params![number])
    }

    fn current_round(&self) -> Result<Option<Round>> {
        self.query_round("WHERE is_current = 1 ORDER BY number", [])
    }

    fn next_round(&self) -> Result<Option<Round>> {
        self.query_round("WHERE is_next = 1 ORDER BY number", [])
    }

    fn latest_round(&self) -> Result<Option<Round>> {
        self.query_round("ORDER BY number DESC", [])
    }

    fn upcoming_rounds(&self, from_number: u32, limit: usize) -> Result<Vec<Round>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {ROUND_COLS} FROM rounds
                 WHERE number >= ?1 AND is_finished = 0
                 ORDER BY number LIMIT ?2"
            ))
            .context("prepare upcoming rounds query")?;
        let rows = stmt
            .query_map(params![from_number, limit as i64], round_from_row)
            .context("query upcoming rounds")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("read upcoming rounds")?;
        Ok(rows)
    }
}

// Rounds are keyed by number. Any stored round sharing the number or the id is
// replaced, matching `MemorySeason::upsert_round`.
fn upsert_round(conn: &Connection, r: &Round) -> Result<()> {
    conn.execute(
        "DELETE FROM rounds WHERE (number = ?1 AND id != ?2) OR (id = ?2 AND number != ?1)",
        params![r.number, r.id],
    )
    .with_context(|| format!("clear stale round {}", r.number))?;
    conn.execute(
        "INSERT INTO rounds (id, number, is_current, is_next, is_finished, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(number) DO UPDATE SET
            is_current = excluded.is_current,
            is_next = excluded.is_next,
            is_finished = excluded.is_finished,
            updated_at = excluded.updated_at",
        params![
            r.id,
            r.number,
            r.is_current,
            r.is_next,
            r.is_finished,
            Utc::now().to_rfc3339()
        ],
    )
    .with_context(|| format!("upsert round {}", r.number))?;
    Ok(())
}

fn upsert_player(conn: &Connection, p: &Player) -> Result<()> {
    conn.execute(
        "INSERT INTO players (id, web_name, position, cost, club_id, active, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
            web_name = excluded.web_name,
            position = excluded.position,
            cost = excluded.cost,
            club_id = excluded.club_id,
            active = excluded.active,
            updated_at = excluded.updated_at",
        params![
            p.id,
            p.web_name,
            p.position.code(),
            p.cost,
            p.club_id,
            p.active,
            Utc::now().to_rfc3339()
        ],
    )
    .with_context(|| format!("upsert player {}", p.id))?;
    Ok(())
}

// Keeps any expected_points already written for the row.
fn upsert_stat(conn: &Connection, s: &RoundStat) -> Result<()> {
    conn.execute(
        "INSERT INTO round_stats (player_id, round_number, minutes, total_points, goals_scored,
            assists, clean_sheets, goals_conceded, bonus, xg, xa, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
         ON CONFLICT(player_id, round_number) DO UPDATE SET
            minutes = excluded.minutes,
            total_points = excluded.total_points,
            goals_scored = excluded.goals_scored,
            assists = excluded.assists,
            clean_sheets = excluded.clean_sheets,
            goals_conceded = excluded.goals_conceded,
            bonus = excluded.bonus,
            xg = excluded.xg,
            xa = excluded.xa,
            updated_at = excluded.updated_at",
        params![
            s.player_id,
            s.round_number,
            s.minutes,
            s.total_points,
            s.goals_scored,
            s.assists,
            s.clean_sheets,
            s.goals_conceded,
            s.bonus,
            s.xg,
            s.xa,
            Utc::now().to_rfc3339()
        ],
    )
    .with_context(|| format!("upsert stats for player {} round {}", s.player_id, s.round_number))?;
    Ok(())
}

fn upsert_fixture(conn: &Connection, f: &Fixture) -> Result<()> {
    conn.execute(
        "INSERT INTO fixtures (id, round_id, home_club_id, away_club_id, home_difficulty,
            away_difficulty, finished, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
            round_id = excluded.round_id,
            home_club_id = excluded.home_club_id,
            away_club_id = excluded.away_club_id,
            home_difficulty = excluded.home_difficulty,
            away_difficulty = excluded.away_difficulty,
            finished = excluded.finished,
            updated_at = excluded.updated_at",
        params![
            f.id,
            f.round_id,
            f.home_club_id,
            f.away_club_id,
            f.home_difficulty,
            f.away_difficulty,
            f.finished,
            Utc::now().to_rfc3339()
        ],
    )
    .with_context(|| format!("upsert fixture {}", f.id))?;
    Ok(())
}

fn upsert_risk_flags(conn: &Connection, player_id: u32, flags: &RiskFlags) -> Result<()> {
    conn.execute(
        "INSERT INTO risk_flags (player_id, injury_risk, rotation_risk, note, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(player_id) DO UPDATE SET
            injury_risk = excluded.injury_risk,
            rotation_risk = excluded.rotation_risk,
            note = excluded.note,
            updated_at = excluded.updated_at",
        params![
            player_id,
            flags.injury_risk,
            flags.rotation_risk,
            flags.note,
            Utc::now().to_rfc3339()
        ],
    )
    .with_context(|| format!("upsert risk flags for player {player_id}"))?;
    Ok(())
}

fn round_from_row(row: &Row<'_>) -> rusqlite::Result<Round> {
    Ok(Round {
        id: row.get(0)?,
        number: row.get(1)?,
        is_current: row.get(2)?,
        is_next: row.get(3)?,
        is_finished: row.get(4)?,
    })
}

fn stat_from_row(row: &Row<'_>) -> rusqlite::Result<RoundStat> {
    Ok(RoundStat {
        player_id: row.get(0)?,
        round_number: row.get(1)?,
        minutes: row.get(2)?,
        total_points: row.get(3)?,
        goals_scored: row.get(4)?,
        assists: row.get(5)?,
        clean_sheets: row.get(6)?,
        goals_conceded: row.get(7)?,
        bonus: row.get(8)?,
        xg: row.get(9)?,
        xa: row.get(10)?,
    })
}

fn fixture_from_row(row: &Row<'_>) -> rusqlite::Result<Fixture> {
    Ok(Fixture {
        id: row.get(0)?,
        round_id: row.get(1)?,
        home_club_id: row.get(2)?,
        away_club_id: row.get(3)?,
        home_difficulty: row.get(4)?,
        away_difficulty: row.get(5)?,
        finished: row.get(6)?,
    })
}

fn player_from_row(row: &Row<'_>) -> rusqlite::Result<Player> {
    let code: String = row.get(2)?;
    let position = Position::from_code(&code).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            format!("unknown position code {code:?}").into(),
        )
    })?;
    Ok(Player {
        id: row.get(0)?,
        web_name: row.get(1)?,
        position,
        cost: row.get(3)?,
        club_id: row.get(4)?,
        active: row.get(5)?,
    })
}
