use std::path::{Path, PathBuf};
use std::time::Duration;

use house_price_ledger_core::{format_timestamp, now_local_seconds, parse_timestamp, Record};
use rusqlite::{params, Connection, OpenFlags};

use crate::{ConnectFailure, MigrationFailure, ReadFailure, WriteFailure};

pub const PRIMARY_TABLE: &str = "prediksi";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5000);

const PRIMARY_MIGRATION_VERSION: i64 = 1;

const SCHEMA_PREDIKSI_V1: &str = r"
CREATE TABLE IF NOT EXISTS prediksi (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  created_at TEXT NOT NULL,
  bedroom INTEGER NOT NULL CHECK (bedroom >= 0),
  bathroom INTEGER NOT NULL CHECK (bathroom >= 0),
  land_clean INTEGER NOT NULL CHECK (land_clean >= 0),
  building_clean INTEGER NOT NULL CHECK (building_clean >= 0),
  price_pred INTEGER NOT NULL CHECK (price_pred >= 0)
);

CREATE TRIGGER IF NOT EXISTS trg_prediksi_no_update
BEFORE UPDATE ON prediksi
BEGIN
  SELECT RAISE(FAIL, 'prediksi is insert-only');
END;

CREATE TRIGGER IF NOT EXISTS trg_prediksi_no_delete
BEFORE DELETE ON prediksi
BEGIN
  SELECT RAISE(FAIL, 'prediksi is insert-only');
END;

CREATE INDEX IF NOT EXISTS idx_prediksi_created_at
  ON prediksi(created_at DESC, id DESC);
";

/// Opens connections to the relational primary store.
///
/// [`SqlitePrimaryStore`] is the embedded implementation, configured by a
/// database path. A networked engine configured by host, user, password and
/// database name plugs in here with its own config type; the gateway only
/// sees this trait.
pub trait PrimaryStore {
    type Connection: PrimaryConnection;

    /// Makes one connection attempt.
    ///
    /// # Errors
    /// Returns [`ConnectFailure::Unavailable`] for every failure cause.
    fn connect(&self) -> Result<Self::Connection, ConnectFailure>;
}

/// A live primary-store connection, acquired per operation.
pub trait PrimaryConnection {
    /// Inserts one row and commits it before returning.
    ///
    /// # Errors
    /// Returns [`WriteFailure`] when the row is rejected.
    fn insert(&mut self, record: &Record) -> Result<(), WriteFailure>;

    /// Reads up to `limit` rows, most recent first.
    ///
    /// # Errors
    /// Returns [`ReadFailure`] when the query fails or a row cannot be
    /// decoded.
    fn recent(&mut self, limit: usize) -> Result<Vec<Record>, ReadFailure>;

    /// Releases the connection.
    fn close(self)
    where
        Self: Sized,
    {
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryConfig {
    pub database: PathBuf,
    pub connect_timeout: Duration,
}

impl PrimaryConfig {
    #[must_use]
    pub fn new(database: impl Into<PathBuf>) -> Self {
        Self {
            database: database.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }
}

/// `SQLite`-backed primary store. Without a configuration every connect
/// attempt reports the store as unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlitePrimaryStore {
    config: Option<PrimaryConfig>,
}

impl SqlitePrimaryStore {
    #[must_use]
    pub fn new(config: PrimaryConfig) -> Self {
        Self {
            config: Some(config),
        }
    }

    #[must_use]
    pub fn unconfigured() -> Self {
        Self { config: None }
    }

    #[must_use]
    pub fn config(&self) -> Option<&PrimaryConfig> {
        self.config.as_ref()
    }

    /// Creates the database file, the `prediksi` table and its insert-only
    /// triggers. Safe to run repeatedly.
    ///
    /// # Errors
    /// Returns [`MigrationFailure`] when the store is unconfigured or the
    /// schema cannot be applied.
    pub fn migrate(&self) -> Result<(), MigrationFailure> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| MigrationFailure("primary store is not configured".to_string()))?;

        let conn = Connection::open(&config.database).map_err(|err| {
            MigrationFailure(format!(
                "failed to open {}: {err}",
                config.database.display()
            ))
        })?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );",
        )
        .map_err(|err| MigrationFailure(format!("failed to ensure schema_migrations: {err}")))?;

        conn.execute_batch(SCHEMA_PREDIKSI_V1)
            .map_err(|err| MigrationFailure(format!("failed to apply prediksi schema: {err}")))?;

        let now = format_timestamp(now_local_seconds())
            .map_err(|err| MigrationFailure(err.to_string()))?;
        conn.execute(
            "INSERT OR IGNORE INTO schema_migrations(version, applied_at) VALUES (?1, ?2)",
            params![PRIMARY_MIGRATION_VERSION, now],
        )
        .map_err(|err| MigrationFailure(format!("failed to register migration: {err}")))?;

        tracing::info!(database = %config.database.display(), "primary schema ready");
        Ok(())
    }
}

impl PrimaryStore for SqlitePrimaryStore {
    type Connection = SqlitePrimaryConnection;

    fn connect(&self) -> Result<Self::Connection, ConnectFailure> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| ConnectFailure::unavailable("primary store is not configured"))?;

        // No CREATE flag: a missing database is an outage, not a new store.
        let conn = Connection::open_with_flags(
            &config.database,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|err| unavailable(&config.database, &err))?;

        conn.busy_timeout(config.connect_timeout)
            .map_err(|err| unavailable(&config.database, &err))?;

        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|err| unavailable(&config.database, &err))?;

        Ok(SqlitePrimaryConnection {
            conn,
            database: config.database.clone(),
        })
    }
}

fn unavailable(database: &Path, err: &rusqlite::Error) -> ConnectFailure {
    ConnectFailure::unavailable(format!("{}: {err}", database.display()))
}

pub struct SqlitePrimaryConnection {
    conn: Connection,
    database: PathBuf,
}

impl SqlitePrimaryConnection {
    #[cfg(test)]
    fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl PrimaryConnection for SqlitePrimaryConnection {
    fn insert(&mut self, record: &Record) -> Result<(), WriteFailure> {
        let created_at =
            format_timestamp(record.created_at()).map_err(|err| WriteFailure(err.to_string()))?;
        let price = i64::try_from(record.predicted_price()).map_err(|_| {
            WriteFailure(format!(
                "price_pred {} exceeds the column range",
                record.predicted_price()
            ))
        })?;

        self.conn
            .execute(
                "INSERT INTO prediksi(
                    created_at, bedroom, bathroom, land_clean, building_clean, price_pred
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    created_at,
                    i64::from(record.bedroom_count()),
                    i64::from(record.bathroom_count()),
                    i64::from(record.land_area_m2()),
                    i64::from(record.building_area_m2()),
                    price,
                ],
            )
            .map_err(|err| WriteFailure(format!("insert into {PRIMARY_TABLE} failed: {err}")))?;

        Ok(())
    }

    fn recent(&mut self, limit: usize) -> Result<Vec<Record>, ReadFailure> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self
            .conn
            .prepare(
                "SELECT created_at, bedroom, bathroom, land_clean, building_clean, price_pred
                 FROM prediksi
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?1",
            )
            .map_err(|err| ReadFailure(err.to_string()))?;

        let rows = stmt
            .query_map(params![limit], parse_record_row)
            .map_err(|err| ReadFailure(err.to_string()))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|err| ReadFailure(err.to_string()))?);
        }
        Ok(records)
    }

    fn close(self) {
        if let Err((_, err)) = self.conn.close() {
            tracing::warn!(
                database = %self.database.display(),
                error = %err,
                "failed to close primary connection"
            );
        }
    }
}

fn parse_record_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Record> {
    let created_at_raw: String = row.get(0)?;
    let created_at = parse_timestamp(&created_at_raw).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                err.to_string(),
            )),
        )
    })?;

    Ok(Record::restore(
        created_at,
        integer_column(row, 1)?,
        integer_column(row, 2)?,
        integer_column(row, 3)?,
        integer_column(row, 4)?,
        integer_column(row, 5)?,
    ))
}

fn integer_column<T: TryFrom<i64>>(row: &rusqlite::Row<'_>, index: usize) -> rusqlite::Result<T> {
    let raw: i64 = row.get(index)?;
    T::try_from(raw).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            index,
            rusqlite::types::Type::Integer,
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("column value {raw} out of range"),
            )),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn must<T, E: std::fmt::Display>(result: Result<T, E>) -> T {
        match result {
            Ok(value) => value,
            Err(err) => panic!("test failure: {err}"),
        }
    }

    fn record_at(timestamp: &str, price: u64) -> Record {
        Record::restore(must(parse_timestamp(timestamp)), 3, 2, 120, 80, price)
    }

    fn migrated_store(dir: &tempfile::TempDir) -> SqlitePrimaryStore {
        let store = SqlitePrimaryStore::new(PrimaryConfig::new(
            dir.path().join("house_prices.sqlite3"),
        ));
        must(store.migrate());
        store
    }

    #[test]
    fn unconfigured_store_is_unavailable() {
        let result = SqlitePrimaryStore::unconfigured().connect();
        match result {
            Err(failure) => assert_eq!(failure.detail(), "primary store is not configured"),
            Ok(_) => panic!("expected connect failure"),
        }
    }

    #[test]
    fn missing_database_is_unavailable_and_not_created() {
        let dir = must(tempfile::tempdir());
        let path = dir.path().join("house_prices.sqlite3");
        let store = SqlitePrimaryStore::new(PrimaryConfig::new(&path));

        assert!(matches!(
            store.connect(),
            Err(ConnectFailure::Unavailable { .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn non_database_file_is_unavailable() {
        let dir = must(tempfile::tempdir());
        let path = dir.path().join("house_prices.sqlite3");
        must(fs::write(&path, "not a sqlite database\n".repeat(64)));
        let store = SqlitePrimaryStore::new(PrimaryConfig::new(&path));

        assert!(store.connect().is_err());
    }

    #[test]
    fn insert_then_recent_returns_newest_first() {
        let dir = must(tempfile::tempdir());
        let store = migrated_store(&dir);

        let mut conn = must(store.connect());
        must(conn.insert(&record_at("2026-02-07 12:00:01", 1)));
        must(conn.insert(&record_at("2026-02-07 12:00:03", 3)));
        must(conn.insert(&record_at("2026-02-07 12:00:02", 2)));
        conn.close();

        let mut conn = must(store.connect());
        let prices: Vec<u64> = must(conn.recent(2))
            .iter()
            .map(Record::predicted_price)
            .collect();
        conn.close();
        assert_eq!(prices, vec![3, 2]);
    }

    #[test]
    fn insert_without_table_is_write_failure() {
        let dir = must(tempfile::tempdir());
        let path = dir.path().join("house_prices.sqlite3");
        must(must(Connection::open(&path)).execute_batch("CREATE TABLE other (x INTEGER);"));

        let store = SqlitePrimaryStore::new(PrimaryConfig::new(&path));
        let mut conn = must(store.connect());
        let result = conn.insert(&record_at("2026-02-07 12:00:00", 1));

        match result {
            Err(WriteFailure(message)) => assert!(message.contains("no such table")),
            Ok(()) => panic!("expected write failure"),
        }
    }

    #[test]
    fn oversized_price_is_write_failure() {
        let dir = must(tempfile::tempdir());
        let store = migrated_store(&dir);
        let mut conn = must(store.connect());

        assert!(conn.insert(&record_at("2026-02-07 12:00:00", u64::MAX)).is_err());
    }

    #[test]
    fn rows_are_insert_only() {
        let dir = must(tempfile::tempdir());
        let store = migrated_store(&dir);
        let mut conn = must(store.connect());
        must(conn.insert(&record_at("2026-02-07 12:00:00", 1)));

        let update = conn
            .connection()
            .execute("UPDATE prediksi SET price_pred = 2", []);
        let delete = conn.connection().execute("DELETE FROM prediksi", []);
        assert!(update.is_err());
        assert!(delete.is_err());
    }

    #[test]
    fn migrate_is_idempotent() {
        let dir = must(tempfile::tempdir());
        let store = migrated_store(&dir);
        must(store.migrate());

        let conn = must(store.connect());
        let versions: i64 = must(conn.connection().query_row(
            "SELECT count(*) FROM schema_migrations",
            [],
            |row| row.get(0),
        ));
        assert_eq!(versions, 1);
    }

    #[test]
    fn connect_applies_configured_timeout() {
        let dir = must(tempfile::tempdir());
        let store = SqlitePrimaryStore::new(
            PrimaryConfig::new(dir.path().join("house_prices.sqlite3"))
                .with_connect_timeout(Duration::from_millis(250)),
        );
        must(store.migrate());

        let conn = must(store.connect());
        let timeout: i64 = must(
            conn.connection()
                .query_row("PRAGMA busy_timeout", [], |row| row.get(0)),
        );
        assert_eq!(timeout, 250);
    }
}
