//! SQLite storage for offerings and availability zones.

use std::path::Path;

use indoc::indoc;
use itertools::Itertools;
use rusqlite::{params_from_iter, Connection, ErrorCode, OpenFlags, Transaction};

use crate::{
    import::ImportError,
    record::{Batch, Offering, Table, TableRecord, Zone},
    reporter::Reporter,
};

/// Database file used when none is given on the command line.
pub const DEFAULT_DATABASE_PATH: &str = "instance_type_offerings.db";

const SCHEMA: &str = indoc! {"
    CREATE TABLE IF NOT EXISTS az (
        ZoneId TEXT NOT NULL PRIMARY KEY,
        ZoneName TEXT NOT NULL,
        RegionName TEXT NOT NULL,
        ZoneType TEXT NOT NULL,
        State TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS instance_type_offerings (
        InstanceType TEXT NOT NULL,
        LocationType TEXT NOT NULL,
        Location TEXT NOT NULL,
        PRIMARY KEY (Location, InstanceType)
    );
"};

/// Opens `path` for reading and writing, creating the file if needed.
pub fn open(path: &Path) -> rusqlite::Result<Connection> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
    )
}

/// Opens an existing database for reading and writing.
///
/// Unlike [`open`], a missing file is an error instead of a new empty
/// database.
pub fn open_existing(path: &Path) -> rusqlite::Result<Connection> {
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)
}

/// Closes `conn`, surfacing errors that dropping it would swallow.
pub fn close(conn: Connection) -> rusqlite::Result<()> {
    conn.close().map_err(|(_, e)| e)
}

/// Creates the `az` and `instance_type_offerings` tables if they are missing.
///
/// Existing tables and their rows are left untouched, so this can run any
/// number of times.
pub fn init_schema(path: &Path, reporter: &dyn Reporter) -> rusqlite::Result<()> {
    let mut conn = open(path)?;
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA)?;
    tx.commit()?;
    close(conn)?;
    reporter.info(&format!("Initialized database: {}", path.display()));
    Ok(())
}

/// Inserts every record of `batch` in one transaction.
///
/// Either all rows are committed or none: a duplicate primary key, whether
/// already stored or repeated inside the batch, rolls the transaction back
/// and returns [`ImportError::Conflict`].
pub fn insert_batch(conn: &mut Connection, batch: &Batch) -> Result<usize, ImportError> {
    let tx = conn.transaction()?;
    let inserted = match batch {
        Batch::Offerings(rows) => insert_rows(&tx, rows)?,
        Batch::Zones(rows) => insert_rows(&tx, rows)?,
    };
    tx.commit()?;
    Ok(inserted)
}

fn insert_rows<T: TableRecord>(tx: &Transaction<'_>, rows: &[T]) -> Result<usize, ImportError> {
    let mut stmt = tx.prepare(&insert_statement::<T>())?;
    for row in rows {
        match stmt.execute(params_from_iter(row.values())) {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                return Err(ImportError::Conflict {
                    table: T::TABLE,
                    key: row.key(),
                });
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(rows.len())
}

fn insert_statement<T: TableRecord>() -> String {
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        T::TABLE,
        T::COLUMNS.iter().join(", "),
        (1..=T::COLUMNS.len()).map(|i| format!("?{i}")).join(", ")
    )
}

/// Number of rows currently stored in `table`.
pub fn count_rows(conn: &Connection, table: Table) -> rusqlite::Result<usize> {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get::<_, i64>(0)
    })
    .map(|n| n as usize)
}

fn select_all<T: TableRecord>(conn: &Connection, order_by: &str) -> rusqlite::Result<Vec<T>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM {} ORDER BY {order_by}",
        T::COLUMNS.iter().join(", "),
        T::TABLE
    ))?;
    let rows = stmt.query_map([], |row| {
        let values = (0..T::COLUMNS.len())
            .map(|i| row.get::<_, String>(i))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(T::from_values(values))
    })?;
    let records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    // `from_values` only fails on short input and every column is selected.
    Ok(records.into_iter().flatten().collect())
}

/// All stored offerings, ordered by primary key.
pub fn offerings(conn: &Connection) -> rusqlite::Result<Vec<Offering>> {
    select_all(conn, "Location, InstanceType")
}

/// All stored zones, ordered by `ZoneId`.
pub fn zones(conn: &Connection) -> rusqlite::Result<Vec<Zone>> {
    select_all(conn, "ZoneId")
}
