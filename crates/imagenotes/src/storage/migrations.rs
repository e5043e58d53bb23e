//! Schema versioning for the slot database.
//!
//! The database version lives in the `metadata` table. It is independent of
//! the note record version, which travels inside each serialized record.

use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::error::{Error, Result};

use super::schema::SCHEMA_STATEMENTS;

/// The current schema version.
pub const CURRENT_VERSION: i32 = 1;

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

type Migration = fn(&Connection) -> Result<()>;

/// Steps taking the database from version `n - 1` to `n`, indexed by `n - 1`.
const MIGRATIONS: &[Migration] = &[base_tables];

/// Version 1 is the base schema from `SCHEMA_STATEMENTS`; nothing to move.
fn base_tables(_conn: &Connection) -> Result<()> {
    Ok(())
}

/// Create the tables and bring the schema up to [`CURRENT_VERSION`].
///
/// # Errors
///
/// Returns [`Error::DatabaseMigration`] if the database was written by a
/// newer build or carries an unreadable version, or a query error.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    let found = schema_version(conn)?;
    if found > CURRENT_VERSION {
        return Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {found} is newer than supported version {CURRENT_VERSION}"
            ),
        });
    }

    for version in (found + 1)..=CURRENT_VERSION {
        let step = usize::try_from(version - 1)
            .ok()
            .and_then(|i| MIGRATIONS.get(i))
            .ok_or_else(|| Error::DatabaseMigration {
                message: format!("no migration to version {version}"),
            })?;
        step(conn)?;
        store_version(conn, version)?;
        debug!("Migrated slot database to version {}", version);
    }

    Ok(())
}

/// The stored schema version, 0 for a fresh database.
fn schema_version(conn: &Connection) -> Result<i32> {
    let stored: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    stored.map_or(Ok(0), |value| {
        value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        })
    })
}

fn store_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> Connection {
        Connection::open_in_memory().unwrap()
    }

    #[test]
    fn test_initialize_creates_slot_tables() {
        let conn = fresh();
        initialize_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(tables, vec!["metadata", "slots"]);
        assert_eq!(schema_version(&conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_initialize_twice() {
        let conn = fresh();
        initialize_schema(&conn).unwrap();
        initialize_schema(&conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_one_migration_per_version() {
        assert_eq!(MIGRATIONS.len(), usize::try_from(CURRENT_VERSION).unwrap());
    }

    #[test]
    fn test_refuses_newer_database() {
        let conn = fresh();
        initialize_schema(&conn).unwrap();
        store_version(&conn, CURRENT_VERSION + 1).unwrap();

        let err = initialize_schema(&conn).unwrap_err();
        assert!(err.to_string().contains("newer than supported"));
    }

    #[test]
    fn test_unreadable_version() {
        let conn = fresh();
        initialize_schema(&conn).unwrap();
        store_version(&conn, 0).unwrap();
        conn.execute("UPDATE metadata SET value = 'two' WHERE key = ?1", [VERSION_KEY])
            .unwrap();

        let err = initialize_schema(&conn).unwrap_err();
        assert!(err.to_string().contains("invalid schema version: two"));
    }
}
