//! Versioned schema migrations, applied once per database file.

use ::duckdb::Connection;

struct Migration {
    version: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "0001_calculations",
        sql: r#"
CREATE SEQUENCE IF NOT EXISTS calculations_seq START 1;

CREATE TABLE IF NOT EXISTS calculations (
    id TEXT PRIMARY KEY,
    seq BIGINT NOT NULL DEFAULT nextval('calculations_seq'),
    expression TEXT NOT NULL,
    result TEXT NOT NULL,
    created_at TEXT NOT NULL,
    created_at_micros BIGINT NOT NULL
);
"#,
    },
    Migration {
        version: "0002_rate_snapshots",
        sql: r#"
CREATE TABLE IF NOT EXISTS rate_snapshots (
    base TEXT PRIMARY KEY,
    fetched_at TEXT NOT NULL,
    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS rate_entries (
    base TEXT NOT NULL,
    currency TEXT NOT NULL,
    factor DOUBLE NOT NULL,
    PRIMARY KEY(base, currency)
);
"#,
    },
];

/// Creates the bookkeeping table and applies every migration not yet recorded.
pub fn apply_migrations(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#,
    )?;

    for migration in MIGRATIONS {
        let applied_count: i64 = connection.query_row(
            "SELECT COUNT(*) FROM schema_migrations WHERE version = ?",
            [migration.version],
            |row| row.get(0),
        )?;

        if applied_count == 0 {
            connection.execute_batch(migration.sql)?;
            connection.execute(
                "INSERT INTO schema_migrations (version) VALUES (?)",
                [migration.version],
            )?;
        }
    }

    Ok(())
}
