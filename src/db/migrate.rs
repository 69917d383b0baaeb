use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};
use tracing::info;

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Reference tables: employees, jobs, cost centres and schedules.
const REFERENCE_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS employees (
        employee_id             INTEGER PRIMARY KEY,
        name                    TEXT NOT NULL DEFAULT '',
        tag                     TEXT NOT NULL DEFAULT '',
        job_id                  INTEGER,
        cost_centre_id          INTEGER,
        reports_to_id           INTEGER,
        use_calendar_work_hours INTEGER NOT NULL DEFAULT 1,
        calendar_region_id      INTEGER
    );
    CREATE UNIQUE INDEX IF NOT EXISTS idx_employees_tag ON employees(tag) WHERE tag <> '';

    CREATE TABLE IF NOT EXISTS jobs (
        job_id  INTEGER PRIMARY KEY,
        job_no  TEXT NOT NULL UNIQUE,
        name    TEXT NOT NULL DEFAULT ''
    );

    CREATE TABLE IF NOT EXISTS cost_centres (
        cost_centre_id  INTEGER PRIMARY KEY,
        code            TEXT NOT NULL,
        name            TEXT NOT NULL DEFAULT ''
    );

    CREATE TABLE IF NOT EXISTS job_cost_centres (
        job_id          INTEGER NOT NULL,
        cost_centre_id  INTEGER NOT NULL,
        PRIMARY KEY (job_id, cost_centre_id)
    );

    CREATE TABLE IF NOT EXISTS employee_work_hours (
        employee_id    INTEGER NOT NULL,
        day_of_week    INTEGER NOT NULL CHECK(day_of_week BETWEEN 0 AND 6),
        start          TEXT NOT NULL,
        finish         TEXT NOT NULL,
        break_minutes  INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (employee_id, day_of_week)
    );

    CREATE TABLE IF NOT EXISTS region_work_hours (
        region_id      INTEGER NOT NULL,
        day_of_week    INTEGER NOT NULL CHECK(day_of_week BETWEEN 0 AND 6),
        start          TEXT NOT NULL,
        finish         TEXT NOT NULL,
        break_minutes  INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (region_id, day_of_week)
    );
"#;

/// Raw attendance signals.
const RECORDS_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS clock_events (
        id              TEXT PRIMARY KEY,
        tag             TEXT NOT NULL,
        date            TEXT NOT NULL,
        kind            TEXT NOT NULL CHECK(kind IN ('in','out')),
        timestamp       TEXT NOT NULL,
        device_id       TEXT NOT NULL DEFAULT '',
        process_status  TEXT NOT NULL DEFAULT 'pending'
                        CHECK(process_status IN ('pending','processed','skipped','error')),
        created_at      TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at      TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
    CREATE INDEX IF NOT EXISTS idx_clock_events_date_tag ON clock_events(date, tag);

    CREATE TABLE IF NOT EXISTS supervisor_records (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        supervisor_id  INTEGER NOT NULL,
        employee_id    INTEGER NOT NULL,
        date           TEXT NOT NULL,
        project        TEXT NOT NULL DEFAULT '',
        wbs            TEXT NOT NULL DEFAULT '',
        clockin        TEXT,
        clockout       TEXT,
        created_at     TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
    CREATE INDEX IF NOT EXISTS idx_supervisor_records_date ON supervisor_records(date);
"#;

/// Engine output.
const TIMESHEETS_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS timesheets (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id     INTEGER NOT NULL,
        date            TEXT NOT NULL,
        hours           REAL NOT NULL DEFAULT 0,
        start_time      TEXT,
        finish_time     TEXT,
        review_status   TEXT NOT NULL DEFAULT '' CHECK(review_status IN ('','required')),
        approved        INTEGER NOT NULL DEFAULT 0,
        project_id      INTEGER,
        cost_centre_id  INTEGER,
        break_minutes   INTEGER,
        updated_at      TEXT NOT NULL,
        UNIQUE (employee_id, date)
    );
    CREATE INDEX IF NOT EXISTS idx_timesheets_date ON timesheets(date);
"#;

/// Ordered list of (version, description, sql).
const MIGRATIONS: &[(&str, &str, &str)] = &[
    (
        "20251001_0001_reference_tables",
        "Created reference tables",
        REFERENCE_SCHEMA,
    ),
    (
        "20251001_0002_record_tables",
        "Created clock event and supervisor record tables",
        RECORDS_SCHEMA,
    ),
    (
        "20251001_0003_timesheets",
        "Created timesheets table",
        TIMESHEETS_SCHEMA,
    ),
];

fn migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn apply_migration(conn: &Connection, version: &str, description: &str, sql: &str) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(sql)?;
    tx.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, description],
    )?;
    tx.commit()?;

    info!(version, "migration applied");
    success(format!("Migration applied: {} → {}", version, description));
    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<usize> {
    ensure_log_table(conn)?;

    let mut applied = 0;
    for (version, description, sql) in MIGRATIONS {
        if migration_applied(conn, version)? {
            continue;
        }
        apply_migration(conn, version, description, sql)?;
        applied += 1;
    }

    Ok(applied)
}
