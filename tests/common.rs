#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{NaiveDate, NaiveDateTime};
use rtimesheet::config::Config;
use rtimesheet::core::report::DateReport;
use rtimesheet::core::{ReconcileOptions, Reconciler};
use rtimesheet::db::initialize::init_db;
use rtimesheet::db::queries::{
    insert_clock_event, insert_cost_centre, insert_employee, insert_job, insert_supervisor_record,
    link_job_cost_centre, upsert_work_hours,
};
use rtimesheet::db::store::SqliteStore;
use rtimesheet::models::clock_event::{ClockEvent, EventKind};
use rtimesheet::models::employee::{CostCentre, Employee, Job};
use rtimesheet::models::supervisor_record::SupervisorRecord;
use rtimesheet::models::work_hours::{ScheduleOwner, WorkHourDefinition, WorkHourRow};
use rusqlite::Connection;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Once;

static INIT: Once = Once::new();

/// Route engine logs to the test output when RUST_LOG is set.
pub fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

pub fn rts() -> Command {
    cargo_bin_cmd!("rtimesheet")
}

/// Monday.
pub const MONDAY: &str = "2025-10-06";
pub const TUESDAY: &str = "2025-10-07";
pub const SATURDAY: &str = "2025-10-11";

pub const ALICE: i64 = 1;
pub const BOB: i64 = 2;
pub const CAROL: i64 = 3;
pub const DAVE: i64 = 4;

pub const JOB_MAIN: i64 = 1;
pub const JOB_SITE: i64 = 2;
pub const CC_A: i64 = 10;
pub const CC_B: i64 = 11;
pub const CC_SITE: i64 = 20;

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rtimesheet.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rtimesheet_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

/// `"2025-10-06"`, `"07:50"` → local timestamp
pub fn at(date: &str, hhmm: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(&format!("{date} {hhmm}"), "%Y-%m-%d %H:%M").expect("valid timestamp")
}

/// Open (and migrate) the database at `db_path`.
pub fn open_db(db_path: &str) -> Connection {
    let conn = Connection::open(db_path).expect("open db");
    init_db(&conn).expect("init db");
    conn
}

fn employee(
    id: i64,
    name: &str,
    tag: &str,
    job: i64,
    cc: i64,
    supervisor: i64,
    region: Option<i64>,
) -> Employee {
    Employee {
        employee_id: id,
        name: name.to_string(),
        tag: tag.to_string(),
        job_id: Some(job),
        cost_centre_id: Some(cc),
        reports_to_id: Some(supervisor),
        use_calendar_work_hours: region.is_some(),
        calendar_region_id: region,
    }
}

fn weekdays(owner: ScheduleOwner, start: &str, finish: &str, break_minutes: i32) -> Vec<WorkHourRow> {
    (1..=5)
        .map(|day| WorkHourRow {
            owner,
            day_of_week: day,
            definition: WorkHourDefinition::new(start, finish, break_minutes),
        })
        .collect()
}

/// Reference data shared by most tests.
///
/// - Alice (tag T001, supervisor 100): personal 08:00-16:00, no break
/// - Bob (tag T002, supervisor 100): personal 08:00-16:30, 30 min break
/// - Carol (tag T003, supervisor 200): region 5 calendar, 07:00-15:00
/// - Dave (tag T004, supervisor 200): personal night shift 22:00-06:00
///
/// All schedules run Monday to Friday.
pub fn seed_reference(conn: &Connection) {
    for (id, no) in [(JOB_MAIN, "J100"), (JOB_SITE, "J200")] {
        insert_job(
            conn,
            &Job {
                job_id: id,
                job_no: no.to_string(),
                name: format!("Job {no}"),
            },
        )
        .expect("insert job");
    }

    for (id, code) in [(CC_A, "CC-A"), (CC_B, "CC-B"), (CC_SITE, "CC-SITE")] {
        insert_cost_centre(
            conn,
            &CostCentre {
                cost_centre_id: id,
                code: code.to_string(),
                name: code.to_string(),
            },
        )
        .expect("insert cost centre");
    }

    link_job_cost_centre(conn, JOB_MAIN, CC_A).expect("link");
    link_job_cost_centre(conn, JOB_MAIN, CC_B).expect("link");
    link_job_cost_centre(conn, JOB_SITE, CC_SITE).expect("link");

    for e in [
        employee(ALICE, "Alice", "T001", JOB_MAIN, CC_A, 100, None),
        employee(BOB, "Bob", "T002", JOB_MAIN, CC_A, 100, None),
        employee(CAROL, "Carol", "T003", JOB_SITE, CC_SITE, 200, Some(5)),
        employee(DAVE, "Dave", "T004", JOB_MAIN, CC_A, 200, None),
    ] {
        insert_employee(conn, &e).expect("insert employee");
    }

    let rows = [
        weekdays(ScheduleOwner::Employee(ALICE), "08:00", "16:00", 0),
        weekdays(ScheduleOwner::Employee(BOB), "08:00", "16:30", 30),
        weekdays(ScheduleOwner::Region(5), "07:00", "15:00", 0),
        weekdays(ScheduleOwner::Employee(DAVE), "22:00", "06:00", 0),
        // Carol has personal hours too; her calendar flag must win
        weekdays(ScheduleOwner::Employee(CAROL), "09:00", "17:00", 0),
    ];
    for row in rows.iter().flatten() {
        upsert_work_hours(conn, row).expect("insert work hours");
    }
}

/// Device event with an ISO-8601 timestamp.
pub fn add_event(conn: &Connection, id: &str, tag: &str, date: &str, timestamp: &str, kind: EventKind) {
    insert_clock_event(conn, &ClockEvent::new(id, tag, d(date), timestamp, kind)).expect("insert event");
}

/// Clock-in/clock-out pair at local `in_hhmm`/`out_hhmm` on `date`.
pub fn add_pair(conn: &Connection, prefix: &str, tag: &str, date: &str, in_hhmm: &str, out_hhmm: &str) {
    add_event(
        conn,
        &format!("{prefix}-in"),
        tag,
        date,
        &format!("{date}T{in_hhmm}:00"),
        EventKind::In,
    );
    add_event(
        conn,
        &format!("{prefix}-out"),
        tag,
        date,
        &format!("{date}T{out_hhmm}:00"),
        EventKind::Out,
    );
}

#[allow(clippy::too_many_arguments)]
pub fn add_supervisor_record(
    conn: &Connection,
    id: i64,
    supervisor: i64,
    employee: i64,
    date: &str,
    project: &str,
    wbs: &str,
    times: Option<(&str, &str)>,
) -> i64 {
    let (clockin, clockout) = match times {
        Some((i, o)) => (Some(at(date, i)), Some(at(date, o))),
        None => (None, None),
    };
    insert_supervisor_record(
        conn,
        &SupervisorRecord {
            id,
            supervisor_id: supervisor,
            employee_id: employee,
            date: d(date),
            project: project.to_string(),
            wbs: wbs.to_string(),
            clockin,
            clockout,
        },
    )
    .expect("insert supervisor record")
}

/// Run the engine over `opts` with the default configuration.
pub fn reconcile(conn: &mut Connection, opts: &ReconcileOptions) -> Vec<DateReport> {
    init_test_logging();
    let mut store = SqliteStore::new(conn);
    Reconciler::new(&Config::default())
        .reconcile(&mut store, opts)
        .expect("reconcile")
}

pub fn reconcile_day(conn: &mut Connection, date: &str) -> DateReport {
    reconcile(conn, &ReconcileOptions::single_day(d(date)))
        .pop()
        .expect("one report")
}

/// Status of a stored clock event.
pub fn event_status(conn: &Connection, id: &str) -> String {
    conn.query_row(
        "SELECT process_status FROM clock_events WHERE id = ?1",
        [id],
        |r| r.get(0),
    )
    .expect("event exists")
}

/// Initialized database with reference data and one full day of records.
pub fn init_db_with_data(db_path: &str) {
    rts()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();

    let conn = open_db(db_path);
    seed_reference(&conn);
    add_pair(&conn, "a1", "T001", MONDAY, "07:50", "16:10");
    add_pair(&conn, "b1", "T002", MONDAY, "07:30", "17:10");
    add_supervisor_record(&conn, 0, 200, CAROL, MONDAY, "", "", Some(("07:00", "15:00")));
}
