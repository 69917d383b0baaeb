mod common;
use common::*;
use rtimesheet::config::Config;
use rtimesheet::core::report::{IssueKind, Note};
use rtimesheet::core::{ReconcileOptions, Reconciler, RecordFilter};
use rtimesheet::db::queries::{load_timesheet, set_approved};
use rtimesheet::db::store::SqliteStore;
use rtimesheet::errors::AppError;
use rtimesheet::models::clock_event::EventKind;
use rtimesheet::models::review_status::ReviewStatus;
use rtimesheet::models::timesheet::ResolvedTimesheet;
use rusqlite::Connection;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

fn seeded(name: &str) -> Connection {
    let db_path = setup_test_db(name);
    let conn = open_db(&db_path);
    seed_reference(&conn);
    conn
}

fn stored(conn: &Connection, employee: i64, date: &str) -> ResolvedTimesheet {
    load_timesheet(conn, employee, &d(date))
        .expect("query timesheet")
        .expect("timesheet exists")
}

fn assert_hours(ts: &ResolvedTimesheet, expected: f64) {
    assert!(
        (ts.hours - expected).abs() < 0.001,
        "expected {expected} hours, got {}",
        ts.hours
    );
}

#[test]
fn test_device_pair_snaps_to_schedule() {
    let mut conn = seeded("snaps_to_schedule");
    add_pair(&conn, "a1", "T001", MONDAY, "07:50", "16:10");

    let report = reconcile_day(&mut conn, MONDAY);
    assert!(report.is_success());
    assert_eq!(report.created, 1);
    assert_eq!(report.updated, 0);
    assert_eq!(report.statuses.processed, vec!["a1-in", "a1-out"]);
    assert_eq!(report.review_required, 0);

    let ts = stored(&conn, ALICE, MONDAY);
    assert_eq!(ts.start_time, Some(at(MONDAY, "08:00")));
    assert_eq!(ts.finish_time, Some(at(MONDAY, "16:00")));
    assert_hours(&ts, 8.0);
    assert_eq!(ts.review_status, ReviewStatus::Clear);
    assert!(!ts.approved);
    assert_eq!(ts.project_id, Some(JOB_MAIN));
    assert_eq!(ts.cost_centre_id, Some(CC_A));

    assert_eq!(event_status(&conn, "a1-in"), "processed");
    assert_eq!(event_status(&conn, "a1-out"), "processed");
}

#[test]
fn test_device_pair_outside_tolerance_is_flagged() {
    let mut conn = seeded("outside_tolerance");
    add_pair(&conn, "a1", "T001", MONDAY, "07:30", "17:10");

    let report = reconcile_day(&mut conn, MONDAY);
    assert_eq!(report.review_required, 1);

    let ts = stored(&conn, ALICE, MONDAY);
    assert_eq!(ts.start_time, Some(at(MONDAY, "07:30")));
    assert_eq!(ts.finish_time, Some(at(MONDAY, "17:10")));
    assert_hours(&ts, 9.667);
    assert_eq!(ts.review_status, ReviewStatus::Required);
}

#[test]
fn test_scheduled_break_is_deducted_once() {
    let mut conn = seeded("break_deducted");
    add_pair(&conn, "b1", "T002", MONDAY, "07:55", "16:35");

    reconcile_day(&mut conn, MONDAY);
    let ts = stored(&conn, BOB, MONDAY);
    assert_hours(&ts, 8.0);
    assert_eq!(ts.break_minutes, Some(30));
    // 8.0 worked + 0.5 break matches the 8.5 h schedule
    assert_eq!(ts.review_status, ReviewStatus::Clear);

    // A rerun starts again from the raw records: still a single deduction.
    reconcile_day(&mut conn, MONDAY);
    assert_hours(&stored(&conn, BOB, MONDAY), 8.0);
}

#[test]
fn test_supervisor_record_wins_over_device_pair() {
    let mut conn = seeded("supervisor_wins");
    add_pair(&conn, "a1", "T001", MONDAY, "07:30", "17:10");
    add_supervisor_record(&conn, 0, 100, ALICE, MONDAY, "", "", None);

    let report = reconcile_day(&mut conn, MONDAY);
    assert_eq!(report.statuses.skipped, vec!["a1-in", "a1-out"]);
    assert!(report.statuses.processed.is_empty());
    assert_eq!(report.created, 1);

    let ts = stored(&conn, ALICE, MONDAY);
    // no times on the record: the scheduled day is assumed
    assert_eq!(ts.start_time, Some(at(MONDAY, "08:00")));
    assert_eq!(ts.finish_time, Some(at(MONDAY, "16:00")));
    assert_hours(&ts, 8.0);
    assert_eq!(ts.project_id, Some(JOB_MAIN));
    assert_eq!(ts.cost_centre_id, Some(CC_A));
    assert_eq!(ts.review_status, ReviewStatus::Clear);

    assert_eq!(event_status(&conn, "a1-in"), "skipped");
    assert_eq!(event_status(&conn, "a1-out"), "skipped");
}

#[test]
fn test_supervisor_assignment_to_other_job_requires_review() {
    let mut conn = seeded("supervisor_other_job");
    add_supervisor_record(
        &conn,
        0,
        100,
        ALICE,
        MONDAY,
        "J200",
        "CC-SITE",
        Some(("08:00", "16:00")),
    );

    reconcile_day(&mut conn, MONDAY);
    let ts = stored(&conn, ALICE, MONDAY);
    assert_eq!(ts.project_id, Some(JOB_SITE));
    assert_eq!(ts.cost_centre_id, Some(CC_SITE));
    assert_eq!(ts.review_status, ReviewStatus::Required);
}

#[test]
fn test_wbs_outside_job_is_not_assigned() {
    let mut conn = seeded("wbs_outside_job");
    add_supervisor_record(
        &conn,
        0,
        100,
        ALICE,
        MONDAY,
        "J100",
        "CC-SITE",
        Some(("08:00", "16:00")),
    );

    reconcile_day(&mut conn, MONDAY);
    let ts = stored(&conn, ALICE, MONDAY);
    assert_eq!(ts.project_id, Some(JOB_MAIN));
    assert_eq!(ts.cost_centre_id, None);
    assert_eq!(ts.review_status, ReviewStatus::Required);
}

#[test]
fn test_wbs_within_job_is_assigned() {
    let mut conn = seeded("wbs_within_job");
    add_supervisor_record(
        &conn,
        0,
        100,
        ALICE,
        MONDAY,
        "J100",
        "CC-B",
        Some(("08:00", "16:00")),
    );

    reconcile_day(&mut conn, MONDAY);
    let ts = stored(&conn, ALICE, MONDAY);
    assert_eq!(ts.cost_centre_id, Some(CC_B));
    // differs from the employee default
    assert_eq!(ts.review_status, ReviewStatus::Required);
}

#[test]
fn test_latest_supervisor_record_wins() {
    let mut conn = seeded("latest_supervisor_record");
    add_supervisor_record(&conn, 2, 100, ALICE, MONDAY, "", "", Some(("08:00", "16:00")));
    add_supervisor_record(&conn, 1, 100, ALICE, MONDAY, "", "", Some(("08:00", "12:00")));

    reconcile_day(&mut conn, MONDAY);
    let ts = stored(&conn, ALICE, MONDAY);
    assert_eq!(ts.finish_time, Some(at(MONDAY, "16:00")));
    assert_hours(&ts, 8.0);
}

#[test]
fn test_later_record_without_times_keeps_earlier_times() {
    let mut conn = seeded("record_without_times_merges");
    add_supervisor_record(&conn, 1, 100, ALICE, MONDAY, "", "", Some(("09:00", "13:00")));
    add_supervisor_record(&conn, 2, 100, ALICE, MONDAY, "J200", "", None);

    reconcile_day(&mut conn, MONDAY);
    let ts = stored(&conn, ALICE, MONDAY);
    assert_eq!(ts.start_time, Some(at(MONDAY, "09:00")));
    assert_eq!(ts.finish_time, Some(at(MONDAY, "13:00")));
    assert_eq!(ts.project_id, Some(JOB_SITE));
    // wbs empty on a merge: the first record's cost centre stays
    assert_eq!(ts.cost_centre_id, Some(CC_A));
}

#[test]
fn test_single_clock_in_is_an_error() {
    let mut conn = seeded("single_clock_in");
    add_event(&conn, "a1-in", "T001", MONDAY, "2025-10-06T07:58:00", EventKind::In);

    let report = reconcile_day(&mut conn, MONDAY);
    assert!(report.is_success());
    assert_eq!(report.created, 0);
    assert_eq!(report.statuses.errors, vec!["a1-in"]);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].kind, IssueKind::IncompleteClockPair);
    assert_eq!(report.issues[0].tag, "T001");

    assert!(load_timesheet(&conn, ALICE, &d(MONDAY)).unwrap().is_none());
    assert_eq!(event_status(&conn, "a1-in"), "error");
}

#[test]
fn test_unparseable_timestamp_leaves_incomplete_pair() {
    let mut conn = seeded("unparseable_timestamp");
    add_event(&conn, "a1-in", "T001", MONDAY, "2025-10-06T07:58:00", EventKind::In);
    add_event(&conn, "a1-out", "T001", MONDAY, "not a timestamp", EventKind::Out);

    let report = reconcile_day(&mut conn, MONDAY);
    assert_eq!(report.statuses.errors.len(), 2);
    assert_eq!(report.created, 0);
}

#[test]
fn test_unknown_tag_is_an_error() {
    let mut conn = seeded("unknown_tag");
    add_pair(&conn, "x1", "T999", MONDAY, "08:00", "16:00");
    add_pair(&conn, "a1", "T001", MONDAY, "08:00", "16:00");

    let report = reconcile_day(&mut conn, MONDAY);
    assert_eq!(report.statuses.errors, vec!["x1-in", "x1-out"]);
    assert_eq!(report.statuses.processed, vec!["a1-in", "a1-out"]);
    assert_eq!(report.issues[0].kind, IssueKind::UnknownTag);
    assert_eq!(report.created, 1);
}

#[test]
fn test_supervisor_record_for_unknown_employee_is_noted() {
    let mut conn = seeded("unknown_employee");
    let id = add_supervisor_record(&conn, 0, 100, 999, MONDAY, "", "", Some(("08:00", "16:00")));

    let report = reconcile_day(&mut conn, MONDAY);
    assert_eq!(report.created, 0);
    assert!(report.notes.contains(&Note::UnknownEmployee {
        record_id: id,
        employee_id: 999
    }));
}

#[test]
fn test_rerun_updates_in_place_and_keeps_approval() {
    let mut conn = seeded("rerun_keeps_approval");
    add_pair(&conn, "a1", "T001", MONDAY, "07:50", "16:10");

    let first = reconcile_day(&mut conn, MONDAY);
    assert_eq!((first.created, first.updated), (1, 0));
    let before = stored(&conn, ALICE, MONDAY);

    assert!(set_approved(&conn, ALICE, &d(MONDAY), true).unwrap());

    let second = reconcile_day(&mut conn, MONDAY);
    assert_eq!((second.created, second.updated), (0, 0));
    assert!(second.notes.is_empty());

    let after = stored(&conn, ALICE, MONDAY);
    assert_eq!(after.id, before.id);
    assert!(after.approved);
    assert_eq!(after.start_time, before.start_time);
    assert_eq!(after.finish_time, before.finish_time);
    assert_hours(&after, before.hours);
    assert_eq!(after.review_status, before.review_status);

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM timesheets", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_approved_timesheet_is_not_overwritten() {
    let mut conn = seeded("approved_not_overwritten");
    add_pair(&conn, "a1", "T001", MONDAY, "07:50", "16:10");
    reconcile_day(&mut conn, MONDAY);
    assert!(set_approved(&conn, ALICE, &d(MONDAY), true).unwrap());
    let before = stored(&conn, ALICE, MONDAY);

    add_supervisor_record(&conn, 0, 100, ALICE, MONDAY, "", "", Some(("06:00", "18:00")));
    let report = reconcile_day(&mut conn, MONDAY);

    assert!(report.is_success());
    assert_eq!((report.created, report.updated), (0, 0));
    assert!(report.notes.contains(&Note::ApprovedKept { employee_id: ALICE }));

    let after = stored(&conn, ALICE, MONDAY);
    assert!(after.approved);
    assert_eq!(after.start_time, before.start_time);
    assert_eq!(after.finish_time, before.finish_time);
    assert_hours(&after, 8.0);

    // the device pair lost to the supervisor record all the same
    assert_eq!(event_status(&conn, "a1-in"), "skipped");
}

#[test]
fn test_overnight_schedule_rolls_finish_to_next_day() {
    let mut conn = seeded("overnight_schedule");
    add_event(&conn, "d1-in", "T004", MONDAY, "2025-10-06T21:55:00", EventKind::In);
    add_event(&conn, "d1-out", "T004", MONDAY, "2025-10-07T06:05:00", EventKind::Out);

    reconcile_day(&mut conn, MONDAY);
    let ts = stored(&conn, DAVE, MONDAY);
    assert_eq!(ts.start_time, Some(at(MONDAY, "22:00")));
    assert_eq!(ts.finish_time, Some(at(TUESDAY, "06:00")));
    assert_hours(&ts, 8.0);
    assert_eq!(ts.review_status, ReviewStatus::Clear);
}

#[test]
fn test_calendar_employee_uses_region_schedule() {
    let mut conn = seeded("region_schedule");
    add_pair(&conn, "c1", "T003", MONDAY, "06:55", "15:05");

    reconcile_day(&mut conn, MONDAY);
    let ts = stored(&conn, CAROL, MONDAY);
    assert_eq!(ts.start_time, Some(at(MONDAY, "07:00")));
    assert_eq!(ts.finish_time, Some(at(MONDAY, "15:00")));
    assert_eq!(ts.review_status, ReviewStatus::Clear);
}

#[test]
fn test_missing_schedule_requires_review() {
    let mut conn = seeded("missing_schedule");
    add_pair(&conn, "a1", "T001", SATURDAY, "08:00", "12:00");

    let report = reconcile_day(&mut conn, SATURDAY);
    assert!(report.notes.contains(&Note::ScheduleMissing { employee_id: ALICE }));

    let ts = stored(&conn, ALICE, SATURDAY);
    assert_hours(&ts, 4.0);
    assert_eq!(ts.break_minutes, None);
    assert_eq!(ts.review_status, ReviewStatus::Required);
}

#[test]
fn test_supervisor_record_without_times_or_schedule() {
    let mut conn = seeded("no_times_no_schedule");
    add_supervisor_record(&conn, 0, 100, ALICE, SATURDAY, "", "", None);

    reconcile_day(&mut conn, SATURDAY);
    let ts = stored(&conn, ALICE, SATURDAY);
    assert_eq!(ts.start_time, None);
    assert_eq!(ts.finish_time, None);
    assert_hours(&ts, 0.0);
    assert_eq!(ts.review_status, ReviewStatus::Required);
}

#[test]
fn test_supervisor_filter_restricts_both_sources() {
    let mut conn = seeded("supervisor_filter");
    add_pair(&conn, "a1", "T001", MONDAY, "08:00", "16:00");
    add_pair(&conn, "c1", "T003", MONDAY, "07:00", "15:00");
    add_supervisor_record(&conn, 0, 200, DAVE, MONDAY, "", "", Some(("22:00", "23:00")));

    let mut opts = ReconcileOptions::single_day(d(MONDAY));
    opts.filter = RecordFilter {
        supervisors: vec![100],
        ..RecordFilter::default()
    };
    let report = reconcile(&mut conn, &opts).pop().unwrap();

    assert_eq!(report.created, 1);
    assert!(load_timesheet(&conn, ALICE, &d(MONDAY)).unwrap().is_some());
    assert!(load_timesheet(&conn, CAROL, &d(MONDAY)).unwrap().is_none());
    assert!(load_timesheet(&conn, DAVE, &d(MONDAY)).unwrap().is_none());
    assert_eq!(event_status(&conn, "c1-in"), "pending");
}

#[test]
fn test_employee_filter_restricts_both_sources() {
    let mut conn = seeded("employee_filter");
    add_pair(&conn, "a1", "T001", MONDAY, "08:00", "16:00");
    add_pair(&conn, "b1", "T002", MONDAY, "08:00", "16:30");
    add_supervisor_record(&conn, 0, 100, BOB, MONDAY, "", "", None);

    let mut opts = ReconcileOptions::single_day(d(MONDAY));
    opts.filter.employees = vec![ALICE];
    let report = reconcile(&mut conn, &opts).pop().unwrap();

    assert_eq!(report.created, 1);
    assert!(load_timesheet(&conn, BOB, &d(MONDAY)).unwrap().is_none());
    assert_eq!(event_status(&conn, "b1-in"), "pending");
}

#[test]
fn test_filter_without_matching_tags_fetches_no_events() {
    let mut conn = seeded("filter_no_tags");
    add_pair(&conn, "a1", "T001", MONDAY, "08:00", "16:00");

    let mut opts = ReconcileOptions::single_day(d(MONDAY));
    opts.filter.employees = vec![999];
    let report = reconcile(&mut conn, &opts).pop().unwrap();

    assert!(report.statuses.is_empty());
    assert_eq!(report.created, 0);
    assert_eq!(event_status(&conn, "a1-in"), "pending");
}

#[test]
fn test_pending_only_ignores_consumed_events() {
    let mut conn = seeded("pending_only");
    add_pair(&conn, "a1", "T001", MONDAY, "08:00", "16:00");
    reconcile_day(&mut conn, MONDAY);

    let mut opts = ReconcileOptions::single_day(d(MONDAY));
    opts.filter.pending_only = true;
    let report = reconcile(&mut conn, &opts).pop().unwrap();

    assert!(report.statuses.is_empty());
    assert_eq!((report.created, report.updated), (0, 0));
}

#[test]
fn test_dry_run_leaves_store_untouched() {
    let mut conn = seeded("dry_run");
    add_pair(&conn, "a1", "T001", MONDAY, "07:30", "17:10");

    let mut opts = ReconcileOptions::single_day(d(MONDAY));
    opts.dry_run = true;
    let report = reconcile(&mut conn, &opts).pop().unwrap();

    assert_eq!(report.statuses.processed.len(), 2);
    assert_eq!(report.review_required, 1);
    assert_eq!(report.created, 0);
    assert!(load_timesheet(&conn, ALICE, &d(MONDAY)).unwrap().is_none());
    assert_eq!(event_status(&conn, "a1-in"), "pending");
}

#[test]
fn test_range_produces_one_report_per_date() {
    let mut conn = seeded("range_reports");
    add_pair(&conn, "a1", "T001", MONDAY, "08:00", "16:00");
    add_pair(&conn, "a2", "T001", TUESDAY, "08:00", "16:00");

    let reports = reconcile(&mut conn, &ReconcileOptions::new(d(MONDAY), d("2025-10-08")));
    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].date, d(MONDAY));
    assert_eq!(reports[0].created, 1);
    assert_eq!(reports[1].created, 1);
    assert_eq!(reports[2].created, 0);
}

#[test]
fn test_inverted_range_is_rejected() {
    let mut conn = seeded("inverted_range");
    let mut store = SqliteStore::new(&mut conn);

    let res = Reconciler::new(&Config::default())
        .reconcile(&mut store, &ReconcileOptions::new(d(TUESDAY), d(MONDAY)));
    assert!(matches!(res, Err(AppError::InvalidRange { .. })));
}

#[test]
fn test_cancelled_run_starts_no_dates() {
    let mut conn = seeded("cancelled_run");
    add_pair(&conn, "a1", "T001", MONDAY, "08:00", "16:00");

    let mut store = SqliteStore::new(&mut conn);
    let reports = Reconciler::new(&Config::default())
        .with_cancel_flag(Arc::new(AtomicBool::new(true)))
        .reconcile(&mut store, &ReconcileOptions::single_day(d(MONDAY)))
        .unwrap();
    assert!(reports.is_empty());
    drop(store);

    assert_eq!(event_status(&conn, "a1-in"), "pending");
}

#[test]
fn test_device_offset_shifts_utc_timestamps() {
    let mut conn = seeded("device_offset");
    add_event(&conn, "a1-in", "T001", MONDAY, "2025-10-05T21:52:00Z", EventKind::In);
    add_event(&conn, "a1-out", "T001", MONDAY, "2025-10-06T06:08:00+00:00", EventKind::Out);

    let cfg = Config {
        device_utc_offset_minutes: 600,
        ..Config::default()
    };
    let mut store = SqliteStore::new(&mut conn);
    Reconciler::new(&cfg)
        .reconcile(&mut store, &ReconcileOptions::single_day(d(MONDAY)))
        .unwrap();
    drop(store);

    let ts = stored(&conn, ALICE, MONDAY);
    assert_eq!(ts.start_time, Some(at(MONDAY, "08:00")));
    assert_eq!(ts.finish_time, Some(at(MONDAY, "16:00")));
}
