use crate::errors::{AppError, AppResult};
use crate::models::clock_event::{ClockEvent, EventKind};
use crate::models::employee::{CostCentre, Employee, Job, JobCostCentre};
use crate::models::process_status::ProcessStatus;
use crate::models::review_status::ReviewStatus;
use crate::models::supervisor_record::SupervisorRecord;
use crate::models::timesheet::ResolvedTimesheet;
use crate::models::work_hours::{ScheduleOwner, WorkHourDefinition, WorkHourRow};
use crate::utils::time::{format_local_timestamp, parse_local_timestamp};
use chrono::{Local, NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Result, Row, ToSql, params, params_from_iter};

fn conversion_error(col: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(col, Type::Text, Box::new(err))
}

fn date_str(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

fn get_date(row: &Row, col: &str) -> Result<NaiveDate> {
    let s: String = row.get(col)?;
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| conversion_error(0, AppError::InvalidDate(s)))
}

fn get_opt_timestamp(row: &Row, col: &str) -> Result<Option<NaiveDateTime>> {
    let s: Option<String> = row.get(col)?;
    match s {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => parse_local_timestamp(&s)
            .map(Some)
            .ok_or_else(|| conversion_error(0, AppError::InvalidTime(s))),
    }
}

/// "?,?,?" for `n` values
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

pub fn map_employee(row: &Row) -> Result<Employee> {
    Ok(Employee {
        employee_id: row.get("employee_id")?,
        name: row.get("name")?,
        tag: row.get("tag")?,
        job_id: row.get("job_id")?,
        cost_centre_id: row.get("cost_centre_id")?,
        reports_to_id: row.get("reports_to_id")?,
        use_calendar_work_hours: row.get::<_, i32>("use_calendar_work_hours")? == 1,
        calendar_region_id: row.get("calendar_region_id")?,
    })
}

pub fn load_employees(conn: &Connection) -> AppResult<Vec<Employee>> {
    let mut stmt = conn.prepare("SELECT * FROM employees ORDER BY employee_id ASC")?;
    let rows = stmt.query_map([], map_employee)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_jobs(conn: &Connection) -> AppResult<Vec<Job>> {
    let mut stmt = conn.prepare("SELECT job_id, job_no, name FROM jobs ORDER BY job_id ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok(Job {
            job_id: row.get(0)?,
            job_no: row.get(1)?,
            name: row.get(2)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_cost_centres(conn: &Connection) -> AppResult<Vec<CostCentre>> {
    let mut stmt = conn.prepare("SELECT cost_centre_id, code, name FROM cost_centres")?;
    let rows = stmt.query_map([], |row| {
        Ok(CostCentre {
            cost_centre_id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_job_cost_centres(conn: &Connection) -> AppResult<Vec<JobCostCentre>> {
    let mut stmt = conn.prepare("SELECT job_id, cost_centre_id FROM job_cost_centres")?;
    let rows = stmt.query_map([], |row| {
        Ok(JobCostCentre {
            job_id: row.get(0)?,
            cost_centre_id: row.get(1)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Personal and region schedule rows together.
pub fn load_work_hours(conn: &Connection) -> AppResult<Vec<WorkHourRow>> {
    let mut out = Vec::new();

    let mut stmt = conn.prepare(
        "SELECT employee_id, day_of_week, start, finish, break_minutes FROM employee_work_hours",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(WorkHourRow {
            owner: ScheduleOwner::Employee(row.get(0)?),
            day_of_week: row.get(1)?,
            definition: WorkHourDefinition {
                start: row.get(2)?,
                finish: row.get(3)?,
                break_minutes: row.get(4)?,
            },
        })
    })?;
    for r in rows {
        out.push(r?);
    }

    let mut stmt = conn.prepare(
        "SELECT region_id, day_of_week, start, finish, break_minutes FROM region_work_hours",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(WorkHourRow {
            owner: ScheduleOwner::Region(row.get(0)?),
            day_of_week: row.get(1)?,
            definition: WorkHourDefinition {
                start: row.get(2)?,
                finish: row.get(3)?,
                break_minutes: row.get(4)?,
            },
        })
    })?;
    for r in rows {
        out.push(r?);
    }

    Ok(out)
}

pub fn insert_employee(conn: &Connection, e: &Employee) -> AppResult<()> {
    conn.execute(
        "INSERT INTO employees (employee_id, name, tag, job_id, cost_centre_id, reports_to_id,
                                use_calendar_work_hours, calendar_region_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            e.employee_id,
            e.name,
            e.tag,
            e.job_id,
            e.cost_centre_id,
            e.reports_to_id,
            if e.use_calendar_work_hours { 1 } else { 0 },
            e.calendar_region_id,
        ],
    )?;
    Ok(())
}

pub fn insert_job(conn: &Connection, job: &Job) -> AppResult<()> {
    conn.execute(
        "INSERT INTO jobs (job_id, job_no, name) VALUES (?1, ?2, ?3)",
        params![job.job_id, job.job_no, job.name],
    )?;
    Ok(())
}

pub fn insert_cost_centre(conn: &Connection, cc: &CostCentre) -> AppResult<()> {
    conn.execute(
        "INSERT INTO cost_centres (cost_centre_id, code, name) VALUES (?1, ?2, ?3)",
        params![cc.cost_centre_id, cc.code, cc.name],
    )?;
    Ok(())
}

pub fn link_job_cost_centre(conn: &Connection, job_id: i64, cost_centre_id: i64) -> AppResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO job_cost_centres (job_id, cost_centre_id) VALUES (?1, ?2)",
        params![job_id, cost_centre_id],
    )?;
    Ok(())
}

pub fn upsert_work_hours(conn: &Connection, row: &WorkHourRow) -> AppResult<()> {
    let (sql, owner_id) = match row.owner {
        ScheduleOwner::Employee(id) => (
            "INSERT OR REPLACE INTO employee_work_hours (employee_id, day_of_week, start, finish, break_minutes)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            id,
        ),
        ScheduleOwner::Region(id) => (
            "INSERT OR REPLACE INTO region_work_hours (region_id, day_of_week, start, finish, break_minutes)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            id,
        ),
    };
    conn.execute(
        sql,
        params![
            owner_id,
            row.day_of_week,
            row.definition.start,
            row.definition.finish,
            row.definition.break_minutes,
        ],
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Raw records
// ---------------------------------------------------------------------------

pub fn map_clock_event(row: &Row) -> Result<ClockEvent> {
    let kind_str: String = row.get("kind")?;
    let kind = EventKind::from_db_str(&kind_str)
        .ok_or_else(|| conversion_error(0, AppError::InvalidEventKind(kind_str.clone())))?;

    let status_str: String = row.get("process_status")?;
    let process_status = ProcessStatus::from_db_str(&status_str).map_err(|e| conversion_error(0, e))?;

    Ok(ClockEvent {
        id: row.get("id")?,
        tag: row.get("tag")?,
        date: get_date(row, "date")?,
        timestamp: row.get("timestamp")?,
        kind,
        device_id: row.get("device_id")?,
        process_status,
    })
}

/// Device events of `date`, optionally restricted to `tags` and to pending rows.
pub fn load_clock_events(
    conn: &Connection,
    date: &NaiveDate,
    tags: Option<&[String]>,
    pending_only: bool,
) -> AppResult<Vec<ClockEvent>> {
    if tags.is_some_and(|t| t.is_empty()) {
        return Ok(Vec::new());
    }

    let d = date_str(date);
    let mut sql = String::from("SELECT * FROM clock_events WHERE date = ?");
    let mut values: Vec<&dyn ToSql> = Vec::new();
    values.push(&d);

    if pending_only {
        sql.push_str(" AND process_status = 'pending'");
    }
    if let Some(tags) = tags {
        sql.push_str(&format!(" AND tag IN ({})", placeholders(tags.len())));
        for t in tags {
            values.push(t);
        }
    }
    sql.push_str(" ORDER BY tag ASC, timestamp ASC, id ASC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), map_clock_event)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_clock_event(conn: &Connection, id: &str) -> AppResult<Option<ClockEvent>> {
    let ev = conn
        .query_row("SELECT * FROM clock_events WHERE id = ?1", [id], map_clock_event)
        .optional()?;
    Ok(ev)
}

pub fn insert_clock_event(conn: &Connection, ev: &ClockEvent) -> AppResult<()> {
    conn.execute(
        "INSERT INTO clock_events (id, tag, date, kind, timestamp, device_id, process_status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            ev.id,
            ev.tag,
            date_str(&ev.date),
            ev.kind.to_db_str(),
            ev.timestamp,
            ev.device_id,
            ev.process_status.to_db_str(),
        ],
    )?;
    Ok(())
}

/// Set `status` on every event in `ids`.
pub fn update_event_status(conn: &Connection, ids: &[String], status: ProcessStatus) -> AppResult<usize> {
    if ids.is_empty() {
        return Ok(0);
    }

    let sql = format!(
        "UPDATE clock_events SET process_status = ?, updated_at = CURRENT_TIMESTAMP
         WHERE id IN ({})",
        placeholders(ids.len())
    );

    let status_str = status.to_db_str();
    let mut values: Vec<&dyn ToSql> = Vec::new();
    values.push(&status_str);
    for id in ids {
        values.push(id);
    }

    let n = conn.execute(&sql, params_from_iter(values))?;
    Ok(n)
}

pub fn map_supervisor_record(row: &Row) -> Result<SupervisorRecord> {
    Ok(SupervisorRecord {
        id: row.get("id")?,
        supervisor_id: row.get("supervisor_id")?,
        employee_id: row.get("employee_id")?,
        date: get_date(row, "date")?,
        project: row.get("project")?,
        wbs: row.get("wbs")?,
        clockin: get_opt_timestamp(row, "clockin")?,
        clockout: get_opt_timestamp(row, "clockout")?,
    })
}

/// Supervisor records of `date`, restricted by supervisor and employee ids
/// when those lists are non-empty.
pub fn load_supervisor_records(
    conn: &Connection,
    date: &NaiveDate,
    supervisors: &[i64],
    employees: &[i64],
) -> AppResult<Vec<SupervisorRecord>> {
    let mut sql = String::from("SELECT * FROM supervisor_records WHERE date = ?");
    let d = date_str(date);
    let mut values: Vec<&dyn ToSql> = Vec::new();
    values.push(&d);

    if !supervisors.is_empty() {
        sql.push_str(&format!(" AND supervisor_id IN ({})", placeholders(supervisors.len())));
        for s in supervisors {
            values.push(s);
        }
    }
    if !employees.is_empty() {
        sql.push_str(&format!(" AND employee_id IN ({})", placeholders(employees.len())));
        for e in employees {
            values.push(e);
        }
    }
    sql.push_str(" ORDER BY id ASC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), map_supervisor_record)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Insert a supervisor record and return its id.
pub fn insert_supervisor_record(conn: &Connection, rec: &SupervisorRecord) -> AppResult<i64> {
    let id: Option<i64> = if rec.id > 0 { Some(rec.id) } else { None };
    conn.execute(
        "INSERT INTO supervisor_records (id, supervisor_id, employee_id, date, project, wbs, clockin, clockout)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id,
            rec.supervisor_id,
            rec.employee_id,
            date_str(&rec.date),
            rec.project,
            rec.wbs,
            rec.clockin.as_ref().map(format_local_timestamp),
            rec.clockout.as_ref().map(format_local_timestamp),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

// ---------------------------------------------------------------------------
// Resolved timesheets
// ---------------------------------------------------------------------------

pub fn map_timesheet(row: &Row) -> Result<ResolvedTimesheet> {
    let review_str: String = row.get("review_status")?;
    let review_status = ReviewStatus::from_db_str(&review_str).map_err(|e| conversion_error(0, e))?;

    Ok(ResolvedTimesheet {
        id: row.get("id")?,
        employee_id: row.get("employee_id")?,
        date: get_date(row, "date")?,
        hours: row.get("hours")?,
        start_time: get_opt_timestamp(row, "start_time")?,
        finish_time: get_opt_timestamp(row, "finish_time")?,
        review_status,
        approved: row.get::<_, i32>("approved")? == 1,
        project_id: row.get("project_id")?,
        cost_centre_id: row.get("cost_centre_id")?,
        break_minutes: row.get("break_minutes")?,
        break_deducted: false,
    })
}

/// Stored timesheets of `date` for the given employees.
pub fn load_timesheets_for_date(
    conn: &Connection,
    date: &NaiveDate,
    employee_ids: &[i64],
) -> AppResult<Vec<ResolvedTimesheet>> {
    if employee_ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        "SELECT * FROM timesheets WHERE date = ? AND employee_id IN ({})",
        placeholders(employee_ids.len())
    );
    let d = date_str(date);
    let mut values: Vec<&dyn ToSql> = Vec::new();
    values.push(&d);
    for id in employee_ids {
        values.push(id);
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), map_timesheet)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_timesheet(conn: &Connection, employee_id: i64, date: &NaiveDate) -> AppResult<Option<ResolvedTimesheet>> {
    let ts = conn
        .query_row(
            "SELECT * FROM timesheets WHERE employee_id = ?1 AND date = ?2",
            params![employee_id, date_str(date)],
            map_timesheet,
        )
        .optional()?;
    Ok(ts)
}

/// Timesheets in `[start, end]`, optionally only those needing review or
/// belonging to one employee.
pub fn load_timesheets_between(
    conn: &Connection,
    start: &NaiveDate,
    end: &NaiveDate,
    review_only: bool,
    employee_id: Option<i64>,
) -> AppResult<Vec<ResolvedTimesheet>> {
    let mut sql = String::from("SELECT * FROM timesheets WHERE date BETWEEN ? AND ?");
    let (s, e) = (date_str(start), date_str(end));
    let mut values: Vec<&dyn ToSql> = Vec::new();
    values.push(&s);
    values.push(&e);

    if review_only {
        sql.push_str(" AND review_status = 'required'");
    }
    if let Some(id) = employee_id.as_ref() {
        sql.push_str(" AND employee_id = ?");
        values.push(id);
    }
    sql.push_str(" ORDER BY date ASC, employee_id ASC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), map_timesheet)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn insert_timesheet(conn: &Connection, ts: &ResolvedTimesheet) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO timesheets (employee_id, date, hours, start_time, finish_time, review_status,
                                 approved, project_id, cost_centre_id, break_minutes, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            ts.employee_id,
            date_str(&ts.date),
            ts.hours,
            ts.start_time.as_ref().map(format_local_timestamp),
            ts.finish_time.as_ref().map(format_local_timestamp),
            ts.review_status.to_db_str(),
            if ts.approved { 1 } else { 0 },
            ts.project_id,
            ts.cost_centre_id,
            ts.break_minutes,
            Local::now().to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Update every engine-owned column of the row with id `ts.id`.
pub fn update_timesheet(conn: &Connection, ts: &ResolvedTimesheet) -> AppResult<()> {
    conn.execute(
        "UPDATE timesheets
         SET hours = ?1, start_time = ?2, finish_time = ?3, review_status = ?4,
             approved = ?5, project_id = ?6, cost_centre_id = ?7, break_minutes = ?8,
             updated_at = ?9
         WHERE id = ?10",
        params![
            ts.hours,
            ts.start_time.as_ref().map(format_local_timestamp),
            ts.finish_time.as_ref().map(format_local_timestamp),
            ts.review_status.to_db_str(),
            if ts.approved { 1 } else { 0 },
            ts.project_id,
            ts.cost_centre_id,
            ts.break_minutes,
            Local::now().to_rfc3339(),
            ts.id,
        ],
    )?;
    Ok(())
}

/// Set the human approval flag. Returns `false` when no such row exists.
pub fn set_approved(conn: &Connection, employee_id: i64, date: &NaiveDate, approved: bool) -> AppResult<bool> {
    let n = conn.execute(
        "UPDATE timesheets SET approved = ?1, updated_at = ?2 WHERE employee_id = ?3 AND date = ?4",
        params![
            if approved { 1 } else { 0 },
            Local::now().to_rfc3339(),
            employee_id,
            date_str(date)
        ],
    )?;
    Ok(n > 0)
}
