//! SQLite implementation of the engine's storage boundary.

use crate::core::reference::ReferenceData;
use crate::core::report::{Stage, StatusBuckets};
use crate::core::store::{CommitSummary, DateRecords, RecordFilter, TimesheetStore};
use crate::db::queries::{
    insert_timesheet, load_clock_events, load_cost_centres, load_employees, load_job_cost_centres,
    load_jobs, load_supervisor_records, load_timesheets_for_date, load_work_hours,
    update_event_status, update_timesheet,
};
use crate::errors::{AppError, AppResult};
use crate::models::timesheet::ResolvedTimesheet;
use chrono::NaiveDate;
use rusqlite::{Connection, TransactionBehavior};
use std::collections::HashMap;
use tracing::debug;

pub struct SqliteStore<'a> {
    conn: &'a mut Connection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a mut Connection) -> Self {
        Self { conn }
    }
}

impl TimesheetStore for SqliteStore<'_> {
    fn load_reference(&mut self) -> AppResult<ReferenceData> {
        let tx = self.conn.transaction()?;
        let reference = ReferenceData::new(
            load_employees(&tx)?,
            load_jobs(&tx)?,
            load_cost_centres(&tx)?,
            load_job_cost_centres(&tx)?,
            load_work_hours(&tx)?,
        );
        tx.commit()?;
        Ok(reference)
    }

    fn fetch_records(
        &mut self,
        date: NaiveDate,
        filter: &RecordFilter,
        device_tags: Option<&[String]>,
    ) -> AppResult<DateRecords> {
        // One read transaction so both sources see the same snapshot.
        let tx = self.conn.transaction()?;
        let supervisor = load_supervisor_records(&tx, &date, &filter.supervisors, &filter.employees)?;
        let events = load_clock_events(&tx, &date, device_tags, filter.pending_only)?;
        tx.commit()?;

        Ok(DateRecords { supervisor, events })
    }

    fn commit_date(
        &mut self,
        date: NaiveDate,
        timesheets: &[ResolvedTimesheet],
        statuses: &StatusBuckets,
    ) -> AppResult<CommitSummary> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let employee_ids: Vec<i64> = timesheets.iter().map(|t| t.employee_id).collect();
        let existing: HashMap<i64, ResolvedTimesheet> = load_timesheets_for_date(&tx, &date, &employee_ids)?
            .into_iter()
            .map(|t| (t.employee_id, t))
            .collect();

        let mut summary = CommitSummary::default();
        for ts in timesheets {
            match existing.get(&ts.employee_id) {
                Some(stored) if stored.approved => {
                    // approved rows belong to the humans
                    if !stored.same_outcome(ts) {
                        summary.approved_kept.push(ts.employee_id);
                    }
                }
                Some(stored) => {
                    let mut row = ts.clone();
                    row.id = stored.id;
                    update_timesheet(&tx, &row)?;
                    summary.updated += 1;
                }
                None => {
                    insert_timesheet(&tx, ts)?;
                    summary.created += 1;
                }
            }
        }

        debug!(%date, stage = %Stage::UpdateStatuses, events = statuses.len(), "updating event statuses");
        for (status, ids) in statuses.iter() {
            update_event_status(&tx, ids, status)
                .map_err(|e| AppError::StatusUpdateFailed(e.to_string()))?;
        }

        tx.commit()?;
        Ok(summary)
    }
}
