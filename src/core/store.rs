//! Storage boundary used by the reconciliation engine.

use crate::core::reference::ReferenceData;
use crate::core::report::StatusBuckets;
use crate::errors::AppResult;
use crate::models::clock_event::ClockEvent;
use crate::models::supervisor_record::SupervisorRecord;
use crate::models::timesheet::ResolvedTimesheet;
use chrono::NaiveDate;

/// Restricts which raw records a run looks at.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Supervisor ids; empty = no restriction.
    pub supervisors: Vec<i64>,
    /// Employee ids; empty = no restriction.
    pub employees: Vec<i64>,
    /// Only fetch device events still marked `pending`.
    pub pending_only: bool,
}

impl RecordFilter {
    pub fn is_restricted(&self) -> bool {
        !self.supervisors.is_empty() || !self.employees.is_empty()
    }
}

/// Raw records of one date, read as one consistent snapshot.
#[derive(Debug, Default, Clone)]
pub struct DateRecords {
    pub supervisor: Vec<SupervisorRecord>,
    pub events: Vec<ClockEvent>,
}

/// Rows written by a commit.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub created: usize,
    pub updated: usize,
    /// Approved rows left as stored although the new result differs.
    pub approved_kept: Vec<i64>,
}

pub trait TimesheetStore {
    /// Employees, jobs, cost centres and schedules.
    fn load_reference(&mut self) -> AppResult<ReferenceData>;

    /// Supervisor records and device events for `date`.
    ///
    /// `device_tags` is `None` for an unrestricted fetch; `Some(&[])` fetches
    /// no device events at all.
    fn fetch_records(
        &mut self,
        date: NaiveDate,
        filter: &RecordFilter,
        device_tags: Option<&[String]>,
    ) -> AppResult<DateRecords>;

    /// Upsert `timesheets` (matched by employee + date) and apply `statuses`,
    /// all or nothing. Approved rows are never rewritten.
    ///
    /// A failing status update is reported as [`crate::errors::AppError::StatusUpdateFailed`].
    fn commit_date(
        &mut self,
        date: NaiveDate,
        timesheets: &[ResolvedTimesheet],
        statuses: &StatusBuckets,
    ) -> AppResult<CommitSummary>;
}
