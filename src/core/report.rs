//! Per-date accounting returned by a reconciliation run.

use crate::errors::AppError;
use crate::models::process_status::ProcessStatus;
use chrono::NaiveDate;
use std::fmt;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchReference,
    FetchRecords,
    GroupAndMerge,
    Snap,
    DeductBreaks,
    Classify,
    Persist,
    UpdateStatuses,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::FetchReference => "fetch-reference",
            Stage::FetchRecords => "fetch-records",
            Stage::GroupAndMerge => "group-and-merge",
            Stage::Snap => "snap",
            Stage::DeductBreaks => "deduct-breaks",
            Stage::Classify => "classify",
            Stage::Persist => "persist",
            Stage::UpdateStatuses => "update-statuses",
            Stage::Done => "done",
        };
        f.write_str(s)
    }
}

/// Why a device group could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    IncompleteClockPair,
    UnknownTag,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::IncompleteClockPair => f.write_str("incomplete clock pair"),
            IssueKind::UnknownTag => f.write_str("unknown tag"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupIssue {
    pub kind: IssueKind,
    pub tag: String,
    pub event_ids: Vec<String>,
}

/// Non-fatal observations that do not touch event statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Note {
    /// No schedule for the weekday; the timesheet was flagged for review.
    ScheduleMissing { employee_id: i64 },
    /// Supervisor record pointing at an employee missing from the reference data.
    UnknownEmployee { record_id: i64, employee_id: i64 },
    /// Approved timesheet left as stored; the reconciled values differ.
    ApprovedKept { employee_id: i64 },
}

/// Event ids per terminal status.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatusBuckets {
    pub processed: Vec<String>,
    pub skipped: Vec<String>,
    pub errors: Vec<String>,
}

impl StatusBuckets {
    pub fn push(&mut self, status: ProcessStatus, ids: Vec<String>) {
        match status {
            ProcessStatus::Processed => self.processed.extend(ids),
            ProcessStatus::Skipped => self.skipped.extend(ids),
            ProcessStatus::Error => self.errors.extend(ids),
            ProcessStatus::Pending => {}
        }
    }

    /// `(status, ids)` for every non-empty bucket.
    pub fn iter(&self) -> impl Iterator<Item = (ProcessStatus, &[String])> {
        [
            (ProcessStatus::Processed, self.processed.as_slice()),
            (ProcessStatus::Skipped, self.skipped.as_slice()),
            (ProcessStatus::Error, self.errors.as_slice()),
        ]
        .into_iter()
        .filter(|(_, ids)| !ids.is_empty())
    }

    pub fn len(&self) -> usize {
        self.processed.len() + self.skipped.len() + self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of one date's pipeline.
#[derive(Debug)]
pub struct DateReport {
    pub date: NaiveDate,
    pub created: usize,
    pub updated: usize,
    pub review_required: usize,
    pub statuses: StatusBuckets,
    pub issues: Vec<GroupIssue>,
    pub notes: Vec<Note>,
    /// Set when the date aborted; nothing was committed for it.
    pub failure: Option<(Stage, AppError)>,
}

impl DateReport {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            created: 0,
            updated: 0,
            review_required: 0,
            statuses: StatusBuckets::default(),
            issues: Vec::new(),
            notes: Vec::new(),
            failure: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}
