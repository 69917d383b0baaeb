use super::review_status::ReviewStatus;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Reconciled timesheet for one employee on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedTimesheet {
    pub id: Option<i64>,
    pub employee_id: i64,
    pub date: NaiveDate,
    pub hours: f64,
    pub start_time: Option<NaiveDateTime>,
    pub finish_time: Option<NaiveDateTime>,
    pub review_status: ReviewStatus,
    pub approved: bool,
    pub project_id: Option<i64>,
    pub cost_centre_id: Option<i64>,
    /// Scheduled break for the day, in minutes.
    pub break_minutes: Option<i32>,
    /// Set by the break accountant when `break_minutes` was taken off `hours`.
    #[serde(skip)]
    pub break_deducted: bool,
}

impl ResolvedTimesheet {
    pub fn new(employee_id: i64, date: NaiveDate) -> Self {
        Self {
            id: None,
            employee_id,
            date,
            hours: 0.0,
            start_time: None,
            finish_time: None,
            review_status: ReviewStatus::Clear,
            approved: false,
            project_id: None,
            cost_centre_id: None,
            break_minutes: None,
            break_deducted: false,
        }
    }

    /// Break hours actually taken off `hours` (0 when none was deducted).
    pub fn deducted_break_hours(&self) -> f64 {
        match self.break_minutes {
            Some(b) if self.break_deducted && b > 0 => b as f64 / 60.0,
            _ => 0.0,
        }
    }

    /// Same hours, times and assignment as `other`.
    pub fn same_outcome(&self, other: &ResolvedTimesheet) -> bool {
        self.start_time == other.start_time
            && self.finish_time == other.finish_time
            && (self.hours - other.hours).abs() < 1e-6
            && self.project_id == other.project_id
            && self.cost_centre_id == other.cost_centre_id
    }

    /// Recompute `hours` from start/finish, clamping negative spans to zero.
    pub fn recompute_hours(&mut self) {
        self.hours = match (self.start_time, self.finish_time) {
            (Some(s), Some(f)) => span_hours(s, f),
            _ => 0.0,
        };
    }
}

/// Fractional hours between two instants, never negative.
pub fn span_hours(start: NaiveDateTime, finish: NaiveDateTime) -> f64 {
    let secs = (finish - start).num_seconds();
    (secs as f64 / 3600.0).max(0.0)
}
