//! Review flagging of resolved entries.

use crate::core::reference::ReferenceData;
use crate::core::report::Note;
use crate::core::schedule::WorkScheduleResolver;
use crate::models::employee::Employee;
use crate::models::review_status::ReviewStatus;
use crate::models::timesheet::ResolvedTimesheet;
use std::collections::BTreeMap;

/// Why an entry needs review. Only the first failing check is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewReason {
    NoJob,
    JobMismatch,
    CostCentreMismatch,
    ScheduleMissing,
    HoursMismatch,
}

pub struct ReviewClassifier<'a> {
    reference: &'a ReferenceData,
    epsilon_hours: f64,
}

impl<'a> ReviewClassifier<'a> {
    pub fn new(reference: &'a ReferenceData, epsilon_hours: f64) -> Self {
        Self {
            reference,
            epsilon_hours,
        }
    }

    pub fn check(&self, ts: &ResolvedTimesheet, emp: &Employee) -> Option<ReviewReason> {
        let Some(job) = ts.project_id else {
            return Some(ReviewReason::NoJob);
        };

        if let Some(default_job) = emp.job_id
            && job != default_job
        {
            return Some(ReviewReason::JobMismatch);
        }

        if let Some(default_cc) = emp.cost_centre_id
            && ts.cost_centre_id != Some(default_cc)
        {
            return Some(ReviewReason::CostCentreMismatch);
        }

        let Some(window) = WorkScheduleResolver::new(self.reference).window(emp, ts.date) else {
            return Some(ReviewReason::ScheduleMissing);
        };

        let actual_total = ts.hours + ts.deducted_break_hours();
        if (actual_total - window.expected_hours()).abs() > self.epsilon_hours {
            return Some(ReviewReason::HoursMismatch);
        }

        None
    }

    /// Classify every entry; returns a note per employee without a schedule.
    pub fn apply(&self, entries: &mut BTreeMap<i64, ResolvedTimesheet>) -> Vec<Note> {
        let schedules = WorkScheduleResolver::new(self.reference);
        let mut notes = Vec::new();

        for ts in entries.values_mut() {
            let Some(emp) = self.reference.employee(ts.employee_id) else {
                continue;
            };

            if schedules.window(emp, ts.date).is_none() {
                notes.push(Note::ScheduleMissing {
                    employee_id: ts.employee_id,
                });
            }

            ts.review_status = match self.check(ts, emp) {
                Some(_) => ReviewStatus::Required,
                None => ReviewStatus::Clear,
            };
        }

        notes
    }
}
