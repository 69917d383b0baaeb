//! Tolerance-window snapping of actual start/finish times to the schedule.

use crate::config::SnapTolerance;
use crate::core::reference::ReferenceData;
use crate::core::schedule::{ScheduleWindow, WorkScheduleResolver};
use crate::models::timesheet::ResolvedTimesheet;
use chrono::{Duration, NaiveDateTime};
use std::collections::BTreeMap;

/// Snap `actual` to `scheduled` when `actual - scheduled` lies in
/// `[-early, +late]` (both bounds inclusive).
fn snap(actual: NaiveDateTime, scheduled: NaiveDateTime, early: Duration, late: Duration) -> NaiveDateTime {
    let diff = actual - scheduled;
    if diff >= -early && diff <= late {
        scheduled
    } else {
        actual
    }
}

pub fn snap_start(actual: NaiveDateTime, scheduled: NaiveDateTime, tol: &SnapTolerance) -> NaiveDateTime {
    snap(
        actual,
        scheduled,
        Duration::minutes(tol.start_early_minutes),
        Duration::minutes(tol.start_late_minutes),
    )
}

pub fn snap_finish(actual: NaiveDateTime, scheduled: NaiveDateTime, tol: &SnapTolerance) -> NaiveDateTime {
    snap(
        actual,
        scheduled,
        Duration::minutes(tol.finish_early_minutes),
        Duration::minutes(tol.finish_late_minutes),
    )
}

/// Adjust an actual start/finish pair against an optional schedule using the
/// default tolerances (start −15/+10 min, finish −10/+15 min).
pub fn apply_schedule_window(
    actual_start: NaiveDateTime,
    actual_finish: NaiveDateTime,
    schedule: Option<&ScheduleWindow>,
) -> (NaiveDateTime, NaiveDateTime) {
    SnappingEngine::default().adjust(actual_start, actual_finish, schedule)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SnappingEngine {
    tolerance: SnapTolerance,
}

impl SnappingEngine {
    pub fn new(tolerance: SnapTolerance) -> Self {
        Self { tolerance }
    }

    pub fn adjust(
        &self,
        actual_start: NaiveDateTime,
        actual_finish: NaiveDateTime,
        schedule: Option<&ScheduleWindow>,
    ) -> (NaiveDateTime, NaiveDateTime) {
        match schedule {
            None => (actual_start, actual_finish),
            Some(w) => (
                snap_start(actual_start, w.start, &self.tolerance),
                snap_finish(actual_finish, w.finish, &self.tolerance),
            ),
        }
    }

    /// Snap every entry against its employee's schedule and recompute hours.
    pub fn apply(&self, entries: &mut BTreeMap<i64, ResolvedTimesheet>, reference: &ReferenceData) {
        let schedules = WorkScheduleResolver::new(reference);

        for ts in entries.values_mut() {
            let Some(emp) = reference.employee(ts.employee_id) else {
                continue;
            };

            if let (Some(start), Some(finish)) = (ts.start_time, ts.finish_time) {
                let window = schedules.window(emp, ts.date);
                let (s, f) = self.adjust(start, finish, window.as_ref());
                ts.start_time = Some(s);
                ts.finish_time = Some(f);
            }

            ts.recompute_hours();
        }
    }
}
