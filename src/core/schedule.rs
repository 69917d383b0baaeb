//! Work schedule resolution: which start/finish/break applies to an employee
//! on a given day.

use crate::core::reference::ReferenceData;
use crate::models::employee::Employee;
use crate::models::timesheet::span_hours;
use crate::models::work_hours::WorkHourDefinition;
use crate::utils::time::time_on_date;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

/// A schedule definition pinned to a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleWindow {
    pub start: NaiveDateTime,
    pub finish: NaiveDateTime,
    pub break_minutes: i32,
}

impl ScheduleWindow {
    /// Pin `def` to `date`. A finish clock time earlier than the start one
    /// belongs to the next day (night shift).
    ///
    /// Returns `None` when either clock time cannot be parsed.
    pub fn on_date(date: NaiveDate, def: &WorkHourDefinition) -> Option<Self> {
        let start = time_on_date(date, &def.start)?;
        let mut finish = time_on_date(date, &def.finish)?;
        if finish < start {
            finish += Duration::days(1);
        }
        Some(Self {
            start,
            finish,
            break_minutes: def.break_minutes,
        })
    }

    /// Scheduled span in hours, break included.
    pub fn expected_hours(&self) -> f64 {
        span_hours(self.start, self.finish)
    }
}

pub struct WorkScheduleResolver<'a> {
    reference: &'a ReferenceData,
}

impl<'a> WorkScheduleResolver<'a> {
    pub fn new(reference: &'a ReferenceData) -> Self {
        Self { reference }
    }

    /// The authoritative definition for `emp` on the weekday of `date`.
    ///
    /// Calendar employees only ever look at their region; everybody else
    /// only at their personal hours. There is no fallback between the two.
    pub fn definition(&self, emp: &Employee, date: NaiveDate) -> Option<&'a WorkHourDefinition> {
        let weekday = date.weekday().num_days_from_sunday();

        if emp.use_calendar_work_hours {
            let region = emp.calendar_region_id?;
            return self.reference.region_schedule(region, weekday);
        }

        self.reference.employee_schedule(emp.employee_id, weekday)
    }

    /// Definition pinned to `date`, when one exists and parses.
    pub fn window(&self, emp: &Employee, date: NaiveDate) -> Option<ScheduleWindow> {
        self.definition(emp, date)
            .and_then(|def| ScheduleWindow::on_date(date, def))
    }

    /// Scheduled break in minutes, when a definition exists.
    pub fn break_minutes(&self, emp: &Employee, date: NaiveDate) -> Option<i32> {
        self.definition(emp, date).map(|d| d.break_minutes)
    }
}
