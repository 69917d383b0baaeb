use crate::core::reference::ReferenceData;
use crate::models::timesheet::ResolvedTimesheet;
use crate::utils::time::format_clock;
use serde::Serialize;

/// Flat timesheet row handed to payroll.
#[derive(Serialize, Clone, Debug)]
pub struct TimesheetExport {
    pub date: String,
    pub employee_id: i64,
    pub employee_name: String,
    pub start: String,
    pub finish: String,
    pub break_minutes: i32,
    pub hours: f64,
    pub job_no: String,
    pub cost_centre: String,
    pub review_status: String,
    pub approved: bool,
}

impl TimesheetExport {
    /// Resolve ids against `reference`; unknown ids export as empty strings.
    pub fn from_timesheet(ts: &ResolvedTimesheet, reference: &ReferenceData) -> Self {
        let job_no = ts
            .project_id
            .and_then(|id| reference.job(id))
            .map(|j| j.job_no.clone())
            .unwrap_or_default();
        let cost_centre = ts
            .cost_centre_id
            .and_then(|id| reference.cost_centre(id))
            .map(|c| c.code.clone())
            .unwrap_or_default();

        Self {
            date: ts.date.format("%Y-%m-%d").to_string(),
            employee_id: ts.employee_id,
            employee_name: reference
                .employee(ts.employee_id)
                .map(|e| e.name.clone())
                .unwrap_or_default(),
            start: clock_or_empty(ts.start_time),
            finish: clock_or_empty(ts.finish_time),
            break_minutes: ts.break_minutes.unwrap_or(0),
            hours: (ts.hours * 1000.0).round() / 1000.0,
            job_no,
            cost_centre,
            review_status: ts.review_status.to_db_str().to_string(),
            approved: ts.approved,
        }
    }
}

fn clock_or_empty(dt: Option<chrono::NaiveDateTime>) -> String {
    dt.map(|d| format_clock(Some(d))).unwrap_or_default()
}

/// Column headers for CSV / XLSX, in field order.
pub(crate) fn get_headers() -> Vec<&'static str> {
    vec![
        "date",
        "employee_id",
        "employee_name",
        "start",
        "finish",
        "break_minutes",
        "hours",
        "job_no",
        "cost_centre",
        "review_status",
        "approved",
    ]
}

pub(crate) fn timesheet_to_row(t: &TimesheetExport) -> Vec<String> {
    vec![
        t.date.clone(),
        t.employee_id.to_string(),
        t.employee_name.clone(),
        t.start.clone(),
        t.finish.clone(),
        t.break_minutes.to_string(),
        format!("{:.3}", t.hours),
        t.job_no.clone(),
        t.cost_centre.clone(),
        t.review_status.clone(),
        if t.approved { "yes" } else { "no" }.to_string(),
    ]
}
