use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Employee {
    pub employee_id: i64,
    pub name: String,
    /// Device badge identifier; empty when the employee has no badge.
    pub tag: String,
    pub job_id: Option<i64>,
    pub cost_centre_id: Option<i64>,
    pub reports_to_id: Option<i64>,
    /// `true` → the region calendar schedule applies, `false` → personal schedule.
    pub use_calendar_work_hours: bool,
    pub calendar_region_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub job_id: i64,
    pub job_no: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CostCentre {
    pub cost_centre_id: i64,
    pub code: String,
    pub name: String,
}

/// Link row: a cost centre that may be booked against a job.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct JobCostCentre {
    pub job_id: i64,
    pub cost_centre_id: i64,
}
