use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Manual attendance entry made by a supervisor. Always takes precedence over
/// device data for the same employee and day.
#[derive(Debug, Clone, Serialize)]
pub struct SupervisorRecord {
    pub id: i64,
    pub supervisor_id: i64,
    pub employee_id: i64,
    pub date: NaiveDate,
    /// Job number; empty means "not specified".
    pub project: String,
    /// Cost-centre code within the job; empty means "not specified".
    pub wbs: String,
    pub clockin: Option<NaiveDateTime>,
    pub clockout: Option<NaiveDateTime>,
}
