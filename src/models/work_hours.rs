use serde::Serialize;

/// Expected working window for one weekday.
///
/// `start`/`finish` are "HH:MM" (or "HH:MM:SS") clock times as stored in the
/// schedule tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkHourDefinition {
    pub start: String,
    pub finish: String,
    pub break_minutes: i32,
}

impl WorkHourDefinition {
    pub fn new(start: &str, finish: &str, break_minutes: i32) -> Self {
        Self {
            start: start.to_string(),
            finish: finish.to_string(),
            break_minutes,
        }
    }
}

/// Who a schedule row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleOwner {
    Employee(i64),
    Region(i64),
}

/// One schedule row: owner + weekday (0 = Sunday … 6 = Saturday).
#[derive(Debug, Clone)]
pub struct WorkHourRow {
    pub owner: ScheduleOwner,
    pub day_of_week: u32,
    pub definition: WorkHourDefinition,
}
