//! Scheduled break deduction.

use crate::models::timesheet::ResolvedTimesheet;
use std::collections::BTreeMap;

/// Hours left after taking `break_minutes` off `hours`.
///
/// The break only comes off when the day is longer than the break itself.
pub fn deduct_break(hours: f64, break_minutes: i32) -> f64 {
    if break_minutes <= 0 {
        return hours;
    }
    let break_hours = break_minutes as f64 / 60.0;
    if hours > break_hours {
        hours - break_hours
    } else {
        hours
    }
}

pub struct BreakAccountant;

impl BreakAccountant {
    pub fn apply(entries: &mut BTreeMap<i64, ResolvedTimesheet>) {
        for ts in entries.values_mut() {
            Self::apply_one(ts);
        }
    }

    pub fn apply_one(ts: &mut ResolvedTimesheet) {
        if ts.break_deducted {
            return;
        }
        let Some(b) = ts.break_minutes else {
            return;
        };
        let after = deduct_break(ts.hours, b);
        if after < ts.hours {
            ts.hours = after;
            ts.break_deducted = true;
        }
    }
}
