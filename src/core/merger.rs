//! Combines supervisor overrides and device-derived entries into one
//! provisional timesheet per employee.

use crate::core::grouper::RecordGroup;
use crate::core::reference::ReferenceData;
use crate::core::report::{GroupIssue, IssueKind, Note, StatusBuckets};
use crate::core::schedule::WorkScheduleResolver;
use crate::models::employee::Employee;
use crate::models::process_status::ProcessStatus;
use crate::models::supervisor_record::SupervisorRecord;
use crate::models::timesheet::ResolvedTimesheet;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct MergeOutcome {
    /// employee id → provisional entry
    pub entries: BTreeMap<i64, ResolvedTimesheet>,
    pub statuses: StatusBuckets,
    pub issues: Vec<GroupIssue>,
    pub notes: Vec<Note>,
}

pub struct PrecedenceMerger<'a> {
    reference: &'a ReferenceData,
    schedules: WorkScheduleResolver<'a>,
    date: NaiveDate,
}

impl<'a> PrecedenceMerger<'a> {
    pub fn new(reference: &'a ReferenceData, date: NaiveDate) -> Self {
        Self {
            reference,
            schedules: WorkScheduleResolver::new(reference),
            date,
        }
    }

    pub fn merge(&self, supervisor: &[SupervisorRecord], groups: &[RecordGroup]) -> MergeOutcome {
        let mut out = MergeOutcome::default();

        // Latest record wins: fold in ascending id order.
        let mut ordered: Vec<&SupervisorRecord> = supervisor.iter().collect();
        ordered.sort_by_key(|r| r.id);

        for rec in ordered {
            let Some(emp) = self.reference.employee(rec.employee_id) else {
                warn!(
                    record = rec.id,
                    employee = rec.employee_id,
                    "supervisor record for unknown employee ignored"
                );
                out.notes.push(Note::UnknownEmployee {
                    record_id: rec.id,
                    employee_id: rec.employee_id,
                });
                continue;
            };
            self.apply_supervisor_record(rec, emp, &mut out.entries);
        }

        for group in groups {
            self.apply_device_group(group, &mut out);
        }

        out
    }

    fn new_entry(&self, emp: &Employee) -> ResolvedTimesheet {
        let mut ts = ResolvedTimesheet::new(emp.employee_id, self.date);
        ts.break_minutes = self.schedules.break_minutes(emp, self.date);
        ts
    }

    fn apply_supervisor_record(
        &self,
        rec: &SupervisorRecord,
        emp: &Employee,
        entries: &mut BTreeMap<i64, ResolvedTimesheet>,
    ) {
        let exists = entries.contains_key(&emp.employee_id);
        let ts = entries
            .entry(emp.employee_id)
            .or_insert_with(|| self.new_entry(emp));

        match (rec.clockin, rec.clockout) {
            (Some(start), Some(finish)) => {
                ts.start_time = Some(start);
                ts.finish_time = Some(finish);
                ts.recompute_hours();
            }
            _ if !exists => {
                // Brand-new entry without times: assume the scheduled day.
                if let Some(window) = self.schedules.window(emp, self.date) {
                    ts.start_time = Some(window.start);
                    ts.finish_time = Some(window.finish);
                }
                ts.recompute_hours();
            }
            _ => {}
        }

        if !rec.project.is_empty() {
            match self.reference.job_by_no(&rec.project) {
                Some(job) => ts.project_id = Some(job.job_id),
                None => debug!(record = rec.id, project = %rec.project, "unknown job number"),
            }
        } else if !exists {
            ts.project_id = emp.job_id;
        }

        if !rec.wbs.is_empty() {
            let cc = ts
                .project_id
                .and_then(|job| self.reference.cost_centre_for_job(job, &rec.wbs));
            match cc {
                Some(cc) => ts.cost_centre_id = Some(cc.cost_centre_id),
                None => debug!(record = rec.id, wbs = %rec.wbs, "wbs not valid for job"),
            }
        } else if !exists {
            ts.cost_centre_id = emp.cost_centre_id;
        }
    }

    fn apply_device_group(&self, group: &RecordGroup, out: &mut MergeOutcome) {
        let ids = group.event_ids();

        let Some(emp) = self.reference.employee_by_tag(&group.tag) else {
            warn!(tag = %group.tag, events = ids.len(), "no employee found for tag");
            self.reject(group, IssueKind::UnknownTag, ids, out);
            return;
        };

        if out.entries.contains_key(&emp.employee_id) {
            debug!(tag = %group.tag, employee = emp.employee_id, "supervisor record takes precedence");
            out.statuses.push(ProcessStatus::Skipped, ids);
            return;
        }

        let (Some(start), Some(finish)) = (group.clock_in(), group.clock_out()) else {
            warn!(tag = %group.tag, events = ids.len(), "incomplete clock-in pair");
            self.reject(group, IssueKind::IncompleteClockPair, ids, out);
            return;
        };

        let mut ts = self.new_entry(emp);
        ts.start_time = Some(start);
        ts.finish_time = Some(finish);
        ts.recompute_hours();
        ts.project_id = emp.job_id;
        ts.cost_centre_id = emp.cost_centre_id;

        out.entries.insert(emp.employee_id, ts);
        out.statuses.push(ProcessStatus::Processed, ids);
    }

    fn reject(&self, group: &RecordGroup, kind: IssueKind, ids: Vec<String>, out: &mut MergeOutcome) {
        out.issues.push(GroupIssue {
            kind,
            tag: group.tag.clone(),
            event_ids: ids.clone(),
        });
        out.statuses.push(ProcessStatus::Error, ids);
    }
}
