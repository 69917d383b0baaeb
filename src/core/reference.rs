//! Immutable reference snapshot shared by every date of a reconciliation run.

use crate::models::employee::{CostCentre, Employee, Job, JobCostCentre};
use crate::models::work_hours::{ScheduleOwner, WorkHourDefinition, WorkHourRow};
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct ReferenceData {
    pub employees: Vec<Employee>,
    by_id: HashMap<i64, usize>,
    by_tag: HashMap<String, usize>,
    jobs_by_no: HashMap<String, Job>,
    job_no_by_id: HashMap<i64, String>,
    cost_centres: HashMap<i64, CostCentre>,
    /// job id → cost-centre code → cost centre
    job_cost_centres: HashMap<i64, HashMap<String, CostCentre>>,
    employee_hours: HashMap<(i64, u32), WorkHourDefinition>,
    region_hours: HashMap<(i64, u32), WorkHourDefinition>,
}

impl ReferenceData {
    pub fn new(
        employees: Vec<Employee>,
        jobs: Vec<Job>,
        cost_centres: Vec<CostCentre>,
        links: Vec<JobCostCentre>,
        work_hours: Vec<WorkHourRow>,
    ) -> Self {
        let mut by_id = HashMap::new();
        let mut by_tag = HashMap::new();
        for (idx, e) in employees.iter().enumerate() {
            by_id.insert(e.employee_id, idx);
            if !e.tag.is_empty() {
                by_tag.insert(e.tag.clone(), idx);
            }
        }

        let job_no_by_id = jobs.iter().map(|j| (j.job_id, j.job_no.clone())).collect();
        let jobs_by_no = jobs.into_iter().map(|j| (j.job_no.clone(), j)).collect();

        let cc_by_id: HashMap<i64, CostCentre> = cost_centres
            .into_iter()
            .map(|cc| (cc.cost_centre_id, cc))
            .collect();

        let mut job_cost_centres: HashMap<i64, HashMap<String, CostCentre>> = HashMap::new();
        for link in links {
            let Some(cc) = cc_by_id.get(&link.cost_centre_id) else {
                continue;
            };
            job_cost_centres
                .entry(link.job_id)
                .or_default()
                .insert(cc.code.clone(), cc.clone());
        }

        let mut employee_hours = HashMap::new();
        let mut region_hours = HashMap::new();
        for row in work_hours {
            match row.owner {
                ScheduleOwner::Employee(id) => {
                    employee_hours.insert((id, row.day_of_week), row.definition);
                }
                ScheduleOwner::Region(id) => {
                    region_hours.insert((id, row.day_of_week), row.definition);
                }
            }
        }

        Self {
            employees,
            by_id,
            by_tag,
            jobs_by_no,
            job_no_by_id,
            cost_centres: cc_by_id,
            job_cost_centres,
            employee_hours,
            region_hours,
        }
    }

    pub fn employee(&self, employee_id: i64) -> Option<&Employee> {
        self.by_id.get(&employee_id).map(|&i| &self.employees[i])
    }

    pub fn employee_by_tag(&self, tag: &str) -> Option<&Employee> {
        self.by_tag.get(tag).map(|&i| &self.employees[i])
    }

    pub fn job_by_no(&self, job_no: &str) -> Option<&Job> {
        self.jobs_by_no.get(job_no)
    }

    pub fn job(&self, job_id: i64) -> Option<&Job> {
        self.job_no_by_id
            .get(&job_id)
            .and_then(|no| self.jobs_by_no.get(no))
    }

    pub fn cost_centre(&self, cost_centre_id: i64) -> Option<&CostCentre> {
        self.cost_centres.get(&cost_centre_id)
    }

    /// Cost centre `code` if it is valid for `job_id`.
    pub fn cost_centre_for_job(&self, job_id: i64, code: &str) -> Option<&CostCentre> {
        self.job_cost_centres.get(&job_id)?.get(code)
    }

    pub fn employee_schedule(&self, employee_id: i64, weekday: u32) -> Option<&WorkHourDefinition> {
        self.employee_hours.get(&(employee_id, weekday))
    }

    pub fn region_schedule(&self, region_id: i64, weekday: u32) -> Option<&WorkHourDefinition> {
        self.region_hours.get(&(region_id, weekday))
    }
}
