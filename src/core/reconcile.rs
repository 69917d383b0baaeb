//! Reconciliation orchestrator: runs the prepare pipeline one date at a time.
//!
//! FetchReference happens once per run; every date then goes through
//! FetchRecords → GroupAndMerge → Snap → DeductBreaks → Classify → Persist →
//! UpdateStatuses on its own. A failing date is reported and the run moves on.

use crate::config::Config;
use crate::core::breaks::BreakAccountant;
use crate::core::grouper::group_records;
use crate::core::merger::PrecedenceMerger;
use crate::core::reference::ReferenceData;
use crate::core::report::{DateReport, Note, Stage};
use crate::core::review::ReviewClassifier;
use crate::core::snapping::SnappingEngine;
use crate::core::store::{RecordFilter, TimesheetStore};
use crate::errors::{AppError, AppResult};
use crate::models::timesheet::ResolvedTimesheet;
use crate::utils::date::dates_between;
use chrono::NaiveDate;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub filter: RecordFilter,
    /// Run every stage but leave the store untouched.
    pub dry_run: bool,
}

impl ReconcileOptions {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            filter: RecordFilter::default(),
            dry_run: false,
        }
    }

    pub fn single_day(date: NaiveDate) -> Self {
        Self::new(date, date)
    }
}

pub struct Reconciler {
    snapping: SnappingEngine,
    epsilon_hours: f64,
    utc_offset_minutes: i32,
    cancel: Option<Arc<AtomicBool>>,
}

impl Reconciler {
    pub fn new(cfg: &Config) -> Self {
        Self {
            snapping: SnappingEngine::new(cfg.snap),
            epsilon_hours: cfg.review_epsilon_hours,
            utc_offset_minutes: cfg.device_utc_offset_minutes,
            cancel: None,
        }
    }

    /// Dates not yet started when `flag` becomes `true` are not run.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Reconcile every date of `opts`.
    ///
    /// Fails only when the reference data cannot be loaded; per-date
    /// failures are carried in the returned reports.
    pub fn reconcile<S: TimesheetStore>(
        &self,
        store: &mut S,
        opts: &ReconcileOptions,
    ) -> AppResult<Vec<DateReport>> {
        if opts.start > opts.end {
            return Err(AppError::InvalidRange {
                start: opts.start,
                end: opts.end,
            });
        }

        info!(stage = %Stage::FetchReference, "fetching reference data");
        let reference = store
            .load_reference()
            .map_err(|e| AppError::ReferenceDataUnavailable(e.to_string()))?;
        info!(employees = reference.employees.len(), "reference data loaded");

        let tags = device_tags(&reference, &opts.filter);

        let mut reports = Vec::new();
        for date in dates_between(opts.start, opts.end) {
            if self.cancelled() {
                warn!(%date, "run cancelled before date started");
                break;
            }
            reports.push(self.reconcile_date(store, &reference, date, opts, tags.as_deref()));
        }

        Ok(reports)
    }

    /// Run the pipeline for a single date against an already loaded snapshot.
    ///
    /// When `failure` is set on the returned report nothing was committed for
    /// the date; the status buckets then describe what would have been written.
    pub fn reconcile_date<S: TimesheetStore>(
        &self,
        store: &mut S,
        reference: &ReferenceData,
        date: NaiveDate,
        opts: &ReconcileOptions,
        device_tags: Option<&[String]>,
    ) -> DateReport {
        let mut report = DateReport::new(date);

        if let Err((stage, e)) = self.run_pipeline(store, reference, date, opts, device_tags, &mut report) {
            warn!(%date, %stage, error = %e, "date aborted");
            report.created = 0;
            report.updated = 0;
            report.failure = Some((stage, e));
        }

        report
    }

    fn run_pipeline<S: TimesheetStore>(
        &self,
        store: &mut S,
        reference: &ReferenceData,
        date: NaiveDate,
        opts: &ReconcileOptions,
        device_tags: Option<&[String]>,
        report: &mut DateReport,
    ) -> Result<(), (Stage, AppError)> {
        info!(%date, stage = %Stage::FetchRecords, "fetching records");
        let records = store
            .fetch_records(date, &opts.filter, device_tags)
            .map_err(|e| {
                (
                    Stage::FetchRecords,
                    AppError::RecordFetchFailed {
                        date,
                        reason: e.to_string(),
                    },
                )
            })?;
        debug!(
            %date,
            supervisor = records.supervisor.len(),
            events = records.events.len(),
            "records fetched"
        );

        debug!(%date, stage = %Stage::GroupAndMerge, "grouping device events");
        let groups = group_records(&records.events, self.utc_offset_minutes);
        let merged = PrecedenceMerger::new(reference, date).merge(&records.supervisor, &groups);
        let mut entries = merged.entries;
        report.statuses = merged.statuses;
        report.issues = merged.issues;
        report.notes = merged.notes;

        debug!(%date, stage = %Stage::Snap, entries = entries.len(), "snapping to schedule");
        self.snapping.apply(&mut entries, reference);
        debug!(%date, stage = %Stage::DeductBreaks, "deducting breaks");
        BreakAccountant::apply(&mut entries);
        debug!(%date, stage = %Stage::Classify, "classifying");
        let notes = ReviewClassifier::new(reference, self.epsilon_hours).apply(&mut entries);
        report.notes.extend(notes);

        let timesheets: Vec<ResolvedTimesheet> = entries.into_values().collect();
        report.review_required = timesheets
            .iter()
            .filter(|t| t.review_status.is_required())
            .count();

        if opts.dry_run {
            info!(%date, timesheets = timesheets.len(), "dry run: nothing persisted");
            return Ok(());
        }

        info!(
            %date,
            stage = %Stage::Persist,
            timesheets = timesheets.len(),
            processed = report.statuses.processed.len(),
            skipped = report.statuses.skipped.len(),
            errors = report.statuses.errors.len(),
            "saving timesheets and updating statuses"
        );
        let summary = store
            .commit_date(date, &timesheets, &report.statuses)
            .map_err(|e| {
                let stage = match e {
                    AppError::StatusUpdateFailed(_) => Stage::UpdateStatuses,
                    _ => Stage::Persist,
                };
                (
                    stage,
                    AppError::PersistenceFailed {
                        date,
                        reason: e.to_string(),
                    },
                )
            })?;

        report.created = summary.created;
        report.updated = summary.updated;
        for employee_id in summary.approved_kept {
            warn!(%date, employee_id, "approved timesheet differs from reconciled result, left unchanged");
            report.notes.push(Note::ApprovedKept { employee_id });
        }
        info!(%date, stage = %Stage::Done, created = summary.created, updated = summary.updated, "date reconciled");
        Ok(())
    }
}

/// Device tags allowed by `filter`, or `None` when the filter is open.
pub fn device_tags(reference: &ReferenceData, filter: &RecordFilter) -> Option<Vec<String>> {
    if !filter.is_restricted() {
        return None;
    }

    let tags = reference
        .employees
        .iter()
        .filter(|e| filter.employees.is_empty() || filter.employees.contains(&e.employee_id))
        .filter(|e| {
            filter.supervisors.is_empty()
                || e.reports_to_id
                    .is_some_and(|s| filter.supervisors.contains(&s))
        })
        .filter(|e| !e.tag.is_empty())
        .map(|e| e.tag.clone())
        .collect();

    Some(tags)
}
