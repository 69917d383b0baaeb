use crate::core::reference::ReferenceData;
use crate::db::pool::DbPool;
use crate::db::queries::{
    load_cost_centres, load_employees, load_job_cost_centres, load_jobs, load_timesheets_between,
};
use crate::errors::{AppError, AppResult};
use crate::export::ExportFormat;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::TimesheetExport;
use crate::export::xlsx::export_xlsx;
use crate::ui::messages::warning;
use crate::utils::date::period_bounds;
use chrono::NaiveDate;
use std::path::Path;
use tracing::info;

/// High level export of resolved timesheets.
pub struct ExportLogic;

impl ExportLogic {
    /// Export the timesheets of `range` (`None` or `"all"` for everything)
    /// to `file`, which must be an absolute path.
    ///
    /// Returns the number of exported rows.
    pub fn export(
        pool: &DbPool,
        format: ExportFormat,
        file: &str,
        range: &Option<String>,
        force: bool,
    ) -> AppResult<usize> {
        let path = Path::new(file);

        if !path.is_absolute() {
            return Err(AppError::Export(format!(
                "Output file path must be absolute: {file}"
            )));
        }

        let (start, end) = match range {
            None => all_dates()?,
            Some(r) if r.eq_ignore_ascii_case("all") => all_dates()?,
            Some(r) => period_bounds(r)?,
        };

        let rows = load_rows(pool, start, end)?;
        if rows.is_empty() {
            warning("No timesheets found for selected range.");
            return Ok(0);
        }

        ensure_writable(path, force)?;

        match format {
            ExportFormat::Csv => export_csv(&rows, path)?,
            ExportFormat::Json => export_json(&rows, path)?,
            ExportFormat::Xlsx => export_xlsx(&rows, path)?,
        }

        info!(format = format.as_str(), rows = rows.len(), file, "timesheets exported");
        Ok(rows.len())
    }
}

/// Bounds that cover every stored (four digit year) date.
fn all_dates() -> AppResult<(NaiveDate, NaiveDate)> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .zip(NaiveDate::from_ymd_opt(9999, 12, 31))
        .ok_or_else(|| AppError::Other("invalid export bounds".to_string()))
}

fn load_rows(pool: &DbPool, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<TimesheetExport>> {
    let conn = &pool.conn;

    let reference = ReferenceData::new(
        load_employees(conn)?,
        load_jobs(conn)?,
        load_cost_centres(conn)?,
        load_job_cost_centres(conn)?,
        Vec::new(),
    );

    Ok(load_timesheets_between(conn, &start, &end, false, None)?
        .iter()
        .map(|ts| TimesheetExport::from_timesheet(ts, &reference))
        .collect())
}
