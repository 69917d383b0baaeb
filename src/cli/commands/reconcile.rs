use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::report::{DateReport, Note};
use crate::core::{ReconcileOptions, Reconciler, RecordFilter};
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::store::SqliteStore;
use crate::errors::AppResult;
use crate::ui::messages::{error, header, info, success, warning};
use crate::utils::date::parse_date_arg;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Reconcile {
        from,
        to,
        supervisors,
        employees,
        pending_only,
        dry_run,
    } = cmd
    {
        let start = parse_date_arg(from)?;
        let end = match to {
            Some(t) => parse_date_arg(t)?,
            None => start,
        };

        let mut opts = ReconcileOptions::new(start, end);
        opts.filter = RecordFilter {
            supervisors: supervisors.clone(),
            employees: employees.clone(),
            pending_only: *pending_only,
        };
        opts.dry_run = *dry_run;

        let mut pool = DbPool::new(&cfg.database)?;
        let reports = {
            let mut store = SqliteStore::new(&mut pool.conn);
            Reconciler::new(cfg).reconcile(&mut store, &opts)?
        };

        header(if *dry_run {
            "Reconciliation (dry run)"
        } else {
            "Reconciliation"
        });

        for report in &reports {
            print_report(report);

            if !*dry_run
                && let Err(e) = ttlog(
                    &pool.conn,
                    log_operation(report),
                    &report.date.to_string(),
                    &summary_line(report),
                )
            {
                eprintln!("⚠️ Failed to write internal log: {}", e);
            }
        }

        let failed = reports.iter().filter(|r| !r.is_success()).count();
        if failed == 0 {
            success(format!("{} date(s) reconciled", reports.len()));
        } else {
            warning(format!(
                "{} date(s) reconciled, {} failed",
                reports.len() - failed,
                failed
            ));
        }
    }

    Ok(())
}

fn log_operation(report: &DateReport) -> &'static str {
    if report.is_success() {
        "reconcile"
    } else {
        "reconcile_failed"
    }
}

fn summary_line(report: &DateReport) -> String {
    format!(
        "created={} updated={} processed={} skipped={} errors={} review={}",
        report.created,
        report.updated,
        report.statuses.processed.len(),
        report.statuses.skipped.len(),
        report.statuses.errors.len(),
        report.review_required
    )
}

fn print_report(report: &DateReport) {
    if let Some((stage, e)) = &report.failure {
        error(format!("{}: failed at {}: {}", report.date, stage, e));
        return;
    }

    println!("📅 {}  {}", report.date, summary_line(report));

    for issue in &report.issues {
        warning(format!(
            "   {} for tag '{}' ({} event(s))",
            issue.kind,
            issue.tag,
            issue.event_ids.len()
        ));
    }

    for note in &report.notes {
        match note {
            Note::ScheduleMissing { employee_id } => {
                info(format!("   no schedule for employee {employee_id}"))
            }
            Note::UnknownEmployee {
                record_id,
                employee_id,
            } => info(format!(
                "   supervisor record {record_id} names unknown employee {employee_id}"
            )),
            Note::ApprovedKept { employee_id } => warning(format!(
                "   approved timesheet of employee {employee_id} left unchanged"
            )),
        }
    }
}
