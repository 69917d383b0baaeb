use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::set_approved;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use crate::utils::date::parse_date_arg;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Approve {
        employee,
        date,
        revoke,
    } = cmd
    {
        let date = parse_date_arg(date)?;
        let pool = DbPool::new(&cfg.database)?;

        let approved = !*revoke;
        if !set_approved(&pool.conn, *employee, &date, approved)? {
            return Err(AppError::TimesheetNotFound {
                employee_id: *employee,
                date,
            });
        }

        let msg = if approved {
            format!("Timesheet of employee {} on {} approved", employee, date)
        } else {
            format!("Approval revoked for employee {} on {}", employee, date)
        };

        if let Err(e) = ttlog(&pool.conn, "approve", &format!("{employee}@{date}"), &msg) {
            eprintln!("⚠️ Failed to write internal log: {}", e);
        }
        success(msg);
    }
    Ok(())
}
