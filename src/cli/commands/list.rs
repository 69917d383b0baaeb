use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::pool::DbPool;
use crate::db::queries::{load_employees, load_timesheets_between};
use crate::errors::AppResult;
use crate::utils::colors::{colorize_approved, colorize_optional, colorize_review};
use crate::utils::date::{current_month_bounds, period_bounds};
use crate::utils::table::{Column, Table};
use crate::utils::time::{format_clock, format_hours};
use std::collections::HashMap;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List {
        period,
        review,
        employee,
    } = cmd
    {
        let pool = DbPool::new(&cfg.database)?;

        let (start, end) = match period {
            Some(p) => period_bounds(p)?,
            None => current_month_bounds(),
        };

        let timesheets = load_timesheets_between(&pool.conn, &start, &end, *review, *employee)?;
        if timesheets.is_empty() {
            println!("No timesheets between {} and {}", start, end);
            return Ok(());
        }

        let names: HashMap<i64, String> = load_employees(&pool.conn)?
            .into_iter()
            .map(|e| (e.employee_id, e.name))
            .collect();

        let mut table = Table::new(vec![
            Column::left("DATE"),
            Column::right("EMP"),
            Column::left("NAME"),
            Column::left("START"),
            Column::left("FINISH"),
            Column::right("BREAK"),
            Column::right("HOURS"),
            Column::right("JOB"),
            Column::right("CC"),
            Column::left("REVIEW"),
            Column::left("APPROVED"),
        ]);

        let mut total = 0.0;
        for ts in &timesheets {
            total += ts.hours;
            table.add_row(vec![
                ts.date.to_string(),
                ts.employee_id.to_string(),
                names.get(&ts.employee_id).cloned().unwrap_or_default(),
                colorize_optional(&format_clock(ts.start_time)),
                colorize_optional(&format_clock(ts.finish_time)),
                ts.break_minutes.map(|b| b.to_string()).unwrap_or_default(),
                format_hours(ts.hours),
                ts.project_id.map(|j| j.to_string()).unwrap_or_default(),
                ts.cost_centre_id.map(|c| c.to_string()).unwrap_or_default(),
                colorize_review(ts.review_status.is_required()),
                colorize_approved(ts.approved),
            ]);
        }

        println!("🗓️  Timesheets {} → {}\n", start, end);
        print!("{}", table.render());
        println!(
            "\n{} timesheet(s), {} hours",
            timesheets.len(),
            format_hours(total)
        );
    }
    Ok(())
}
