use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::load_log;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::colors::{RESET, color_for_operation};

const OP_WIDTH_MAX: usize = 40;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if matches!(cmd, Commands::Log { print: true }) {
        let pool = DbPool::new(&cfg.database)?;
        let entries = load_log(&pool.conn)?;

        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let rows: Vec<(String, String, &str, &str)> = entries
            .iter()
            .map(|(date, op, target, message)| {
                let date = chrono::DateTime::parse_from_rfc3339(date)
                    .map(|dt| dt.format("%FT%T%:z").to_string())
                    .unwrap_or_else(|_| date.clone());
                let op_target = if target.is_empty() {
                    op.clone()
                } else {
                    format!("{op} ({target})")
                };
                (date, op_target, op.as_str(), message.as_str())
            })
            .collect();

        let date_w = rows.iter().map(|r| r.0.len()).max().unwrap_or(10);
        let op_w = rows
            .iter()
            .map(|r| r.1.chars().count())
            .max()
            .unwrap_or(10)
            .min(OP_WIDTH_MAX);

        println!("📜 Internal log:\n");
        for (date, op_target, op, message) in rows {
            let visible: String = if op_target.chars().count() > OP_WIDTH_MAX {
                let mut s: String = op_target.chars().take(OP_WIDTH_MAX - 3).collect();
                s.push_str("...");
                s
            } else {
                op_target
            };
            let padding = " ".repeat(op_w.saturating_sub(visible.chars().count()));

            println!(
                "{:<date_w$} | {}{}{}{} => {}",
                date,
                color_for_operation(op),
                visible,
                RESET,
                padding,
                message,
                date_w = date_w
            );
        }
    }

    Ok(())
}
