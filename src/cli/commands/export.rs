use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::export::ExportLogic;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        range,
        force,
    } = cmd
    {
        let pool = DbPool::new(&cfg.database)?;
        let rows = ExportLogic::export(&pool, *format, file, range, *force)?;

        if rows > 0
            && let Err(e) = ttlog(
                &pool.conn,
                "export",
                format.as_str(),
                &format!("{rows} timesheet(s) exported to {file}"),
            )
        {
            eprintln!("⚠️ Failed to write internal log: {}", e);
        }
    }
    Ok(())
}
