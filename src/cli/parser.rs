use crate::export::ExportFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for rTimesheet
/// CLI application to reconcile attendance records into timesheets
#[derive(Parser)]
#[command(
    name = "rtimesheet",
    version = env!("CARGO_PKG_VERSION"),
    about = "Reconcile clock device events and supervisor entries into daily timesheets",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Show the configuration
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,
    },

    /// Print or manage the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Reconcile raw attendance records into timesheets
    Reconcile {
        /// First date to reconcile (YYYY-MM-DD)
        #[arg(long = "from")]
        from: String,

        /// Last date to reconcile (YYYY-MM-DD); defaults to --from
        #[arg(long = "to")]
        to: Option<String>,

        #[arg(
            long = "supervisor",
            value_name = "ID",
            help = "Only records of employees reporting to this supervisor (repeatable)"
        )]
        supervisors: Vec<i64>,

        #[arg(
            long = "employee",
            value_name = "ID",
            help = "Only records of this employee (repeatable)"
        )]
        employees: Vec<i64>,

        #[arg(long = "pending-only", help = "Skip device events already processed")]
        pending_only: bool,

        #[arg(long = "dry-run", help = "Run every stage but do not save anything")]
        dry_run: bool,
    },

    /// List resolved timesheets
    List {
        #[arg(long, short, help = "Filter by year/month/day or a custom range")]
        period: Option<String>,

        #[arg(long = "review", help = "Only timesheets flagged for review")]
        review: bool,

        #[arg(long = "employee", value_name = "ID")]
        employee: Option<i64>,
    },

    /// Approve (or revoke approval of) a timesheet
    Approve {
        #[arg(long = "employee", value_name = "ID")]
        employee: i64,

        /// Date of the timesheet (YYYY-MM-DD)
        #[arg(long = "date")]
        date: String,

        #[arg(long = "revoke", help = "Clear the approval flag")]
        revoke: bool,
    },

    /// Export resolved timesheets
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(
            long,
            value_name = "RANGE",
            help = "Filter export by year/month/day or a custom range"
        )]
        range: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },
}
