/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

pub const GREY: &str = "\x1b[90m";
pub const WHITE: &str = "\x1b[37m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const MAGENTA: &str = "\x1b[35m";

/// Color of an operation name in the internal log.
pub fn color_for_operation(op: &str) -> &'static str {
    match op {
        "reconcile" => GREEN,
        "reconcile_failed" => RED,
        "approve" => YELLOW,
        "export" => BLUE,
        "migration_applied" | "init" => MAGENTA,
        _ => WHITE,
    }
}

/// Returns formatted grey text for placeholder values ("", "--:--").
pub fn colorize_optional(value: &str) -> String {
    if value.trim().is_empty() || value.trim() == "--:--" {
        format!("{GREY}{value}{RESET}")
    } else {
        value.to_string()
    }
}

/// Review column: red when review is required, grey dash otherwise.
pub fn colorize_review(required: bool) -> String {
    if required {
        format!("{RED}required{RESET}")
    } else {
        format!("{GREY}-{RESET}")
    }
}

/// Approval column.
pub fn colorize_approved(approved: bool) -> String {
    if approved {
        format!("{GREEN}yes{RESET}")
    } else {
        format!("{GREY}no{RESET}")
    }
}
