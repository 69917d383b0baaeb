pub mod clock_event;
pub mod employee;
pub mod process_status;
pub mod review_status;
pub mod supervisor_record;
pub mod timesheet;
pub mod work_hours;
