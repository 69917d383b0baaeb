pub mod breaks;
pub mod grouper;
pub mod merger;
pub mod reconcile;
pub mod reference;
pub mod report;
pub mod review;
pub mod schedule;
pub mod snapping;
pub mod store;

pub use reconcile::{ReconcileOptions, Reconciler};
pub use store::{RecordFilter, TimesheetStore};
