use crate::errors::{AppError, AppResult};
use serde::Serialize;

/// Whether a resolved timesheet needs a human to look at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ReviewStatus {
    #[default]
    #[serde(rename = "")]
    Clear,
    #[serde(rename = "required")]
    Required,
}

impl ReviewStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ReviewStatus::Clear => "",
            ReviewStatus::Required => "required",
        }
    }

    pub fn from_db_str(s: &str) -> AppResult<Self> {
        match s {
            "" => Ok(ReviewStatus::Clear),
            "required" => Ok(ReviewStatus::Required),
            other => Err(AppError::InvalidReviewStatus(other.to_string())),
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, ReviewStatus::Required)
    }
}
