use super::process_status::ProcessStatus;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    In,
    Out,
}

impl EventKind {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            EventKind::In => "in",
            EventKind::Out => "out",
        }
    }

    /// Convert DB string → enum (device payloads are not consistent about case)
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "in" => Some(EventKind::In),
            "out" => Some(EventKind::Out),
            _ => None,
        }
    }
}

/// A raw signal pushed by an unmanned clock-in device.
#[derive(Debug, Clone, Serialize)]
pub struct ClockEvent {
    pub id: String,
    pub tag: String,            // ⇔ clock_events.tag (badge identifier)
    pub date: NaiveDate,        // ⇔ clock_events.date (site-local day)
    pub timestamp: String,      // ⇔ clock_events.timestamp (ISO-8601, as sent by the device)
    pub kind: EventKind,        // ⇔ clock_events.kind ('in' | 'out')
    pub device_id: String,      // ⇔ clock_events.device_id
    pub process_status: ProcessStatus,
}

impl ClockEvent {
    pub fn new(id: &str, tag: &str, date: NaiveDate, timestamp: &str, kind: EventKind) -> Self {
        Self {
            id: id.to_string(),
            tag: tag.to_string(),
            date,
            timestamp: timestamp.to_string(),
            kind,
            device_id: String::new(),
            process_status: ProcessStatus::Pending,
        }
    }
}
