//! Groups raw device events per badge tag and derives one
//! (earliest, latest) pair per group.

use crate::models::clock_event::ClockEvent;
use crate::utils::time::parse_device_timestamp;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct RecordGroup {
    pub tag: String,
    /// Member events, ordered by site-local timestamp (unparseable ones last).
    pub events: Vec<ClockEvent>,
    /// Parsed timestamps of the usable members, same order as `events`.
    usable: Vec<NaiveDateTime>,
}

impl RecordGroup {
    pub fn event_ids(&self) -> Vec<String> {
        self.events.iter().map(|e| e.id.clone()).collect()
    }

    /// Earliest usable timestamp, when the group holds a full pair.
    pub fn clock_in(&self) -> Option<NaiveDateTime> {
        if self.is_complete() {
            self.usable.first().copied()
        } else {
            None
        }
    }

    /// Latest usable timestamp, when the group holds a full pair.
    pub fn clock_out(&self) -> Option<NaiveDateTime> {
        if self.is_complete() {
            self.usable.last().copied()
        } else {
            None
        }
    }

    /// At least two usable boundary values.
    pub fn is_complete(&self) -> bool {
        self.usable.len() >= 2
    }
}

/// Group `events` by tag. Output is sorted by tag so runs are reproducible.
pub fn group_records(events: &[ClockEvent], utc_offset_minutes: i32) -> Vec<RecordGroup> {
    let mut by_tag: BTreeMap<&str, Vec<(Option<NaiveDateTime>, &ClockEvent)>> = BTreeMap::new();

    for ev in events {
        let ts = parse_device_timestamp(&ev.timestamp, utc_offset_minutes);
        by_tag.entry(ev.tag.as_str()).or_default().push((ts, ev));
    }

    by_tag
        .into_iter()
        .map(|(tag, mut members)| {
            // None sorts before Some; push unparseable values to the end instead
            members.sort_by(|(ta, a), (tb, b)| match (ta, tb) {
                (Some(x), Some(y)) => x.cmp(y).then_with(|| a.id.cmp(&b.id)),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.id.cmp(&b.id),
            });

            RecordGroup {
                tag: tag.to_string(),
                usable: members.iter().filter_map(|(ts, _)| *ts).collect(),
                events: members.into_iter().map(|(_, ev)| ev.clone()).collect(),
            }
        })
        .collect()
}
