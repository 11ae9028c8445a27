use crate::types::Urgency;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Days from the run's anchor time to the planned completion of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleOffsets {
    pub urgent: i64,
    pub high_priority: i64,
    pub normal: i64,
}

impl Default for ScheduleOffsets {
    fn default() -> Self {
        Self {
            urgent: 2,
            high_priority: 7,
            normal: 14,
        }
    }
}

impl ScheduleOffsets {
    pub fn days(&self, urgency: Urgency) -> i64 {
        match urgency {
            Urgency::Urgent => self.urgent,
            Urgency::HighPriority => self.high_priority,
            Urgency::Normal => self.normal,
        }
    }
}

/// Planned-completion calculator anchored at one instant for a whole run.
#[derive(Debug, Clone, Copy)]
pub struct CompletionScheduler {
    now: NaiveDateTime,
    offsets: ScheduleOffsets,
}

impl CompletionScheduler {
    pub fn new(now: NaiveDateTime, offsets: ScheduleOffsets) -> Self {
        Self { now, offsets }
    }

    pub fn planned_completion(&self, urgency: Urgency) -> NaiveDateTime {
        self.now + Duration::days(self.offsets.days(urgency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_offsets_by_urgency() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let s = CompletionScheduler::new(now, ScheduleOffsets::default());
        assert_eq!(s.planned_completion(Urgency::Urgent), now + Duration::days(2));
        assert_eq!(s.planned_completion(Urgency::HighPriority), now + Duration::days(7));
        assert_eq!(s.planned_completion(Urgency::Normal), now + Duration::days(14));
        assert_eq!(
            s.planned_completion(Urgency::Normal).date(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
    }
}
