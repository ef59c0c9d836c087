use chrono::NaiveDate;
use shared::time::TimeOfDay;
use shared::types::Shift;

use crate::domain::calendar::Calendar;

/// A slot whose post-solve coverage fell below the requirement.
///
/// Diagnostic only: relaxed tiers and the greedy filler legitimately return
/// schedules that carry these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageViolation {
    pub date: NaiveDate,
    pub slot: TimeOfDay,
    pub required: u32,
    pub covered: u32,
}

/// Recomputes slot coverage from the emitted shifts and logs every slot
/// that falls short of its requirement.
pub fn check_coverage(calendar: &Calendar, shifts: &[Shift]) -> Vec<CoverageViolation> {
    let mut violations = Vec::new();

    for day in calendar.days() {
        let day_shifts: Vec<&Shift> = shifts.iter().filter(|s| s.date == day.date).collect();
        for slot in &day.slots {
            if slot.required == 0 {
                continue;
            }
            let covered = day_shifts
                .iter()
                .filter(|s| {
                    s.start_time.minutes() <= slot.slot && slot.slot < s.end_time.minutes()
                })
                .count() as u32;
            if covered < slot.required {
                tracing::warn!(
                    date = %day.date,
                    slot = %slot.time(),
                    required = slot.required,
                    covered,
                    "Slot coverage below requirement"
                );
                violations.push(CoverageViolation {
                    date: day.date,
                    slot: slot.time(),
                    required: slot.required,
                    covered,
                });
            }
        }
    }

    if violations.is_empty() {
        tracing::debug!("All required slots covered");
    } else {
        tracing::warn!(count = violations.len(), "Coverage violations after solve");
    }

    violations
}
