use chrono::NaiveDate;
use shared::time::TimeOfDay;
use shared::types::{Shift, ShiftPattern, Staff};

use crate::domain::calendar::{Calendar, DayPolicy};
use crate::domain::roster::Roster;

/// Hour cap assumed in force mode for staff whose own cap is zero.
pub const FORCE_FALLBACK_HOURS: f64 = 8.0;

/// Clipped windows shorter than this are not worth a shift.
const MIN_OPTION_MINUTES: u16 = 60;

const HOURS_EPSILON: f64 = 1e-9;

/// One admissible shift window for a (staff, date) pair: a configured
/// pattern clipped to that day's opening window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftOption {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub hours: f64,
}

impl ShiftOption {
    pub fn start_min(&self) -> u16 {
        self.start.minutes()
    }

    pub fn end_min(&self) -> u16 {
        self.end.minutes()
    }

    pub fn covers(&self, slot: u16) -> bool {
        self.start.minutes() <= slot && slot < self.end.minutes()
    }
}

/// Per-day hour cap used for overtime accounting; zero caps fall back to
/// [`FORCE_FALLBACK_HOURS`].
pub fn effective_hour_cap(staff: &Staff) -> f64 {
    if staff.max_hours_day > 0.0 {
        staff.max_hours_day
    } else {
        FORCE_FALLBACK_HOURS
    }
}

/// Enumerates the admissible shift windows for one staff on one day.
///
/// Outside force mode, staff with a zero hour cap get nothing, and options
/// longer than the cap are discarded. In force mode both relaxations apply
/// and the hour cap moves into the objective instead.
pub fn build_options(
    day: &DayPolicy,
    patterns: &[ShiftPattern],
    staff: &Staff,
    force: bool,
) -> Vec<ShiftOption> {
    if day.open_min >= day.close_min {
        return Vec::new();
    }

    let cap = if staff.max_hours_day > 0.0 {
        staff.max_hours_day
    } else if force {
        FORCE_FALLBACK_HOURS
    } else {
        return Vec::new();
    };

    let mut options: Vec<ShiftOption> = Vec::new();
    for pattern in patterns {
        let start_min = pattern.start.minutes().max(day.open_min);
        let end_min = pattern.end.minutes().min(day.close_min);
        if end_min < start_min + MIN_OPTION_MINUTES {
            continue;
        }

        let hours = f64::from(end_min - start_min) / 60.0;
        if !force && hours > cap + HOURS_EPSILON {
            continue;
        }
        if options
            .iter()
            .any(|o| o.start_min() == start_min && o.end_min() == end_min)
        {
            continue;
        }

        let (Some(start), Some(end)) = (
            TimeOfDay::from_minutes(start_min),
            TimeOfDay::from_minutes(end_min),
        ) else {
            continue;
        };
        options.push(ShiftOption { start, end, hours });
    }

    options
}

/// Materializes an option into an output shift, annotating overtime when the
/// worked hours exceed the staff's effective per-day cap.
pub fn to_shift(
    staff: &Staff,
    date: NaiveDate,
    option: &ShiftOption,
    break_minutes: u32,
    force: bool,
) -> Shift {
    let cap = if force {
        effective_hour_cap(staff)
    } else {
        staff.max_hours_day
    };
    let overtime = cap > 0.0 && option.hours > cap + HOURS_EPSILON;

    Shift {
        staff_id: staff.id.clone(),
        date,
        start_time: option.start,
        end_time: option.end,
        break_minutes,
        overtime,
        overtime_hours: overtime.then(|| ((option.hours - cap) * 10.0).round() / 10.0),
    }
}

/// Dense option lists indexed by (staff index, date index). Lists stay empty
/// for closed days and NG dates, so MILP variables are simply never created
/// for them.
#[derive(Debug)]
pub struct OptionTable {
    per_staff_day: Vec<Vec<Vec<ShiftOption>>>,
}

impl OptionTable {
    pub fn build(
        roster: &Roster,
        calendar: &Calendar,
        patterns: &[ShiftPattern],
        force: bool,
    ) -> Self {
        let per_staff_day = roster
            .staff()
            .iter()
            .enumerate()
            .map(|(staff_idx, staff)| {
                calendar
                    .days()
                    .iter()
                    .map(|day| {
                        if !day.is_open() || roster.is_unavailable(staff_idx, day.date) {
                            Vec::new()
                        } else {
                            build_options(day, patterns, staff, force)
                        }
                    })
                    .collect()
            })
            .collect();

        Self { per_staff_day }
    }

    pub fn options(&self, staff_idx: usize, day_idx: usize) -> &[ShiftOption] {
        &self.per_staff_day[staff_idx][day_idx]
    }
}
