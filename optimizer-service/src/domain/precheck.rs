use shared::time::{SLOT_MINUTES, TimeOfDay};
use shared::types::{
    DailyDetail, PrecheckReport, PrecheckSummary, PrecheckWarning, ShiftPattern, ShortageRange,
    WarningKind, WarningSeverity,
};

use crate::domain::calendar::Calendar;
use crate::domain::options::{self, ShiftOption};
use crate::domain::roster::Roster;

/// Person-hours represented by one short slot.
const SLOT_PERSON_HOURS: f64 = 0.25;

/// Answers "is there enough declared coverage?" without running the solver.
///
/// For every open date, counts how many available staff could cover each
/// required slot with at least one admissible option, compresses the
/// shortfalls into ranges, and totals the missing person-hours.
#[tracing::instrument(skip_all, fields(staff = roster.len(), days = calendar.days().len()))]
pub fn analyze(roster: &Roster, calendar: &Calendar, patterns: &[ShiftPattern]) -> PrecheckReport {
    let mut warnings = Vec::new();
    let mut summary = PrecheckSummary::default();

    for (staff_idx, staff) in roster.staff().iter().enumerate() {
        if roster.is_usable(staff_idx) {
            summary.usable_staff += 1;
        } else {
            summary.unusable_staff += 1;
            warnings.push(PrecheckWarning {
                kind: WarningKind::UnusableStaff,
                severity: WarningSeverity::Info,
                message: format!(
                    "{} cannot be scheduled (max hours/day {}, max days/week {})",
                    staff.name, staff.max_hours_day, staff.max_days_week
                ),
            });
        }
    }

    let mut daily_details = Vec::new();
    for day in calendar.days() {
        if !day.is_open() {
            summary.closed_days += 1;
            continue;
        }
        summary.open_days += 1;

        let available: Vec<usize> = (0..roster.len())
            .filter(|&idx| roster.is_usable(idx) && !roster.is_unavailable(idx, day.date))
            .collect();
        let options_by_staff: Vec<Vec<ShiftOption>> = available
            .iter()
            .map(|&idx| options::build_options(day, patterns, roster.get(idx), false))
            .collect();

        let mut ranges: Vec<ShortageRange> = Vec::new();
        let mut shortage_person_hours = 0.0;
        for slot in &day.slots {
            if slot.required == 0 {
                continue;
            }
            let coverable = options_by_staff
                .iter()
                .filter(|opts| opts.iter().any(|o| o.covers(slot.slot)))
                .count() as u32;
            let shortage = slot.required.saturating_sub(coverable);
            if shortage > 0 {
                shortage_person_hours += f64::from(shortage) * SLOT_PERSON_HOURS;
                push_shortage_slot(&mut ranges, slot.slot, shortage);
            }
        }

        if !ranges.is_empty() {
            summary.days_with_shortage += 1;
            summary.total_shortage_person_hours += shortage_person_hours;
            warnings.push(PrecheckWarning {
                kind: WarningKind::SlotShortage,
                severity: WarningSeverity::Critical,
                message: format!(
                    "{}: {} understaffed range(s), {shortage_person_hours:.2} person-hours missing",
                    day.date,
                    ranges.len()
                ),
            });
        }

        daily_details.push(DailyDetail {
            date: day.date,
            day_type: day.day_type,
            available_staff: available.len() as u32,
            shortage_ranges: ranges,
            shortage_person_hours,
        });
    }

    warn_on_thin_weeks(roster, calendar, &mut warnings);

    let feasible = summary.total_shortage_person_hours == 0.0;
    tracing::info!(
        feasible,
        shortage_person_hours = summary.total_shortage_person_hours,
        warnings = warnings.len(),
        "Pre-check finished"
    );

    PrecheckReport {
        feasible,
        warnings,
        daily_details,
        summary,
    }
}

/// Extends the trailing range when the slot continues it with the same
/// shortage, otherwise opens a new range.
fn push_shortage_slot(ranges: &mut Vec<ShortageRange>, slot: u16, shortage: u32) {
    let end = TimeOfDay::from_minutes(slot + SLOT_MINUTES).unwrap_or(TimeOfDay::END_OF_DAY);
    if let Some(last) = ranges.last_mut()
        && last.end.minutes() == slot
        && last.shortage == shortage
    {
        last.end = end;
        return;
    }
    ranges.push(ShortageRange {
        start: TimeOfDay::from_minutes(slot).unwrap_or(TimeOfDay::MIDNIGHT),
        end,
        shortage,
    });
}

/// Flags ISO weeks whose total staff-day capacity cannot reach the sum of
/// the days' peak requirements, even before looking at time windows.
fn warn_on_thin_weeks(roster: &Roster, calendar: &Calendar, warnings: &mut Vec<PrecheckWarning>) {
    for week in calendar.weeks() {
        let open_days: Vec<usize> = week
            .iter()
            .copied()
            .filter(|&idx| calendar.day(idx).is_open())
            .collect();
        if open_days.is_empty() {
            continue;
        }

        let demand: u32 = open_days
            .iter()
            .map(|&idx| calendar.day(idx).peak_requirement())
            .sum();
        let supply: u32 = (0..roster.len())
            .filter(|&idx| roster.is_usable(idx))
            .map(|idx| roster.get(idx).max_days_week.min(open_days.len() as u32))
            .sum();

        if supply < demand {
            let first = calendar.day(open_days[0]).date;
            warnings.push(PrecheckWarning {
                kind: WarningKind::WeeklyCapacity,
                severity: WarningSeverity::Warning,
                message: format!(
                    "week of {first}: staff-day capacity {supply} is below demand {demand}"
                ),
            });
        }
    }
}
