use std::collections::BTreeMap;

use shared::types::{Shift, ShiftPattern};

use crate::domain::calendar::{Calendar, DayPolicy};
use crate::domain::options::{self, ShiftOption};
use crate::domain::roster::{self, Roster};

/// Upper bound on fill attempts per day; each pass places at most one shift.
const MAX_FILL_PASSES: usize = 30;

/// Deficit-driven filler used when every MILP tier has failed.
///
/// Days are filled independently in date order, with running weekly counts
/// carried across days. Each pass targets the worst-covered slot and places
/// the candidate option covering the most remaining deficit; candidates are
/// visited mentors-first, then by rank, so the outcome is deterministic.
#[tracing::instrument(skip_all, fields(staff = roster.len(), days = calendar.days().len()))]
pub fn fill_schedule(roster: &Roster, calendar: &Calendar, patterns: &[ShiftPattern]) -> Vec<Shift> {
    let order = roster.greedy_order();
    let mut weekly_count = vec![vec![0u32; calendar.weeks().len()]; roster.len()];
    let mut shifts: Vec<Shift> = Vec::new();

    for (day_idx, day) in calendar.days().iter().enumerate() {
        if !day.is_open() || day.slots.iter().all(|s| s.required == 0) {
            continue;
        }
        let week_idx = calendar.week_of(day_idx);

        let mut placed: Vec<(usize, ShiftOption)> = Vec::new();
        let mut assigned_today = vec![false; roster.len()];

        for _pass in 0..MAX_FILL_PASSES {
            let deficits = deficit_map(day, &placed);
            let Some(worst_slot) = worst_slot(&deficits) else {
                break;
            };

            let mut best: Option<(usize, ShiftOption, usize)> = None;
            for &staff_idx in &order {
                if assigned_today[staff_idx] || roster.is_unavailable(staff_idx, day.date) {
                    continue;
                }
                let staff = roster.get(staff_idx);
                if weekly_count[staff_idx][week_idx] >= roster::effective_week_cap(staff, true) {
                    continue;
                }
                for option in options::build_options(day, patterns, staff, true) {
                    if !option.covers(worst_slot) {
                        continue;
                    }
                    let covered = deficits
                        .keys()
                        .filter(|&&slot| option.covers(slot))
                        .count();
                    if best.as_ref().is_none_or(|&(_, _, best_covered)| covered > best_covered) {
                        best = Some((staff_idx, option, covered));
                    }
                }
            }

            let Some((staff_idx, option, _)) = best else {
                break;
            };
            placed.push((staff_idx, option));
            assigned_today[staff_idx] = true;
            weekly_count[staff_idx][week_idx] += 1;
        }

        tracing::debug!(date = %day.date, placed = placed.len(), "Greedy day filled");
        for (staff_idx, option) in placed {
            let staff = roster.get(staff_idx);
            let break_minutes = calendar.break_minutes(option.hours);
            shifts.push(options::to_shift(staff, day.date, &option, break_minutes, true));
        }
    }

    shifts
}

/// Remaining shortage per required slot given the shifts placed so far.
fn deficit_map(day: &DayPolicy, placed: &[(usize, ShiftOption)]) -> BTreeMap<u16, u32> {
    let mut deficits = BTreeMap::new();
    for slot in &day.slots {
        if slot.required == 0 {
            continue;
        }
        let coverage = placed.iter().filter(|(_, o)| o.covers(slot.slot)).count() as u32;
        if coverage < slot.required {
            deficits.insert(slot.slot, slot.required - coverage);
        }
    }
    deficits
}

/// Largest shortage wins; the ascending map iteration breaks ties toward
/// the earliest slot.
fn worst_slot(deficits: &BTreeMap<u16, u32>) -> Option<u16> {
    let mut worst: Option<(u16, u32)> = None;
    for (&slot, &shortage) in deficits {
        if worst.is_none_or(|(_, best)| shortage > best) {
            worst = Some((slot, shortage));
        }
    }
    worst.map(|(slot, _)| slot)
}
