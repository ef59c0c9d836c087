use chrono::NaiveDate;
use shared::time::{self, SLOT_MINUTES, TimeOfDay};
use shared::types::{BreakRule, DayType, ScheduleConfig};

/// Staffing requirement for one 15-minute slot, keyed by its start
/// minute-of-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRequirement {
    pub slot: u16,
    pub required: u32,
}

impl SlotRequirement {
    /// Grid slots always start strictly before `24:00`.
    pub fn time(&self) -> TimeOfDay {
        TimeOfDay::from_minutes(self.slot).unwrap_or(TimeOfDay::MIDNIGHT)
    }
}

/// Everything the engine needs to know about a single date.
#[derive(Debug, Clone)]
pub struct DayPolicy {
    pub date: NaiveDate,
    pub day_type: DayType,
    pub open_min: u16,
    pub close_min: u16,
    /// Day-type minimum (or per-date override) before reinforcement rules.
    pub base_required: u32,
    /// One entry per 15-minute slot in `[open_min, close_min)`.
    pub slots: Vec<SlotRequirement>,
}

impl DayPolicy {
    pub fn is_open(&self) -> bool {
        self.day_type != DayType::Closed && self.open_min < self.close_min
    }

    pub fn peak_requirement(&self) -> u32 {
        self.slots.iter().map(|s| s.required).max().unwrap_or(0)
    }
}

/// Dense per-request policy tables: one [`DayPolicy`] per requested date
/// (sorted, deduplicated), ISO-week groups of date indices, and the break
/// rules sorted for threshold lookup.
///
/// Rebuilt from scratch for every solve; nothing survives a request.
#[derive(Debug, Clone)]
pub struct Calendar {
    days: Vec<DayPolicy>,
    weeks: Vec<Vec<usize>>,
    week_of_day: Vec<usize>,
    break_rules: Vec<BreakRule>,
    min_manager: u32,
}

impl Calendar {
    pub fn resolve(config: &ScheduleConfig, dates: &[NaiveDate]) -> Self {
        let mut sorted: Vec<NaiveDate> = dates.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let days: Vec<DayPolicy> = sorted
            .iter()
            .map(|&date| build_day_policy(config, date))
            .collect();

        let weeks = group_by_iso_week(&sorted);
        let mut week_of_day = vec![0; days.len()];
        for (week_idx, week) in weeks.iter().enumerate() {
            for &day_idx in week {
                week_of_day[day_idx] = week_idx;
            }
        }

        let mut break_rules = config.break_rules.clone();
        break_rules.sort_by(|a, b| a.min_hours.total_cmp(&b.min_hours));

        Self {
            days,
            weeks,
            week_of_day,
            break_rules,
            min_manager: config.staff_req.min_manager,
        }
    }

    pub fn days(&self) -> &[DayPolicy] {
        &self.days
    }

    pub fn day(&self, day_idx: usize) -> &DayPolicy {
        &self.days[day_idx]
    }

    /// Date indices grouped by (ISO year, ISO week), in date order.
    pub fn weeks(&self) -> &[Vec<usize>] {
        &self.weeks
    }

    pub fn week_of(&self, day_idx: usize) -> usize {
        self.week_of_day[day_idx]
    }

    pub fn min_manager(&self) -> u32 {
        self.min_manager
    }

    /// Break minutes owed for a shift of the given length: the largest
    /// configured value whose threshold is strictly below the hours worked.
    pub fn break_minutes(&self, hours: f64) -> u32 {
        let mut minutes = 0;
        for rule in &self.break_rules {
            if hours > rule.min_hours {
                minutes = rule.break_minutes;
            }
        }
        minutes
    }
}

/// Classifies a date under the UI weekday convention (0=Sunday): fixed
/// closures and the closed-weekday mask win, then Sunday is `holiday`,
/// Saturday `weekend`, the rest `weekday`.
pub fn day_type(config: &ScheduleConfig, date: NaiveDate) -> DayType {
    if config.special_holidays.contains(&date) {
        return DayType::Closed;
    }
    let dow = time::ui_weekday(date);
    if config.closed_days.contains(&dow) {
        return DayType::Closed;
    }
    match dow {
        0 => DayType::Holiday,
        6 => DayType::Weekend,
        _ => DayType::Weekday,
    }
}

/// Opening window in minutes-of-day. Per-date overrides take precedence,
/// then the day-type entry, then the default open/close pair.
pub fn opening_window(config: &ScheduleConfig, date: NaiveDate, day_type: DayType) -> (u16, u16) {
    if let Some(window) = config.special_days.get(&date) {
        return (window.start.minutes(), window.end.minutes());
    }

    let by_type = match day_type {
        DayType::Holiday => config.opening_times.holiday,
        DayType::Weekend => config.opening_times.weekend,
        DayType::Weekday | DayType::Closed => config.opening_times.weekday,
    };

    match by_type {
        Some(window) => (window.start.minutes(), window.end.minutes()),
        None => (
            config.opening_time.minutes(),
            config.closing_time.minutes(),
        ),
    }
}

fn base_requirement(config: &ScheduleConfig, date: NaiveDate, day_type: DayType) -> u32 {
    if day_type == DayType::Closed {
        return 0;
    }
    if let Some(&count) = config.staff_req.overrides.get(&date) {
        return count;
    }
    match day_type {
        DayType::Holiday => config.staff_req.min_holiday,
        DayType::Weekend => config.staff_req.min_weekend,
        _ => config.staff_req.min_weekday,
    }
}

fn build_day_policy(config: &ScheduleConfig, date: NaiveDate) -> DayPolicy {
    let day_type = day_type(config, date);
    let (open_min, close_min) = opening_window(config, date, day_type);
    let base_required = base_requirement(config, date, day_type);

    let mut slots = Vec::new();
    if day_type != DayType::Closed && open_min < close_min {
        let mut slot = open_min;
        while slot < close_min {
            slots.push(SlotRequirement {
                slot,
                required: base_required,
            });
            slot += SLOT_MINUTES;
        }

        let dow = time::ui_weekday(date);
        for rule in &config.time_staff_req {
            if !rule.days.contains(&dow) {
                continue;
            }
            let (rule_start, rule_end) = (rule.start.minutes(), rule.end.minutes());
            for slot in &mut slots {
                // start > end wraps past midnight: [start, 24h) ∪ [0, end)
                let in_range = if rule_start <= rule_end {
                    slot.slot >= rule_start && slot.slot < rule_end
                } else {
                    slot.slot >= rule_start || slot.slot < rule_end
                };
                if in_range {
                    slot.required = slot.required.max(rule.count);
                }
            }
        }
    }

    DayPolicy {
        date,
        day_type,
        open_min,
        close_min,
        base_required,
        slots,
    }
}

fn group_by_iso_week(sorted_dates: &[NaiveDate]) -> Vec<Vec<usize>> {
    let mut weeks: Vec<Vec<usize>> = Vec::new();
    let mut current_key = None;

    for (idx, &date) in sorted_dates.iter().enumerate() {
        let key = time::iso_week_key(date);
        if current_key == Some(key) {
            if let Some(week) = weeks.last_mut() {
                week.push(idx);
            }
        } else {
            weeks.push(vec![idx]);
            current_key = Some(key);
        }
    }

    weeks
}
