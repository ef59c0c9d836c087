use std::collections::HashSet;

use chrono::NaiveDate;
use shared::types::{Rank, Role, Staff, StaffRequest};

/// Weekly day floor granted under force-mode relaxations.
pub const FORCE_MIN_WEEK_DAYS: u32 = 6;

/// The staff list with merged unavailability, shared by the pre-check and
/// the solver. NG sets combine the staff record's own dates with approved
/// off/holiday requests.
#[derive(Debug)]
pub struct Roster {
    staff: Vec<Staff>,
    ng_dates: Vec<HashSet<NaiveDate>>,
}

impl Roster {
    pub fn build(staff_list: &[Staff], requests: &[StaffRequest]) -> Self {
        let staff: Vec<Staff> = staff_list.to_vec();
        let mut ng_dates: Vec<HashSet<NaiveDate>> = staff
            .iter()
            .map(|s| s.unavailable_dates.iter().copied().collect())
            .collect();

        for request in requests.iter().filter(|r| r.blocks_date()) {
            if let Some(idx) = staff.iter().position(|s| s.id == request.staff_id) {
                ng_dates[idx].insert(request.date);
            }
        }

        Self { staff, ng_dates }
    }

    pub fn staff(&self) -> &[Staff] {
        &self.staff
    }

    pub fn get(&self, staff_idx: usize) -> &Staff {
        &self.staff[staff_idx]
    }

    pub fn len(&self) -> usize {
        self.staff.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staff.is_empty()
    }

    pub fn is_unavailable(&self, staff_idx: usize, date: NaiveDate) -> bool {
        self.ng_dates[staff_idx].contains(&date)
    }

    /// Whether this staff can be scheduled at all without force-mode
    /// relaxations.
    pub fn is_usable(&self, staff_idx: usize) -> bool {
        let staff = &self.staff[staff_idx];
        staff.max_hours_day > 0.0 && staff.max_days_week > 0
    }

    /// Candidate order for the greedy filler: mentors first, then by rank
    /// best-first, then by input position.
    pub fn greedy_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.staff.len()).collect();
        order.sort_by_key(|&idx| (!is_mentor(&self.staff[idx]), self.staff[idx].rank, idx));
        order
    }
}

/// Managers and leaders can supervise on-the-job training.
pub fn is_mentor(staff: &Staff) -> bool {
    matches!(staff.role, Role::Manager | Role::Leader)
}

/// Rookies by role, plus bottom-rank staff treated as rookies for OJT.
pub fn is_rookie(staff: &Staff) -> bool {
    staff.role == Role::Rookie || staff.rank == Rank::D
}

/// Weekly day cap actually enforced: force mode raises it to at least
/// [`FORCE_MIN_WEEK_DAYS`]; outside force mode a zero cap forbids work.
pub fn effective_week_cap(staff: &Staff, force: bool) -> u32 {
    if force {
        staff.max_days_week.max(FORCE_MIN_WEEK_DAYS)
    } else {
        staff.max_days_week
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::types::{RequestKind, RequestStatus, SalaryClass};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn staff(id: &str, role: Role, rank: Rank) -> Staff {
        Staff {
            id: id.to_owned(),
            name: id.to_owned(),
            role,
            salary_class: SalaryClass::Hourly,
            hourly_wage: 1100.0,
            rank,
            max_hours_day: 8.0,
            max_days_week: 5,
            unavailable_dates: Vec::new(),
        }
    }

    fn request(staff_id: &str, kind: RequestKind, status: RequestStatus) -> StaffRequest {
        StaffRequest {
            staff_id: staff_id.to_owned(),
            date: date(2025, 1, 6),
            kind,
            status,
            start: None,
            end: None,
        }
    }

    #[test]
    fn merges_record_dates_with_approved_requests() {
        let mut first = staff("s1", Role::Staff, Rank::B);
        first.unavailable_dates = vec![date(2025, 1, 7)];
        let staff_list = vec![first, staff("s2", Role::Staff, Rank::B)];

        let requests = vec![
            request("s1", RequestKind::Off, RequestStatus::Approved),
            request("s2", RequestKind::Holiday, RequestStatus::Pending),
            request("s2", RequestKind::Work, RequestStatus::Approved),
        ];

        let roster = Roster::build(&staff_list, &requests);

        assert!(roster.is_unavailable(0, date(2025, 1, 6)));
        assert!(roster.is_unavailable(0, date(2025, 1, 7)));
        // pending and work requests never block
        assert!(!roster.is_unavailable(1, date(2025, 1, 6)));
    }

    #[test]
    fn request_for_unknown_staff_is_ignored() {
        let staff_list = vec![staff("s1", Role::Staff, Rank::B)];
        let requests = vec![request("ghost", RequestKind::Off, RequestStatus::Approved)];
        let roster = Roster::build(&staff_list, &requests);
        assert!(!roster.is_unavailable(0, date(2025, 1, 6)));
    }

    #[test]
    fn usability_requires_both_caps_positive() {
        let mut zero_hours = staff("s1", Role::Staff, Rank::B);
        zero_hours.max_hours_day = 0.0;
        let mut zero_days = staff("s2", Role::Staff, Rank::B);
        zero_days.max_days_week = 0;
        let roster = Roster::build(
            &[zero_hours, zero_days, staff("s3", Role::Staff, Rank::B)],
            &[],
        );

        assert!(!roster.is_usable(0));
        assert!(!roster.is_usable(1));
        assert!(roster.is_usable(2));
    }

    #[test]
    fn greedy_order_puts_mentors_first_then_rank() {
        let roster = Roster::build(
            &[
                staff("d-staff", Role::Staff, Rank::D),
                staff("a-staff", Role::Staff, Rank::A),
                staff("c-leader", Role::Leader, Rank::C),
                staff("b-manager", Role::Manager, Rank::B),
            ],
            &[],
        );

        assert_eq!(roster.greedy_order(), vec![3, 2, 1, 0]);
    }

    #[test]
    fn mentor_and_rookie_classification() {
        assert!(is_mentor(&staff("m", Role::Manager, Rank::B)));
        assert!(is_mentor(&staff("l", Role::Leader, Rank::B)));
        assert!(!is_mentor(&staff("s", Role::Staff, Rank::A)));

        assert!(is_rookie(&staff("r", Role::Rookie, Rank::B)));
        assert!(is_rookie(&staff("d", Role::Staff, Rank::D)));
        assert!(!is_rookie(&staff("s", Role::Staff, Rank::C)));
    }

    #[test]
    fn force_mode_lifts_weekly_cap_to_six() {
        let mut part_timer = staff("s1", Role::Staff, Rank::B);
        part_timer.max_days_week = 0;

        assert_eq!(effective_week_cap(&part_timer, false), 0);
        assert_eq!(effective_week_cap(&part_timer, true), 6);

        let mut full_timer = staff("s2", Role::Staff, Rank::B);
        full_timer.max_days_week = 7;
        assert_eq!(effective_week_cap(&full_timer, true), 7);
    }
}
