use chrono::NaiveDate;
use optimizer_service::domain::engine::{ScheduleOutcome, ShiftEngine};
use optimizer_service::domain::settings::EngineSettings;
use shared::types::{
    Rank, RequestKind, RequestStatus, ResultMode, Role, SalaryClass, ScheduleConfig, ShiftPattern,
    SolveMode, SolveRequest, Staff, StaffRequest, WarningKind,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn engine() -> ShiftEngine {
    ShiftEngine::new(EngineSettings::default())
}

fn pattern(name: &str, start: &str, end: &str) -> ShiftPattern {
    ShiftPattern {
        name: name.to_owned(),
        start: start.parse().unwrap(),
        end: end.parse().unwrap(),
    }
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

fn request(
    staff_list: Vec<Staff>,
    config: ScheduleConfig,
    dates: Vec<NaiveDate>,
) -> SolveRequest {
    SolveRequest {
        staff_list,
        config,
        dates,
        requests: Vec::new(),
        mode: SolveMode::Auto,
    }
}

/// Opening 09:00-17:00, one matching full-window pattern.
fn day_config(min_weekday: u32, min_manager: u32) -> ScheduleConfig {
    let mut config = ScheduleConfig::default();
    config.custom_shifts = vec![pattern("day", "09:00", "17:00")];
    config.closing_time = "17:00".parse().unwrap();
    config.staff_req.min_weekday = min_weekday;
    config.staff_req.min_manager = min_manager;
    config
}

fn generate(request: &SolveRequest) -> ScheduleOutcome {
    engine().generate(request).unwrap()
}

// region: Concrete scenarios

#[test]
fn single_staff_single_day_gets_the_full_pattern() {
    let req = request(
        vec![staff("s1", Role::Staff, Rank::B)],
        day_config(1, 0),
        vec![date(2025, 1, 6)],
    );

    let outcome = generate(&req);

    assert_eq!(outcome.mode, ResultMode::MathTier3);
    assert_eq!(outcome.shifts.len(), 1);
    let shift = &outcome.shifts[0];
    assert_eq!(shift.staff_id, "s1");
    assert_eq!(shift.date, date(2025, 1, 6));
    assert_eq!(shift.start_time, "09:00".parse().unwrap());
    assert_eq!(shift.end_time, "17:00".parse().unwrap());
    // 8h is over the 6h threshold but not strictly over the 8h one
    assert_eq!(shift.break_minutes, 45);
    assert!(outcome.violations.is_empty());
}

#[test]
fn manager_is_chosen_when_one_head_suffices() {
    let mut rookie = staff("rookie", Role::Rookie, Rank::D);
    let mut manager = staff("manager", Role::Manager, Rank::A);
    rookie.max_hours_day = 9.0;
    manager.max_hours_day = 9.0;

    let mut config = ScheduleConfig::default();
    config.custom_shifts = vec![pattern("day", "09:00", "18:00")];
    config.closing_time = "18:00".parse().unwrap();
    config.staff_req.min_weekday = 1;
    config.staff_req.min_manager = 1;

    let outcome = generate(&request(
        vec![rookie, manager],
        config,
        vec![date(2025, 1, 6)],
    ));

    assert!(outcome.shifts.iter().any(|s| s.staff_id == "manager"));
    if outcome.shifts.len() == 1 {
        assert_eq!(outcome.shifts[0].staff_id, "manager");
    }
}

#[test]
fn rookie_demand_pulls_the_mentor_in() {
    let mut rookie = staff("rookie", Role::Rookie, Rank::D);
    let mut manager = staff("manager", Role::Manager, Rank::A);
    rookie.max_hours_day = 9.0;
    manager.max_hours_day = 9.0;

    let mut config = ScheduleConfig::default();
    config.custom_shifts = vec![pattern("day", "09:00", "18:00")];
    config.closing_time = "18:00".parse().unwrap();
    config.staff_req.min_weekday = 2;
    config.staff_req.min_manager = 1;

    let outcome = generate(&request(
        vec![rookie, manager],
        config,
        vec![date(2025, 1, 6)],
    ));

    assert_eq!(outcome.shifts.len(), 2);
    assert!(outcome.violations.is_empty());
}

#[test]
fn fully_unavailable_roster_yields_no_schedule_and_a_critical_precheck() {
    let mut staff_list = vec![
        staff("s1", Role::Staff, Rank::B),
        staff("s2", Role::Staff, Rank::B),
        staff("s3", Role::Staff, Rank::B),
    ];
    for s in &mut staff_list {
        s.unavailable_dates = vec![date(2025, 1, 6)];
    }

    let req = request(staff_list, day_config(2, 0), vec![date(2025, 1, 6)]);

    let outcome = generate(&req);
    assert_eq!(outcome.mode, ResultMode::NoSolution);
    assert!(outcome.shifts.is_empty());

    let report = engine().precheck(&req).unwrap();
    assert!(!report.feasible);
    // 2 heads short across the whole 8h window
    assert!(report.summary.total_shortage_person_hours >= 2.0 * 8.0 * 0.25);
    assert!(
        report
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::SlotShortage)
    );
}

#[test]
fn missing_manager_floor_is_absorbed_by_slack() {
    let req = request(
        vec![staff("s1", Role::Staff, Rank::B)],
        day_config(1, 1),
        vec![date(2025, 1, 6)],
    );

    let outcome = generate(&req);

    // nobody can satisfy the floor, yet a schedule still comes back
    assert_eq!(outcome.mode, ResultMode::MathTier3);
    assert_eq!(outcome.shifts.len(), 1);
}

#[test]
fn special_holiday_never_gets_shifts() {
    let mut config = day_config(2, 0);
    config.special_holidays = vec![date(2025, 1, 6)];

    let outcome = generate(&request(
        vec![staff("s1", Role::Staff, Rank::B), staff("s2", Role::Staff, Rank::B)],
        config,
        vec![date(2025, 1, 6), date(2025, 1, 7)],
    ));

    assert!(!outcome.shifts.is_empty());
    assert!(outcome.shifts.iter().all(|s| s.date == date(2025, 1, 7)));
}

// endregion: Concrete scenarios

// region: Boundary behaviors

#[test]
fn zero_week_cap_staff_sit_out_of_math_tiers() {
    let mut benched = staff("benched", Role::Staff, Rank::A);
    benched.max_days_week = 0;

    let outcome = generate(&request(
        vec![benched, staff("active", Role::Staff, Rank::B)],
        day_config(1, 0),
        vec![date(2025, 1, 6)],
    ));

    assert_eq!(outcome.mode, ResultMode::MathTier3);
    assert!(outcome.shifts.iter().all(|s| s.staff_id == "active"));
}

#[test]
fn force_mode_schedules_zero_cap_staff() {
    let mut benched = staff("benched", Role::Staff, Rank::B);
    benched.max_days_week = 0;

    let mut req = request(vec![benched], day_config(1, 0), vec![date(2025, 1, 6)]);
    req.mode = SolveMode::Force;

    let outcome = generate(&req);

    assert_eq!(outcome.mode, ResultMode::MathForce);
    assert_eq!(outcome.shifts.len(), 1);
    assert_eq!(outcome.shifts[0].staff_id, "benched");
}

#[test]
fn over_cap_options_reach_the_force_tier_with_overtime() {
    let mut part_timer = staff("pt", Role::Staff, Rank::B);
    part_timer.max_hours_day = 6.0;

    let mut config = ScheduleConfig::default();
    config.custom_shifts = vec![pattern("long", "09:00", "18:00")];
    config.closing_time = "18:00".parse().unwrap();
    config.staff_req.min_weekday = 1;
    config.staff_req.min_manager = 0;

    let outcome = generate(&request(
        vec![part_timer],
        config,
        vec![date(2025, 1, 6)],
    ));

    // strict tiers cannot use the 9h option; the legal-only force tier has
    // no coverage incentive for hourly staff, so the greedy filler ends up
    // placing the forced shift
    assert_eq!(outcome.mode, ResultMode::Greedy);
    assert_eq!(outcome.shifts.len(), 1);
    assert!(outcome.shifts[0].overtime);
    assert_eq!(outcome.shifts[0].overtime_hours, Some(3.0));
}

#[test]
fn approved_off_request_blocks_the_date() {
    let mut req = request(
        vec![staff("s1", Role::Staff, Rank::B), staff("s2", Role::Staff, Rank::B)],
        day_config(1, 0),
        vec![date(2025, 1, 6)],
    );
    req.requests = vec![StaffRequest {
        staff_id: "s1".into(),
        date: date(2025, 1, 6),
        kind: RequestKind::Off,
        status: RequestStatus::Approved,
        start: None,
        end: None,
    }];

    let outcome = generate(&req);

    assert!(outcome.shifts.iter().all(|s| s.staff_id == "s2"));
}

// endregion: Boundary behaviors

// region: Laws

#[test]
fn identical_input_produces_identical_schedules() {
    let req = request(
        vec![
            staff("s1", Role::Staff, Rank::B),
            staff("s2", Role::Leader, Rank::A),
            staff("s3", Role::Staff, Rank::C),
        ],
        day_config(2, 0),
        (6..=10).map(|d| date(2025, 1, d)).collect(),
    );

    let first = generate(&req);
    let second = generate(&req);

    assert_eq!(first.mode, second.mode);
    assert_eq!(first.shifts, second.shifts);
}

#[test]
fn feasible_precheck_implies_zero_coverage_slack() {
    let mut staff_list = vec![
        staff("s1", Role::Staff, Rank::B),
        staff("s2", Role::Staff, Rank::B),
    ];
    for s in &mut staff_list {
        s.max_hours_day = 8.0;
    }
    let req = request(staff_list, day_config(2, 0), vec![date(2025, 1, 6)]);

    let report = engine().precheck(&req).unwrap();
    assert!(report.feasible);

    let outcome = generate(&req);
    assert!(outcome.violations.is_empty());
}

#[test]
fn adding_staff_never_worsens_coverage() {
    let one = request(
        vec![staff("s1", Role::Staff, Rank::B)],
        day_config(2, 0),
        vec![date(2025, 1, 6)],
    );
    let two = request(
        vec![staff("s1", Role::Staff, Rank::B), staff("s2", Role::Staff, Rank::B)],
        day_config(2, 0),
        vec![date(2025, 1, 6)],
    );

    let short = generate(&one);
    let full = generate(&two);

    assert!(full.violations.len() <= short.violations.len());
}

// endregion: Laws
