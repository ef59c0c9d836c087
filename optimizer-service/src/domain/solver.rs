use coin_cbc::{Model, Sense, raw::Status};
use thiserror::Error;

use shared::types::{Rank, Role, SalaryClass, Shift};

use crate::domain::calendar::Calendar;
use crate::domain::options::{self, OptionTable};
use crate::domain::roster::{self, Roster};
use crate::domain::settings::EngineSettings;

// Penalty weights, largest first: structural slacks dwarf preference costs,
// so relaxations only happen when the roster physically cannot cover demand.
pub const SLOT_SHORTAGE_PENALTY: f64 = 1_000_000.0;
pub const MANAGER_SHORTAGE_PENALTY: f64 = 500_000.0;
pub const OJT_GAP_PENALTY: f64 = 200_000.0;
pub const POWER_BALANCE_PENALTY: f64 = 10_000.0;
pub const MONTHLY_ABSENCE_PENALTY: f64 = 30_000.0;
pub const OVERTIME_PENALTY_PER_HOUR: f64 = 50_000.0;

const WAGE_COST_SCALE: f64 = 0.01;
const POWER_TARGET_FACTOR: f64 = 1.5;
const MAX_CONSECUTIVE_DAYS: usize = 6;

fn rank_preference_cost(rank: Rank) -> f64 {
    match rank {
        Rank::A => 0.0,
        Rank::B => 50.0,
        Rank::C => 500.0,
        Rank::D => 2000.0,
    }
}

fn power_score(rank: Rank) -> f64 {
    match rank {
        Rank::A => 3.0,
        Rank::B => 2.0,
        Rank::C => 1.0,
        Rank::D => 0.5,
    }
}

/// Constraint level of a solve attempt. Each tier installs strictly more
/// constraint families than the one below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    /// At-most-one, weekly day caps, consecutive-day limit.
    Legal = 1,
    /// Plus slot coverage and the manager floor, slack-softened.
    Coverage = 2,
    /// Plus OJT adjacency, power balance, and rank preference costs.
    Balanced = 3,
}

#[derive(Debug, Clone, Copy)]
pub struct TierAttempt {
    pub tier: Tier,
    pub force: bool,
}

#[derive(Debug)]
pub struct TierSolution {
    pub shifts: Vec<Shift>,
    /// The backend hit its wall-clock limit and the incumbent was accepted.
    pub timed_out: bool,
}

/// Why a tier attempt produced nothing usable. Never surfaced to callers;
/// the engine reacts by relaxing to the next rung of the ladder.
#[derive(Debug, Error)]
pub enum TierFailure {
    #[error("model proven infeasible")]
    Infeasible,

    #[error("solver abandoned the model")]
    Abandoned,

    #[error("no assignments extracted")]
    Empty,
}

/// One binary decision: staff works this option on this day.
#[derive(Clone, Copy)]
struct AssignVar {
    id: usize,
    staff: usize,
    day: usize,
    option: usize,
    col: coin_cbc::Col,
}

/// Flat variable table with `(staff, day)` range and per-day index maps, so
/// constraint builders never walk nested containers.
struct VarTable {
    vars: Vec<AssignVar>,
    by_staff_day: Vec<Vec<std::ops::Range<usize>>>,
    by_day: Vec<Vec<usize>>,
}

impl VarTable {
    fn build(model: &mut Model, roster: &Roster, calendar: &Calendar, table: &OptionTable) -> Self {
        let n_days = calendar.days().len();
        let mut vars: Vec<AssignVar> = Vec::new();
        let mut by_staff_day = vec![vec![0..0; n_days]; roster.len()];
        let mut by_day: Vec<Vec<usize>> = vec![Vec::new(); n_days];

        for staff_idx in 0..roster.len() {
            for day_idx in 0..n_days {
                let start = vars.len();
                for option_idx in 0..table.options(staff_idx, day_idx).len() {
                    let id = vars.len();
                    by_day[day_idx].push(id);
                    vars.push(AssignVar {
                        id,
                        staff: staff_idx,
                        day: day_idx,
                        option: option_idx,
                        col: model.add_binary(),
                    });
                }
                by_staff_day[staff_idx][day_idx] = start..vars.len();
            }
        }

        Self {
            vars,
            by_staff_day,
            by_day,
        }
    }

    fn len(&self) -> usize {
        self.vars.len()
    }

    fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    fn all(&self) -> &[AssignVar] {
        &self.vars
    }

    fn for_staff_day(&self, staff_idx: usize, day_idx: usize) -> &[AssignVar] {
        &self.vars[self.by_staff_day[staff_idx][day_idx].clone()]
    }

    fn for_day(&self, day_idx: usize) -> impl Iterator<Item = &AssignVar> {
        self.by_day[day_idx].iter().map(|&id| &self.vars[id])
    }

    fn day_var_count(&self, day_idx: usize) -> usize {
        self.by_day[day_idx].len()
    }
}

/// Builds and solves the MILP for one tier attempt.
///
/// NG dates and closed days are enforced by variable omission: the option
/// table simply has no entries there.
#[tracing::instrument(skip_all, fields(tier = ?attempt.tier, force = attempt.force))]
pub fn solve_tier(
    roster: &Roster,
    calendar: &Calendar,
    table: &OptionTable,
    attempt: TierAttempt,
    settings: &EngineSettings,
) -> Result<TierSolution, TierFailure> {
    let mut model = Model::default();
    model.set_obj_sense(Sense::Minimize);
    model.set_parameter("logLevel", if settings.solver_log { "1" } else { "0" });
    model.set_parameter("seconds", &settings.solver_time_limit_secs.to_string());

    let vars = VarTable::build(&mut model, roster, calendar, table);
    if vars.is_empty() {
        return Err(TierFailure::Empty);
    }
    let mut objective = vec![0.0; vars.len()];

    install_assignment_costs(&mut objective, roster, table, &vars, attempt);
    install_at_most_one(&mut model, &vars, roster.len(), calendar.days().len());
    install_weekly_caps(&mut model, roster, calendar, &vars, attempt.force);
    if !attempt.force {
        install_consecutive_limit(&mut model, &vars, roster.len(), calendar.days().len());
    }
    if attempt.tier >= Tier::Coverage {
        install_coverage(&mut model, calendar, table, &vars);
        install_manager_floor(&mut model, roster, calendar, table, &vars);
    }
    if attempt.tier >= Tier::Balanced {
        install_ojt(&mut model, roster, calendar, table, &vars, &mut objective);
        install_power_balance(&mut model, roster, calendar, &vars);
    }

    for (var, coeff) in vars.all().iter().zip(&objective) {
        if *coeff != 0.0 {
            model.set_obj_coeff(var.col, *coeff);
        }
    }

    tracing::debug!(variables = vars.len(), "Solving tier model");
    let solution = model.solve();
    let raw = solution.raw();

    if raw.is_proven_infeasible() {
        return Err(TierFailure::Infeasible);
    }
    let timed_out = match raw.status() {
        Status::Finished => false,
        Status::Stopped => true,
        _ => return Err(TierFailure::Abandoned),
    };

    let mut shifts = Vec::new();
    for var in vars.all() {
        if solution.col(var.col) > 0.5 {
            let staff = roster.get(var.staff);
            let option = &table.options(var.staff, var.day)[var.option];
            let break_minutes = calendar.break_minutes(option.hours);
            shifts.push(options::to_shift(
                staff,
                calendar.day(var.day).date,
                option,
                break_minutes,
                attempt.force,
            ));
        }
    }
    if shifts.is_empty() {
        return Err(TierFailure::Empty);
    }
    shifts.sort_by(|a, b| {
        (a.date, a.start_time, &a.staff_id).cmp(&(b.date, b.start_time, &b.staff_id))
    });

    tracing::info!(
        shifts = shifts.len(),
        timed_out,
        objective = raw.obj_value(),
        "Tier solved"
    );
    Ok(TierSolution { shifts, timed_out })
}

/// Per-assignment objective terms: rank preference (tier 3 only), hourly
/// labor cost, the monthly-attendance incentive, and force-mode overtime.
fn install_assignment_costs(
    objective: &mut [f64],
    roster: &Roster,
    table: &OptionTable,
    vars: &VarTable,
    attempt: TierAttempt,
) {
    for var in vars.all() {
        let staff = roster.get(var.staff);
        let option = &table.options(var.staff, var.day)[var.option];
        let mut cost = 0.0;

        if attempt.tier >= Tier::Balanced {
            cost += rank_preference_cost(staff.rank);
        }
        match staff.salary_class {
            SalaryClass::Hourly => cost += staff.hourly_wage * option.hours * WAGE_COST_SCALE,
            // every absent day of a salaried staffer is penalized, which is
            // the same as rewarding each worked day
            SalaryClass::Monthly => cost -= MONTHLY_ABSENCE_PENALTY,
        }
        if attempt.force {
            let cap = options::effective_hour_cap(staff);
            if option.hours > cap {
                cost += (option.hours - cap) * OVERTIME_PENALTY_PER_HOUR;
            }
        }

        objective[var.id] += cost;
    }
}

fn install_at_most_one(model: &mut Model, vars: &VarTable, n_staff: usize, n_days: usize) {
    for staff_idx in 0..n_staff {
        for day_idx in 0..n_days {
            let group = vars.for_staff_day(staff_idx, day_idx);
            if group.len() < 2 {
                continue;
            }
            let row = model.add_row();
            model.set_row_upper(row, 1.0);
            for var in group {
                model.set_weight(row, var.col, 1.0);
            }
        }
    }
}

fn install_weekly_caps(
    model: &mut Model,
    roster: &Roster,
    calendar: &Calendar,
    vars: &VarTable,
    force: bool,
) {
    for (staff_idx, staff) in roster.staff().iter().enumerate() {
        let cap = roster::effective_week_cap(staff, force);
        for week in calendar.weeks() {
            let cols: Vec<_> = week
                .iter()
                .flat_map(|&day_idx| vars.for_staff_day(staff_idx, day_idx))
                .map(|var| var.col)
                .collect();
            if cols.is_empty() {
                continue;
            }
            let row = model.add_row();
            model.set_row_upper(row, f64::from(cap));
            for col in cols {
                model.set_weight(row, col, 1.0);
            }
        }
    }
}

/// No more than six working days in any 7-day window of the date list.
fn install_consecutive_limit(model: &mut Model, vars: &VarTable, n_staff: usize, n_days: usize) {
    let window = MAX_CONSECUTIVE_DAYS + 1;
    if n_days < window {
        return;
    }
    for staff_idx in 0..n_staff {
        for start in 0..=(n_days - window) {
            let cols: Vec<_> = (start..start + window)
                .flat_map(|day_idx| vars.for_staff_day(staff_idx, day_idx))
                .map(|var| var.col)
                .collect();
            if cols.is_empty() {
                continue;
            }
            let row = model.add_row();
            model.set_row_upper(row, MAX_CONSECUTIVE_DAYS as f64);
            for col in cols {
                model.set_weight(row, col, 1.0);
            }
        }
    }
}

/// Per-slot coverage with an integer shortage slack. The penalty is high
/// enough to act as a hard constraint while keeping the model feasible.
fn install_coverage(model: &mut Model, calendar: &Calendar, table: &OptionTable, vars: &VarTable) {
    for (day_idx, day) in calendar.days().iter().enumerate() {
        for slot in &day.slots {
            if slot.required == 0 {
                continue;
            }
            let row = model.add_row();
            model.set_row_lower(row, f64::from(slot.required));
            for var in vars.for_day(day_idx) {
                if table.options(var.staff, var.day)[var.option].covers(slot.slot) {
                    model.set_weight(row, var.col, 1.0);
                }
            }
            let slack = model.add_integer();
            model.set_col_lower(slack, 0.0);
            model.set_obj_coeff(slack, SLOT_SHORTAGE_PENALTY);
            model.set_weight(row, slack, 1.0);
        }
    }
}

/// The manager floor is its own policy, independent of the general staffing
/// minimum: it holds on every slot of the open window, including slots whose
/// general requirement is zero.
fn install_manager_floor(
    model: &mut Model,
    roster: &Roster,
    calendar: &Calendar,
    table: &OptionTable,
    vars: &VarTable,
) {
    let floor = calendar.min_manager();
    if floor == 0 {
        return;
    }
    for (day_idx, day) in calendar.days().iter().enumerate() {
        for slot in &day.slots {
            let row = model.add_row();
            model.set_row_lower(row, f64::from(floor));
            for var in vars.for_day(day_idx) {
                if roster.get(var.staff).role == Role::Manager
                    && table.options(var.staff, var.day)[var.option].covers(slot.slot)
                {
                    model.set_weight(row, var.col, 1.0);
                }
            }
            let slack = model.add_integer();
            model.set_col_lower(slack, 0.0);
            model.set_obj_coeff(slack, MANAGER_SHORTAGE_PENALTY);
            model.set_weight(row, slack, 1.0);
        }
    }
}

/// Rookies on a slot must be matched by mentors on the same slot. Where no
/// mentor could ever reach the slot, each covering rookie variable pays the
/// penalty directly instead.
fn install_ojt(
    model: &mut Model,
    roster: &Roster,
    calendar: &Calendar,
    table: &OptionTable,
    vars: &VarTable,
    objective: &mut [f64],
) {
    for (day_idx, day) in calendar.days().iter().enumerate() {
        for slot in &day.slots {
            let mut mentors = Vec::new();
            let mut rookies = Vec::new();
            for var in vars.for_day(day_idx) {
                if !table.options(var.staff, var.day)[var.option].covers(slot.slot) {
                    continue;
                }
                let staff = roster.get(var.staff);
                if roster::is_mentor(staff) {
                    mentors.push(var);
                } else if roster::is_rookie(staff) {
                    rookies.push(var);
                }
            }
            if rookies.is_empty() {
                continue;
            }
            if mentors.is_empty() {
                for var in &rookies {
                    objective[var.id] += OJT_GAP_PENALTY;
                }
                continue;
            }

            let row = model.add_row();
            model.set_row_lower(row, 0.0);
            for var in &mentors {
                model.set_weight(row, var.col, 1.0);
            }
            for var in &rookies {
                model.set_weight(row, var.col, -1.0);
            }
            let slack = model.add_col();
            model.set_col_lower(slack, 0.0);
            model.set_obj_coeff(slack, OJT_GAP_PENALTY);
            model.set_weight(row, slack, 1.0);
        }
    }
}

/// Each open day should field a combined power score of at least 1.5x its
/// base head requirement, so the roster is not all bottom-rank staff.
fn install_power_balance(model: &mut Model, roster: &Roster, calendar: &Calendar, vars: &VarTable) {
    for (day_idx, day) in calendar.days().iter().enumerate() {
        if !day.is_open() || day.base_required == 0 || vars.day_var_count(day_idx) == 0 {
            continue;
        }
        let row = model.add_row();
        model.set_row_lower(row, POWER_TARGET_FACTOR * f64::from(day.base_required));
        for var in vars.for_day(day_idx) {
            model.set_weight(row, var.col, power_score(roster.get(var.staff).rank));
        }
        let slack = model.add_col();
        model.set_col_lower(slack, 0.0);
        model.set_obj_coeff(slack, POWER_BALANCE_PENALTY);
        model.set_weight(row, slack, 1.0);
    }
}
