use shared::types::{
    PrecheckReport, ResultMode, ScheduleConfig, Shift, SolveMode, SolveRequest,
};

use crate::domain::calendar::Calendar;
use crate::domain::greedy;
use crate::domain::options::OptionTable;
use crate::domain::precheck;
use crate::domain::roster::Roster;
use crate::domain::settings::EngineSettings;
use crate::domain::solver::{self, Tier, TierAttempt};
use crate::domain::validate::{self, CoverageViolation};
use crate::error::EngineError;

/// Orchestrates one solve: resolves the policy tables, walks the tier
/// ladder, falls back to the greedy filler, and validates whatever comes
/// out. Holds no per-request state; everything derived lives and dies with
/// a single call.
pub struct ShiftEngine {
    settings: EngineSettings,
}

/// The engine's answer. `violations` is diagnostic: slack-relaxed tiers and
/// the greedy filler may return schedules that undershoot some slots.
#[derive(Debug)]
pub struct ScheduleOutcome {
    pub mode: ResultMode,
    pub timed_out: bool,
    pub shifts: Vec<Shift>,
    pub violations: Vec<CoverageViolation>,
}

impl ShiftEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    /// Produces a schedule, or a successful empty outcome when even the
    /// greedy filler places nothing. Errors only on invalid input.
    #[tracing::instrument(
        skip(self, request),
        fields(
            staff = request.staff_list.len(),
            dates = request.dates.len(),
            mode = ?request.mode,
        )
    )]
    pub fn generate(&self, request: &SolveRequest) -> Result<ScheduleOutcome, EngineError> {
        validate_config(&request.config)?;

        let roster = Roster::build(&request.staff_list, &request.requests);
        let calendar = Calendar::resolve(&request.config, &request.dates);
        let patterns = &request.config.custom_shifts;

        // Auto and math walk the standard relaxation ladder; force mode
        // applies the force relaxations from the top tier down.
        let ladder: &[TierAttempt] = match request.mode {
            SolveMode::Auto | SolveMode::Math => &[
                TierAttempt {
                    tier: Tier::Balanced,
                    force: false,
                },
                TierAttempt {
                    tier: Tier::Coverage,
                    force: false,
                },
                TierAttempt {
                    tier: Tier::Legal,
                    force: true,
                },
            ],
            SolveMode::Force => &[
                TierAttempt {
                    tier: Tier::Balanced,
                    force: true,
                },
                TierAttempt {
                    tier: Tier::Coverage,
                    force: true,
                },
                TierAttempt {
                    tier: Tier::Legal,
                    force: true,
                },
            ],
        };

        let mut strict_table: Option<OptionTable> = None;
        let mut relaxed_table: Option<OptionTable> = None;
        for attempt in ladder {
            let cache = if attempt.force {
                &mut relaxed_table
            } else {
                &mut strict_table
            };
            let table = cache.get_or_insert_with(|| {
                OptionTable::build(&roster, &calendar, patterns, attempt.force)
            });

            match solver::solve_tier(&roster, &calendar, table, *attempt, &self.settings) {
                Ok(solution) => {
                    let violations = validate::check_coverage(&calendar, &solution.shifts);
                    return Ok(ScheduleOutcome {
                        mode: mode_tag(*attempt),
                        timed_out: solution.timed_out,
                        shifts: solution.shifts,
                        violations,
                    });
                }
                Err(failure) => {
                    tracing::warn!(
                        tier = ?attempt.tier,
                        force = attempt.force,
                        %failure,
                        "Tier attempt failed, relaxing"
                    );
                }
            }
        }

        let shifts = greedy::fill_schedule(&roster, &calendar, patterns);
        if shifts.is_empty() {
            tracing::warn!("No schedule could be produced at any tier");
            return Ok(ScheduleOutcome {
                mode: ResultMode::NoSolution,
                timed_out: false,
                shifts,
                violations: Vec::new(),
            });
        }
        let violations = validate::check_coverage(&calendar, &shifts);
        Ok(ScheduleOutcome {
            mode: ResultMode::Greedy,
            timed_out: false,
            shifts,
            violations,
        })
    }

    /// Coverage feasibility analysis without touching the solver.
    #[tracing::instrument(
        skip(self, request),
        fields(staff = request.staff_list.len(), dates = request.dates.len())
    )]
    pub fn precheck(&self, request: &SolveRequest) -> Result<PrecheckReport, EngineError> {
        validate_config(&request.config)?;

        let roster = Roster::build(&request.staff_list, &request.requests);
        let calendar = Calendar::resolve(&request.config, &request.dates);
        Ok(precheck::analyze(
            &roster,
            &calendar,
            &request.config.custom_shifts,
        ))
    }
}

fn mode_tag(attempt: TierAttempt) -> ResultMode {
    if attempt.force {
        return ResultMode::MathForce;
    }
    match attempt.tier {
        Tier::Balanced => ResultMode::MathTier3,
        Tier::Coverage => ResultMode::MathTier2,
        Tier::Legal => ResultMode::MathForce,
    }
}

fn validate_config(config: &ScheduleConfig) -> Result<(), EngineError> {
    for pattern in &config.custom_shifts {
        if pattern.start >= pattern.end {
            return Err(EngineError::InvalidInput(format!(
                "shift pattern {:?} ({} - {}) must end after it starts; \
                 overnight patterns are not supported",
                pattern.name, pattern.start, pattern.end
            )));
        }
    }
    for rule in &config.break_rules {
        if rule.min_hours < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "break rule threshold {} must not be negative",
                rule.min_hours
            )));
        }
    }
    Ok(())
}
