use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::time::TimeOfDay;

// region: Staff Model

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Leader,
    #[default]
    Staff,
    Rookie,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SalaryClass {
    Monthly,
    #[default]
    Hourly,
}

/// Evaluation rank, ordered best-first (`A < B < C < D`).
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Rank {
    A,
    #[default]
    B,
    C,
    D,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Staff {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, alias = "salary_type")]
    pub salary_class: SalaryClass,
    #[serde(default = "default_hourly_wage")]
    pub hourly_wage: f64,
    #[serde(default, alias = "evaluation")]
    pub rank: Rank,
    #[serde(default = "default_max_hours_day")]
    pub max_hours_day: f64,
    #[serde(default = "default_max_days_week")]
    pub max_days_week: u32,
    #[serde(default, deserialize_with = "date_list_or_csv")]
    pub unavailable_dates: Vec<NaiveDate>,
}

fn default_hourly_wage() -> f64 {
    1100.0
}

fn default_max_hours_day() -> f64 {
    8.0
}

fn default_max_days_week() -> u32 {
    5
}

/// Accepts either a JSON array of dates or the legacy comma-separated string.
fn date_list_or_csv<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<NaiveDate>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<NaiveDate>),
        Csv(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::List(dates) => Ok(dates),
        Raw::Csv(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.parse().map_err(serde::de::Error::custom))
            .collect(),
    }
}

// endregion: Staff Model

// region: Schedule Configuration

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShiftPattern {
    #[serde(default)]
    pub name: String,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct OpenWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct OpeningTimes {
    #[serde(default)]
    pub weekday: Option<OpenWindow>,
    #[serde(default)]
    pub weekend: Option<OpenWindow>,
    #[serde(default)]
    pub holiday: Option<OpenWindow>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StaffRequirements {
    #[serde(default = "default_min_weekday")]
    pub min_weekday: u32,
    #[serde(default = "default_min_weekend")]
    pub min_weekend: u32,
    #[serde(default = "default_min_holiday")]
    pub min_holiday: u32,
    #[serde(default = "default_min_manager")]
    pub min_manager: u32,
    /// Per-date replacements for the day-type base minimum.
    #[serde(default)]
    pub overrides: HashMap<NaiveDate, u32>,
}

impl Default for StaffRequirements {
    fn default() -> Self {
        Self {
            min_weekday: default_min_weekday(),
            min_weekend: default_min_weekend(),
            min_holiday: default_min_holiday(),
            min_manager: default_min_manager(),
            overrides: HashMap::new(),
        }
    }
}

fn default_min_weekday() -> u32 {
    2
}

fn default_min_weekend() -> u32 {
    3
}

fn default_min_holiday() -> u32 {
    3
}

fn default_min_manager() -> u32 {
    1
}

/// Extra staffing demanded in a time window on given UI weekdays (0=Sunday).
/// A window with `start > end` wraps past midnight.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReinforcementRule {
    #[serde(default)]
    pub days: Vec<u8>,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct BreakRule {
    pub min_hours: f64,
    pub break_minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub custom_shifts: Vec<ShiftPattern>,
    #[serde(default = "default_opening_time")]
    pub opening_time: TimeOfDay,
    #[serde(default = "default_closing_time")]
    pub closing_time: TimeOfDay,
    #[serde(default)]
    pub opening_times: OpeningTimes,
    #[serde(default)]
    pub staff_req: StaffRequirements,
    #[serde(default)]
    pub time_staff_req: Vec<ReinforcementRule>,
    #[serde(default = "default_break_rules")]
    pub break_rules: Vec<BreakRule>,
    /// UI weekday indices (0=Sunday) on which the location never opens.
    #[serde(default)]
    pub closed_days: Vec<u8>,
    #[serde(default)]
    pub special_holidays: Vec<NaiveDate>,
    /// Per-date opening-hour overrides.
    #[serde(default)]
    pub special_days: HashMap<NaiveDate, OpenWindow>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            custom_shifts: Vec::new(),
            opening_time: default_opening_time(),
            closing_time: default_closing_time(),
            opening_times: OpeningTimes::default(),
            staff_req: StaffRequirements::default(),
            time_staff_req: Vec::new(),
            break_rules: default_break_rules(),
            closed_days: Vec::new(),
            special_holidays: Vec::new(),
            special_days: HashMap::new(),
        }
    }
}

fn default_opening_time() -> TimeOfDay {
    TimeOfDay::from_minutes(9 * 60).unwrap_or(TimeOfDay::MIDNIGHT)
}

fn default_closing_time() -> TimeOfDay {
    TimeOfDay::from_minutes(22 * 60).unwrap_or(TimeOfDay::END_OF_DAY)
}

fn default_break_rules() -> Vec<BreakRule> {
    vec![
        BreakRule {
            min_hours: 6.0,
            break_minutes: 45,
        },
        BreakRule {
            min_hours: 8.0,
            break_minutes: 60,
        },
    ]
}

// endregion: Schedule Configuration

// region: Requests

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Off,
    Holiday,
    Work,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Approved,
    #[default]
    Pending,
    Rejected,
}

/// A staff preference request; only approved off/holiday requests are
/// consumed by the engine, as hard unavailability.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StaffRequest {
    pub staff_id: String,
    #[serde(alias = "dates")]
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: RequestKind,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default)]
    pub start: Option<TimeOfDay>,
    #[serde(default)]
    pub end: Option<TimeOfDay>,
}

impl StaffRequest {
    /// True when this request removes the date from the staff's availability.
    pub fn blocks_date(&self) -> bool {
        self.status == RequestStatus::Approved
            && matches!(self.kind, RequestKind::Off | RequestKind::Holiday)
    }
}

// endregion: Requests

// region: Engine Interface

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    Weekday,
    Weekend,
    Holiday,
    Closed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SolveMode {
    #[default]
    Auto,
    Math,
    Force,
}

/// Which stage of the solve ladder produced the returned shift list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResultMode {
    MathTier3,
    MathTier2,
    MathForce,
    Greedy,
    NoSolution,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SolveRequest {
    pub staff_list: Vec<Staff>,
    #[serde(default)]
    pub config: ScheduleConfig,
    pub dates: Vec<NaiveDate>,
    #[serde(default)]
    pub requests: Vec<StaffRequest>,
    #[serde(default)]
    pub mode: SolveMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Shift {
    pub staff_id: String,
    pub date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub break_minutes: u32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub overtime: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overtime_hours: Option<f64>,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScheduleResponse {
    pub status: ResponseStatus,
    pub mode: ResultMode,
    /// Set when the solver hit its wall-clock limit and the incumbent
    /// solution was accepted.
    #[serde(default, skip_serializing_if = "is_false")]
    pub timed_out: bool,
    pub shifts: Vec<Shift>,
}

// endregion: Engine Interface

// region: Pre-check Report

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    UnusableStaff,
    SlotShortage,
    WeeklyCapacity,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PrecheckWarning {
    pub kind: WarningKind,
    pub severity: WarningSeverity,
    pub message: String,
}

/// A maximal run of consecutive slots sharing the same shortage count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ShortageRange {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub shortage: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DailyDetail {
    pub date: NaiveDate,
    pub day_type: DayType,
    pub available_staff: u32,
    pub shortage_ranges: Vec<ShortageRange>,
    pub shortage_person_hours: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PrecheckSummary {
    pub open_days: u32,
    pub closed_days: u32,
    pub usable_staff: u32,
    pub unusable_staff: u32,
    pub days_with_shortage: u32,
    pub total_shortage_person_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PrecheckReport {
    pub feasible: bool,
    pub warnings: Vec<PrecheckWarning>,
    pub daily_details: Vec<DailyDetail>,
    pub summary: PrecheckSummary,
}

// endregion: Pre-check Report
