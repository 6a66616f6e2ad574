//! Post-generation invariant checks.
//!
//! The validator only reads a finished roster. It never fails: an internal
//! problem (such as an assignment pointing at a shift missing from the
//! catalog) turns into a failed report with the message in `error`.

use std::collections::{BTreeSet, HashMap};

use anyhow::{Result, anyhow};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::database::models::{AssignmentInput, NightPreallocation, ShiftType, Staff};

use super::calendar::{DateRange, SchedulingCalendar};
use super::input::{AllocationIndex, LeaveIndex, RosterInput};

/// Most distinct shift types one staff may work in a single week.
pub const MAX_SHIFT_TYPES_PER_WEEK: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub passed: bool,
    pub details: Vec<String>,
}

impl Default for CheckResult {
    fn default() -> Self {
        Self {
            passed: true,
            details: Vec::new(),
        }
    }
}

impl CheckResult {
    fn violation(&mut self, detail: String) {
        self.passed = false;
        self.details.push(detail);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub overall_passed: bool,
    pub night_shift_priority: CheckResult,
    pub rest_days_arrangement: CheckResult,
    pub weekly_shift_consistency: CheckResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationReport {
    fn from_checks(
        night_shift_priority: CheckResult,
        rest_days_arrangement: CheckResult,
        weekly_shift_consistency: CheckResult,
    ) -> Self {
        Self {
            overall_passed: night_shift_priority.passed
                && rest_days_arrangement.passed
                && weekly_shift_consistency.passed,
            night_shift_priority,
            rest_days_arrangement,
            weekly_shift_consistency,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            overall_passed: false,
            night_shift_priority: CheckResult::default(),
            rest_days_arrangement: CheckResult::default(),
            weekly_shift_consistency: CheckResult::default(),
            error: Some(error.into()),
        }
    }

    /// Every violation message, in check order.
    pub fn violations(&self) -> impl Iterator<Item = &str> {
        self.night_shift_priority
            .details
            .iter()
            .chain(&self.rest_days_arrangement.details)
            .chain(&self.weekly_shift_consistency.details)
            .map(String::as_str)
    }
}

pub struct ScheduleValidator<'a> {
    staff: &'a [Staff],
    shifts: &'a [ShiftType],
    allocations: &'a [NightPreallocation],
    leaves: LeaveIndex<'a>,
    holiday_weekday: Weekday,
}

type WorkedByDay<'a> = HashMap<(&'a str, NaiveDate), Vec<&'a ShiftType>>;

impl<'a> ScheduleValidator<'a> {
    pub fn new(input: &'a RosterInput, holiday_weekday: Weekday) -> Self {
        Self {
            staff: &input.staff,
            shifts: &input.shifts,
            allocations: &input.night_allocations,
            leaves: LeaveIndex::new(&input.leaves),
            holiday_weekday,
        }
    }

    pub fn validate(&self, assignments: &[AssignmentInput], range: &DateRange) -> ValidationReport {
        match self.run_checks(assignments, range) {
            Ok(report) => {
                if !report.overall_passed {
                    log::debug!(
                        "Roster for {} failed validation with {} violations",
                        range,
                        report.violations().count()
                    );
                }
                report
            }
            Err(e) => {
                log::error!("Validation of {} aborted: {}", range, e);
                ValidationReport::failed(e.to_string())
            }
        }
    }

    fn run_checks(&self, assignments: &[AssignmentInput], range: &DateRange) -> Result<ValidationReport> {
        let calendar = SchedulingCalendar::new(range);
        let worked = self.worked_by_day(assignments)?;

        Ok(ValidationReport::from_checks(
            self.check_pre_allocations(assignments, range),
            self.check_rest_days(&worked, &calendar),
            self.check_shift_variety(&worked, &calendar),
        ))
    }

    fn worked_by_day<'r>(&self, assignments: &'r [AssignmentInput]) -> Result<WorkedByDay<'r>>
    where
        'a: 'r,
    {
        let mut worked: WorkedByDay<'r> = HashMap::new();
        for assignment in assignments {
            let Some(staff_id) = assignment.staff_id.as_deref() else {
                continue;
            };
            let shift = self
                .shifts
                .iter()
                .find(|s| s.shift_id == assignment.shift_id)
                .ok_or_else(|| {
                    anyhow!(
                        "Assignment on {} references unknown shift {}",
                        assignment.date,
                        assignment.shift_id
                    )
                })?;
            worked.entry((staff_id, assignment.date)).or_default().push(shift);
        }
        Ok(worked)
    }

    /// Every (date, staff, shift) implied by a pre-allocation must appear
    /// verbatim, except on dates the staff is on approved leave.
    fn check_pre_allocations(&self, assignments: &[AssignmentInput], range: &DateRange) -> CheckResult {
        let mut check = CheckResult::default();
        let index = AllocationIndex::new(self.allocations, range);

        for (date, allocation) in index.iter() {
            if self.leaves.is_on_leave(&allocation.staff_id, date) {
                continue;
            }
            let honored = assignments.iter().any(|a| {
                a.date == date && a.shift_id == allocation.shift_id && a.is_for(&allocation.staff_id)
            });
            if !honored {
                check.violation(format!(
                    "Pre-allocation missed: {} staff {} is not on night shift {}",
                    date, allocation.staff_id, allocation.shift_id
                ));
            }
        }
        check
    }

    fn check_rest_days(&self, worked: &WorkedByDay<'_>, calendar: &SchedulingCalendar) -> CheckResult {
        let mut check = CheckResult::default();

        for member in self.staff {
            let staff_id = member.staff_id.as_str();
            for (week, dates) in calendar.weeks() {
                let mut free_weekdays = 0;
                let mut has_weekdays = false;

                for &date in dates {
                    let shifts = worked.get(&(staff_id, date));
                    if date.weekday() == self.holiday_weekday {
                        let day_shifts: Vec<&str> = shifts
                            .into_iter()
                            .flatten()
                            .filter(|s| !s.is_night())
                            .map(|s| s.name.as_str())
                            .collect();
                        if !day_shifts.is_empty() {
                            check.violation(format!(
                                "Holiday worked: week {} {} staff {} has non-night shifts {:?}",
                                week, date, staff_id, day_shifts
                            ));
                        }
                    } else {
                        has_weekdays = true;
                        if shifts.is_none_or(|s| s.is_empty()) {
                            free_weekdays += 1;
                        }
                    }
                }

                if has_weekdays && free_weekdays == 0 {
                    check.violation(format!(
                        "Missing rest day: week {} staff {} has no free weekday",
                        week, staff_id
                    ));
                }
            }
        }
        check
    }

    fn check_shift_variety(&self, worked: &WorkedByDay<'_>, calendar: &SchedulingCalendar) -> CheckResult {
        let mut check = CheckResult::default();

        for member in self.staff {
            let staff_id = member.staff_id.as_str();
            for (week, dates) in calendar.weeks() {
                let shifts: BTreeSet<(&str, &str)> = dates
                    .iter()
                    .filter_map(|&date| worked.get(&(staff_id, date)))
                    .flatten()
                    .map(|s| (s.shift_id.as_str(), s.name.as_str()))
                    .collect();

                if shifts.len() > MAX_SHIFT_TYPES_PER_WEEK {
                    let names: Vec<&str> = shifts.iter().map(|(_, name)| *name).collect();
                    check.violation(format!(
                        "Too many shift types: week {} staff {} works {} types {:?}",
                        week,
                        staff_id,
                        shifts.len(),
                        names
                    ));
                }
            }
        }
        check
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use pretty_assertions::assert_eq;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn time(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn input() -> RosterInput {
        RosterInput {
            staff: vec![Staff::new("S1", "Ana", None, "ICU")],
            shifts: vec![
                ShiftType::new("D", "Day", time(8), time(16), "ICU", 1),
                ShiftType::new("E", "Evening", time(16), time(0), "ICU", 1),
                ShiftType::new("N", "Night", time(0), time(8), "ICU", 1),
            ],
            ..RosterInput::default()
        }
    }

    fn week() -> DateRange {
        // Monday to Sunday.
        DateRange::new(date(4), date(10)).unwrap()
    }

    fn staffed(d: u32, shift: &str) -> AssignmentInput {
        AssignmentInput::staffed(date(d), shift, "S1", 8)
    }

    #[test]
    fn test_clean_roster_passes() {
        let input = input();
        let assignments: Vec<_> = (4..=8).map(|d| staffed(d, "D")).collect();

        let report = ScheduleValidator::new(&input, Weekday::Sun).validate(&assignments, &week());

        assert!(report.overall_passed);
        assert_eq!(report.violations().count(), 0);
    }

    #[test]
    fn test_holiday_day_shift_and_missing_rest_day() {
        let input = input();
        let assignments: Vec<_> = (4..=10).map(|d| staffed(d, "D")).collect();

        let report = ScheduleValidator::new(&input, Weekday::Sun).validate(&assignments, &week());

        assert!(!report.overall_passed);
        assert!(!report.rest_days_arrangement.passed);
        assert_eq!(report.rest_days_arrangement.details.len(), 2);
        assert!(report.night_shift_priority.passed);
    }

    #[test]
    fn test_night_on_holiday_is_allowed() {
        let input = input();
        let mut assignments: Vec<_> = (4..=7).map(|d| staffed(d, "D")).collect();
        assignments.push(staffed(10, "N"));

        let report = ScheduleValidator::new(&input, Weekday::Sun).validate(&assignments, &week());

        assert!(report.rest_days_arrangement.passed);
    }

    #[test]
    fn test_three_shift_types_in_a_week() {
        let input = input();
        let assignments = vec![staffed(4, "N"), staffed(5, "D"), staffed(6, "E")];

        let report = ScheduleValidator::new(&input, Weekday::Sun).validate(&assignments, &week());

        assert!(!report.weekly_shift_consistency.passed);
        assert_eq!(report.weekly_shift_consistency.details.len(), 1);
    }

    #[test]
    fn test_missed_pre_allocation() {
        let mut input = input();
        input.night_allocations = vec![NightPreallocation::new(date(4), date(5), "S1", "N")];
        let assignments = vec![staffed(4, "N")];

        let report = ScheduleValidator::new(&input, Weekday::Sun).validate(&assignments, &week());

        assert!(!report.night_shift_priority.passed);
        assert_eq!(report.night_shift_priority.details.len(), 1);
        assert!(report.night_shift_priority.details[0].contains("2024-03-05"));
    }

    #[test]
    fn test_pre_allocation_on_leave_is_skipped() {
        use crate::database::models::{LeaveRecord, LeaveType};

        let mut input = input();
        input.night_allocations = vec![NightPreallocation::new(date(4), date(5), "S1", "N")];
        input.leaves = vec![LeaveRecord::new("S1", LeaveType::Sick, date(5), date(5), true)];
        let assignments = vec![staffed(4, "N")];

        let report = ScheduleValidator::new(&input, Weekday::Sun).validate(&assignments, &week());

        assert!(report.night_shift_priority.passed);
    }

    #[test]
    fn test_unknown_shift_becomes_failed_report() {
        let input = input();
        let assignments = vec![staffed(4, "X")];

        let report = ScheduleValidator::new(&input, Weekday::Sun).validate(&assignments, &week());

        assert!(!report.overall_passed);
        assert!(report.error.as_deref().unwrap().contains("unknown shift X"));
    }

    #[test]
    fn test_report_json_shape() {
        let report = ValidationReport::failed("boom");
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["overall_passed"], false);
        assert_eq!(json["night_shift_priority"]["passed"], true);
        assert_eq!(json["error"], "boom");
    }
}
