//! Hard-constraint filtering of staff for one (date, shift) slot.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};

use crate::database::models::{
    NightPreallocation, Preference, PreferenceType, ShiftType, Staff, WeekPattern,
};

use super::calendar::month_key;
use super::constraints::{ConstraintConfig, FLEXIBLE_WEEK_HOURS};
use super::input::{LeaveIndex, PreferenceIndex};
use super::rest_days::RestDayPlan;
use super::state::{RunState, StaffWeekState};

/// Minimum hours between the end of one shift and the start of the next.
pub const MIN_REST_HOURS: i64 = 11;

/// The slot being filled.
#[derive(Debug, Clone, Copy)]
pub struct SlotContext<'a> {
    pub date: NaiveDate,
    pub week: usize,
    pub shift: &'a ShiftType,
    pub hours: u32,
    /// The date falls on the configured holiday weekday.
    pub on_holiday: bool,
}

/// An eligible staff member with the values the ranker sorts on.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub staff: &'a Staff,
    pub pre_allocated: bool,
    pub preference_bound: bool,
    /// 0 when the shift keeps the staff's week to shift types already worked.
    pub consistency: u8,
    pub total: u32,
    pub shift_count: u32,
}

/// Why a staff member was excluded from a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    UnknownStaff,
    WardMismatch,
    OnLeave,
    DailyCap,
    MonthlyCap,
    WeeklyHours,
    HolidayQuota,
    ProtectedDay,
    Preference,
    RestGap,
    ConsecutiveDays,
    ConsecutiveNights,
    MonthlyNights,
}

pub struct CandidateFilter<'a> {
    config: &'a ConstraintConfig,
    leaves: &'a LeaveIndex<'a>,
    preferences: &'a PreferenceIndex<'a>,
    plan: &'a RestDayPlan,
}

impl<'a> CandidateFilter<'a> {
    pub fn new(
        config: &'a ConstraintConfig,
        leaves: &'a LeaveIndex<'a>,
        preferences: &'a PreferenceIndex<'a>,
        plan: &'a RestDayPlan,
    ) -> Self {
        Self {
            config,
            leaves,
            preferences,
            plan,
        }
    }

    /// Pre-allocated staff for a night slot. Only ward, leave and the
    /// same-day cap apply to them.
    pub fn pre_allocated<'s>(
        &self,
        slot: &SlotContext<'_>,
        allocations: &[&NightPreallocation],
        staff: &'s [Staff],
        run: &RunState,
    ) -> Vec<Candidate<'s>> {
        if !slot.shift.is_night() {
            return Vec::new();
        }

        let mut candidates: Vec<Candidate<'s>> = Vec::new();
        for allocation in allocations
            .iter()
            .filter(|a| a.shift_id == slot.shift.shift_id && a.covers(slot.date))
        {
            let Some(member) = staff.iter().find(|s| s.staff_id == allocation.staff_id) else {
                log::warn!(
                    "{} {}: pre-allocated staff {} is not on the roster",
                    slot.date,
                    slot.shift.name,
                    allocation.staff_id
                );
                continue;
            };
            if candidates.iter().any(|c| c.staff.staff_id == member.staff_id) {
                continue;
            }
            match self.check_pre_allocated(slot, member, run.get(&member.staff_id)) {
                Ok(state) => candidates.push(self.candidate(slot, member, state, true)),
                Err(reason) => log::debug!(
                    "{} {}: skipping pre-allocated {} ({:?})",
                    slot.date,
                    slot.shift.name,
                    member.staff_id,
                    reason
                ),
            }
        }
        candidates
    }

    /// Ward staff passing every hard constraint, skipping `excluded` ids.
    pub fn eligible<'s>(
        &self,
        slot: &SlotContext<'_>,
        staff: &'s [Staff],
        excluded: &HashSet<&str>,
        run: &RunState,
    ) -> Vec<Candidate<'s>> {
        staff
            .iter()
            .filter(|s| s.ward == slot.shift.ward)
            .filter(|s| !excluded.contains(s.staff_id.as_str()))
            .filter_map(|member| match self.check(slot, member, run.get(&member.staff_id)) {
                Ok(state) => Some(self.candidate(slot, member, state, false)),
                Err(reason) => {
                    log::trace!(
                        "{} {}: {} rejected ({:?})",
                        slot.date,
                        slot.shift.name,
                        member.staff_id,
                        reason
                    );
                    None
                }
            })
            .collect()
    }

    pub fn check_pre_allocated<'r>(
        &self,
        slot: &SlotContext<'_>,
        staff: &Staff,
        state: Option<&'r StaffWeekState>,
    ) -> Result<&'r StaffWeekState, Rejection> {
        let state = state.ok_or(Rejection::UnknownStaff)?;
        if staff.ward != slot.shift.ward {
            return Err(Rejection::WardMismatch);
        }
        if self.leaves.is_on_leave(&staff.staff_id, slot.date) {
            return Err(Rejection::OnLeave);
        }
        if state.count_on(slot.date) >= self.config.max_per_day {
            return Err(Rejection::DailyCap);
        }
        Ok(state)
    }

    /// Applies every hard constraint of the generic path.
    pub fn check<'r>(
        &self,
        slot: &SlotContext<'_>,
        staff: &Staff,
        state: Option<&'r StaffWeekState>,
    ) -> Result<&'r StaffWeekState, Rejection> {
        let config = self.config;
        let state = self.check_pre_allocated(slot, staff, state)?;
        let month = month_key(slot.date);
        let is_night = slot.shift.is_night();

        if state.count_in_month(&month) >= config.max_per_month {
            return Err(Rejection::MonthlyCap);
        }
        if config.is_flexible_workweek {
            if state.weekly_hours(slot.week) + slot.hours > FLEXIBLE_WEEK_HOURS {
                return Err(Rejection::WeeklyHours);
            }
            if config.require_holiday && slot.on_holiday && state.holidays_used(slot.week) > 0 {
                return Err(Rejection::HolidayQuota);
            }
        }
        if !is_night && self.plan.is_protected(&staff.staff_id, slot.week, slot.date) {
            return Err(Rejection::ProtectedDay);
        }
        if let Some(preference) = self.preference_for(&staff.staff_id, slot.date) {
            if !preference_allows(preference, slot, state) {
                return Err(Rejection::Preference);
            }
        }
        if let Some(last_end) = state.last_shift_end {
            let (start, _) = slot.shift.window_on(slot.date);
            if start - last_end < Duration::hours(MIN_REST_HOURS) {
                return Err(Rejection::RestGap);
            }
        }
        if config.max_consecutive > 0 && state.streak_before(slot.date) >= config.max_consecutive {
            return Err(Rejection::ConsecutiveDays);
        }
        if is_night {
            if state.night_streak_before(slot.date) >= config.max_night_consecutive {
                return Err(Rejection::ConsecutiveNights);
            }
            if state.nights_in_month(&month) >= config.max_night_per_month {
                return Err(Rejection::MonthlyNights);
            }
        }
        Ok(state)
    }

    fn preference_for(&self, staff_id: &str, date: NaiveDate) -> Option<&'a Preference> {
        if !self.config.apply_preferences {
            return None;
        }
        self.preferences.get(staff_id, date)
    }

    fn candidate<'s>(
        &self,
        slot: &SlotContext<'_>,
        staff: &'s Staff,
        state: &StaffWeekState,
        pre_allocated: bool,
    ) -> Candidate<'s> {
        let shift_id = slot.shift.shift_id.as_str();
        let consistency = match state.week(slot.week) {
            Some(tally)
                if self.config.week_shift_consistency
                    && !tally.shift_types.is_empty()
                    && !tally.shift_types.contains(shift_id) =>
            {
                1
            }
            _ => 0,
        };

        Candidate {
            staff,
            pre_allocated,
            preference_bound: self.preference_for(&staff.staff_id, slot.date).is_some(),
            consistency,
            total: state.total,
            shift_count: state.count_for_shift(shift_id),
        }
    }
}

/// Whether a preference lets the staff take this slot's shift.
fn preference_allows(preference: &Preference, slot: &SlotContext<'_>, state: &StaffWeekState) -> bool {
    let shift_id = slot.shift.shift_id.as_str();
    let primary = preference.shift_id_1.as_str();

    match preference.preference_type {
        PreferenceType::Single => shift_id == primary,
        PreferenceType::Dual => {
            let Some(secondary) = preference.shift_id_2.as_deref() else {
                return shift_id == primary;
            };
            if shift_id != primary && shift_id != secondary {
                return false;
            }
            match preference.week_pattern {
                Some(WeekPattern::Alternate) => {
                    let expected = if slot.week % 2 == 1 { primary } else { secondary };
                    shift_id == expected
                }
                Some(WeekPattern::Consecutive) => {
                    let expected =
                        if state.count_for_shift(primary) <= state.count_for_shift(secondary) {
                            primary
                        } else {
                            secondary
                        };
                    shift_id == expected
                }
                None => true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{LeaveRecord, LeaveType};
    use crate::scheduling::state::WorkedShift;
    use chrono::NaiveTime;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn time(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn slot(shift: &ShiftType, d: u32) -> SlotContext<'_> {
        SlotContext {
            date: date(d),
            week: 1,
            shift,
            hours: 8,
            on_holiday: false,
        }
    }

    struct Fixture {
        staff: Vec<Staff>,
        day: ShiftType,
        evening: ShiftType,
        night: ShiftType,
        config: ConstraintConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                staff: vec![
                    Staff::new("S1", "Ana", None, "ICU"),
                    Staff::new("S2", "Ben", None, "ICU"),
                    Staff::new("S3", "Cai", None, "ER"),
                ],
                day: ShiftType::new("D", "Day", time(8), time(16), "ICU", 1),
                evening: ShiftType::new("E", "Evening", time(16), time(0), "ICU", 1),
                night: ShiftType::new("N", "Night", time(0), time(8), "ICU", 1),
                config: ConstraintConfig::default(),
            }
        }
    }

    #[test]
    fn test_ward_and_leave_are_excluded() {
        let fx = Fixture::new();
        let leaves = vec![LeaveRecord::new("S2", LeaveType::Sick, date(1), date(10), true)];
        let leave_index = LeaveIndex::new(&leaves);
        let preferences = PreferenceIndex::empty();
        let plan = RestDayPlan::default();
        let filter = CandidateFilter::new(&fx.config, &leave_index, &preferences, &plan);
        let run = RunState::new(&fx.staff, 1);

        let eligible = filter.eligible(&slot(&fx.day, 4), &fx.staff, &HashSet::new(), &run);

        let ids: Vec<&str> = eligible.iter().map(|c| c.staff.staff_id.as_str()).collect();
        assert_eq!(ids, vec!["S1"]);
        assert_eq!(
            filter.check(&slot(&fx.day, 4), &fx.staff[1], run.get("S2")).unwrap_err(),
            Rejection::OnLeave
        );
    }

    #[test]
    fn test_unapproved_leave_does_not_block() {
        let fx = Fixture::new();
        let leaves = vec![LeaveRecord::new("S1", LeaveType::Annual, date(1), date(10), false)];
        let leave_index = LeaveIndex::new(&leaves);
        let preferences = PreferenceIndex::empty();
        let plan = RestDayPlan::default();
        let filter = CandidateFilter::new(&fx.config, &leave_index, &preferences, &plan);
        let run = RunState::new(&fx.staff, 1);

        assert!(filter.check(&slot(&fx.day, 4), &fx.staff[0], run.get("S1")).is_ok());
    }

    #[test]
    fn test_rest_gap_after_evening_shift() {
        let fx = Fixture::new();
        let leave_index = LeaveIndex::default();
        let preferences = PreferenceIndex::empty();
        let plan = RestDayPlan::default();
        let filter = CandidateFilter::new(&fx.config, &leave_index, &preferences, &plan);
        let mut run = RunState::new(&fx.staff, 1);
        run.record(
            "S1",
            WorkedShift {
                date: date(4),
                week: 1,
                shift: &fx.evening,
                hours: 8,
                on_holiday: false,
            },
        );

        // Evening ends at midnight; a 08:00 start leaves only 8 hours.
        assert_eq!(
            filter.check(&slot(&fx.day, 5), &fx.staff[0], run.get("S1")).unwrap_err(),
            Rejection::RestGap
        );
        assert!(filter.check(&slot(&fx.evening, 5), &fx.staff[0], run.get("S1")).is_ok());
    }

    #[test]
    fn test_daily_cap_and_weekly_hours() {
        let fx = Fixture::new();
        let leave_index = LeaveIndex::default();
        let preferences = PreferenceIndex::empty();
        let plan = RestDayPlan::default();
        let filter = CandidateFilter::new(&fx.config, &leave_index, &preferences, &plan);
        let mut run = RunState::new(&fx.staff, 1);
        run.record(
            "S1",
            WorkedShift {
                date: date(4),
                week: 1,
                shift: &fx.night,
                hours: 8,
                on_holiday: false,
            },
        );

        assert_eq!(
            filter.check(&slot(&fx.day, 4), &fx.staff[0], run.get("S1")).unwrap_err(),
            Rejection::DailyCap
        );

        let heavy = SlotContext {
            hours: 40,
            ..slot(&fx.day, 6)
        };
        assert_eq!(
            filter.check(&heavy, &fx.staff[0], run.get("S1")).unwrap_err(),
            Rejection::WeeklyHours
        );
    }

    #[test]
    fn test_protected_day_only_blocks_day_shifts() {
        let fx = Fixture::new();
        let leave_index = LeaveIndex::default();
        let preferences = PreferenceIndex::empty();
        let staff = &fx.staff[..1];
        let calendar = crate::scheduling::SchedulingCalendar::new(
            &crate::scheduling::DateRange::new(date(4), date(10)).unwrap(),
        );
        let plan = crate::scheduling::RestDayPlanner::new(chrono::Weekday::Sun).plan(
            staff,
            &calendar,
            &mut <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(0),
        );
        let holiday = plan.holiday("S1", 1).unwrap();
        let filter = CandidateFilter::new(&fx.config, &leave_index, &preferences, &plan);
        let run = RunState::new(staff, 1);

        let day_slot = SlotContext {
            date: holiday,
            on_holiday: true,
            ..slot(&fx.day, 10)
        };
        let night_slot = SlotContext {
            shift: &fx.night,
            ..day_slot
        };

        assert_eq!(
            filter.check(&day_slot, &staff[0], run.get("S1")).unwrap_err(),
            Rejection::ProtectedDay
        );
        assert!(filter.check(&night_slot, &staff[0], run.get("S1")).is_ok());
    }

    #[test]
    fn test_dual_alternate_preference() {
        let fx = Fixture::new();
        let prefs = vec![Preference::dual("S1", "2024-03", "D", "E", WeekPattern::Alternate)];
        let leave_index = LeaveIndex::default();
        let preferences = PreferenceIndex::new(&prefs);
        let plan = RestDayPlan::default();
        let filter = CandidateFilter::new(&fx.config, &leave_index, &preferences, &plan);
        let run = RunState::new(&fx.staff, 2);

        let odd_week_day = slot(&fx.day, 4);
        let even_week_day = SlotContext {
            week: 2,
            ..slot(&fx.day, 11)
        };
        let even_week_evening = SlotContext {
            week: 2,
            ..slot(&fx.evening, 11)
        };

        assert!(filter.check(&odd_week_day, &fx.staff[0], run.get("S1")).is_ok());
        assert_eq!(
            filter.check(&even_week_day, &fx.staff[0], run.get("S1")).unwrap_err(),
            Rejection::Preference
        );
        assert!(filter.check(&even_week_evening, &fx.staff[0], run.get("S1")).is_ok());
        assert_eq!(
            filter.check(&slot(&fx.night, 4), &fx.staff[0], run.get("S1")).unwrap_err(),
            Rejection::Preference
        );
    }

    #[test]
    fn test_consecutive_preference_follows_counts() {
        let fx = Fixture::new();
        let prefs = vec![Preference::dual("S1", "2024-03", "D", "E", WeekPattern::Consecutive)];
        let leave_index = LeaveIndex::default();
        let preferences = PreferenceIndex::new(&prefs);
        let plan = RestDayPlan::default();
        let filter = CandidateFilter::new(&fx.config, &leave_index, &preferences, &plan);
        let mut run = RunState::new(&fx.staff, 1);

        assert!(filter.check(&slot(&fx.day, 4), &fx.staff[0], run.get("S1")).is_ok());
        run.record(
            "S1",
            WorkedShift {
                date: date(4),
                week: 1,
                shift: &fx.day,
                hours: 8,
                on_holiday: false,
            },
        );

        assert_eq!(
            filter.check(&slot(&fx.day, 5), &fx.staff[0], run.get("S1")).unwrap_err(),
            Rejection::Preference
        );
        assert!(filter.check(&slot(&fx.evening, 5), &fx.staff[0], run.get("S1")).is_ok());
    }

    #[test]
    fn test_pre_allocated_bypasses_generic_rules() {
        let fx = Fixture::new();
        let prefs = vec![Preference::single("S1", "2024-03", "D")];
        let leave_index = LeaveIndex::default();
        let preferences = PreferenceIndex::new(&prefs);
        let plan = RestDayPlan::default();
        let filter = CandidateFilter::new(&fx.config, &leave_index, &preferences, &plan);
        let run = RunState::new(&fx.staff, 1);
        let allocation = NightPreallocation::new(date(1), date(10), "S1", "N");
        let allocations = vec![&allocation];

        let night_slot = slot(&fx.night, 4);
        let pre = filter.pre_allocated(&night_slot, &allocations, &fx.staff, &run);
        let generic = filter.eligible(
            &night_slot,
            &fx.staff,
            &HashSet::new(),
            &run,
        );

        assert_eq!(pre.len(), 1);
        assert!(pre[0].pre_allocated);
        assert!(generic.iter().all(|c| c.staff.staff_id != "S1"));
    }

    #[test]
    fn test_consistency_score() {
        let fx = Fixture::new();
        let leave_index = LeaveIndex::default();
        let preferences = PreferenceIndex::empty();
        let plan = RestDayPlan::default();
        let filter = CandidateFilter::new(&fx.config, &leave_index, &preferences, &plan);
        let mut run = RunState::new(&fx.staff, 1);
        run.record(
            "S1",
            WorkedShift {
                date: date(4),
                week: 1,
                shift: &fx.day,
                hours: 8,
                on_holiday: false,
            },
        );

        let evening = filter.eligible(&slot(&fx.evening, 5), &fx.staff, &HashSet::new(), &run);
        let day = filter.eligible(&slot(&fx.day, 5), &fx.staff, &HashSet::new(), &run);

        let score = |cands: &[Candidate<'_>], id: &str| {
            cands.iter().find(|c| c.staff.staff_id == id).map(|c| c.consistency)
        };
        assert_eq!(score(&evening, "S1"), Some(1));
        assert_eq!(score(&evening, "S2"), Some(0));
        assert_eq!(score(&day, "S1"), Some(0));
    }
}
