//! Running per-staff counters of one generation run.
//!
//! The map is created at run start, mutated only by the generator while it
//! walks dates in order, and summarised into weekly stats at the end.

use std::collections::{BTreeSet, HashMap};

use chrono::{NaiveDate, NaiveDateTime};

use crate::database::models::{ShiftType, Staff};

use super::calendar::month_key;

/// Counters for one scheduling week.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekTally {
    pub hours: u32,
    pub holiday_days: u32,
    pub rest_days: u32,
    pub worked_days: u32,
    pub shift_types: BTreeSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StaffWeekState {
    pub total: u32,
    pub shift_counts: HashMap<String, u32>,
    pub date_counts: HashMap<NaiveDate, u32>,
    pub month_counts: HashMap<String, u32>,
    pub night_month_counts: HashMap<String, u32>,
    /// Indexed by week - 1.
    pub weeks: Vec<WeekTally>,
    pub last_shift_end: Option<NaiveDateTime>,
    pub last_work_date: Option<NaiveDate>,
    pub consecutive_days: u32,
    pub last_night_date: Option<NaiveDate>,
    pub consecutive_nights: u32,
}

impl StaffWeekState {
    fn new(week_count: usize) -> Self {
        Self {
            weeks: vec![WeekTally::default(); week_count],
            ..Self::default()
        }
    }

    pub fn week(&self, week: usize) -> Option<&WeekTally> {
        week.checked_sub(1).and_then(|i| self.weeks.get(i))
    }

    fn week_mut(&mut self, week: usize) -> Option<&mut WeekTally> {
        week.checked_sub(1).and_then(|i| self.weeks.get_mut(i))
    }

    pub fn count_on(&self, date: NaiveDate) -> u32 {
        self.date_counts.get(&date).copied().unwrap_or(0)
    }

    pub fn count_for_shift(&self, shift_id: &str) -> u32 {
        self.shift_counts.get(shift_id).copied().unwrap_or(0)
    }

    pub fn count_in_month(&self, month: &str) -> u32 {
        self.month_counts.get(month).copied().unwrap_or(0)
    }

    pub fn nights_in_month(&self, month: &str) -> u32 {
        self.night_month_counts.get(month).copied().unwrap_or(0)
    }

    pub fn weekly_hours(&self, week: usize) -> u32 {
        self.week(week).map_or(0, |w| w.hours)
    }

    pub fn holidays_used(&self, week: usize) -> u32 {
        self.week(week).map_or(0, |w| w.holiday_days)
    }

    /// Streak of worked days ending the day before `date`.
    pub fn streak_before(&self, date: NaiveDate) -> u32 {
        match self.last_work_date {
            Some(last) if date.pred_opt() == Some(last) => self.consecutive_days,
            _ => 0,
        }
    }

    /// Streak of worked nights ending the day before `date`.
    pub fn night_streak_before(&self, date: NaiveDate) -> u32 {
        match self.last_night_date {
            Some(last) if date.pred_opt() == Some(last) => self.consecutive_nights,
            _ => 0,
        }
    }

    fn bump_streak(last: &mut Option<NaiveDate>, streak: &mut u32, date: NaiveDate) {
        match *last {
            Some(prev) if prev == date => {}
            Some(prev) if date.pred_opt() == Some(prev) => *streak += 1,
            _ => *streak = 1,
        }
        *last = Some(date);
    }
}

/// One assignment as seen by the state map.
#[derive(Debug, Clone, Copy)]
pub struct WorkedShift<'a> {
    pub date: NaiveDate,
    pub week: usize,
    pub shift: &'a ShiftType,
    pub hours: u32,
    /// The date falls on the configured holiday weekday.
    pub on_holiday: bool,
}

/// Per-staff state keyed by staff id.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    staff: HashMap<String, StaffWeekState>,
}

impl RunState {
    pub fn new(staff: &[Staff], week_count: usize) -> Self {
        Self {
            staff: staff
                .iter()
                .map(|s| (s.staff_id.clone(), StaffWeekState::new(week_count)))
                .collect(),
        }
    }

    pub fn get(&self, staff_id: &str) -> Option<&StaffWeekState> {
        self.staff.get(staff_id)
    }

    pub fn record(&mut self, staff_id: &str, worked: WorkedShift<'_>) {
        let Some(state) = self.staff.get_mut(staff_id) else {
            log::warn!("Ignoring assignment for unknown staff {}", staff_id);
            return;
        };
        let month = month_key(worked.date);
        let shift_id = worked.shift.shift_id.clone();

        state.total += 1;
        *state.shift_counts.entry(shift_id.clone()).or_default() += 1;
        *state.date_counts.entry(worked.date).or_default() += 1;
        *state.month_counts.entry(month.clone()).or_default() += 1;
        state.last_shift_end = Some(worked.shift.window_on(worked.date).1);
        StaffWeekState::bump_streak(
            &mut state.last_work_date,
            &mut state.consecutive_days,
            worked.date,
        );
        if worked.shift.is_night() {
            *state.night_month_counts.entry(month).or_default() += 1;
            StaffWeekState::bump_streak(
                &mut state.last_night_date,
                &mut state.consecutive_nights,
                worked.date,
            );
        }

        if let Some(week) = state.week_mut(worked.week) {
            week.hours += worked.hours;
            if worked.on_holiday {
                week.holiday_days += 1;
            }
            week.worked_days += 1;
            week.shift_types.insert(shift_id);
        }
    }

    pub fn record_rest_day(&mut self, staff_id: &str, week: usize) {
        if let Some(tally) = self.staff.get_mut(staff_id).and_then(|s| s.week_mut(week)) {
            tally.rest_days += 1;
        }
    }
}
