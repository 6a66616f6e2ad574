use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::database::models::Staff;

use super::calendar::SchedulingCalendar;
use super::constraints::ConstraintConfig;

/// Protected dates per (staff, week).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestDayPlan {
    holidays: HashMap<(String, usize), NaiveDate>,
    rest_days: HashMap<(String, usize), NaiveDate>,
}

impl RestDayPlan {
    pub fn holiday(&self, staff_id: &str, week: usize) -> Option<NaiveDate> {
        self.holidays.get(&(staff_id.to_string(), week)).copied()
    }

    pub fn rest_day(&self, staff_id: &str, week: usize) -> Option<NaiveDate> {
        self.rest_days.get(&(staff_id.to_string(), week)).copied()
    }

    /// True when `date` is the staff's planned holiday or rest date of `week`.
    pub fn is_protected(&self, staff_id: &str, week: usize, date: NaiveDate) -> bool {
        self.holiday(staff_id, week) == Some(date) || self.rest_day(staff_id, week) == Some(date)
    }
}

/// Picks one fixed holiday and one random rest date per staff and week.
#[derive(Debug, Clone, Copy)]
pub struct RestDayPlanner {
    holiday_weekday: Weekday,
    plan_holidays: bool,
    plan_rest_days: bool,
}

impl RestDayPlanner {
    pub fn new(holiday_weekday: Weekday) -> Self {
        Self {
            holiday_weekday,
            plan_holidays: true,
            plan_rest_days: true,
        }
    }

    pub fn from_config(config: &ConstraintConfig) -> Self {
        Self {
            holiday_weekday: config.holiday_weekday(),
            plan_holidays: config.require_holiday,
            plan_rest_days: config.require_rest_day,
        }
    }

    /// Staff are visited in slice order and weeks in calendar order, so the
    /// plan depends only on the inputs and the state of `rng`.
    ///
    /// A week without the holiday weekday (a short trailing week) gets no
    /// holiday; a week with no other weekday gets no rest date.
    pub fn plan<R: Rng + ?Sized>(
        &self,
        staff: &[Staff],
        calendar: &SchedulingCalendar,
        rng: &mut R,
    ) -> RestDayPlan {
        let mut plan = RestDayPlan::default();

        for member in staff {
            for (week, dates) in calendar.weeks() {
                if self.plan_holidays {
                    if let Some(holiday) = dates
                        .iter()
                        .find(|d| d.weekday() == self.holiday_weekday)
                    {
                        plan.holidays
                            .insert((member.staff_id.clone(), week), *holiday);
                    }
                }

                if self.plan_rest_days {
                    let choices: Vec<NaiveDate> = dates
                        .iter()
                        .copied()
                        .filter(|d| d.weekday() != self.holiday_weekday)
                        .collect();
                    if let Some(rest) = choices.choose(rng) {
                        plan.rest_days.insert((member.staff_id.clone(), week), *rest);
                    }
                }
            }
        }

        log::debug!(
            "Planned {} holidays and {} rest days for {} staff over {} weeks",
            plan.holidays.len(),
            plan.rest_days.len(),
            staff.len(),
            calendar.week_count()
        );
        plan
    }
}
