//! The daily, per-shift assignment loop.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use rand::Rng;

use crate::database::models::{AssignmentInput, MonthlyShortfall, ShiftType, Staff, WeeklyStat};

use super::calendar::{DateRange, SchedulingCalendar, month_key};
use super::constraints::ConstraintConfig;
use super::filter::{Candidate, CandidateFilter, SlotContext};
use super::input::{AllocationIndex, LeaveIndex, PreferenceIndex, RosterInput};
use super::ranker::CandidateRanker;
use super::rest_days::{RestDayPlan, RestDayPlanner};
use super::state::{RunState, WorkedShift};

/// Hours credited for every assignment, whatever the shift window.
pub const STANDARD_SHIFT_HOURS: u32 = 8;

/// Result of one generation run, ready to be persisted as a replace-set.
#[derive(Debug, Clone)]
pub struct GeneratedRoster {
    pub range: DateRange,
    pub week_count: usize,
    /// In generation order: by date, then shift processing order.
    pub assignments: Vec<AssignmentInput>,
    /// One row per staff per week.
    pub weekly_stats: Vec<WeeklyStat>,
    /// Staff below `min_per_month` in months the range fully covers.
    pub shortfalls: Vec<MonthlyShortfall>,
    pub plan: RestDayPlan,
}

impl GeneratedRoster {
    pub fn vacancy_count(&self) -> usize {
        self.assignments.iter().filter(|a| a.is_vacancy()).count()
    }

    pub fn assigned_count(&self) -> usize {
        self.assignments.len() - self.vacancy_count()
    }

    pub fn assignments_for<'s>(&'s self, staff_id: &'s str) -> impl Iterator<Item = &'s AssignmentInput> + 's {
        self.assignments.iter().filter(move |a| a.is_for(staff_id))
    }

    pub fn assignments_on(&self, date: NaiveDate, shift_id: &str) -> Vec<&AssignmentInput> {
        self.assignments
            .iter()
            .filter(|a| a.date == date && a.shift_id == shift_id)
            .collect()
    }
}

pub struct RosterGenerator<'a> {
    input: &'a RosterInput,
    config: &'a ConstraintConfig,
}

impl<'a> RosterGenerator<'a> {
    pub fn new(input: &'a RosterInput, config: &'a ConstraintConfig) -> Self {
        Self { input, config }
    }

    /// Walks the range date by date. All randomness (rest dates, shuffles)
    /// is drawn from `rng`, so a seeded source reproduces the roster.
    pub fn generate<R: Rng + ?Sized>(&self, range: &DateRange, rng: &mut R) -> GeneratedRoster {
        let config = self.config;
        let calendar = SchedulingCalendar::new(range);
        let plan = RestDayPlanner::from_config(config).plan(&self.input.staff, &calendar, rng);

        let leaves = LeaveIndex::new(&self.input.leaves);
        let preferences = PreferenceIndex::new(&self.input.preferences);
        let allocations = AllocationIndex::new(&self.input.night_allocations, range);
        let filter = CandidateFilter::new(config, &leaves, &preferences, &plan);
        let ranker = CandidateRanker::from_config(config);
        let holiday_weekday = config.holiday_weekday();

        let mut run = RunState::new(&self.input.staff, calendar.week_count());
        let mut assignments: Vec<AssignmentInput> = Vec::new();

        for (index, &date) in calendar.dates().iter().enumerate() {
            let week = SchedulingCalendar::week_of_index(index);
            let on_holiday = date.weekday() == holiday_weekday;
            let mut worked_today: HashSet<&str> = HashSet::new();

            for shift in self.shift_order(date, &allocations) {
                let required = shift.required_on_date(date) as usize;
                if required == 0 {
                    continue;
                }
                let slot = SlotContext {
                    date,
                    week,
                    shift,
                    hours: STANDARD_SHIFT_HOURS,
                    on_holiday,
                };

                let chosen = self.fill_slot(&slot, required, &filter, &ranker, &allocations, &run, rng);
                for candidate in &chosen {
                    let staff = candidate.staff;
                    let staff_id = staff.staff_id.as_str();
                    run.record(
                        staff_id,
                        WorkedShift {
                            date,
                            week,
                            shift,
                            hours: STANDARD_SHIFT_HOURS,
                            on_holiday,
                        },
                    );
                    worked_today.insert(staff_id);
                    assignments.push(AssignmentInput::staffed(
                        date,
                        &shift.shift_id,
                        staff_id,
                        STANDARD_SHIFT_HOURS,
                    ));
                }

                let missing = required - chosen.len();
                if missing > 0 {
                    log::debug!(
                        "{} {}: {} of {} filled, {} short",
                        date,
                        shift.name,
                        chosen.len(),
                        required,
                        missing
                    );
                    if config.auto_fill_missing {
                        assignments.extend(
                            (0..missing)
                                .map(|_| AssignmentInput::vacancy(date, &shift.shift_id, STANDARD_SHIFT_HOURS)),
                        );
                    }
                }
            }

            if !on_holiday {
                for member in &self.input.staff {
                    if !worked_today.contains(member.staff_id.as_str()) {
                        run.record_rest_day(&member.staff_id, week);
                    }
                }
            }
        }

        let weekly_stats = self.weekly_stats(&calendar, &run);
        let shortfalls = self.shortfalls(range, &run);
        let roster = GeneratedRoster {
            range: *range,
            week_count: calendar.week_count(),
            assignments,
            weekly_stats,
            shortfalls,
            plan,
        };

        log::info!(
            "Generated roster for {}: {} assignments, {} vacancies, {} staff, {} weeks",
            range,
            roster.assigned_count(),
            roster.vacancy_count(),
            self.input.staff.len(),
            roster.week_count
        );
        roster
    }

    /// Night shifts with a pre-allocation on `date`, then other night
    /// shifts, then day shifts; catalog order within each group.
    fn shift_order(&self, date: NaiveDate, allocations: &AllocationIndex<'_>) -> Vec<&'a ShiftType> {
        let (nights, days): (Vec<&ShiftType>, Vec<&ShiftType>) =
            self.input.shifts.iter().partition(|s| s.is_night());
        let (allocated, other): (Vec<&ShiftType>, Vec<&ShiftType>) = nights
            .into_iter()
            .partition(|s| allocations.has_shift_on(date, &s.shift_id));

        allocated.into_iter().chain(other).chain(days).collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn fill_slot<R: Rng + ?Sized>(
        &self,
        slot: &SlotContext<'_>,
        required: usize,
        filter: &CandidateFilter<'_>,
        ranker: &CandidateRanker,
        allocations: &AllocationIndex<'_>,
        run: &RunState,
        rng: &mut R,
    ) -> Vec<Candidate<'a>> {
        let on_date = allocations.on(slot.date);
        let pre_allocated = filter.pre_allocated(slot, on_date, &self.input.staff, run);

        if pre_allocated.len() >= required {
            log::debug!(
                "{} {}: filled from {} pre-allocated staff",
                slot.date,
                slot.shift.name,
                pre_allocated.len()
            );
            return pre_allocated.into_iter().take(required).collect();
        }

        // Only staff already taken for this slot; the daily cap covers the rest.
        let reserved: HashSet<&'a str> = pre_allocated
            .iter()
            .map(|c| {
                let staff: &'a Staff = c.staff;
                staff.staff_id.as_str()
            })
            .collect();
        let mut candidates = pre_allocated;
        candidates.extend(filter.eligible(slot, &self.input.staff, &reserved, run));

        let mut ranked = ranker.rank(candidates, rng);
        ranked.truncate(required);
        ranked
    }

    fn weekly_stats(&self, calendar: &SchedulingCalendar, run: &RunState) -> Vec<WeeklyStat> {
        let mut stats = Vec::new();
        for member in &self.input.staff {
            let Some(state) = run.get(&member.staff_id) else {
                continue;
            };
            for (week, dates) in calendar.weeks() {
                let Some(&week_start) = dates.first() else {
                    continue;
                };
                let tally = state.week(week).cloned().unwrap_or_default();
                stats.push(WeeklyStat {
                    staff_id: member.staff_id.clone(),
                    month: month_key(week_start),
                    week_number: week as i32,
                    week_start,
                    total_hours: tally.hours as i32,
                    holiday_count: tally.holiday_days as i32,
                    rest_day_count: tally.rest_days as i32,
                    work_days: tally.worked_days as i32,
                });
            }
        }
        stats
    }

    fn shortfalls(&self, range: &DateRange, run: &RunState) -> Vec<MonthlyShortfall> {
        let minimum = self.config.min_per_month;
        let full_months: Vec<String> = range
            .months()
            .into_iter()
            .filter(|month| {
                DateRange::parse_month(month)
                    .is_ok_and(|m| range.contains(m.start()) && range.contains(m.end()))
            })
            .collect();

        let mut shortfalls = Vec::new();
        for member in &self.input.staff {
            let Some(state) = run.get(&member.staff_id) else {
                continue;
            };
            for month in &full_months {
                let assigned = state.count_in_month(month);
                if assigned < minimum {
                    log::warn!(
                        "{} has {} assignments in {}, below the minimum of {}",
                        member.staff_id,
                        assigned,
                        month,
                        minimum
                    );
                    shortfalls.push(MonthlyShortfall {
                        staff_id: member.staff_id.clone(),
                        month: month.clone(),
                        assigned,
                        minimum,
                    });
                }
            }
        }
        shortfalls
    }
}
