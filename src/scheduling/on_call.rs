use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate, Weekday};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::database::models::{LeaveRecord, OnCallAssignment, OnCallInput, OnCallStatus, Staff};

use super::calendar::{DateRange, month_key};
use super::constraints::ConstraintConfig;
use super::input::LeaveIndex;

/// One on-call duty per designated weekday, independent of the roster.
#[derive(Debug, Clone, Copy)]
pub struct OnCallRotation {
    weekday: Weekday,
}

impl OnCallRotation {
    pub fn new(weekday: Weekday) -> Self {
        Self { weekday }
    }

    pub fn from_config(config: &ConstraintConfig) -> Self {
        Self::new(config.on_call_weekday())
    }

    pub fn designated_dates(&self, range: &DateRange) -> Vec<NaiveDate> {
        range
            .dates()
            .into_iter()
            .filter(|d| d.weekday() == self.weekday)
            .collect()
    }

    /// Gives each designated date without an entry to the staff member with
    /// the fewest on-call duties in that date's month, counting `existing`
    /// and the duties handed out by this call. Ties are broken at random.
    /// Staff on approved leave that date are skipped.
    pub fn assign<R: Rng + ?Sized>(
        &self,
        range: &DateRange,
        staff: &[Staff],
        leaves: &[LeaveRecord],
        existing: &[OnCallAssignment],
        rng: &mut R,
    ) -> Vec<OnCallInput> {
        let leaves = LeaveIndex::new(leaves);
        let taken: HashSet<NaiveDate> = existing.iter().map(|e| e.date).collect();
        let mut counts: HashMap<(String, String), u32> = HashMap::new();
        for entry in existing.iter().filter(|e| e.status == OnCallStatus::OnCall) {
            *counts
                .entry((entry.staff_id.clone(), month_key(entry.date)))
                .or_default() += 1;
        }

        let mut assigned = Vec::new();
        for date in self.designated_dates(range) {
            if taken.contains(&date) {
                continue;
            }
            let month = month_key(date);
            let count_of = |staff_id: &str| {
                counts
                    .get(&(staff_id.to_string(), month.clone()))
                    .copied()
                    .unwrap_or(0)
            };

            let available: Vec<&Staff> = staff
                .iter()
                .filter(|s| !leaves.is_on_leave(&s.staff_id, date))
                .collect();
            let Some(fewest) = available.iter().map(|s| count_of(&s.staff_id)).min() else {
                log::warn!("No staff available for on-call duty on {}", date);
                continue;
            };
            let tied: Vec<&Staff> = available
                .into_iter()
                .filter(|s| count_of(&s.staff_id) == fewest)
                .collect();
            let Some(chosen) = tied.choose(rng) else {
                continue;
            };

            log::debug!("On-call {} -> {} ({} this month)", date, chosen.staff_id, fewest);
            *counts
                .entry((chosen.staff_id.clone(), month))
                .or_default() += 1;
            assigned.push(OnCallInput {
                date,
                staff_id: chosen.staff_id.clone(),
                status: OnCallStatus::OnCall,
            });
        }
        assigned
    }

    /// Cycles through `staff` in order, one designated date each. The cycle
    /// position follows the date's place among the designated dates, so a
    /// date that already has an entry still consumes its turn.
    pub fn round_robin(
        &self,
        range: &DateRange,
        staff: &[Staff],
        existing: &[OnCallAssignment],
    ) -> Vec<OnCallInput> {
        if staff.is_empty() {
            log::warn!("No staff to rotate for on-call duty in {}", range);
            return Vec::new();
        }
        let taken: HashSet<NaiveDate> = existing.iter().map(|e| e.date).collect();

        self.designated_dates(range)
            .into_iter()
            .enumerate()
            .filter(|(_, date)| !taken.contains(date))
            .map(|(i, date)| OnCallInput {
                date,
                staff_id: staff[i % staff.len()].staff_id.clone(),
                status: OnCallStatus::OnCall,
            })
            .collect()
    }
}
