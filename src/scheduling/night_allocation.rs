//! Batch night pre-allocation over a date range.

use chrono::{Datelike, Duration, NaiveDate};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::database::models::{NightPreallocation, ShiftType, Staff};

use super::ScheduleError;
use super::calendar::DateRange;

/// Monday-aligned week segments, as day offsets from Monday. Sunday is left
/// to the generic path.
const SEGMENTS: [(i64, i64); 2] = [(0, 2), (3, 5)];

/// Splits each Monday-aligned week into a Monday–Wednesday and a
/// Thursday–Saturday night block and hands the blocks to ward staff in a
/// shuffled rotation.
#[derive(Debug, Clone, Copy)]
pub struct NightAllocationPlanner<'a> {
    shift: &'a ShiftType,
}

impl<'a> NightAllocationPlanner<'a> {
    pub fn new(shift: &'a ShiftType) -> Result<Self, ScheduleError> {
        if !shift.is_night() {
            return Err(ScheduleError::NotNightShift(shift.shift_id.clone()));
        }
        Ok(Self { shift })
    }

    /// Blocks are clamped to `range`; a block with no date inside it is
    /// skipped and does not use up a turn. Staff cycle in shuffled order, so
    /// a single staff member takes every block.
    pub fn plan<R: Rng + ?Sized>(
        &self,
        range: &DateRange,
        staff: &[Staff],
        rng: &mut R,
    ) -> Vec<NightPreallocation> {
        let mut pool: Vec<&str> = staff
            .iter()
            .filter(|s| s.ward == self.shift.ward)
            .map(|s| s.staff_id.as_str())
            .collect();
        if pool.is_empty() {
            log::warn!(
                "No {} staff to pre-allocate night shift {} in {}",
                self.shift.ward,
                self.shift.shift_id,
                range
            );
            return Vec::new();
        }
        pool.shuffle(rng);

        let mut allocations = Vec::new();
        let mut week_start = monday_of(range.start());
        while week_start <= range.end() {
            for (from, to) in SEGMENTS {
                let start = (week_start + Duration::days(from)).max(range.start());
                let end = (week_start + Duration::days(to)).min(range.end());
                if start > end {
                    continue;
                }
                let staff_id = pool[allocations.len() % pool.len()];
                allocations.push(NightPreallocation::new(start, end, staff_id, &self.shift.shift_id));
            }
            week_start += Duration::days(7);
        }

        log::info!(
            "Planned {} night blocks of {} over {} staff for {}",
            allocations.len(),
            self.shift.shift_id,
            pool.len(),
            range
        );
        allocations
    }
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}
