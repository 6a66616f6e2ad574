use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::database::models::{LeaveRecord, NightPreallocation, Preference, ShiftType, Staff};

use super::calendar::{DateRange, month_key};

/// Everything a generation run reads, loaded once before the run starts.
#[derive(Debug, Clone, Default)]
pub struct RosterInput {
    /// In roster order; ties in ranking fall back to this order.
    pub staff: Vec<Staff>,
    /// Shift catalog in display order.
    pub shifts: Vec<ShiftType>,
    pub leaves: Vec<LeaveRecord>,
    pub preferences: Vec<Preference>,
    pub night_allocations: Vec<NightPreallocation>,
}

impl RosterInput {
    pub fn staff_by_id(&self, staff_id: &str) -> Option<&Staff> {
        self.staff.iter().find(|s| s.staff_id == staff_id)
    }

    pub fn shift_by_id(&self, shift_id: &str) -> Option<&ShiftType> {
        self.shifts.iter().find(|s| s.shift_id == shift_id)
    }
}

/// Approved leave by staff.
#[derive(Debug, Default)]
pub struct LeaveIndex<'a> {
    by_staff: HashMap<&'a str, Vec<&'a LeaveRecord>>,
}

impl<'a> LeaveIndex<'a> {
    pub fn new(leaves: &'a [LeaveRecord]) -> Self {
        let mut by_staff: HashMap<&str, Vec<&LeaveRecord>> = HashMap::new();
        for leave in leaves.iter().filter(|l| l.approved) {
            by_staff.entry(leave.staff_id.as_str()).or_default().push(leave);
        }
        Self { by_staff }
    }

    pub fn is_on_leave(&self, staff_id: &str, date: NaiveDate) -> bool {
        self.by_staff
            .get(staff_id)
            .is_some_and(|leaves| leaves.iter().any(|l| l.blocks(date)))
    }
}

/// Preferences keyed by (staff, `YYYY-MM`). A later record for the same key wins.
#[derive(Debug, Default)]
pub struct PreferenceIndex<'a> {
    by_staff_month: HashMap<(&'a str, &'a str), &'a Preference>,
}

impl<'a> PreferenceIndex<'a> {
    pub fn new(preferences: &'a [Preference]) -> Self {
        let by_staff_month = preferences
            .iter()
            .map(|p| ((p.staff_id.as_str(), p.month.as_str()), p))
            .collect();
        Self { by_staff_month }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, staff_id: &str, date: NaiveDate) -> Option<&'a Preference> {
        let month = month_key(date);
        self.by_staff_month.get(&(staff_id, month.as_str())).copied()
    }
}

/// Night pre-allocations expanded to the individual dates of a range.
#[derive(Debug, Default)]
pub struct AllocationIndex<'a> {
    by_date: BTreeMap<NaiveDate, Vec<&'a NightPreallocation>>,
}

impl<'a> AllocationIndex<'a> {
    /// Allocations are ordered by (start date, staff id) on every date.
    pub fn new(allocations: &'a [NightPreallocation], range: &DateRange) -> Self {
        let mut ordered: Vec<&NightPreallocation> = allocations
            .iter()
            .filter(|a| range.overlaps(a.start_date, a.end_date))
            .collect();
        ordered.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then_with(|| a.staff_id.cmp(&b.staff_id))
        });

        let mut by_date: BTreeMap<NaiveDate, Vec<&NightPreallocation>> = BTreeMap::new();
        for date in range.dates() {
            for allocation in ordered.iter().copied().filter(|a| a.covers(date)) {
                by_date.entry(date).or_default().push(allocation);
            }
        }
        Self { by_date }
    }

    pub fn on(&self, date: NaiveDate) -> &[&'a NightPreallocation] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_shift_on(&self, date: NaiveDate, shift_id: &str) -> bool {
        self.on(date).iter().any(|a| a.shift_id == shift_id)
    }

    /// Every (date, allocation) pair, dates ascending.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &'a NightPreallocation)> + '_ {
        self.by_date
            .iter()
            .flat_map(|(date, allocations)| allocations.iter().map(move |a| (*date, *a)))
    }
}
