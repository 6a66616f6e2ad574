#![allow(dead_code)]

use std::env;
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveTime};
use fake::Fake;
use fake::faker::name::en::Name;

use roster::AppError;
use roster::database::models::{AssignmentInput, ShiftType, Staff};
use roster::scheduling::{DateRange, GeneratedRoster, RosterInput, RosterStore};

pub const WARD: &str = "ICU";

pub fn setup_test_env() {
    unsafe {
        env::set_var("RUST_LOG", "debug");
    }
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

pub fn time(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
}

/// 2024-03-04 (Monday) to 2024-03-10 (Sunday).
pub fn one_week() -> DateRange {
    DateRange::new(date(3, 4), date(3, 10)).unwrap()
}

/// Mock data generators using the fake crate
pub struct TestData;

impl TestData {
    pub fn staff(staff_id: &str) -> Staff {
        let name: String = Name().fake();
        Staff::new(staff_id, name, Some("RN".to_string()), WARD)
    }

    pub fn team(size: usize) -> Vec<Staff> {
        (1..=size).map(|i| Self::staff(&format!("S{}", i))).collect()
    }

    pub fn day_shift(required: u32) -> ShiftType {
        ShiftType::new("D", "Day", time(8), time(16), WARD, required)
    }

    pub fn evening_shift(required: u32) -> ShiftType {
        ShiftType::new("E", "Evening", time(16), time(0), WARD, required)
    }

    pub fn night_shift(required: u32) -> ShiftType {
        ShiftType::new("N", "Night", time(0), time(8), WARD, required)
    }

    pub fn input(staff: Vec<Staff>, shifts: Vec<ShiftType>) -> RosterInput {
        RosterInput {
            staff,
            shifts,
            ..RosterInput::default()
        }
    }
}

/// Keeps the last stored roster in memory, the way the Postgres store
/// replaces a range.
#[derive(Default)]
pub struct MemoryStore {
    stored: Mutex<Vec<AssignmentInput>>,
    replacements: Mutex<u32>,
    operators: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn stored(&self) -> Vec<AssignmentInput> {
        self.stored.lock().unwrap().clone()
    }

    pub fn replacements(&self) -> u32 {
        *self.replacements.lock().unwrap()
    }

    pub fn operators(&self) -> Vec<String> {
        self.operators.lock().unwrap().clone()
    }
}

impl RosterStore for MemoryStore {
    async fn replace_range(&self, roster: &GeneratedRoster, operator: &str) -> Result<(), AppError> {
        let mut stored = self.stored.lock().unwrap();
        stored.retain(|a| !roster.range.contains(a.date));
        stored.extend(roster.assignments.iter().cloned());

        *self.replacements.lock().unwrap() += 1;
        self.operators.lock().unwrap().push(operator.to_string());
        Ok(())
    }
}

/// A store whose writes always fail.
pub struct FailingStore;

impl RosterStore for FailingStore {
    async fn replace_range(&self, _roster: &GeneratedRoster, _operator: &str) -> Result<(), AppError> {
        Err(AppError::internal_server_error_message("store unavailable"))
    }
}
