//! Roster allocation and validation engine.
//!
//! Everything in this module is synchronous and free of I/O: a run reads a
//! [`RosterInput`] snapshot, walks the date range in order, and hands back a
//! [`GeneratedRoster`] for the caller to persist. Randomness is always passed
//! in so that a fixed seed reproduces a roster exactly.

use thiserror::Error;

pub mod calendar;
pub mod constraints;
pub mod filter;
pub mod generator;
pub mod input;
pub mod night_allocation;
pub mod on_call;
pub mod ranker;
pub mod rest_days;
pub mod retry;
pub mod state;
pub mod validator;

pub use calendar::{DateRange, SchedulingCalendar, MAX_RANGE_DAYS};
pub use constraints::ConstraintConfig;
pub use filter::{Candidate, CandidateFilter, Rejection};
pub use generator::{GeneratedRoster, RosterGenerator, STANDARD_SHIFT_HOURS};
pub use input::RosterInput;
pub use night_allocation::NightAllocationPlanner;
pub use on_call::OnCallRotation;
pub use ranker::CandidateRanker;
pub use rest_days::{RestDayPlan, RestDayPlanner};
pub use retry::{GenerationOutcome, RetryCoordinator, RosterStore, MAX_ATTEMPTS};
pub use state::{RunState, StaffWeekState};
pub use validator::{CheckResult, ScheduleValidator, ValidationReport};

/// Input errors, raised before any generation work starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),
    #[error("Start date {start} is after end date {end}")]
    StartAfterEnd {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
    #[error("Date range spans {0} days, the limit is 366")]
    RangeTooLong(i64),
    #[error("Invalid constraint configuration: {0}")]
    InvalidConfig(String),
    #[error("Shift {0} is not a night shift")]
    NotNightShift(String),
}
