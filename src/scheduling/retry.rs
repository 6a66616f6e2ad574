//! Bounded generate → validate loop.

use std::future::Future;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::AppError;

use super::ScheduleError;
use super::calendar::DateRange;
use super::constraints::ConstraintConfig;
use super::generator::{GeneratedRoster, RosterGenerator};
use super::input::RosterInput;
use super::validator::{ScheduleValidator, ValidationReport};

/// Attempt ceiling of one coordinated run.
pub const MAX_ATTEMPTS: u32 = 10;

/// Persistence seam for generated rosters.
///
/// `replace_range` must delete every assignment of `roster.range` and insert
/// the new ones atomically: readers see either the old roster or the new one.
pub trait RosterStore {
    fn replace_range(
        &self,
        roster: &GeneratedRoster,
        operator: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}

#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    Valid {
        range: DateRange,
        attempts: u32,
        report: ValidationReport,
        roster: GeneratedRoster,
    },
    /// Attempts ran out; `roster` is the last attempt's best effort.
    Invalid {
        range: DateRange,
        attempts: u32,
        report: ValidationReport,
        roster: GeneratedRoster,
    },
}

impl GenerationOutcome {
    pub fn from_attempt(attempts: u32, report: ValidationReport, roster: GeneratedRoster) -> Self {
        let range = roster.range;
        if report.overall_passed {
            Self::Valid {
                range,
                attempts,
                report,
                roster,
            }
        } else {
            Self::Invalid {
                range,
                attempts,
                report,
                roster,
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    pub fn range(&self) -> DateRange {
        match self {
            Self::Valid { range, .. } | Self::Invalid { range, .. } => *range,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Valid { attempts, .. } | Self::Invalid { attempts, .. } => *attempts,
        }
    }

    pub fn report(&self) -> &ValidationReport {
        match self {
            Self::Valid { report, .. } | Self::Invalid { report, .. } => report,
        }
    }

    pub fn roster(&self) -> &GeneratedRoster {
        match self {
            Self::Valid { roster, .. } | Self::Invalid { roster, .. } => roster,
        }
    }
}

/// One generation pass and its validation, with a seeded random source.
pub fn generate_and_validate(
    input: &RosterInput,
    config: &ConstraintConfig,
    range: &DateRange,
    seed: u64,
) -> (GeneratedRoster, ValidationReport) {
    let mut rng = StdRng::seed_from_u64(seed);
    let roster = RosterGenerator::new(input, config).generate(range, &mut rng);
    let report = ScheduleValidator::new(input, config.holiday_weekday())
        .validate(&roster.assignments, range);
    (roster, report)
}

#[derive(Debug, Clone, Copy)]
pub struct RetryCoordinator {
    max_attempts: u32,
    base_seed: u64,
}

impl Default for RetryCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryCoordinator {
    /// Seeded from the thread RNG; use [`RetryCoordinator::with_seed`] for
    /// reproducible runs.
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(base_seed: u64) -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_seed,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Seed of a 1-based attempt.
    pub fn seed_for(&self, attempt: u32) -> u64 {
        self.base_seed.wrapping_add(u64::from(attempt))
    }

    /// Runs without persisting. Every attempt uses the hardened config.
    pub fn run(
        &self,
        input: &RosterInput,
        config: &ConstraintConfig,
        range: &DateRange,
    ) -> Result<GenerationOutcome, ScheduleError> {
        config.validate()?;
        let config = config.hardened();

        let mut attempt = 1;
        loop {
            let (roster, report) = generate_and_validate(input, &config, range, self.seed_for(attempt));
            if report.overall_passed || attempt >= self.max_attempts {
                self.log_verdict(range, attempt, &report);
                return Ok(GenerationOutcome::from_attempt(attempt, report, roster));
            }
            log::info!("Attempt {} for {} failed validation, regenerating", attempt, range);
            attempt += 1;
        }
    }

    /// Like [`RetryCoordinator::run`], replacing the stored roster after
    /// every attempt so the store always holds the latest complete attempt.
    pub async fn run_with_store<S: RosterStore>(
        &self,
        input: &RosterInput,
        config: &ConstraintConfig,
        range: &DateRange,
        store: &S,
        operator: &str,
    ) -> Result<GenerationOutcome, AppError> {
        config.validate()?;
        let config = config.hardened();

        let mut attempt = 1;
        loop {
            let (roster, report) = generate_and_validate(input, &config, range, self.seed_for(attempt));
            store.replace_range(&roster, operator).await?;
            if report.overall_passed || attempt >= self.max_attempts {
                self.log_verdict(range, attempt, &report);
                return Ok(GenerationOutcome::from_attempt(attempt, report, roster));
            }
            log::info!("Attempt {} for {} failed validation, regenerating", attempt, range);
            attempt += 1;
        }
    }

    fn log_verdict(&self, range: &DateRange, attempts: u32, report: &ValidationReport) {
        if report.overall_passed {
            log::info!("Roster for {} passed validation after {} attempt(s)", range, attempts);
        } else {
            log::warn!(
                "Roster for {} still invalid after {} attempts: {}",
                range,
                attempts,
                report
                    .error
                    .clone()
                    .unwrap_or_else(|| report.violations().collect::<Vec<_>>().join("; "))
            );
        }
    }
}
