use rand::SeedableRng;
use rand::rngs::StdRng;
use sqlx::PgPool;

use crate::database::models::{AssignmentInput, NightPreallocation, OnCallAssignment, WeeklyStat};
use crate::database::repositories::{
    LeaveRepository, NightAllocationRepository, OnCallRepository, PreferenceRepository,
    ScheduleRepository, ShiftRepository, StaffRepository,
};
use crate::error::AppError;
use crate::scheduling::retry::generate_and_validate;
use crate::scheduling::{
    ConstraintConfig, DateRange, GenerationOutcome, NightAllocationPlanner, OnCallRotation, RetryCoordinator,
    RosterInput, RosterStore, ScheduleValidator, ValidationReport,
};

/// Loads run snapshots from Postgres, drives the engine and stores results.
#[derive(Clone)]
pub struct RosterService {
    staff: StaffRepository,
    shifts: ShiftRepository,
    leaves: LeaveRepository,
    preferences: PreferenceRepository,
    allocations: NightAllocationRepository,
    schedule: ScheduleRepository,
    on_call: OnCallRepository,
}

impl RosterService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            staff: StaffRepository::new(pool.clone()),
            shifts: ShiftRepository::new(pool.clone()),
            leaves: LeaveRepository::new(pool.clone()),
            preferences: PreferenceRepository::new(pool.clone()),
            allocations: NightAllocationRepository::new(pool.clone()),
            schedule: ScheduleRepository::new(pool.clone()),
            on_call: OnCallRepository::new(pool),
        }
    }

    /// Reads everything a run needs, once, before any generation work.
    pub async fn load_input(&self, range: &DateRange) -> Result<RosterInput, AppError> {
        let input = RosterInput {
            staff: self.staff.list_staff().await?,
            shifts: self.shifts.list_shift_types().await?,
            leaves: self.leaves.list_overlapping(range).await?,
            preferences: self.preferences.list_for_months(&range.months()).await?,
            night_allocations: self.allocations.list_overlapping(range).await?,
        };

        log::debug!(
            "Loaded input for {}: {} staff, {} shifts, {} leave records, {} preferences, {} pre-allocations",
            range,
            input.staff.len(),
            input.shifts.len(),
            input.leaves.len(),
            input.preferences.len(),
            input.night_allocations.len()
        );
        Ok(input)
    }

    /// Generates, validates and stores up to the coordinator's attempt ceiling.
    pub async fn generate_with_validation(
        &self,
        range: &DateRange,
        config: &ConstraintConfig,
        coordinator: &RetryCoordinator,
        operator: &str,
    ) -> Result<GenerationOutcome, AppError> {
        config.validate()?;
        let input = self.load_input(range).await?;

        coordinator
            .run_with_store(&input, config, range, &self.schedule, operator)
            .await
    }

    /// One generate → validate → store pass with the config as given.
    pub async fn generate_once(
        &self,
        range: &DateRange,
        config: &ConstraintConfig,
        seed: u64,
        operator: &str,
    ) -> Result<GenerationOutcome, AppError> {
        config.validate()?;
        let input = self.load_input(range).await?;

        let (roster, report) = generate_and_validate(&input, config, range, seed);
        self.schedule.replace_range(&roster, operator).await?;

        Ok(GenerationOutcome::from_attempt(1, report, roster))
    }

    /// Runs the validator over what is currently stored for `range`.
    pub async fn validate_stored(
        &self,
        range: &DateRange,
        config: &ConstraintConfig,
    ) -> Result<ValidationReport, AppError> {
        config.validate()?;
        let input = self.load_input(range).await?;
        let assignments: Vec<AssignmentInput> = self
            .schedule
            .list_assignments(range)
            .await?
            .into_iter()
            .map(AssignmentInput::from)
            .collect();

        if assignments.is_empty() {
            return Err(AppError::NotFound(format!("No stored roster for {}", range)));
        }
        Ok(ScheduleValidator::new(&input, config.holiday_weekday()).validate(&assignments, range))
    }

    pub async fn weekly_stats(&self, range: &DateRange) -> Result<Vec<WeeklyStat>, AppError> {
        Ok(self.schedule.list_weekly_stats(range).await?)
    }

    /// Replaces the range's night pre-allocations with a fresh weekly split
    /// of `shift_id` over its ward staff.
    pub async fn allocate_nights(
        &self,
        range: &DateRange,
        shift_id: &str,
        seed: u64,
    ) -> Result<Vec<NightPreallocation>, AppError> {
        let shifts = self.shifts.list_shift_types().await?;
        let shift = shifts
            .iter()
            .find(|s| s.shift_id == shift_id)
            .ok_or_else(|| AppError::NotFound(format!("Shift {} not found", shift_id)))?;
        let planner = NightAllocationPlanner::new(shift)?;
        let staff = self.staff.list_staff().await?;

        let mut rng = StdRng::seed_from_u64(seed);
        let allocations = planner.plan(range, &staff, &mut rng);
        self.allocations
            .replace_overlapping(range, allocations.clone())
            .await?;

        Ok(allocations)
    }

    /// Fills the range's designated on-call dates that have no entry yet.
    pub async fn assign_on_call(
        &self,
        range: &DateRange,
        config: &ConstraintConfig,
        seed: u64,
    ) -> Result<Vec<OnCallAssignment>, AppError> {
        config.validate()?;
        let staff = self.staff.list_staff().await?;
        let leaves = self.leaves.list_overlapping(range).await?;
        let existing = self.on_call.list_in_range(range).await?;

        let mut rng = StdRng::seed_from_u64(seed);
        let entries = OnCallRotation::from_config(config).assign(range, &staff, &leaves, &existing, &mut rng);
        let created = self.on_call.insert_many(entries).await?;

        log::info!("Assigned {} on-call duties for {}", created.len(), range);
        Ok(created)
    }
}
