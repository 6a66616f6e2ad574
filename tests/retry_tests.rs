use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, Weekday};
use pretty_assertions::assert_eq;

use roster::database::models::NightPreallocation;
use roster::scheduling::{
    ConstraintConfig, DateRange, GenerationOutcome, RetryCoordinator, SchedulingCalendar,
};

mod common;
use common::{FailingStore, MemoryStore, TestData, date, one_week};

#[tokio::test]
async fn test_valid_roster_is_stored_once() {
    common::setup_test_env();
    let input = TestData::input(TestData::team(3), vec![TestData::day_shift(1)]);
    let store = MemoryStore::default();

    let outcome = RetryCoordinator::with_seed(7)
        .run_with_store(&input, &ConstraintConfig::default(), &one_week(), &store, "scheduler")
        .await
        .unwrap();

    assert!(outcome.is_valid());
    assert_eq!(outcome.attempts(), 1);
    assert_eq!(store.replacements(), 1);
    assert_eq!(store.operators(), vec!["scheduler".to_string()]);
    assert_eq!(store.stored(), outcome.roster().assignments);
}

#[tokio::test]
async fn test_unfixable_roster_exhausts_attempts() {
    common::setup_test_env();
    // A week of pre-allocated nights leaves S1 without a free weekday.
    let mut input = TestData::input(TestData::team(2), vec![TestData::night_shift(1)]);
    input.night_allocations = vec![NightPreallocation::new(date(3, 4), date(3, 10), "S1", "N")];
    let store = MemoryStore::default();

    let outcome = RetryCoordinator::with_seed(7)
        .with_max_attempts(3)
        .run_with_store(&input, &ConstraintConfig::default(), &one_week(), &store, "scheduler")
        .await
        .unwrap();

    assert!(matches!(outcome, GenerationOutcome::Invalid { attempts: 3, .. }));
    assert!(!outcome.report().rest_days_arrangement.passed);
    assert_eq!(store.replacements(), 3);
    assert_eq!(store.stored().len(), 7);
}

#[tokio::test]
async fn test_store_failure_stops_the_run() {
    common::setup_test_env();
    let input = TestData::input(TestData::team(2), vec![TestData::day_shift(1)]);

    let result = RetryCoordinator::with_seed(1)
        .run_with_store(&input, &ConstraintConfig::default(), &one_week(), &FailingStore, "scheduler")
        .await;

    assert!(matches!(result, Err(roster::AppError::InternalServerError(Some(_)))));
}

#[tokio::test]
async fn test_invalid_config_is_bad_request() {
    common::setup_test_env();
    let input = TestData::input(TestData::team(2), vec![TestData::day_shift(1)]);
    let config = ConstraintConfig {
        min_per_month: 31,
        ..ConstraintConfig::default()
    };
    let store = MemoryStore::default();

    let result = RetryCoordinator::with_seed(1)
        .run_with_store(&input, &config, &one_week(), &store, "scheduler")
        .await;

    assert!(result.is_err_and(|e| e.is_bad_request()));
    assert_eq!(store.replacements(), 0);
}

#[test]
fn test_run_without_store_matches_seeded_attempts() {
    common::setup_test_env();
    let input = TestData::input(TestData::team(3), vec![TestData::day_shift(1)]);
    let coordinator = RetryCoordinator::with_seed(42);

    let first = coordinator.run(&input, &ConstraintConfig::default(), &one_week()).unwrap();
    let second = coordinator.run(&input, &ConstraintConfig::default(), &one_week()).unwrap();

    assert_eq!(first.roster().assignments, second.roster().assignments);
    assert_eq!(first.attempts(), second.attempts());
}

#[test]
fn test_three_shift_month_keeps_weekly_limits() {
    common::setup_test_env();
    let range = DateRange::for_month(2024, 3).unwrap();
    let input = TestData::input(
        TestData::team(5),
        vec![
            TestData::day_shift(1),
            TestData::evening_shift(1),
            TestData::night_shift(1),
        ],
    );
    let night_shifts: BTreeSet<&str> = input
        .shifts
        .iter()
        .filter(|s| s.is_night())
        .map(|s| s.shift_id.as_str())
        .collect();
    let calendar = SchedulingCalendar::new(&range);

    for seed in 0..5 {
        let outcome = RetryCoordinator::with_seed(seed)
            .run(&input, &ConstraintConfig::default(), &range)
            .unwrap();
        assert!(outcome.is_valid(), "seed {} ended invalid: {:?}", seed, outcome.report());

        let roster = outcome.roster();
        for (week, dates) in calendar.weeks() {
            let mut types: HashMap<&str, BTreeSet<&str>> = HashMap::new();
            for assignment in roster.assignments.iter().filter(|a| dates.contains(&a.date)) {
                let Some(staff_id) = assignment.staff_id.as_deref() else {
                    continue;
                };
                types.entry(staff_id).or_default().insert(assignment.shift_id.as_str());
                if assignment.date.weekday() == Weekday::Sun {
                    assert!(
                        night_shifts.contains(assignment.shift_id.as_str()),
                        "seed {}: {} works {} on {}",
                        seed,
                        staff_id,
                        assignment.shift_id,
                        assignment.date
                    );
                }
            }
            for (staff_id, shift_ids) in types {
                assert!(
                    shift_ids.len() <= 2,
                    "seed {}: {} works {:?} in week {}",
                    seed,
                    staff_id,
                    shift_ids,
                    week
                );
            }
        }
    }
}
