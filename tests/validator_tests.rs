use chrono::Weekday;
use pretty_assertions::assert_eq;

use roster::database::models::{AssignmentInput, LeaveRecord, LeaveType, NightPreallocation};
use roster::scheduling::ScheduleValidator;

mod common;
use common::{TestData, date, one_week};

fn staffed(day: u32, shift_id: &str, staff_id: &str) -> AssignmentInput {
    AssignmentInput::staffed(date(3, day), shift_id, staff_id, 8)
}

#[test]
fn test_missed_pre_allocation_is_reported() {
    common::setup_test_env();
    let mut input = TestData::input(TestData::team(2), vec![TestData::night_shift(1)]);
    input.night_allocations = vec![NightPreallocation::new(date(3, 4), date(3, 5), "S1", "N")];
    let assignments = vec![staffed(4, "N", "S1"), staffed(5, "N", "S2")];

    let report = ScheduleValidator::new(&input, Weekday::Sun).validate(&assignments, &one_week());

    assert!(!report.overall_passed);
    assert_eq!(report.night_shift_priority.details.len(), 1);
    assert!(report.night_shift_priority.details[0].contains("2024-03-05"));
}

#[test]
fn test_pre_allocation_during_leave_is_excused() {
    common::setup_test_env();
    let mut input = TestData::input(TestData::team(2), vec![TestData::night_shift(1)]);
    input.night_allocations = vec![NightPreallocation::new(date(3, 4), date(3, 5), "S1", "N")];
    input.leaves = vec![LeaveRecord::new("S1", LeaveType::Personal, date(3, 5), date(3, 5), true)];
    let assignments = vec![staffed(4, "N", "S1"), staffed(5, "N", "S2")];

    let report = ScheduleValidator::new(&input, Weekday::Sun).validate(&assignments, &one_week());

    assert!(report.night_shift_priority.passed);
}

#[test]
fn test_three_shift_types_in_a_week_fail() {
    common::setup_test_env();
    let input = TestData::input(
        TestData::team(1),
        vec![
            TestData::day_shift(1),
            TestData::evening_shift(1),
            TestData::night_shift(1),
        ],
    );
    let assignments = vec![
        staffed(4, "D", "S1"),
        staffed(5, "E", "S1"),
        staffed(7, "N", "S1"),
    ];

    let report = ScheduleValidator::new(&input, Weekday::Sun).validate(&assignments, &one_week());

    assert!(!report.weekly_shift_consistency.passed);
    assert!(report.rest_days_arrangement.passed);
    assert!(report.night_shift_priority.passed);
}

#[test]
fn test_vacancies_are_ignored() {
    common::setup_test_env();
    let input = TestData::input(TestData::team(1), vec![TestData::day_shift(1)]);
    let assignments: Vec<_> = one_week()
        .dates()
        .into_iter()
        .map(|d| AssignmentInput::vacancy(d, "D", 8))
        .collect();

    let report = ScheduleValidator::new(&input, Weekday::Sun).validate(&assignments, &one_week());

    assert!(report.overall_passed);
}

#[test]
fn test_unknown_shift_aborts_validation() {
    common::setup_test_env();
    let input = TestData::input(TestData::team(1), vec![TestData::day_shift(1)]);
    let assignments = vec![staffed(4, "X", "S1")];

    let report = ScheduleValidator::new(&input, Weekday::Sun).validate(&assignments, &one_week());

    assert!(!report.overall_passed);
    assert!(report.error.as_deref().is_some_and(|e| e.contains("unknown shift X")));
}

#[test]
fn test_report_serializes_check_sections() {
    common::setup_test_env();
    let input = TestData::input(TestData::team(1), vec![TestData::day_shift(1)]);
    let assignments: Vec<_> = (4..=10).map(|d| staffed(d, "D", "S1")).collect();

    let report = ScheduleValidator::new(&input, Weekday::Sun).validate(&assignments, &one_week());
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["overall_passed"], serde_json::json!(false));
    assert_eq!(json["rest_days_arrangement"]["passed"], serde_json::json!(false));
    assert_eq!(json["night_shift_priority"]["details"], serde_json::json!([]));
}
