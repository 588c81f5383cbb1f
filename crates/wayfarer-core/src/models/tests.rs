//! Unit tests for model types.

use std::str::FromStr;

use super::page::{Page, PageRequest};
use super::status::PlanStatus;

#[test]
fn test_plan_status_from_str_valid() {
    assert_eq!(PlanStatus::from_str("draft").unwrap(), PlanStatus::Draft);
    assert_eq!(
        PlanStatus::from_str("confirmed").unwrap(),
        PlanStatus::Confirmed
    );
    assert_eq!(
        PlanStatus::from_str("in_progress").unwrap(),
        PlanStatus::InProgress
    );
    assert_eq!(
        PlanStatus::from_str("completed").unwrap(),
        PlanStatus::Completed
    );
    assert_eq!(
        PlanStatus::from_str("cancelled").unwrap(),
        PlanStatus::Cancelled
    );
}

#[test]
fn test_plan_status_from_str_alternative_spelling() {
    assert_eq!(
        PlanStatus::from_str("inprogress").unwrap(),
        PlanStatus::InProgress
    );
}

#[test]
fn test_plan_status_from_str_case_insensitive() {
    assert_eq!(PlanStatus::from_str("Draft").unwrap(), PlanStatus::Draft);
    assert_eq!(
        PlanStatus::from_str("CONFIRMED").unwrap(),
        PlanStatus::Confirmed
    );
}

#[test]
fn test_plan_status_from_str_invalid() {
    assert!(PlanStatus::from_str("unknown").is_err());
    assert!(PlanStatus::from_str("").is_err());
}

#[test]
fn test_plan_status_round_trip() {
    for status in [
        PlanStatus::Draft,
        PlanStatus::Confirmed,
        PlanStatus::InProgress,
        PlanStatus::Completed,
        PlanStatus::Cancelled,
    ] {
        assert_eq!(PlanStatus::from_str(status.as_str()).unwrap(), status);
    }
}

#[test]
fn test_plan_status_default_is_draft() {
    assert_eq!(PlanStatus::default(), PlanStatus::Draft);
}

#[test]
fn test_plan_status_json_matches_database_string() {
    // The JSON form and the stored form are the same snake_case token.
    for status in [PlanStatus::Draft, PlanStatus::InProgress, PlanStatus::Cancelled] {
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, format!("\"{}\"", status.as_str()));
        let parsed: PlanStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, status);
    }
}

#[test]
fn test_page_total_pages() {
    let page: Page<u64> = Page::new(vec![], 45, &PageRequest::of(0, 10));
    assert_eq!(page.total_pages(), 5);

    let page: Page<u64> = Page::new(vec![], 50, &PageRequest::of(0, 10));
    assert_eq!(page.total_pages(), 5);

    let page: Page<u64> = Page::new(vec![], 0, &PageRequest::of(0, 10));
    assert_eq!(page.total_pages(), 0);
}

#[test]
fn test_page_navigation_flags() {
    let first: Page<u64> = Page::new(vec![1, 2], 5, &PageRequest::of(0, 2));
    assert!(first.has_next());
    assert!(!first.has_previous());

    let last: Page<u64> = Page::new(vec![5], 5, &PageRequest::of(2, 2));
    assert!(!last.has_next());
    assert!(last.has_previous());
}

#[test]
fn test_page_overrun_is_valid() {
    // Requesting far past the end yields an empty page with the real total.
    let overrun: Page<u64> = Page::new(vec![], 2, &PageRequest::of(10, 10));
    assert!(overrun.is_empty());
    assert_eq!(overrun.total_elements, 2);
    assert!(!overrun.has_next());
    assert!(overrun.has_previous());
}

#[test]
fn test_page_request_limit_clamps_zero_size() {
    let request = PageRequest::of(3, 0);
    assert_eq!(request.limit(), 1);
    assert_eq!(request.offset(), 3);
}

#[test]
fn test_page_request_offset() {
    let request = PageRequest::of(4, 25);
    assert_eq!(request.limit(), 25);
    assert_eq!(request.offset(), 100);
}
