// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire-shape tests for the event catalog

use super::github::*;
use super::leetcode::*;
use super::monkeytype::*;
use super::*;
use crate::clock::{Clock, FakeClock};
use serde_json::json;

fn clock() -> FakeClock {
    FakeClock::at("2024-01-01T00:00:00Z".parse().unwrap())
}

fn user() -> Uuid {
    Uuid::parse_str("6f1c1c9e-8d1b-4c1e-9f57-0a3c1d2e3f40").unwrap()
}

fn to_json<E: Event>(event: &E) -> serde_json::Value {
    serde_json::to_value(event).unwrap()
}

#[test]
fn linked_event_uses_documented_field_names() {
    let event = GitHubAccountLinked::new(user(), "583231", "octocat", &clock());

    assert_eq!(
        to_json(&event),
        json!({
            "user_id": "6f1c1c9e-8d1b-4c1e-9f57-0a3c1d2e3f40",
            "github_user_id": "583231",
            "github_username": "octocat",
            "linked_at": "2024-01-01T00:00:00Z",
        })
    );
    assert_eq!(event.event_type(), "github.account.linked");
}

#[test]
fn absent_optional_fields_are_omitted_not_null() {
    let unlinked = GitHubAccountUnlinked::new(user(), &clock());
    let value = to_json(&unlinked);
    assert!(value.get("github_username").is_none());

    let failed = LeetCodeVerificationFailed::new(user(), "timeout", &clock());
    let value = to_json(&failed);
    assert_eq!(value["reason"], "timeout");
    assert!(value.get("error_code").is_none());
    assert!(value.get("leetcode_username").is_none());
}

#[test]
fn present_optional_fields_are_written() {
    let failed = LeetCodeVerificationFailed::new(user(), "bio_fetch_failed", &clock())
        .with_username("coder")
        .with_error_code(error_codes::RATE_LIMIT);
    let value = to_json(&failed);
    assert_eq!(value["leetcode_username"], "coder");
    assert_eq!(value["error_code"], "rate_limit");
}

#[test]
fn missing_optional_fields_decode_as_none() {
    let value = json!({
        "user_id": user(),
        "monkeytype_username": "typist",
        "verified": true,
        "updated_at": "2024-01-01T00:00:00Z",
    });
    let event: MonkeytypeProfileUpdated = serde_json::from_value(value).unwrap();
    assert_eq!(event.wpm_best, None);
    assert_eq!(event.tests_completed, None);
    assert_eq!(event.change_reason, None);
}

#[test]
fn from_envelope_decodes_catalog_entry() {
    let event = GitHubProfileUpdated {
        user_id: user(),
        github_username: "octocat".to_string(),
        total_contributions: 1234,
        current_year: 2024,
        updated_at: clock().utc_now(),
        reason: None,
    }
    .with_reason(reasons::INITIAL_LINK);

    let envelope = Envelope::new(event.event_type(), &event).unwrap();
    let decoded = CatalogEvent::from_envelope(&envelope).unwrap();

    assert_eq!(decoded.kind(), EventKind::GitHubProfileUpdated);
    assert_eq!(decoded.user_id(), user());
    assert_eq!(decoded.occurred_at(), clock().utc_now());
    assert_eq!(decoded, CatalogEvent::GitHubProfileUpdated(event));
}

#[test]
fn to_envelope_uses_kind_as_type() {
    let event: CatalogEvent = MonkeytypeCurrentStatsRefreshed {
        user_id: user(),
        monkeytype_username: "typist".to_string(),
        tests_today: Some(12),
        refreshed_at: clock().utc_now(),
    }
    .into();

    let envelope = event.to_envelope().unwrap();
    assert_eq!(envelope.event_type(), "monkeytype.current-stats.refreshed");
    assert_eq!(envelope.event_type(), event.event_type());
    assert_eq!(CatalogEvent::from_envelope(&envelope).unwrap(), event);
}

#[test]
fn unknown_type_is_reported_as_unknown_kind() {
    let envelope = Envelope::new("x.unknown", &json!({})).unwrap();
    let err = CatalogEvent::from_envelope(&envelope).unwrap_err();
    assert!(matches!(err, CatalogError::UnknownKind(_)));
}

#[test]
fn shape_mismatch_is_reported_with_kind() {
    let envelope = Envelope::new("leetcode.account.bound", &json!({"user_id": "u1"})).unwrap();
    let err = CatalogEvent::from_envelope(&envelope).unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Payload {
            kind: EventKind::LeetCodeAccountBound,
            ..
        }
    ));
}

#[test]
fn newer_producer_fields_are_ignored() {
    let value = json!({
        "user_id": user(),
        "leetcode_username": "coder",
        "verified_at": "2024-01-01T00:00:00Z",
        "added_in_a_later_release": 7,
    });
    let raw = serde_json::value::to_raw_value(&value).unwrap();
    let decoded = CatalogEvent::decode(EventKind::LeetCodeVerificationSucceeded, &raw).unwrap();
    assert_eq!(decoded.kind(), EventKind::LeetCodeVerificationSucceeded);
}

#[test]
fn unverified_binding_is_stamped_by_clock() {
    let clock = clock();
    let bound = LeetCodeAccountBound::unverified(user(), "coder", &clock);
    assert!(!bound.verified);
    assert_eq!(bound.occurred_at(), clock.utc_now());
}

#[yare::parameterized(
    github_completed   = { EventKind::GitHubHistoryImportCompleted, "github_username", "years_imported" },
    github_failed      = { EventKind::GitHubHistoryImportFailed, "github_username", "years_attempted" },
    leetcode_completed = { EventKind::LeetCodeHistoryImportCompleted, "leetcode_username", "years_imported" },
    leetcode_failed    = { EventKind::LeetCodeHistoryImportFailed, "leetcode_username", "years_attempted" },
)]
fn null_year_list_decodes_as_empty(kind: EventKind, username: &str, years: &str) {
    let mut value = json!({
        "user_id": user(),
        "total_years": 0,
        "error": "rate limited",
        "completed_at": "2024-01-01T00:00:00Z",
        "failed_at": "2024-01-01T00:00:00Z",
    });
    value[username] = json!("octocat");
    value[years] = serde_json::Value::Null;
    let raw = serde_json::value::to_raw_value(&value).unwrap();

    let decoded = CatalogEvent::decode(kind, &raw).unwrap();

    let years = match decoded {
        CatalogEvent::GitHubHistoryImportCompleted(e) => e.years_imported,
        CatalogEvent::GitHubHistoryImportFailed(e) => e.years_attempted,
        CatalogEvent::LeetCodeHistoryImportCompleted(e) => e.years_imported,
        CatalogEvent::LeetCodeHistoryImportFailed(e) => e.years_attempted,
        other => panic!("unexpected {:?}", other.kind()),
    };
    assert!(years.is_empty());
}

#[test]
fn missing_year_list_decodes_as_empty() {
    let value = json!({
        "user_id": user(),
        "github_username": "octocat",
        "total_years": 0,
        "completed_at": "2024-01-01T00:00:00Z",
    });
    let raw = serde_json::value::to_raw_value(&value).unwrap();

    let decoded = CatalogEvent::decode(EventKind::GitHubHistoryImportCompleted, &raw).unwrap();

    match decoded {
        CatalogEvent::GitHubHistoryImportCompleted(event) => assert!(event.years_imported.is_empty()),
        other => panic!("decoded as {:?}", other.kind()),
    }
}
