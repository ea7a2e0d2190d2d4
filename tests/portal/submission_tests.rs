use diary_sync::DiaryError;
use diary_sync::engine::{EntryState, SubmissionEngine};
use diary_sync::payload::Action;
use diary_sync::portal::{FetchOptions, fetch_all};
use diary_sync::reconcile::ReconciliationIndex;
use diary_sync::report::summarize;
use diary_sync::skills::SkillResolver;
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

use crate::fixture::{TOKEN, entry, fast_options, login, mock_listing};

const STORE: &str = "/student/internship-diaries/store";

fn fetch_index(session: &diary_sync::portal::PortalSession) -> ReconciliationIndex {
    let records = fetch_all(
        session,
        &FetchOptions {
            page_delay: Duration::ZERO,
            max_pages: 10,
        },
    )
    .unwrap();
    ReconciliationIndex::build(&records)
}

fn expected_payload() -> serde_json::Value {
    json!({
        "internship_id": 702,
        "date": "2024-01-05",
        "description": "Worked on 2024-01-05",
        "hours": 8,
        "blockers": "None",
        "learnings": "Testing",
        "links": "",
        "mood_slider": 5,
        "skill_ids": [3]
    })
}

#[test]
fn new_date_is_created() {
    let server = MockServer::start();
    let session = login(&server);
    mock_listing(&server, 1, json!([]), 1);
    let store = server.mock(|when, then| {
        when.method(POST)
            .path(STORE)
            .header("authorization", format!("Bearer {TOKEN}"))
            .json_body(expected_payload());
        then.status(201).json_body(json!({"message": "created"}));
    });

    let resolver = SkillResolver::builtin().unwrap();
    let engine = SubmissionEngine::new(&resolver, fast_options());
    let index = fetch_index(&session);
    let outcomes = engine
        .process(&[entry("2024-01-05", &["Python"])], &index, Some(&session), |_| {})
        .unwrap();

    store.assert_hits(1);
    assert_eq!(outcomes[0].state, EntryState::Succeeded);
    assert_eq!(outcomes[0].action, Action::Create);
    let summary = summarize(&outcomes, Duration::ZERO);
    assert_eq!((summary.success_count, summary.fail_count), (1, 0));
}

#[test]
fn existing_date_is_updated_with_remote_id() {
    let server = MockServer::start();
    let session = login(&server);
    mock_listing(&server, 1, json!([{"id": 42, "date": "2024-01-05"}]), 1);
    let mut update = expected_payload();
    update["id"] = json!(42);
    let store = server.mock(|when, then| {
        when.method(POST).path(STORE).json_body(update);
        then.status(200).json_body(json!({"message": "updated"}));
    });

    let resolver = SkillResolver::builtin().unwrap();
    let engine = SubmissionEngine::new(&resolver, fast_options());
    let index = fetch_index(&session);
    let outcomes = engine
        .process(&[entry("2024-01-05", &["Python"])], &index, Some(&session), |_| {})
        .unwrap();

    store.assert_hits(1);
    assert_eq!(outcomes[0].action, Action::Update);
    assert_eq!(outcomes[0].state, EntryState::Succeeded);
}

#[test]
fn server_error_is_retried_then_recorded() {
    let server = MockServer::start();
    let session = login(&server);
    let store = server.mock(|when, then| {
        when.method(POST).path(STORE);
        then.status(500).body("Internal Server Error");
    });

    let resolver = SkillResolver::builtin().unwrap();
    let engine = SubmissionEngine::new(&resolver, fast_options());
    let outcomes = engine
        .process(
            &[entry("2024-01-05", &["Python"])],
            &ReconciliationIndex::empty(),
            Some(&session),
            |_| {},
        )
        .unwrap();

    store.assert_hits(3);
    assert_eq!(outcomes[0].state, EntryState::Failed);
    assert_eq!(outcomes[0].attempts, 3);
    assert!(outcomes[0].message.contains("500"));
    let summary = summarize(&outcomes, Duration::ZERO);
    assert_eq!(summary.fail_count, 1);
}

#[test]
fn unexpected_success_status_is_a_failure() {
    let server = MockServer::start();
    let session = login(&server);
    let store = server.mock(|when, then| {
        when.method(POST).path(STORE);
        then.status(204);
    });

    let resolver = SkillResolver::builtin().unwrap();
    let engine = SubmissionEngine::new(&resolver, fast_options());
    let outcomes = engine
        .process(
            &[entry("2024-01-05", &[])],
            &ReconciliationIndex::empty(),
            Some(&session),
            |_| {},
        )
        .unwrap();

    assert_eq!(outcomes[0].state, EntryState::Failed);
    assert!(store.hits() >= 1);
}

#[test]
fn unknown_skill_stops_the_engine_at_that_entry() {
    let server = MockServer::start();
    let session = login(&server);
    let store = server.mock(|when, then| {
        when.method(POST).path(STORE);
        then.status(201);
    });

    let resolver = SkillResolver::builtin().unwrap();
    let engine = SubmissionEngine::new(&resolver, fast_options());
    let err = engine
        .process(
            &[entry("2024-01-04", &["Python"]), entry("2024-01-05", &["Rust"])],
            &ReconciliationIndex::empty(),
            Some(&session),
            |_| {},
        )
        .unwrap_err();

    assert!(matches!(err, DiaryError::InvalidSkill(ref name) if name == "Rust"));
    store.assert_hits(1);
}
