use std::time::Duration;

use diary_sync::DiaryError;
use diary_sync::portal::{FetchOptions, fetch_all};
use diary_sync::reconcile::ReconciliationIndex;
use httpmock::prelude::*;
use serde_json::json;

use crate::fixture::{login, mock_listing};

fn no_delay() -> FetchOptions {
    FetchOptions {
        page_delay: Duration::ZERO,
        max_pages: 1_000,
    }
}

#[test]
fn fetches_every_page_in_order() {
    let server = MockServer::start();
    let session = login(&server);
    mock_listing(
        &server,
        1,
        json!([{"id": 1, "date": "2024-01-01"}, {"id": 2, "date": "2024-01-02"}]),
        3,
    );
    mock_listing(&server, 2, json!([{"id": 3, "date": "2024-01-03"}]), 3);
    mock_listing(&server, 3, json!([{"id": 4, "date": "2024-01-04T00:00:00.000000Z"}]), 3);

    let records = fetch_all(&session, &no_delay()).unwrap();

    let ids: Vec<i64> = records.iter().filter_map(|r| r.id()).map(|id| id.0).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);

    let index = ReconciliationIndex::build(&records);
    assert_eq!(index.len(), 4);
    assert_eq!(index.get("2024-01-04".parse().unwrap()).map(|id| id.0), Some(4));
}

#[test]
fn empty_portal_is_a_single_page() {
    let server = MockServer::start();
    let session = login(&server);
    let first = server.mock(|when, then| {
        when.method(GET)
            .path("/student/internship-diaries")
            .query_param("page", "1");
        then.status(200).json_body(json!({"data": {"data": [], "last_page": 1}}));
    });

    let records = fetch_all(&session, &no_delay()).unwrap();

    assert!(records.is_empty());
    first.assert_hits(1);
}

#[test]
fn failed_page_fails_the_fetch() {
    let server = MockServer::start();
    let session = login(&server);
    mock_listing(&server, 1, json!([{"id": 1, "date": "2024-01-01"}]), 2);
    server.mock(|when, then| {
        when.method(GET)
            .path("/student/internship-diaries")
            .query_param("page", "2");
        then.status(500).body("boom");
    });

    let err = fetch_all(&session, &no_delay()).unwrap_err();
    match err {
        DiaryError::Fetch(message) => assert!(message.contains("page 2")),
        other => panic!("expected fetch error, got {other:?}"),
    }
}

#[test]
fn max_pages_rejects_runaway_listing() {
    let server = MockServer::start();
    let session = login(&server);
    let pages = server.mock(|when, then| {
        when.method(GET).path("/student/internship-diaries");
        then.status(200)
            .json_body(json!({"data": {"data": [{"id": 9, "date": "2024-02-01"}], "last_page": 99}}));
    });

    let err = fetch_all(
        &session,
        &FetchOptions {
            page_delay: Duration::ZERO,
            max_pages: 2,
        },
    )
    .unwrap_err();

    assert!(matches!(err, DiaryError::Fetch(_)));
    pages.assert_hits(2);
}
