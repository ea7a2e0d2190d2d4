use diary_sync::DiaryError;
use diary_sync::portal::{DiaryPortal, PortalClient};
use httpmock::prelude::*;
use serde_json::json;

use crate::fixture::{TOKEN, credentials, login, portal_config};

#[test]
fn login_sends_browser_headers() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/auth/login")
            .header("accept", "application/json")
            .header("origin", "https://vtu.internyet.in")
            .header("referer", "https://vtu.internyet.in/")
            .header("content-type", "application/json");
        then.status(200).json_body(json!({"message": "ok"}));
    });

    PortalClient::new(&portal_config(&server))
        .unwrap()
        .authenticate(&credentials())
        .unwrap();

    mock.assert_hits(1);
}

#[test]
fn rejected_login_is_authentication_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/auth/login");
        then.status(401).body("invalid credentials");
    });

    let err = PortalClient::new(&portal_config(&server))
        .unwrap()
        .authenticate(&credentials())
        .unwrap_err();

    match err {
        DiaryError::Authentication(message) => {
            assert!(message.contains("401"));
            assert!(message.contains("invalid credentials"));
        }
        other => panic!("expected authentication error, got {other:?}"),
    }
}

#[test]
fn token_from_login_is_sent_as_bearer() {
    let server = MockServer::start();
    let session = login(&server);
    let listing = server.mock(|when, then| {
        when.method(GET)
            .path("/student/internship-diaries")
            .header("authorization", format!("Bearer {TOKEN}"));
        then.status(200)
            .json_body(json!({"data": {"data": [], "last_page": 1}}));
    });

    session.fetch_page(1).unwrap();
    listing.assert_hits(1);
}

#[test]
fn cookie_only_login_still_fetches() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/auth/login");
        then.status(200)
            .header("set-cookie", "session=abc; Path=/")
            .json_body(json!({"message": "Logged in"}));
    });
    let listing = server.mock(|when, then| {
        when.method(GET)
            .path("/student/internship-diaries")
            .header("cookie", "session=abc");
        then.status(200)
            .json_body(json!({"data": {"data": [], "last_page": 1}}));
    });

    let session = PortalClient::new(&portal_config(&server))
        .unwrap()
        .authenticate(&credentials())
        .unwrap();
    session.fetch_page(1).unwrap();

    listing.assert_hits(1);
}
