use std::time::Duration;

use diary_sync::config::{InvalidSkillPolicy, PortalConfig};
use diary_sync::engine::{EngineOptions, RetryPolicy};
use diary_sync::entry::DiaryEntry;
use diary_sync::payload::PayloadDefaults;
use diary_sync::portal::{Credentials, PortalClient, PortalSession};
use httpmock::prelude::*;
use serde_json::{Value, json};

pub const TOKEN: &str = "tok-123";

pub fn portal_config(server: &MockServer) -> PortalConfig {
    PortalConfig {
        base_url: server.base_url(),
        timeout_secs: 5,
        ..PortalConfig::default()
    }
}

pub fn credentials() -> Credentials {
    Credentials {
        email: "intern@example.com".to_string(),
        password: "hunter2".to_string(),
    }
}

pub fn mock_login(server: &MockServer) {
    server.mock(|when, then| {
        when.method(POST).path("/auth/login");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({"data": {"token": TOKEN}}));
    });
}

pub fn login(server: &MockServer) -> PortalSession {
    mock_login(server);
    PortalClient::new(&portal_config(server))
        .expect("client")
        .authenticate(&credentials())
        .expect("login")
}

/// One listing page in the portal's envelope.
pub fn listing(records: Value, last_page: u32) -> Value {
    json!({"data": {"data": records, "last_page": last_page}})
}

pub fn mock_listing(server: &MockServer, page: u32, records: Value, last_page: u32) {
    server.mock(|when, then| {
        when.method(GET)
            .path("/student/internship-diaries")
            .query_param("page", page.to_string());
        then.status(200)
            .header("content-type", "application/json")
            .json_body(listing(records, last_page));
    });
}

pub fn entry(date: &str, skills: &[&str]) -> DiaryEntry {
    DiaryEntry {
        date: date.parse().expect("date"),
        work_summary: format!("Worked on {date}"),
        hours: serde_json::Number::from(8),
        blockers: "None".to_string(),
        learnings: "Testing".to_string(),
        skills: skills.iter().map(|s| (*s).to_string()).collect(),
    }
}

/// Engine options without any sleeping.
pub fn fast_options() -> EngineOptions {
    EngineOptions {
        retry: RetryPolicy {
            max_attempts: 3,
            delay: Duration::ZERO,
            backoff: 1.0,
        },
        request_delay: Duration::ZERO,
        on_invalid_skill: InvalidSkillPolicy::Fail,
        defaults: PayloadDefaults {
            internship_id: 702,
            mood: 5,
        },
    }
}
