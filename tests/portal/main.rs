//! Portal integration suite: real HTTP client against a local mock server.

mod fixture;
mod login_tests;
mod fetch_tests;
mod submission_tests;
