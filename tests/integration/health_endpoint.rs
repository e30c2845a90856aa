//! Health route tests
//!
//! Process conditions evaluated against a fixed snapshot.

use std::path::Path;

use crate::helpers::*;
use healthcheck_api::config::CheckConfig;
use healthcheck_api::health::{ProcessCondition, ProcessFact, ProcessState, Targets};
use reqwest::StatusCode;
use serde_json::json;

fn process_targets(conditions: Vec<ProcessCondition>) -> Targets {
    Targets {
        target_process: conditions,
        ..Targets::default()
    }
}

/// No targets at all is healthy
#[tokio::test]
async fn test_no_targets_is_healthy() {
    let server = TestServer::with_targets(Targets::default(), vec![]);
    let resp = server.get("/").await;

    assert_status(&resp, StatusCode::OK);
    assert_header(&resp, "content-type", "application/json");
    assert_eq!(resp.text().await.unwrap(), "{}");
}

/// Process present by name
#[tokio::test]
async fn test_process_name_present() {
    let server = TestServer::with_targets(
        process_targets(vec![ProcessCondition::default().with_name("Python")]),
        vec![python()],
    );

    let (status, body) = server.get_json("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

/// Absent process is reported verbatim
#[tokio::test]
async fn test_process_name_absent() {
    let server = TestServer::with_targets(
        process_targets(vec![ProcessCondition::default().with_name("Python")]),
        vec![ProcessFact::new(1, "init")],
    );

    let (status, body) = server.get_json("/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"errors": [{"name": "Python"}]}));
}

/// Only failing conditions are listed, in configured order
#[tokio::test]
async fn test_only_failures_listed() {
    let server = TestServer::with_targets(
        process_targets(vec![
            ProcessCondition::default().with_pid(1),
            ProcessCondition::default().with_name("nginx"),
            ProcessCondition::default().with_name("Python"),
            ProcessCondition::default().with_pid(99999),
        ]),
        vec![ProcessFact::new(1, "init"), python()],
    );

    let (status, body) = server.get_json("/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"errors": [{"name": "nginx"}, {"pid": 99999}]})
    );
}

/// Command line is matched from its start
#[tokio::test]
async fn test_matching_is_anchored() {
    let anchored = TestServer::with_targets(
        process_targets(vec![
            ProcessCondition::default().with_matching("^.+/python .+$")
        ]),
        vec![python()],
    );
    let (status, _) = anchored.get_json("/").await;
    assert_eq!(status, StatusCode::OK);

    // Occurs in the middle of the command line only
    let unanchored = TestServer::with_targets(
        process_targets(vec![ProcessCondition::default().with_matching("http\\.server")]),
        vec![python()],
    );
    let (status, body) = unanchored.get_json("/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"errors": [{"matching": "http\\.server"}]}));
}

/// Zombie processes do not count as running
#[tokio::test]
async fn test_zombie_is_not_running() {
    let server = TestServer::with_targets(
        process_targets(vec![ProcessCondition::default().with_name("Python")]),
        vec![python().with_status(ProcessState::Zombie)],
    );

    let (status, _) = server.get_json("/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

/// Custom status codes and route from the check file
#[tokio::test]
async fn test_custom_status_codes() {
    let checks = CheckConfig {
        url: "/healthz".into(),
        status_code_healthy: 201,
        status_code_unhealthy: 501,
        ..CheckConfig::default()
    };

    let healthy = TestServer::start(checks.clone(), vec![python()]);
    assert_status(&healthy.get("/healthz").await, StatusCode::CREATED);
    assert_status(&healthy.get("/").await, StatusCode::NOT_FOUND);

    let failing = CheckConfig {
        targets: process_targets(vec![ProcessCondition::default().with_name("nginx")]),
        ..checks
    };
    let unhealthy = TestServer::start(failing, vec![python()]);
    assert_status(&unhealthy.get("/healthz").await, StatusCode::NOT_IMPLEMENTED);
}

/// A broken pattern fails the request, not the condition
#[tokio::test]
async fn test_invalid_pattern_is_server_error() {
    let server = TestServer::start(
        CheckConfig {
            status_code_unhealthy: 503,
            targets: process_targets(vec![ProcessCondition::default().with_matching("(")]),
            ..CheckConfig::default()
        },
        vec![python()],
    );

    let (status, body) = server.get_json("/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.get("errors").is_none());
    assert!(body["error"].as_str().unwrap().contains('('));
}

/// Every request evaluates afresh
#[tokio::test]
async fn test_repeated_requests_agree() {
    let server = TestServer::with_targets(
        process_targets(vec![ProcessCondition::default().with_name("nginx")]),
        vec![python()],
    );

    let first = server.get_json("/").await;
    let second = server.get_json("/").await;
    assert_eq!(first, second);
}

/// Only GET is served on the health route
#[tokio::test]
async fn test_health_method_not_allowed() {
    let server = TestServer::with_targets(Targets::default(), vec![]);
    let resp = server.post("/").await;

    assert_status(&resp, StatusCode::METHOD_NOT_ALLOWED);
    assert_header(&resp, "allow", "GET");
}

/// Failing conditions come back with the keys they were written with
#[tokio::test]
async fn test_errors_echo_check_file_spelling() {
    let closed = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let doc = json!({
        "url": "/",
        "port": 5000,
        "status_code_healthy": 200,
        "status_code_unhealthy": 500,
        "target_process": [{"name": "Python"}, {"name": "nginx"}],
        "target_tcp": [{"ip_address": "127.0.0.1", "port": closed}]
    });
    let checks = CheckConfig::from_json(Path::new("config.json"), &doc.to_string()).unwrap();

    let server = TestServer::start(checks, vec![python()]);
    let resp = server.get("/").await;
    assert_status(&resp, StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = serde_json::from_str(&resp.text().await.unwrap()).unwrap();
    assert_eq!(
        body,
        json!({"errors": [
            {"name": "nginx"},
            {"ip_address": "127.0.0.1", "port": closed}
        ]})
    );
}
