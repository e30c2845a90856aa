//! /processes, /shutdown and unknown routes

use std::time::Duration;

use crate::helpers::*;
use healthcheck_api::health::{ProcessFact, ProcessState, Targets};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_processes_listing() {
    let server = TestServer::with_targets(
        Targets::default(),
        vec![
            ProcessFact::new(1, "init").with_cmdline(["/sbin/init"]),
            python(),
            ProcessFact::new(42, "defunct").with_status(ProcessState::Zombie),
        ],
    );

    let (status, body) = server.get_json("/processes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"pid": 1, "name": "init", "cmdline": "/sbin/init", "status": "running"},
            {
                "pid": 3376,
                "name": "Python",
                "cmdline": "/usr/local/bin/python -m http.server 8000",
                "status": "running"
            }
        ])
    );
}

#[tokio::test]
async fn test_processes_requires_get() {
    let server = TestServer::with_targets(Targets::default(), vec![]);
    let resp = server.post("/processes").await;
    assert_status(&resp, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unknown_route() {
    let server = TestServer::with_targets(Targets::default(), vec![]);
    let (status, body) = server.get_json("/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "not found"}));
}

#[tokio::test]
async fn test_shutdown_requires_post() {
    let server = TestServer::with_targets(Targets::default(), vec![]);
    let resp = server.get("/shutdown").await;

    assert_status(&resp, StatusCode::METHOD_NOT_ALLOWED);
    assert_header(&resp, "allow", "POST");
    assert!(!server.server.shutdown_handle().is_triggered());
}

/// POST /shutdown answers, stops accepting and drains
#[tokio::test]
async fn test_shutdown_route() {
    let server = TestServer::with_targets(Targets::default(), vec![]);
    let port = server.port();

    let resp = server.post("/shutdown").await;
    assert_status(&resp, StatusCode::OK);
    assert_eq!(
        resp.json::<serde_json::Value>().await.unwrap(),
        json!({"message": "shutting down"})
    );

    let handle = server.server.shutdown_handle();
    assert!(handle.is_triggered());

    let drained = server.server.wait_for_drain(Duration::from_secs(5)).await;
    assert!(drained, "connections did not drain");
    assert!(server.join(Duration::from_secs(5)).await, "accept loop still running");
    assert_ne!(port, 0);
}
