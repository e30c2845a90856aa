//! TCP and HTTP conditions against live local endpoints
//!
//! A second server with no targets serves as the probed endpoint.

use crate::helpers::*;
use healthcheck_api::health::{HttpCondition, TcpCondition, Targets};
use reqwest::StatusCode;
use serde_json::json;

async fn closed_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn test_tcp_targets() {
    let upstream = TestServer::with_targets(Targets::default(), vec![]);
    let closed = closed_port().await;

    let server = TestServer::with_targets(
        Targets {
            target_tcp: vec![
                TcpCondition::with_ip("127.0.0.1", upstream.port()),
                TcpCondition::with_hostname("localhost", upstream.port()),
                TcpCondition::with_ip("127.0.0.1", closed),
            ],
            ..Targets::default()
        },
        vec![],
    );

    let (status, body) = server.get_json("/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"errors": [{"port": closed, "ipAddress": "127.0.0.1"}]})
    );
}

#[tokio::test]
async fn test_http_targets() {
    let upstream = TestServer::with_targets(Targets::default(), vec![]);
    let base = upstream.base_url.clone();

    let server = TestServer::with_targets(
        Targets {
            target_http: vec![
                HttpCondition::new(format!("{}/", base)),
                HttpCondition::new(format!("{}/missing", base)).with_status_codes([404]),
                HttpCondition::new(format!("{}/missing", base)),
            ],
            ..Targets::default()
        },
        vec![],
    );

    let (status, body) = server.get_json("/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"errors": [{"url": format!("{}/missing", base)}]})
    );
}

#[tokio::test]
async fn test_unreachable_http_target() {
    let closed = closed_port().await;
    let url = format!("http://127.0.0.1:{}/", closed);

    let server = TestServer::with_targets(
        Targets {
            target_http: vec![HttpCondition::new(url.clone())],
            ..Targets::default()
        },
        vec![],
    );

    let (status, body) = server.get_json("/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"errors": [{"url": url}]}));
}

/// A malformed address fails the whole request
#[tokio::test]
async fn test_invalid_ip_is_server_error() {
    let server = TestServer::with_targets(
        Targets {
            target_tcp: vec![TcpCondition::with_ip("999.1.1.1", 80)],
            ..Targets::default()
        },
        vec![],
    );

    let (status, body) = server.get_json("/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("999.1.1.1"));
}
