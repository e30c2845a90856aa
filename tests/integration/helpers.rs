//! Test helpers and utilities

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use tokio::task::JoinHandle;

use healthcheck_api::config::CheckConfig;
use healthcheck_api::health::{HealthChecker, HealthConfig, ProcessFact, Targets};
use healthcheck_api::server::Server;
use healthcheck_api::system::FixedProcesses;

/// In-process server bound to 127.0.0.1 on a free port
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    pub server: Arc<Server<FixedProcesses>>,
    handle: Option<JoinHandle<()>>,
}

#[allow(dead_code)]
impl TestServer {
    /// Serve `checks` against the given process snapshot
    pub fn start(checks: CheckConfig, processes: Vec<ProcessFact>) -> Self {
        let checker = HealthChecker::new(HealthConfig {
            tcp_timeout: Duration::from_secs(2),
            http_timeout: Duration::from_secs(2),
            ..HealthConfig::default()
        })
        .expect("Failed to create health checker");

        let server = Server::bind(
            "127.0.0.1:0".parse().unwrap(),
            checks,
            checker,
            FixedProcesses(processes),
        )
        .expect("Failed to bind test server");
        let server = Arc::new(server);
        let base_url = format!("http://{}", server.local_addr());

        let runner = Arc::clone(&server);
        let handle = tokio::spawn(async move {
            runner.run().await.expect("Server failed");
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            client,
            server,
            handle: Some(handle),
        }
    }

    /// Default check file with the given targets
    pub fn with_targets(targets: Targets, processes: Vec<ProcessFact>) -> Self {
        Self::start(CheckConfig::with_targets(targets), processes)
    }

    pub fn port(&self) -> u16 {
        self.server.local_addr().port()
    }

    /// Make a GET request to the server
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// Make a POST request to the server
    pub async fn post(&self, path: &str) -> Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("POST request failed")
    }

    /// GET the path and parse the body as JSON
    pub async fn get_json(&self, path: &str) -> (StatusCode, serde_json::Value) {
        let resp = self.get(path).await;
        let status = resp.status();
        assert_header(&resp, "content-type", "application/json");
        let body = resp.json().await.expect("Body is not JSON");
        (status, body)
    }

    /// Wait for the accept loop to exit
    pub async fn join(mut self, timeout: Duration) -> bool {
        match self.handle.take() {
            Some(handle) => tokio::time::timeout(timeout, handle).await.is_ok(),
            None => true,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.trigger_shutdown();
    }
}

/// A Python interpreter as it shows up in the process table
pub fn python() -> ProcessFact {
    ProcessFact::new(3376, "Python").with_cmdline([
        "/usr/local/bin/python",
        "-m",
        "http.server",
        "8000",
    ])
}

/// Assert that response has expected status
pub fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(
        response.status(),
        expected,
        "Expected status {}, got {}",
        expected,
        response.status()
    );
}

/// Assert that response contains header
pub fn assert_header(response: &Response, name: &str, expected: &str) {
    let value = response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("Header '{}' not found", name))
        .to_str()
        .unwrap();
    assert_eq!(value, expected, "Header '{}' mismatch", name);
}
