//! Request routing and handlers.

use std::convert::Infallible;
use std::sync::Arc;

use hyper::body::Incoming;
use hyper::{Method, Request, StatusCode};
use serde::Serialize;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::response::{self, HttpResponse};
use super::ShutdownHandle;
use crate::config::CheckConfig;
use crate::health::{retain_alive, HealthChecker, ProcessFact};
use crate::system::ProcessSource;

/// Route that stops the daemon.
pub const SHUTDOWN_PATH: &str = "/shutdown";

/// Route that lists the process snapshot.
pub const PROCESSES_PATH: &str = "/processes";

/// Everything a request handler needs.
pub struct AppState<P: ProcessSource> {
    pub checks: Arc<CheckConfig>,
    pub checker: Arc<HealthChecker>,
    pub processes: Arc<P>,
    pub shutdown: ShutdownHandle,
}

#[derive(Debug, PartialEq, Eq)]
enum Route {
    Health,
    Shutdown,
    Processes,
    NotFound,
}

impl<P: ProcessSource> AppState<P> {
    fn route(&self, path: &str) -> Route {
        // The health route wins if it collides with a built-in one
        if path == self.checks.url {
            Route::Health
        } else if path == SHUTDOWN_PATH {
            Route::Shutdown
        } else if path == PROCESSES_PATH {
            Route::Processes
        } else {
            Route::NotFound
        }
    }

    pub async fn handle(
        self: Arc<Self>,
        req: Request<Incoming>,
    ) -> Result<HttpResponse, Infallible> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        debug!(%method, %path, "request");

        let response = match (self.route(&path), method) {
            (Route::Health, Method::GET) => self.health().await,
            (Route::Health, _) => response::method_not_allowed("GET"),
            (Route::Processes, Method::GET) => self.processes().await,
            (Route::Processes, _) => response::method_not_allowed("GET"),
            (Route::Shutdown, Method::POST) => self.shutdown(),
            (Route::Shutdown, _) => response::method_not_allowed("POST"),
            (Route::NotFound, _) => response::not_found(),
        };

        Ok(response)
    }

    async fn snapshot(&self) -> Result<Vec<ProcessFact>, String> {
        let source = Arc::clone(&self.processes);
        tokio::task::spawn_blocking(move || source.snapshot())
            .await
            .map(retain_alive)
            .map_err(|e| format!("process snapshot failed: {}", e))
    }

    /// Evaluate every configured condition.
    async fn health(&self) -> HttpResponse {
        let span = info_span!("health", request_id = %Uuid::new_v4());

        async {
            let facts = match self.snapshot().await {
                Ok(facts) => facts,
                Err(message) => {
                    error!("{}", message);
                    return response::error(StatusCode::INTERNAL_SERVER_ERROR, message);
                }
            };

            match self.checker.evaluate(&self.checks.targets, &facts).await {
                Ok(verdict) if verdict.is_healthy() => {
                    debug!(processes = facts.len(), "all conditions hold");
                    response::json(
                        response::configured_status(self.checks.status_code_healthy),
                        &verdict,
                    )
                }
                Ok(verdict) => {
                    warn!(
                        failed = verdict.errors.len(),
                        errors = %serde_json::to_string(&verdict.errors).unwrap_or_default(),
                        "unhealthy"
                    );
                    response::json(
                        response::configured_status(self.checks.status_code_unhealthy),
                        &verdict,
                    )
                }
                Err(e) => {
                    error!(error = %e, "health evaluation failed");
                    response::error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn processes(&self) -> HttpResponse {
        match self.snapshot().await {
            Ok(facts) => {
                let entries: Vec<ProcessEntry<'_>> = facts.iter().map(ProcessEntry::from).collect();
                response::json(StatusCode::OK, &entries)
            }
            Err(message) => {
                error!("{}", message);
                response::error(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        }
    }

    fn shutdown(&self) -> HttpResponse {
        if self.shutdown.trigger() {
            info!("shutdown requested over HTTP");
        }
        response::json(
            StatusCode::OK,
            &serde_json::json!({ "message": "shutting down" }),
        )
    }
}

/// One process in the `/processes` listing.
#[derive(Serialize)]
struct ProcessEntry<'a> {
    pid: u32,
    name: &'a str,
    cmdline: String,
    status: &'static str,
}

impl<'a> From<&'a ProcessFact> for ProcessEntry<'a> {
    fn from(fact: &'a ProcessFact) -> Self {
        Self {
            pid: fact.pid,
            name: &fact.name,
            cmdline: fact.command_line(),
            status: fact.status.as_str(),
        }
    }
}
