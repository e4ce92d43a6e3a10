use std::time::Instant;
use tracing::{error, info};

use crate::app::Application;
use crate::extension::{BoxError, ErrorOutcome, Extension, ExtensionError};
use crate::message::{ServerRequest, ServerResponse};

/// Emits one log line per served request and per failure, plus loop
/// start/stop summaries.
#[derive(Debug, Default)]
pub struct RequestLogExtension {
    started: Option<Instant>,
    served: u64,
    failed: u64,
}

impl RequestLogExtension {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn served(&self) -> u64 {
        self.served
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }
}

impl Extension for RequestLogExtension {
    fn name(&self) -> &str {
        "request-log"
    }

    fn before_loop(&mut self, app: &Application) -> Result<(), ExtensionError> {
        info!(app = app.name(), environment = app.environment(), "worker loop started");
        Ok(())
    }

    fn before_request(&mut self, _app: &Application, _request: &ServerRequest) -> Result<(), ExtensionError> {
        self.started = Some(Instant::now());
        Ok(())
    }

    fn after_request(
        &mut self,
        _app: &Application,
        request: &ServerRequest,
        response: &ServerResponse,
    ) -> Result<(), ExtensionError> {
        let elapsed_ms = self
            .started
            .take()
            .map(|start| start.elapsed().as_secs_f64() * 1000.0)
            .unwrap_or_default();
        self.served += 1;

        info!(
            method = %request.method(),
            path = request.uri().path(),
            status = response.status().as_u16(),
            elapsed_ms,
            "request served"
        );
        Ok(())
    }

    fn after_loop(&mut self, app: &Application) -> Result<(), ExtensionError> {
        info!(app = app.name(), served = self.served, failed = self.failed, "worker loop stopped");
        Ok(())
    }

    fn error(
        &mut self,
        _app: &Application,
        request: &ServerRequest,
        err: &BoxError,
    ) -> Result<Option<ErrorOutcome>, ExtensionError> {
        self.started = None;
        self.failed += 1;

        error!(
            method = %request.method(),
            path = request.uri().path(),
            error = %err,
            "request failed"
        );
        Ok(None)
    }
}
