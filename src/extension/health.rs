use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::info;

use crate::app::Application;
use crate::client::RelayClient;
use crate::config::{Config, DEFAULT_HEALTH_PATH};
use crate::extension::{Extension, ExtensionError};
use crate::message::{json_response, ServerRequest};

/// Key under which the shared `HealthService` is bound in the application.
pub const HEALTH_SERVICE_KEY: &str = "health";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    pub message: Option<String>,
    pub details: HashMap<String, serde_json::Value>,
    pub last_check: std::time::SystemTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub checks: Vec<HealthCheck>,
    pub timestamp: std::time::SystemTime,
}

/// Named health checks shared between the health extension and whatever
/// parts of the application report into it.
#[derive(Clone, Default)]
pub struct HealthService {
    checks: Arc<RwLock<HashMap<String, HealthCheck>>>,
}

impl HealthService {
    pub fn new() -> Self {
        HealthService {
            checks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn register_check(&self, name: impl Into<String>) -> Result<(), ExtensionError> {
        let name = name.into();
        let check = HealthCheck {
            name: name.clone(),
            status: HealthStatus::Healthy,
            message: None,
            details: HashMap::new(),
            last_check: std::time::SystemTime::now(),
        };

        let mut checks = self.checks.write()
            .map_err(|_| ExtensionError::unknown("Health checks lock poisoned"))?;
        checks.insert(name, check);
        Ok(())
    }

    pub fn update_check(
        &self,
        name: &str,
        status: HealthStatus,
        message: Option<String>,
    ) -> Result<(), ExtensionError> {
        let mut checks = self.checks.write()
            .map_err(|_| ExtensionError::unknown("Health checks lock poisoned"))?;
        let check = checks.get_mut(name)
            .ok_or_else(|| ExtensionError::configuration(format!("Health check '{}' not found", name)))?;

        check.status = status;
        check.message = message;
        check.last_check = std::time::SystemTime::now();

        Ok(())
    }

    pub fn add_detail(
        &self,
        name: &str,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Result<(), ExtensionError> {
        let mut checks = self.checks.write()
            .map_err(|_| ExtensionError::unknown("Health checks lock poisoned"))?;
        let check = checks.get_mut(name)
            .ok_or_else(|| ExtensionError::configuration(format!("Health check '{}' not found", name)))?;

        check.details.insert(key.into(), value);

        Ok(())
    }

    pub fn get_check(&self, name: &str) -> Result<Option<HealthCheck>, ExtensionError> {
        let checks = self.checks.read()
            .map_err(|_| ExtensionError::unknown("Health checks lock poisoned"))?;
        Ok(checks.get(name).cloned())
    }

    /// Checks sorted by name.
    pub fn get_all_checks(&self) -> Result<Vec<HealthCheck>, ExtensionError> {
        let checks = self.checks.read()
            .map_err(|_| ExtensionError::unknown("Health checks lock poisoned"))?;
        let mut all: Vec<HealthCheck> = checks.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    pub fn get_overall_status(&self) -> Result<HealthStatus, ExtensionError> {
        Ok(overall_status(&self.get_all_checks()?))
    }

    pub fn get_health_report(&self) -> Result<HealthReport, ExtensionError> {
        let checks = self.get_all_checks()?;

        Ok(HealthReport {
            status: overall_status(&checks),
            checks,
            timestamp: std::time::SystemTime::now(),
        })
    }
}

fn overall_status(checks: &[HealthCheck]) -> HealthStatus {
    let mut has_degraded = false;

    for check in checks {
        match check.status {
            HealthStatus::Unhealthy => return HealthStatus::Unhealthy,
            HealthStatus::Degraded => has_degraded = true,
            HealthStatus::Healthy => {}
        }
    }

    if has_degraded {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

/// Answers health probes directly from the worker so they never reach the
/// application.
pub struct HealthCheckExtension {
    service: HealthService,
    path: String,
}

impl HealthCheckExtension {
    pub fn new() -> Self {
        Self::with_service(HealthService::new())
    }

    pub fn with_service(service: HealthService) -> Self {
        HealthCheckExtension {
            service,
            path: DEFAULT_HEALTH_PATH.to_string(),
        }
    }

    pub fn service(&self) -> &HealthService {
        &self.service
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Default for HealthCheckExtension {
    fn default() -> Self {
        Self::new()
    }
}

impl Extension for HealthCheckExtension {
    fn name(&self) -> &str {
        "health"
    }

    fn init(&mut self, app: &mut Application, config: &Config) -> Result<(), ExtensionError> {
        self.path = config.health_path();
        app.bind(HEALTH_SERVICE_KEY, self.service.clone());

        info!(path = %self.path, "health endpoint registered");
        Ok(())
    }

    fn handle_request(
        &mut self,
        _app: &Application,
        client: &mut dyn RelayClient,
        request: &ServerRequest,
    ) -> Result<bool, ExtensionError> {
        if request.method() != http::Method::GET || request.uri().path() != self.path {
            return Ok(false);
        }

        let report = self.service.get_health_report()?;
        let status = match report.status {
            HealthStatus::Unhealthy => http::StatusCode::SERVICE_UNAVAILABLE,
            HealthStatus::Healthy | HealthStatus::Degraded => http::StatusCode::OK,
        };

        let body = serde_json::to_value(&report)?;
        client.respond(json_response(status, &body)?)?;

        Ok(true)
    }
}
