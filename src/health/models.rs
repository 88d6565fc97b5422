use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
}

impl ComponentHealth {
    pub fn healthy(response_time_ms: u64) -> Self {
        Self {
            status: ComponentStatus::Healthy,
            message: None,
            response_time_ms: Some(response_time_ms),
        }
    }

    pub fn unhealthy(error: String) -> Self {
        Self {
            status: ComponentStatus::Unhealthy,
            message: Some(error),
            response_time_ms: None,
        }
    }

    pub fn disabled() -> Self {
        Self {
            status: ComponentStatus::Disabled,
            message: None,
            response_time_ms: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: ComponentStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: BTreeMap<String, ComponentHealth>,
}

impl HealthCheckResponse {
    pub fn new(version: String, uptime_seconds: u64) -> Self {
        Self {
            status: ComponentStatus::Healthy,
            timestamp: Utc::now(),
            version,
            uptime_seconds,
            components: BTreeMap::new(),
        }
    }

    /// The database is required; any other component can only degrade the service.
    pub fn add_component(&mut self, name: &str, health: ComponentHealth, required: bool) {
        let impact = match (health.status, required) {
            (ComponentStatus::Unhealthy, true) => ComponentStatus::Unhealthy,
            (ComponentStatus::Unhealthy, false) | (ComponentStatus::Degraded, _) => {
                ComponentStatus::Degraded
            }
            _ => ComponentStatus::Healthy,
        };
        self.status = match (self.status, impact) {
            (ComponentStatus::Unhealthy, _) | (_, ComponentStatus::Unhealthy) => {
                ComponentStatus::Unhealthy
            }
            (ComponentStatus::Degraded, _) | (_, ComponentStatus::Degraded) => {
                ComponentStatus::Degraded
            }
            _ => ComponentStatus::Healthy,
        };
        self.components.insert(name.to_string(), health);
    }
}
