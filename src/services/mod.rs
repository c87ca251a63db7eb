//! Lifecycle and text-generation seams for external collaborators.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::comfort::ComfortMetrics;
use crate::domain::{CandidateRecommendation, EnvironmentalReading, UserComfortPreference};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub service: String,
    pub state: HealthState,
    pub detail: Option<String>,
}

impl HealthStatus {
    pub fn healthy(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            state: HealthState::Healthy,
            detail: None,
        }
    }

    pub fn unavailable(service: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            state: HealthState::Unavailable,
            detail: Some(detail.into()),
        }
    }
}

/// Connection lifecycle of an I/O collaborator. Callers own the lifetime:
/// `connect` before use, `close` when done.
#[async_trait]
pub trait Service: Send + Sync {
    fn name(&self) -> &str;
    async fn connect(&self) -> Result<()>;
    async fn close(&self) -> Result<()>;
    async fn test_connection(&self) -> Result<bool>;

    async fn health_check(&self) -> HealthStatus {
        match self.test_connection().await {
            Ok(true) => HealthStatus::healthy(self.name()),
            Ok(false) => HealthStatus::unavailable(self.name(), "connection test failed"),
            Err(e) => HealthStatus::unavailable(self.name(), e.to_string()),
        }
    }
}

/// What a text-generation collaborator is told about a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationContext {
    pub zone_id: String,
    pub conditions: EnvironmentalReading,
    pub metrics: ComfortMetrics,
    pub preferences: UserComfortPreference,
    pub outdoor: Option<EnvironmentalReading>,
    pub energy_constraint: Option<f64>,
}

/// Produces raw candidate recommendations (typically an LLM). The comfort
/// engine validates these; it never invents its own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecommendationSource: Send + Sync {
    async fn candidates(&self, context: &RecommendationContext) -> Result<Vec<CandidateRecommendation>>;
}
