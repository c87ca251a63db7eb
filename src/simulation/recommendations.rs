use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use super::SimulatedConnection;
use crate::domain::CandidateRecommendation;
use crate::services::{RecommendationContext, RecommendationSource, Service};

/// Returns the same scripted candidates for every zone. Stands in for a
/// text-generation service in demos and tests.
pub struct ScriptedRecommendations {
    candidates: Vec<CandidateRecommendation>,
    connection: SimulatedConnection,
}

impl ScriptedRecommendations {
    pub fn new(candidates: Vec<CandidateRecommendation>) -> Self {
        Self {
            candidates,
            connection: SimulatedConnection::default(),
        }
    }
}

fn candidate(
    title: &str,
    action: &str,
    energy_impact: f64,
    temperature_delta: Option<f64>,
    humidity_delta: Option<f64>,
    co2_delta: Option<f64>,
) -> CandidateRecommendation {
    CandidateRecommendation {
        title: title.to_string(),
        action: action.to_string(),
        energy_impact,
        temperature_delta,
        humidity_delta,
        co2_delta,
    }
}

impl Default for ScriptedRecommendations {
    fn default() -> Self {
        Self::new(vec![
            candidate(
                "Lower cooling setpoint",
                "Reduce the zone cooling setpoint by 1.5 C",
                6.0,
                Some(-1.5),
                None,
                None,
            ),
            candidate(
                "Increase ventilation",
                "Raise outdoor air damper position to 40 %",
                3.5,
                None,
                None,
                Some(-250.0),
            ),
            candidate(
                "Dehumidify",
                "Enable reheat dehumidification until 50 % RH",
                8.0,
                None,
                Some(-8.0),
                None,
            ),
            candidate(
                "Raise setpoint",
                "Raise the zone cooling setpoint by 2 C",
                -5.0,
                Some(2.0),
                None,
                None,
            ),
        ])
    }
}

#[async_trait]
impl RecommendationSource for ScriptedRecommendations {
    async fn candidates(&self, context: &RecommendationContext) -> Result<Vec<CandidateRecommendation>> {
        debug!(
            zone_id = %context.zone_id,
            count = self.candidates.len(),
            "scripted recommendations returned"
        );
        Ok(self.candidates.clone())
    }
}

#[async_trait]
impl Service for ScriptedRecommendations {
    fn name(&self) -> &str {
        "scripted-recommendations"
    }

    async fn connect(&self) -> Result<()> {
        self.connection.connect();
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.connection.close();
        Ok(())
    }

    async fn test_connection(&self) -> Result<bool> {
        Ok(self.connection.is_connected())
    }
}
