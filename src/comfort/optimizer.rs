use chrono::Local;
use std::sync::Arc;
use tracing::{info, warn};

use super::{ComfortEngine, ComfortOptimization};
use crate::domain::{ConditionsInput, EnvironmentalReading, OptimizationRecord};
use crate::error::OptimizationResult;
use crate::forecast::WeatherProvider;
use crate::repo::{HistoricalStore, PreferenceStore};
use crate::services::{RecommendationContext, RecommendationSource};

/// Comfort optimization for a zone: fetch preferences and candidates,
/// validate them, persist the outcome.
pub struct ComfortOptimizer {
    pub engine: Arc<ComfortEngine>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub recommendations: Arc<dyn RecommendationSource>,
    pub weather: Arc<dyn WeatherProvider>,
    pub store: Arc<dyn HistoricalStore>,
}

impl ComfortOptimizer {
    pub async fn optimize_comfort(
        &self,
        zone_id: &str,
        user_id: &str,
        conditions: ConditionsInput,
        energy_constraint: Option<f64>,
    ) -> OptimizationResult<ComfortOptimization> {
        let reading = EnvironmentalReading::try_from(conditions)?;
        let metrics = self.engine.metrics_for(&reading)?;

        let preferences = self
            .preferences
            .preferences(user_id, zone_id)
            .await?
            .unwrap_or_default();

        // Outdoor context only enriches the prompt.
        let outdoor = match self.weather.current(zone_id).await {
            Ok(w) => Some(w),
            Err(e) => {
                warn!(zone_id, error = %e, "weather unavailable, continuing without outdoor context");
                None
            }
        };

        let context = RecommendationContext {
            zone_id: zone_id.to_string(),
            conditions: reading,
            metrics,
            preferences: preferences.clone(),
            outdoor,
            energy_constraint,
        };
        let candidates = self.recommendations.candidates(&context).await?;

        let result =
            self.engine
                .optimize_comfort(&reading, &preferences, candidates, energy_constraint)?;

        info!(
            zone_id,
            user_id,
            comfort_score = result.comfort_score,
            validated = result.recommendations.len(),
            expected_improvement = result.expected_improvement,
            "comfort optimization complete"
        );

        let record = OptimizationRecord::Comfort {
            zone_id: zone_id.to_string(),
            user_id: user_id.to_string(),
            recorded_at: Local::now().fixed_offset(),
            comfort_score: result.comfort_score,
            metrics: result.metrics,
            recommendations: result.recommendations.clone(),
        };
        if let Err(e) = self.store.save(record).await {
            warn!(zone_id, error = %e, "failed to store comfort optimization result");
        }

        Ok(result)
    }
}
