use serde::{Deserialize, Serialize};
use tracing::debug;

use super::pmv::{predicted_mean_vote, predicted_percentage_dissatisfied, PmvInputs};
use super::ComfortMetrics;
use crate::config::ComfortConfig;
use crate::domain::{
    CandidateRecommendation, EnvironmentalReading, OptimizationRecommendation,
    UserComfortPreference,
};
use crate::error::{OptimizationError, OptimizationResult};

/// Outcome of validating candidate recommendations against a zone's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComfortOptimization {
    pub comfort_score: f64,
    pub metrics: ComfortMetrics,
    pub recommendations: Vec<OptimizationRecommendation>,
    /// Score after applying every validated recommendation, minus the current score
    pub expected_improvement: f64,
    /// Sum of the declared energy impact of validated recommendations (kWh)
    pub energy_impact: f64,
}

/// Pure comfort calculations. Holds only read-only configuration and can be
/// shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct ComfortEngine {
    config: ComfortConfig,
}

impl ComfortEngine {
    pub fn new(config: ComfortConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ComfortConfig {
        &self.config
    }

    pub fn calculate_comfort_metrics(
        &self,
        temperature: f64,
        humidity: f64,
        co2_level: f64,
        air_speed: f64,
        mean_radiant_temp: Option<f64>,
    ) -> OptimizationResult<ComfortMetrics> {
        let reading = EnvironmentalReading {
            temperature_c: temperature,
            humidity_percent: humidity,
            co2_ppm: co2_level,
            air_speed_ms: air_speed,
            mean_radiant_temp_c: mean_radiant_temp,
        };
        self.metrics_for(&reading)
    }

    pub fn metrics_for(&self, reading: &EnvironmentalReading) -> OptimizationResult<ComfortMetrics> {
        reading.check()?;

        let pmv = predicted_mean_vote(&PmvInputs {
            ta: reading.temperature_c,
            tr: reading.mean_radiant_temp(),
            rh: reading.humidity_percent,
            va: reading.air_speed_ms,
            met: self.config.metabolic_rate,
            clo: self.config.clothing_insulation,
        })?;

        Ok(ComfortMetrics {
            pmv,
            ppd: predicted_percentage_dissatisfied(pmv),
            co2_level: reading.co2_ppm,
            air_quality: self.air_quality_index(reading.co2_ppm),
            temperature_deviation: self.config.optimal_temperature.deviation(reading.temperature_c),
            humidity_deviation: self.config.optimal_humidity.deviation(reading.humidity_percent),
        })
    }

    /// 100 at or below the low CO2 bound, 0 at or above the high bound, linear between.
    pub fn air_quality_index(&self, co2_level: f64) -> f64 {
        let band = self.config.co2;
        if co2_level <= band.low {
            100.0
        } else if co2_level >= band.high {
            0.0
        } else {
            100.0 * (1.0 - (co2_level - band.low) / (band.high - band.low))
        }
    }

    /// Weighted 0-100 blend of the PMV, PPD and air quality sub-scores.
    pub fn calculate_comfort_score(&self, metrics: &ComfortMetrics) -> f64 {
        let w = self.config.weights;
        let pmv_score = 100.0 * (1.0 - metrics.pmv.abs() / 3.0).max(0.0);
        let ppd_score = 100.0 - metrics.ppd;
        let score = w.pmv * pmv_score + w.ppd * ppd_score + w.air_quality * metrics.air_quality;
        score.clamp(0.0, 100.0)
    }

    pub fn score_reading(&self, reading: &EnvironmentalReading) -> OptimizationResult<f64> {
        Ok(self.calculate_comfort_score(&self.metrics_for(reading)?))
    }

    /// Filter candidate recommendations and estimate the comfort gained by
    /// applying the survivors.
    pub fn optimize_comfort(
        &self,
        reading: &EnvironmentalReading,
        preferences: &UserComfortPreference,
        candidates: Vec<CandidateRecommendation>,
        energy_constraint: Option<f64>,
    ) -> OptimizationResult<ComfortOptimization> {
        let metrics = self.metrics_for(reading)?;
        let comfort_score = self.calculate_comfort_score(&metrics);

        let total = candidates.len();
        let accepted: Vec<CandidateRecommendation> = candidates
            .into_iter()
            .filter(|c| energy_constraint.map_or(true, |limit| c.energy_impact <= limit))
            .filter(|c| self.complies_with_preferences(c, reading, preferences))
            .collect();
        debug!(
            candidates = total,
            validated = accepted.len(),
            comfort_score,
            "validated comfort recommendations"
        );

        let simulated = simulate(reading, &accepted);
        let simulated_score = self.score_reading(&simulated).map_err(|e| match e {
            OptimizationError::Comfort { message, .. } => OptimizationError::comfort_with(
                format!("simulated conditions: {}", message),
                metrics,
            ),
            other => other,
        })?;
        let expected_improvement = simulated_score - comfort_score;
        let energy_impact = accepted.iter().map(|c| c.energy_impact).sum();

        Ok(ComfortOptimization {
            comfort_score,
            metrics,
            recommendations: accepted
                .into_iter()
                .map(CandidateRecommendation::into_recommendation)
                .collect(),
            expected_improvement,
            energy_impact,
        })
    }

    fn complies_with_preferences(
        &self,
        candidate: &CandidateRecommendation,
        reading: &EnvironmentalReading,
        preferences: &UserComfortPreference,
    ) -> bool {
        let temperature_ok = candidate.temperature_delta.map_or(true, |d| {
            preferences.accepts_temperature(reading.temperature_c, reading.temperature_c + d)
        });
        let humidity_ok = candidate.humidity_delta.map_or(true, |d| {
            preferences.accepts_humidity(reading.humidity_percent, reading.humidity_percent + d)
        });
        temperature_ok && humidity_ok
    }
}

/// Reading after all setpoint deltas of `applied` take effect.
fn simulate(
    reading: &EnvironmentalReading,
    applied: &[CandidateRecommendation],
) -> EnvironmentalReading {
    let sum = |f: fn(&CandidateRecommendation) -> Option<f64>| -> f64 {
        applied.iter().filter_map(f).sum()
    };
    let dt = sum(|c| c.temperature_delta);
    let dh = sum(|c| c.humidity_delta);
    let dc = sum(|c| c.co2_delta);

    EnvironmentalReading {
        temperature_c: reading.temperature_c + dt,
        humidity_percent: (reading.humidity_percent + dh).clamp(0.0, 100.0),
        co2_ppm: (reading.co2_ppm + dc).max(0.0),
        air_speed_ms: reading.air_speed_ms,
        // Surfaces follow the air temperature shift.
        mean_radiant_temp_c: reading.mean_radiant_temp_c.map(|t| t + dt),
    }
}
