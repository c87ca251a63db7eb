use chrono::{DateTime, Duration, DurationRound, FixedOffset, Local};
use std::sync::Arc;
use tracing::{info, warn};

use super::engine::{EnergyCostOptimization, EnergyEngine, ScheduleRequest};
use super::{EnergyMetrics, PeakLoadAssessment};
use crate::domain::OptimizationRecord;
use crate::error::{OptimizationError, OptimizationResult};
use crate::forecast::{LoadForecaster, WeatherProvider};
use crate::repo::HistoricalStore;

/// Energy optimization for one HVAC system: fetch forecasts and history,
/// run the engine, persist the outcome.
pub struct EnergyOptimizer {
    pub engine: Arc<EnergyEngine>,
    pub forecaster: Arc<dyn LoadForecaster>,
    pub weather: Arc<dyn WeatherProvider>,
    pub store: Arc<dyn HistoricalStore>,
}

fn current_hour() -> DateTime<FixedOffset> {
    let now = Local::now().fixed_offset();
    now.duration_trunc(Duration::hours(1)).unwrap_or(now)
}

impl EnergyOptimizer {
    pub async fn analyze_energy_consumption(
        &self,
        system_id: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> OptimizationResult<EnergyMetrics> {
        let series = self.store.get_series(system_id, start, end).await?;
        let metrics = self
            .engine
            .analyze_energy_consumption(&series, start, end)
            .map_err(|e| match e {
                OptimizationError::NoHistoricalData(_) => {
                    OptimizationError::NoHistoricalData(system_id.to_string())
                }
                other => other,
            })?;

        info!(
            system_id,
            total_kwh = metrics.total_consumption,
            total_cost = metrics.total_cost,
            efficiency_ratio = metrics.efficiency_ratio,
            "energy analysis complete"
        );

        let record = OptimizationRecord::EnergyAnalysis {
            system_id: system_id.to_string(),
            recorded_at: Local::now().fixed_offset(),
            metrics,
        };
        if let Err(e) = self.store.save(record).await {
            warn!(system_id, error = %e, "failed to store energy analysis");
        }
        Ok(metrics)
    }

    /// Optimize the next `forecast_hours` starting at the current hour.
    pub async fn optimize_energy_cost(
        &self,
        system_id: &str,
        forecast_hours: usize,
        comfort_constraint: bool,
    ) -> OptimizationResult<EnergyCostOptimization> {
        self.optimize_energy_cost_from(system_id, current_hour(), forecast_hours, comfort_constraint)
            .await
    }

    pub async fn optimize_energy_cost_from(
        &self,
        system_id: &str,
        start: DateTime<FixedOffset>,
        forecast_hours: usize,
        comfort_constraint: bool,
    ) -> OptimizationResult<EnergyCostOptimization> {
        let max_hours = self.engine.config().optimizer.max_forecast_hours;
        if forecast_hours == 0 || forecast_hours > max_hours {
            return Err(OptimizationError::energy(format!(
                "forecast horizon must be 1..={} hours, got {}",
                max_hours, forecast_hours
            )));
        }

        let (predicted, weather) = futures::try_join!(
            self.forecaster.predict_load(system_id, forecast_hours),
            self.weather.forecast(system_id, forecast_hours),
        )?;
        if predicted.len() != forecast_hours {
            return Err(OptimizationError::energy(format!(
                "forecaster returned {} values for {} hours",
                predicted.len(),
                forecast_hours
            )));
        }
        if comfort_constraint && weather.len() != forecast_hours {
            return Err(OptimizationError::energy(format!(
                "weather provider returned {} points for {} hours",
                weather.len(),
                forecast_hours
            )));
        }

        let result = self.engine.optimize_schedule(ScheduleRequest {
            start,
            predicted_load_kw: predicted,
            outdoor_temps_c: weather.iter().map(|w| w.temperature_c).collect(),
            comfort_constraint,
        })?;

        info!(
            system_id,
            forecast_hours,
            comfort_constraint,
            projected_savings = result.projected_savings,
            recommendations = result.recommendations.len(),
            "energy cost optimization complete"
        );

        let record = OptimizationRecord::Schedule {
            system_id: system_id.to_string(),
            recorded_at: Local::now().fixed_offset(),
            projected_savings: result.projected_savings,
            recommendations: result.recommendations.clone(),
        };
        if let Err(e) = self.store.save(record).await {
            warn!(system_id, error = %e, "failed to store optimization result");
        }

        Ok(result)
    }

    pub async fn manage_peak_load(
        &self,
        system_id: &str,
        current_load_kw: f64,
        threshold_kw: Option<f64>,
    ) -> OptimizationResult<PeakLoadAssessment> {
        self.manage_peak_load_at(system_id, current_load_kw, threshold_kw, Local::now().fixed_offset())
            .await
    }

    /// Peak check as of `now`; history is only fetched when no threshold is given.
    pub async fn manage_peak_load_at(
        &self,
        system_id: &str,
        current_load_kw: f64,
        threshold_kw: Option<f64>,
        now: DateTime<FixedOffset>,
    ) -> OptimizationResult<PeakLoadAssessment> {
        let history = match threshold_kw {
            Some(_) => Vec::new(),
            None => {
                let days = self.engine.config().peak.history_days;
                self.store
                    .get_series(system_id, now - Duration::days(days), now)
                    .await?
            }
        };
        self.engine
            .manage_peak_load(system_id, current_load_kw, threshold_kw, &history)
    }
}
