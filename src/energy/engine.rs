use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::analysis::{summarize, EnergyMetrics};
use super::cost::{hourly_cost_breakdown, CostBreakdown};
use super::peak::{historical_threshold, shedding_plan, AlertLevel, PeakLoadAssessment};
use super::recommendations::{efficiency_recommendations, peak_shift_recommendations};
use crate::comfort::ComfortEngine;
use crate::config::{Config, EfficiencyConfig, OptimizerConfig, PeakConfig, StrategyKind};
use crate::domain::{window, EnergySeriesPoint, OptimizationRecommendation, TimeOfUseRateTable};
use crate::error::{OptimizationError, OptimizationResult};
use crate::optimizer::{
    GreedyScheduler, LpScheduler, OptimalSchedule, ScheduleBounds, ScheduleProblem,
    ScheduleStrategy,
};
use crate::utils::mean;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyConfig {
    pub rates: TimeOfUseRateTable,
    pub optimizer: OptimizerConfig,
    pub peak: PeakConfig,
    pub efficiency: EfficiencyConfig,
}

impl From<&Config> for EnergyConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            rates: cfg.rates,
            optimizer: cfg.optimizer.clone(),
            peak: cfg.peak.clone(),
            efficiency: cfg.efficiency.clone(),
        }
    }
}

/// Inputs of one schedule optimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Start of the first forecast hour
    pub start: DateTime<FixedOffset>,
    /// Predicted load per hour (kW)
    pub predicted_load_kw: Vec<f64>,
    /// Outdoor temperature forecast per hour (°C); only used with the comfort constraint
    pub outdoor_temps_c: Vec<f64>,
    pub comfort_constraint: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyCostOptimization {
    pub optimal_schedule: OptimalSchedule,
    pub predicted_cost: CostBreakdown,
    pub optimal_cost: CostBreakdown,
    /// Cost of the prediction minus cost of the optimal schedule ($)
    pub projected_savings: f64,
    pub recommendations: Vec<OptimizationRecommendation>,
}

/// Energy analytics and schedule optimization. Stateless apart from its
/// configuration; share it behind an `Arc`.
#[derive(Clone)]
pub struct EnergyEngine {
    config: EnergyConfig,
    comfort: ComfortEngine,
    strategy: Arc<dyn ScheduleStrategy>,
}

fn strategy_for(optimizer: &OptimizerConfig) -> Arc<dyn ScheduleStrategy> {
    match optimizer.strategy {
        StrategyKind::Lp if cfg!(feature = "optimization") => {
            Arc::new(LpScheduler::new(optimizer.max_forecast_hours))
        }
        StrategyKind::Lp => {
            warn!("LP strategy requested without the 'optimization' feature, using greedy");
            Arc::new(GreedyScheduler)
        }
        StrategyKind::Greedy => Arc::new(GreedyScheduler),
    }
}

impl Default for EnergyEngine {
    fn default() -> Self {
        Self::new(EnergyConfig::default(), ComfortEngine::default())
    }
}

impl EnergyEngine {
    pub fn new(config: EnergyConfig, comfort: ComfortEngine) -> Self {
        let strategy = strategy_for(&config.optimizer);
        Self {
            config,
            comfort,
            strategy,
        }
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn ScheduleStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn config(&self) -> &EnergyConfig {
        &self.config
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Metrics of the points of `series` inside `[start, end]`.
    pub fn analyze_energy_consumption(
        &self,
        series: &[EnergySeriesPoint],
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> OptimizationResult<EnergyMetrics> {
        let points = window(series, start, end);
        let metrics = summarize(&points, &self.config.rates).ok_or_else(|| {
            OptimizationError::NoHistoricalData(format!("{} to {}", start, end))
        })?;
        let totals = [
            metrics.total_consumption,
            metrics.peak_demand,
            metrics.base_load,
            metrics.total_cost,
        ];
        if totals.iter().any(|v| !v.is_finite()) {
            return Err(OptimizationError::energy_with(
                "series contains non-finite power or consumption readings",
                metrics,
            ));
        }

        debug!(
            points = points.len(),
            total_kwh = metrics.total_consumption,
            peak_kw = metrics.peak_demand,
            total_cost = metrics.total_cost,
            "energy consumption analysed"
        );
        Ok(metrics)
    }

    /// Cheapest hourly schedule for the predicted load within the operating
    /// bounds, plus the recommendations derived from it.
    pub fn optimize_schedule(
        &self,
        request: ScheduleRequest,
    ) -> OptimizationResult<EnergyCostOptimization> {
        let cfg = &self.config.optimizer;
        let hours = request.predicted_load_kw.len();
        if hours == 0 || hours > cfg.max_forecast_hours {
            return Err(OptimizationError::energy(format!(
                "forecast horizon must be 1..={} hours, got {}",
                cfg.max_forecast_hours, hours
            )));
        }
        if request
            .predicted_load_kw
            .iter()
            .any(|kw| !kw.is_finite() || *kw < 0.0)
        {
            return Err(OptimizationError::energy(
                "predicted load must be finite and non-negative",
            ));
        }
        if cfg.min_load_kw > cfg.max_load_kw {
            return Err(OptimizationError::energy(format!(
                "min load {} kW exceeds max load {} kW",
                cfg.min_load_kw, cfg.max_load_kw
            )));
        }

        let mut bounds = ScheduleBounds::uniform(hours, cfg.min_load_kw, cfg.max_load_kw);
        if request.comfort_constraint {
            if request.outdoor_temps_c.len() < hours {
                return Err(OptimizationError::energy(format!(
                    "comfort constraint needs {} outdoor temperatures, got {}",
                    hours,
                    request.outdoor_temps_c.len()
                )));
            }
            let tightened = bounds.tighten_for_comfort(&self.comfort, &request.outdoor_temps_c, cfg)?;
            debug!(tightened, "comfort constraint applied to schedule bounds");
        }

        let problem = ScheduleProblem {
            start: request.start,
            predicted: request.predicted_load_kw,
            bounds,
            rates: self.config.rates,
            preserve_energy: cfg.preserve_energy,
        };

        let raw = self.strategy.solve(&problem)?;
        if raw.len() != hours || raw.iter().any(|kw| !kw.is_finite()) {
            return Err(OptimizationError::Solver(format!(
                "{} returned an invalid schedule",
                self.strategy.name()
            )));
        }
        // Absorb solver round-off at the bounds.
        let optimal = problem.bounds.project(&raw);

        let predicted_cost = self.schedule_cost(&problem, &problem.predicted);
        let optimal_cost = self.schedule_cost(&problem, &optimal);
        let projected_savings = predicted_cost.total_cost - optimal_cost.total_cost;

        let mut recommendations = peak_shift_recommendations(&problem, &optimal);
        let mean_load = mean(&problem.predicted).unwrap_or(0.0);
        recommendations.extend(efficiency_recommendations(
            &self.config.efficiency.subsystems,
            mean_load,
            &self.config.rates,
        ));

        info!(
            strategy = self.strategy.name(),
            hours,
            predicted_cost = predicted_cost.total_cost,
            optimal_cost = optimal_cost.total_cost,
            projected_savings,
            recommendations = recommendations.len(),
            "schedule optimized"
        );

        Ok(EnergyCostOptimization {
            optimal_schedule: OptimalSchedule {
                start: problem.start,
                hourly_load_kw: optimal,
                expected_cost: optimal_cost.total_cost,
                strategy: self.strategy.name().to_string(),
            },
            predicted_cost,
            optimal_cost,
            projected_savings,
            recommendations,
        })
    }

    fn schedule_cost(&self, problem: &ScheduleProblem, schedule: &[f64]) -> CostBreakdown {
        hourly_cost_breakdown(
            schedule
                .iter()
                .enumerate()
                .map(|(i, kw)| (problem.hour_of_day(i), *kw, *kw)),
            &problem.rates,
        )
    }

    /// Compare `current_load_kw` with the alert level and plan load shedding
    /// when it is exceeded. Without an explicit threshold, one is derived
    /// from the daily peaks of `history`.
    pub fn manage_peak_load(
        &self,
        system_id: &str,
        current_load_kw: f64,
        threshold_kw: Option<f64>,
        history: &[EnergySeriesPoint],
    ) -> OptimizationResult<PeakLoadAssessment> {
        let cfg = &self.config.peak;
        if !current_load_kw.is_finite() || current_load_kw < 0.0 {
            return Err(OptimizationError::energy(format!(
                "current load must be finite and non-negative, got {}",
                current_load_kw
            )));
        }
        if let Some(limit_kw) = cfg.hard_limit_kw {
            if current_load_kw > limit_kw {
                return Err(OptimizationError::PeakLoad {
                    current_load_kw,
                    limit_kw,
                });
            }
        }

        let threshold_kw = match threshold_kw {
            Some(t) if !t.is_finite() || t <= 0.0 => {
                return Err(OptimizationError::energy(format!(
                    "peak threshold must be finite and positive, got {}",
                    t
                )));
            }
            Some(t) => t,
            None => historical_threshold(history, cfg.threshold_percentile)
                .ok_or_else(|| OptimizationError::NoHistoricalData(system_id.to_string()))?,
        };
        let alert_load_kw = cfg.alert_fraction * threshold_kw;

        let (alert_level, required_reduction_kw, recommendations) =
            if current_load_kw > alert_load_kw {
                let required = current_load_kw - alert_load_kw;
                let plan = shedding_plan(&cfg.sheddable_loads, required, self.config.rates.demand_charge);
                (AlertLevel::High, required, plan)
            } else {
                (AlertLevel::Normal, 0.0, Vec::new())
            };

        if alert_level == AlertLevel::High {
            warn!(
                system_id,
                current_load_kw,
                threshold_kw,
                required_reduction_kw,
                "peak load alert"
            );
        } else {
            debug!(system_id, current_load_kw, threshold_kw, "peak load normal");
        }

        Ok(PeakLoadAssessment {
            system_id: system_id.to_string(),
            alert_level,
            current_load_kw,
            threshold_kw,
            alert_load_kw,
            required_reduction_kw,
            recommendations,
        })
    }
}
