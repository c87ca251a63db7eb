use serde::{Deserialize, Serialize};

use super::cost::{cost_breakdown, CostBreakdown};
use crate::domain::{EnergySeriesPoint, TimeOfUseRateTable};
use crate::utils::percentile;

/// Outside temperature below which each degree-hour adds heating load (°C).
pub const HEATING_BASE_C: f64 = 18.0;
/// Outside temperature above which each degree-hour adds cooling load (°C).
pub const COOLING_BASE_C: f64 = 24.0;
/// kWh per heating degree-hour.
pub const HEATING_KWH_PER_DEGREE_HOUR: f64 = 0.5;
/// kWh per cooling degree-hour.
pub const COOLING_KWH_PER_DEGREE_HOUR: f64 = 0.7;
/// Weather-independent consumption over the analysed window (kWh).
pub const BASELINE_CONSUMPTION_KWH: f64 = 100.0;
/// Grid emission factor (kg CO2 per kWh).
pub const CARBON_KG_PER_KWH: f64 = 0.4;
/// Percentile of the power samples reported as base load.
pub const BASE_LOAD_PERCENTILE: f64 = 10.0;

/// Consumption, demand, cost and emissions of one metering window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyMetrics {
    /// kWh
    pub total_consumption: f64,
    /// kW
    pub peak_demand: f64,
    /// kW
    pub base_load: f64,
    /// Degree-hour model estimate (kWh)
    pub expected_consumption: f64,
    /// Actual over expected consumption; above 1 means worse than the model
    pub efficiency_ratio: f64,
    /// Blended $/kWh including demand charges
    pub cost_per_kwh: f64,
    pub demand_charges: f64,
    pub total_cost: f64,
    /// kg CO2
    pub carbon_footprint: f64,
    pub costs: CostBreakdown,
}

/// Heating/cooling degree-hour estimate of the consumption of `points`.
pub fn expected_consumption(points: &[EnergySeriesPoint]) -> f64 {
    let (heating, cooling) = points.iter().fold((0.0, 0.0), |(h, c), p| {
        (
            h + (HEATING_BASE_C - p.outside_temp_c).max(0.0),
            c + (p.outside_temp_c - COOLING_BASE_C).max(0.0),
        )
    });
    heating * HEATING_KWH_PER_DEGREE_HOUR
        + cooling * COOLING_KWH_PER_DEGREE_HOUR
        + BASELINE_CONSUMPTION_KWH
}

/// Metrics of a non-empty series; `None` when there is nothing to analyse.
pub fn summarize(points: &[EnergySeriesPoint], rates: &TimeOfUseRateTable) -> Option<EnergyMetrics> {
    if points.is_empty() {
        return None;
    }
    let power: Vec<f64> = points.iter().map(|p| p.active_power_kw).collect();
    let total_consumption: f64 = points.iter().map(|p| p.energy_kwh).sum();
    let peak_demand = power.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let base_load = percentile(&power, BASE_LOAD_PERCENTILE)?;

    let expected = expected_consumption(points);
    let efficiency_ratio = if expected > 0.0 {
        total_consumption / expected
    } else {
        0.0
    };

    let costs = cost_breakdown(points, rates);
    let cost_per_kwh = if total_consumption > 0.0 {
        costs.total_cost / total_consumption
    } else {
        0.0
    };

    Some(EnergyMetrics {
        total_consumption,
        peak_demand,
        base_load,
        expected_consumption: expected,
        efficiency_ratio,
        cost_per_kwh,
        demand_charges: costs.demand_charges,
        total_cost: costs.total_cost,
        carbon_footprint: total_consumption * CARBON_KG_PER_KWH,
        costs,
    })
}
