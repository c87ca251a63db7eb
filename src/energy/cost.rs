use serde::{Deserialize, Serialize};

use crate::domain::{EnergySeriesPoint, RateBand, TimeOfUseRateTable};

/// Time-of-use cost of a load profile, split by tariff band ($).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub peak_cost: f64,
    pub mid_peak_cost: f64,
    pub off_peak_cost: f64,
    /// Peak demand times the demand rate
    pub demand_charges: f64,
    pub total_cost: f64,
}

impl CostBreakdown {
    pub fn energy_cost(&self) -> f64 {
        self.peak_cost + self.mid_peak_cost + self.off_peak_cost
    }
}

/// Cost of `(hour_of_day, energy_kwh, power_kw)` samples.
pub fn hourly_cost_breakdown<I>(samples: I, rates: &TimeOfUseRateTable) -> CostBreakdown
where
    I: IntoIterator<Item = (u32, f64, f64)>,
{
    let mut out = CostBreakdown::default();
    let mut peak_demand: f64 = 0.0;

    for (hour, energy_kwh, power_kw) in samples {
        let band = RateBand::for_hour(hour);
        let cost = energy_kwh * rates.rate(band);
        match band {
            RateBand::Peak => out.peak_cost += cost,
            RateBand::MidPeak => out.mid_peak_cost += cost,
            RateBand::OffPeak => out.off_peak_cost += cost,
        }
        peak_demand = peak_demand.max(power_kw);
    }

    out.demand_charges = peak_demand * rates.demand_charge;
    out.total_cost = out.energy_cost() + out.demand_charges;
    out
}

/// Band costs from metered consumption, demand charge from the highest power sample.
pub fn cost_breakdown(points: &[EnergySeriesPoint], rates: &TimeOfUseRateTable) -> CostBreakdown {
    hourly_cost_breakdown(
        points
            .iter()
            .map(|p| (p.hour(), p.energy_kwh, p.active_power_kw)),
        rates,
    )
}
