use chrono::{DateTime, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};

/// One metering sample of an HVAC system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergySeriesPoint {
    pub timestamp: DateTime<FixedOffset>,
    /// Active power (kW)
    pub active_power_kw: f64,
    /// Energy consumed over the sample interval (kWh)
    pub energy_kwh: f64,
    /// Outside air temperature (°C)
    pub outside_temp_c: f64,
}

impl EnergySeriesPoint {
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }
}

/// Points of `series` with `start <= timestamp <= end`.
pub fn window(
    series: &[EnergySeriesPoint],
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
) -> Vec<EnergySeriesPoint> {
    series
        .iter()
        .filter(|p| p.timestamp >= start && p.timestamp <= end)
        .copied()
        .collect()
}
