use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use validator::Validate;

/// Hour-of-day tariff band.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RateBand {
    Peak,
    MidPeak,
    OffPeak,
}

impl RateBand {
    /// Peak 14:00-19:59, mid-peak 08:00-13:59 and 20:00-22:59, off-peak otherwise.
    pub fn for_hour(hour: u32) -> Self {
        match hour % 24 {
            14..=19 => RateBand::Peak,
            8..=13 | 20..=22 => RateBand::MidPeak,
            _ => RateBand::OffPeak,
        }
    }
}

/// Time-of-use electricity tariff.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct TimeOfUseRateTable {
    /// $/kWh during peak hours
    #[validate(range(min = 0.0))]
    pub peak_rate: f64,
    /// $/kWh during mid-peak hours
    #[validate(range(min = 0.0))]
    pub mid_peak_rate: f64,
    /// $/kWh during off-peak hours
    #[validate(range(min = 0.0))]
    pub off_peak_rate: f64,
    /// $/kW of peak demand
    #[validate(range(min = 0.0))]
    pub demand_charge: f64,
}

impl Default for TimeOfUseRateTable {
    fn default() -> Self {
        Self {
            peak_rate: 0.25,
            mid_peak_rate: 0.15,
            off_peak_rate: 0.08,
            demand_charge: 15.0,
        }
    }
}

impl TimeOfUseRateTable {
    pub fn rate(&self, band: RateBand) -> f64 {
        match band {
            RateBand::Peak => self.peak_rate,
            RateBand::MidPeak => self.mid_peak_rate,
            RateBand::OffPeak => self.off_peak_rate,
        }
    }

    pub fn rate_at_hour(&self, hour: u32) -> f64 {
        self.rate(RateBand::for_hour(hour))
    }

    /// Unweighted mean energy rate over the 24 hours of a day.
    pub fn mean_hourly_rate(&self) -> f64 {
        (0..24).map(|h| self.rate_at_hour(h)).sum::<f64>() / 24.0
    }
}
