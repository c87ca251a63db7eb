use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sensitivity {
    Low,
    Medium,
    High,
}

/// Comfort preferences of one user in one zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserComfortPreference {
    pub preferred_temperature: f64,
    pub preferred_humidity: f64,
    pub temperature_tolerance: f64,
    pub humidity_tolerance: f64,
    pub air_quality_sensitivity: Sensitivity,
    pub energy_saving_priority: Sensitivity,
}

impl Default for UserComfortPreference {
    fn default() -> Self {
        Self {
            preferred_temperature: 22.0,
            preferred_humidity: 50.0,
            temperature_tolerance: 2.0,
            humidity_tolerance: 10.0,
            air_quality_sensitivity: Sensitivity::Medium,
            energy_saving_priority: Sensitivity::Medium,
        }
    }
}

impl UserComfortPreference {
    /// A value is acceptable when it is within tolerance of the preference,
    /// or at least no further from it than `current`.
    pub fn accepts_temperature(&self, current: f64, proposed: f64) -> bool {
        accepts(self.preferred_temperature, self.temperature_tolerance, current, proposed)
    }

    pub fn accepts_humidity(&self, current: f64, proposed: f64) -> bool {
        accepts(self.preferred_humidity, self.humidity_tolerance, current, proposed)
    }
}

fn accepts(preferred: f64, tolerance: f64, current: f64, proposed: f64) -> bool {
    let before = (current - preferred).abs();
    let after = (proposed - preferred).abs();
    after <= before || after <= tolerance
}
