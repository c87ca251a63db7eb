use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::OptimizationError;

/// Snapshot of the indoor environment of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct EnvironmentalReading {
    /// Air temperature (°C)
    pub temperature_c: f64,
    /// Relative humidity (%)
    #[validate(range(min = 0.0, max = 100.0))]
    pub humidity_percent: f64,
    /// CO2 concentration (ppm)
    #[validate(range(min = 0.0))]
    pub co2_ppm: f64,
    /// Air speed (m/s)
    #[validate(range(min = 0.0))]
    pub air_speed_ms: f64,
    /// Mean radiant temperature (°C), air temperature when absent
    pub mean_radiant_temp_c: Option<f64>,
}

impl EnvironmentalReading {
    pub fn new(temperature_c: f64, humidity_percent: f64, co2_ppm: f64, air_speed_ms: f64) -> Self {
        Self {
            temperature_c,
            humidity_percent,
            co2_ppm,
            air_speed_ms,
            mean_radiant_temp_c: None,
        }
    }

    pub fn with_mean_radiant_temp(mut self, mrt_c: f64) -> Self {
        self.mean_radiant_temp_c = Some(mrt_c);
        self
    }

    pub fn mean_radiant_temp(&self) -> f64 {
        self.mean_radiant_temp_c.unwrap_or(self.temperature_c)
    }

    /// Range checks plus finiteness, which `validator` does not cover.
    pub fn check(&self) -> Result<(), OptimizationError> {
        let finite = [
            ("temperature", self.temperature_c),
            ("humidity", self.humidity_percent),
            ("co2_level", self.co2_ppm),
            ("air_speed", self.air_speed_ms),
            ("mean_radiant_temp", self.mean_radiant_temp()),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(OptimizationError::comfort(format!(
                "invalid reading: {} is not a finite number",
                name
            )));
        }
        self.validate()?;
        Ok(())
    }
}

/// Zone conditions as delivered by an API payload or sensor gateway,
/// where any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionsInput {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub co2_level: Option<f64>,
    pub air_speed: Option<f64>,
    pub mean_radiant_temp: Option<f64>,
}

impl From<EnvironmentalReading> for ConditionsInput {
    fn from(r: EnvironmentalReading) -> Self {
        Self {
            temperature: Some(r.temperature_c),
            humidity: Some(r.humidity_percent),
            co2_level: Some(r.co2_ppm),
            air_speed: Some(r.air_speed_ms),
            mean_radiant_temp: r.mean_radiant_temp_c,
        }
    }
}

impl TryFrom<ConditionsInput> for EnvironmentalReading {
    type Error = OptimizationError;

    fn try_from(input: ConditionsInput) -> Result<Self, Self::Error> {
        let missing: Vec<&str> = [
            ("temperature", input.temperature),
            ("humidity", input.humidity),
            ("co2_level", input.co2_level),
            ("air_speed", input.air_speed),
        ]
        .iter()
        .filter(|(_, v)| v.is_none())
        .map(|(name, _)| *name)
        .collect();

        match (input.temperature, input.humidity, input.co2_level, input.air_speed) {
            (Some(t), Some(h), Some(c), Some(a)) => Ok(Self {
                temperature_c: t,
                humidity_percent: h,
                co2_ppm: c,
                air_speed_ms: a,
                mean_radiant_temp_c: input.mean_radiant_temp,
            }),
            _ => Err(OptimizationError::comfort(format!(
                "missing required fields: {}",
                missing.join(", ")
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_radiant_defaults_to_air_temperature() {
        let r = EnvironmentalReading::new(21.0, 45.0, 500.0, 0.1);
        assert_eq!(r.mean_radiant_temp(), 21.0);
        assert_eq!(r.with_mean_radiant_temp(19.0).mean_radiant_temp(), 19.0);
    }

    #[test]
    fn test_missing_fields_are_listed() {
        let input = ConditionsInput {
            temperature: Some(22.0),
            humidity: None,
            co2_level: Some(600.0),
            air_speed: None,
            mean_radiant_temp: None,
        };
        let err = EnvironmentalReading::try_from(input).unwrap_err();
        assert!(err.is_comfort());
        assert_eq!(
            err.to_string(),
            "Comfort optimization failed: missing required fields: humidity, air_speed"
        );
    }

    #[test]
    fn test_complete_input_converts() {
        let reading = EnvironmentalReading::new(22.0, 50.0, 600.0, 0.2);
        let back = EnvironmentalReading::try_from(ConditionsInput::from(reading)).unwrap();
        assert_eq!(back, reading);
    }

    #[test]
    fn test_check_rejects_negative_air_speed_and_nan() {
        assert!(EnvironmentalReading::new(22.0, 50.0, 600.0, -0.1).check().is_err());
        assert!(EnvironmentalReading::new(f64::NAN, 50.0, 600.0, 0.1).check().is_err());
        assert!(EnvironmentalReading::new(22.0, 50.0, -1.0, 0.1).check().is_err());
        assert!(EnvironmentalReading::new(22.0, 50.0, 600.0, 0.0).check().is_ok());
    }
}
