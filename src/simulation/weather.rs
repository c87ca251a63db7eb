use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset};

use super::{HvacLoadProfile, SimulatedConnection};
use crate::domain::EnvironmentalReading;
use crate::forecast::{WeatherPoint, WeatherProvider};
use crate::services::Service;

/// Synthetic weather service following the profile's outdoor curve.
pub struct SyntheticWeather {
    profile: HvacLoadProfile,
    start: DateTime<FixedOffset>,
    humidity_percent: f64,
    connection: SimulatedConnection,
}

impl SyntheticWeather {
    pub fn new(profile: HvacLoadProfile, start: DateTime<FixedOffset>) -> Self {
        Self {
            profile,
            start,
            humidity_percent: 55.0,
            connection: SimulatedConnection::default(),
        }
    }

    pub fn with_humidity(mut self, humidity_percent: f64) -> Self {
        self.humidity_percent = humidity_percent;
        self
    }
}

#[async_trait]
impl WeatherProvider for SyntheticWeather {
    async fn current(&self, _location: &str) -> Result<EnvironmentalReading> {
        Ok(EnvironmentalReading::new(
            self.profile.outdoor_temp_c(self.start),
            self.humidity_percent,
            420.0,
            1.5,
        ))
    }

    async fn forecast(&self, _location: &str, hours: usize) -> Result<Vec<WeatherPoint>> {
        Ok((0..hours)
            .map(|h| {
                let timestamp = self.start + Duration::hours(h as i64);
                WeatherPoint {
                    timestamp,
                    temperature_c: self.profile.outdoor_temp_c(timestamp),
                    humidity_percent: self.humidity_percent,
                }
            })
            .collect())
    }
}

#[async_trait]
impl Service for SyntheticWeather {
    fn name(&self) -> &str {
        "synthetic-weather"
    }

    async fn connect(&self) -> Result<()> {
        self.connection.connect();
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.connection.close();
        Ok(())
    }

    async fn test_connection(&self) -> Result<bool> {
        Ok(self.connection.is_connected())
    }
}
