use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::domain::EnvironmentalReading;

/// Hourly outdoor forecast point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherPoint {
    pub timestamp: DateTime<FixedOffset>,
    pub temperature_c: f64,
    pub humidity_percent: f64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, location: &str) -> Result<EnvironmentalReading>;

    /// `hours` consecutive hourly points starting at the current hour.
    async fn forecast(&self, location: &str, hours: usize) -> Result<Vec<WeatherPoint>>;
}
