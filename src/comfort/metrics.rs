use serde::{Deserialize, Serialize};

/// Comfort assessment of one environmental reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComfortMetrics {
    /// Predicted Mean Vote (-3 .. +3)
    pub pmv: f64,
    /// Predicted Percentage Dissatisfied (%)
    pub ppd: f64,
    /// CO2 level the index was derived from (ppm)
    pub co2_level: f64,
    /// CO2-based air quality index (0-100)
    pub air_quality: f64,
    /// Distance to the optimal temperature band (°C)
    pub temperature_deviation: f64,
    /// Distance to the optimal humidity band (%)
    pub humidity_deviation: f64,
}
