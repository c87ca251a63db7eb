//! Diurnal HVAC load and outdoor temperature model.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, Timelike};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

use super::SimulatedConnection;
use crate::domain::EnergySeriesPoint;
use crate::forecast::LoadForecaster;
use crate::services::Service;

/// Shape of a synthetic HVAC system's day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HvacLoadProfile {
    /// Night-time load (kW)
    pub base_load_kw: f64,
    /// Extra load at the daily peak (kW)
    pub daily_swing_kw: f64,
    /// Hour of day with the highest load
    pub peak_hour: f64,
    /// Additional kW per °C of outdoor temperature above 24 °C
    pub cooling_kw_per_degree: f64,
    /// Noise standard deviation (kW)
    pub noise_std_dev_kw: f64,
    pub outdoor_mean_c: f64,
    /// Half the day/night outdoor temperature difference (°C)
    pub outdoor_swing_c: f64,
    /// Hour of day with the warmest outdoor temperature
    pub warmest_hour: f64,
    /// Random seed for reproducibility (None = random)
    pub random_seed: Option<u64>,
}

impl Default for HvacLoadProfile {
    fn default() -> Self {
        Self {
            base_load_kw: 35.0,
            daily_swing_kw: 65.0,
            peak_hour: 16.0,
            cooling_kw_per_degree: 2.5,
            noise_std_dev_kw: 3.0,
            outdoor_mean_c: 25.0,
            outdoor_swing_c: 6.0,
            warmest_hour: 15.0,
            random_seed: None,
        }
    }
}

impl HvacLoadProfile {
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub(crate) fn rng(&self) -> StdRng {
        match self.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub(crate) fn noise(&self) -> Result<Normal<f64>> {
        Ok(Normal::new(0.0, self.noise_std_dev_kw)?)
    }

    /// Fractional hour of day of `time`.
    fn hour_of_day(time: DateTime<FixedOffset>) -> f64 {
        time.hour() as f64 + time.minute() as f64 / 60.0
    }

    /// 1 at `peak`, 0 twelve hours away.
    fn diurnal(hour: f64, peak: f64) -> f64 {
        (1.0 + (2.0 * PI * (hour - peak) / 24.0).cos()) / 2.0
    }

    pub fn outdoor_temp_c(&self, time: DateTime<FixedOffset>) -> f64 {
        let shape = Self::diurnal(Self::hour_of_day(time), self.warmest_hour);
        self.outdoor_mean_c + self.outdoor_swing_c * (2.0 * shape - 1.0)
    }

    /// Noise-free load at `time` (kW).
    pub fn expected_load_kw(&self, time: DateTime<FixedOffset>) -> f64 {
        let occupancy = Self::diurnal(Self::hour_of_day(time), self.peak_hour);
        let cooling = (self.outdoor_temp_c(time) - 24.0).max(0.0) * self.cooling_kw_per_degree;
        self.base_load_kw + self.daily_swing_kw * occupancy + cooling
    }

    fn sample_load_kw<R: rand::Rng>(
        &self,
        time: DateTime<FixedOffset>,
        noise: &Normal<f64>,
        rng: &mut R,
    ) -> f64 {
        (self.expected_load_kw(time) + noise.sample(rng)).max(0.0)
    }
}

/// `days` of hourly metering ending just before `end`.
pub fn synthetic_history(
    profile: &HvacLoadProfile,
    end: DateTime<FixedOffset>,
    days: i64,
) -> Result<Vec<EnergySeriesPoint>> {
    let mut rng = profile.rng();
    let noise = profile.noise()?;
    let start = end - Duration::days(days);

    Ok((0..days * 24)
        .map(|h| {
            let timestamp = start + Duration::hours(h);
            let kw = profile.sample_load_kw(timestamp, &noise, &mut rng);
            EnergySeriesPoint {
                timestamp,
                active_power_kw: kw,
                energy_kwh: kw,
                outside_temp_c: profile.outdoor_temp_c(timestamp),
            }
        })
        .collect())
}

/// Synthetic load forecaster: the profile plus seeded noise, starting at a
/// fixed hour.
pub struct SyntheticLoadForecaster {
    profile: HvacLoadProfile,
    start: DateTime<FixedOffset>,
    rng: Mutex<StdRng>,
    connection: SimulatedConnection,
}

impl SyntheticLoadForecaster {
    pub fn new(profile: HvacLoadProfile, start: DateTime<FixedOffset>) -> Self {
        let rng = Mutex::new(profile.rng());
        Self {
            profile,
            start,
            rng,
            connection: SimulatedConnection::default(),
        }
    }
}

#[async_trait]
impl LoadForecaster for SyntheticLoadForecaster {
    async fn predict_load(&self, system_id: &str, hours: usize) -> Result<Vec<f64>> {
        let noise = self.profile.noise()?;
        let mut rng = self.rng.lock();
        let loads: Vec<f64> = (0..hours)
            .map(|h| {
                let time = self.start + Duration::hours(h as i64);
                self.profile.sample_load_kw(time, &noise, &mut *rng)
            })
            .collect();
        debug!(system_id, hours, "synthetic load forecast generated");
        Ok(loads)
    }
}

#[async_trait]
impl Service for SyntheticLoadForecaster {
    fn name(&self) -> &str {
        "synthetic-load-forecaster"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::HealthState;
    use chrono::TimeZone;

    fn midnight() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 7, 1, 0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_profile_peaks_in_the_afternoon() {
        let p = HvacLoadProfile::default();
        let at = |h| p.expected_load_kw(midnight() + Duration::hours(h));
        assert!(at(16) > at(10));
        assert!(at(16) > at(4));
        assert!((p.outdoor_temp_c(midnight() + Duration::hours(15)) - 31.0).abs() < 1e-9);
        assert!((p.outdoor_temp_c(midnight() + Duration::hours(3)) - 19.0).abs() < 1e-9);
    }

    #[test]
    fn test_history_is_seeded_and_hourly() {
        let p = HvacLoadProfile::default().with_random_seed(11);
        let a = synthetic_history(&p, midnight(), 2).unwrap();
        let b = synthetic_history(&p, midnight(), 2).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 48);
        assert_eq!(a[0].timestamp, midnight() - Duration::days(2));
        assert!(a.iter().all(|pt| pt.active_power_kw >= 0.0));
    }

    #[test]
    fn test_invalid_noise_is_an_error() {
        let p = HvacLoadProfile {
            noise_std_dev_kw: f64::NAN,
            ..HvacLoadProfile::default()
        };
        assert!(synthetic_history(&p, midnight(), 1).is_err());
    }

    #[tokio::test]
    async fn test_forecaster_lifecycle_and_output() {
        let f = SyntheticLoadForecaster::new(HvacLoadProfile::default().with_random_seed(3), midnight());
        assert_eq!(f.health_check().await.state, HealthState::Unavailable);
        f.connect().await.unwrap();
        assert_eq!(f.health_check().await.state, HealthState::Healthy);

        let loads = f.predict_load("ahu-1", 24).await.unwrap();
        assert_eq!(loads.len(), 24);
        assert!(loads[16] > loads[4]);
    }
}
