use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::comfort::ComfortEngine;
use crate::config::OptimizerConfig;
use crate::domain::EnvironmentalReading;
use crate::error::OptimizationResult;

/// Per-hour operating load limits (kW).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleBounds {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl ScheduleBounds {
    pub fn uniform(hours: usize, min_load_kw: f64, max_load_kw: f64) -> Self {
        Self {
            lower: vec![min_load_kw; hours],
            upper: vec![max_load_kw; hours],
        }
    }

    pub fn len(&self) -> usize {
        self.lower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }

    pub fn project(&self, schedule: &[f64]) -> Vec<f64> {
        schedule
            .iter()
            .enumerate()
            .map(|(i, x)| x.clamp(self.lower[i], self.upper[i]))
            .collect()
    }

    pub fn contains(&self, schedule: &[f64]) -> bool {
        schedule.len() == self.len()
            && schedule
                .iter()
                .enumerate()
                .all(|(i, x)| *x >= self.lower[i] && *x <= self.upper[i])
    }

    /// Raise lower bounds so that the indoor temperature each hour's load can
    /// hold keeps the comfort score at or above `min_comfort_score`.
    ///
    /// At load fraction `f` of the operating range the zone settles at
    /// `outside + (setpoint - outside) * f`. Hours without an outdoor
    /// temperature keep their bounds. Returns the number of hours tightened.
    pub fn tighten_for_comfort(
        &mut self,
        comfort: &ComfortEngine,
        outdoor_temps_c: &[f64],
        cfg: &OptimizerConfig,
    ) -> OptimizationResult<usize> {
        let mut tightened = 0;
        for (i, outside) in outdoor_temps_c.iter().take(self.len()).enumerate() {
            let (lo, hi) = (self.lower[i], self.upper[i]);
            let fraction = match minimum_comfortable_fraction(comfort, *outside, cfg)? {
                Some(f) => f,
                None => {
                    warn!(
                        hour = i,
                        outside_temp_c = outside,
                        min_comfort_score = cfg.min_comfort_score,
                        "comfort target unreachable, pinning load to maximum"
                    );
                    1.0
                }
            };
            let floor = lo + (hi - lo) * fraction;
            if floor > lo {
                self.lower[i] = floor;
                tightened += 1;
            }
        }
        Ok(tightened)
    }
}

pub fn implied_indoor_temperature(outside_c: f64, setpoint_c: f64, load_fraction: f64) -> f64 {
    outside_c + (setpoint_c - outside_c) * load_fraction.clamp(0.0, 1.0)
}

/// Smallest load fraction, in 1 % steps, whose implied indoor temperature
/// scores at least the configured minimum.
fn minimum_comfortable_fraction(
    comfort: &ComfortEngine,
    outside_c: f64,
    cfg: &OptimizerConfig,
) -> OptimizationResult<Option<f64>> {
    for step in 0..=100 {
        let fraction = step as f64 / 100.0;
        let reading = EnvironmentalReading::new(
            implied_indoor_temperature(outside_c, cfg.target_setpoint_c, fraction),
            cfg.nominal_humidity_percent,
            cfg.nominal_co2_ppm,
            cfg.nominal_air_speed_ms,
        );
        if comfort.score_reading(&reading)? >= cfg.min_comfort_score {
            return Ok(Some(fraction));
        }
    }
    Ok(None)
}
