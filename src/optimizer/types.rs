use chrono::{DateTime, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};

use super::ScheduleBounds;
use crate::domain::TimeOfUseRateTable;
use crate::error::OptimizationResult;

/// Hourly load schedule to be chosen by a [`ScheduleStrategy`].
#[derive(Debug, Clone)]
pub struct ScheduleProblem {
    /// Start of the first hour
    pub start: DateTime<FixedOffset>,
    /// Predicted load per hour (kW); also the initial guess
    pub predicted: Vec<f64>,
    pub bounds: ScheduleBounds,
    pub rates: TimeOfUseRateTable,
    pub preserve_energy: bool,
}

impl ScheduleProblem {
    pub fn len(&self) -> usize {
        self.predicted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicted.is_empty()
    }

    /// Hour of day of schedule slot `i`.
    pub fn hour_of_day(&self, i: usize) -> u32 {
        ((self.start.hour() as usize + i) % 24) as u32
    }

    pub fn rate(&self, i: usize) -> f64 {
        self.rates.rate_at_hour(self.hour_of_day(i))
    }

    /// Energy plus demand cost of running `schedule` (kW per one-hour slot).
    pub fn cost(&self, schedule: &[f64]) -> f64 {
        let energy: f64 = schedule
            .iter()
            .enumerate()
            .map(|(i, kw)| kw * self.rate(i))
            .sum();
        let peak = schedule.iter().copied().fold(0.0, f64::max);
        energy + peak * self.rates.demand_charge
    }

    /// The prediction projected onto the bounds.
    pub fn initial_guess(&self) -> Vec<f64> {
        self.bounds.project(&self.predicted)
    }

    /// Total energy the schedule must deliver when energy is preserved.
    pub fn energy_target(&self) -> Option<f64> {
        self.preserve_energy
            .then(|| self.initial_guess().iter().sum())
    }
}

/// A solved schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalSchedule {
    pub start: DateTime<FixedOffset>,
    pub hourly_load_kw: Vec<f64>,
    pub expected_cost: f64,
    pub strategy: String,
}

pub trait ScheduleStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Load per slot, each within the problem bounds.
    fn solve(&self, problem: &ScheduleProblem) -> OptimizationResult<Vec<f64>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn problem_at(hour: u32, predicted: Vec<f64>) -> ScheduleProblem {
        let n = predicted.len();
        ScheduleProblem {
            start: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 6, 3, hour, 0, 0)
                .unwrap(),
            predicted,
            bounds: ScheduleBounds::uniform(n, 0.0, 200.0),
            rates: TimeOfUseRateTable::default(),
            preserve_energy: true,
        }
    }

    #[test]
    fn test_hour_of_day_wraps() {
        let p = problem_at(22, vec![1.0; 4]);
        assert_eq!(p.hour_of_day(0), 22);
        assert_eq!(p.hour_of_day(2), 0);
        assert_eq!(p.rate(0), 0.15);
        assert_eq!(p.rate(3), 0.08);
    }

    #[test]
    fn test_cost_matches_rate_table_scenario() {
        let p = problem_at(0, vec![100.0; 24]);
        let cost = p.cost(&p.predicted);
        assert!((cost - 1857.0).abs() < 1e-9, "cost = {}", cost);
    }

    #[test]
    fn test_energy_target_uses_projected_prediction() {
        let mut p = problem_at(0, vec![250.0, 50.0]);
        assert_eq!(p.energy_target(), Some(250.0));
        p.preserve_energy = false;
        assert_eq!(p.energy_target(), None);
    }
}
