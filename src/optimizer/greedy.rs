use itertools::Itertools;
use ordered_float::OrderedFloat;

use super::{ScheduleProblem, ScheduleStrategy};
use crate::error::{OptimizationError, OptimizationResult};

/// Baseline strategy: start every hour at its lower bound, then pour the
/// remaining energy into the cheapest tariff band first, levelling the load
/// inside a band so no single hour spikes. Ignores the demand charge when
/// choosing between bands, which is what the LP strategy improves on.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyScheduler;

impl GreedyScheduler {
    /// Raise `slots` towards a common level until `energy` is used up.
    fn level_fill(schedule: &mut [f64], upper: &[f64], slots: &[usize], energy: f64) {
        let added = |level: f64, schedule: &[f64]| -> f64 {
            slots
                .iter()
                .map(|&i| level.clamp(schedule[i], upper[i]) - schedule[i])
                .sum()
        };

        let mut lo = slots.iter().map(|&i| schedule[i]).fold(f64::INFINITY, f64::min);
        let mut hi = slots.iter().map(|&i| upper[i]).fold(f64::NEG_INFINITY, f64::max);
        for _ in 0..100 {
            let mid = (lo + hi) / 2.0;
            if added(mid, &*schedule) < energy {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        for &i in slots {
            schedule[i] = hi.clamp(schedule[i], upper[i]);
        }
    }
}

impl ScheduleStrategy for GreedyScheduler {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn solve(&self, problem: &ScheduleProblem) -> OptimizationResult<Vec<f64>> {
        if problem.is_empty() {
            return Err(OptimizationError::Solver("empty schedule".to_string()));
        }
        let bounds = &problem.bounds;
        let mut schedule = bounds.lower.clone();

        let Some(target) = problem.energy_target() else {
            // With non-negative rates the lower bound is optimal.
            return Ok(schedule);
        };
        let mut remaining = target - schedule.iter().sum::<f64>();

        let bands = (0..problem.len())
            .into_group_map_by(|&i| OrderedFloat(problem.rate(i)))
            .into_iter()
            .sorted_by_key(|(rate, _)| *rate);

        for (_, slots) in bands {
            if remaining <= 1e-9 {
                break;
            }
            let capacity: f64 = slots.iter().map(|&i| bounds.upper[i] - schedule[i]).sum();
            if capacity <= remaining {
                for &i in &slots {
                    schedule[i] = bounds.upper[i];
                }
                remaining -= capacity;
            } else {
                Self::level_fill(&mut schedule, &bounds.upper, &slots, remaining);
                remaining = 0.0;
            }
        }
        Ok(schedule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimeOfUseRateTable;
    use crate::optimizer::ScheduleBounds;
    use chrono::{FixedOffset, TimeZone};

    fn problem(predicted: Vec<f64>, min: f64, max: f64) -> ScheduleProblem {
        let n = predicted.len();
        ScheduleProblem {
            start: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 6, 3, 0, 0, 0)
                .unwrap(),
            predicted,
            bounds: ScheduleBounds::uniform(n, min, max),
            rates: TimeOfUseRateTable::default(),
            preserve_energy: true,
        }
    }

    #[test]
    fn test_energy_preserved_and_bounds_respected() {
        let p = problem((0..24).map(|h| 40.0 + h as f64 * 2.0).collect(), 10.0, 90.0);
        let s = GreedyScheduler.solve(&p).unwrap();
        let target: f64 = p.predicted.iter().sum();
        assert!((s.iter().sum::<f64>() - target).abs() < 1e-6);
        assert!(p.bounds.contains(&s));
    }

    #[test]
    fn test_load_moves_to_off_peak() {
        let p = problem(vec![50.0; 24], 10.0, 120.0);
        let s = GreedyScheduler.solve(&p).unwrap();
        // Off-peak has capacity for all of it: 9 h * 110 kW headroom > 24 * 40 kW.
        for h in 14..=19 {
            assert!((s[h] - 10.0).abs() < 1e-6, "hour {} = {}", h, s[h]);
        }
        let off_peak = [0, 1, 2, 3, 4, 5, 6, 7, 23];
        let level = s[0];
        assert!(off_peak.iter().all(|&h| (s[h] - level).abs() < 1e-6));
        assert!((level - (10.0 + 960.0 / 9.0)).abs() < 1e-6);
    }

    #[test]
    fn test_without_energy_preservation_runs_at_minimum() {
        let mut p = problem(vec![60.0; 6], 15.0, 100.0);
        p.preserve_energy = false;
        assert_eq!(GreedyScheduler.solve(&p).unwrap(), vec![15.0; 6]);
    }
}
