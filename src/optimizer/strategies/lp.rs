//! Exact schedule optimization as a linear program.
//!
//! The time-of-use cost of a schedule is linear in the hourly loads and the
//! demand charge is linear in the peak, so the bounded minimisation is an LP:
//!
//! ```text
//! minimise   Σ rate_h · x_h + demand · peak
//! subject to x_h - peak <= 0                  for every hour h
//!            lower_h <= x_h <= upper_h
//!            Σ x_h = energy target            (when energy is preserved)
//! ```

#[cfg(feature = "optimization")]
use minilp::{ComparisonOp, OptimizationDirection, Problem, Variable};
use tracing::{debug, warn};

use crate::config::OptimizerConfig;
use crate::error::{OptimizationError, OptimizationResult};
use crate::optimizer::{ScheduleProblem, ScheduleStrategy};

#[derive(Debug, Clone, Copy)]
pub struct LpScheduler {
    /// Longer problems are rejected before reaching the solver
    max_periods: usize,
}

impl Default for LpScheduler {
    fn default() -> Self {
        Self::new(OptimizerConfig::default().max_forecast_hours)
    }
}

impl LpScheduler {
    pub fn new(max_periods: usize) -> Self {
        Self { max_periods }
    }

    pub fn max_periods(&self) -> usize {
        self.max_periods
    }

    #[cfg(feature = "optimization")]
    fn solve_lp(&self, problem: &ScheduleProblem) -> OptimizationResult<Vec<f64>> {
        let n = problem.len();
        let bounds = &problem.bounds;

        let mut lp = Problem::new(OptimizationDirection::Minimize);
        let peak = lp.add_var(problem.rates.demand_charge, (0.0, f64::INFINITY));
        let loads: Vec<Variable> = (0..n)
            .map(|h| lp.add_var(problem.rate(h), (bounds.lower[h], bounds.upper[h])))
            .collect();

        for &x in &loads {
            lp.add_constraint(&[(x, 1.0), (peak, -1.0)], ComparisonOp::Le, 0.0);
        }

        if let Some(target) = problem.energy_target() {
            let total: Vec<(Variable, f64)> = loads.iter().map(|&x| (x, 1.0)).collect();
            lp.add_constraint(total.as_slice(), ComparisonOp::Eq, target);
        }

        let solution = lp
            .solve()
            .map_err(|e| OptimizationError::Solver(format!("linear program: {}", e)))?;
        debug!(
            periods = n,
            objective = solution.objective(),
            "linear program solved"
        );

        Ok(loads.iter().map(|&x| solution[x]).collect())
    }

    #[cfg(not(feature = "optimization"))]
    fn solve_lp(&self, _problem: &ScheduleProblem) -> OptimizationResult<Vec<f64>> {
        Err(OptimizationError::Solver(
            "LP scheduling requires the 'optimization' feature".to_string(),
        ))
    }
}

impl ScheduleStrategy for LpScheduler {
    fn name(&self) -> &'static str {
        "lp"
    }

    fn solve(&self, problem: &ScheduleProblem) -> OptimizationResult<Vec<f64>> {
        if problem.is_empty() {
            return Err(OptimizationError::Solver("empty schedule".to_string()));
        }
        if problem.len() > self.max_periods {
            warn!(periods = problem.len(), "schedule horizon too long for LP");
            return Err(OptimizationError::Solver(format!(
                "{} periods exceeds the {} period limit",
                problem.len(),
                self.max_periods
            )));
        }
        self.solve_lp(problem)
    }
}

#[cfg(all(test, feature = "optimization"))]
mod tests {
    use super::*;
    use crate::domain::TimeOfUseRateTable;
    use crate::optimizer::{GreedyScheduler, ScheduleBounds};
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

    /// Office-like profile peaking in the afternoon.
    fn daytime_profile() -> Vec<f64> {
        (0..24)
            .map(|h| match h {
                0..=6 => 30.0,
                7..=12 => 70.0,
                13..=19 => 110.0,
                _ => 45.0,
            })
            .collect()
    }

    #[test]
    fn test_lp_never_costs_more_than_prediction() {
        let p = problem(daytime_profile(), 20.0, 130.0);
        let s = LpScheduler::default().solve(&p).unwrap();
        assert!(p.cost(&s) <= p.cost(&p.predicted) + 1e-6);
        assert!(p.cost(&s) < p.cost(&p.predicted) - 100.0);
    }

    #[test]
    fn test_lp_preserves_energy_within_bounds() {
        let p = problem(daytime_profile(), 20.0, 130.0);
        let s = LpScheduler::default().solve(&p).unwrap();
        let target: f64 = p.predicted.iter().sum();
        assert!((s.iter().sum::<f64>() - target).abs() < 1e-4);
        for (i, x) in s.iter().enumerate() {
            assert!(*x >= p.bounds.lower[i] - 1e-6 && *x <= p.bounds.upper[i] + 1e-6);
        }
    }

    #[test]
    fn test_lp_beats_greedy_when_demand_charge_dominates() {
        let p = problem(vec![50.0; 24], 10.0, 120.0);
        let lp = LpScheduler::default().solve(&p).unwrap();
        let greedy = GreedyScheduler.solve(&p).unwrap();
        assert!(p.cost(&lp) <= p.cost(&greedy) + 1e-6);
        // A flat profile is already optimal under a $15/kW demand charge.
        assert!((p.cost(&lp) - p.cost(&p.predicted)).abs() < 1e-6);
    }

    #[test]
    fn test_lp_without_energy_target_runs_at_minimum() {
        let mut p = problem(daytime_profile(), 25.0, 130.0);
        p.preserve_energy = false;
        let s = LpScheduler::default().solve(&p).unwrap();
        assert!(s.iter().all(|x| (x - 25.0).abs() < 1e-6));
    }

    #[test]
    fn test_lp_rejects_oversized_horizon() {
        let scheduler = LpScheduler::default();
        assert_eq!(scheduler.max_periods(), 168);
        let p = problem(vec![40.0; 169], 10.0, 100.0);
        assert!(matches!(
            scheduler.solve(&p),
            Err(OptimizationError::Solver(_))
        ));
    }

    #[test]
    fn test_lp_period_limit_is_configurable() {
        let scheduler = LpScheduler::new(12);
        assert!(scheduler.solve(&problem(vec![40.0; 12], 10.0, 100.0)).is_ok());
        let err = scheduler
            .solve(&problem(vec![40.0; 13], 10.0, 100.0))
            .unwrap_err();
        assert!(err.to_string().contains("13 periods exceeds the 12 period limit"));
    }
}
