use ordered_float::OrderedFloat;
use std::cmp::Reverse;

use crate::config::SubsystemTarget;
use crate::domain::{OptimizationRecommendation, Priority, RecommendationDetail, TimeOfUseRateTable};
use crate::optimizer::ScheduleProblem;
use crate::utils::percentile;

/// Hours per year, for annualising savings.
const HOURS_PER_YEAR: f64 = 8760.0;
/// Predicted loads above this percentile count as peaks.
const PEAK_SHIFT_PERCENTILE: f64 = 75.0;

/// Reductions below this are not worth a recommendation (kW).
const MIN_SHIFT_KW: f64 = 1e-6;

/// Peak hours the optimal schedule reduced, each paired with the cheaper
/// slots best placed to absorb the reduction.
///
/// An absorbing slot has a strictly lower rate than the source; among those
/// the lowest rate wins, then the most headroom left under the upper bound,
/// then the nearest slot. Headroom is consumed as shifts are placed, so a
/// reduction may be split across several slots and whatever no cheaper slot
/// can hold is left out. Hours are schedule offsets.
pub fn peak_shift_recommendations(
    problem: &ScheduleProblem,
    optimal: &[f64],
) -> Vec<OptimizationRecommendation> {
    let Some(threshold) = percentile(&problem.predicted, PEAK_SHIFT_PERCENTILE) else {
        return Vec::new();
    };

    let mut headroom: Vec<f64> = optimal
        .iter()
        .zip(&problem.bounds.upper)
        .map(|(kw, upper)| (upper - kw).max(0.0))
        .collect();

    let mut out = Vec::new();
    for (from, (&predicted, &scheduled)) in problem.predicted.iter().zip(optimal).enumerate() {
        if predicted <= threshold || scheduled >= predicted {
            continue;
        }
        let rate_from = problem.rate(from);
        let mut remaining = predicted - scheduled;

        while remaining > MIN_SHIFT_KW {
            let target = (0..optimal.len())
                .filter(|&j| problem.rate(j) < rate_from && headroom[j] > MIN_SHIFT_KW)
                .min_by_key(|&j| {
                    (
                        OrderedFloat(problem.rate(j)),
                        Reverse(OrderedFloat(headroom[j])),
                        from.abs_diff(j),
                    )
                });
            let Some(to) = target else {
                break;
            };

            let placed = remaining.min(headroom[to]);
            headroom[to] -= placed;
            remaining -= placed;
            out.push(OptimizationRecommendation::new(
                RecommendationDetail::PeakShift {
                    from_hour: from,
                    to_hour: to,
                    load_reduction_kw: placed,
                },
                placed * (rate_from - problem.rate(to)),
                Priority::Medium,
            ));
        }
    }
    out
}

/// Annual $ saved by raising a subsystem from `baseline` to `target` efficiency.
pub fn annual_efficiency_saving(
    baseline: f64,
    target: f64,
    mean_load_kw: f64,
    rates: &TimeOfUseRateTable,
) -> f64 {
    if target <= 0.0 || baseline >= target {
        return 0.0;
    }
    mean_load_kw * HOURS_PER_YEAR * rates.mean_hourly_rate() * (target - baseline) / target
}

/// One recommendation per subsystem running below its target efficiency.
pub fn efficiency_recommendations(
    subsystems: &[SubsystemTarget],
    mean_load_kw: f64,
    rates: &TimeOfUseRateTable,
) -> Vec<OptimizationRecommendation> {
    subsystems
        .iter()
        .filter(|s| s.baseline_efficiency < s.target_efficiency)
        .map(|s| {
            let saving = annual_efficiency_saving(
                s.baseline_efficiency,
                s.target_efficiency,
                mean_load_kw,
                rates,
            );
            let payback_years = if saving > 0.0 {
                s.improvement_cost / saving
            } else {
                f64::INFINITY
            };
            let kwh_saved = mean_load_kw * HOURS_PER_YEAR
                * (s.target_efficiency - s.baseline_efficiency)
                / s.target_efficiency;

            OptimizationRecommendation::new(
                RecommendationDetail::EfficiencyImprovement {
                    system: s.name.clone(),
                    current_efficiency: s.baseline_efficiency,
                    target_efficiency: s.target_efficiency,
                    improvement_cost: s.improvement_cost,
                    payback_years,
                },
                saving,
                Priority::from_payback_years(payback_years),
            )
            .with_cost(s.improvement_cost)
            .with_energy_impact(-kwh_saved)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecommendationKind;
    use crate::optimizer::ScheduleBounds;
    use chrono::{FixedOffset, TimeZone};

    fn problem(predicted: Vec<f64>) -> ScheduleProblem {
        let n = predicted.len();
        ScheduleProblem {
            start: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 6, 3, 0, 0, 0)
                .unwrap(),
            predicted,
            bounds: ScheduleBounds::uniform(n, 10.0, 150.0),
            rates: TimeOfUseRateTable::default(),
            preserve_energy: true,
        }
    }

    fn subsystem(name: &str, baseline: f64, target: f64, cost: f64) -> SubsystemTarget {
        SubsystemTarget {
            name: name.into(),
            baseline_efficiency: baseline,
            target_efficiency: target,
            improvement_cost: cost,
        }
    }

    #[test]
    fn test_peak_hour_shifts_to_cheapest_slot_with_most_headroom() {
        let mut predicted = vec![40.0; 24];
        predicted[15] = 120.0;
        predicted[16] = 110.0;
        let p = problem(predicted);

        let mut optimal = vec![40.0; 24];
        optimal[15] = 60.0;
        optimal[16] = 110.0; // not reduced
        optimal[2] = 30.0; // most off-peak headroom

        let recs = peak_shift_recommendations(&p, &optimal);
        assert_eq!(recs.len(), 1);
        let rec = &recs[0];
        assert_eq!(rec.kind, RecommendationKind::PeakShift);
        assert_eq!(
            rec.detail,
            RecommendationDetail::PeakShift {
                from_hour: 15,
                to_hour: 2,
                load_reduction_kw: 60.0
            }
        );
        assert!((rec.savings - 60.0 * (0.25 - 0.08)).abs() < 1e-9);
    }

    #[test]
    fn test_ties_go_to_nearest_slot() {
        let mut predicted = vec![40.0; 24];
        predicted[9] = 100.0;
        let p = problem(predicted);
        let mut optimal = vec![40.0; 24];
        optimal[9] = 70.0;

        let recs = peak_shift_recommendations(&p, &optimal);
        match &recs[0].detail {
            RecommendationDetail::PeakShift { to_hour, .. } => assert_eq!(*to_hour, 7),
            other => panic!("unexpected {:?}", other),
        }
    }

    fn placed_per_slot(recs: &[OptimizationRecommendation], slots: usize) -> Vec<f64> {
        let mut placed = vec![0.0; slots];
        for rec in recs {
            if let RecommendationDetail::PeakShift {
                to_hour,
                load_reduction_kw,
                ..
            } = &rec.detail
            {
                placed[*to_hour] += load_reduction_kw;
            }
        }
        placed
    }

    #[test]
    fn test_shifts_never_overfill_a_slot() {
        // Flat schedule near the upper bound: every off-peak slot has 37.5 kW spare.
        let mut predicted = vec![100.0; 24];
        for kw in &mut predicted[14..=19] {
            *kw = 150.0;
        }
        let p = problem(predicted);
        let optimal = vec![112.5; 24];

        let recs = peak_shift_recommendations(&p, &optimal);
        let placed = placed_per_slot(&recs, 24);
        for (j, kw) in placed.iter().enumerate() {
            assert!(*kw <= 150.0 - optimal[j] + 1e-9, "slot {} holds {} kW", j, kw);
        }

        // 6 h x 37.5 kW of reduction fits into the off-peak slots in full.
        let total: f64 = placed.iter().sum();
        assert!((total - 225.0).abs() < 1e-9);
        let savings: f64 = recs.iter().map(|r| r.savings).sum();
        assert!((savings - 225.0 * (0.25 - 0.08)).abs() < 1e-9);
        assert!(placed.iter().filter(|kw| **kw > 0.0).count() > 1);
    }

    #[test]
    fn test_reduction_beyond_cheaper_headroom_is_left_out() {
        let mut predicted = vec![40.0; 24];
        predicted[15] = 150.0;
        let p = problem(predicted);
        // Only slot 23 has spare capacity below the peak rate.
        let mut optimal = vec![150.0; 24];
        optimal[15] = 50.0;
        optimal[23] = 140.0;

        let recs = peak_shift_recommendations(&p, &optimal);
        assert_eq!(recs.len(), 1);
        assert_eq!(
            recs[0].detail,
            RecommendationDetail::PeakShift {
                from_hour: 15,
                to_hour: 23,
                load_reduction_kw: 10.0
            }
        );
        assert!((recs[0].savings - 10.0 * (0.25 - 0.08)).abs() < 1e-9);
    }

    #[test]
    fn test_off_peak_hours_have_nowhere_cheaper() {
        let mut predicted = vec![40.0; 24];
        predicted[3] = 100.0;
        let p = problem(predicted);
        let mut optimal = vec![40.0; 24];
        optimal[3] = 50.0;
        assert!(peak_shift_recommendations(&p, &optimal).is_empty());
    }

    #[test]
    fn test_efficiency_priority_follows_payback() {
        let rates = TimeOfUseRateTable::default();
        let subsystems = vec![
            subsystem("compressor", 0.78, 0.85, 5000.0),
            subsystem("boiler", 0.90, 0.90, 1000.0),
            subsystem("pumps", 0.70, 0.72, 40000.0),
        ];
        let recs = efficiency_recommendations(&subsystems, 60.0, &rates);
        assert_eq!(recs.len(), 2);

        let compressor = &recs[0];
        let expected = 60.0 * 8760.0 * rates.mean_hourly_rate() * 0.07 / 0.85;
        assert!((compressor.savings - expected).abs() < 1e-6);
        assert_eq!(compressor.priority, Priority::High);
        assert_eq!(compressor.cost, 5000.0);
        assert!(compressor.energy_impact < 0.0);

        // 40000 / (60*8760*0.14875*0.02/0.72) ~ 18 years
        assert_eq!(recs[1].priority, Priority::Low);
    }

    #[test]
    fn test_zero_load_gives_infinite_payback() {
        let recs = efficiency_recommendations(
            &[subsystem("fans", 0.72, 0.80, 3000.0)],
            0.0,
            &TimeOfUseRateTable::default(),
        );
        match &recs[0].detail {
            RecommendationDetail::EfficiencyImprovement { payback_years, .. } => {
                assert!(payback_years.is_infinite())
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(recs[0].priority, Priority::Low);
    }
}
