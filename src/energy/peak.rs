use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::config::SheddableLoad;
use crate::domain::{EnergySeriesPoint, OptimizationRecommendation, Priority, RecommendationDetail};
use crate::utils::percentile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AlertLevel {
    Normal,
    High,
}

/// Outcome of checking a live load against the demand threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakLoadAssessment {
    pub system_id: String,
    pub alert_level: AlertLevel,
    pub current_load_kw: f64,
    pub threshold_kw: f64,
    /// Load at which the alert is raised
    pub alert_load_kw: f64,
    /// Load to shed to get back under the alert level
    pub required_reduction_kw: f64,
    pub recommendations: Vec<OptimizationRecommendation>,
}

/// Highest power sample of each calendar day, in date order.
pub fn daily_peaks(series: &[EnergySeriesPoint]) -> Vec<f64> {
    series
        .iter()
        .into_group_map_by(|p| p.timestamp.date_naive())
        .into_iter()
        .sorted_by_key(|(day, _)| *day)
        .map(|(_, points)| {
            points
                .iter()
                .map(|p| p.active_power_kw)
                .fold(f64::NEG_INFINITY, f64::max)
        })
        .collect()
}

/// Percentile of the daily peaks of `history`, `None` without history.
pub fn historical_threshold(history: &[EnergySeriesPoint], percentile_q: f64) -> Option<f64> {
    percentile(&daily_peaks(history), percentile_q)
}

/// Load-reduction strategies covering `required_kw`.
///
/// Each load sheds up to `required_kw`; the avoided demand charge is its
/// saving. Ranked by saving, then by the smaller comfort penalty. The loads
/// needed to cover the reduction in that order are high priority.
pub fn shedding_plan(
    loads: &[SheddableLoad],
    required_kw: f64,
    demand_charge: f64,
) -> Vec<OptimizationRecommendation> {
    let mut covered = 0.0;
    loads
        .iter()
        .map(|l| (l, l.max_shed_kw.min(required_kw).max(0.0)))
        .filter(|(_, shed)| *shed > 0.0)
        .sorted_by(|(a, shed_a), (b, shed_b)| {
            shed_b
                .total_cmp(shed_a)
                .then(a.comfort_penalty.total_cmp(&b.comfort_penalty))
        })
        .map(|(load, shed)| {
            let priority = if covered < required_kw {
                Priority::High
            } else {
                Priority::Low
            };
            covered += shed;
            OptimizationRecommendation::new(
                RecommendationDetail::LoadReduction {
                    load: load.name.clone(),
                    shed_kw: shed,
                    comfort_penalty: load.comfort_penalty,
                },
                shed * demand_charge,
                priority,
            )
            .with_energy_impact(-shed)
        })
        .collect()
}
