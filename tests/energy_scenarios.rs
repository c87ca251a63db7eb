//! End-to-end energy scenarios against the in-memory store and the
//! synthetic collaborators.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use hvac_optimizer::config::{OptimizerConfig, StrategyKind};
use hvac_optimizer::domain::{EnergySeriesPoint, OptimizationRecord, RecommendationKind};
use hvac_optimizer::energy::{AlertLevel, EnergyConfig, ScheduleRequest};
use hvac_optimizer::optimizer::GreedyScheduler;
use hvac_optimizer::repo::InMemoryStore;
use hvac_optimizer::simulation::{
    synthetic_history, HvacLoadProfile, SyntheticLoadForecaster, SyntheticWeather,
};
use hvac_optimizer::{ComfortEngine, EnergyEngine, EnergyOptimizer, OptimizationError};
use proptest::prelude::*;

fn monday() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(-5 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 7, 8, 0, 0, 0)
        .unwrap()
}

fn flat_day(kw: f64) -> Vec<EnergySeriesPoint> {
    (0..24)
        .map(|h| EnergySeriesPoint {
            timestamp: monday() + Duration::hours(h),
            active_power_kw: kw,
            energy_kwh: kw,
            outside_temp_c: 21.0,
        })
        .collect()
}

fn optimizer(strategy: StrategyKind) -> (EnergyOptimizer, Arc<InMemoryStore>) {
    let profile = HvacLoadProfile::default().with_random_seed(5);
    let store = Arc::new(InMemoryStore::new());
    store.insert_series("ahu-1", synthetic_history(&profile, monday(), 30).unwrap());

    let mut config = EnergyConfig::default();
    config.optimizer.strategy = strategy;
    let optimizer = EnergyOptimizer {
        engine: Arc::new(EnergyEngine::new(config, ComfortEngine::default())),
        forecaster: Arc::new(SyntheticLoadForecaster::new(profile.clone(), monday())),
        weather: Arc::new(SyntheticWeather::new(profile, monday())),
        store: store.clone(),
    };
    (optimizer, store)
}

#[test]
fn empty_series_is_rejected() {
    let err = EnergyEngine::default()
        .analyze_energy_consumption(&[], monday(), monday() + Duration::days(1))
        .unwrap_err();
    assert!(matches!(err, OptimizationError::NoHistoricalData(_)));
}

#[test]
fn uniform_series_has_equal_base_peak_and_mean() {
    let series = flat_day(63.0);
    let m = EnergyEngine::default()
        .analyze_energy_consumption(&series, monday(), monday() + Duration::days(1))
        .unwrap();
    assert_eq!(m.base_load, m.peak_demand);
    assert!((m.peak_demand - m.total_consumption / 24.0).abs() < 1e-9);
}

#[test]
fn flat_day_costs_1857_to_the_cent() {
    let m = EnergyEngine::default()
        .analyze_energy_consumption(&flat_day(100.0), monday(), monday() + Duration::hours(23))
        .unwrap();
    assert_eq!(format!("{:.2}", m.total_cost), "1857.00");
    assert_eq!(format!("{:.2}", m.costs.peak_cost), "150.00");
    assert_eq!(format!("{:.2}", m.costs.mid_peak_cost), "135.00");
    assert_eq!(format!("{:.2}", m.costs.off_peak_cost), "72.00");
    assert_eq!(m.demand_charges, 1500.0);
    assert!((m.carbon_footprint - 960.0).abs() < 1e-9);
}

#[tokio::test]
async fn week_of_history_round_trip() {
    let (optimizer, store) = optimizer(StrategyKind::Greedy);
    let m = optimizer
        .analyze_energy_consumption("ahu-1", monday() - Duration::days(7), monday())
        .await
        .unwrap();
    assert!(m.total_consumption > 0.0);
    assert!(m.peak_demand >= m.base_load);
    assert!(matches!(
        store.records().as_slice(),
        [OptimizationRecord::EnergyAnalysis { .. }]
    ));
}

#[cfg(feature = "optimization")]
#[tokio::test]
async fn lp_cost_optimization_saves_money_and_persists() {
    let (optimizer, store) = optimizer(StrategyKind::Lp);
    let out = optimizer
        .optimize_energy_cost_from("ahu-1", monday(), 24, true)
        .await
        .unwrap();

    let cfg = OptimizerConfig::default();
    assert_eq!(out.optimal_schedule.strategy, "lp");
    assert!(out
        .optimal_schedule
        .hourly_load_kw
        .iter()
        .all(|kw| *kw >= cfg.min_load_kw && *kw <= cfg.max_load_kw));
    assert!(out.projected_savings > 0.0);
    assert!(out
        .recommendations
        .iter()
        .any(|r| r.kind == RecommendationKind::PeakShift));
    assert!(matches!(
        store.records().as_slice(),
        [OptimizationRecord::Schedule { .. }]
    ));
}

#[tokio::test]
async fn synthetic_peak_triggers_shedding_plan() {
    let (optimizer, _) = optimizer(StrategyKind::Greedy);
    let normal = optimizer
        .manage_peak_load_at("ahu-1", 40.0, None, monday())
        .await
        .unwrap();
    assert_eq!(normal.alert_level, AlertLevel::Normal);

    let high = optimizer
        .manage_peak_load_at("ahu-1", normal.threshold_kw * 1.2, None, monday())
        .await
        .unwrap();
    assert_eq!(high.alert_level, AlertLevel::High);
    assert!(!high.recommendations.is_empty());
    assert!(high
        .recommendations
        .windows(2)
        .all(|w| w[0].savings >= w[1].savings));
}

#[tokio::test]
async fn unknown_system_has_no_history() {
    let (optimizer, _) = optimizer(StrategyKind::Greedy);
    let err = optimizer
        .manage_peak_load_at("ahu-404", 80.0, None, monday())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "No historical data available for ahu-404");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn schedules_stay_within_operating_bounds(
        predicted in prop::collection::vec(0.0f64..300.0, 1..48),
        outdoor in 5.0f64..40.0,
        comfort in any::<bool>(),
        start_hour in 0i64..24,
    ) {
        let engines = [
            EnergyEngine::default(),
            EnergyEngine::default().with_strategy(Arc::new(GreedyScheduler)),
        ];
        let cfg = OptimizerConfig::default();
        let n = predicted.len();
        for engine in &engines {
            let out = engine
                .optimize_schedule(ScheduleRequest {
                    start: monday() + Duration::hours(start_hour),
                    predicted_load_kw: predicted.clone(),
                    outdoor_temps_c: vec![outdoor; n],
                    comfort_constraint: comfort,
                })
                .unwrap();
            prop_assert_eq!(out.optimal_schedule.hourly_load_kw.len(), n);
            for kw in &out.optimal_schedule.hourly_load_kw {
                prop_assert!(*kw >= cfg.min_load_kw && *kw <= cfg.max_load_kw);
            }
        }
    }
}
