use anyhow::Result;
use chrono::{Duration, DurationRound, Local};
use hvac_optimizer::{
    comfort::ComfortOptimizer,
    config::Config,
    domain::ConditionsInput,
    energy::{EnergyConfig, EnergyOptimizer},
    repo::InMemoryStore,
    services::Service,
    simulation::{
        synthetic_history, HvacLoadProfile, ScriptedRecommendations, SyntheticLoadForecaster,
        SyntheticWeather,
    },
    telemetry::init_tracing,
    ComfortEngine, EnergyEngine,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

const SYSTEM_ID: &str = "ahu-1";
const ZONE_ID: &str = "zone-3f-east";
const USER_ID: &str = "demo-user";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = Config::load()?;
    let now = Local::now().fixed_offset();
    let start = now.duration_trunc(Duration::hours(1))?;

    warn!("running against synthetic collaborators; figures are illustrative only");

    let profile = HvacLoadProfile::default().with_random_seed(42);
    let store = Arc::new(InMemoryStore::new());
    store.insert_series(
        SYSTEM_ID,
        synthetic_history(&profile, start, cfg.peak.history_days)?,
    );

    let forecaster = Arc::new(SyntheticLoadForecaster::new(profile.clone(), start));
    let weather = Arc::new(SyntheticWeather::new(profile, start));
    let recommendations = Arc::new(ScriptedRecommendations::default());

    let services: [&dyn Service; 4] = [
        store.as_ref(),
        forecaster.as_ref(),
        weather.as_ref(),
        recommendations.as_ref(),
    ];
    for svc in services {
        svc.connect().await?;
        info!(service = svc.name(), state = %svc.health_check().await.state, "service connected");
    }

    let comfort_engine = ComfortEngine::new(cfg.comfort.clone());
    let energy_engine = Arc::new(EnergyEngine::new(
        EnergyConfig::from(&cfg),
        comfort_engine.clone(),
    ));

    let comfort = ComfortOptimizer {
        engine: Arc::new(comfort_engine),
        preferences: store.clone(),
        recommendations: recommendations.clone(),
        weather: weather.clone(),
        store: store.clone(),
    };
    let energy = EnergyOptimizer {
        engine: energy_engine,
        forecaster: forecaster.clone(),
        weather: weather.clone(),
        store: store.clone(),
    };

    let analysis = energy
        .analyze_energy_consumption(SYSTEM_ID, start - Duration::days(7), start)
        .await?;

    let zone = comfort
        .optimize_comfort(
            ZONE_ID,
            USER_ID,
            ConditionsInput {
                temperature: Some(25.8),
                humidity: Some(58.0),
                co2_level: Some(870.0),
                air_speed: Some(0.1),
                mean_radiant_temp: None,
            },
            Some(10.0),
        )
        .await?;

    let schedule = energy.optimize_energy_cost(SYSTEM_ID, 24, true).await?;

    let current_load = schedule
        .optimal_schedule
        .hourly_load_kw
        .first()
        .copied()
        .unwrap_or_default();
    let peak = energy.manage_peak_load(SYSTEM_ID, current_load * 1.4, None).await?;

    let report = json!({
        "system_id": SYSTEM_ID,
        "energy_analysis": analysis,
        "comfort": zone,
        "cost_optimization": schedule,
        "peak_load": peak,
        "stored_records": store.records().len(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    for svc in services {
        svc.close().await?;
    }
    info!("demo complete");
    Ok(())
}
