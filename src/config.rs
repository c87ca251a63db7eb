use anyhow::{ensure, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use validator::Validate;

use crate::domain::TimeOfUseRateTable;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub comfort: ComfortConfig,
    pub rates: TimeOfUseRateTable,
    pub optimizer: OptimizerConfig,
    pub peak: PeakConfig,
    pub efficiency: EfficiencyConfig,
}

/// Closed interval `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Distance to the nearest edge, 0 inside the band.
    pub fn deviation(&self, value: f64) -> f64 {
        if value < self.low {
            self.low - value
        } else if value > self.high {
            value - self.high
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub pmv: f64,
    pub ppd: f64,
    pub air_quality: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComfortConfig {
    /// Activity level (met); 1.2 is seated office work
    pub metabolic_rate: f64,
    /// Clothing insulation (clo); 1.0 is typical indoor clothing
    pub clothing_insulation: f64,
    pub optimal_temperature: Band,
    pub optimal_humidity: Band,
    /// CO2 at or below `low` scores 100, at or above `high` scores 0 (ppm)
    pub co2: Band,
    pub weights: ScoreWeights,
}

impl Default for ComfortConfig {
    fn default() -> Self {
        Self {
            metabolic_rate: 1.2,
            clothing_insulation: 1.0,
            optimal_temperature: Band::new(20.0, 24.0),
            optimal_humidity: Band::new(40.0, 60.0),
            co2: Band::new(400.0, 1000.0),
            weights: ScoreWeights {
                pmv: 0.4,
                ppd: 0.3,
                air_quality: 0.3,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StrategyKind {
    /// Exact linear program
    Lp,
    /// Band-ordered level filling
    Greedy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct OptimizerConfig {
    pub strategy: StrategyKind,
    #[validate(range(min = 0.0))]
    pub min_load_kw: f64,
    #[validate(range(min = 0.0))]
    pub max_load_kw: f64,
    /// Lowest comfort score a schedule may imply when the comfort constraint is on
    #[validate(range(min = 0.0, max = 100.0))]
    pub min_comfort_score: f64,
    /// Keep total scheduled energy equal to the predicted energy
    pub preserve_energy: bool,
    /// Indoor temperature reached at full operating load (°C)
    pub target_setpoint_c: f64,
    /// Conditions assumed when scoring an implied setpoint
    #[validate(range(min = 0.0, max = 100.0))]
    pub nominal_humidity_percent: f64,
    #[validate(range(min = 0.0))]
    pub nominal_co2_ppm: f64,
    #[validate(range(min = 0.0))]
    pub nominal_air_speed_ms: f64,
    #[validate(range(min = 1, max = 168))]
    pub max_forecast_hours: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Lp,
            min_load_kw: 10.0,
            max_load_kw: 150.0,
            min_comfort_score: 70.0,
            preserve_energy: true,
            target_setpoint_c: 22.0,
            nominal_humidity_percent: 50.0,
            nominal_co2_ppm: 600.0,
            nominal_air_speed_ms: 0.1,
            max_forecast_hours: 168,
        }
    }
}

/// A load that can be curtailed during a demand peak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheddableLoad {
    pub name: String,
    pub max_shed_kw: f64,
    /// 0 (unnoticeable) to 1 (severe)
    pub comfort_penalty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PeakConfig {
    /// Percentile of historical daily peaks used as the default threshold
    #[validate(range(min = 0.0, max = 100.0))]
    pub threshold_percentile: f64,
    #[validate(range(min = 1))]
    pub history_days: i64,
    /// Fraction of the threshold at which the alert is raised
    #[validate(range(min = 0.0, max = 1.0))]
    pub alert_fraction: f64,
    /// Load above which no shedding plan is attempted
    pub hard_limit_kw: Option<f64>,
    pub sheddable_loads: Vec<SheddableLoad>,
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            threshold_percentile: 95.0,
            history_days: 30,
            alert_fraction: 0.9,
            hard_limit_kw: None,
            sheddable_loads: vec![
                shed("chiller_demand_limit", 30.0, 0.4),
                shed("zone_setpoint_setback", 20.0, 0.5),
                shed("supply_fan_speed_reduction", 12.0, 0.2),
                shed("outdoor_air_reduction", 8.0, 0.3),
            ],
        }
    }
}

fn shed(name: &str, max_shed_kw: f64, comfort_penalty: f64) -> SheddableLoad {
    SheddableLoad {
        name: name.to_string(),
        max_shed_kw,
        comfort_penalty,
    }
}

/// Baseline and attainable efficiency of one HVAC subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsystemTarget {
    pub name: String,
    pub baseline_efficiency: f64,
    pub target_efficiency: f64,
    /// $ to bring the subsystem to target
    pub improvement_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyConfig {
    pub subsystems: Vec<SubsystemTarget>,
}

impl Default for EfficiencyConfig {
    fn default() -> Self {
        Self {
            subsystems: vec![
                subsystem("compressor", 0.78, 0.85, 5000.0),
                subsystem("fans", 0.72, 0.80, 3000.0),
                subsystem("heat_exchanger", 0.86, 0.90, 4000.0),
            ],
        }
    }
}

fn subsystem(name: &str, baseline: f64, target: f64, cost: f64) -> SubsystemTarget {
    SubsystemTarget {
        name: name.to_string(),
        baseline_efficiency: baseline,
        target_efficiency: target,
        improvement_cost: cost,
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::from(Serialized::defaults(Config::default()))
                .merge(Toml::file("config/default.toml"))
                .merge(Env::prefixed("HVAC__").split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let cfg: Config = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.rates.validate()?;
        self.optimizer.validate()?;
        self.peak.validate()?;

        let c = &self.comfort;
        ensure!(c.metabolic_rate > 0.0, "comfort.metabolic_rate must be positive");
        ensure!(c.clothing_insulation >= 0.0, "comfort.clothing_insulation must be >= 0");
        for (name, band) in [
            ("optimal_temperature", c.optimal_temperature),
            ("optimal_humidity", c.optimal_humidity),
            ("co2", c.co2),
        ] {
            ensure!(band.low < band.high, "comfort.{} must satisfy low < high", name);
        }
        ensure!(
            self.optimizer.min_load_kw <= self.optimizer.max_load_kw,
            "optimizer.min_load_kw must not exceed optimizer.max_load_kw"
        );
        for s in &self.efficiency.subsystems {
            ensure!(
                s.target_efficiency > 0.0 && s.target_efficiency <= 1.0,
                "efficiency target of {} must be in (0, 1]",
                s.name
            );
            ensure!(s.improvement_cost >= 0.0, "improvement cost of {} must be >= 0", s.name);
        }
        for l in &self.peak.sheddable_loads {
            ensure!(l.max_shed_kw >= 0.0, "sheddable load {} must be >= 0 kW", l.name);
        }
        Ok(())
    }
}
