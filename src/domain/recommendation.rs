use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecommendationKind {
    PeakShift,
    EfficiencyImprovement,
    Setpoint,
    LoadReduction,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Payback under two years is high, under four medium.
    pub fn from_payback_years(payback: f64) -> Self {
        if payback < 2.0 {
            Priority::High
        } else if payback < 4.0 {
            Priority::Medium
        } else {
            Priority::Low
        }
    }
}

/// Kind-specific figures of a recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecommendationDetail {
    PeakShift {
        from_hour: usize,
        to_hour: usize,
        load_reduction_kw: f64,
    },
    EfficiencyImprovement {
        system: String,
        current_efficiency: f64,
        target_efficiency: f64,
        improvement_cost: f64,
        payback_years: f64,
    },
    Setpoint {
        title: String,
        action: String,
        temperature_delta: Option<f64>,
        humidity_delta: Option<f64>,
        co2_delta: Option<f64>,
    },
    LoadReduction {
        load: String,
        shed_kw: f64,
        comfort_penalty: f64,
    },
}

/// An actionable recommendation produced by one of the engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRecommendation {
    pub id: Uuid,
    pub kind: RecommendationKind,
    pub detail: RecommendationDetail,
    /// Expected saving in $ (per event for shifts and sheds, per year for efficiency)
    pub savings: f64,
    /// Cost of implementing the recommendation in $
    pub cost: f64,
    /// Declared energy impact in kWh (negative = saves energy)
    pub energy_impact: f64,
    pub priority: Priority,
    pub validated: bool,
}

impl OptimizationRecommendation {
    pub fn new(detail: RecommendationDetail, savings: f64, priority: Priority) -> Self {
        let kind = match &detail {
            RecommendationDetail::PeakShift { .. } => RecommendationKind::PeakShift,
            RecommendationDetail::EfficiencyImprovement { .. } => {
                RecommendationKind::EfficiencyImprovement
            }
            RecommendationDetail::Setpoint { .. } => RecommendationKind::Setpoint,
            RecommendationDetail::LoadReduction { .. } => RecommendationKind::LoadReduction,
        };
        Self {
            id: Uuid::new_v4(),
            kind,
            detail,
            savings,
            cost: 0.0,
            energy_impact: 0.0,
            priority,
            validated: false,
        }
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_energy_impact(mut self, kwh: f64) -> Self {
        self.energy_impact = kwh;
        self
    }
}

/// Raw recommendation as returned by the text-generation collaborator,
/// before any validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecommendation {
    pub title: String,
    pub action: String,
    #[serde(default)]
    pub energy_impact: f64,
    #[serde(default)]
    pub temperature_delta: Option<f64>,
    #[serde(default)]
    pub humidity_delta: Option<f64>,
    #[serde(default)]
    pub co2_delta: Option<f64>,
}

impl CandidateRecommendation {
    pub fn into_recommendation(self) -> OptimizationRecommendation {
        let energy_impact = self.energy_impact;
        let mut rec = OptimizationRecommendation::new(
            RecommendationDetail::Setpoint {
                title: self.title,
                action: self.action,
                temperature_delta: self.temperature_delta,
                humidity_delta: self.humidity_delta,
                co2_delta: self.co2_delta,
            },
            0.0,
            Priority::Medium,
        )
        .with_energy_impact(energy_impact);
        rec.validated = true;
        rec
    }
}

/// Something the persistence collaborator stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum OptimizationRecord {
    Comfort {
        zone_id: String,
        user_id: String,
        recorded_at: DateTime<FixedOffset>,
        comfort_score: f64,
        metrics: crate::comfort::ComfortMetrics,
        recommendations: Vec<OptimizationRecommendation>,
    },
    EnergyAnalysis {
        system_id: String,
        recorded_at: DateTime<FixedOffset>,
        metrics: crate::energy::EnergyMetrics,
    },
    Schedule {
        system_id: String,
        recorded_at: DateTime<FixedOffset>,
        projected_savings: f64,
        recommendations: Vec<OptimizationRecommendation>,
    },
}
