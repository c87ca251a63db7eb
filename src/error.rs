use thiserror::Error;

use crate::comfort::ComfortMetrics;
use crate::energy::EnergyMetrics;

pub type OptimizationResult<T> = Result<T, OptimizationError>;

/// Errors raised by the comfort and energy engines.
///
/// Every failed computation surfaces as one of these; the engines never
/// retry and never swallow a failure. Translating them into user-facing
/// responses is left to the caller.
#[derive(Debug, Error)]
pub enum OptimizationError {
    #[error("Comfort optimization failed: {message}")]
    Comfort {
        message: String,
        metrics: Option<Box<ComfortMetrics>>,
    },

    #[error("Energy optimization failed: {message}")]
    Energy {
        message: String,
        metrics: Option<Box<EnergyMetrics>>,
    },

    #[error("Peak load {current_load_kw:.1} kW exceeds hard limit {limit_kw:.1} kW")]
    PeakLoad { current_load_kw: f64, limit_kw: f64 },

    #[error("No historical data available for {0}")]
    NoHistoricalData(String),

    #[error("Failed to find optimal schedule: {0}")]
    Solver(String),

    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

impl OptimizationError {
    pub fn comfort(message: impl Into<String>) -> Self {
        Self::Comfort {
            message: message.into(),
            metrics: None,
        }
    }

    pub fn comfort_with(message: impl Into<String>, metrics: ComfortMetrics) -> Self {
        Self::Comfort {
            message: message.into(),
            metrics: Some(Box::new(metrics)),
        }
    }

    pub fn energy(message: impl Into<String>) -> Self {
        Self::Energy {
            message: message.into(),
            metrics: None,
        }
    }

    pub fn energy_with(message: impl Into<String>, metrics: EnergyMetrics) -> Self {
        Self::Energy {
            message: message.into(),
            metrics: Some(Box::new(metrics)),
        }
    }

    pub fn is_comfort(&self) -> bool {
        matches!(self, Self::Comfort { .. })
    }

    pub fn is_energy(&self) -> bool {
        matches!(
            self,
            Self::Energy { .. } | Self::NoHistoricalData(_) | Self::Solver(_)
        )
    }

    pub fn is_peak_load(&self) -> bool {
        matches!(self, Self::PeakLoad { .. })
    }

    /// Short machine-readable tag, the shape callers map onto their own error codes.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Comfort { .. } => "ComfortOptimizationError",
            Self::Energy { .. } => "EnergyOptimizationError",
            Self::PeakLoad { .. } => "PeakLoadError",
            Self::NoHistoricalData(_) => "NoHistoricalData",
            Self::Solver(_) => "SolverError",
            Self::Collaborator(_) => "CollaboratorError",
        }
    }
}

impl From<validator::ValidationErrors> for OptimizationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        OptimizationError::comfort(format!("invalid reading: {}", errors))
    }
}
