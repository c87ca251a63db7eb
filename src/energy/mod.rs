//! Energy consumption analytics, cost optimization and peak-load management.
//!
//! [`EnergyEngine`] computes over series and forecasts it is handed;
//! [`EnergyOptimizer`] fetches those from the forecasting and storage
//! collaborators and persists what the engine produces.

pub mod analysis;
pub mod cost;
pub mod engine;
pub mod optimizer;
pub mod peak;
pub mod recommendations;

pub use analysis::{expected_consumption, EnergyMetrics};
pub use cost::{cost_breakdown, hourly_cost_breakdown, CostBreakdown};
pub use engine::{EnergyConfig, EnergyCostOptimization, EnergyEngine, ScheduleRequest};
pub use optimizer::EnergyOptimizer;
pub use peak::{AlertLevel, PeakLoadAssessment};
