pub mod comfort;
pub mod config;
pub mod domain;
pub mod energy;
pub mod error;
pub mod forecast;
pub mod optimizer;
pub mod repo;
pub mod services;
pub mod simulation;
pub mod telemetry;
pub mod utils;

pub use comfort::{ComfortEngine, ComfortMetrics, ComfortOptimizer};
pub use energy::{EnergyEngine, EnergyMetrics, EnergyOptimizer};
pub use error::{OptimizationError, OptimizationResult};
