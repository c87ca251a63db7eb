//! Thermal comfort scoring.
//!
//! [`ComfortEngine`] is a pure function of readings and configuration;
//! [`ComfortOptimizer`] wires it to preference storage and a recommendation
//! source.

pub mod engine;
pub mod metrics;
pub mod optimizer;
pub mod pmv;

pub use engine::{ComfortEngine, ComfortOptimization};
pub use metrics::ComfortMetrics;
pub use optimizer::ComfortOptimizer;
