//! Exact schedule optimization strategies
//!
//! - LP: linear program over hourly loads and the billed peak (exact solution)

pub mod lp;

pub use lp::*;
