use anyhow::Result;
use async_trait::async_trait;

/// Predicts the hourly HVAC load of a system. Implementations are opaque
/// (an ML model, a baseline profile, a vendor API).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoadForecaster: Send + Sync {
    /// `hours` predicted loads in kW, the first one for the hour starting now.
    async fn predict_load(&self, system_id: &str, hours: usize) -> Result<Vec<f64>>;
}
