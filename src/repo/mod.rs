pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use crate::domain::{EnergySeriesPoint, OptimizationRecord, UserComfortPreference};

pub use memory::InMemoryStore;

/// Metering history and result persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoricalStore: Send + Sync {
    /// Points with `start <= timestamp <= end`, ordered by timestamp.
    async fn get_series(
        &self,
        system_id: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<Vec<EnergySeriesPoint>>;

    async fn save(&self, record: OptimizationRecord) -> Result<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn preferences(
        &self,
        user_id: &str,
        zone_id: &str,
    ) -> Result<Option<UserComfortPreference>>;
}
