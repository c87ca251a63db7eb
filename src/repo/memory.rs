use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use parking_lot::RwLock;
use std::collections::HashMap;

use super::{HistoricalStore, PreferenceStore};
use crate::domain::{EnergySeriesPoint, OptimizationRecord, UserComfortPreference};
use crate::services::Service;

/// Process-local store for demos and tests.
#[derive(Default)]
pub struct InMemoryStore {
    series: RwLock<HashMap<String, Vec<EnergySeriesPoint>>>,
    preferences: RwLock<HashMap<(String, String), UserComfortPreference>>,
    records: RwLock<Vec<OptimizationRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_series(&self, system_id: &str, points: impl IntoIterator<Item = EnergySeriesPoint>) {
        let mut series = self.series.write();
        let entry = series.entry(system_id.to_string()).or_default();
        entry.extend(points);
        entry.sort_by_key(|p| p.timestamp);
    }

    pub fn set_preferences(&self, user_id: &str, zone_id: &str, prefs: UserComfortPreference) {
        self.preferences
            .write()
            .insert((user_id.to_string(), zone_id.to_string()), prefs);
    }

    pub fn records(&self) -> Vec<OptimizationRecord> {
        self.records.read().clone()
    }
}

#[async_trait]
impl HistoricalStore for InMemoryStore {
    async fn get_series(
        &self,
        system_id: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<Vec<EnergySeriesPoint>> {
        Ok(self
            .series
            .read()
            .get(system_id)
            .map(|points| crate::domain::window(points, start, end))
            .unwrap_or_default())
    }

    async fn save(&self, record: OptimizationRecord) -> Result<()> {
        self.records.write().push(record);
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for InMemoryStore {
    async fn preferences(
        &self,
        user_id: &str,
        zone_id: &str,
    ) -> Result<Option<UserComfortPreference>> {
        Ok(self
            .preferences
            .read()
            .get(&(user_id.to_string(), zone_id.to_string()))
            .cloned())
    }
}

#[async_trait]
impl Service for InMemoryStore {
    fn name(&self) -> &str {
        "in-memory-store"
    }

    async fn connect(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    async fn test_connection(&self) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn point(t: DateTime<FixedOffset>) -> EnergySeriesPoint {
        EnergySeriesPoint {
            timestamp: t,
            active_power_kw: 40.0,
            energy_kwh: 40.0,
            outside_temp_c: 12.0,
        }
    }

    #[tokio::test]
    async fn test_series_window_and_ordering() {
        let store = InMemoryStore::new();
        let t0 = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 10, 0, 0, 0)
            .unwrap();
        store.insert_series("ahu-1", (0..10).rev().map(|h| point(t0 + Duration::hours(h))));

        let got = store
            .get_series("ahu-1", t0 + Duration::hours(2), t0 + Duration::hours(5))
            .await
            .unwrap();
        assert_eq!(got.len(), 4);
        assert!(got.windows(2).all(|w| w[0].timestamp < w[1].timestamp));

        let none = store.get_series("other", t0, t0 + Duration::hours(5)).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_preferences_roundtrip() {
        let store = InMemoryStore::new();
        assert!(store.preferences("u1", "z1").await.unwrap().is_none());
        let prefs = UserComfortPreference {
            preferred_temperature: 21.0,
            ..Default::default()
        };
        store.set_preferences("u1", "z1", prefs.clone());
        assert_eq!(store.preferences("u1", "z1").await.unwrap(), Some(prefs));
        assert!(store.test_connection().await.unwrap());
    }
}
