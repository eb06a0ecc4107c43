//! Persistence boundary for sensors and readings.
//!
//! The collector only talks to the [`ReadingStore`] trait, keeping the
//! actual storage technology out of the pipeline. [`MemoryStore`] is the
//! in-process reference implementation used by the binary and the tests.

use crate::error::{HubError, Result};
use crate::model::{Reading, Sensor};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Write and read access to persisted sensors and readings.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Insert-or-update a sensor, keyed by its stable id. Idempotent.
    async fn upsert_sensor(&self, sensor: &Sensor) -> Result<()>;

    /// Append one reading. Rejects readings carrying neither value.
    async fn insert_reading(&self, reading: &Reading) -> Result<()>;

    async fn all_sensors(&self) -> Result<Vec<Sensor>>;

    /// Most recent reading per sensor, by reading timestamp.
    async fn latest_readings(&self) -> Result<HashMap<String, Reading>>;

    /// Delete all readings with a timestamp strictly before `cutoff`.
    /// Returns the number deleted.
    async fn delete_readings_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize>;
}

#[derive(Default)]
struct MemoryInner {
    sensors: HashMap<String, Sensor>,
    readings: Vec<Reading>,
}

/// In-memory [`ReadingStore`] implementation.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of readings currently held. Test and introspection helper.
    pub fn reading_count(&self) -> usize {
        self.inner.read().readings.len()
    }
}

#[async_trait]
impl ReadingStore for MemoryStore {
    async fn upsert_sensor(&self, sensor: &Sensor) -> Result<()> {
        self.inner
            .write()
            .sensors
            .insert(sensor.id.clone(), sensor.clone());
        Ok(())
    }

    async fn insert_reading(&self, reading: &Reading) -> Result<()> {
        if !reading.has_value() {
            return Err(HubError::EmptyReading(reading.sensor_id.clone()));
        }
        self.inner.write().readings.push(reading.clone());
        Ok(())
    }

    async fn all_sensors(&self) -> Result<Vec<Sensor>> {
        Ok(self.inner.read().sensors.values().cloned().collect())
    }

    async fn latest_readings(&self) -> Result<HashMap<String, Reading>> {
        let inner = self.inner.read();
        let mut latest: HashMap<String, Reading> = HashMap::new();
        for reading in &inner.readings {
            match latest.get(&reading.sensor_id) {
                Some(existing) if existing.timestamp >= reading.timestamp => {}
                _ => {
                    latest.insert(reading.sensor_id.clone(), reading.clone());
                }
            }
        }
        Ok(latest)
    }

    async fn delete_readings_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut inner = self.inner.write();
        let before = inner.readings.len();
        inner.readings.retain(|r| r.timestamp >= cutoff);
        Ok(before - inner.readings.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SensorKind, SensorStatus};
    use chrono::TimeZone;

    fn sensor(id: &str) -> Sensor {
        Sensor {
            id: id.to_string(),
            entity_id: format!("sensor.{id}"),
            name: id.to_string(),
            kind: SensorKind::Temperature,
            unit: "°C".to_string(),
            last_seen: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            status: SensorStatus::Online,
        }
    }

    fn reading(id: &str, hour: u32, temp: f64) -> Reading {
        Reading {
            sensor_id: id.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
            temperature: Some(temp),
            humidity: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let store = MemoryStore::new();
        store.upsert_sensor(&sensor("buero")).await.unwrap();
        store.upsert_sensor(&sensor("buero")).await.unwrap();

        let sensors = store.all_sensors().await.unwrap();
        assert_eq!(sensors.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_reading_rejected() {
        let store = MemoryStore::new();
        let empty = Reading {
            sensor_id: "buero".to_string(),
            timestamp: Utc::now(),
            temperature: None,
            humidity: None,
        };
        assert!(store.insert_reading(&empty).await.is_err());
        assert_eq!(store.reading_count(), 0);
    }

    #[tokio::test]
    async fn test_latest_reading_wins_by_timestamp() {
        let store = MemoryStore::new();
        store.insert_reading(&reading("buero", 10, 20.0)).await.unwrap();
        store.insert_reading(&reading("buero", 12, 22.0)).await.unwrap();
        store.insert_reading(&reading("buero", 11, 21.0)).await.unwrap();

        let latest = store.latest_readings().await.unwrap();
        assert_eq!(latest["buero"].temperature, Some(22.0));
    }

    #[tokio::test]
    async fn test_retention_deletes_strictly_before_cutoff() {
        let store = MemoryStore::new();
        store.insert_reading(&reading("buero", 9, 19.0)).await.unwrap();
        store.insert_reading(&reading("buero", 10, 20.0)).await.unwrap();
        store.insert_reading(&reading("buero", 11, 21.0)).await.unwrap();

        let cutoff = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let deleted = store.delete_readings_older_than(cutoff).await.unwrap();
        assert_eq!(deleted, 1);

        // Reading exactly at the cutoff survives
        assert_eq!(store.reading_count(), 2);

        // Re-running with the same cutoff deletes nothing
        let deleted = store.delete_readings_older_than(cutoff).await.unwrap();
        assert_eq!(deleted, 0);
    }
}
